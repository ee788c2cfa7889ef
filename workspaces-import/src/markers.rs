//! Marker label lookup
//!
//! Maps the label text found in a cell to the field whose value sits in the
//! adjacent cell. Scanning code asks the table, it never compares strings
//! itself.

use crate::config::ImportLayout;

/// Field identified by a marker label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    RegistrationCode,
    MfaUsername,
    MfaSecret,
    MfaUrl,
}

#[derive(Debug, Clone)]
pub struct MarkerTable {
    entries: Vec<(String, Field)>,
}

impl MarkerTable {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Field)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(marker, field)| {
                    let marker: String = marker.into();
                    (marker.trim().to_string(), field)
                })
                .collect(),
        }
    }

    pub fn from_layout(layout: &ImportLayout) -> Self {
        Self::new([
            (
                layout.workspaces.registration_marker.as_str(),
                Field::RegistrationCode,
            ),
            (layout.mfa.username_marker.as_str(), Field::MfaUsername),
            (layout.mfa.secret_marker.as_str(), Field::MfaSecret),
            (layout.mfa.url_marker.as_str(), Field::MfaUrl),
        ])
    }

    /// Field for an exact (trimmed) label match
    pub fn lookup(&self, text: &str) -> Option<Field> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|(marker, _)| marker == text)
            .map(|(_, field)| *field)
    }

    /// The label text registered for `field`
    pub fn marker(&self, field: Field) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, f)| *f == field)
            .map(|(marker, _)| marker.as_str())
    }
}

impl Default for MarkerTable {
    fn default() -> Self {
        Self::from_layout(&ImportLayout::default())
    }
}
