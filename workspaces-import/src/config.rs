//! Spreadsheet layout configuration
//!
//! The exports this tool reads have no schema. Sheet names, marker labels and
//! column positions are fixed by convention, and the defaults below describe
//! that convention. A TOML file can override any of them.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// Layout of both input workbooks and the generated per-user file
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ImportLayout {
    pub workspaces: WorkspacesLayout,
    pub mfa: MfaLayout,
    /// File name written inside each user directory
    pub env_file_name: String,
}

/// Where the registration code and the user rows live
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WorkspacesLayout {
    /// Sheet holding the registration code
    pub login_sheet: String,
    /// Sheet holding one row per user
    pub users_sheet: String,
    /// Label cell text next to the registration code
    pub registration_marker: String,
    /// Column of the registration code label, value is one column to the right
    pub label_column: usize,
    /// Column of the username; name and password columns follow it
    pub username_column: usize,
    /// Rows are accepted as users only when the username starts with this
    pub username_prefix: String,
}

/// Marker labels searched for in every sheet of the MFA workbook
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MfaLayout {
    pub username_marker: String,
    pub secret_marker: String,
    pub url_marker: String,
}

impl Default for ImportLayout {
    fn default() -> Self {
        Self {
            workspaces: WorkspacesLayout::default(),
            mfa: MfaLayout::default(),
            env_file_name: ".env.local".to_string(),
        }
    }
}

impl Default for WorkspacesLayout {
    fn default() -> Self {
        Self {
            login_sheet: "ログイン情報".to_string(),
            users_sheet: "サインイン情報".to_string(),
            registration_marker: "登録コード".to_string(),
            label_column: 1,
            username_column: 1,
            username_prefix: "800000".to_string(),
        }
    }
}

impl Default for MfaLayout {
    fn default() -> Self {
        Self {
            username_marker: "ユーザー名".to_string(),
            secret_marker: "シークレットコード".to_string(),
            url_marker: "QRコードへのアクセスURL".to_string(),
        }
    }
}

impl ImportLayout {
    /// Load a layout from a TOML file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read layout config: {}", path.display()))?;

        let layout = Self::from_toml(&content)
            .with_context(|| format!("Invalid layout config: {}", path.display()))?;

        log::debug!("Loaded layout config from {}", path.display());
        Ok(layout)
    }

    /// Parse and validate a layout from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let layout: ImportLayout = toml::from_str(content).context("Failed to parse TOML")?;
        layout.validate()?;
        Ok(layout)
    }

    /// Load from `path` when given, defaults otherwise
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let ws = &self.workspaces;
        let required = [
            ("workspaces.login_sheet", &ws.login_sheet),
            ("workspaces.users_sheet", &ws.users_sheet),
            ("workspaces.registration_marker", &ws.registration_marker),
            ("workspaces.username_prefix", &ws.username_prefix),
            ("mfa.username_marker", &self.mfa.username_marker),
            ("mfa.secret_marker", &self.mfa.secret_marker),
            ("mfa.url_marker", &self.mfa.url_marker),
            ("env_file_name", &self.env_file_name),
        ];

        for (key, value) in required {
            if value.trim().is_empty() {
                bail!("'{}' must not be empty", key);
            }
        }

        if self.env_file_name.contains('/') || self.env_file_name.contains('\\') {
            bail!(
                "'env_file_name' must be a plain file name, got '{}'",
                self.env_file_name
            );
        }

        let markers = [
            &ws.registration_marker,
            &self.mfa.username_marker,
            &self.mfa.secret_marker,
            &self.mfa.url_marker,
        ];
        for (i, a) in markers.iter().enumerate() {
            if markers[i + 1..].iter().any(|b| a.trim() == b.trim()) {
                bail!("Marker '{}' is used for more than one field", a);
            }
        }

        Ok(())
    }
}
