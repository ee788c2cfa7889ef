//! Read MFA secrets and enrollment URLs and attach them to loaded users
//!
//! The MFA export has one block per user, but which sheet and which columns
//! hold it is not known in advance. Every sheet is scanned row by row, left to
//! right, for marker labels; the cell to the right of a marker is its value.
//!
//! Within one sheet the *last* non-blank value seen for each marker wins. A
//! sheet that repeats the username marker therefore yields only its final
//! user, combined with whichever secret and URL were seen last anywhere in
//! that sheet. State does not carry over between sheets.

use std::path::Path;

use anyhow::Result;
use calamine::{Data, Range};

use crate::markers::{Field, MarkerTable};
use crate::session::ImportSession;
use crate::sheet::{self, Workbook};

/// Values found in one sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MfaEntry {
    pub sheet: String,
    pub username: String,
    pub secret: Option<String>,
    pub url: Option<String>,
}

/// Outcome of merging MFA entries into a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MfaReport {
    pub sheets_scanned: usize,
    /// Users that received a secret and/or URL
    pub matched: usize,
    /// Entries whose username is not a loaded user
    pub unmatched: usize,
    /// Entries for a loaded user but with neither secret nor URL
    pub empty: usize,
}

/// Read the MFA workbook and merge it into `session`.
///
/// The whole workbook is read before the session is touched, so an error
/// leaves the session unchanged.
pub fn load_mfa(path: &Path, session: &mut ImportSession, markers: &MarkerTable) -> Result<MfaReport> {
    let (sheets_scanned, entries) = read_mfa_entries(path, markers)?;

    let mut report = apply_mfa(session, &entries);
    report.sheets_scanned = sheets_scanned;

    log::info!(
        "MFA data: {} sheets scanned, {} users matched, {} unknown usernames",
        report.sheets_scanned,
        report.matched,
        report.unmatched
    );
    Ok(report)
}

/// Scan every sheet of the workbook. Returns the sheet count and one entry
/// per sheet that named a username.
pub fn read_mfa_entries(path: &Path, markers: &MarkerTable) -> Result<(usize, Vec<MfaEntry>)> {
    let mut workbook = Workbook::open(path)?;
    let sheet_names = workbook.sheet_names();

    let mut entries = Vec::new();
    for name in &sheet_names {
        let range = workbook.range(name)?;
        if let Some(entry) = scan_sheet(name, &range, markers) {
            log::debug!("Sheet '{}' has MFA data for {}", name, entry.username);
            entries.push(entry);
        }
    }

    Ok((sheet_names.len(), entries))
}

/// Scan one sheet. `None` when no username marker with a value was found.
pub fn scan_sheet(name: &str, range: &Range<Data>, markers: &MarkerTable) -> Option<MfaEntry> {
    let mut username = None;
    let mut secret = None;
    let mut url = None;

    for row in sheet::rows(range) {
        for col in 0..row.width() {
            let field = match markers.lookup(&row.text(col)) {
                Some(field) => field,
                None => continue,
            };
            let value = match row.cell(col + 1) {
                Some(value) => value,
                None => continue,
            };

            match field {
                Field::MfaUsername => username = Some(value),
                Field::MfaSecret => secret = Some(value),
                Field::MfaUrl => url = Some(value),
                Field::RegistrationCode => {}
            }
        }
    }

    username.map(|username| MfaEntry {
        sheet: name.to_string(),
        username,
        secret,
        url,
    })
}

/// Attach entries to matching users. Absent values never clear existing ones.
pub fn apply_mfa(session: &mut ImportSession, entries: &[MfaEntry]) -> MfaReport {
    let mut report = MfaReport::default();

    for entry in entries {
        let user = match session.get_mut(&entry.username) {
            Some(user) => user,
            None => {
                log::debug!(
                    "Sheet '{}': username {} is not in the WorkSpaces export",
                    entry.sheet,
                    entry.username
                );
                report.unmatched += 1;
                continue;
            }
        };

        if entry.secret.is_none() && entry.url.is_none() {
            log::debug!(
                "Sheet '{}': no secret or URL for {}",
                entry.sheet,
                entry.username
            );
            report.empty += 1;
            continue;
        }

        if let Some(secret) = &entry.secret {
            user.mfa_secret = Some(secret.clone());
        }
        if let Some(url) = &entry.url {
            user.mfa_url = Some(url.clone());
        }
        log::info!("Loaded MFA data for user: {}", entry.username);
        report.matched += 1;
    }

    report
}
