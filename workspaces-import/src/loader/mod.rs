//! Spreadsheet loaders
//!
//! The workspaces loader builds the [`ImportSession`](crate::session::ImportSession);
//! the MFA loader only ever adds to it.

mod mfa;
mod workspaces;

pub use mfa::{MfaEntry, MfaReport, apply_mfa, load_mfa, read_mfa_entries, scan_sheet};
pub use workspaces::{load_workspaces, read_registration_code, read_users};
