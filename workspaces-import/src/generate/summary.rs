//! The plain-text `import_summary.txt` report

use chrono::{DateTime, Local};

use crate::session::ImportSession;

use super::TIMESTAMP_FORMAT;

pub fn render_summary(session: &ImportSession, generated_at: &DateTime<Local>) -> String {
    let mut out = String::new();

    out.push_str("Amazon WorkSpaces User Import Summary\n");
    out.push_str("=====================================\n");
    out.push_str(&format!(
        "Generated on: {}\n",
        generated_at.format(TIMESTAMP_FORMAT)
    ));
    out.push('\n');
    out.push_str(&format!("Registration Code: {}\n", session.registration_code));
    out.push('\n');
    out.push_str(&format!("Users Imported: {}\n", session.len()));
    out.push_str("--------------\n");

    for user in session.users_sorted() {
        out.push_str(&format!("{}: {}", user.username, user.display_name()));
        if user.has_mfa() {
            out.push_str(" [MFA Configured]");
        }
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&format!(
        "MFA Configured: {}/{}\n",
        session.mfa_count(),
        session.len()
    ));
    out
}
