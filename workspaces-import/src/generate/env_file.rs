//! Per-user `.env.local` contents

use crate::session::UserRecord;

use super::single_line;

/// Render the configuration file for one user.
///
/// Contains no timestamp: the same inputs always produce the same bytes.
pub fn render_env_file(user: &UserRecord, registration_code: &str) -> String {
    let mut out = String::new();

    out.push_str("# Amazon WorkSpaces Configuration\n");
    out.push_str(&format!(
        "WORKSPACES_REGISTRATION_CODE={}\n",
        single_line(registration_code)
    ));
    out.push('\n');

    out.push_str("# User Credentials\n");
    out.push_str(&format!("WORKSPACES_USERNAME={}\n", single_line(&user.username)));
    out.push_str(&format!(
        "WORKSPACES_INITIAL_PASSWORD={}\n",
        single_line(&user.initial_password)
    ));
    out.push('\n');

    out.push_str("# User Info\n");
    out.push_str(&format!("USER_LAST_NAME=\"{}\"\n", quoted(&user.last_name)));
    out.push_str(&format!("USER_FIRST_NAME=\"{}\"\n", quoted(&user.first_name)));
    out.push_str(&format!("USER_FULL_NAME_EN=\"{}\"\n", quoted(&user.full_name_en)));

    if let Some(secret) = &user.mfa_secret {
        out.push('\n');
        out.push_str("# MFA Configuration\n");
        out.push_str(&format!("MFA_SECRET_KEY={}\n", single_line(secret)));
    }
    if let Some(url) = &user.mfa_url {
        if user.mfa_secret.is_none() {
            out.push('\n');
            out.push_str("# MFA Configuration\n");
        }
        out.push_str(&format!("MFA_QR_URL={}\n", single_line(url)));
    }

    out
}

/// Escape for a double-quoted dotenv value
fn quoted(value: &str) -> String {
    single_line(value).replace('\\', "\\\\").replace('"', "\\\"")
}
