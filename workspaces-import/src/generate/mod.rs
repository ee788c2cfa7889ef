//! Output generation: per-user config files, the management script and the summary

mod artifact;
mod env_file;
mod script;
mod summary;

use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use chrono::{DateTime, Local};

use crate::session::{ImportSession, is_safe_username};

pub use artifact::{EXECUTABLE, ensure_dir, write_artifact};
pub use env_file::render_env_file;
pub use script::render_script;
pub use summary::render_summary;

pub const SCRIPT_FILE: &str = "manage_users.sh";
pub const SUMMARY_FILE: &str = "import_summary.txt";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What [`generate_files`] wrote
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub output_dir: PathBuf,
    pub users_written: usize,
    pub mfa_configured: usize,
    pub script_path: PathBuf,
    pub summary_path: PathBuf,
}

/// Write every output file into `output_dir`.
///
/// Existing files are overwritten. The first write error aborts the rest, so
/// a failure can leave only some user directories written.
pub fn generate_files(
    session: &ImportSession,
    output_dir: &Path,
    env_file_name: &str,
    generated_at: &DateTime<Local>,
) -> Result<GenerationReport> {
    // Checked before anything is written
    for user in session.users() {
        user_dir(output_dir, &user.username)?;
    }

    ensure_dir(output_dir)?;

    for user in session.users() {
        let dir = user_dir(output_dir, &user.username)?;
        ensure_dir(&dir)?;
        write_artifact(
            &dir.join(env_file_name),
            &render_env_file(user, &session.registration_code),
            None,
        )?;
    }

    let script_path = output_dir.join(SCRIPT_FILE);
    write_artifact(
        &script_path,
        &render_script(session, env_file_name, generated_at),
        Some(EXECUTABLE),
    )?;

    let summary_path = output_dir.join(SUMMARY_FILE);
    write_artifact(&summary_path, &render_summary(session, generated_at), None)?;

    log::info!(
        "Generated files for {} users in {}",
        session.len(),
        output_dir.display()
    );

    Ok(GenerationReport {
        output_dir: output_dir.to_path_buf(),
        users_written: session.len(),
        mfa_configured: session.mfa_count(),
        script_path,
        summary_path,
    })
}

/// The directory for one user, which must sit directly under `output_dir`
fn user_dir(output_dir: &Path, username: &str) -> Result<PathBuf> {
    let dir = output_dir.join(username);
    if !is_safe_username(username) || dir.parent() != Some(output_dir) {
        bail!(
            "Username '{}' would write outside {}",
            username,
            output_dir.display()
        );
    }
    Ok(dir)
}

/// Collapse line breaks so a value cannot spill into the next line of a file
fn single_line(value: &str) -> String {
    if value.contains(['\r', '\n']) {
        value
            .split(['\r', '\n'])
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        value.to_string()
    }
}
