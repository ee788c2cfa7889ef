//! Import Amazon WorkSpaces users from spreadsheet exports.
//!
//! A run has three stages:
//! 1. [`loader::load_workspaces`] reads the registration code and users (fatal on error)
//! 2. [`loader::load_mfa`] attaches MFA secrets and URLs (optional, never fatal)
//! 3. [`generate::generate_files`] writes per-user config files, `manage_users.sh`
//!    and `import_summary.txt`

pub mod cli;
pub mod config;
pub mod generate;
pub mod loader;
pub mod markers;
pub mod session;
pub mod sheet;

use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Local;
use colored::*;

pub use cli::Cli;
pub use config::ImportLayout;
pub use generate::GenerationReport;
pub use loader::MfaReport;
pub use markers::{Field, MarkerTable};
pub use session::{ImportSession, UserRecord};

/// How the optional MFA stage ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MfaStatus {
    /// No MFA path given, or the path does not exist
    Skipped,
    /// The file exists but could not be read; the run went on without it
    Failed(String),
    Loaded(MfaReport),
}

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub session: ImportSession,
    pub mfa: MfaStatus,
    pub generation: GenerationReport,
}

/// Run the whole import for the given arguments
pub fn run(cli: &Cli) -> Result<ImportOutcome> {
    // Checked first so that nothing is created for a bad invocation
    if !cli.workspaces.exists() {
        bail!("WorkSpaces file not found: {}", cli.workspaces.display());
    }

    let layout = ImportLayout::resolve(cli.config.as_deref())?;
    let markers = MarkerTable::from_layout(&layout);

    println!("{}", "Loading WorkSpaces data...".bold());
    let mut session = loader::load_workspaces(&cli.workspaces, &layout.workspaces, &markers)
        .context("Error loading WorkSpaces data")?;
    println!(
        "Loaded {} users from WorkSpaces file",
        session.len().to_string().bright_green()
    );
    println!("Registration Code: {}", session.registration_code.cyan());

    println!();
    let mfa = load_mfa_stage(cli.mfa.as_deref(), &mut session, &markers);

    println!();
    println!("{}", "Generating setup files...".bold());
    let generation =
        generate::generate_files(&session, &cli.output, &layout.env_file_name, &Local::now())?;

    println!();
    println!(
        "Setup files generated in '{}' directory",
        generation.output_dir.display().to_string().cyan()
    );
    println!(
        "Total users processed: {}",
        generation.users_written.to_string().bright_green()
    );
    println!();
    println!("{}", "Import completed successfully!".green().bold());

    Ok(ImportOutcome {
        session,
        mfa,
        generation,
    })
}

/// MFA is additive: every failure is reported and swallowed here
fn load_mfa_stage(
    path: Option<&Path>,
    session: &mut ImportSession,
    markers: &MarkerTable,
) -> MfaStatus {
    let path = match path {
        Some(path) if path.exists() => path,
        _ => {
            println!(
                "{}",
                "No MFA file provided or file not found, skipping MFA data".yellow()
            );
            log::info!("MFA stage skipped");
            return MfaStatus::Skipped;
        }
    };

    println!("{}", "Loading MFA data...".bold());
    match loader::load_mfa(path, session, markers) {
        Ok(report) => {
            println!(
                "MFA data attached to {} users",
                report.matched.to_string().bright_green()
            );
            MfaStatus::Loaded(report)
        }
        Err(e) => {
            log::warn!("Failed to load MFA data from {}: {:#}", path.display(), e);
            println!(
                "{} {:#}",
                "Error loading MFA data, continuing without it:".yellow(),
                e
            );
            MfaStatus::Failed(format!("{:#}", e))
        }
    }
}
