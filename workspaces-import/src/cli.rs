//! Command-line arguments

use std::path::PathBuf;

use clap::{ArgAction, Parser};

/// Import WorkSpaces users from Excel files and generate setup configurations
#[derive(Parser, Debug, Clone)]
#[command(name = "workspaces-import", version, about)]
pub struct Cli {
    /// Path to WorkSpaces Excel file
    #[arg(short = 'w', long)]
    pub workspaces: PathBuf,

    /// Path to MFA Excel file (optional)
    #[arg(short = 'm', long)]
    pub mfa: Option<PathBuf>,

    /// Output directory
    #[arg(short = 'o', long, default_value = "users")]
    pub output: PathBuf,

    /// TOML file overriding sheet names, marker labels and columns
    #[arg(short = 'c', long, env = "WORKSPACES_IMPORT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Default log filter for `env_logger`; `RUST_LOG` still wins
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
