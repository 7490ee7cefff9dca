use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "complyflow")]
#[command(author, version, about = "ComplyFlow policy enforcement engine")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Directory of policy templates to load (.json/.yaml)
    #[arg(long, default_value = "./policies/templates")]
    pub templates: PathBuf,

    /// Audit log path
    #[arg(long, default_value = "./compliance/audit_log.jsonl")]
    pub audit_log: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a single policy template and report errors
    Validate {
        /// Template file to check
        template: PathBuf,
    },

    /// Enforce a policy against a JSON record
    Enforce {
        /// Policy identifier
        #[arg(short, long)]
        policy: String,

        /// JSON file holding the input record
        #[arg(short, long)]
        data: PathBuf,

        /// Optional JSON file holding the caller context
        #[arg(short, long)]
        context: Option<PathBuf>,
    },

    /// Per-policy enforcement totals from the audit trail
    Status {
        /// Policy identifier
        policy: String,
    },

    /// Compliance dashboard derived from the audit trail
    Dashboard,
}
