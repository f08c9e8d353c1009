//! Clap derive structures for the `unipoll` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// unipoll -- talk to a UniFi controller's JSON API
#[derive(Debug, Parser)]
#[command(
    name = "unipoll",
    version,
    about = "Probe and query UniFi controllers over their JSON API",
    long_about = "Logs in to a UniFi controller (legacy or UniFi OS), keeps the\n\
        session cookie and CSRF token, and issues raw API requests.\n\n\
        Self-signed controllers can be trusted by pinning their certificate.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Controller profile to use
    #[arg(long, short = 'p', env = "UNIPOLL_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Controller URL (overrides profile)
    #[arg(long, short = 'c', env = "UNIPOLL_CONTROLLER", global = true)]
    pub controller: Option<String>,

    /// Login user (overrides profile)
    #[arg(long, short = 'u', env = "UNIPOLL_USERNAME", global = true)]
    pub username: Option<String>,

    /// Pin a certificate by hex SHA-256 (repeatable)
    #[arg(long = "pin", value_name = "SHA256", global = true)]
    pub pins: Vec<String>,

    /// Accept any TLS certificate
    #[arg(long, short = 'k', env = "UNIPOLL_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (0 waits forever)
    #[arg(long, env = "UNIPOLL_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Detect whether the controller speaks the legacy or UniFi OS API
    Probe,

    /// Show controller version and liveness
    Status,

    /// List sites visible to the user
    Sites,

    /// GET an API path (POSTs instead when --data is given)
    Get(RequestArgs),

    /// POST to an API path
    Post(RequestArgs),

    /// PUT to an API path (requires --data)
    Put(RequestArgs),

    /// Print SHA-256 pins for the certificates in PEM files
    Fingerprint(FingerprintArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct RequestArgs {
    /// Logical API path, e.g. /api/s/default/stat/device
    pub path: String,

    /// JSON body, or @file to read it from a file
    #[arg(long, short = 'd')]
    pub data: Option<String>,
}

#[derive(Debug, Args)]
pub struct FingerprintArgs {
    /// PEM certificate files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
