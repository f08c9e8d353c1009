//! Command dispatch: bridges CLI args to session calls and stdout.

pub mod controller;
pub mod fingerprint;
pub mod raw;

use unipoll_api::Session;

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;

/// Dispatch a controller-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Probe => controller::probe(global).await,
        Command::Status => controller::status(global).await,
        Command::Sites => controller::sites(global).await,
        Command::Get(args) => raw::get(global, args).await,
        Command::Post(args) => raw::post(global, args).await,
        Command::Put(args) => raw::put(global, args).await,
        Command::Fingerprint(args) => fingerprint::handle(&args),
        // Handled before dispatch
        Command::Completions(_) => Ok(()),
    }
}

/// Probe the generation and log in.
pub(crate) async fn connect(global: &GlobalOpts) -> Result<Session, CliError> {
    let session_config = config::session_config(global)?;
    Ok(Session::connect(session_config).await?)
}

/// Best-effort logout; the command's own result matters more.
pub(crate) async fn disconnect(session: &Session) {
    if let Err(e) = session.logout().await {
        tracing::warn!("logout failed: {e}");
    }
}

/// Print a response body, pretty-printed when it is JSON.
pub(crate) fn print_body(body: &[u8]) {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value) => println!(
            "{}",
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
        ),
        Err(_) => println!("{}", String::from_utf8_lossy(body)),
    }
}
