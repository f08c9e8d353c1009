//! Commands that use the session's built-in endpoints.

use unipoll_api::{ApiGeneration, Session};

use super::{connect, disconnect};
use crate::cli::GlobalOpts;
use crate::config;
use crate::error::CliError;

pub async fn probe(global: &GlobalOpts) -> Result<(), CliError> {
    let session = Session::new(config::anonymous_session_config(global)?)?;
    let generation = session.detect_generation().await?;
    let resolver = session.resolver();

    match generation {
        ApiGeneration::Legacy => println!("{}: legacy controller", session.base_url()),
        ApiGeneration::Modern => println!(
            "{}: UniFi OS (paths under {})",
            session.base_url(),
            resolver.modern_prefix()
        ),
    }
    println!(
        "login path: {}",
        resolver.resolve(unipoll_api::generation::LOGIN_PATH)
    );
    Ok(())
}

/// `/status` answers without a login on every firmware.
pub async fn status(global: &GlobalOpts) -> Result<(), CliError> {
    let session = Session::new(config::anonymous_session_config(global)?)?;
    session.detect_generation().await?;
    let status = session.server_status().await?;

    println!("up:      {}", status.up.value);
    if !status.server_version.is_empty() {
        println!("version: {}", status.server_version);
    }
    if !status.uuid.is_empty() {
        println!("uuid:    {}", status.uuid);
    }
    Ok(())
}

pub async fn sites(global: &GlobalOpts) -> Result<(), CliError> {
    let session = connect(global).await?;
    let result = session.sites().await;
    disconnect(&session).await;

    for site in result? {
        if site.desc.is_empty() {
            println!("{}", site.name);
        } else {
            println!("{}\t{}", site.name, site.desc);
        }
    }
    Ok(())
}
