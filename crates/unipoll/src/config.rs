//! Profile selection and CLI flag overrides on top of `unipoll-config`.

use secrecy::SecretString;
use unipoll_api::SessionConfig;
use unipoll_config::{Config, ConfigError, Profile};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// The active profile after flag overrides, plus the name it goes by.
pub struct Resolved {
    pub name: String,
    pub profile: Profile,
    pub config: Config,
}

/// Load the config file and pick the profile named by `--profile`, the
/// config's default, or an empty one when flags alone describe the
/// controller.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let config = unipoll_config::load_config()?;

    let (name, mut profile) = match config.profile(global.profile.as_deref()) {
        Ok((name, profile)) => (name.to_owned(), profile.clone()),
        Err(ConfigError::ProfileNotFound { name }) if global.profile.is_some() => {
            let mut available: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        Err(ConfigError::ProfileNotFound { name }) => (name, Profile::default()),
        Err(other) => return Err(other.into()),
    };

    apply_overrides(&mut profile, global);
    if profile.controller.is_empty() {
        return Err(CliError::NoConfig {
            path: unipoll_config::config_path().display().to_string(),
        });
    }

    tracing::debug!(profile = %name, controller = %profile.controller, "resolved profile");
    Ok(Resolved {
        name,
        profile,
        config,
    })
}

/// Session config with resolved credentials, for commands that log in.
pub fn session_config(global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let r = resolve(global)?;
    Ok(unipoll_config::profile_to_session_config(
        &r.profile,
        &r.name,
        &r.config.defaults,
    )?)
}

/// Session config for commands that never log in.
pub fn anonymous_session_config(global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let r = resolve(global)?;
    let username = r.profile.username.clone().unwrap_or_default();
    Ok(unipoll_config::session_config(
        &r.profile,
        &r.config.defaults,
        username,
        SecretString::from(String::new()),
    )?)
}

fn apply_overrides(profile: &mut Profile, global: &GlobalOpts) {
    if let Some(ref controller) = global.controller {
        profile.controller.clone_from(controller);
    }
    if let Some(ref username) = global.username {
        profile.username = Some(username.clone());
    }
    if global.insecure {
        profile.verify_ssl = Some(false);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }
    profile.fingerprints.extend(global.pins.iter().cloned());
}
