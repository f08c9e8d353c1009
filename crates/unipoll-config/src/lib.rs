//! Configuration for unipoll.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! certificate pins, and translation to `unipoll_api::SessionConfig`.
//! The CLI layers its flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use unipoll_api::generation::MODERN_PREFIX;
use unipoll_api::{PinnedFingerprints, SessionConfig, TlsMode, TransportConfig};

/// Service name for keyring entries.
pub const KEYRING_SERVICE: &str = "unipoll";
/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "UNIPOLL_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found in config")]
    ProfileNotFound { name: String },

    #[error("failed to read {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid certificate pin: {0}")]
    Pin(#[from] unipoll_api::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is named.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named controller profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile by name, falling back to `default_profile`.
    pub fn profile<'a>(&'a self, name: Option<&'a str>) -> Result<(&'a str, &'a Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get(name)
            .map(|p| (name, p))
            .ok_or_else(|| ConfigError::ProfileNotFound { name: name.into() })
    }
}

/// Settings a profile inherits unless it overrides them.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    /// Validate the controller certificate against the system store.
    #[serde(default)]
    pub verify_ssl: bool,

    /// Per-request deadline in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_modern_prefix")]
    pub modern_prefix: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            verify_ssl: false,
            timeout: default_timeout(),
            modern_prefix: default_modern_prefix(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_modern_prefix() -> String {
    MODERN_PREFIX.into()
}

/// A named controller profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Controller base URL (e.g., "https://192.168.1.1").
    pub controller: String,

    pub username: Option<String>,

    /// Password (plaintext, prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    pub verify_ssl: Option<bool>,

    /// Custom CA certificate, used when `verify_ssl` is on.
    pub ca_cert: Option<PathBuf>,

    /// PEM files whose certificates are pinned.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pinned_certs: Vec<PathBuf>,

    /// Hex SHA-256 fingerprints, `:` separators allowed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fingerprints: Vec<String>,

    /// Override timeout, seconds. `0` waits forever.
    pub timeout: Option<u64>,

    pub modern_prefix: Option<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "unipoll", "unipoll").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("unipoll");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the platform config file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults, then `path` (if it exists), then `UNIPOLL_` env vars.
///
/// Nested keys use a double underscore: `UNIPOLL_DEFAULTS__TIMEOUT=5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML at `path`, creating parent directories.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve username and password for a profile.
///
/// Username: profile, then `UNIPOLL_USERNAME`. Password: the profile's
/// `password_env` variable, `UNIPOLL_PASSWORD`, the system keyring
/// (`unipoll` / `<profile>/password`), then plaintext.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<(String, SecretString), ConfigError> {
    let username = profile
        .username
        .clone()
        .or_else(|| std::env::var("UNIPOLL_USERNAME").ok())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;

    let password = resolve_password(profile, profile_name).ok_or_else(|| {
        ConfigError::NoCredentials {
            profile: profile_name.into(),
        }
    })?;

    Ok((username, password))
}

fn resolve_password(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Profile's password_env → env var lookup
    if let Some(ref env_name) = profile.password_env {
        if let Ok(pw) = std::env::var(env_name) {
            return Some(SecretString::from(pw));
        }
    }

    // 2. Global env var
    if let Ok(pw) = std::env::var("UNIPOLL_PASSWORD") {
        return Some(SecretString::from(pw));
    }

    // 3. Keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Some(SecretString::from(pw));
        }
    }

    // 4. Plaintext in config
    profile.password.clone().map(SecretString::from)
}

/// Collect pins from the profile's PEM files and hex fingerprints.
pub fn resolve_pins(profile: &Profile) -> Result<PinnedFingerprints, ConfigError> {
    let mut pins = PinnedFingerprints::from_hex(&profile.fingerprints)?;
    for path in &profile.pinned_certs {
        let pem = std::fs::read(path).map_err(|source| ConfigError::ReadFile {
            path: path.clone(),
            source,
        })?;
        pins.extend(PinnedFingerprints::from_pem(&pem)?);
    }
    Ok(pins)
}

/// Choose the TLS mode: pins win, then `verify_ssl` (with an optional
/// custom CA), otherwise accept the controller's self-signed cert.
pub fn resolve_tls(profile: &Profile, defaults: &Defaults) -> Result<TlsMode, ConfigError> {
    let pins = resolve_pins(profile)?;
    if !pins.is_empty() {
        return Ok(TlsMode::Pinned(std::sync::Arc::new(pins)));
    }

    if profile.verify_ssl.unwrap_or(defaults.verify_ssl) {
        return Ok(profile
            .ca_cert
            .clone()
            .map_or(TlsMode::System, TlsMode::CustomCa));
    }

    Ok(TlsMode::DangerAcceptInvalid)
}

/// Build a `SessionConfig` from a profile, with no CLI overrides.
pub fn profile_to_session_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<SessionConfig, ConfigError> {
    let (username, password) = resolve_credentials(profile, profile_name)?;
    session_config(profile, defaults, username, password)
}

/// Build a `SessionConfig` with explicit credentials. Flows that never log
/// in (the generation probe) pass empty ones.
pub fn session_config(
    profile: &Profile,
    defaults: &Defaults,
    username: String,
    password: SecretString,
) -> Result<SessionConfig, ConfigError> {
    let url: url::Url = profile
        .controller
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "controller".into(),
            reason: format!("invalid URL: {}", profile.controller),
        })?;

    let timeout = match profile.timeout.unwrap_or(defaults.timeout) {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let transport = TransportConfig {
        tls: resolve_tls(profile, defaults)?,
        timeout,
        cookie_jar: None,
    };

    let prefix = profile
        .modern_prefix
        .clone()
        .unwrap_or_else(|| defaults.modern_prefix.clone());

    Ok(SessionConfig::new(url, username, password)
        .with_transport(transport)
        .with_modern_prefix(prefix))
}
