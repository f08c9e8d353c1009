//! CLI error types with miette diagnostics.
//!
//! Maps library and config errors into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use unipoll_api::Error as ApiError;
use unipoll_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const REJECTED: i32 = 4;
    pub const SECURITY: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to controller at {url}")]
    #[diagnostic(
        code(unipoll::connection_failed),
        help(
            "Check that the controller is running and reachable.\n\
             Try: unipoll probe --controller {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: ApiError,
    },

    #[error("Request to {url} timed out after {seconds:.1}s")]
    #[diagnostic(
        code(unipoll::timeout),
        help("Increase the deadline with --timeout, or 0 to wait forever.")
    )]
    Timeout { url: String, seconds: f64 },

    // ── Security ─────────────────────────────────────────────────────
    #[error("Controller certificate does not match any pinned fingerprint")]
    #[diagnostic(
        code(unipoll::pin_mismatch),
        help(
            "The controller presented a different certificate than the one pinned.\n\
             Compute the current pin with: unipoll fingerprint <cert.pem>"
        )
    )]
    PinMismatch,

    #[error("TLS setup failed: {message}")]
    #[diagnostic(code(unipoll::tls))]
    Tls { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed for '{username}' ({status})")]
    #[diagnostic(
        code(unipoll::auth_failed),
        help(
            "Check the username and password.\n\
             Passwords are read from password_env, UNIPOLL_PASSWORD, the keyring, \
             or the profile, in that order."
        )
    )]
    AuthFailed { username: String, status: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(unipoll::no_credentials),
        help("Set username and password in the profile, or UNIPOLL_USERNAME and UNIPOLL_PASSWORD.")
    )]
    NoCredentials { profile: String },

    // ── Controller ───────────────────────────────────────────────────
    #[error("Controller answered {status} for {url}")]
    #[diagnostic(code(unipoll::status))]
    Status {
        url: String,
        status: String,
        #[help]
        body: Option<String>,
    },

    #[error("API error: {message}")]
    #[diagnostic(code(unipoll::api_error))]
    Api { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(unipoll::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(unipoll::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No controller configured")]
    #[diagnostic(
        code(unipoll::no_config),
        help(
            "Pass --controller, or add a profile to the config file.\n\
             Expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(unipoll::config))]
    Config(ConfigError),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(unipoll::json), help("Check the --data value and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::PinMismatch | Self::Tls { .. } => exit_code::SECURITY,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::Status { .. } | Self::Api { .. } => exit_code::REJECTED,
            Self::Validation { .. } | Self::Json(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── Library error mapping ────────────────────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Authentication {
                username, status, ..
            } => Self::AuthFailed {
                username,
                status: status.to_string(),
            },
            ApiError::InvalidSignature => Self::PinMismatch,
            ApiError::Tls(message) => Self::Tls { message },
            ApiError::Transport {
                ref url,
                elapsed,
                ref source,
            } if source.is_timeout() => Self::Timeout {
                url: url.clone(),
                seconds: elapsed.as_secs_f64(),
            },
            ApiError::Transport { ref url, .. } => Self::ConnectionFailed {
                url: url.clone(),
                source: err,
            },
            ApiError::InvalidStatusCode { url, status, body } => Self::Status {
                url,
                status: status.to_string(),
                body: (!body.is_empty())
                    .then(|| String::from_utf8_lossy(&body).chars().take(300).collect()),
            },
            ApiError::NoParams => Self::Validation {
                field: "--data".into(),
                reason: "PUT needs a request body".into(),
            },
            ApiError::NoSiteProvided => Self::Validation {
                field: "site".into(),
                reason: "a site is required for this path".into(),
            },
            ApiError::InvalidUrl(e) => Self::Validation {
                field: "path".into(),
                reason: e.to_string(),
            },
            other => Self::Api {
                message: other.to_string(),
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::ProfileNotFound { name } => Self::ProfileNotFound {
                name,
                available: String::new(),
            },
            other => Self::Config(other),
        }
    }
}
