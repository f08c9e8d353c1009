// Authenticated controller session
//
// Wraps `reqwest::Client` with the cookie jar, CSRF replay, and
// generation-aware path resolution. Auth flows, the request wrapper, and
// the few built-in endpoints are implemented as inherent methods in
// separate files to keep this module focused on state.

mod auth;
mod endpoints;
mod request;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::cookie::{CookieStore, Jar};
use secrecy::SecretString;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::generation::{ApiGeneration, MODERN_PREFIX, PathResolver};
use crate::transport::TransportConfig;

/// Everything needed to open a [`Session`].
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Controller root, e.g. `https://192.168.1.1` or `https://unifi:8443`.
    pub base_url: Url,
    pub username: String,
    pub password: SecretString,
    pub transport: TransportConfig,
    /// Prefix for modern-generation paths.
    pub modern_prefix: String,
}

impl SessionConfig {
    pub fn new(base_url: Url, username: impl Into<String>, password: SecretString) -> Self {
        Self {
            base_url,
            username: username.into(),
            password,
            transport: TransportConfig::default(),
            modern_prefix: MODERN_PREFIX.into(),
        }
    }

    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    pub fn with_modern_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.modern_prefix = prefix.into();
        self
    }
}

/// The only session fields that change after construction.
#[derive(Debug, Default)]
struct SessionState {
    csrf_token: Option<String>,
    generation: ApiGeneration,
}

/// An authenticated connection to one controller.
///
/// Safe to share across tasks behind an `Arc`: the HTTP client and cookie
/// jar are concurrent, and the CSRF token and API generation sit behind a
/// single lock that is never held across an `.await`.
pub struct Session {
    http: reqwest::Client,
    base_url: Url,
    username: String,
    password: SecretString,
    transport: TransportConfig,
    modern_prefix: String,
    cookie_jar: Arc<Jar>,
    state: Mutex<SessionState>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Build a session without touching the network.
    ///
    /// The generation starts as [`ApiGeneration::Legacy`]; call
    /// [`detect_generation`](Self::detect_generation) and
    /// [`login`](Self::login), or use [`connect`](Self::connect).
    pub fn new(config: SessionConfig) -> Result<Self, Error> {
        let transport = if config.transport.cookie_jar.is_some() {
            config.transport
        } else {
            config.transport.with_cookie_jar()
        };
        let cookie_jar = transport
            .cookie_jar
            .clone()
            .unwrap_or_else(|| Arc::new(Jar::default()));
        let http = transport.build_client()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            username: config.username,
            password: config.password,
            transport,
            modern_prefix: config.modern_prefix,
            cookie_jar,
            state: Mutex::new(SessionState::default()),
        })
    }

    /// Probe the API generation, then log in.
    pub async fn connect(config: SessionConfig) -> Result<Self, Error> {
        let session = Self::new(config)?;
        session.detect_generation().await?;
        session.login().await?;
        Ok(session)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The underlying HTTP client (for flows that need direct access).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn generation(&self) -> ApiGeneration {
        self.state().generation
    }

    /// Resolver for the generation detected so far.
    pub fn resolver(&self) -> PathResolver {
        PathResolver::new(self.generation()).with_prefix(self.modern_prefix.as_str())
    }

    /// The last CSRF token the controller handed out.
    pub fn csrf_token(&self) -> Option<String> {
        self.state().csrf_token.clone()
    }

    /// The `Cookie` header value currently stored for the controller.
    pub fn cookie_header(&self) -> Option<String> {
        let cookies = self.cookie_jar.cookies(&self.base_url)?;
        cookies.to_str().ok().map(String::from)
    }

    // ── State ────────────────────────────────────────────────────────

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn set_generation(&self, generation: ApiGeneration) {
        self.state().generation = generation;
    }

    /// Remember a rotated CSRF token. Prefers `X-Updated-CSRF-Token`.
    pub(crate) fn update_csrf_from_headers(&self, headers: &reqwest::header::HeaderMap) {
        let token = headers
            .get("X-Updated-CSRF-Token")
            .or_else(|| headers.get("X-CSRF-Token"))
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty());

        if let Some(token) = token {
            let mut state = self.state();
            if state.csrf_token.as_deref() != Some(token) {
                trace!("CSRF token rotated");
                state.csrf_token = Some(token.to_owned());
            }
        }
    }

    /// Number of cookies the jar would send to `url`.
    fn cookie_count(&self, url: &Url) -> usize {
        self.cookie_jar
            .cookies(url)
            .and_then(|v| v.to_str().map(|s| s.split("; ").count()).ok())
            .unwrap_or(0)
    }

    /// Full URL for a logical path, after generation rewriting.
    pub(crate) fn url_for(&self, path: &str) -> Result<Url, Error> {
        let path = if path.starts_with('/') {
            path.to_owned()
        } else {
            format!("/{path}")
        };
        let resolved = self.resolver().resolve(&path).into_owned();
        let base = self.base_url.as_str().trim_end_matches('/');
        let url = Url::parse(&format!("{base}{resolved}"))?;
        debug!(logical = %path, %url, "resolved path");
        Ok(url)
    }
}
