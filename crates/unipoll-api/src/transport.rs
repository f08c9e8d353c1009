// Shared transport configuration for building reqwest::Client instances.
//
// The session client and the generation probe share TLS and timeout
// settings through this module. The probe client differs only in having
// no cookie jar and never following redirects.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::redirect::Policy;

use crate::error::Error;
use crate::pinning::{PeerVerifier, PinnedFingerprints, PinningVerifier};

const USER_AGENT: &str = concat!("unipoll/", env!("CARGO_PKG_VERSION"));

/// How the server certificate is checked.
#[derive(Debug, Clone)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (for self-signed controllers).
    DangerAcceptInvalid,
    /// Replace chain validation with a pin check.
    Pinned(Arc<dyn PeerVerifier>),
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Deadline for each request. `None` waits forever.
    pub timeout: Option<Duration>,
    pub cookie_jar: Option<Arc<Jar>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::DangerAcceptInvalid,
            timeout: Some(Duration::from_secs(30)),
            cookie_jar: None,
        }
    }
}

impl TransportConfig {
    /// Build the session client: cookie jar (if any), default redirects.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = self.builder()?;
        if let Some(ref jar) = self.cookie_jar {
            builder = builder.cookie_provider(Arc::clone(jar));
        }
        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }

    /// Build the generation-probe client: no cookies, no redirects.
    pub fn build_probe_client(&self) -> Result<reqwest::Client, Error> {
        self.builder()?
            .redirect(Policy::none())
            .build()
            .map_err(|e| Error::Tls(format!("failed to build probe client: {e}")))
    }

    /// Create a config with a fresh cookie jar (for session auth).
    pub fn with_cookie_jar(mut self) -> Self {
        self.cookie_jar = Some(Arc::new(Jar::default()));
        self
    }

    /// Pin the given fingerprints. An empty set leaves the TLS mode alone.
    /// With the default mode that is `DangerAcceptInvalid`, so any
    /// certificate is accepted.
    pub fn with_pins(mut self, pins: PinnedFingerprints) -> Self {
        if !pins.is_empty() {
            self.tls = TlsMode::Pinned(Arc::new(pins));
        }
        self
    }

    fn builder(&self) -> Result<reqwest::ClientBuilder, Error> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
            TlsMode::Pinned(peer) => {
                builder = builder.use_preconfigured_tls(pinned_tls_config(Arc::clone(peer))?);
            }
        }

        Ok(builder)
    }
}

fn pinned_tls_config(peer: Arc<dyn PeerVerifier>) -> Result<rustls::ClientConfig, Error> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let verifier = PinningVerifier::new(peer, Arc::clone(&provider));
    let config = rustls::ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()
        .map_err(|e| Error::Tls(format!("unsupported TLS protocol versions: {e}")))?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_no_client_auth();
    Ok(config)
}
