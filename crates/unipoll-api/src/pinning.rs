// Certificate pinning
//
// Controllers usually serve self-signed certificates. Instead of turning
// verification off, callers can pin the SHA-256 of the certificate they
// expect. When pins are configured, the pin check replaces chain-of-trust
// validation entirely; handshake signatures are still verified with the
// crypto provider's algorithms.

use std::error::Error as StdError;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
use rustls::{CertificateError, DigitallySignedStruct, OtherError, SignatureScheme};
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::error::Error;

/// Lowercase hex SHA-256 of a DER-encoded certificate.
pub fn fingerprint(der: &[u8]) -> String {
    hex::encode(Sha256::digest(der))
}

/// Strategy invoked with the raw certificates the peer offered, leaf first.
///
/// Injected into the transport through [`TlsMode::Pinned`](crate::TlsMode::Pinned).
pub trait PeerVerifier: std::fmt::Debug + Send + Sync {
    fn verify_peer(&self, chain: &[&[u8]]) -> Result<(), Error>;
}

/// Ordered, de-duplicated set of pinned SHA-256 fingerprints.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinnedFingerprints {
    digests: Vec<String>,
}

impl PinnedFingerprints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept hex digests in any case, with or without `:` separators.
    pub fn from_hex<I, S>(digests: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut pins = Self::new();
        for raw in digests {
            let raw = raw.as_ref();
            let digest: String = raw
                .chars()
                .filter(|c| *c != ':' && !c.is_whitespace())
                .collect::<String>()
                .to_ascii_lowercase();
            if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(Error::Tls(format!("invalid SHA-256 fingerprint: {raw:?}")));
            }
            pins.insert(digest);
        }
        Ok(pins)
    }

    /// Pin every certificate found in a PEM bundle.
    pub fn from_pem(pem: &[u8]) -> Result<Self, Error> {
        let mut pins = Self::new();
        for cert in CertificateDer::pem_slice_iter(pem) {
            let cert = cert.map_err(|e| Error::Tls(format!("invalid PEM certificate: {e}")))?;
            pins.insert(fingerprint(&cert));
        }
        if pins.is_empty() {
            return Err(Error::Tls("no certificates found in PEM data".into()));
        }
        Ok(pins)
    }

    pub fn insert(&mut self, digest: String) {
        if !self.contains(&digest) {
            self.digests.push(digest);
        }
    }

    pub fn extend(&mut self, other: Self) {
        for digest in other.digests {
            self.insert(digest);
        }
    }

    pub fn contains(&self, digest: &str) -> bool {
        self.digests.iter().any(|d| d == digest)
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.digests.iter().map(String::as_str)
    }

    /// Succeeds if any offered certificate is pinned. An empty set
    /// accepts everything.
    pub fn verify(&self, chain: &[&[u8]]) -> Result<(), Error> {
        if self.is_empty() {
            return Ok(());
        }
        if chain.iter().any(|der| self.contains(&fingerprint(der))) {
            return Ok(());
        }
        Err(Error::InvalidSignature)
    }
}

impl PeerVerifier for PinnedFingerprints {
    fn verify_peer(&self, chain: &[&[u8]]) -> Result<(), Error> {
        self.verify(chain)
    }
}

/// rustls adapter that hands the peer's certificates to a [`PeerVerifier`].
#[derive(Debug)]
pub struct PinningVerifier {
    peer: Arc<dyn PeerVerifier>,
    provider: Arc<CryptoProvider>,
}

impl PinningVerifier {
    pub fn new(peer: Arc<dyn PeerVerifier>, provider: Arc<CryptoProvider>) -> Self {
        Self { peer, provider }
    }
}

impl ServerCertVerifier for PinningVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        let chain: Vec<&[u8]> = std::iter::once(end_entity)
            .chain(intermediates)
            .map(|cert| &**cert)
            .collect();

        match self.peer.verify_peer(&chain) {
            Ok(()) => {
                debug!(server = ?server_name, "pinned certificate accepted");
                Ok(ServerCertVerified::assertion())
            }
            Err(err) => {
                warn!(server = ?server_name, "certificate rejected: {err}");
                Err(rustls::Error::InvalidCertificate(CertificateError::Other(
                    OtherError(Arc::new(err)),
                )))
            }
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}

/// Whether an error chain bottoms out in a pin rejection from
/// [`PinningVerifier`]. The HTTP client wraps the TLS error in nested
/// `io::Error`s, and `io::Error::source` skips the error it wraps, so each
/// `io::Error` layer is unwrapped explicitly.
pub(crate) fn is_pin_rejection(err: &(dyn StdError + 'static)) -> bool {
    if is_rustls_pin_rejection(err) {
        return true;
    }
    match err
        .downcast_ref::<std::io::Error>()
        .and_then(std::io::Error::get_ref)
    {
        Some(inner) if is_pin_rejection(inner) => true,
        _ => err.source().is_some_and(is_pin_rejection),
    }
}

fn is_rustls_pin_rejection(err: &(dyn StdError + 'static)) -> bool {
    match err.downcast_ref::<rustls::Error>() {
        Some(rustls::Error::InvalidCertificate(CertificateError::Other(other))) => {
            matches!(other.0.downcast_ref::<Error>(), Some(Error::InvalidSignature))
        }
        _ => false,
    }
}
