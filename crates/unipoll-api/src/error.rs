use std::time::Duration;

use thiserror::Error;

/// Top-level error type for the `unipoll-api` crate.
///
/// Covers every failure mode of the decoding and session layers:
/// payload shape, authentication, status codes, caller input,
/// certificate pinning, and transport. Use [`Error::kind`] to branch on
/// the broad class without matching every variant.
#[derive(Debug, Error)]
pub enum Error {
    // ── Payload ─────────────────────────────────────────────────────
    /// A flexible scalar received a JSON shape it cannot interpret.
    #[error("cannot decode {found} into {target}")]
    UnsupportedShape {
        target: &'static str,
        found: &'static str,
    },

    /// A response body did not match the requested record type.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Server rejection ────────────────────────────────────────────
    /// Login returned anything other than HTTP 200.
    #[error("Authentication failed (user: {username}): {url} (status: {status})")]
    Authentication {
        username: String,
        url: String,
        status: reqwest::StatusCode,
    },

    /// A request returned anything other than HTTP 200. The body is kept
    /// because the controller often explains itself in it.
    #[error("invalid status code from server: {url}: {status}")]
    InvalidStatusCode {
        url: String,
        status: reqwest::StatusCode,
        body: bytes::Bytes,
    },

    /// Error reported inside the `{meta: {rc, msg}}` envelope.
    #[error("API error: {message}")]
    Api { message: String },

    // ── Caller input ────────────────────────────────────────────────
    /// A PUT was requested without a body.
    #[error("requested PUT with no parameters")]
    NoParams,

    /// A site-scoped call was made without naming a site.
    #[error("no site provided for a site-scoped request")]
    NoSiteProvided,

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Security ────────────────────────────────────────────────────
    /// The peer certificate matched none of the pinned fingerprints.
    #[error("certificate signature does not match any pinned fingerprint")]
    InvalidSignature,

    /// TLS configuration or HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Transport ───────────────────────────────────────────────────
    /// Connection failure, DNS failure, or deadline expiry.
    #[error("request to {url} failed after {elapsed:?}: {source}")]
    Transport {
        url: String,
        elapsed: Duration,
        #[source]
        source: reqwest::Error,
    },
}

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller's input was invalid.
    InvalidInput,
    /// The server answered, but refused the request.
    Rejected,
    /// The TLS / pinning layer refused the peer.
    Security,
    /// The payload matched no known shape.
    Payload,
    /// The request never completed.
    Transport,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoParams | Self::NoSiteProvided | Self::InvalidUrl(_) => ErrorKind::InvalidInput,
            Self::Authentication { .. } | Self::InvalidStatusCode { .. } | Self::Api { .. } => {
                ErrorKind::Rejected
            }
            Self::InvalidSignature | Self::Tls(_) => ErrorKind::Security,
            Self::UnsupportedShape { .. } | Self::Deserialization { .. } => ErrorKind::Payload,
            Self::Transport { .. } => ErrorKind::Transport,
        }
    }

    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// Nothing in this crate retries; the flag is for callers.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport { source, .. } => source.is_timeout() || source.is_connect(),
            Self::InvalidStatusCode { status, .. } => status.is_server_error(),
            _ => false,
        }
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<reqwest::StatusCode> {
        match self {
            Self::Authentication { status, .. } | Self::InvalidStatusCode { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_distinguished_from_rejections() {
        assert_eq!(Error::NoParams.kind(), ErrorKind::InvalidInput);
        assert_eq!(Error::NoSiteProvided.kind(), ErrorKind::InvalidInput);
        assert_eq!(Error::InvalidSignature.kind(), ErrorKind::Security);

        let rejected = Error::InvalidStatusCode {
            url: "https://unifi/api/self".into(),
            status: reqwest::StatusCode::FORBIDDEN,
            body: bytes::Bytes::from_static(b"{}"),
        };
        assert_eq!(rejected.kind(), ErrorKind::Rejected);
        assert_eq!(rejected.status(), Some(reqwest::StatusCode::FORBIDDEN));
        assert!(!rejected.is_transient());
    }

    #[test]
    fn unsupported_shape_names_both_sides() {
        let err = Error::UnsupportedShape {
            target: "FlexInt",
            found: "object",
        };
        assert_eq!(err.to_string(), "cannot decode object into FlexInt");
        assert_eq!(err.kind(), ErrorKind::Payload);
    }
}
