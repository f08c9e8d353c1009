#![allow(clippy::unwrap_used)]
// Certificate pinning over a real TLS handshake against a local rustls server.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use std::time::Duration;

use rustls::{ServerConfig, ServerConnection, StreamOwned};
use rustls_pki_types::pem::PemObject;
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use url::Url;

use unipoll_api::{
    ApiGeneration, Error, ErrorKind, PinnedFingerprints, Session, SessionConfig, TransportConfig,
};

// Self-signed P-256 certificate for CN=unifi.local, IP:127.0.0.1.
const CERT_PEM: &[u8] = include_bytes!("fixtures/controller.pem");
const KEY_PEM: &[u8] = include_bytes!("fixtures/controller.key");

// ── Helpers ─────────────────────────────────────────────────────────

fn server_config() -> Arc<ServerConfig> {
    let certs = CertificateDer::pem_slice_iter(CERT_PEM)
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    let key = PrivateKeyDer::from_pem_slice(KEY_PEM).unwrap();
    let config =
        ServerConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()
            .unwrap()
            .with_no_client_auth()
            .with_single_cert(certs, key)
            .unwrap();
    Arc::new(config)
}

/// Accept one TLS connection and answer its first request with an empty 200.
fn serve_once() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let config = server_config();

    std::thread::spawn(move || {
        let Ok((tcp, _)) = listener.accept() else {
            return;
        };
        let conn = ServerConnection::new(config).unwrap();
        let mut tls = StreamOwned::new(conn, tcp);

        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match tls.read(&mut chunk) {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&chunk[..n]),
            }
        }

        let _ = tls.write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
        tls.conn.send_close_notify();
        let _ = tls.flush();
    });

    addr
}

fn pinned_session(addr: SocketAddr, pins: PinnedFingerprints) -> Session {
    let transport = TransportConfig {
        timeout: Some(Duration::from_secs(5)),
        ..TransportConfig::default()
    }
    .with_pins(pins);
    let config = SessionConfig::new(
        Url::parse(&format!("https://{addr}")).unwrap(),
        "admin",
        "hunter2".to_string().into(),
    )
    .with_transport(transport);
    Session::new(config).unwrap()
}

// ── Handshake ───────────────────────────────────────────────────────

#[tokio::test]
async fn matching_pin_completes_the_handshake() {
    let addr = serve_once();
    let pins = PinnedFingerprints::from_pem(CERT_PEM).unwrap();

    let generation = pinned_session(addr, pins).detect_generation().await.unwrap();

    assert_eq!(generation, ApiGeneration::Modern);
}

#[tokio::test]
async fn mismatched_pin_is_a_security_failure() {
    let addr = serve_once();
    let pins = PinnedFingerprints::from_hex(["00".repeat(32)]).unwrap();

    let err = pinned_session(addr, pins)
        .detect_generation()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidSignature), "got {err:?}");
    assert_eq!(err.kind(), ErrorKind::Security);
    assert!(!err.is_transient());
}
