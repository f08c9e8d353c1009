#![allow(clippy::unwrap_used)]
// Loading profiles from TOML files on disk.

use std::io::Write;
use std::time::Duration;

use pretty_assertions::assert_eq;
use unipoll_api::TlsMode;
use unipoll_config::{
    Config, ConfigError, Profile, load_config_from, profile_to_session_config, save_config_to,
};

// sha256("hello world"), the DER body of HELLO_PEM.
const HELLO: &str = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";
const HELLO_PEM: &str = "-----BEGIN CERTIFICATE-----\naGVsbG8gd29ybGQ=\n-----END CERTIFICATE-----\n";

fn write_config(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(body.as_bytes()).unwrap();
    path
}

#[test]
fn loads_profiles_and_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
default_profile = "home"

[defaults]
timeout = 10

[profiles.home]
controller = "https://192.168.1.1"
username = "poller"
password = "plain"
modern_prefix = "/proxy/network"

[profiles.lab]
controller = "https://lab.example:8443"
username = "admin"
password = "x"
verify_ssl = true
timeout = 0
"#,
    );

    let cfg = load_config_from(&path).unwrap();
    assert_eq!(cfg.defaults.timeout, 10);
    assert!(!cfg.defaults.verify_ssl);
    assert_eq!(cfg.profiles.len(), 2);

    let (name, home) = cfg.profile(None).unwrap();
    assert_eq!(name, "home");
    let session = profile_to_session_config(home, name, &cfg.defaults).unwrap();
    assert_eq!(session.base_url.as_str(), "https://192.168.1.1/");
    assert_eq!(session.username, "poller");
    assert_eq!(session.modern_prefix, "/proxy/network");
    assert_eq!(session.transport.timeout, Some(Duration::from_secs(10)));
    assert!(matches!(session.transport.tls, TlsMode::DangerAcceptInvalid));

    let (name, lab) = cfg.profile(Some("lab")).unwrap();
    let session = profile_to_session_config(lab, name, &cfg.defaults).unwrap();
    assert_eq!(session.transport.timeout, None);
    assert_eq!(session.modern_prefix, "/proxy/protect");
    assert!(matches!(session.transport.tls, TlsMode::System));
}

#[test]
fn missing_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(cfg.default_profile.as_deref(), Some("default"));
    assert_eq!(cfg.defaults.timeout, 30);
    assert!(cfg.profiles.is_empty());
}

#[test]
fn malformed_file_is_a_figment_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[profiles.home\ncontroller = ");
    assert!(matches!(load_config_from(&path), Err(ConfigError::Figment(_))));
}

#[test]
fn pem_files_become_pins() {
    let dir = tempfile::tempdir().unwrap();
    let pem = dir.path().join("controller.pem");
    std::fs::write(&pem, HELLO_PEM).unwrap();

    let profile = Profile {
        controller: "https://unifi.local".into(),
        username: Some("admin".into()),
        password: Some("pw".into()),
        pinned_certs: vec![pem],
        fingerprints: vec![HELLO.to_uppercase()],
        ..Profile::default()
    };

    let pins = unipoll_config::resolve_pins(&profile).unwrap();
    assert_eq!(pins.iter().collect::<Vec<_>>(), vec![HELLO]);

    let session = profile_to_session_config(&profile, "pinned", &Config::default().defaults).unwrap();
    assert!(matches!(session.transport.tls, TlsMode::Pinned(_)));
}

#[test]
fn missing_username_is_reported() {
    let profile = Profile {
        controller: "https://unifi.local".into(),
        username: Some(String::new()),
        password: Some("pw".into()),
        ..Profile::default()
    };
    let err = profile_to_session_config(&profile, "nouser", &Config::default().defaults)
        .unwrap_err();
    assert!(matches!(err, ConfigError::NoCredentials { ref profile } if profile == "nouser"));
}

#[test]
fn save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut cfg = Config::default();
    cfg.profiles.insert(
        "default".into(),
        Profile {
            controller: "https://unifi.local".into(),
            username: Some("admin".into()),
            fingerprints: vec![HELLO.into()],
            ..Profile::default()
        },
    );
    save_config_to(&cfg, &path).unwrap();

    let loaded = load_config_from(&path).unwrap();
    let (_, profile) = loaded.profile(None).unwrap();
    assert_eq!(profile.controller, "https://unifi.local");
    assert_eq!(profile.fingerprints, vec![HELLO.to_owned()]);
    assert_eq!(profile.password, None);
}
