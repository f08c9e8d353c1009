// unipoll-api: adaptive decoding and authenticated sessions for UniFi controllers

pub mod error;
pub mod flex;
pub mod generation;
pub mod models;
pub mod pinning;
pub mod session;
pub mod shape;
pub mod transport;

pub use error::{Error, ErrorKind};
pub use flex::{FlexBool, FlexInt, FlexString, FlexTemp};
pub use generation::{ApiGeneration, PathResolver};
pub use models::{AccessPoint, ApCounters, ApStat, ServerStatus, Site};
pub use pinning::{PeerVerifier, PinnedFingerprints, PinningVerifier, fingerprint};
pub use session::{Session, SessionConfig};
pub use transport::{TlsMode, TransportConfig};
