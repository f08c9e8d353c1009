// Controller response types
//
// Only the records the session itself needs, plus the access point
// counters that exercise the dual-shape decoder. Everything else is
// decoded by callers into their own types built from the flex scalars.
// Fields use `#[serde(default)]` liberally because presence varies across
// firmware versions.

use serde::{Deserialize, Deserializer, Serialize};

use crate::flex::{FlexBool, FlexInt};
use crate::shape;

// ── Response Envelope ────────────────────────────────────────────────

/// Standard controller response envelope.
///
/// ```json
/// { "meta": { "rc": "ok", "msg": "optional" }, "data": [...] }
/// ```
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub meta: Meta,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// `rc == "ok"` means success.
#[derive(Debug, Clone, Deserialize)]
pub struct Meta {
    pub rc: String,
    #[serde(default)]
    pub msg: Option<String>,
}

/// UniFi OS sometimes answers `{"error":{"code":N,"message":"..."}}` with
/// HTTP 200.
#[derive(Debug, Deserialize)]
pub(crate) struct OsErrorBody {
    pub error: Option<OsError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OsError {
    pub code: u16,
    #[serde(default)]
    pub message: Option<String>,
}

// ── Status ───────────────────────────────────────────────────────────

/// `GET /status`. Older controllers nest these fields under `meta`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerStatus {
    #[serde(default)]
    pub up: FlexBool,
    #[serde(default)]
    pub server_version: String,
    #[serde(default)]
    pub uuid: String,
}

// ── Site ─────────────────────────────────────────────────────────────

/// Site object from `stat/sites`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Site {
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Short name used in site-scoped paths (`default`).
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub num_new_alarms: FlexInt,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── Access point counters ────────────────────────────────────────────

/// Traffic counters of one access point.
///
/// Controllers up to 5.10 send these flat inside the device's `stat`
/// object; 5.11 and later nest them under `stat.ap`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApCounters {
    pub site_id: String,
    /// MAC of the access point.
    pub ap: String,
    pub time: FlexInt,
    pub bytes: FlexInt,
    pub duration: FlexInt,
    pub rx_bytes: FlexInt,
    pub rx_packets: FlexInt,
    pub rx_errors: FlexInt,
    pub rx_dropped: FlexInt,
    pub tx_bytes: FlexInt,
    pub tx_packets: FlexInt,
    pub tx_errors: FlexInt,
    pub tx_dropped: FlexInt,
    pub tx_retries: FlexInt,
    pub wifi_tx_dropped: FlexInt,
    #[serde(rename = "user-rx_bytes")]
    pub user_rx_bytes: FlexInt,
    #[serde(rename = "user-tx_bytes")]
    pub user_tx_bytes: FlexInt,
    #[serde(rename = "guest-rx_bytes")]
    pub guest_rx_bytes: FlexInt,
    #[serde(rename = "guest-tx_bytes")]
    pub guest_tx_bytes: FlexInt,
}

/// The `stat` field of an access point, in either controller shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ApStat(pub ApCounters);

impl<'de> Deserialize<'de> for ApStat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        shape::from_value_dual(value, "ap")
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

/// The handful of access point fields most pollers need.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessPoint {
    #[serde(rename = "_id")]
    pub id: String,
    pub mac: String,
    pub name: String,
    pub model: String,
    pub version: String,
    pub adopted: FlexBool,
    pub state: FlexInt,
    pub uptime: FlexInt,
    pub num_sta: FlexInt,
    pub stat: ApStat,
}
