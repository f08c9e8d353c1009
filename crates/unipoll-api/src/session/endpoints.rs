// Built-in controller endpoints

use serde::de::DeserializeOwned;
use tracing::debug;

use super::Session;
use crate::error::Error;
use crate::generation::{SITE_LIST_PATH, STATUS_PATH, site_path};
use crate::models::{Envelope, OsErrorBody, ServerStatus, Site};
use crate::shape;

impl Session {
    /// Controller version and liveness. Older firmware nests the fields
    /// under `meta`.
    pub async fn server_status(&self) -> Result<ServerStatus, Error> {
        self.get_dual(STATUS_PATH, "meta").await
    }

    /// List the sites visible to the logged-in user.
    pub async fn sites(&self) -> Result<Vec<Site>, Error> {
        let body = self.get_json(SITE_LIST_PATH, None).await?;
        let sites: Vec<Site> = unwrap_envelope(&body)?;
        debug!(count = sites.len(), "listed sites");
        Ok(sites)
    }

    /// GET a site-scoped path template such as `/api/s/{site}/stat/device`
    /// and unwrap the `data` array.
    pub async fn site_data<T: DeserializeOwned>(
        &self,
        template: &str,
        site: Option<&Site>,
    ) -> Result<Vec<T>, Error> {
        let site = site
            .filter(|s| !s.name.is_empty())
            .ok_or(Error::NoSiteProvided)?;
        let path = site_path(template, &site.name);
        let body = self.get_json(&path, None).await?;
        unwrap_envelope(&body)
    }
}

/// Strip the `{meta, data}` envelope, turning `meta.rc != "ok"` and the
/// UniFi OS `{"error": ...}` shape into [`Error::Api`].
pub(crate) fn unwrap_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<Vec<T>, Error> {
    if let Ok(OsErrorBody { error: Some(err) }) = serde_json::from_slice::<OsErrorBody>(body) {
        let msg = err.message.unwrap_or_default();
        return Err(Error::Api {
            message: format!("UniFi OS error {}: {msg}", err.code),
        });
    }

    let envelope: Envelope<T> = shape::decode(body)?;
    match envelope.meta.rc.as_str() {
        "ok" => Ok(envelope.data),
        _ => Err(Error::Api {
            message: envelope
                .meta
                .msg
                .unwrap_or_else(|| format!("rc={}", envelope.meta.rc)),
        }),
    }
}
