// API generation and path resolution
//
// Controllers from firmware 5.12.55 onward (UniFi OS) answer `GET /` with
// 200 and mount the API tree behind a proxy prefix; older controllers
// redirect `/` to `/manage` and serve the API at the root. The session
// probes once, then every outgoing path goes through `PathResolver`.

use std::borrow::Cow;

/// Login path on legacy controllers, and the logical login path callers use.
pub const LOGIN_PATH: &str = "/api/login";
/// Login path on modern (UniFi OS) controllers. Never prefixed.
pub const LOGIN_PATH_MODERN: &str = "/api/auth/login";
pub const LOGOUT_PATH: &str = "/api/logout";
/// Controller version and liveness.
pub const STATUS_PATH: &str = "/status";
pub const SITE_LIST_PATH: &str = "/api/stat/sites";
/// Prefix added to every modern path except login.
pub const MODERN_PREFIX: &str = "/proxy/protect";

/// Which family of controller firmware the server belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApiGeneration {
    /// Paths are used as given.
    #[default]
    Legacy,
    /// Paths are rewritten under the modern prefix.
    Modern,
}

impl ApiGeneration {
    /// Classify a server by the status of an unauthenticated, non-redirected
    /// `GET /`.
    pub fn from_probe_status(status: reqwest::StatusCode) -> Self {
        if status == reqwest::StatusCode::OK {
            Self::Modern
        } else {
            Self::Legacy
        }
    }
}

/// Rewrites logical paths for the detected API generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    generation: ApiGeneration,
    modern_prefix: String,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(ApiGeneration::Legacy)
    }
}

impl PathResolver {
    pub fn new(generation: ApiGeneration) -> Self {
        Self {
            generation,
            modern_prefix: MODERN_PREFIX.into(),
        }
    }

    /// Use a different modern prefix (e.g. `/proxy/network`).
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.modern_prefix = prefix.trim_end_matches('/').to_owned();
        self
    }

    pub fn generation(&self) -> ApiGeneration {
        self.generation
    }

    pub fn modern_prefix(&self) -> &str {
        &self.modern_prefix
    }

    /// Map a logical path to the path to request. Idempotent.
    pub fn resolve<'a>(&self, path: &'a str) -> Cow<'a, str> {
        match self.generation {
            ApiGeneration::Legacy => Cow::Borrowed(path),
            ApiGeneration::Modern if path == LOGIN_PATH => Cow::Borrowed(LOGIN_PATH_MODERN),
            ApiGeneration::Modern
                if path.starts_with(self.modern_prefix.as_str()) || path == LOGIN_PATH_MODERN =>
            {
                Cow::Borrowed(path)
            }
            ApiGeneration::Modern => Cow::Owned(format!("{}{path}", self.modern_prefix)),
        }
    }
}

/// Fill a `{site}` placeholder in a site-scoped path template.
pub fn site_path(template: &str, site_name: &str) -> String {
    template.replace("{site}", site_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    const DEVICES: &str = "/api/s/default/stat/device";

    #[test]
    fn legacy_leaves_paths_alone() {
        let r = PathResolver::new(ApiGeneration::Legacy);
        assert_eq!(r.resolve(LOGIN_PATH), LOGIN_PATH);
        assert_eq!(r.resolve(DEVICES), DEVICES);
        assert_eq!(r.resolve("/proxy/protect/api/x"), "/proxy/protect/api/x");
    }

    #[test]
    fn modern_swaps_login_and_prefixes_the_rest() {
        let r = PathResolver::new(ApiGeneration::Modern);
        assert_eq!(r.resolve(LOGIN_PATH), "/api/auth/login");
        assert_eq!(r.resolve(LOGIN_PATH_MODERN), "/api/auth/login");
        assert_eq!(r.resolve(DEVICES), "/proxy/protect/api/s/default/stat/device");
        assert_eq!(r.resolve(LOGOUT_PATH), "/proxy/protect/api/logout");
        assert_eq!(r.resolve(STATUS_PATH), "/proxy/protect/status");
    }

    #[test]
    fn modern_resolution_is_idempotent() {
        let r = PathResolver::new(ApiGeneration::Modern);
        for path in [LOGIN_PATH, DEVICES, "/api/cameras", "/status"] {
            let once = r.resolve(path).into_owned();
            assert_eq!(r.resolve(&once), once);
        }
    }

    #[test]
    fn custom_prefix() {
        let r = PathResolver::new(ApiGeneration::Modern).with_prefix("/proxy/network/");
        assert_eq!(r.modern_prefix(), "/proxy/network");
        assert_eq!(r.resolve(DEVICES), "/proxy/network/api/s/default/stat/device");
        assert_eq!(r.resolve(LOGIN_PATH), LOGIN_PATH_MODERN);
    }

    #[test]
    fn probe_status_classification() {
        assert_eq!(ApiGeneration::from_probe_status(StatusCode::OK), ApiGeneration::Modern);
        assert_eq!(ApiGeneration::from_probe_status(StatusCode::FOUND), ApiGeneration::Legacy);
        assert_eq!(
            ApiGeneration::from_probe_status(StatusCode::NOT_FOUND),
            ApiGeneration::Legacy
        );
    }

    #[test]
    fn site_template() {
        assert_eq!(site_path("/api/s/{site}/stat/device", "default"), DEVICES);
    }
}
