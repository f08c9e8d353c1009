// Generation probe, login and logout

use std::time::Instant;

use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use tracing::{debug, info};

use super::Session;
use super::request::transport_error;
use crate::error::Error;
use crate::generation::{ApiGeneration, LOGIN_PATH, LOGOUT_PATH};

impl Session {
    /// Classify the controller with one unauthenticated `GET /`.
    ///
    /// Uses a separate client with the same TLS settings but no cookie
    /// jar and no redirects: modern firmware answers 200, older firmware
    /// redirects to `/manage`.
    pub async fn detect_generation(&self) -> Result<ApiGeneration, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let url = url::Url::parse(&format!("{base}/"))?;
        debug!(%url, "probing API generation");

        let probe = self.transport.build_probe_client()?;
        let start = Instant::now();
        let resp = probe
            .get(url.clone())
            .send()
            .await
            .map_err(|e| transport_error(&url, start, e))?;

        let generation = ApiGeneration::from_probe_status(resp.status());
        self.set_generation(generation);
        info!(
            %url,
            status = resp.status().as_u16(),
            ?generation,
            "detected API generation"
        );
        Ok(generation)
    }

    /// Authenticate with username and password.
    ///
    /// The session cookie lands in the jar; a CSRF token in the response
    /// headers is captured for every later request.
    pub async fn login(&self) -> Result<(), Error> {
        let body = serde_json::json!({
            "username": self.username,
            "password": self.password.expose_secret(),
        })
        .to_string();

        let resp = self.dispatch(Method::POST, LOGIN_PATH, Some(body)).await?;
        if resp.status != StatusCode::OK {
            return Err(Error::Authentication {
                username: self.username.clone(),
                url: resp.url,
                status: resp.status,
            });
        }

        debug!(
            user = %self.username,
            csrf = self.csrf_token().is_some(),
            "login successful"
        );
        Ok(())
    }

    /// End the server-side session.
    pub async fn logout(&self) -> Result<(), Error> {
        self.post_json(LOGOUT_PATH, None).await?;
        debug!(user = %self.username, "logged out");
        Ok(())
    }
}
