// Request wrapper
//
// Every controller call funnels through `dispatch`: resolve the path,
// attach headers and the CSRF token, send, capture any rotated token,
// and read the whole body. Only HTTP 200 counts as success.

use std::time::Instant;

use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::Session;
use crate::error::Error;
use crate::pinning::is_pin_rejection;
use crate::shape;

/// A response whose status has not been judged yet.
#[derive(Debug)]
pub(crate) struct RawResponse {
    pub url: String,
    pub status: StatusCode,
    pub body: Bytes,
}

impl Session {
    pub(crate) async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<RawResponse, Error> {
        let url = self.url_for(path)?;

        let mut builder = self
            .http
            .request(method.clone(), url.clone())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json; charset=utf-8");
        if let Some(token) = self.csrf_token() {
            builder = builder.header("X-CSRF-Token", token);
        }
        let has_params = body.is_some();
        if let Some(body) = body {
            builder = builder.body(body);
        }

        debug!(
            %method,
            %url,
            params = has_params,
            cookies = self.cookie_count(&url),
            "requesting"
        );

        let start = Instant::now();
        let resp = builder
            .send()
            .await
            .map_err(|e| transport_error(&url, start, e))?;

        let status = resp.status();
        self.update_csrf_from_headers(resp.headers());

        let body = resp
            .bytes()
            .await
            .map_err(|e| transport_error(&url, start, e))?;

        debug!(
            %url,
            status = status.as_u16(),
            elapsed = ?start.elapsed(),
            bytes = body.len(),
            "requested"
        );

        Ok(RawResponse {
            url: url.to_string(),
            status,
            body,
        })
    }

    /// Send a request and return the body if the status is exactly 200.
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<String>,
    ) -> Result<Bytes, Error> {
        let resp = self.dispatch(method, path, body).await?;
        if resp.status != StatusCode::OK {
            return Err(Error::InvalidStatusCode {
                url: resp.url,
                status: resp.status,
                body: resp.body,
            });
        }
        Ok(resp.body)
    }

    /// Fetch `path`. With params the body is POSTed instead, which is
    /// how the controller takes filters on read endpoints.
    pub async fn get_json(&self, path: &str, params: Option<&str>) -> Result<Bytes, Error> {
        match non_empty(params) {
            Some(params) => self.execute(Method::POST, path, Some(params.to_owned())).await,
            None => self.execute(Method::GET, path, None).await,
        }
    }

    pub async fn post_json(&self, path: &str, params: Option<&str>) -> Result<Bytes, Error> {
        self.execute(Method::POST, path, non_empty(params).map(str::to_owned))
            .await
    }

    /// PUT `params` to `path`. Fails with [`Error::NoParams`] before any
    /// network I/O if there is nothing to send.
    pub async fn put_json(&self, path: &str, params: Option<&str>) -> Result<Bytes, Error> {
        let Some(params) = non_empty(params) else {
            return Err(Error::NoParams);
        };
        self.execute(Method::PUT, path, Some(params.to_owned()))
            .await
    }

    /// [`get_json`](Self::get_json), then decode the body as `T`.
    pub async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Option<&str>,
    ) -> Result<T, Error> {
        let body = self.get_json(path, params).await?;
        shape::decode(&body)
    }

    /// [`put_json`](Self::put_json), then decode the body as `T`.
    pub async fn put_data<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Option<&str>,
    ) -> Result<T, Error> {
        let body = self.put_json(path, params).await?;
        shape::decode(&body)
    }

    /// GET `path` and decode a record that may be nested under `key`.
    pub async fn get_dual<T: DeserializeOwned>(&self, path: &str, key: &str) -> Result<T, Error> {
        let body = self.get_json(path, None).await?;
        shape::decode_dual(&body, key)
    }
}

fn non_empty(params: Option<&str>) -> Option<&str> {
    params.filter(|p| !p.is_empty())
}

pub(crate) fn transport_error(url: &Url, start: Instant, source: reqwest::Error) -> Error {
    if is_pin_rejection(&source) {
        return Error::InvalidSignature;
    }
    Error::Transport {
        url: url.to_string(),
        elapsed: start.elapsed(),
        source,
    }
}
