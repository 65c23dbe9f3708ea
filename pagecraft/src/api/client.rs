//! Shared HTTP plumbing for all resource calls

use http::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::ApiError;
use crate::config::ApiSettings;

/// Typed client for the template backend
///
/// Cheap to clone; clones share one connection pool. Every call takes the
/// bearer token explicitly so the session layer decides when a token is
/// fresh enough to use.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
}

impl ApiClient {
    /// Create a client rooted at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base = Url::parse(base_url)
            .map_err(|err| ApiError::InvalidRequest(format!("invalid base URL `{base_url}`: {err}")))?;
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidRequest(format!(
                "base URL `{base_url}` cannot carry a path"
            )));
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("pagecraft/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base })
    }

    /// Create a client from configuration
    pub fn from_settings(settings: &ApiSettings) -> Result<Self, ApiError> {
        Self::new(&settings.base_url, settings.request_timeout())
    }

    /// The configured base URL
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve path segments against the base URL
    ///
    /// Segments are percent-encoded individually, so identifiers can never
    /// escape their position in the path.
    pub(crate) fn endpoint(&self, segments: &[&str], trailing_slash: bool) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                ApiError::InvalidRequest(format!("base URL `{}` cannot carry a path", self.base))
            })?;
            path.pop_if_empty().extend(segments);
            if trailing_slash {
                path.push("");
            }
        }
        Ok(url)
    }

    /// Start a request with the JSON accept header and optional bearer token
    pub(crate) fn request(&self, method: Method, url: Url, bearer: Option<&str>) -> RequestBuilder {
        let builder = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");
        match bearer {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    /// Send and decode a JSON body
    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send(builder).await?;
        serde_json::from_slice(&body).map_err(|err| ApiError::Decode(err.to_string()))
    }

    /// Send and discard the body
    pub(crate) async fn send_empty(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.send(builder).await.map(|_| ())
    }

    async fn send(&self, builder: RequestBuilder) -> Result<bytes::Bytes, ApiError> {
        let request = builder.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(%method, %url, "backend request");

        let response = self.http.execute(request).await.map_err(|err| {
            tracing::warn!(%method, %url, error = %err, "backend unreachable");
            ApiError::Transport(err)
        })?;

        let status = response.status();
        let body = response.bytes().await?;

        if status.is_success() {
            tracing::debug!(%method, %url, %status, "backend response");
            Ok(body)
        } else {
            let err = ApiError::from_response(status, &body);
            tracing::warn!(%method, %url, %status, error = %err, "backend rejected request");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_appends_trailing_slash() {
        let api = client("http://localhost:8000/api");
        let url = api.endpoint(&["templates", "7", "pages"], true).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/templates/7/pages/");
    }

    #[test]
    fn test_endpoint_tolerates_base_with_slash() {
        let api = client("http://localhost:8000/api/");
        let url = api.endpoint(&["render", "generate"], false).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/render/generate");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let api = client("http://localhost:8000/api");
        let url = api.endpoint(&["templates", "../admin"], true).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/templates/..%2Fadmin/");
    }

    #[test]
    fn test_rejects_bad_base() {
        assert!(matches!(
            ApiClient::new("not a url", Duration::from_secs(1)),
            Err(ApiError::InvalidRequest(_))
        ));
        assert!(matches!(
            ApiClient::new("mailto:ops@example.com", Duration::from_secs(1)),
            Err(ApiError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_bearer_header_is_attached() {
        let api = client("http://localhost:8000/api");
        let url = api.endpoint(&["templates"], true).unwrap();
        let request = api
            .request(Method::GET, url.clone(), Some("tok"))
            .build()
            .unwrap();
        assert_eq!(request.headers()[AUTHORIZATION], "Bearer tok");

        let anonymous = api.request(Method::GET, url, None).build().unwrap();
        assert!(anonymous.headers().get(AUTHORIZATION).is_none());
    }
}
