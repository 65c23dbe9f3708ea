//! Cross-site request forgery protection
//!
//! Every state-changing request must come from the console itself. A
//! request marked cross-site by `Sec-Fetch-Site`, or carrying an `Origin`
//! that differs from `Host`, is refused before anything else runs. The
//! console token must then arrive in one of three places:
//!
//! - the `x-csrf-token` header
//! - the `_csrf_token` query parameter (multipart forms)
//! - the `_csrf_token` field of a urlencoded form body
//!
//! Refusals are 403 responses; the wrapped service never sees the request.

use axum::{
    body::Body,
    extract::{FromRequest, Query, Request},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::Rng;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// CSRF token header name
pub const CSRF_HEADER_NAME: &str = "x-csrf-token";

/// CSRF token form field and query parameter name
pub const CSRF_FORM_FIELD: &str = "_csrf_token";

/// The console's CSRF token (base64url of 32 random bytes)
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(Arc<str>);

impl CsrfToken {
    /// A fresh random token
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::rng().fill(&mut bytes);
        Self(URL_SAFE_NO_PAD.encode(bytes).into())
    }

    /// Token text for forms and headers
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compare without stopping at the first differing byte
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        let expected = self.0.as_bytes();
        let candidate = candidate.as_bytes();
        expected.len() == candidate.len()
            && expected
                .iter()
                .zip(candidate)
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CsrfToken([redacted])")
    }
}

/// Layer enforcing the console token on POST, PUT, PATCH and DELETE
#[derive(Clone, Debug)]
pub struct CsrfLayer {
    token: CsrfToken,
    form_limit: usize,
}

impl CsrfLayer {
    /// Check requests against `token`, reading at most `form_limit` bytes
    /// of a urlencoded body
    #[must_use]
    pub const fn new(token: CsrfToken, form_limit: usize) -> Self {
        Self { token, form_limit }
    }
}

impl<S> Layer<S> for CsrfLayer {
    type Service = CsrfMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CsrfMiddleware {
            inner,
            token: self.token.clone(),
            form_limit: self.form_limit,
        }
    }
}

/// Service produced by [`CsrfLayer`]
#[derive(Clone, Debug)]
pub struct CsrfMiddleware<S> {
    inner: S,
    token: CsrfToken,
    form_limit: usize,
}

impl<S> Service<Request> for CsrfMiddleware<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        // The clone that was polled ready handles this request
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let token = self.token.clone();
        let form_limit = self.form_limit;

        Box::pin(async move {
            if is_method_safe(request.method()) {
                return inner.call(request).await;
            }

            let path = request.uri().path().to_string();
            if let Some(reason) = cross_site(request.headers()) {
                tracing::warn!(%path, reason, "cross-site request refused");
                return Ok(csrf_rejection(reason));
            }

            match verify(request, &token, form_limit).await {
                Ok(request) => inner.call(request).await,
                Err(reason) => {
                    tracing::warn!(%path, reason, "CSRF check failed");
                    Ok(csrf_rejection(reason))
                }
            }
        })
    }
}

const fn is_method_safe(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}

fn cross_site(headers: &HeaderMap) -> Option<&'static str> {
    let fetch_site = headers
        .get("sec-fetch-site")
        .and_then(|value| value.to_str().ok());
    if fetch_site == Some("cross-site") {
        return Some("cross-site request");
    }

    let origin = headers.get(header::ORIGIN)?.to_str().ok()?;
    if origin == "null" {
        return Some("opaque origin");
    }
    let origin_host = origin
        .split_once("://")
        .map_or(origin, |(_, rest)| rest)
        .trim_end_matches('/');
    let host = headers.get(header::HOST)?.to_str().ok()?;
    (!origin_host.eq_ignore_ascii_case(host)).then_some("origin does not match host")
}

async fn verify(request: Request, token: &CsrfToken, form_limit: usize) -> Result<Request, &'static str> {
    if let Some(value) = request.headers().get(CSRF_HEADER_NAME) {
        let candidate = value.to_str().unwrap_or_default();
        return if token.matches(candidate) {
            Ok(request)
        } else {
            Err("CSRF token mismatch")
        };
    }

    if let Ok(Query(pairs)) = Query::<Vec<(String, String)>>::try_from_uri(request.uri()) {
        if let Some(candidate) = field(&pairs) {
            return if token.matches(candidate) {
                Ok(request)
            } else {
                Err("CSRF token mismatch")
            };
        }
    }

    let is_form = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));
    if !is_form {
        return Err("CSRF token missing");
    }

    let (parts, body) = request.into_parts();
    let bytes = axum::body::to_bytes(body, form_limit)
        .await
        .map_err(|_| "form body unreadable")?;

    let copy = Request::builder()
        .method(Method::POST)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(bytes.clone()))
        .map_err(|_| "form body unreadable")?;
    let Form(pairs) = Form::<Vec<(String, String)>>::from_request(copy, &())
        .await
        .map_err(|_| "form body unreadable")?;

    match field(&pairs) {
        Some(candidate) if token.matches(candidate) => {
            Ok(Request::from_parts(parts, Body::from(bytes)))
        }
        Some(_) => Err("CSRF token mismatch"),
        None => Err("CSRF token missing"),
    }
}

fn field(pairs: &[(String, String)]) -> Option<&str> {
    pairs
        .iter()
        .find(|(key, _)| key == CSRF_FORM_FIELD)
        .map(|(_, value)| value.as_str())
}

fn csrf_rejection(reason: &str) -> Response {
    let body = if cfg!(debug_assertions) {
        format!("CSRF validation failed: {reason}")
    } else {
        "Forbidden".to_string()
    };
    (StatusCode::FORBIDDEN, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Router};
    use tower::ServiceExt;

    fn app(token: &CsrfToken) -> Router {
        Router::new()
            .route("/admin/templates/1/delete", post(|| async { "deleted" }))
            .layer(CsrfLayer::new(token.clone(), 64 * 1024))
    }

    fn delete_request() -> axum::http::request::Builder {
        Request::builder()
            .method(Method::POST)
            .uri("/admin/templates/1/delete")
            .header(header::HOST, "127.0.0.1:3000")
    }

    #[test]
    fn test_tokens_are_random_and_url_safe() {
        let first = CsrfToken::generate();
        let second = CsrfToken::generate();

        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 43);
        assert!(first
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
        assert!(!format!("{first:?}").contains(first.as_str()));
    }

    #[test]
    fn test_matches() {
        let token = CsrfToken::generate();
        assert!(token.matches(token.as_str()));
        assert!(!token.matches(""));
        assert!(!token.matches(&token.as_str()[1..]));
    }

    #[test]
    fn test_is_method_safe() {
        assert!(is_method_safe(&Method::GET));
        assert!(is_method_safe(&Method::HEAD));
        assert!(!is_method_safe(&Method::POST));
        assert!(!is_method_safe(&Method::DELETE));
    }

    #[test]
    fn test_cross_site_detection() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(cross_site(&headers), None);

        headers.insert(header::ORIGIN, "http://127.0.0.1:3000".parse().unwrap());
        assert_eq!(cross_site(&headers), None);

        headers.insert(header::ORIGIN, "https://evil.example".parse().unwrap());
        assert_eq!(cross_site(&headers), Some("origin does not match host"));

        headers.insert(header::ORIGIN, "null".parse().unwrap());
        assert_eq!(cross_site(&headers), Some("opaque origin"));

        headers.remove(header::ORIGIN);
        headers.insert("sec-fetch-site", "cross-site".parse().unwrap());
        assert_eq!(cross_site(&headers), Some("cross-site request"));
    }

    #[tokio::test]
    async fn test_missing_token_is_forbidden() {
        let token = CsrfToken::generate();

        let response = app(&token)
            .oneshot(delete_request().body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_header_token_passes() {
        let token = CsrfToken::generate();

        let request = delete_request()
            .header(CSRF_HEADER_NAME, token.as_str())
            .body(Body::empty())
            .unwrap();
        let response = app(&token).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_foreign_origin_fails_even_with_token() {
        let token = CsrfToken::generate();

        let request = delete_request()
            .header(header::ORIGIN, "https://evil.example")
            .header(CSRF_HEADER_NAME, token.as_str())
            .body(Body::empty())
            .unwrap();
        let response = app(&token).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_form_field_passes_and_body_survives() {
        let token = CsrfToken::generate();
        let app = Router::new()
            .route(
                "/admin/templates/new",
                post(|Form(pairs): Form<Vec<(String, String)>>| async move {
                    pairs
                        .into_iter()
                        .find(|(key, _)| key == "name")
                        .map(|(_, value)| value)
                        .unwrap_or_default()
                }),
            )
            .layer(CsrfLayer::new(token.clone(), 64 * 1024));

        let body = format!("{CSRF_FORM_FIELD}={}&name=Certificate", token.as_str());
        let request = Request::builder()
            .method(Method::POST)
            .uri("/admin/templates/new")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), 1024).await.unwrap();
        assert_eq!(&bytes[..], b"Certificate");
    }

    #[tokio::test]
    async fn test_wrong_form_field_is_forbidden() {
        let token = CsrfToken::generate();

        let request = delete_request()
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("{CSRF_FORM_FIELD}=guess")))
            .unwrap();
        let response = app(&token).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_query_token_passes() {
        let token = CsrfToken::generate();

        let request = Request::builder()
            .method(Method::POST)
            .uri(format!(
                "/admin/templates/1/delete?{CSRF_FORM_FIELD}={}",
                token.as_str()
            ))
            .header(header::CONTENT_TYPE, "multipart/form-data; boundary=x")
            .body(Body::empty())
            .unwrap();
        let response = app(&token).oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_needs_no_token() {
        let token = CsrfToken::generate();
        let app = Router::new()
            .route("/admin", axum::routing::get(|| async { "dashboard" }))
            .layer(CsrfLayer::new(token, 1024));

        let request = Request::builder().uri("/admin").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
