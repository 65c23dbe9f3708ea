use reqwest::Method;

use super::{ApiClient, ApiError};
use crate::models::{LoginRequest, LoginResponse, LogoutRequest, RefreshRequest, RefreshResponse};

impl ApiClient {
    /// `GET /health/`
    pub async fn health(&self) -> Result<(), ApiError> {
        let url = self.endpoint(&["health"], true)?;
        self.send_empty(self.request(Method::GET, url, None)).await
    }

    /// `POST /auth/login/`
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = self.endpoint(&["auth", "login"], true)?;
        let body = LoginRequest { username, password };
        self.send_json(self.request(Method::POST, url, None).json(&body))
            .await
    }

    /// `POST /auth/refresh/`
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ApiError> {
        let url = self.endpoint(&["auth", "refresh"], true)?;
        let body = RefreshRequest {
            refresh: refresh_token,
        };
        self.send_json(self.request(Method::POST, url, None).json(&body))
            .await
    }

    /// `POST /auth/logout/`
    pub async fn logout(&self, refresh_token: &str, bearer: Option<&str>) -> Result<(), ApiError> {
        let url = self.endpoint(&["auth", "logout"], true)?;
        let body = LogoutRequest {
            refresh: refresh_token,
        };
        self.send_empty(self.request(Method::POST, url, bearer).json(&body))
            .await
    }
}
