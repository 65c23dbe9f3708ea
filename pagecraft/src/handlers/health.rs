//! Health check endpoints
//!
//! - `/healthz/live`: the process is up
//! - `/healthz`: console status plus backend reachability and session state
//!
//! The console is `unhealthy` (503) only when the backend does not answer;
//! a missing session is reported but never fails the check.

use std::collections::BTreeMap;
use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::session::SessionState;
use crate::state::ConsoleState;

/// Component status, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// Working
    Healthy,
    /// Usable, but mid-transition
    Degraded,
    /// Not usable
    Unhealthy,
}

/// Result of checking one dependency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Probe {
    /// Outcome
    pub status: HealthStatus,
    /// Detail for operators
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Milliseconds spent on the check
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl Probe {
    /// A probe with no details
    #[must_use]
    pub const fn new(status: HealthStatus) -> Self {
        Self {
            status,
            message: None,
            latency_ms: None,
        }
    }

    /// Attach a detail message
    #[must_use]
    pub fn note(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Record the time elapsed since `started`
    #[must_use]
    pub fn timed(mut self, started: Instant) -> Self {
        self.latency_ms = Some(u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX));
        self
    }
}

/// Body of `/healthz`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    /// Worst probe status
    pub status: HealthStatus,
    /// Console version
    pub version: String,
    /// RFC 3339 time of the check
    pub checked_at: String,
    /// Probes by name
    pub components: BTreeMap<String, Probe>,
}

impl HealthReport {
    /// Collect probes; the overall status is the worst of them
    pub fn from_probes(probes: impl IntoIterator<Item = (&'static str, Probe)>) -> Self {
        let components: BTreeMap<String, Probe> = probes
            .into_iter()
            .map(|(name, probe)| (name.to_string(), probe))
            .collect();
        let status = components
            .values()
            .map(|probe| probe.status)
            .max()
            .unwrap_or(HealthStatus::Healthy);

        Self {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            checked_at: chrono::Utc::now().to_rfc3339(),
            components,
        }
    }

    /// 503 when unhealthy
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        if self.status == HealthStatus::Unhealthy {
            StatusCode::SERVICE_UNAVAILABLE
        } else {
            StatusCode::OK
        }
    }
}

impl IntoResponse for HealthReport {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}

/// GET /healthz/live
#[allow(clippy::unused_async)]
pub async fn liveness() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /healthz
pub async fn health_check(State(state): State<ConsoleState>) -> HealthReport {
    let started = Instant::now();
    let backend = match state.api().health().await {
        Ok(()) => Probe::new(HealthStatus::Healthy).note(state.api().base_url().as_str()),
        Err(err) => {
            tracing::warn!(error = %err, "backend health check failed");
            Probe::new(HealthStatus::Unhealthy).note(err.user_message())
        }
    }
    .timed(started);

    HealthReport::from_probes([
        ("console", Probe::new(HealthStatus::Healthy)),
        ("backend", backend),
        ("session", session_probe(state.session().state())),
    ])
}

fn session_probe(session: SessionState) -> Probe {
    let status = match session {
        SessionState::TokenExpiring | SessionState::Refreshing => HealthStatus::Degraded,
        _ => HealthStatus::Healthy,
    };
    Probe::new(status).note(session.as_str())
}
