use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::alerts::{AlertChecker, Scheduler, SubscriberStore};

/// Application state shared across handlers
pub struct AppState {
    pub store: SubscriberStore,
    pub scheduler: Arc<Scheduler>,
    pub checker: Arc<AlertChecker>,
}

// ============================================================================
// Health Check
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Status
// ============================================================================

#[derive(Serialize)]
pub struct StatusResponse {
    pub subscribers: usize,
    pub scheduler_running: bool,
    pub interval_minutes: Option<u64>,
    pub last_rate: Option<f64>,
    pub last_checked: Option<String>,
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let observation = state.checker.last_observation();

    Json(StatusResponse {
        subscribers: state.store.len(),
        scheduler_running: state.scheduler.is_running(),
        interval_minutes: state.scheduler.interval_minutes(),
        last_rate: observation.map(|o| o.rate),
        last_checked: observation.map(|o| o.observed_at.to_rfc3339()),
    })
}
