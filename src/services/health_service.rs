use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Respond with a health payload, degraded when a backend is down.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    if let Err(err) = state.leaderboard().health_check().await {
        warn!(error = %err, "leaderboard health check failed");
        return HealthResponse::degraded();
    }
    HealthResponse::ok()
}
