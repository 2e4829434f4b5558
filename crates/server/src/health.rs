use axum::{routing::get, Json, Router};
use chrono::Utc;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub checked_at: String,
}

/// Liveness only. ERP reachability is reported by `salesdesk doctor`.
pub fn router() -> Router {
    Router::new().route("/api/health", get(health))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "salesdesk-server",
        version: env!("CARGO_PKG_VERSION"),
        checked_at: Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use axum::Json;

    use crate::health::health;

    #[tokio::test]
    async fn health_reports_healthy_with_timestamp() {
        let Json(payload) = health().await;

        assert_eq!(payload.status, "healthy");
        assert_eq!(payload.service, "salesdesk-server");
        assert!(!payload.checked_at.is_empty());
    }
}
