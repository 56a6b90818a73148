//! 헬스 체크 endpoint.
//!
//! - `GET /health` - liveness. 프로세스가 응답하면 항상 200.
//! - `GET /health/ready` - readiness. 자격증명 저장소에 닿지 못하면 503.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// 전체 서비스 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// 개별 컴포넌트 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ComponentState {
    Up,
    Down,
}

/// readiness 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// 서버 버전
    pub version: String,
    /// 서버 업타임(초)
    pub uptime_secs: i64,
    pub checked_at: DateTime<Utc>,
    pub components: ComponentHealth,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    pub credential_store: ComponentStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentStatus {
    pub state: ComponentState,
    /// 저장소 종류 ("postgres" | "in-memory")
    pub backend: String,
    /// 점검 쿼리 소요 시간 (DB가 있을 때만)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl HealthResponse {
    fn from_store(state: &AppState, store: ComponentStatus) -> Self {
        let status = match store.state {
            ComponentState::Up => HealthStatus::Healthy,
            ComponentState::Down => HealthStatus::Unhealthy,
        };

        Self {
            status,
            version: state.version.clone(),
            uptime_secs: state.uptime_secs(),
            checked_at: Utc::now(),
            components: ComponentHealth {
                credential_store: store,
            },
        }
    }

    fn status_code(&self) -> StatusCode {
        match self.status {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "서버 응답 가능")),
    tag = "health"
)]
pub async fn health_check() -> &'static str {
    "OK"
}

/// readiness probe.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "요청 처리 가능", body = HealthResponse),
        (status = 503, description = "저장소 연결 실패", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_ready(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let probe_started = Instant::now();
    let store = match state.is_db_healthy().await {
        None => ComponentStatus {
            state: ComponentState::Up,
            backend: "in-memory".to_string(),
            latency_ms: None,
        },
        Some(reachable) => ComponentStatus {
            state: if reachable {
                ComponentState::Up
            } else {
                ComponentState::Down
            },
            backend: "postgres".to_string(),
            latency_ms: Some(probe_started.elapsed().as_millis() as u64),
        },
    };

    let response = HealthResponse::from_store(&state, store);
    (response.status_code(), Json(response))
}

pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(health_ready))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .nest("/health", health_router())
            .with_state(Arc::new(create_test_state()))
    }

    #[tokio::test]
    async fn test_liveness() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_readiness_with_in_memory_store() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let health: serde_json::Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(health["status"], "healthy");
        assert_eq!(health["components"]["credential_store"]["state"], "up");
        assert_eq!(health["components"]["credential_store"]["backend"], "in-memory");
        assert!(health["components"]["credential_store"].get("latency_ms").is_none());
    }

    #[test]
    fn test_down_store_is_unavailable() {
        let state = create_test_state();
        let response = HealthResponse::from_store(
            &state,
            ComponentStatus {
                state: ComponentState::Down,
                backend: "postgres".to_string(),
                latency_ms: Some(5),
            },
        );

        assert_eq!(response.status, HealthStatus::Unhealthy);
        assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
