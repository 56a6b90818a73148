//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/api/v1/users` - 가입, 인증, 프로필, 관리자 전용 조회

pub mod health;
pub mod users;

pub use health::{
    health_router, ComponentHealth, ComponentState, ComponentStatus, HealthResponse, HealthStatus,
};
pub use users::{
    protected_users_router, public_users_router, users_router, AdminDataResponse,
    AuthenticateRequest, TokenResponse,
};

use axum::{middleware, Router};
use std::sync::Arc;

use crate::middleware::{rate_limit_middleware, RateLimitState};
use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// `rate_limit`이 주어지면 공개 사용자 라우트(가입/인증)에만 적용됩니다.
/// 보호된 라우트와 헬스 체크는 제한 대상이 아닙니다.
pub fn create_api_router(rate_limit: Option<RateLimitState>) -> Router<Arc<AppState>> {
    let public = match rate_limit {
        Some(rate_limit_state) => public_users_router().layer(middleware::from_fn_with_state(
            rate_limit_state,
            rate_limit_middleware,
        )),
        None => public_users_router(),
    };

    Router::new()
        .nest("/health", health_router())
        .nest("/api/v1/users", public.merge(protected_users_router()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::RateLimitConfig;
    use crate::state::create_test_state;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    fn authenticate_request() -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/users/authenticate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"email":"a@x.com","password":"pw"}"#))
            .unwrap()
    }

    #[tokio::test]
    async fn test_rate_limit_applies_to_public_routes_only() {
        let limiter = RateLimitState::new(RateLimitConfig::strict(1));
        let app = create_api_router(Some(limiter)).with_state(Arc::new(create_test_state()));

        // 버킷 용량 1: 첫 요청은 통과 (미등록 이메일 → 401)
        let first = app.clone().oneshot(authenticate_request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::UNAUTHORIZED);

        let second = app.clone().oneshot(authenticate_request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(second.headers().contains_key(header::RETRY_AFTER));

        // 헬스 체크는 제한되지 않음
        for _ in 0..3 {
            let health = app
                .clone()
                .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(health.status(), StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn test_router_without_rate_limit() {
        let app = create_api_router(None).with_state(Arc::new(create_test_state()));

        for _ in 0..5 {
            let response = app.clone().oneshot(authenticate_request()).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }
}
