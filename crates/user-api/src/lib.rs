//! 사용자 식별/인증 REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API (가입, 인증, 프로필)
//! - Argon2id 비밀번호 해싱
//! - JWT 발급/검증 및 역할 정책
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: 비밀번호 해싱, JWT, 역할 기반 접근 제어
//! - [`services`]: 식별 서비스 (가입/인증/프로필)
//! - [`repository`]: 자격증명 저장소 구현 (PostgreSQL, 메모리)
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod auth;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod repository;
pub mod routes;
pub mod services;
pub mod state;

pub use auth::{
    authorize, AdminAuth, AuthUser, AuthenticatedUser, Claims, IssuedToken, JwtAuthError,
    PasswordHasher, TokenIssuer, TokenValidator, UserAuth,
};
pub use error::{ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::{metrics_layer, RateLimitConfig, RateLimitState};
pub use repository::{InMemoryCredentialStore, PgCredentialStore};
pub use routes::*;
pub use services::IdentityService;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::{create_test_state, test_jwt_settings};
