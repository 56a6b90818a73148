//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::Router;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;
use user_core::{Profile, Registration, Role};

use crate::error::ApiErrorResponse;
use crate::routes::{
    AdminDataResponse, AuthenticateRequest, ComponentHealth, ComponentState, ComponentStatus,
    HealthResponse, HealthStatus, TokenResponse,
};

// ==================== OpenAPI 문서 정의 ====================

/// User Service API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Service API",
        version = "0.1.0",
        description = r#"
# 사용자 식별/인증 REST API

## 주요 기능

- **가입**: 이메일, 표시 이름, 비밀번호로 계정 생성 (항상 `User` 역할)
- **인증**: 자격증명 검증 후 서명된 Bearer 토큰 발급
- **프로필**: 토큰 주체의 프로필 조회
- **관리자**: `Admin` 역할 전용 엔드포인트

## 인증

보호된 엔드포인트는 `Authorization: Bearer <token>` 헤더가 필요합니다.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "로컬 개발 서버"),
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "users", description = "사용자 - 가입, 인증, 프로필")
    ),
    // ==================== 스키마 등록 ====================
    components(
        schemas(
            // ===== Health =====
            HealthResponse,
            HealthStatus,
            ComponentHealth,
            ComponentStatus,
            ComponentState,

            // ===== Common =====
            ApiErrorResponse,

            // ===== Users =====
            Registration,
            Profile,
            Role,
            AuthenticateRequest,
            TokenResponse,
            AdminDataResponse,
        )
    ),
    // ==================== 경로 등록 ====================
    paths(
        // ===== Health =====
        crate::routes::health::health_check,
        crate::routes::health::health_ready,

        // ===== Users =====
        crate::routes::users::register,
        crate::routes::users::authenticate,
        crate::routes::users::profile,
        crate::routes::users::admin_data,
        crate::routes::users::lookup,
    )
)]
pub struct ApiDoc;

/// `bearer_auth` 보안 스킴 등록.
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                Http::builder()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

// ==================== Swagger UI 라우터 ====================

/// Swagger UI 라우터 생성.
///
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
