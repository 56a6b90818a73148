//! 사용자 가입/인증/프로필 endpoint.
//!
//! # 엔드포인트
//!
//! - `POST /api/v1/users/register` - 가입 (항상 `User` 역할)
//! - `POST /api/v1/users/authenticate` - 자격증명 검증 후 토큰 발급
//! - `GET /api/v1/users/profile` - 토큰 주체의 프로필 (UserPolicy)
//! - `GET /api/v1/users/admin` - 관리자 전용 데이터 (AdminPolicy)
//! - `GET /api/v1/users/lookup/{email}` - 임의 사용자 프로필 조회 (AdminPolicy)

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use user_core::{Profile, Registration};
use utoipa::ToSchema;

use crate::auth::{AdminAuth, UserAuth};
use crate::error::{identity_error_response, ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 인증 요청.
#[derive(Clone, Deserialize, ToSchema)]
pub struct AuthenticateRequest {
    /// 이메일
    pub email: String,
    /// 비밀번호
    pub password: String,
}

impl std::fmt::Debug for AuthenticateRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticateRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// 토큰 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// Access Token
    pub token: String,
    /// 토큰 타입 (항상 "Bearer")
    pub token_type: String,
    /// 만료까지 남은 시간 (초)
    pub expires_in: i64,
    /// 만료 시각
    pub expires_at: DateTime<Utc>,
}

/// 관리자 전용 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminDataResponse {
    /// 메시지
    pub message: String,
}

fn bad_request(rejection: JsonRejection) -> (StatusCode, Json<ApiErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiErrorResponse::new(
            "VALIDATION_ERROR",
            format!("잘못된 요청 본문: {}", rejection.body_text()),
        )),
    )
}

/// 가입.
#[utoipa::path(
    post,
    path = "/api/v1/users/register",
    request_body = Registration,
    responses(
        (status = 201, description = "가입 성공", body = Profile),
        (status = 400, description = "잘못된 입력", body = ApiErrorResponse),
        (status = 409, description = "이미 등록된 이메일", body = ApiErrorResponse),
        (status = 429, description = "요청 제한 초과", body = ApiErrorResponse),
        (status = 503, description = "저장소 사용 불가", body = ApiErrorResponse)
    ),
    tag = "users"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Registration>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Profile>)> {
    let Json(registration) = payload.map_err(bad_request)?;
    debug!(email = %registration.email, "POST /register");

    let profile = state
        .identity
        .register(registration)
        .await
        .map_err(identity_error_response)?;

    Ok((StatusCode::CREATED, Json(profile)))
}

/// 자격증명 검증 후 토큰 발급.
#[utoipa::path(
    post,
    path = "/api/v1/users/authenticate",
    request_body = AuthenticateRequest,
    responses(
        (status = 200, description = "인증 성공", body = TokenResponse),
        (status = 401, description = "이메일 또는 비밀번호 불일치", body = ApiErrorResponse),
        (status = 429, description = "요청 제한 초과", body = ApiErrorResponse),
        (status = 503, description = "저장소 사용 불가", body = ApiErrorResponse)
    ),
    tag = "users"
)]
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<AuthenticateRequest>, JsonRejection>,
) -> ApiResult<Json<TokenResponse>> {
    let Json(request) = payload.map_err(bad_request)?;
    debug!(email = %request.email, "POST /authenticate");

    let issued = state
        .identity
        .authenticate(&request.email, &request.password)
        .await
        .map_err(identity_error_response)?;

    Ok(Json(TokenResponse {
        token: issued.token,
        token_type: "Bearer".to_string(),
        expires_in: issued.expires_in,
        expires_at: issued.expires_at,
    }))
}

/// 토큰 주체의 프로필.
#[utoipa::path(
    get,
    path = "/api/v1/users/profile",
    responses(
        (status = 200, description = "프로필", body = Profile),
        (status = 401, description = "토큰 없음 또는 유효하지 않음", body = ApiErrorResponse),
        (status = 404, description = "사용자 없음", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn profile(
    State(state): State<Arc<AppState>>,
    UserAuth(user): UserAuth,
) -> ApiResult<Json<Profile>> {
    let profile = state
        .identity
        .get_profile(&user.email)
        .await
        .map_err(identity_error_response)?;

    Ok(Json(profile))
}

/// 관리자 전용 데이터.
#[utoipa::path(
    get,
    path = "/api/v1/users/admin",
    responses(
        (status = 200, description = "접근 허용", body = AdminDataResponse),
        (status = 401, description = "토큰 없음 또는 유효하지 않음", body = ApiErrorResponse),
        (status = 403, description = "관리자 권한 없음", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn admin_data(AdminAuth(user): AdminAuth) -> Json<AdminDataResponse> {
    debug!(email = %user.email, "GET /admin");
    Json(AdminDataResponse {
        message: "Admin data accessed.".to_string(),
    })
}

/// 이메일로 사용자 프로필 조회.
#[utoipa::path(
    get,
    path = "/api/v1/users/lookup/{email}",
    params(("email" = String, Path, description = "조회할 이메일")),
    responses(
        (status = 200, description = "프로필", body = Profile),
        (status = 401, description = "토큰 없음 또는 유효하지 않음", body = ApiErrorResponse),
        (status = 403, description = "관리자 권한 없음", body = ApiErrorResponse),
        (status = 404, description = "사용자 없음", body = ApiErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn lookup(
    State(state): State<Arc<AppState>>,
    AdminAuth(_admin): AdminAuth,
    Path(email): Path<String>,
) -> ApiResult<Json<Profile>> {
    let profile = state
        .identity
        .get_profile(&email)
        .await
        .map_err(identity_error_response)?;

    Ok(Json(profile))
}

/// 공개 라우트 (요청 제한 대상).
pub fn public_users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/authenticate", post(authenticate))
}

/// 보호된 라우트.
pub fn protected_users_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile", get(profile))
        .route("/admin", get(admin_data))
        .route("/lookup/{email}", get(lookup))
}

/// 사용자 라우터 생성.
pub fn users_router() -> Router<Arc<AppState>> {
    public_users_router().merge(protected_users_router())
}
