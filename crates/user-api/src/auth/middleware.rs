//! Axum용 JWT 인증 추출기.
//!
//! 보호된 핸들러는 아래 추출기 중 하나를 인자로 받습니다. 추출기는 토큰 검증과
//! 역할 정책 판정을 핸들러 실행 전에 끝내고, 핸들러에는 [`AuthenticatedUser`]만 넘깁니다.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        request::Parts,
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use user_core::{Role, RolePolicy};

use super::{authorize, Claims};
use crate::error::ApiErrorResponse;
use crate::state::AppState;

/// 인증된 호출자 컨텍스트.
///
/// 토큰에서 주체 이메일과 역할만 꺼내 전달합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// 정규화된 이메일 (토큰 subject)
    pub email: String,
    /// 역할
    pub role: Role,
}

impl From<Claims> for AuthenticatedUser {
    fn from(claims: Claims) -> Self {
        Self {
            email: claims.sub,
            role: claims.role,
        }
    }
}

/// JWT 인증 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtAuthError {
    #[error("인증 토큰이 필요합니다")]
    MissingToken,
    #[error("잘못된 Authorization 헤더 형식")]
    InvalidAuthHeader,
    #[error("유효하지 않은 토큰")]
    InvalidToken,
    #[error("권한이 부족합니다")]
    InsufficientRole,
}

impl JwtAuthError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            JwtAuthError::MissingToken => (StatusCode::UNAUTHORIZED, "MISSING_TOKEN"),
            JwtAuthError::InvalidAuthHeader => (StatusCode::UNAUTHORIZED, "INVALID_AUTH_HEADER"),
            JwtAuthError::InvalidToken => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            JwtAuthError::InsufficientRole => (StatusCode::FORBIDDEN, "INSUFFICIENT_ROLE"),
        }
    }
}

impl IntoResponse for JwtAuthError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let body = Json(ApiErrorResponse::new(code, self.to_string()));

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Authorization 헤더에서 Bearer 토큰을 꺼냅니다.
fn bearer_token(parts: &Parts) -> Result<&str, JwtAuthError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .ok_or(JwtAuthError::MissingToken)?
        .to_str()
        .map_err(|_| JwtAuthError::InvalidAuthHeader)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(JwtAuthError::InvalidAuthHeader)?;

    if token.is_empty() {
        return Err(JwtAuthError::InvalidAuthHeader);
    }
    Ok(token)
}

/// 토큰을 검증하고 정책을 판정합니다.
fn authenticate_parts(
    parts: &Parts,
    state: &AppState,
    policy: Option<RolePolicy>,
) -> Result<AuthenticatedUser, JwtAuthError> {
    let token = bearer_token(parts)?;
    let claims = state
        .token_validator
        .validate(token)
        .map_err(|_| JwtAuthError::InvalidToken)?;

    if let Some(policy) = policy {
        if !authorize(&claims, policy) {
            return Err(JwtAuthError::InsufficientRole);
        }
    }

    Ok(claims.into())
}

/// 유효한 토큰만 요구하는 추출기.
///
/// # 사용 예시
///
/// ```rust,ignore
/// async fn whoami(AuthUser(user): AuthUser) -> impl IntoResponse {
///     format!("Authenticated user: {}", user.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub AuthenticatedUser);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = JwtAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        authenticate_parts(parts, state, None).map(AuthUser)
    }
}

/// `UserPolicy` (User 또는 Admin)를 요구하는 추출기.
#[derive(Debug, Clone)]
pub struct UserAuth(pub AuthenticatedUser);

impl FromRequestParts<Arc<AppState>> for UserAuth {
    type Rejection = JwtAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        authenticate_parts(parts, state, Some(RolePolicy::UserOrAdmin)).map(UserAuth)
    }
}

/// `AdminPolicy` (Admin 전용)를 요구하는 추출기.
#[derive(Debug, Clone)]
pub struct AdminAuth(pub AuthenticatedUser);

impl FromRequestParts<Arc<AppState>> for AdminAuth {
    type Rejection = JwtAuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        authenticate_parts(parts, state, Some(RolePolicy::AdminOnly)).map(AdminAuth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::http::Request;
    use user_core::NewIdentity;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/v1/users/profile");
        if let Some(value) = value {
            builder = builder.header(AUTHORIZATION, value);
        }
        let (parts, _) = builder.body(()).unwrap().into_parts();
        parts
    }

    fn token_for(state: &AppState, role: Role) -> String {
        let identity = NewIdentity::new("a@x.com", "Alice", "h")
            .with_role(role)
            .into_identity();
        state.identity.token_issuer().issue(&identity).unwrap().token
    }

    #[test]
    fn test_header_errors() {
        let state = create_test_state();

        assert!(matches!(
            authenticate_parts(&parts_with_auth(None), &state, None),
            Err(JwtAuthError::MissingToken)
        ));
        assert!(matches!(
            authenticate_parts(&parts_with_auth(Some("Basic dXNlcjpwdw==")), &state, None),
            Err(JwtAuthError::InvalidAuthHeader)
        ));
        assert!(matches!(
            authenticate_parts(&parts_with_auth(Some("Bearer ")), &state, None),
            Err(JwtAuthError::InvalidAuthHeader)
        ));
        assert!(matches!(
            authenticate_parts(&parts_with_auth(Some("Bearer not.a.jwt")), &state, None),
            Err(JwtAuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_policy_decisions() {
        let state = create_test_state();
        let user_header = format!("Bearer {}", token_for(&state, Role::User));
        let admin_header = format!("Bearer {}", token_for(&state, Role::Admin));

        let user = authenticate_parts(
            &parts_with_auth(Some(&user_header)),
            &state,
            Some(RolePolicy::UserOrAdmin),
        )
        .unwrap();
        assert_eq!(
            user,
            AuthenticatedUser {
                email: "a@x.com".to_string(),
                role: Role::User
            }
        );

        assert!(matches!(
            authenticate_parts(
                &parts_with_auth(Some(&user_header)),
                &state,
                Some(RolePolicy::AdminOnly)
            ),
            Err(JwtAuthError::InsufficientRole)
        ));

        let admin = authenticate_parts(
            &parts_with_auth(Some(&admin_header)),
            &state,
            Some(RolePolicy::AdminOnly),
        )
        .unwrap();
        assert_eq!(admin.role, Role::Admin);
    }

    #[test]
    fn test_jwt_auth_error_responses() {
        let cases = [
            (JwtAuthError::MissingToken, StatusCode::UNAUTHORIZED),
            (JwtAuthError::InvalidAuthHeader, StatusCode::UNAUTHORIZED),
            (JwtAuthError::InvalidToken, StatusCode::UNAUTHORIZED),
            (JwtAuthError::InsufficientRole, StatusCode::FORBIDDEN),
        ];

        for (error, expected) in cases {
            let response = error.into_response();
            assert_eq!(response.status(), expected);
            assert_eq!(
                response.headers().contains_key(WWW_AUTHENTICATE),
                expected == StatusCode::UNAUTHORIZED
            );
        }
    }
}
