//! HTTP 에러 응답.
//!
//! 모든 실패 응답은 같은 JSON 본문을 사용합니다. 클라이언트는 `code`로 분기하고
//! `message`는 표시용으로만 사용해야 합니다.

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use user_core::IdentityError;
use utoipa::ToSchema;

/// 에러 응답 본문.
///
/// ```json
/// { "code": "EMAIL_CONFLICT", "message": "이미 등록된 이메일입니다", "timestamp": 1738300800 }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 기계 판독용 코드 (예: "VALIDATION_ERROR", "INVALID_TOKEN")
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// Unix timestamp (초)
    pub timestamp: i64,
}

impl ApiErrorResponse {
    /// ```
    /// use user_api::error::ApiErrorResponse;
    ///
    /// let error = ApiErrorResponse::new("NOT_FOUND", "사용자를 찾을 수 없습니다");
    /// assert_eq!(error.code, "NOT_FOUND");
    /// ```
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }
}

/// 핸들러 반환 타입.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

fn status_for(err: &IdentityError) -> StatusCode {
    match err {
        IdentityError::Validation(_) => StatusCode::BAD_REQUEST,
        IdentityError::Conflict => StatusCode::CONFLICT,
        IdentityError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        IdentityError::NotFound => StatusCode::NOT_FOUND,
        IdentityError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// 서비스 에러를 HTTP 응답으로 변환합니다.
///
/// `Unavailable`의 원인은 로그에만 남고 응답 본문에는 들어가지 않습니다.
pub fn identity_error_response(err: IdentityError) -> (StatusCode, Json<ApiErrorResponse>) {
    if let IdentityError::Unavailable(source) = &err {
        tracing::error!(error = %source, "Identity operation failed on lower layer");
    }

    (
        status_for(&err),
        Json(ApiErrorResponse::new(err.code(), err.to_string())),
    )
}
