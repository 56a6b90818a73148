//! 사용자 서비스의 에러 타입.
//!
//! 이 모듈은 서비스 전반에서 사용되는 에러 분류를 정의합니다.
//! 보안상 민감한 구분(계정 없음 vs 비밀번호 오류)은 호출자에게 도달하기 전에 합쳐집니다.

use thiserror::Error;

/// 시작 시점 설정 에러.
///
/// 요청 단위 에러가 아니며, 발생하면 프로세스를 시작하지 않습니다.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// 서명 키 누락
    #[error("JWT 서명 키가 설정되지 않았습니다")]
    MissingSecret,

    /// 서명 키가 너무 짧음
    #[error("JWT 서명 키가 너무 짧습니다: 최소 {min} 바이트, 실제 {actual} 바이트")]
    SecretTooShort { min: usize, actual: usize },

    /// 발급자 누락
    #[error("JWT 발급자(issuer)가 설정되지 않았습니다")]
    MissingIssuer,

    /// 대상자 누락
    #[error("JWT 대상자(audience)가 설정되지 않았습니다")]
    MissingAudience,

    /// 토큰 수명이 허용 범위(1초 ~ 365일) 밖
    #[error("토큰 수명은 1초 이상 365일 이하여야 합니다: {0}초")]
    InvalidLifetime(i64),

    /// 비밀번호 해시 파라미터 오류
    #[error("비밀번호 해시 파라미터가 유효하지 않습니다: {0}")]
    InvalidHashParams(String),

    /// 설정 로드 실패
    #[error("설정 로드 실패: {0}")]
    Load(#[from] config::ConfigError),
}

/// Identity 서비스 작업 결과 에러.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// 잘못된 입력 (수정 후 재시도 가능)
    #[error("잘못된 입력: {0}")]
    Validation(String),

    /// 이미 등록된 이메일
    #[error("이미 등록된 이메일입니다")]
    Conflict,

    /// 인증 실패 (계정 없음과 비밀번호 오류를 구분하지 않음)
    #[error("이메일 또는 비밀번호가 올바르지 않습니다")]
    InvalidCredentials,

    /// 사용자를 찾을 수 없음
    #[error("사용자를 찾을 수 없습니다")]
    NotFound,

    /// 하위 계층 장애. 원인은 서버 로그용으로만 보존됩니다.
    #[error("서비스를 일시적으로 사용할 수 없습니다")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Identity 작업을 위한 Result 타입.
pub type IdentityResult<T> = Result<T, IdentityError>;

impl IdentityError {
    /// 하위 계층 장애를 감쌉니다.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        IdentityError::Unavailable(Box::new(err))
    }

    /// 재시도 가능한 에러인지 확인합니다.
    pub fn is_retryable(&self) -> bool {
        matches!(self, IdentityError::Unavailable(_))
    }

    /// 안정적인 에러 코드.
    pub fn code(&self) -> &'static str {
        match self {
            IdentityError::Validation(_) => "VALIDATION_ERROR",
            IdentityError::Conflict => "EMAIL_CONFLICT",
            IdentityError::InvalidCredentials => "INVALID_CREDENTIALS",
            IdentityError::NotFound => "NOT_FOUND",
            IdentityError::Unavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }
}
