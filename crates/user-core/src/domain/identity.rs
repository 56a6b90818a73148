//! 사용자 식별 레코드.
//!
//! 저장 레코드(`Identity`), 생성 입력(`NewIdentity`), 외부 노출용 투영(`Profile`),
//! 가입 입력 검증(`Registration`)을 정의합니다.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::Role;

/// 이메일 정규화.
///
/// 이메일은 대소문자를 구분하지 않습니다. 모든 저장과 조회 전에
/// 앞뒤 공백을 제거하고 소문자로 변환합니다.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// 새로 생성할 사용자 레코드.
///
/// ID와 기본 역할은 생성자에서 결정됩니다. 저장소는 역할을 보정하지 않습니다.
#[derive(Debug)]
pub struct NewIdentity {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
    pub password_hash: SecretString,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl NewIdentity {
    /// 기본 역할(`User`)로 새 레코드 생성.
    ///
    /// # Arguments
    ///
    /// * `email` - 이메일 (정규화되어 저장됨)
    /// * `display_name` - 표시 이름
    /// * `password_hash` - `PasswordHasher`가 만든 PHC 문자열
    pub fn new(
        email: impl AsRef<str>,
        display_name: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            email: normalize_email(email.as_ref()),
            display_name: display_name.into().trim().to_string(),
            password_hash: SecretString::from(password_hash.into()),
            role: Role::default(),
            created_at: Utc::now(),
        }
    }

    /// 역할 지정.
    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// 저장된 레코드로 변환.
    pub fn into_identity(self) -> Identity {
        Identity {
            id: self.id,
            email: self.email,
            display_name: self.display_name,
            password_hash: self.password_hash,
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// 저장된 사용자 레코드.
///
/// `password_hash`는 `Debug` 출력에서 가려지며, 이 타입은 직렬화되지 않습니다.
/// 외부로 내보낼 때는 [`Profile`]을 사용합니다.
#[derive(Debug)]
pub struct Identity {
    /// 불변 고유 ID
    pub id: Uuid,
    /// 정규화된 이메일 (조회 키)
    pub email: String,
    /// 표시 이름
    pub display_name: String,
    /// 비밀번호 해시 (PHC 형식)
    pub password_hash: SecretString,
    /// 역할
    pub role: Role,
    /// 생성 시각
    pub created_at: DateTime<Utc>,
}

impl Identity {
    /// 저장된 해시 문자열.
    pub fn password_hash(&self) -> &str {
        self.password_hash.expose_secret()
    }

    /// 해시를 제외한 프로필 투영.
    pub fn to_profile(&self) -> Profile {
        Profile {
            id: self.id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// 사용자 프로필.
///
/// 비밀번호 해시 필드를 구조적으로 갖지 않는 읽기 전용 투영입니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct Profile {
    /// 사용자 ID
    pub id: Uuid,
    /// 이메일
    pub email: String,
    /// 표시 이름
    pub display_name: String,
    /// 역할
    pub role: Role,
    /// 가입 시각
    pub created_at: DateTime<Utc>,
}

/// 회원가입 입력.
#[derive(Clone, Deserialize, Validate)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub struct Registration {
    /// 이메일
    #[validate(
        email(message = "이메일 형식이 올바르지 않습니다"),
        length(min = 1, max = 100, message = "이메일은 1-100자여야 합니다")
    )]
    pub email: String,
    /// 표시 이름
    #[serde(alias = "name")]
    #[validate(
        length(min = 1, max = 100, message = "이름은 1-100자여야 합니다"),
        custom(function = "not_blank", message = "이름은 공백일 수 없습니다")
    )]
    pub display_name: String,
    /// 비밀번호 (평문)
    #[validate(length(
        min = 1,
        max = 256,
        message = "비밀번호는 1-256자여야 합니다"
    ))]
    pub password: String,
}

impl Registration {
    /// 새 가입 입력 생성. 이메일은 정규화됩니다.
    pub fn new(
        email: impl AsRef<str>,
        display_name: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: normalize_email(email.as_ref()),
            display_name: display_name.into(),
            password: password.into(),
        }
    }

    /// 입력 검증.
    ///
    /// 실패 시 필드별 메시지를 `; `로 이어 붙여 반환합니다.
    pub fn check(&self) -> Result<(), String> {
        let normalized = Registration {
            email: normalize_email(&self.email),
            ..self.clone()
        };

        normalized.validate().map_err(|errors| {
            let mut messages: Vec<String> = errors
                .field_errors()
                .iter()
                .flat_map(|(field, errors)| {
                    errors.iter().map(move |e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| format!("{}: 유효하지 않은 값", field))
                    })
                })
                .collect();
            messages.sort();
            messages.join("; ")
        })
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("email", &self.email)
            .field("display_name", &self.display_name)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
