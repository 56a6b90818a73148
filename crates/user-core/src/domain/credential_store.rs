//! 자격증명 저장소 추상화.
//!
//! 사용자 레코드의 영속화 계층에 대한 좁은 계약을 정의합니다.
//! 핵심 로직은 원시 쿼리를 직접 수행하지 않고 이 trait에만 의존합니다.

use async_trait::async_trait;
use thiserror::Error;

use super::{Identity, NewIdentity};

// =============================================================================
// 에러 타입
// =============================================================================

/// CredentialStore 에러.
#[derive(Debug, Error)]
pub enum StoreError {
    /// 이메일 중복 (저장소의 고유 제약 위반)
    #[error("이메일이 이미 등록되어 있습니다: {0}")]
    DuplicateEmail(String),

    /// 저장소 장애 (연결 실패, 쿼리 실패 등)
    #[error("저장소 사용 불가: {0}")]
    Unavailable(String),

    /// 저장된 데이터 손상 (알 수 없는 역할 등)
    #[error("저장된 레코드가 손상되었습니다: {0}")]
    Corrupted(String),
}

// =============================================================================
// CredentialStore Trait
// =============================================================================

/// 사용자 자격증명 저장소 trait.
///
/// 구현체는 이메일 고유성을 스스로 보장해야 합니다 (예: DB 고유 제약).
/// 동일 이메일로 동시에 `add_identity`가 호출되면 정확히 하나만 성공하고
/// 나머지는 [`StoreError::DuplicateEmail`]을 반환해야 합니다.
///
/// 같은 저장소 인스턴스에서 삽입은 이후의 조회에 보여야 합니다.
///
/// # 구현 예시
///
/// ```ignore
/// pub struct PgCredentialStore {
///     pool: PgPool,
/// }
///
/// #[async_trait]
/// impl CredentialStore for PgCredentialStore {
///     async fn add_identity(&self, identity: NewIdentity) -> Result<Identity, StoreError> {
///         // INSERT INTO users ...
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// 새 사용자 레코드 저장.
    ///
    /// 이메일이 이미 존재하면 [`StoreError::DuplicateEmail`]을 반환합니다.
    async fn add_identity(&self, identity: NewIdentity) -> Result<Identity, StoreError>;

    /// 이메일로 사용자 조회.
    ///
    /// `email`은 호출자가 정규화한 값이어야 합니다.
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError>;
}
