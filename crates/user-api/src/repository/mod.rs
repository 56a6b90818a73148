//! 자격증명 저장소 구현.
//!
//! 핵심 로직은 [`user_core::CredentialStore`] 계약에만 의존하며,
//! 원시 쿼리는 이 모듈 안에만 존재합니다.

pub mod memory;
pub mod users;

pub use memory::InMemoryCredentialStore;
pub use users::PgCredentialStore;
