//! 비즈니스 서비스 모듈.

pub mod identity;

pub use identity::IdentityService;
