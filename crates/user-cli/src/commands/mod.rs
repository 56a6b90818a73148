//! CLI 명령어 구현 모듈.

pub mod create_user;
pub mod hash_password;
pub mod inspect_token;
