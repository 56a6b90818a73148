//! 사용자 서비스 관리 도구.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 비밀번호 해시 생성
//! - 배포 시점 계정 생성 (관리자 계정 포함)
//! - Access Token 검사

pub mod commands;

pub use commands::*;
