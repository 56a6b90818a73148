//! # User Core
//!
//! 사용자 식별/인증 서비스의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 서비스 전반에서 사용되는 기본 타입을 제공합니다:
//! - 사용자 식별 레코드 및 프로필
//! - 역할(Role) 및 역할 정책(RolePolicy)
//! - 자격증명 저장소 계약 (`CredentialStore`)
//! - 설정 관리
//! - 로깅 인프라
//! - 에러 분류

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
