//! 인증 및 권한 부여.
//!
//! JWT 기반 인증 및 역할 기반 접근 제어(RBAC)를 제공합니다.
//!
//! # 구성 요소
//!
//! - [`PasswordHasher`]: Argon2id 비밀번호 해싱/검증
//! - [`TokenIssuer`] / [`TokenValidator`]: HS256 Access Token 발급/검증
//! - [`authorize`]: 역할 정책 판정
//! - [`AuthUser`], [`UserAuth`], [`AdminAuth`]: Axum 추출기
//!
//! # 사용 예시
//!
//! ```rust,ignore
//! async fn admin_only(AdminAuth(user): AdminAuth) -> impl IntoResponse {
//!     format!("Hello, {}!", user.email)
//! }
//! ```

mod jwt;
mod middleware;
mod password;
mod policy;

pub use jwt::{Claims, InvalidToken, IssuedToken, JwtError, TokenIssuer, TokenValidator};
pub use middleware::{AdminAuth, AuthUser, AuthenticatedUser, JwtAuthError, UserAuth};
pub use password::{PasswordError, PasswordHasher};
pub use policy::authorize;
