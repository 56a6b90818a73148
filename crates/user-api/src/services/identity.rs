//! Identity 서비스.
//!
//! 가입, 인증, 프로필 조회를 구현하는 오케스트레이터입니다.
//! 자체 상태는 없으며 저장소, 해셔, 토큰 발급기를 조합합니다.
//!
//! 하위 계층 장애는 [`IdentityError::Unavailable`]로 감싸 올리고,
//! 원인 기록은 호출자(HTTP 계층) 책임입니다.

use std::sync::Arc;

use tracing::{info, warn};
use user_core::{
    normalize_email, CredentialStore, IdentityError, IdentityResult, NewIdentity, Profile,
    Registration, Role, StoreError,
};

use crate::auth::{IssuedToken, PasswordHasher, TokenIssuer};
use crate::metrics::record_auth_attempt;

/// Identity 서비스.
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    issuer: Arc<TokenIssuer>,
}

impl IdentityService {
    /// 새 서비스 생성.
    ///
    /// # Arguments
    ///
    /// * `store` - 자격증명 저장소
    /// * `hasher` - 비밀번호 해셔
    /// * `issuer` - 토큰 발급기 (시작 시점에 검증된 설정으로 생성)
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        issuer: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            store,
            hasher,
            issuer,
        }
    }

    /// 토큰 발급기.
    pub fn token_issuer(&self) -> &TokenIssuer {
        &self.issuer
    }

    /// 기본 역할(`User`)로 가입.
    pub async fn register(&self, registration: Registration) -> IdentityResult<Profile> {
        self.register_with_role(registration, Role::User).await
    }

    /// 지정한 역할로 가입.
    ///
    /// 관리자 계정 생성 같은 배포 시점 작업용입니다. HTTP 경로는 항상 [`Self::register`]를 사용합니다.
    pub async fn register_with_role(
        &self,
        registration: Registration,
        role: Role,
    ) -> IdentityResult<Profile> {
        if let Err(message) = registration.check() {
            record_auth_attempt("register", "validation_error");
            return Err(IdentityError::Validation(message));
        }

        let email = normalize_email(&registration.email);

        // 빠른 경로: 이미 존재하면 해싱 비용 없이 거절
        if self.find(&email).await?.is_some() {
            warn!(email = %email, "Registration rejected: email already registered");
            record_auth_attempt("register", "conflict");
            return Err(IdentityError::Conflict);
        }

        let password_hash = self.hash_password(registration.password).await?;
        let identity =
            NewIdentity::new(&email, registration.display_name, password_hash).with_role(role);

        match self.store.add_identity(identity).await {
            Ok(created) => {
                info!(email = %created.email, role = %created.role, "User registered");
                record_auth_attempt("register", "success");
                Ok(created.to_profile())
            }
            // 동시 가입 경합은 저장소 고유 제약으로 판정
            Err(StoreError::DuplicateEmail(_)) => {
                warn!(email = %email, "Registration rejected: email already registered");
                record_auth_attempt("register", "conflict");
                Err(IdentityError::Conflict)
            }
            Err(e) => {
                record_auth_attempt("register", "error");
                Err(IdentityError::unavailable(e))
            }
        }
    }

    /// 자격증명 검증 후 토큰 발급.
    ///
    /// 계정이 없는 경우와 비밀번호가 틀린 경우 모두 [`IdentityError::InvalidCredentials`]를 반환합니다.
    /// 계정이 없어도 같은 비용의 해시 검증을 수행합니다.
    pub async fn authenticate(&self, email: &str, password: &str) -> IdentityResult<IssuedToken> {
        let email = normalize_email(email);

        let identity = match self.find(&email).await {
            Ok(identity) => identity,
            Err(e) => {
                record_auth_attempt("authenticate", "error");
                return Err(e);
            }
        };

        let Some(identity) = identity else {
            self.verify_dummy(password.to_string()).await?;
            warn!(email = %email, "Authentication failed");
            record_auth_attempt("authenticate", "invalid_credentials");
            return Err(IdentityError::InvalidCredentials);
        };

        let verified = self
            .verify_password(password.to_string(), identity.password_hash().to_string())
            .await?;
        if !verified {
            warn!(email = %email, "Authentication failed");
            record_auth_attempt("authenticate", "invalid_credentials");
            return Err(IdentityError::InvalidCredentials);
        }

        let issued = self.issuer.issue(&identity).map_err(|e| {
            record_auth_attempt("authenticate", "error");
            IdentityError::unavailable(e)
        })?;

        info!(email = %email, role = %identity.role, "User authenticated");
        record_auth_attempt("authenticate", "success");
        Ok(issued)
    }

    /// 프로필 조회.
    pub async fn get_profile(&self, email: &str) -> IdentityResult<Profile> {
        let email = normalize_email(email);
        self.find(&email)
            .await?
            .map(|identity| identity.to_profile())
            .ok_or(IdentityError::NotFound)
    }

    async fn find(&self, email: &str) -> IdentityResult<Option<user_core::Identity>> {
        self.store
            .find_by_email(email)
            .await
            .map_err(IdentityError::unavailable)
    }

    // Argon2는 CPU 집약적이므로 blocking thread pool에서 실행

    async fn hash_password(&self, password: String) -> IdentityResult<String> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(IdentityError::unavailable)?
            .map_err(IdentityError::unavailable)
    }

    async fn verify_password(&self, password: String, hash: String) -> IdentityResult<bool> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(IdentityError::unavailable)
    }

    async fn verify_dummy(&self, password: String) -> IdentityResult<()> {
        let hasher = self.hasher.clone();
        tokio::task::spawn_blocking(move || hasher.verify_dummy(&password))
            .await
            .map_err(IdentityError::unavailable)
    }
}
