//! 비밀번호 해싱 유틸리티.
//!
//! Argon2id 기반 비밀번호 해싱 및 상수 시간 검증.

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use std::sync::Arc;
use user_core::{ConfigurationError, PasswordConfig};

/// 비밀번호 처리 에러.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("비밀번호 해싱 실패: {0}")]
    HashingFailed(String),
}

/// 비밀번호 해셔.
///
/// 상태가 없는 순수 연산이며 복제 비용이 작습니다. 해시마다 OS 난수원에서
/// 새 솔트를 생성하고, 결과는 알고리즘/파라미터/솔트/다이제스트를 담은
/// PHC 문자열 하나로 반환됩니다.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    /// 존재하지 않는 계정 인증 시 비교 대상으로 쓰는 해시
    dummy_hash: Arc<str>,
}

impl std::fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", self.argon2.params())
            .finish()
    }
}

impl PasswordHasher {
    /// 설정된 비용 파라미터로 해셔 생성.
    ///
    /// 파라미터가 Argon2 허용 범위를 벗어나면 시작 시점에 실패합니다.
    pub fn new(config: &PasswordConfig) -> Result<Self, ConfigurationError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| ConfigurationError::InvalidHashParams(e.to_string()))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let salt = SaltString::generate(&mut OsRng);
        let dummy_hash = argon2
            .hash_password(b"timing-equalizer", &salt)
            .map_err(|e| ConfigurationError::InvalidHashParams(e.to_string()))?
            .to_string();

        Ok(Self {
            argon2,
            dummy_hash: Arc::from(dummy_hash),
        })
    }

    /// 비밀번호 해싱.
    ///
    /// # Arguments
    ///
    /// * `password` - 해싱할 평문 비밀번호
    ///
    /// # Returns
    ///
    /// PHC 형식의 해시 문자열 (솔트 포함)
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let hash = hasher.hash("my_secure_password")?;
    /// // "$argon2id$v=19$m=19456,t=2,p=1$..."
    /// ```
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// 비밀번호 검증.
    ///
    /// 저장된 해시에 기록된 파라미터와 솔트로 다이제스트를 다시 계산해 상수 시간으로
    /// 비교합니다. 불일치나 손상된 해시는 모두 `false`이며 패닉하지 않습니다.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// 비교 대상 계정이 없을 때 동일한 비용의 검증을 수행합니다.
    ///
    /// 결과는 항상 버려집니다.
    pub fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.dummy_hash);
    }
}
