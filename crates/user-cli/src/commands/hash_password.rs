//! 비밀번호 해시 생성.

use anyhow::{Context, Result};
use user_api::PasswordHasher;
use user_core::PasswordConfig;

/// 설정된 Argon2 파라미터로 PHC 형식 해시 문자열을 생성합니다.
pub fn hash_password(config: &PasswordConfig, password: &str) -> Result<String> {
    if password.is_empty() {
        anyhow::bail!("Password must not be empty");
    }

    let hasher = PasswordHasher::new(config).context("Invalid password hashing parameters")?;
    hasher
        .hash(password)
        .context("Failed to hash password")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap_params() -> PasswordConfig {
        PasswordConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn test_hash_password_produces_verifiable_phc_string() {
        let config = cheap_params();
        let hash = hash_password(&config, "hunter2").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        let hasher = PasswordHasher::new(&config).unwrap();
        assert!(hasher.verify("hunter2", &hash));
        assert!(!hasher.verify("hunter3", &hash));
    }

    #[test]
    fn test_hash_password_rejects_empty_input() {
        assert!(hash_password(&cheap_params(), "").is_err());
    }

    #[test]
    fn test_hash_password_rejects_bad_params() {
        let config = PasswordConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 0,
        };
        assert!(hash_password(&config, "pw").is_err());
    }
}
