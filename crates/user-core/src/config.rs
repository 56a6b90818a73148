//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 설정은 프로세스 시작 시 한 번 구성되어 주입되며, 요청마다 다시 읽지 않습니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigurationError;

/// HS256 서명 키 최소 길이 (바이트).
pub const MIN_SECRET_LEN: usize = 32;

/// 기본 토큰 수명 (초).
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

/// 토큰 수명 상한 (365일)
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 365 * 24 * 60 * 60;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 데이터베이스 설정
    pub database: DatabaseConfig,
    /// JWT 서명 설정
    pub jwt: JwtSettings,
    /// 비밀번호 해시 설정
    pub password: PasswordConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// 인증 엔드포인트 요청 제한 설정
    pub rate_limit: RateLimitSettings,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 허용 CORS origin 목록 (비어 있으면 모두 허용)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            request_timeout_secs: 30,
            cors_origins: Vec::new(),
        }
    }
}

/// 데이터베이스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// PostgreSQL 연결 URL (없으면 메모리 저장소 사용)
    pub url: Option<String>,
    /// 최대 연결 수
    pub max_connections: u32,
    /// 연결 타임아웃 (초)
    pub connection_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            connection_timeout_secs: 10,
        }
    }
}

/// JWT 서명 설정.
///
/// 서명 키, 발급자, 대상자는 모두 필수입니다. 누락은 시작 시점의 치명적 오류입니다.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct JwtSettings {
    /// HMAC 서명 키
    #[serde(skip_serializing)]
    pub secret: String,
    /// 토큰 발급자
    pub issuer: String,
    /// 토큰 대상자
    pub audience: String,
    /// 토큰 수명 (초)
    pub token_lifetime_secs: i64,
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issuer: String::new(),
            audience: String::new(),
            token_lifetime_secs: DEFAULT_TOKEN_LIFETIME_SECS,
        }
    }
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"[REDACTED]")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("token_lifetime_secs", &self.token_lifetime_secs)
            .finish()
    }
}

impl JwtSettings {
    /// 새 설정 생성.
    pub fn new(
        secret: impl Into<String>,
        issuer: impl Into<String>,
        audience: impl Into<String>,
    ) -> Self {
        Self {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            token_lifetime_secs: DEFAULT_TOKEN_LIFETIME_SECS,
        }
    }

    /// 토큰 수명 설정.
    #[must_use]
    pub fn with_lifetime_secs(mut self, secs: i64) -> Self {
        self.token_lifetime_secs = secs;
        self
    }

    /// 설정 검증.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.secret.is_empty() {
            return Err(ConfigurationError::MissingSecret);
        }
        if self.secret.len() < MIN_SECRET_LEN {
            return Err(ConfigurationError::SecretTooShort {
                min: MIN_SECRET_LEN,
                actual: self.secret.len(),
            });
        }
        if self.issuer.trim().is_empty() {
            return Err(ConfigurationError::MissingIssuer);
        }
        if self.audience.trim().is_empty() {
            return Err(ConfigurationError::MissingAudience);
        }
        if !(1..=MAX_TOKEN_LIFETIME_SECS).contains(&self.token_lifetime_secs) {
            return Err(ConfigurationError::InvalidLifetime(self.token_lifetime_secs));
        }
        Ok(())
    }
}

/// 비밀번호 해시 (Argon2id) 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PasswordConfig {
    /// 메모리 비용 (KiB)
    pub memory_kib: u32,
    /// 반복 횟수
    pub iterations: u32,
    /// 병렬도
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// 인증 엔드포인트 요청 제한 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitSettings {
    /// 활성화 여부
    pub enabled: bool,
    /// IP당 분당 최대 요청 수
    pub requests_per_minute: u32,
    /// 버스트 허용량
    pub burst_size: u32,
    /// `X-Forwarded-For`/`X-Real-IP` 헤더 신뢰 여부 (프록시 뒤에서만 활성화)
    pub trust_proxy_headers: bool,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_minute: 60,
            burst_size: 10,
            trust_proxy_headers: false,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일은 선택 사항입니다. 환경 변수는 `USERSVC__` 접두사와 `__` 구분자를 사용합니다
    /// (예: `USERSVC__JWT__SECRET`).
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let builder = config::Config::builder()
            // 기본값으로 시작
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("USERSVC")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, ConfigurationError> {
        Self::load("config/default.toml")
    }

    /// 시작 시점 검증. 서명 설정이 유효하지 않으면 실패합니다.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.jwt.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    #[test]
    fn test_jwt_settings_valid() {
        let settings = JwtSettings::new(SECRET, "user-service", "user-service-api");
        assert!(settings.validate().is_ok());
        assert_eq!(settings.token_lifetime_secs, 3600);
    }

    #[test]
    fn test_jwt_settings_missing_fields() {
        let missing_secret = JwtSettings::new("", "iss", "aud");
        assert!(matches!(
            missing_secret.validate(),
            Err(ConfigurationError::MissingSecret)
        ));

        let short_secret = JwtSettings::new("short", "iss", "aud");
        assert!(matches!(
            short_secret.validate(),
            Err(ConfigurationError::SecretTooShort { actual: 5, .. })
        ));

        let missing_issuer = JwtSettings::new(SECRET, "  ", "aud");
        assert!(matches!(
            missing_issuer.validate(),
            Err(ConfigurationError::MissingIssuer)
        ));

        let missing_audience = JwtSettings::new(SECRET, "iss", "");
        assert!(matches!(
            missing_audience.validate(),
            Err(ConfigurationError::MissingAudience)
        ));

        let bad_lifetime = JwtSettings::new(SECRET, "iss", "aud").with_lifetime_secs(0);
        assert!(matches!(
            bad_lifetime.validate(),
            Err(ConfigurationError::InvalidLifetime(0))
        ));
    }

    #[test]
    fn test_jwt_lifetime_upper_bound() {
        let one_year = JwtSettings::new(SECRET, "iss", "aud").with_lifetime_secs(MAX_TOKEN_LIFETIME_SECS);
        assert!(one_year.validate().is_ok());

        for secs in [MAX_TOKEN_LIFETIME_SECS + 1, 10_000_000_000_000, i64::MAX] {
            let settings = JwtSettings::new(SECRET, "iss", "aud").with_lifetime_secs(secs);
            assert!(
                matches!(settings.validate(), Err(ConfigurationError::InvalidLifetime(s)) if s == secs),
                "lifetime {secs} should be rejected"
            );
        }
    }

    #[test]
    fn test_jwt_settings_debug_redacts_secret() {
        let settings = JwtSettings::new(SECRET, "iss", "aud");
        let debug = format!("{:?}", settings);
        assert!(!debug.contains(SECRET));
    }

    #[test]
    fn test_jwt_settings_secret_not_serialized() {
        let settings = JwtSettings::new(SECRET, "iss", "aud");
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains(SECRET));
    }

    #[test]
    fn test_default_config_fails_validation() {
        // 서명 키가 없으면 시작할 수 없음
        let config = AppConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load("does/not/exist.toml").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.jwt.token_lifetime_secs, DEFAULT_TOKEN_LIFETIME_SECS);
        assert_eq!(config.password.iterations, 2);
        assert!(config.rate_limit.enabled);
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("user-core-config-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("service.toml");
        std::fs::write(
            &path,
            format!(
                r#"
[server]
port = 8081

[jwt]
secret = "{SECRET}"
issuer = "user-service"
audience = "user-service-api"
token_lifetime_secs = 900
"#
            ),
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.jwt.issuer, "user-service");
        assert_eq!(config.jwt.token_lifetime_secs, 900);
        assert!(config.validate().is_ok());

        std::fs::remove_dir_all(&dir).ok();
    }
}
