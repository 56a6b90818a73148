//! JWT 토큰 처리.
//!
//! Access Token 발급 및 검증 로직. 알고리즘은 HS256으로 고정되며,
//! 서명 설정은 시작 시점에 한 번 검증되어 발급기/검증기에 주입됩니다.
//!
//! 만료 규칙: `now < exp`일 때만 유효합니다. `exp == now`인 토큰은 만료된 것으로 보며
//! 시계 오차 허용(leeway)은 0입니다.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use user_core::{ConfigurationError, Identity, JwtSettings, Role};

/// 토큰 서명 알고리즘.
const ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT Access Token 페이로드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - 정규화된 이메일
    pub sub: String,
    /// 표시 이름
    pub name: String,
    /// 사용자 역할
    pub role: Role,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
    /// Issued At - 토큰 발급 시간 (Unix timestamp)
    pub iat: i64,
    /// Expiration - 토큰 만료 시간 (Unix timestamp)
    pub exp: i64,
    /// JWT ID - 토큰 고유 식별자
    pub jti: String,
}

impl Claims {
    /// 주어진 시각 기준으로 만료되었는지 확인.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }
}

/// 발급된 토큰.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// 인코딩된 JWT 문자열
    pub token: String,
    /// 만료 시각
    pub expires_at: DateTime<Utc>,
    /// 만료까지 남은 시간 (초)
    pub expires_in: i64,
}

/// JWT 토큰 생성 에러.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("토큰 인코딩 실패: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),

    #[error("만료 시각이 표현 가능한 범위를 벗어났습니다")]
    ExpiryOutOfRange,
}

/// 토큰 검증 실패.
///
/// 서명 불일치, 형식 오류, 만료를 구분하지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("유효하지 않은 토큰")]
pub struct InvalidToken;

// =============================================================================
// TokenIssuer
// =============================================================================

/// Access Token 발급기.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    issuer: String,
    audience: String,
    lifetime: Duration,
}

impl TokenIssuer {
    /// 서명 설정으로 발급기 생성.
    ///
    /// 설정이 유효하지 않으면 [`ConfigurationError`]로 즉시 실패합니다.
    pub fn new(settings: &JwtSettings) -> Result<Self, ConfigurationError> {
        settings.validate()?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            lifetime: Duration::try_seconds(settings.token_lifetime_secs)
                .ok_or(ConfigurationError::InvalidLifetime(settings.token_lifetime_secs))?,
        })
    }

    /// 토큰 수명.
    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// 현재 시각 기준으로 토큰 발급.
    pub fn issue(&self, identity: &Identity) -> Result<IssuedToken, JwtError> {
        self.issue_at(identity, Utc::now())
    }

    /// 주어진 시각 기준으로 토큰 발급.
    ///
    /// # Arguments
    ///
    /// * `identity` - 인증이 끝난 사용자 레코드
    /// * `now` - 발급 시각 (`iat`)
    pub fn issue_at(&self, identity: &Identity, now: DateTime<Utc>) -> Result<IssuedToken, JwtError> {
        let expires_at = now
            .checked_add_signed(self.lifetime)
            .ok_or(JwtError::ExpiryOutOfRange)?;
        let claims = Claims {
            sub: identity.email.clone(),
            name: identity.display_name.clone(),
            role: identity.role,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)?;

        Ok(IssuedToken {
            token,
            expires_at,
            expires_in: self.lifetime.num_seconds(),
        })
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("lifetime_secs", &self.lifetime.num_seconds())
            .finish()
    }
}

// =============================================================================
// TokenValidator
// =============================================================================

/// Access Token 검증기.
pub struct TokenValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenValidator {
    /// 서명 설정으로 검증기 생성.
    pub fn new(settings: &JwtSettings) -> Result<Self, ConfigurationError> {
        settings.validate()?;

        let mut validation = Validation::new(ALGORITHM);
        validation.set_issuer(&[settings.issuer.as_str()]);
        validation.set_audience(&[settings.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "aud", "sub"]);
        validation.leeway = 0;
        // 만료는 아래에서 배타적 규칙으로 직접 검사
        validation.validate_exp = false;

        Ok(Self {
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            validation,
        })
    }

    /// 현재 시각 기준으로 토큰 검증.
    pub fn validate(&self, token: &str) -> Result<Claims, InvalidToken> {
        self.validate_at(token, Utc::now())
    }

    /// 주어진 시각 기준으로 토큰 검증.
    ///
    /// 서명, 알고리즘, 발급자, 대상자, 만료를 확인합니다. 실패 원인은 debug 로그에만 남습니다.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, InvalidToken> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!(reason = ?e.kind(), "Token rejected");
            InvalidToken
        })?;

        let claims = data.claims;
        if claims.is_expired_at(now) {
            tracing::debug!(exp = claims.exp, now = now.timestamp(), "Token rejected: expired");
            return Err(InvalidToken);
        }

        Ok(claims)
    }
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator")
            .field("algorithms", &self.validation.algorithms)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
    use chrono::TimeZone;
    use user_core::NewIdentity;

    const TEST_SECRET: &str = "test-secret-key-for-jwt-testing-minimum-32-chars";

    fn settings() -> JwtSettings {
        JwtSettings::new(TEST_SECRET, "user-service", "user-service-api")
    }

    fn alice() -> Identity {
        NewIdentity::new("a@x.com", "Alice", "$argon2id$unused").into_identity()
    }

    #[test]
    fn test_issuer_rejects_out_of_range_lifetime() {
        for secs in [i64::MAX, 10_000_000_000_000] {
            let result = TokenIssuer::new(&settings().with_lifetime_secs(secs));
            assert!(matches!(result, Err(ConfigurationError::InvalidLifetime(s)) if s == secs));
        }
    }

    #[test]
    fn test_issue_at_far_future_is_error_not_panic() {
        let issuer = TokenIssuer::new(&settings()).unwrap();
        let result = issuer.issue_at(&alice(), DateTime::<Utc>::MAX_UTC);
        assert!(matches!(result, Err(JwtError::ExpiryOutOfRange)));
    }

    #[test]
    fn test_issue_and_validate_token() {
        let issuer = TokenIssuer::new(&settings()).unwrap();
        let validator = TokenValidator::new(&settings()).unwrap();

        let issued = issuer.issue(&alice()).unwrap();
        assert!(!issued.token.is_empty());
        assert_eq!(issued.token.split('.').count(), 3);
        assert_eq!(issued.expires_in, 3600);

        let claims = validator.validate(&issued.token).unwrap();
        assert_eq!(claims.sub, "a@x.com");
        assert_eq!(claims.name, "Alice");
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.iss, "user-service");
        assert_eq!(claims.aud, "user-service-api");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_admin_role_round_trips() {
        let issuer = TokenIssuer::new(&settings()).unwrap();
        let validator = TokenValidator::new(&settings()).unwrap();
        let admin = NewIdentity::new("root@x.com", "Root", "h")
            .with_role(Role::Admin)
            .into_identity();

        let claims = validator
            .validate(&issuer.issue(&admin).unwrap().token)
            .unwrap();
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.sub, "root@x.com");
    }

    #[test]
    fn test_each_token_has_unique_id() {
        let issuer = TokenIssuer::new(&settings()).unwrap();
        let validator = TokenValidator::new(&settings()).unwrap();
        let identity = alice();

        let a = validator.validate(&issuer.issue(&identity).unwrap().token).unwrap();
        let b = validator.validate(&issuer.issue(&identity).unwrap().token).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_invalid_settings_rejected_at_construction() {
        let empty_secret = JwtSettings::new("", "iss", "aud");
        assert!(TokenIssuer::new(&empty_secret).is_err());
        assert!(TokenValidator::new(&empty_secret).is_err());

        let no_issuer = JwtSettings::new(TEST_SECRET, "", "aud");
        assert!(matches!(
            TokenIssuer::new(&no_issuer),
            Err(ConfigurationError::MissingIssuer)
        ));

        let no_audience = JwtSettings::new(TEST_SECRET, "iss", "");
        assert!(matches!(
            TokenValidator::new(&no_audience),
            Err(ConfigurationError::MissingAudience)
        ));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let issuer = TokenIssuer::new(&settings()).unwrap();
        let validator = TokenValidator::new(&settings()).unwrap();

        let issued_at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let issued = issuer.issue_at(&alice(), issued_at).unwrap();
        let exp = issued.expires_at;

        // 만료 1초 전: 유효
        assert!(validator.validate_at(&issued.token, exp - Duration::seconds(1)).is_ok());
        // 정확히 만료 시각: 만료
        assert_eq!(validator.validate_at(&issued.token, exp), Err(InvalidToken));
        // 만료 1초 후: 항상 거부
        assert_eq!(
            validator.validate_at(&issued.token, exp + Duration::seconds(1)),
            Err(InvalidToken)
        );
    }

    #[test]
    fn test_token_issued_in_the_past_is_rejected() {
        let issuer = TokenIssuer::new(&settings()).unwrap();
        let validator = TokenValidator::new(&settings()).unwrap();

        let issued = issuer
            .issue_at(&alice(), Utc::now() - Duration::hours(2))
            .unwrap();
        assert_eq!(validator.validate(&issued.token), Err(InvalidToken));
    }

    #[test]
    fn test_wrong_secret() {
        let issuer = TokenIssuer::new(&settings()).unwrap();
        let other = JwtSettings::new(
            "wrong-secret-key-for-testing-minimum-32-chars",
            "user-service",
            "user-service-api",
        );
        let validator = TokenValidator::new(&other).unwrap();

        let token = issuer.issue(&alice()).unwrap().token;
        assert_eq!(validator.validate(&token), Err(InvalidToken));
    }

    #[test]
    fn test_wrong_issuer_or_audience() {
        let issuer = TokenIssuer::new(&settings()).unwrap();
        let token = issuer.issue(&alice()).unwrap().token;

        let other_issuer =
            TokenValidator::new(&JwtSettings::new(TEST_SECRET, "someone-else", "user-service-api"))
                .unwrap();
        assert_eq!(other_issuer.validate(&token), Err(InvalidToken));

        let other_audience =
            TokenValidator::new(&JwtSettings::new(TEST_SECRET, "user-service", "another-api"))
                .unwrap();
        assert_eq!(other_audience.validate(&token), Err(InvalidToken));
    }

    #[test]
    fn test_malformed_tokens() {
        let validator = TokenValidator::new(&settings()).unwrap();
        for token in ["", "invalid.token.here", "a.b", "....", "not a jwt"] {
            assert_eq!(validator.validate(token), Err(InvalidToken));
        }
    }

    #[test]
    fn test_unsigned_token_rejected() {
        let validator = TokenValidator::new(&settings()).unwrap();
        let issuer = TokenIssuer::new(&settings()).unwrap();
        let token = issuer.issue(&alice()).unwrap().token;
        let parts: Vec<&str> = token.split('.').collect();

        let none_header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let forged = format!("{}.{}.", none_header, parts[1]);
        assert_eq!(validator.validate(&forged), Err(InvalidToken));
    }

    fn flip_bit(segment: &str, bit: usize) -> String {
        let mut bytes = URL_SAFE_NO_PAD.decode(segment).unwrap();
        bytes[bit / 8] ^= 1 << (bit % 8);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    #[test]
    fn test_any_single_bit_flip_is_rejected() {
        let issuer = TokenIssuer::new(&settings()).unwrap();
        let validator = TokenValidator::new(&settings()).unwrap();
        let token = issuer.issue(&alice()).unwrap().token;
        let parts: Vec<&str> = token.split('.').collect();

        let payload_bits = URL_SAFE_NO_PAD.decode(parts[1]).unwrap().len() * 8;
        for bit in 0..payload_bits {
            let tampered = format!("{}.{}.{}", parts[0], flip_bit(parts[1], bit), parts[2]);
            assert_eq!(validator.validate(&tampered), Err(InvalidToken), "payload bit {bit}");
        }

        let signature_bits = URL_SAFE_NO_PAD.decode(parts[2]).unwrap().len() * 8;
        for bit in 0..signature_bits {
            let tampered = format!("{}.{}.{}", parts[0], parts[1], flip_bit(parts[2], bit));
            assert_eq!(validator.validate(&tampered), Err(InvalidToken), "signature bit {bit}");
        }
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let issuer = TokenIssuer::new(&settings()).unwrap();
        let validator = TokenValidator::new(&settings()).unwrap();
        assert!(!format!("{:?}", issuer).contains(TEST_SECRET));
        assert!(!format!("{:?}", validator).contains(TEST_SECRET));
    }
}
