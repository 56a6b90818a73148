//! Access Token 검사.

use anyhow::{Context, Result};
use user_api::{Claims, TokenValidator};
use user_core::JwtSettings;

/// 설정된 서명 키/발급자/대상으로 토큰을 검증하고 클레임을 반환합니다.
///
/// 실패 사유는 구분하지 않습니다 (서명, 만료, 발급자 등 모두 동일한 에러).
pub fn inspect_token(settings: &JwtSettings, token: &str) -> Result<Claims> {
    let validator = TokenValidator::new(settings).context("Invalid JWT settings")?;
    validator
        .validate(token.trim())
        .map_err(|_| anyhow::anyhow!("Token is invalid or expired"))
}

/// 클레임을 사람이 읽기 쉬운 JSON으로 변환합니다.
pub fn render_claims(claims: &Claims) -> Result<String> {
    serde_json::to_string_pretty(claims).context("Failed to serialize claims")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use user_api::{test_jwt_settings, TokenIssuer};
    use user_core::{NewIdentity, Role};

    fn identity() -> user_core::Identity {
        NewIdentity::new("a@x.com", "Alice", "unused")
            .with_role(Role::Admin)
            .into_identity()
    }

    #[test]
    fn test_inspect_valid_token() {
        let settings = test_jwt_settings();
        let issued = TokenIssuer::new(&settings).unwrap().issue(&identity()).unwrap();

        let claims = inspect_token(&settings, &format!("  {}\n", issued.token)).unwrap();
        assert_eq!(claims.sub, "a@x.com");
        assert_eq!(claims.role, Role::Admin);

        let rendered = render_claims(&claims).unwrap();
        assert!(rendered.contains("\"role\": \"Admin\""));
    }

    #[test]
    fn test_inspect_expired_token() {
        let settings = test_jwt_settings();
        let issued = TokenIssuer::new(&settings)
            .unwrap()
            .issue_at(&identity(), Utc::now() - Duration::hours(2))
            .unwrap();

        let err = inspect_token(&settings, &issued.token).unwrap_err();
        assert!(err.to_string().contains("invalid or expired"));
    }

    #[test]
    fn test_inspect_with_invalid_settings() {
        let settings = JwtSettings::new("short", "iss", "aud");
        assert!(inspect_token(&settings, "a.b.c").is_err());
    }
}
