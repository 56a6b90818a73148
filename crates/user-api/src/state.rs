//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! 시작 시점에 한 번 구성되며 `Arc`로 래핑되어 요청 간에 공유됩니다.
//! 요청 처리 중 변경되는 상태는 없습니다.

use std::sync::Arc;

use crate::auth::TokenValidator;
use crate::services::IdentityService;

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 가입/인증/프로필 조회 서비스
    pub identity: IdentityService,

    /// 보호된 라우트용 토큰 검증기
    pub token_validator: Arc<TokenValidator>,

    /// 데이터베이스 연결 풀 (없으면 메모리 저장소 사용 중)
    pub db_pool: Option<sqlx::PgPool>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 새로운 AppState 생성.
    pub fn new(identity: IdentityService, token_validator: Arc<TokenValidator>) -> Self {
        Self {
            identity,
            token_validator,
            db_pool: None,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 데이터베이스 연결 설정.
    pub fn with_db_pool(mut self, pool: sqlx::PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 데이터베이스 연결 상태 확인.
    ///
    /// DB 없이 실행 중이면 `None`.
    pub async fn is_db_healthy(&self) -> Option<bool> {
        match &self.db_pool {
            Some(pool) => Some(sqlx::query("SELECT 1").fetch_one(pool).await.is_ok()),
            None => None,
        }
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 실제 DB 연결 없이 메모리 저장소와 낮은 비용의 해시 파라미터로 상태를 생성합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use crate::auth::{PasswordHasher, TokenIssuer};
    use crate::repository::InMemoryCredentialStore;
    use user_core::PasswordConfig;

    let settings = test_jwt_settings();
    let hasher = PasswordHasher::new(&PasswordConfig {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    })
    .expect("test hash params");
    let issuer = TokenIssuer::new(&settings).expect("test jwt settings");
    let validator = TokenValidator::new(&settings).expect("test jwt settings");

    let identity = IdentityService::new(
        Arc::new(InMemoryCredentialStore::new()),
        hasher,
        Arc::new(issuer),
    );

    AppState::new(identity, Arc::new(validator))
}

/// 테스트용 JWT 설정.
#[cfg(any(test, feature = "test-utils"))]
pub fn test_jwt_settings() -> user_core::JwtSettings {
    user_core::JwtSettings::new(
        "test-secret-key-for-jwt-testing-minimum-32-chars",
        "user-service",
        "user-service-api",
    )
}
