//! PostgreSQL 사용자 저장소.
//!
//! `users` 테이블에 대한 [`CredentialStore`] 구현입니다.
//! 이메일 고유성은 DB 고유 제약으로 보장합니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use user_core::{CredentialStore, Identity, NewIdentity, Role, StoreError};
use uuid::Uuid;

/// `users` 테이블 행.
#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    display_name: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for Identity {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role).ok_or_else(|| {
            StoreError::Corrupted(format!("unknown role '{}' for user {}", row.role, row.id))
        })?;

        Ok(Identity {
            id: row.id,
            email: row.email,
            display_name: row.display_name,
            password_hash: SecretString::from(row.password_hash),
            role,
            created_at: row.created_at,
        })
    }
}

/// sqlx 에러를 저장소 에러로 변환.
fn map_sqlx_error(err: sqlx::Error, email: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            // PostgreSQL 고유 제약 조건 위반
            StoreError::DuplicateEmail(email.to_string())
        }
        _ => StoreError::Unavailable(err.to_string()),
    }
}

/// PostgreSQL 기반 자격증명 저장소.
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    /// 새 저장소 생성.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn add_identity(&self, identity: NewIdentity) -> Result<Identity, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, display_name, password_hash, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, email, display_name, password_hash, role, created_at
            "#,
        )
        .bind(identity.id)
        .bind(&identity.email)
        .bind(&identity.display_name)
        .bind(identity.password_hash.expose_secret())
        .bind(identity.role.as_str())
        .bind(identity.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, &identity.email))?;

        row.try_into()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, display_name, password_hash, role, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, email))?;

        row.map(Identity::try_from).transpose()
    }
}
