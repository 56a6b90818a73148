//! 메모리 기반 사용자 저장소.
//!
//! DB URL이 설정되지 않은 개발 환경과 테스트에서 사용합니다.
//! 프로세스가 종료되면 데이터는 사라집니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use tokio::sync::RwLock;
use user_core::{CredentialStore, Identity, NewIdentity, Role, StoreError};
use uuid::Uuid;

/// 저장된 행.
struct StoredUser {
    id: Uuid,
    email: String,
    display_name: String,
    password_hash: String,
    role: Role,
    created_at: DateTime<Utc>,
}

impl StoredUser {
    fn to_identity(&self) -> Identity {
        Identity {
            id: self.id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            password_hash: SecretString::from(self.password_hash.clone()),
            role: self.role,
            created_at: self.created_at,
        }
    }
}

/// 메모리 기반 자격증명 저장소.
///
/// 중복 확인과 삽입을 하나의 쓰기 잠금 안에서 수행하므로
/// 같은 이메일의 동시 등록은 정확히 하나만 성공합니다.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: RwLock<HashMap<String, StoredUser>>,
}

impl InMemoryCredentialStore {
    /// 빈 저장소 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 저장된 사용자 수.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// 비어 있는지 확인.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn add_identity(&self, identity: NewIdentity) -> Result<Identity, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&identity.email) {
            return Err(StoreError::DuplicateEmail(identity.email));
        }

        let stored = StoredUser {
            id: identity.id,
            email: identity.email.clone(),
            display_name: identity.display_name,
            password_hash: identity.password_hash.expose_secret().to_string(),
            role: identity.role,
            created_at: identity.created_at,
        };
        let created = stored.to_identity();
        users.insert(identity.email, stored);

        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, StoreError> {
        Ok(self.users.read().await.get(email).map(StoredUser::to_identity))
    }
}
