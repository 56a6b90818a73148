//! 역할 기반 접근 제어 (RBAC).
//!
//! 사용자 역할 및 역할 정책 정의.

use serde::{Deserialize, Serialize};

/// 사용자 역할.
///
/// 닫힌 집합입니다. 역할 추가는 배포 시점의 결정이며 요청 시점에 바뀌지 않습니다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
pub enum Role {
    /// 일반 사용자 (가입 시 기본값)
    #[default]
    User,
    /// 관리자
    Admin,
}

impl Role {
    /// 저장/전송에 사용하는 식별자.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
        }
    }

    /// 문자열에서 역할 파싱 (대소문자 무시).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s).ok_or_else(|| format!("Unknown role: {}", s))
    }
}

/// 역할 정책.
///
/// 보호된 작업을 허가하는 데 충분한 역할 집합에 이름을 붙인 것입니다.
/// 집합은 서로 배타적이지 않습니다: `Admin`은 `UserOrAdmin`도 만족합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RolePolicy {
    /// 관리자 전용
    AdminOnly,
    /// 일반 사용자 또는 관리자
    UserOrAdmin,
}

impl RolePolicy {
    /// 정책이 허용하는 역할 집합.
    pub fn roles(&self) -> &'static [Role] {
        match self {
            RolePolicy::AdminOnly => &[Role::Admin],
            RolePolicy::UserOrAdmin => &[Role::User, Role::Admin],
        }
    }

    /// 역할이 정책을 만족하는지 확인.
    pub fn permits(&self, role: Role) -> bool {
        self.roles().contains(&role)
    }

    /// 정책 이름.
    pub fn name(&self) -> &'static str {
        match self {
            RolePolicy::AdminOnly => "AdminPolicy",
            RolePolicy::UserOrAdmin => "UserPolicy",
        }
    }
}
