//! 역할 기반 권한 판정.

use user_core::RolePolicy;

use super::Claims;

/// 검증된 Claims가 역할 정책을 만족하는지 판정합니다.
///
/// `claims.role`이 정책의 역할 집합에 속할 때만 `true`입니다.
pub fn authorize(claims: &Claims, policy: RolePolicy) -> bool {
    let permitted = policy.permits(claims.role);
    if !permitted {
        tracing::debug!(
            sub = %claims.sub,
            role = %claims.role,
            policy = policy.name(),
            "Authorization denied"
        );
    }
    permitted
}
