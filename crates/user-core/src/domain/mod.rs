//! 도메인 모델.

mod credential_store;
mod identity;
mod role;

pub use credential_store::{CredentialStore, StoreError};
pub use identity::{normalize_email, Identity, NewIdentity, Profile, Registration};
pub use role::{Role, RolePolicy};
