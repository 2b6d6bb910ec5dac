use stockflow_auth::Role;
use stockflow_core::UserId;

/// Verified caller identity for a request.
///
/// Attached by the auth middleware after token validation; handlers (and
/// through them the transfer core) trust its presence and never re-verify
/// credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerContext {
    user_id: UserId,
    username: String,
    role: Role,
}

impl CallerContext {
    pub fn new(user_id: UserId, username: String, role: Role) -> Self {
        Self {
            user_id,
            username,
            role,
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> &Role {
        &self.role
    }
}
