use serde::{Deserialize, Serialize};

/// Authorization tier a request is made as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// No credentials, no `Authorization` header.
    Anonymous,
    /// Authenticated without admin rights.
    User,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Anonymous, Role::User, Role::Admin];

    /// Roles backed by a configured identity, in acquisition order.
    pub const AUTHENTICATED: [Role; 2] = [Role::Admin, Role::User];

    pub fn requires_token(self) -> bool {
        !matches!(self, Role::Anonymous)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Anonymous => "anonymous",
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
