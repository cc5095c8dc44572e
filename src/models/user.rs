use super::Tagged;
use crate::fixtures::{generate_email, generate_name};
use serde::{Deserialize, Serialize};

/// Password used for every generated registration.
pub const GENERATED_PASSWORD: &str = "password";

/// A credential pair exercising one authorization tier.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            email: None,
        }
    }
}

// Keeps passwords out of logs.
impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Body of `POST /auth/register`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn generated() -> Self {
        Self {
            email: generate_email(),
            username: generate_name(),
            password: GENERATED_PASSWORD.to_string(),
        }
    }

    /// Rejected by the server's email validation.
    pub fn with_malformed_email() -> Self {
        Self {
            email: "not-an-email".to_string(),
            ..Self::generated()
        }
    }
}

/// Body of `PATCH /auth/users/{username}/rights`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RightsPatch {
    pub is_admin: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: String,
}

impl User {
    /// Username must match exactly; the server may normalize email casing.
    pub fn matches(&self, request: &RegisterRequest) -> bool {
        self.username == request.username && self.email.eq_ignore_ascii_case(&request.email)
    }
}

impl Tagged for User {
    fn id(&self) -> i64 {
        self.id
    }

    fn tag_field(&self) -> Option<&str> {
        Some(&self.username)
    }
}
