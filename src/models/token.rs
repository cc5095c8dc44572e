use serde::{Deserialize, Serialize};

/// Response of the credential exchange.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

impl Token {
    /// Value for the `Authorization` header. The scheme is always `Bearer`,
    /// whatever casing the server reports in `token_type`.
    pub fn authorization_value(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}
