//! Identity tiers and token lifecycle.

mod manager;
mod role;

pub use manager::{AuthManager, AuthState};
pub use role::Role;
