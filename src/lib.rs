//! Records Store Conformance Harness
//!
//! Drives a records-store HTTP API through every operation, identity and
//! validity class, and checks the status and body of each response.

pub mod auth;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod fixtures;
pub mod models;
pub mod scenarios;

// Re-export commonly used types for convenience
pub use auth::{AuthManager, Role};
pub use client::ApiClient;
pub use config::{CliConfig, FileConfig, HarnessConfig};
pub use error::{AssertionFailure, HarnessError};
pub use scenarios::{ConformanceSuite, Resource, SuiteSummary};
