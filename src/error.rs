//! Error taxonomy of the harness.

use crate::auth::Role;
use crate::endpoints::TemplateError;
use reqwest::{Method, StatusCode};
use thiserror::Error;

/// A response that did not match the contract of a scenario.
#[derive(Debug, Error)]
pub enum AssertionFailure {
    #[error("{method} {path}: expected status {expected}, got {actual} (body: {body})")]
    Status {
        method: Method,
        path: String,
        expected: StatusCode,
        actual: StatusCode,
        body: String,
    },

    #[error("{method} {path}: body is not a valid {model}: {reason}")]
    Body {
        method: Method,
        path: String,
        model: &'static str,
        reason: String,
    },

    #[error("{field}: expected {expected}, got {actual}")]
    Field {
        field: &'static str,
        expected: String,
        actual: String,
    },

    #[error("{0}")]
    Check(String),
}

impl AssertionFailure {
    pub fn field(
        field: &'static str,
        expected: impl std::fmt::Debug,
        actual: impl std::fmt::Debug,
    ) -> Self {
        AssertionFailure::Field {
            field,
            expected: format!("{:?}", expected),
            actual: format!("{:?}", actual),
        }
    }
}

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("authentication failed for {username}: {reason}")]
    Authentication { username: String, reason: String },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Assertion(#[from] AssertionFailure),

    #[error("no {resource} record starting with {marker:?} was found")]
    FixtureLookup {
        resource: &'static str,
        marker: String,
    },

    #[error("no token has been acquired for the {0} identity")]
    TokenNotAcquired(Role),

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl HarnessError {
    /// Fatal errors abort the run instead of failing a single scenario.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            HarnessError::Authentication { .. }
                | HarnessError::Template(_)
                | HarnessError::TokenNotAcquired(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
