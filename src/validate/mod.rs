//! Request validation.
//!
//! A [`Validator`] checks one request field. Validators are registered
//! explicitly on a [`ValidatorChain`](chain::ValidatorChain), which runs all
//! of them and reports every failure at once.

pub mod chain;
pub mod membership;
pub mod presence;
pub mod version;

use crate::request::{Field, RequestContext, RequestParams};
use thiserror::Error;

/// Severity of a malformed or disallowed request value.
pub const BAD_REQUEST: u16 = 400;

/// Severity of a request the caller is not authorized to make.
pub const FORBIDDEN: u16 = 403;

/// Status reserved for transport or parse failures talking to an upstream
/// service. Never produced by a validator.
pub const UPSTREAM_FAILURE: u16 = 900;

/// One failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Field that failed.
    pub failed_field: Field,

    /// The offending value.
    pub value: String,

    /// Human-readable description.
    pub message: String,

    /// HTTP-style severity; higher is more severe.
    pub severity: u16,
}

impl ValidationError {
    /// Create a validation error.
    pub fn new(
        failed_field: Field,
        value: impl Into<String>,
        message: impl Into<String>,
        severity: u16,
    ) -> Self {
        Self {
            failed_field,
            value: value.into(),
            message: message.into(),
            severity,
        }
    }
}

/// A stateless rule over one request field.
///
/// Implementations must not keep per-request state: one instance is shared
/// by every request the gate serves.
pub trait Validator: Send + Sync {
    /// The field this validator checks.
    fn field(&self) -> Field;

    /// Severity reported on failure.
    fn severity(&self) -> u16;

    /// The accepted values, for validators with a fixed set.
    fn allowed_values(&self) -> Vec<String> {
        Vec::new()
    }

    /// Whether to skip this validator for the given caller.
    fn skip(&self, _context: &RequestContext) -> bool {
        false
    }

    /// Check a present, non-empty field value.
    ///
    /// `params` gives access to the other fields of the same request.
    fn validate(&self, value: &str, params: &RequestParams) -> Result<(), ValidationError>;
}

/// Render values as `[a, b, c]`.
pub(crate) fn format_list<T: std::fmt::Display>(values: &[T]) -> String {
    let items: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}
