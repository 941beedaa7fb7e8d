//! Relgate error types.

use thiserror::Error;

/// Errors raised while building or querying the policy engine.
///
/// Request validation failures are not errors in this sense: they are
/// reported as [`ValidationError`](crate::validate::ValidationError) values.
#[derive(Debug, Error)]
pub enum GateError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The same product name appears twice in the policy table.
    #[error("Duplicate policy for product: {0}")]
    DuplicateProduct(String),

    /// A version string could not be read as a semantic version.
    #[error("{product} version {version:?} is not a valid semantic version")]
    InvalidVersion {
        /// Product the version was checked against.
        product: String,
        /// The offending version string.
        version: String,
    },

    /// Policy file could not be read.
    #[error("Policy I/O error: {0}")]
    PolicyIO(String),
}
