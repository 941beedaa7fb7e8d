//! Version policy validators.
//!
//! Both validators delegate to the [`PolicyRegistry`] and are bypassed when
//! the caller opts in with `eol=true`. A version the registry cannot parse
//! is always reported, never waved through.

use super::{ValidationError, Validator, BAD_REQUEST};
use crate::policy::registry::PolicyRegistry;
use crate::request::{Field, RequestParams};
use crate::GateError;
use std::sync::Arc;

fn ambiguous(value: &str, err: GateError) -> ValidationError {
    ValidationError::new(Field::Version, value, err.to_string(), BAD_REQUEST)
}

/// Rejects versions below the product's minimum supported version.
#[derive(Debug, Clone)]
pub struct EolVersionValidator {
    registry: Arc<PolicyRegistry>,
    severity: u16,
}

impl EolVersionValidator {
    /// Create a validator backed by the given registry.
    pub fn new(registry: Arc<PolicyRegistry>) -> Self {
        Self {
            registry,
            severity: BAD_REQUEST,
        }
    }
}

impl Validator for EolVersionValidator {
    fn field(&self) -> Field {
        Field::Version
    }

    fn severity(&self) -> u16 {
        self.severity
    }

    fn validate(&self, value: &str, params: &RequestParams) -> Result<(), ValidationError> {
        // Any version goes once the caller asked for EOL releases
        if params.eol_requested() {
            return Ok(());
        }

        let product = params.get_or_empty(Field::Product);
        match self.registry.is_end_of_life(product, value) {
            Ok(false) => Ok(()),
            Ok(true) => Err(ValidationError::new(
                Field::Version,
                value,
                format!(
                    "{} version {} is EOL, must be {}",
                    product,
                    value,
                    self.registry.supported_version(product).unwrap_or_default()
                ),
                self.severity,
            )),
            Err(e) => Err(ambiguous(value, e)),
        }
    }
}

/// Rejects versions released under the open-source cutoff.
///
/// Deployments that only serve licensed builds register this validator.
#[derive(Debug, Clone)]
pub struct OpenSourceVersionValidator {
    registry: Arc<PolicyRegistry>,
    severity: u16,
}

impl OpenSourceVersionValidator {
    /// Create a validator backed by the given registry.
    pub fn new(registry: Arc<PolicyRegistry>) -> Self {
        Self {
            registry,
            severity: BAD_REQUEST,
        }
    }
}

impl Validator for OpenSourceVersionValidator {
    fn field(&self) -> Field {
        Field::Version
    }

    fn severity(&self) -> u16 {
        self.severity
    }

    fn validate(&self, value: &str, params: &RequestParams) -> Result<(), ValidationError> {
        if params.eol_requested() {
            return Ok(());
        }

        let product = params.get_or_empty(Field::Product);
        match self.registry.is_open_source(product, value) {
            Ok(false) => Ok(()),
            Ok(true) => Err(ValidationError::new(
                Field::Version,
                value,
                format!(
                    "{} version {} is an open-source release ({}), not available on this channel",
                    product,
                    value,
                    self.registry.open_source_cutoff(product).unwrap_or_default()
                ),
                self.severity,
            )),
            Err(e) => Err(ambiguous(value, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> Arc<PolicyRegistry> {
        Arc::new(PolicyRegistry::builtin().unwrap())
    }

    fn params(product: &str) -> RequestParams {
        RequestParams::new().with(Field::Product, product)
    }

    #[test]
    fn test_eol_rejects_old_version() {
        let validator = EolVersionValidator::new(registry());
        let err = validator.validate("10.0.0", &params("chef")).unwrap_err();

        assert_eq!(err.failed_field, Field::Version);
        assert_eq!(err.value, "10.0.0");
        assert_eq!(err.severity, 400);
        assert_eq!(err.message, "chef version 10.0.0 is EOL, must be >= 16.0.0");
    }

    #[test]
    fn test_eol_accepts_supported_version() {
        let validator = EolVersionValidator::new(registry());
        assert!(validator.validate("16.0.0", &params("chef")).is_ok());
        assert!(validator.validate("latest", &params("chef")).is_ok());
    }

    #[test]
    fn test_eol_bypassed_by_opt_in() {
        let validator = EolVersionValidator::new(registry());
        let params = params("chef").with(Field::Eol, "true");
        assert!(validator.validate("10.0.0", &params).is_ok());
        assert!(validator.validate("garbage", &params).is_ok());
    }

    #[test]
    fn test_eol_unknown_product_passes() {
        let validator = EolVersionValidator::new(registry());
        assert!(validator.validate("0.0.1", &params("brand-new")).is_ok());
    }

    #[test]
    fn test_eol_reports_unparseable_version() {
        let validator = EolVersionValidator::new(registry());
        let err = validator.validate("sixteen", &params("chef")).unwrap_err();
        assert_eq!(err.severity, 400);
        assert!(err.message.contains("not a valid semantic version"));
    }

    #[test]
    fn test_open_source_rejects_old_version() {
        let validator = OpenSourceVersionValidator::new(registry());
        let err = validator.validate("14.15.5", &params("chef")).unwrap_err();

        assert_eq!(err.severity, 400);
        assert_eq!(
            err.message,
            "chef version 14.15.5 is an open-source release (< 14.15.6), not available on this channel"
        );
    }

    #[test]
    fn test_open_source_accepts_licensed_version() {
        let validator = OpenSourceVersionValidator::new(registry());
        assert!(validator.validate("14.15.6", &params("chef")).is_ok());
        assert!(validator.validate("1.0.0", &params("manage")).is_ok());
        assert!(validator.validate("latest", &params("chef")).is_ok());
    }

    #[test]
    fn test_open_source_bypassed_by_opt_in() {
        let validator = OpenSourceVersionValidator::new(registry());
        let params = params("chef").with(Field::Eol, "true");
        assert!(validator.validate("12.0.0", &params).is_ok());
    }

    #[test]
    fn test_open_source_reports_unparseable_version() {
        let validator = OpenSourceVersionValidator::new(registry());
        assert!(validator.validate("x.y", &params("habitat")).is_err());
    }
}
