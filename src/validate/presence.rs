//! Field co-presence rules.

use super::{ValidationError, Validator, BAD_REQUEST};
use crate::request::{Field, RequestParams};

/// Requires another field whenever this validator's field is present.
///
/// `CoRequiredValidator::new(Field::PlatformVersion, Field::Platform)` rejects
/// a request that names a platform version but no platform. The reported
/// failure is on the missing field, with an empty value.
#[derive(Debug, Clone)]
pub struct CoRequiredValidator {
    field: Field,
    required: Field,
    also_present: Vec<Field>,
    severity: u16,
}

impl CoRequiredValidator {
    /// Require `required` whenever `field` is present.
    pub fn new(field: Field, required: Field) -> Self {
        Self {
            field,
            required,
            also_present: Vec::new(),
            severity: BAD_REQUEST,
        }
    }

    /// Only apply the rule when `other` is present as well.
    pub fn when_present(mut self, other: Field) -> Self {
        self.also_present.push(other);
        self
    }

    /// The field that must accompany this one.
    pub fn required(&self) -> Field {
        self.required
    }
}

impl Validator for CoRequiredValidator {
    fn field(&self) -> Field {
        self.field
    }

    fn severity(&self) -> u16 {
        self.severity
    }

    fn validate(&self, _value: &str, params: &RequestParams) -> Result<(), ValidationError> {
        if self.also_present.iter().any(|f| params.get(*f).is_none()) {
            return Ok(());
        }
        if params.get(self.required).is_some() {
            return Ok(());
        }

        let with: Vec<&str> = std::iter::once(self.field)
            .chain(self.also_present.iter().copied())
            .map(Field::key)
            .collect();

        Err(ValidationError::new(
            self.required,
            "",
            format!(
                "Validation failed for {} (required with {})",
                self.required,
                with.join(" ")
            ),
            self.severity,
        ))
    }
}
