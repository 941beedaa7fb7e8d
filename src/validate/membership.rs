//! Set-membership validators.

use super::{format_list, ValidationError, Validator, BAD_REQUEST, FORBIDDEN};
use crate::request::{Field, RequestContext, RequestParams};
use std::fmt::Display;
use std::str::FromStr;

/// Checks that the channel is one of a fixed set.
#[derive(Debug, Clone)]
pub struct ChannelValidator {
    allowed: Vec<String>,
    severity: u16,
    authorization: bool,
}

impl ChannelValidator {
    /// Reject unknown channels as bad requests.
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
            severity: BAD_REQUEST,
            authorization: false,
        }
    }

    /// Reject channels outside the set as forbidden.
    ///
    /// Used where other channels exist but the caller may not use them.
    pub fn authorization<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            severity: FORBIDDEN,
            authorization: true,
            ..Self::new(allowed)
        }
    }

    /// Override the reported severity.
    pub fn with_severity(mut self, severity: u16) -> Self {
        self.severity = severity;
        self
    }
}

impl Validator for ChannelValidator {
    fn field(&self) -> Field {
        Field::Channel
    }

    fn severity(&self) -> u16 {
        self.severity
    }

    fn allowed_values(&self) -> Vec<String> {
        self.allowed.clone()
    }

    fn validate(&self, value: &str, _params: &RequestParams) -> Result<(), ValidationError> {
        if self.allowed.iter().any(|c| c == value) {
            return Ok(());
        }

        let message = if self.authorization {
            format!(
                "Authorization failed for channel {}, please use {} instead",
                value,
                self.allowed.join(" or ")
            )
        } else {
            format!("channel: {} is not one of {}", value, format_list(&self.allowed))
        };

        Err(ValidationError::new(Field::Channel, value, message, self.severity))
    }
}

/// Checks that a field parses to a `T` contained in a fixed set.
///
/// Values that do not parse as `T` are reported as not in the set.
#[derive(Debug, Clone)]
pub struct ContainsValidator<T> {
    field: Field,
    values: Vec<T>,
    severity: u16,
    skip_when_licensed: bool,
}

impl<T> ContainsValidator<T>
where
    T: FromStr + PartialEq + Display + Send + Sync,
{
    /// Create a membership check for `field`.
    pub fn new(field: Field, values: Vec<T>, severity: u16) -> Self {
        Self {
            field,
            values,
            severity,
            skip_when_licensed: false,
        }
    }

    /// Do not apply this check to licensed callers.
    pub fn skip_when_licensed(mut self) -> Self {
        self.skip_when_licensed = true;
        self
    }
}

impl<T> Validator for ContainsValidator<T>
where
    T: FromStr + PartialEq + Display + Send + Sync,
{
    fn field(&self) -> Field {
        self.field
    }

    fn severity(&self) -> u16 {
        self.severity
    }

    fn allowed_values(&self) -> Vec<String> {
        self.values.iter().map(ToString::to_string).collect()
    }

    fn skip(&self, context: &RequestContext) -> bool {
        self.skip_when_licensed && context.licensed
    }

    fn validate(&self, value: &str, _params: &RequestParams) -> Result<(), ValidationError> {
        let member = value
            .parse::<T>()
            .map(|parsed| self.values.contains(&parsed))
            .unwrap_or(false);

        if member {
            return Ok(());
        }

        Err(ValidationError::new(
            self.field,
            value,
            format!("{}: {} is not one of {}", self.field, value, format_list(&self.values)),
            self.severity,
        ))
    }
}
