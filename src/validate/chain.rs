//! Ordered validator chain and error aggregation.

use super::{ValidationError, Validator};
use crate::request::{RequestContext, RequestParams};
use std::fmt;
use std::sync::Arc;

/// An ordered collection of validators.
///
/// Every validator runs on every request; order only affects the order of
/// reported errors.
#[derive(Clone, Default)]
pub struct ValidatorChain {
    validators: Vec<Arc<dyn Validator>>,
}

impl ValidatorChain {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a validator.
    pub fn add<V: Validator + 'static>(&mut self, validator: V) {
        self.validators.push(Arc::new(validator));
    }

    /// Append an already shared validator.
    pub fn add_shared(&mut self, validator: Arc<dyn Validator>) {
        self.validators.push(validator);
    }

    /// Builder-style [`add`](Self::add).
    pub fn with<V: Validator + 'static>(mut self, validator: V) -> Self {
        self.add(validator);
        self
    }

    /// Registered validators, in order.
    pub fn validators(&self) -> &[Arc<dyn Validator>] {
        &self.validators
    }

    /// Number of registered validators.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Whether the chain has no validators.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Run every validator whose field is present in `params`.
    pub fn run(&self, params: &RequestParams) -> Vec<ValidationError> {
        self.run_with_context(params, &RequestContext::default())
    }

    /// Like [`run`](Self::run), skipping validators that opt out for `context`.
    pub fn run_with_context(
        &self,
        params: &RequestParams,
        context: &RequestContext,
    ) -> Vec<ValidationError> {
        self.validators
            .iter()
            .filter(|v| !v.skip(context))
            .filter_map(|v| {
                let value = params.get(v.field())?;
                v.validate(value, params).err()
            })
            .collect()
    }
}

impl fmt::Debug for ValidatorChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.validators.iter().map(|v| v.field()))
            .finish()
    }
}

/// Combined outcome of a chain run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Aggregate {
    /// Every error message, newline-separated, in chain order.
    pub message: String,

    /// Highest severity among the errors; `None` when there were none.
    pub code: Option<u16>,
}

impl Aggregate {
    /// Whether the request passed every validator.
    pub fn is_valid(&self) -> bool {
        self.code.is_none()
    }
}

/// Fold validation errors into one message and one status code.
pub fn aggregate(errors: &[ValidationError]) -> Aggregate {
    let mut code: Option<u16> = None;
    let mut messages = Vec::with_capacity(errors.len());

    for err in errors {
        if code.map_or(true, |c| err.severity > c) {
            code = Some(err.severity);
        }
        messages.push(err.message.as_str());
    }

    Aggregate {
        message: messages.join("\n"),
        code,
    }
}
