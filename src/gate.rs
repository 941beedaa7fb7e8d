//! Release Gate - the main public API for Relgate.
//!
//! The `Gate` ties the pieces together for one service mode:
//! - Product policy registry built from configuration
//! - Default validator chain for the mode
//! - Listing strategy for product and version listings

use crate::config::GateConfig;
use crate::policy::mode::{select_strategy, ListingStrategy, ServiceMode};
use crate::policy::registry::PolicyRegistry;
use crate::request::{Field, RequestContext, RequestParams};
use crate::validate::chain::{aggregate, ValidatorChain};
use crate::policy::version::is_latest;
use crate::validate::membership::ChannelValidator;
use crate::validate::presence::CoRequiredValidator;
use crate::validate::version::{EolVersionValidator, OpenSourceVersionValidator};
use crate::validate::BAD_REQUEST;
use crate::GateError;
use std::sync::Arc;
use thiserror::Error;

/// A request refused by the validator chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Rejection {
    /// Every failure message, newline-separated.
    pub message: String,

    /// Status code to answer with (highest severity).
    pub code: u16,
}

/// Request gate for one service mode.
///
/// Build one instance at startup and share it between request handlers.
pub struct Gate {
    config: GateConfig,
    registry: Arc<PolicyRegistry>,
    chain: ValidatorChain,
    strategy: Box<dyn ListingStrategy>,
}

impl Gate {
    /// Create a gate with the default validator chain for the configured mode.
    ///
    /// # Errors
    /// - `ConfigError` - configuration validation fails
    /// - `DuplicateProduct` - the product table repeats a name
    /// - `InvalidVersion` - a policy version cannot be parsed
    pub fn new(config: GateConfig) -> Result<Self, GateError> {
        config.validate()?;
        let registry = Arc::new(PolicyRegistry::from_config(&config)?);
        let chain = default_chain(&config, &registry);
        Ok(Self::assemble(config, registry, chain))
    }

    /// Create a gate with a caller-supplied validator chain.
    pub fn with_chain(config: GateConfig, chain: ValidatorChain) -> Result<Self, GateError> {
        config.validate()?;
        let registry = Arc::new(PolicyRegistry::from_config(&config)?);
        Ok(Self::assemble(config, registry, chain))
    }

    fn assemble(config: GateConfig, registry: Arc<PolicyRegistry>, chain: ValidatorChain) -> Self {
        tracing::info!(
            mode = %config.mode,
            validators = chain.len(),
            "release gate ready"
        );
        let strategy = select_strategy(&config, registry.clone());
        Self {
            config,
            registry,
            chain,
            strategy,
        }
    }

    /// Run the validator chain and fold any failures into a [`Rejection`].
    pub fn validate_request(
        &self,
        params: &RequestParams,
        context: &RequestContext,
    ) -> Result<(), Rejection> {
        let errors = self.chain.run_with_context(params, context);
        let outcome = aggregate(&errors);

        match outcome.code {
            None => Ok(()),
            Some(code) => {
                tracing::debug!(code, failures = errors.len(), "request rejected");
                Err(Rejection {
                    message: outcome.message,
                    code,
                })
            }
        }
    }

    /// Prune an upstream product listing for this mode.
    pub fn filter_products(&self, products: Vec<String>) -> Vec<String> {
        self.strategy.filter_products(products)
    }

    /// Prune an upstream version listing for the requested product.
    ///
    /// Commercial callers passing `eol=true` get the listing unchanged.
    pub fn filter_versions(&self, versions: Vec<String>, params: &RequestParams) -> Vec<String> {
        if self.config.mode == ServiceMode::Commercial && params.eol_requested() {
            return versions;
        }
        let product = params.get_or_empty(Field::Product);
        self.strategy.filter_versions(versions, product)
    }

    /// Pin the requested version against a filtered version listing.
    ///
    /// An explicit version must appear in `filtered`. An empty or `latest`
    /// version is replaced with the last (newest) entry of `filtered`.
    pub fn resolve_version(
        &self,
        params: &mut RequestParams,
        filtered: &[String],
    ) -> Result<(), Rejection> {
        let requested = params.get_or_empty(Field::Version);

        if !requested.is_empty() && !is_latest(requested) {
            if filtered.iter().any(|v| v == requested) {
                return Ok(());
            }
            tracing::debug!(version = requested, "requested version not in listing");
            return Err(Rejection {
                message: "the requested version is not supported on the selected persona or channel"
                    .to_string(),
                code: BAD_REQUEST,
            });
        }

        match filtered.last() {
            Some(newest) => {
                params.set(Field::Version, newest.clone());
                Ok(())
            }
            None => Err(Rejection {
                message: "no versions available on the selected persona or channel".to_string(),
                code: BAD_REQUEST,
            }),
        }
    }

    /// The policy registry.
    pub fn registry(&self) -> &Arc<PolicyRegistry> {
        &self.registry
    }

    /// The validator chain.
    pub fn chain(&self) -> &ValidatorChain {
        &self.chain
    }

    /// The configured service mode.
    pub fn mode(&self) -> ServiceMode {
        self.config.mode
    }

    /// Get the current configuration.
    pub fn config(&self) -> &GateConfig {
        &self.config
    }
}

/// The validator chain a gate registers for its mode.
///
/// - Commercial: known channels (400), end-of-life versions, and open-source
///   versions when `restrict_open_source_versions` is set
/// - Opensource: restricted channels (403), `p` and `pv` given together, and
///   `m` whenever both are given
/// - Trial: restricted channels (403), end-of-life versions
pub fn default_chain(config: &GateConfig, registry: &Arc<PolicyRegistry>) -> ValidatorChain {
    let mut chain = ValidatorChain::new();

    match config.mode {
        ServiceMode::Commercial => {
            chain.add(ChannelValidator::new(config.channels.iter().cloned()));
            chain.add(EolVersionValidator::new(registry.clone()));
            if config.restrict_open_source_versions {
                chain.add(OpenSourceVersionValidator::new(registry.clone()));
            }
        }
        ServiceMode::Opensource => {
            chain.add(ChannelValidator::authorization(
                config.restricted_channels.iter().cloned(),
            ));
            chain.add(CoRequiredValidator::new(Field::Platform, Field::PlatformVersion));
            chain.add(CoRequiredValidator::new(Field::PlatformVersion, Field::Platform));
            chain.add(
                CoRequiredValidator::new(Field::Platform, Field::Architecture)
                    .when_present(Field::PlatformVersion),
            );
        }
        ServiceMode::Trial => {
            chain.add(ChannelValidator::authorization(
                config.restricted_channels.iter().cloned(),
            ));
            chain.add(EolVersionValidator::new(registry.clone()));
        }
    }

    chain
}
