//! Listing strategies per service mode.
//!
//! The gate serves three API flavours, each pruning upstream product and
//! version listings differently:
//! - Commercial: everything still in support
//! - Opensource: only products and versions released as open source
//! - Trial: supported, trial-eligible products and only the latest version

use crate::config::GateConfig;
use crate::filter::{filter_list, filter_product_list};
use crate::policy::registry::PolicyRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// API flavour served by the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceMode {
    /// Licensed customers.
    #[default]
    Commercial,
    /// Anonymous open-source downloads.
    Opensource,
    /// Free-trial users.
    Trial,
}

impl fmt::Display for ServiceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Commercial => "commercial",
            Self::Opensource => "opensource",
            Self::Trial => "trial",
        };
        f.write_str(name)
    }
}

/// Prunes product and version listings for one service mode.
pub trait ListingStrategy: Send + Sync {
    /// Filter a product listing.
    fn filter_products(&self, products: Vec<String>) -> Vec<String>;

    /// Filter the version listing of one product.
    fn filter_versions(&self, versions: Vec<String>, product: &str) -> Vec<String>;
}

/// Commercial listings: drop end-of-life products and versions.
///
/// Products served outside the upstream API (extra products) are appended
/// after pruning.
#[derive(Debug, Clone)]
pub struct CommercialStrategy {
    registry: Arc<PolicyRegistry>,
    extra_products: Vec<String>,
}

impl CommercialStrategy {
    /// Create a strategy backed by the given registry.
    pub fn new(registry: Arc<PolicyRegistry>) -> Self {
        Self {
            registry,
            extra_products: Vec::new(),
        }
    }

    /// Append these products to every product listing.
    pub fn with_extra_products(mut self, extra_products: Vec<String>) -> Self {
        self.extra_products = extra_products;
        self
    }
}

impl ListingStrategy for CommercialStrategy {
    fn filter_products(&self, products: Vec<String>) -> Vec<String> {
        let mut kept = filter_list(products, |p| !self.registry.is_end_of_life_product(p));
        for extra in &self.extra_products {
            if !kept.contains(extra) {
                kept.push(extra.clone());
            }
        }
        kept
    }

    fn filter_versions(&self, versions: Vec<String>, product: &str) -> Vec<String> {
        filter_product_list(versions, product, |product, v| {
            match self.registry.is_end_of_life(product, v) {
                Ok(eol) => !eol,
                Err(e) => {
                    tracing::warn!(error = %e, "keeping version that could not be checked");
                    true
                }
            }
        })
    }
}

/// Open-source listings: keep only open-source products and versions.
#[derive(Debug, Clone)]
pub struct OpensourceStrategy {
    registry: Arc<PolicyRegistry>,
}

impl OpensourceStrategy {
    /// Create a strategy backed by the given registry.
    pub fn new(registry: Arc<PolicyRegistry>) -> Self {
        Self { registry }
    }
}

impl ListingStrategy for OpensourceStrategy {
    fn filter_products(&self, products: Vec<String>) -> Vec<String> {
        filter_list(products, |p| self.registry.is_open_source_product(p))
    }

    fn filter_versions(&self, versions: Vec<String>, product: &str) -> Vec<String> {
        if !self.registry.is_open_source_product(product) {
            return versions;
        }

        filter_product_list(versions, product, |product, v| {
            match self.registry.is_open_source(product, v) {
                Ok(open) => open,
                Err(e) => {
                    tracing::warn!(error = %e, "dropping version that could not be checked");
                    false
                }
            }
        })
    }
}

/// Trial listings: supported trial products, latest version only.
#[derive(Debug, Clone)]
pub struct TrialStrategy {
    registry: Arc<PolicyRegistry>,
}

impl TrialStrategy {
    /// Create a strategy backed by the given registry.
    pub fn new(registry: Arc<PolicyRegistry>) -> Self {
        Self { registry }
    }
}

impl ListingStrategy for TrialStrategy {
    fn filter_products(&self, products: Vec<String>) -> Vec<String> {
        filter_list(products, |p| {
            !self.registry.is_end_of_life_product(p) && self.registry.is_trial_product(p)
        })
        .into_iter()
        .map(|p| self.registry.display_name(&p))
        .collect()
    }

    fn filter_versions(&self, mut versions: Vec<String>, _product: &str) -> Vec<String> {
        // Upstream lists versions oldest first
        match versions.pop() {
            Some(latest) => vec![latest],
            None => versions,
        }
    }
}

/// Select the listing strategy for the configured service mode.
pub fn select_strategy(
    config: &GateConfig,
    registry: Arc<PolicyRegistry>,
) -> Box<dyn ListingStrategy> {
    match config.mode {
        ServiceMode::Commercial => Box::new(
            CommercialStrategy::new(registry).with_extra_products(config.extra_products.clone()),
        ),
        ServiceMode::Opensource => Box::new(OpensourceStrategy::new(registry)),
        ServiceMode::Trial => Box::new(TrialStrategy::new(registry)),
    }
}
