//! Relgate configuration.

use crate::policy::mode::ServiceMode;
use crate::policy::version::parse_version;
use crate::GateError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Version policy for a single product, as written in configuration.
///
/// Versions are kept as strings here and parsed when the
/// [`PolicyRegistry`](crate::PolicyRegistry) is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductPolicyConfig {
    /// Product key as used in request paths (e.g., "chef").
    pub name: String,

    /// Human-readable product name shown in trial listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// Oldest version still supported. Older versions are end-of-life.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_supported_version: Option<String>,

    /// Versions strictly below this one were released as open source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_source_cutoff_version: Option<String>,

    /// Hide this product from trial listings.
    #[serde(default)]
    pub trial_excluded: bool,
}

impl ProductPolicyConfig {
    fn new(
        name: &str,
        display_name: &str,
        min_supported_version: Option<&str>,
        open_source_cutoff_version: Option<&str>,
    ) -> Self {
        Self {
            name: name.to_string(),
            display_name: (!display_name.is_empty()).then(|| display_name.to_string()),
            min_supported_version: min_supported_version.map(String::from),
            open_source_cutoff_version: open_source_cutoff_version.map(String::from),
            trial_excluded: false,
        }
    }

    fn trial_excluded(mut self) -> Self {
        self.trial_excluded = true;
        self
    }
}

static BUILTIN_PRODUCTS: Lazy<Vec<ProductPolicyConfig>> = Lazy::new(|| {
    vec![
        ProductPolicyConfig::new("automate", "Chef Automate", Some("0.0.0"), None),
        ProductPolicyConfig::new("chef", "Chef Infra Client", Some("16.0.0"), Some("14.15.6")),
        ProductPolicyConfig::new("chef-backend", "Chef Backend", Some("3.0.0"), None)
            .trial_excluded(),
        ProductPolicyConfig::new(
            "chef-server",
            "Chef Infra Server",
            Some("14.0.0"),
            Some("12.19.31"),
        ),
        ProductPolicyConfig::new(
            "chef-workstation",
            "Chef Workstation",
            Some("21.0.0"),
            Some("0.4.2"),
        ),
        ProductPolicyConfig::new("habitat", "Chef Habitat", Some("0.0.0"), Some("0.79.0")),
        ProductPolicyConfig::new("inspec", "InSpec", Some("4.0.0"), Some("4.3.2")),
        ProductPolicyConfig::new("manage", "Chef Manage", Some("2.5.0"), None).trial_excluded(),
        ProductPolicyConfig::new("supermarket", "Chef Supermarket", Some("5.0.0"), Some("5.1.63"))
            .trial_excluded(),
        ProductPolicyConfig::new("desktop", "", Some("0.0.0"), Some("14.15.6")),
        ProductPolicyConfig::new(
            "chef-ice",
            "Chef Infra Client Enterprise",
            Some("0.0.0"),
            None,
        ),
        ProductPolicyConfig::new("migration-tool", "Migration Tool", Some("0.0.0"), None),
    ]
});

/// The product table shipped with the crate.
///
/// Cutoff values still await product-owner sign-off; deployments that need
/// different values should load their own table with [`GateConfig::from_file`].
pub fn builtin_products() -> &'static [ProductPolicyConfig] {
    &BUILTIN_PRODUCTS
}

fn default_products() -> Vec<ProductPolicyConfig> {
    builtin_products().to_vec()
}

fn default_channels() -> Vec<String> {
    vec!["stable".to_string(), "current".to_string()]
}

fn default_restricted_channels() -> Vec<String> {
    vec!["stable".to_string()]
}

/// Configuration for the release gate.
///
/// Every field has a default, so `{}` is a valid JSON configuration that
/// runs in commercial mode with the builtin product table. Unknown keys are
/// rejected so a misspelled policy field cannot silently drop a constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GateConfig {
    /// Which API flavour the gate serves.
    #[serde(default)]
    pub mode: ServiceMode,

    /// Release channels known to the upstream API.
    #[serde(default = "default_channels")]
    pub channels: Vec<String>,

    /// Channels open to unlicensed callers in open-source and trial mode.
    #[serde(default = "default_restricted_channels")]
    pub restricted_channels: Vec<String>,

    /// Reject open-source versions in commercial mode.
    #[serde(default)]
    pub restrict_open_source_versions: bool,

    /// Per-product version policies.
    #[serde(default = "default_products")]
    pub products: Vec<ProductPolicyConfig>,

    /// Products served outside the upstream API, appended to commercial
    /// product listings (e.g. "chef-360").
    #[serde(default)]
    pub extra_products: Vec<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            mode: ServiceMode::default(),
            channels: default_channels(),
            restricted_channels: default_restricted_channels(),
            restrict_open_source_versions: false,
            products: default_products(),
            extra_products: Vec::new(),
        }
    }
}

impl GateConfig {
    /// Default configuration for the given mode.
    pub fn for_mode(mode: ServiceMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Parse configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, GateError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| GateError::ConfigError(format!("Parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GateError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| GateError::PolicyIO(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), GateError> {
        if self.channels.is_empty() {
            return Err(GateError::ConfigError(
                "channels cannot be empty".to_string(),
            ));
        }
        if self.restricted_channels.is_empty() {
            return Err(GateError::ConfigError(
                "restricted_channels cannot be empty".to_string(),
            ));
        }
        if let Some(unknown) = self
            .restricted_channels
            .iter()
            .find(|c| !self.channels.contains(c))
        {
            return Err(GateError::ConfigError(format!(
                "restricted channel {} is not one of {:?}",
                unknown, self.channels
            )));
        }

        let mut seen = HashSet::new();
        for product in &self.products {
            if product.name.trim().is_empty() {
                return Err(GateError::ConfigError(
                    "product name cannot be empty".to_string(),
                ));
            }
            if !seen.insert(product.name.as_str()) {
                return Err(GateError::DuplicateProduct(product.name.clone()));
            }
            for (field, value) in [
                ("min_supported_version", &product.min_supported_version),
                ("open_source_cutoff_version", &product.open_source_cutoff_version),
            ] {
                if let Some(value) = value {
                    parse_version(value).map_err(|e| {
                        GateError::ConfigError(format!(
                            "{} {} {:?}: {}",
                            product.name, field, value, e
                        ))
                    })?;
                }
            }
        }
        Ok(())
    }
}
