//! Product policy registry.
//!
//! The registry is the single source of truth for per-product version
//! constraints:
//! - Minimum supported version (older versions are end-of-life)
//! - Open-source cutoff (older versions were released as open source)
//!
//! It is built once from configuration and never mutated afterwards, so a
//! shared `Arc<PolicyRegistry>` can be read from any number of threads.

use crate::config::{builtin_products, GateConfig, ProductPolicyConfig};
use crate::policy::version::{is_latest, parse_version, release_core};
use crate::GateError;
use semver::Version;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Parsed version policy for one product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductPolicy {
    name: String,
    display_name: Option<String>,
    min_supported_version: Option<Version>,
    open_source_cutoff_version: Option<Version>,
    trial_excluded: bool,
}

impl ProductPolicy {
    /// Parse a policy from its configuration entry.
    pub fn from_config(config: &ProductPolicyConfig) -> Result<Self, GateError> {
        let parse = |value: &Option<String>| -> Result<Option<Version>, GateError> {
            value
                .as_deref()
                .map(|v| {
                    parse_version(v).map_err(|_| GateError::InvalidVersion {
                        product: config.name.clone(),
                        version: v.to_string(),
                    })
                })
                .transpose()
        };

        Ok(Self {
            name: config.name.clone(),
            display_name: config.display_name.clone(),
            min_supported_version: parse(&config.min_supported_version)?,
            open_source_cutoff_version: parse(&config.open_source_cutoff_version)?,
            trial_excluded: config.trial_excluded,
        })
    }

    /// Product key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable product name, if configured.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Oldest supported version, if any.
    pub fn min_supported_version(&self) -> Option<&Version> {
        self.min_supported_version.as_ref()
    }

    /// Open-source cutoff version, if any.
    pub fn open_source_cutoff_version(&self) -> Option<&Version> {
        self.open_source_cutoff_version.as_ref()
    }

    /// Whether the product is hidden from trial listings.
    pub fn trial_excluded(&self) -> bool {
        self.trial_excluded
    }

    fn to_canonical(&self) -> ProductPolicyConfig {
        ProductPolicyConfig {
            name: self.name.clone(),
            display_name: self.display_name.clone(),
            min_supported_version: self.min_supported_version.as_ref().map(Version::to_string),
            open_source_cutoff_version: self
                .open_source_cutoff_version
                .as_ref()
                .map(Version::to_string),
            trial_excluded: self.trial_excluded,
        }
    }
}

/// Immutable table of product policies.
#[derive(Debug, Clone)]
pub struct PolicyRegistry {
    products: BTreeMap<String, ProductPolicy>,
    fingerprint: String,
}

impl PolicyRegistry {
    /// Build a registry from policy entries.
    ///
    /// # Errors
    /// - `DuplicateProduct` - two entries share a name
    /// - `InvalidVersion` - a policy version cannot be parsed
    pub fn new(entries: &[ProductPolicyConfig]) -> Result<Self, GateError> {
        let mut products = BTreeMap::new();
        for entry in entries {
            let policy = ProductPolicy::from_config(entry)?;
            if products.insert(policy.name.clone(), policy).is_some() {
                return Err(GateError::DuplicateProduct(entry.name.clone()));
            }
        }

        let fingerprint = fingerprint(&products)?;
        tracing::info!(
            products = products.len(),
            fingerprint = %fingerprint,
            "product policy registry loaded"
        );

        Ok(Self {
            products,
            fingerprint,
        })
    }

    /// Build a registry from the products of a validated configuration.
    pub fn from_config(config: &GateConfig) -> Result<Self, GateError> {
        Self::new(&config.products)
    }

    /// Build a registry from the builtin product table.
    pub fn builtin() -> Result<Self, GateError> {
        Self::new(builtin_products())
    }

    /// Look up the policy for a product.
    pub fn lookup(&self, product: &str) -> Option<&ProductPolicy> {
        self.products.get(product)
    }

    /// All policies, ordered by product name.
    pub fn products(&self) -> impl Iterator<Item = &ProductPolicy> {
        self.products.values()
    }

    /// Number of registered products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the registry holds no policies.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Hex SHA-256 over the canonical policy table.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Check whether a product version is end-of-life.
    ///
    /// # Returns
    /// * `Ok(false)` - `latest`, unknown product, no minimum, or supported
    /// * `Ok(true)` - version is below the minimum supported version
    /// * `Err(InvalidVersion)` - version is not a semantic version
    pub fn is_end_of_life(&self, product: &str, version: &str) -> Result<bool, GateError> {
        if is_latest(version) {
            return Ok(false);
        }

        // Unknown products fail open
        let Some(policy) = self.lookup(product) else {
            tracing::debug!(product, version, "no policy for product, treating as supported");
            return Ok(false);
        };

        let parsed = parse_for(product, version)?;

        Ok(match &policy.min_supported_version {
            Some(min) => parsed < *min,
            None => false,
        })
    }

    /// Check whether a product version falls under the open-source cutoff.
    ///
    /// Only the release core is compared, so `14.15.5-rc.1` is treated as
    /// `14.15.5`.
    pub fn is_open_source(&self, product: &str, version: &str) -> Result<bool, GateError> {
        if is_latest(version) {
            return Ok(false);
        }

        let Some(cutoff) = self
            .lookup(product)
            .and_then(|p| p.open_source_cutoff_version.as_ref())
        else {
            return Ok(false);
        };

        let parsed = parse_for(product, version)?;
        Ok(release_core(&parsed) < *cutoff)
    }

    /// Minimum-version constraint text, e.g. `>= 16.0.0`.
    pub fn supported_version(&self, product: &str) -> Option<String> {
        self.lookup(product)
            .and_then(|p| p.min_supported_version.as_ref())
            .map(|v| format!(">= {}", v))
    }

    /// Open-source constraint text, e.g. `< 14.15.6`.
    pub fn open_source_cutoff(&self, product: &str) -> Option<String> {
        self.lookup(product)
            .and_then(|p| p.open_source_cutoff_version.as_ref())
            .map(|v| format!("< {}", v))
    }

    /// Whether a product as a whole is out of support.
    ///
    /// Unlike [`is_end_of_life`](Self::is_end_of_life), unknown products
    /// count as end-of-life here: product listings only advertise products
    /// with a registered support window.
    pub fn is_end_of_life_product(&self, product: &str) -> bool {
        self.lookup(product)
            .map_or(true, |p| p.min_supported_version.is_none())
    }

    /// Whether a product has an open-source cutoff.
    pub fn is_open_source_product(&self, product: &str) -> bool {
        self.lookup(product)
            .map_or(false, |p| p.open_source_cutoff_version.is_some())
    }

    /// Whether a product may be offered to trial users.
    pub fn is_trial_product(&self, product: &str) -> bool {
        self.lookup(product).map_or(false, |p| !p.trial_excluded)
    }

    /// Listing label in `name:Display Name` form.
    pub fn display_name(&self, product: &str) -> String {
        let display = self
            .lookup(product)
            .and_then(|p| p.display_name.as_deref())
            .unwrap_or_default();
        format!("{}:{}", product, display)
    }
}

fn parse_for(product: &str, version: &str) -> Result<Version, GateError> {
    parse_version(version).map_err(|_| GateError::InvalidVersion {
        product: product.to_string(),
        version: version.to_string(),
    })
}

fn fingerprint(products: &BTreeMap<String, ProductPolicy>) -> Result<String, GateError> {
    let canonical: Vec<ProductPolicyConfig> =
        products.values().map(ProductPolicy::to_canonical).collect();
    let bytes = serde_json::to_vec(&canonical)
        .map_err(|e| GateError::ConfigError(format!("Fingerprint error: {}", e)))?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PolicyRegistry {
        PolicyRegistry::builtin().unwrap()
    }

    fn entry(name: &str, min: Option<&str>, cutoff: Option<&str>) -> ProductPolicyConfig {
        ProductPolicyConfig {
            name: name.to_string(),
            display_name: None,
            min_supported_version: min.map(String::from),
            open_source_cutoff_version: cutoff.map(String::from),
            trial_excluded: false,
        }
    }

    #[test]
    fn test_lookup() {
        let registry = registry();
        let chef = registry.lookup("chef").unwrap();
        assert_eq!(chef.name(), "chef");
        assert_eq!(chef.min_supported_version(), Some(&Version::new(16, 0, 0)));
        assert_eq!(chef.open_source_cutoff_version(), Some(&Version::new(14, 15, 6)));
        assert!(registry.lookup("nope").is_none());
    }

    #[test]
    fn test_eol_below_minimum() {
        let registry = registry();
        assert!(registry.is_end_of_life("chef", "10.0.0").unwrap());
        assert!(registry.is_end_of_life("chef", "15.99.99").unwrap());
        assert!(registry.is_end_of_life("chef", "16.0.0-rc.1").unwrap());
    }

    #[test]
    fn test_eol_at_or_above_minimum() {
        let registry = registry();
        assert!(!registry.is_end_of_life("chef", "16.0.0").unwrap());
        assert!(!registry.is_end_of_life("chef", "18.2.7").unwrap());
        assert!(!registry.is_end_of_life("chef", "16").unwrap());
    }

    #[test]
    fn test_eol_leading_zero_versions() {
        let registry = registry();
        assert!(!registry.is_end_of_life("chef", "16.04").unwrap());
        assert!(registry.is_end_of_life("chef", "15.09.01").unwrap());
        assert!(registry.is_open_source("chef", "14.01").unwrap());
    }

    #[test]
    fn test_latest_is_never_eol() {
        let registry = registry();
        assert!(!registry.is_end_of_life("chef", "latest").unwrap());
        assert!(!registry.is_end_of_life("unknown-product", "latest").unwrap());
    }

    #[test]
    fn test_unknown_product_fails_open() {
        let registry = registry();
        assert!(!registry.is_end_of_life("unknown-product", "0.0.1").unwrap());
        assert!(!registry.is_end_of_life("unknown-product", "garbage").unwrap());
    }

    #[test]
    fn test_eol_unparseable_version() {
        let registry = registry();
        let result = registry.is_end_of_life("chef", "not-a-version");
        assert!(matches!(
            result,
            Err(GateError::InvalidVersion { product, version })
                if product == "chef" && version == "not-a-version"
        ));
    }

    #[test]
    fn test_eol_without_minimum() {
        let registry = PolicyRegistry::new(&[entry("tool", None, None)]).unwrap();
        assert!(!registry.is_end_of_life("tool", "0.0.1").unwrap());
        assert!(registry.is_end_of_life_product("tool"));
    }

    #[test]
    fn test_open_source_strictly_below_cutoff() {
        let registry = registry();
        assert!(registry.is_open_source("chef", "14.15.5").unwrap());
        assert!(registry.is_open_source("chef", "12.0.0").unwrap());
        assert!(!registry.is_open_source("chef", "14.15.6").unwrap());
        assert!(!registry.is_open_source("chef", "17.0.0").unwrap());
    }

    #[test]
    fn test_open_source_compares_release_core() {
        let registry = registry();
        assert!(!registry.is_open_source("chef", "14.15.6-rc.1").unwrap());
        assert!(registry.is_open_source("chef", "14.15.5+build.9").unwrap());
    }

    #[test]
    fn test_open_source_without_cutoff() {
        let registry = registry();
        assert!(!registry.is_open_source("manage", "1.0.0").unwrap());
        assert!(!registry.is_open_source("unknown-product", "1.0.0").unwrap());
        assert!(!registry.is_open_source("chef", "latest").unwrap());
    }

    #[test]
    fn test_open_source_unparseable_version() {
        let registry = registry();
        let result = registry.is_open_source("habitat", "0.x");
        assert!(matches!(result, Err(GateError::InvalidVersion { .. })));
    }

    #[test]
    fn test_constraint_text() {
        let registry = registry();
        assert_eq!(registry.supported_version("chef").as_deref(), Some(">= 16.0.0"));
        assert_eq!(registry.open_source_cutoff("chef").as_deref(), Some("< 14.15.6"));
        assert_eq!(registry.supported_version("unknown-product"), None);
        assert_eq!(registry.open_source_cutoff("manage"), None);
    }

    #[test]
    fn test_product_level_checks() {
        let registry = registry();
        assert!(!registry.is_end_of_life_product("chef"));
        assert!(registry.is_end_of_life_product("unknown-product"));
        assert!(registry.is_open_source_product("habitat"));
        assert!(!registry.is_open_source_product("manage"));
        assert!(registry.is_trial_product("chef"));
        assert!(!registry.is_trial_product("supermarket"));
        assert!(!registry.is_trial_product("unknown-product"));
    }

    #[test]
    fn test_display_name() {
        let registry = registry();
        assert_eq!(registry.display_name("chef"), "chef:Chef Infra Client");
        assert_eq!(registry.display_name("desktop"), "desktop:");
        assert_eq!(registry.display_name("unknown-product"), "unknown-product:");
    }

    #[test]
    fn test_duplicate_product_rejected() {
        let result = PolicyRegistry::new(&[entry("chef", None, None), entry("chef", None, None)]);
        assert!(matches!(result, Err(GateError::DuplicateProduct(name)) if name == "chef"));
    }

    #[test]
    fn test_invalid_policy_version_rejected() {
        let result = PolicyRegistry::new(&[entry("chef", Some("sixteen"), None)]);
        assert!(matches!(result, Err(GateError::InvalidVersion { .. })));
    }

    #[test]
    fn test_fingerprint_is_canonical() {
        let a = PolicyRegistry::new(&[entry("a", Some("1"), None), entry("b", None, Some("2.0"))])
            .unwrap();
        let b = PolicyRegistry::new(&[
            entry("b", None, Some("2.0.0")),
            entry("a", Some("1.0.0"), None),
        ])
        .unwrap();
        let c = PolicyRegistry::new(&[entry("a", Some("1.0.1"), None)]).unwrap();

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_products_sorted_by_name() {
        let registry = registry();
        let names: Vec<_> = registry.products().map(ProductPolicy::name).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(registry.len(), builtin_products().len());
        assert!(!registry.is_empty());
    }
}
