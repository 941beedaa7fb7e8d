//! # Relgate
//!
//! **Version-policy and request validation for licensing-aware package gateways.**
//!
//! Relgate sits between a request router and an upstream package-distribution
//! API. It decides whether a request for a channel, product and version is
//! allowed under per-product version policy, and prunes upstream listings
//! the same way.
//!
//! ## Features
//!
//! - **Product policy registry** - minimum supported and open-source cutoff
//!   versions per product, immutable after startup
//! - **Validator chain** - every rule runs, every failure is reported
//! - **Single verdict** - messages joined, highest severity wins
//! - **Listing strategies** - commercial, open-source and trial pruning
//! - **Explicit opt-out** - `eol=true` lifts version restrictions
//!
//! ## Quickstart
//!
//! ```
//! use relgate::{Gate, GateConfig, RequestContext, RequestParams, ServiceMode};
//!
//! fn main() -> Result<(), relgate::GateError> {
//!     let gate = Gate::new(GateConfig::for_mode(ServiceMode::Commercial))?;
//!
//!     let params = RequestParams::from_query([
//!         ("channel", "stable"),
//!         ("product", "chef"),
//!         ("v", "10.0.0"),
//!     ]);
//!
//!     match gate.validate_request(&params, &RequestContext::default()) {
//!         Ok(()) => println!("forwarding request"),
//!         Err(rejection) => println!("{} {}", rejection.code, rejection.message),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Policy decisions
//!
//! - `latest` is never end-of-life
//! - Products without a registered policy are never end-of-life (fail-open)
//! - Versions that are not semantic versions are reported, never waved through
//!
//! See [`PolicyRegistry`] for the full set of checks.

#![deny(missing_docs)]

// Core modules
pub mod config;
pub mod errors;

// Request model
pub mod request;

// Policy layer
pub mod policy;

// Validation layer
pub mod validate;

// Listing filters
pub mod filter;

// Gate (main public API)
pub mod gate;

// Re-exports for public API
pub use config::{GateConfig, ProductPolicyConfig};
pub use errors::GateError;
pub use filter::{filter_list, filter_product_list};
pub use gate::{Gate, Rejection};
pub use policy::mode::{ListingStrategy, ServiceMode};
pub use policy::registry::{PolicyRegistry, ProductPolicy};
pub use request::{Field, RequestContext, RequestParams};
pub use validate::chain::{aggregate, Aggregate, ValidatorChain};
pub use validate::{ValidationError, Validator};
