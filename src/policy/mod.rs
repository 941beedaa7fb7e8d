//! Product version policy.

pub mod mode;
pub mod registry;
pub mod version;
