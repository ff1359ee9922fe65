//! # vaultkeeper-core
//!
//! Core crate for Vaultkeeper. Contains the storage contract consumed by the
//! backup object model, configuration schemas, object versions, primitive
//! field values, the request context, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Vaultkeeper crates.

pub mod config;
pub mod context;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use context::{AdminScope, RequestContext};
pub use error::AppError;
pub use result::AppResult;
