//! Tenantry Shared Types
//!
//! This crate contains the plain data types shared across the Tenantry
//! platform: plan/tier/cycle models, the limit sentinel, and the immutable
//! feature/limit catalogs.

pub mod catalog;
pub mod types;

pub use catalog::*;
pub use types::*;
