//! Shared test utilities for the contract harness crates.
//!
//! This crate provides:
//! - Proptest generators for matcher trees and HTTP shapes
//! - Contract fixtures drawn from the taxi-job and product-catalogue clients
//! - Test logging initialization

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod logging;

pub use generators::*;
pub use logging::init_test_logging;
