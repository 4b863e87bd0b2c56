//! Common test utilities and helpers.
//!
//! This module provides shared functionality for all tests, including:
//! - Message builders and canned scenario batches
//! - Custom assertions over ranked results

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;

pub use assertions::*;
pub use fixtures::*;
