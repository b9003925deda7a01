//! Shared test utilities for jobtrack integration tests.
//!
//! This module provides:
//! - `TrackerHarness` for isolated test execution with a temp pipeline tree
//! - `RecordBuilder` for creating record folders programmatically

pub mod builders;
pub mod harness;

pub use builders::RecordBuilder;
pub use harness::{ts, TrackerHarness};
