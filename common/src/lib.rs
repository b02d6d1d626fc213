pub mod config;

/// Common utilities shared across the mock backend workspace
///
/// This crate provides shared functionality used by the `simcore` engine
/// and the `ispops` resource crates:
///
/// - YAML configuration loading for the mock server binary
/// - Shared test utilities (unique fixture IDs, request builders)

// Test helpers module - available for both development and test builds
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

// Re-export commonly used test utilities for easier access
#[cfg(any(test, feature = "test-helpers"))]
pub use test_helpers::{generate_unique_id, generate_unique_test_id};
