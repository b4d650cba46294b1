//! Configuration module for image extraction
//!
//! This module provides the `ExtractorConfig` struct and its type-safe builder
//! with validation and sensible defaults.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod types;

// Re-exports for public API
pub use builder::{ExtractorConfigBuilder, WithOutputDir};
pub use types::ExtractorConfig;
