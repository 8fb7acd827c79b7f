//! Brain Module
//!
//! Everything that talks to the language model: the provider trait, the
//! DeepSeek HTTP client and the adapter that folds failures into a
//! displayable outcome.

pub mod outcome;
pub mod provider;

// Re-exports
pub use outcome::{ask, render_failure, ModelOutcome};
pub use provider::{DeepSeekProvider, Provider, ProviderError};
