//! bandscore-providers: Feedback provider integrations.
//!
//! Implements the `FeedbackProvider` trait for OpenAI-compatible chat
//! completion APIs, plus a scripted mock for tests and offline use.

pub mod config;
pub mod error;
pub mod mock;
pub mod openai;

pub use config::{create_provider, load_config, BandscoreConfig, ProviderConfig};
pub use error::ProviderError;
