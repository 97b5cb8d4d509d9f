//! Lumen Common Library
//!
//! Shared types, configuration and content digests for the Lumen
//! test-execution observability pipeline.

pub mod config;
pub mod digest;
pub mod error;
pub mod telemetry;
pub mod types;

// Re-export commonly used types
pub use config::{EventTemplate, EventsConfig, Interpolator, Severity, VideoConfig};
pub use digest::DigestSet;
pub use error::{Error, Result};
pub use types::*;

/// Lumen version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
