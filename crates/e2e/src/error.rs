//! Error types for the observability pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Screenshot failed: {0}")]
    Screenshot(String),

    #[error("Encoder error: {0}")]
    Encoder(String),

    #[error("No execution context attached to event: {0}")]
    MissingContext(String),

    #[error("Consumer '{consumer}' failed: {reason}")]
    Consumer { consumer: String, reason: String },

    #[error("Notification error: {0}")]
    Notification(String),

    #[error(transparent)]
    Common(#[from] lumen_common::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;
