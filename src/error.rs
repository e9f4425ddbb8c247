use crate::domain::offer::CouponError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CommerceError>;

/// Error taxonomy shared by every pipeline.
///
/// `Validation`, `NotFound`, `Conflict` and `Coupon` are client-facing (4xx);
/// `ExternalService` marks best-effort collaborator failures that must not fail
/// the originating operation; everything else is a server fault.
#[derive(Error, Debug)]
pub enum CommerceError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Coupon(#[from] CouponError),
    #[error("external service error: {0}")]
    ExternalService(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl CommerceError {
    /// Single-message validation failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }
}
