//! Error types for the try-on workflow.
//!
//! `Display` strings of [`TryOnError`] are shown to the user verbatim.

use std::fmt;

use thiserror::Error;

/// Which uploaded photo(s) a request still needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingAsset {
    Model,
    Product,
    Both,
}

impl fmt::Display for MissingAsset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissingAsset::Model => write!(f, "Please upload a model photo first."),
            MissingAsset::Product => write!(f, "Please upload a product photo first."),
            MissingAsset::Both => write!(f, "Please upload both a model photo and a product photo."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TryOnError {
    #[error("{0}")]
    MissingAsset(MissingAsset),
    #[error("Generate a garment mask for the model photo before creating the try-on image.")]
    MissingMask,
    #[error("Describe the change you want to make in the painted area.")]
    EmptyInpaintDescription,
    #[error("Could not build a mask from the drawing. Paint over the area you want to change.")]
    MaskConstructionFailed,
    #[error("Generation failed: {0}")]
    CollaboratorFailure(String),
    #[error("Another generation request is still running.")]
    RequestInFlight,
    #[error("There is no generated image to edit yet.")]
    NoResult,
    #[error("Region editing is not active.")]
    NotEditing,
    #[error("Received a response for a request that is no longer pending.")]
    StaleCompletion,
    #[error("Could not read image: {0}")]
    AssetDecode(String),
}

impl TryOnError {
    /// Precondition failures caught before anything is sent to the service.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TryOnError::MissingAsset(_)
                | TryOnError::MissingMask
                | TryOnError::EmptyInpaintDescription
                | TryOnError::MaskConstructionFailed
        )
    }
}

impl From<image::ImageError> for TryOnError {
    fn from(err: image::ImageError) -> Self {
        TryOnError::AssetDecode(err.to_string())
    }
}

/// Failures reported by a generation service call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("no API key configured (set GEMINI_API_KEY or pass --api-key)")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Transport(String),
    #[error("service returned HTTP {status}: {message}")]
    Service { status: u16, message: String },
    #[error("could not decode service response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for CollaboratorError {
    fn from(err: reqwest::Error) -> Self {
        CollaboratorError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_asset_messages_are_specific() {
        let model = TryOnError::MissingAsset(MissingAsset::Model).to_string();
        let product = TryOnError::MissingAsset(MissingAsset::Product).to_string();
        assert!(model.contains("model photo"));
        assert!(product.contains("product photo"));
        assert_ne!(model, product);
    }

    #[test]
    fn description_and_mask_failures_differ() {
        assert_ne!(
            TryOnError::EmptyInpaintDescription.to_string(),
            TryOnError::MaskConstructionFailed.to_string()
        );
        assert!(TryOnError::EmptyInpaintDescription.is_validation());
        assert!(!TryOnError::CollaboratorFailure("x".into()).is_validation());
    }

    #[test]
    fn collaborator_failure_carries_cause() {
        let cause = CollaboratorError::Service {
            status: 429,
            message: "quota".to_string(),
        };
        let err = TryOnError::CollaboratorFailure(cause.to_string());
        assert_eq!(err.to_string(), "Generation failed: service returned HTTP 429: quota");
    }
}
