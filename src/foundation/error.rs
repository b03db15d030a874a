use crate::foundation::core::ContextId;

/// Convenience result type used across backdrop.
pub type BackdropResult<T> = Result<T, BackdropError>;

/// Error taxonomy for the background pipeline.
///
/// None of these are retried by the crate. Contract violations
/// ([`BackdropError::ContextMismatch`], zero-sized sources reported as
/// [`BackdropError::Validation`]) indicate a bug in the host; allocation
/// failures indicate the GPU refused a texture.
#[derive(thiserror::Error, Debug)]
pub enum BackdropError {
    /// Invalid user-provided data: zero-sized images, bad config, mismatched buffers.
    #[error("validation error: {0}")]
    Validation(String),

    /// A texture was bound against a context other than the one that created it.
    #[error("context mismatch: texture owned by {owner} cannot bind to {bound}")]
    ContextMismatch {
        /// Context the texture was allocated on.
        owner: ContextId,
        /// Context the caller tried to bind against.
        bound: ContextId,
    },

    /// The GPU reported an error code immediately after texture creation.
    #[error("texture allocation failed: GL_ERROR {code:#06x}")]
    Allocation {
        /// Raw error code reported by the canvas.
        code: u32,
    },

    /// A canvas failed to execute a draw, upload or readback.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BackdropError {
    /// Build a [`BackdropError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`BackdropError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`BackdropError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether this error is a programming-contract violation rather than an
    /// environment failure.
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::ContextMismatch { .. } | Self::Validation(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
