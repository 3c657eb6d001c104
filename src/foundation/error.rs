/// Convenience result type used across nixie.
pub type NixieResult<T> = Result<T, NixieError>;

/// Top-level error taxonomy used by the clock face APIs.
#[derive(thiserror::Error, Debug)]
pub enum NixieError {
    /// No bitmap resource matches the requested name.
    #[error("resource not found: {0}")]
    ResourceNotFound(String),

    /// A resource exists but could not be decoded into a drawable bitmap.
    #[error("decode failed: {0}")]
    DecodeFailed(String),

    /// Invalid caller-provided data (time values, canvas sizes, names).
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors while executing a draw list.
    #[error("render error: {0}")]
    Render(String),

    /// Invalid or unreadable configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl NixieError {
    /// Build a [`NixieError::ResourceNotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::ResourceNotFound(msg.into())
    }

    /// Build a [`NixieError::DecodeFailed`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::DecodeFailed(msg.into())
    }

    /// Build a [`NixieError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`NixieError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`NixieError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for the two element-resolution failures a view recovers from with a placeholder.
    pub fn is_resource_error(&self) -> bool {
        matches!(self, Self::ResourceNotFound(_) | Self::DecodeFailed(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
