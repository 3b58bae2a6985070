/// Convenience result type used across tileprint.
pub type TileResult<T> = Result<T, TileError>;

/// Top-level error taxonomy used by layout and export APIs.
///
/// Out-of-range numeric settings are clamped rather than reported, so `Validation` only covers
/// inputs that have no sensible nearest value (zero-sized images, malformed settings files).
#[derive(thiserror::Error, Debug)]
pub enum TileError {
    /// Input that cannot be clamped into a usable value.
    #[error("validation error: {0}")]
    Validation(String),

    /// Export cannot start because a required input is missing.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// Export refused because it would exceed a memory/time budget.
    #[error("resource limit exceeded: {0}")]
    ResourceGuard(String),

    /// Another export on the same exporter has not finished yet.
    #[error("an export is already in progress")]
    ExportInProgress,

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TileError {
    /// Build a [`TileError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TileError::Precondition`] value.
    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    /// Build a [`TileError::ResourceGuard`] value.
    pub fn resource_guard(msg: impl Into<String>) -> Self {
        Self::ResourceGuard(msg.into())
    }

    /// Whether this error blocks export before any heavy allocation happened.
    pub fn is_guard(&self) -> bool {
        matches!(self, Self::ResourceGuard(_) | Self::Precondition(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
