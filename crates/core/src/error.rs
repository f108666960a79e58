/// Domain error taxonomy shared by every layer.
///
/// `NotFound`, `Validation`, `Conflict`, and `LimitExceeded` are produced
/// deliberately by orchestration checks; `Internal` wraps unexpected
/// store/gateway failures on the primary write path. The HTTP status
/// mapping lives in `storydeck-api`.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a `NotFound` keyed by an external UUID.
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Wrap an unexpected lower-layer failure with context.
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        Self::Internal(format!("{context}: {err}"))
    }
}
