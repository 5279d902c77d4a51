use std::error::Error as StdError;

/// Crate-wide result type for platform operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors shared by the platform and endpoint traits.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A referenced message, channel or resource no longer exists.
    #[error("not found: {what}")]
    NotFound { what: String },

    /// Operation is currently unavailable (not configured/ready).
    #[error("operation unavailable: {message}")]
    Unavailable { message: String },

    /// Wrapped source error from the transport.
    #[error("{context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl Error {
    #[must_use]
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        Self::NotFound {
            what: what.to_string(),
        }
    }

    #[must_use]
    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Whether the error means the target is gone (deleted, never existed,
    /// or invisible to us). Callers treat this as recoverable.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
