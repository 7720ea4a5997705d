// shared/src/lib.rs

/// Failure taxonomy for every catalog lookup.
///
/// A successful lookup is `Ok`; the three query-time variants are terminal,
/// never cached and never retried by the access layer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed caller input, detected before any backend is touched.
    #[error("validation: {0}")]
    Validation(String),
    /// The backend legitimately holds nothing for the query.
    #[error("not found: {0}")]
    NotFound(String),
    /// The backend failed (non-404 remote status, transport or store fault).
    #[error("transient: {0}")]
    Transient(String),
    /// Start-up wiring fault; never produced by a query.
    #[error("internal: {0}")]
    Internal(String),
}

impl Error {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Transient(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// The message without its category prefix.
    pub fn detail(&self) -> &str {
        match self {
            Error::Validation(msg)
            | Error::NotFound(msg)
            | Error::Transient(msg)
            | Error::Internal(msg) => msg,
        }
    }
}


pub type Result<T> = std::result::Result<T, Error>;

pub mod config;
