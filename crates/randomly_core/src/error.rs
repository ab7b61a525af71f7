use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by stream derivation, sampling and the catalog/config layers.
///
/// Every variant is deterministic for a given input; nothing here is worth
/// retrying.
#[derive(Debug, Error)]
pub enum Error {
    /// A range, bound, count, probability or label was malformed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A value the operation cannot work without was absent.
    #[error("missing required value: {0}")]
    MissingReference(&'static str),

    /// No catalog resource exists for the requested locale.
    #[error("catalog not found for base={base} locale={locale}")]
    NotFound { base: String, locale: String },

    /// A catalog resource exists but could not be used.
    #[error("catalog {path:?} is unusable: {reason}")]
    Catalog { path: PathBuf, reason: String },

    #[error("failed to read {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Fail with [`Error::InvalidArgument`] unless `cond` holds.
macro_rules! require {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::Error::InvalidArgument(format!($($arg)+)));
        }
    };
}

pub(crate) use require;
