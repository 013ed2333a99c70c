//! Captured failures carried from a block body to the release step.

use std::any::Any;
use std::fmt;

use thiserror::Error;

/// Boxed error accepted from block bodies and resource constructors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for block operations that can surface a captured failure.
pub type Result<T> = std::result::Result<T, Failure>;

/// A failure captured inside a block and replayed after release.
///
/// Identity is opaque: the block never inspects a failure, it only stores
/// one and hands it back (or resumes it) once the adapter's `exit` has run.
#[derive(Error)]
pub enum Failure {
    /// A body or constructor returned an error.
    #[error("{source}")]
    Raised {
        /// The error the body returned.
        #[source]
        source: BoxError,
    },

    /// A body or constructor panicked.
    #[error("panicked: {message}")]
    Panicked {
        /// Text extracted from the panic payload.
        message: String,
        /// Original payload, kept so the panic can be resumed verbatim.
        payload: Box<dyn Any + Send + 'static>,
    },
}

impl Failure {
    /// Wrap an error as a captured failure.
    pub fn raised(error: impl Into<BoxError>) -> Self {
        Self::Raised {
            source: error.into(),
        }
    }

    /// Wrap a panic payload as a captured failure.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send + 'static>) -> Self {
        Self::Panicked {
            message: panic_message(payload.as_ref()),
            payload,
        }
    }

    /// Whether this failure originated from a panic.
    #[must_use]
    pub fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked { .. })
    }

    /// Human-readable description of the failure.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Raised { source } => source.to_string(),
            Self::Panicked { message, .. } => message.clone(),
        }
    }

    /// Borrow the raised error as a concrete type.
    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: std::error::Error + 'static,
    {
        match self {
            Self::Raised { source } => source.downcast_ref::<E>(),
            Self::Panicked { .. } => None,
        }
    }

    /// Take the raised error out, if this failure was not a panic.
    #[must_use]
    pub fn into_error(self) -> Option<BoxError> {
        match self {
            Self::Raised { source } => Some(source),
            Self::Panicked { .. } => None,
        }
    }

    /// Re-raise the failure by unwinding.
    ///
    /// Panics resume with their original payload. Raised errors unwind with
    /// the `Failure` itself as payload, so `catch_unwind` callers can downcast
    /// the payload back to `Failure`.
    pub fn resume(self) -> ! {
        match self {
            Self::Panicked { payload, .. } => std::panic::resume_unwind(payload),
            raised @ Self::Raised { .. } => std::panic::resume_unwind(Box::new(raised)),
        }
    }
}

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Raised { source } => f.debug_struct("Raised").field("source", source).finish(),
            Self::Panicked { message, .. } => f
                .debug_struct("Panicked")
                .field("message", message)
                .finish_non_exhaustive(),
        }
    }
}

/// Extract the text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run `f`, converting both error returns and panics into a [`Failure`].
pub(crate) fn capture<T>(f: impl FnOnce() -> std::result::Result<T, BoxError>) -> Result<T> {
    match std::panic::catch_unwind(std::panic::AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(source)) => Err(Failure::Raised { source }),
        Err(payload) => Err(Failure::from_panic(payload)),
    }
}
