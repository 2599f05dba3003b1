//! Thrown error handle.

use std::error::Error;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use thiserror::Error;

/// Ad-hoc error built from a message, see [`ThrownError::msg`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct MessageError(String);

impl MessageError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A thrown error.
///
/// Clones share one underlying instance. Two handles are only "the same
/// error" when they point at that instance, so there is intentionally no
/// `PartialEq`: use [`same_instance`](Self::same_instance). Two errors that
/// print identically but were raised separately are different errors.
///
/// Like `anyhow::Error`, this type converts from any `std::error::Error` and
/// therefore does not implement `Error` itself; it derefs to one instead.
#[derive(Clone)]
pub struct ThrownError(Arc<dyn Error + Send + Sync + 'static>);

impl ThrownError {
    pub fn new<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self(Arc::new(error))
    }

    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(MessageError::new(message))
    }

    /// Identity comparison: true only when both handles share one instance.
    #[must_use]
    pub fn same_instance(&self, other: &ThrownError) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    #[must_use]
    pub fn downcast_ref<E>(&self) -> Option<&E>
    where
        E: Error + 'static,
    {
        self.0.downcast_ref::<E>()
    }

    #[must_use]
    pub fn is<E>(&self) -> bool
    where
        E: Error + 'static,
    {
        self.0.is::<E>()
    }

    #[must_use]
    pub fn as_error(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.0
    }
}

impl<E> From<E> for ThrownError
where
    E: Error + Send + Sync + 'static,
{
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

impl Deref for ThrownError {
    type Target = dyn Error + Send + Sync + 'static;

    fn deref(&self) -> &Self::Target {
        self.as_error()
    }
}

impl AsRef<dyn Error + Send + Sync + 'static> for ThrownError {
    fn as_ref(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.as_error()
    }
}

impl fmt::Display for ThrownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl fmt::Debug for ThrownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}
