//! Raising thrown errors.

use sleuth_types::{CaptureMode, Scope, ThrownError, ThrownSignal};

use crate::{Reporter, state};

/// Throws `error` without an origin scope.
///
/// Unwinds to the nearest [`r#try`](crate::r#try), [`yell`](crate::yell) or
/// [`catch_all`](crate::catch_all). [`catch`](crate::catch) never claims an
/// unscoped throw. With no boundary above it, the throw unwinds out of the
/// thread like any other panic, without running the panic hook.
#[track_caller]
pub fn throw(error: impl Into<ThrownError>) -> ! {
    ThrownSignal::new(error.into(), None, capture_mode()).raise()
}

/// Throws `error` from `scope`. See [`throw!`](crate::throw!) for the form
/// that fills in the current module.
#[track_caller]
pub fn throw_from(scope: Scope, error: impl Into<ThrownError>) -> ! {
    ThrownSignal::new(error.into(), Some(scope), capture_mode()).raise()
}

/// The innermost boundary's capture mode, or the shared reporter's when the
/// throw has no boundary above it.
fn capture_mode() -> CaptureMode {
    state::capture_mode().unwrap_or_else(|| Reporter::shared().config().diagnostics.capture)
}
