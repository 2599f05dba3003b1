//! Assertion helpers that throw.
//!
//! The plain forms throw without an origin scope, so they are caught by
//! `try`, `yell` and `catch_all`, never by `catch`. The `_from` forms, and
//! the [`ensure!`](crate::ensure!), [`check!`](crate::check!) and
//! [`check_throw!`](crate::check_throw!) macros that fill in the current
//! module, throw from a scope and can be recovered with `catch`.

use sleuth_types::{Scope, ThrownError};

use crate::{throw, throw_from};

/// Throws `error` unless `condition` holds.
#[track_caller]
pub fn assert(condition: bool, error: impl Into<ThrownError>) {
    if !condition {
        throw(error);
    }
}

/// [`assert`] throwing from `scope`.
#[track_caller]
pub fn assert_from(scope: Scope, condition: bool, error: impl Into<ThrownError>) {
    if !condition {
        throw_from(scope, error);
    }
}

/// Unwraps `result`, throwing its error.
#[track_caller]
pub fn check<T, E>(result: Result<T, E>) -> T
where
    E: Into<ThrownError>,
{
    match result {
        Ok(value) => value,
        Err(e) => throw(e),
    }
}

/// [`check`] throwing from `scope`.
#[track_caller]
pub fn check_from<T, E>(scope: Scope, result: Result<T, E>) -> T
where
    E: Into<ThrownError>,
{
    match result {
        Ok(value) => value,
        Err(e) => throw_from(scope, e),
    }
}

/// Unwraps `result`, throwing `error` in place of the original error.
#[track_caller]
pub fn check_throw<T, E>(result: Result<T, E>, error: impl Into<ThrownError>) -> T {
    match result {
        Ok(value) => value,
        Err(_) => throw(error),
    }
}

/// [`check_throw`] throwing from `scope`.
#[track_caller]
pub fn check_throw_from<T, E>(
    scope: Scope,
    result: Result<T, E>,
    error: impl Into<ThrownError>,
) -> T {
    match result {
        Ok(value) => value,
        Err(_) => throw_from(scope, error),
    }
}

/// Method forms of [`check`], [`check_from`] and [`check_throw`].
pub trait OrThrow<T> {
    fn or_throw(self) -> T;

    fn or_throw_from(self, scope: Scope) -> T;

    fn or_throw_with(self, error: impl Into<ThrownError>) -> T;
}

impl<T, E> OrThrow<T> for Result<T, E>
where
    E: Into<ThrownError>,
{
    #[track_caller]
    fn or_throw(self) -> T {
        check(self)
    }

    #[track_caller]
    fn or_throw_from(self, scope: Scope) -> T {
        check_from(scope, self)
    }

    #[track_caller]
    fn or_throw_with(self, error: impl Into<ThrownError>) -> T {
        check_throw(self, error)
    }
}
