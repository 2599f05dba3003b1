//! Scoped throw/try/catch on top of Rust unwinding.
//!
//! Instead of threading a `Result` through every internal call, code can
//! [`throw`] an error and let a boundary further up the stack turn it back
//! into an ordinary `Err`:
//!
//! ```
//! use sleuth_core::{ThrownError, throw};
//!
//! fn parse_port(text: &str) -> u16 {
//!     text.parse().unwrap_or_else(|_| throw(ThrownError::msg("bad port")))
//! }
//!
//! let err = sleuth_core::r#try(|| parse_port("http")).unwrap_err();
//! assert_eq!(err.to_string(), "bad port");
//! ```
//!
//! # Boundaries
//!
//! | boundary      | claims                                   | prints on thrown error |
//! |---------------|------------------------------------------|------------------------|
//! | [`r#try`]     | any thrown error                         | never                  |
//! | [`yell`]      | any thrown error                         | always                 |
//! | [`catch`]     | one error instance, thrown in its scope  | when scope differs     |
//! | [`catch_all`] | any thrown error                         | when scope differs     |
//!
//! Anything that unwinds without being thrown is a fault: a bug. No boundary
//! swallows faults. The first boundary a fault crosses prints a diagnostic,
//! later ones stay quiet, and the original payload keeps unwinding.
//!
//! # Scopes
//!
//! Throws and catches can be tied to a module with [`scope!`]; the
//! [`throw!`], [`ensure!`], [`check!`], [`check_throw!`], [`catch!`] and
//! [`catch_all!`] macros do this implicitly. A
//! thrown error is not meant to leave the module that threw it, so a scoped
//! boundary reports one that does.
//!
//! # Reporter
//!
//! Diagnostics, frame filtering and fault deduplication belong to a
//! [`Reporter`]. The free functions use [`Reporter::shared`], configured
//! from `sleuth-config`; applications wanting their own sink or settings
//! call the methods of a `Reporter` they own.

mod boundary;
mod check;
pub mod diagnostic;
mod reporter;
mod state;
mod throw;

pub use boundary::{catch, catch_all, r#try, yell};
pub use check::{
    OrThrow, assert, assert_from, check, check_from, check_throw, check_throw_from,
};
pub use diagnostic::{Diagnostic, DiagnosticKind, Frame, FrameFilter};
pub use reporter::{DiagnosticSink, MemorySink, Reporter, StderrSink};
pub use throw::{throw, throw_from};

pub use sleuth_config::{ConfigError, ReporterConfig, TraceMode};
pub use sleuth_types::{CaptureMode, Scope, ThrownError, ThrownSignal, scope};

/// Throws an error from the current module's scope.
///
/// ```
/// use sleuth_core::{ThrownError, catch_all, throw};
///
/// let result: Result<(), _> = catch_all!(|| throw!(ThrownError::msg("stale lock")));
/// assert_eq!(result.unwrap_err().to_string(), "stale lock");
/// ```
#[macro_export]
macro_rules! throw {
    ($error:expr $(,)?) => {
        $crate::throw_from($crate::scope!(), $error)
    };
}

/// Recovers from one specific error thrown in the current module.
///
/// `catch!(&target, work, recover)` is [`catch`](crate::catch()) with the
/// current module as scope.
#[macro_export]
macro_rules! catch {
    ($target:expr, $work:expr, $recover:expr $(,)?) => {
        $crate::catch($crate::scope!(), $target, $work, $recover)
    };
}

/// [`catch_all`](crate::catch_all()) with the current module as scope.
#[macro_export]
macro_rules! catch_all {
    ($work:expr $(,)?) => {
        $crate::catch_all($crate::scope!(), $work)
    };
}

/// Throws `error` from the current module unless `condition` holds.
///
/// ```
/// use sleuth_core::{ThrownError, catch, ensure};
///
/// let empty = ThrownError::msg("empty batch");
/// let size = catch!(&empty, || { ensure!(false, empty.clone()); 1 }, || 0);
/// assert_eq!(size, 0);
/// ```
#[macro_export]
macro_rules! ensure {
    ($condition:expr, $error:expr $(,)?) => {
        $crate::assert_from($crate::scope!(), $condition, $error)
    };
}

/// [`check`](crate::check()) throwing from the current module.
#[macro_export]
macro_rules! check {
    ($result:expr $(,)?) => {
        $crate::check_from($crate::scope!(), $result)
    };
}

/// [`check_throw`](crate::check_throw()) throwing from the current module.
#[macro_export]
macro_rules! check_throw {
    ($result:expr, $error:expr $(,)?) => {
        $crate::check_throw_from($crate::scope!(), $result, $error)
    };
}
