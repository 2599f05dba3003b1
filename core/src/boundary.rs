//! Boundaries: where thrown errors turn back into returned errors.
//!
//! Every boundary runs its work under `catch_unwind` and classifies what
//! comes out. Thrown signals are converted (or, for [`Reporter::catch`],
//! possibly re-raised); anything else is a fault, which is reported once and
//! always re-raised with its original payload.
//!
//! Entering a boundary advances the thread's panic generation and makes the
//! reporter's capture mode the one throws below it use.
//!
//! Work closures are wrapped in `AssertUnwindSafe`: a boundary hands back
//! control only for thrown errors, which are ordinary control flow for the
//! code that threw them.

use std::panic::{AssertUnwindSafe, catch_unwind};

use sleuth_types::{Fault, Scope, ThrownError, ThrownSignal, Unwind};

use crate::{Reporter, state};

impl Reporter {
    /// Runs `work`, returning `Err` with the error it threw, if any.
    /// Prints nothing for thrown errors.
    pub fn r#try<R>(&self, work: impl FnOnce() -> R) -> Result<R, ThrownError> {
        self.intercept(work, false)
    }

    /// Like [`r#try`](Self::r#try), but prints a diagnostic for a caught
    /// thrown error.
    pub fn yell<R>(&self, work: impl FnOnce() -> R) -> Result<R, ThrownError> {
        self.intercept(work, true)
    }

    /// Recovers from exactly `target` thrown from `scope`.
    ///
    /// - a fault is reported and re-raised;
    /// - a signal from another scope (or none) is reported as escaping its
    ///   scope and re-raised;
    /// - a signal from `scope` carrying a different error instance is
    ///   re-raised silently;
    /// - otherwise `recover` runs and its value is returned.
    ///
    /// Errors are matched by identity, not by value.
    pub fn catch<R>(
        &self,
        scope: Scope,
        target: &ThrownError,
        work: impl FnOnce() -> R,
        recover: impl FnOnce() -> R,
    ) -> R {
        let _entered = self.enter();
        let payload = match catch_unwind(AssertUnwindSafe(work)) {
            Ok(value) => return value,
            Err(payload) => payload,
        };
        match Unwind::classify(payload) {
            Unwind::Fault(fault) => self.escalate(fault),
            Unwind::Thrown(signal) if !signal.belongs_to(scope) => {
                self.report_scope_violation(&signal, scope);
                signal.raise()
            }
            Unwind::Thrown(signal) if signal.error().same_instance(target) => {
                tracing::debug!(
                    scope = %scope,
                    error = %signal.error(),
                    location = %signal.location(),
                    "Recovering from thrown error"
                );
                drop(signal);
                recover()
            }
            Unwind::Thrown(signal) => {
                tracing::trace!(
                    scope = %scope,
                    error = %signal.error(),
                    "Not the caught error, rethrowing"
                );
                signal.raise()
            }
        }
    }

    /// Returns whatever was thrown in `work`, from any scope.
    ///
    /// A signal thrown outside `scope` is still returned, but is reported as
    /// escaping its scope first. Faults are reported and re-raised.
    pub fn catch_all<R>(
        &self,
        scope: Scope,
        work: impl FnOnce() -> R,
    ) -> Result<R, ThrownError> {
        let _entered = self.enter();
        let payload = match catch_unwind(AssertUnwindSafe(work)) {
            Ok(value) => return Ok(value),
            Err(payload) => payload,
        };
        match Unwind::classify(payload) {
            Unwind::Fault(fault) => self.escalate(fault),
            Unwind::Thrown(signal) => {
                if !signal.belongs_to(scope) {
                    self.report_scope_violation(&signal, scope);
                }
                Err(self.accept(signal))
            }
        }
    }

    fn intercept<R>(&self, work: impl FnOnce() -> R, loud: bool) -> Result<R, ThrownError> {
        let _entered = self.enter();
        let payload = match catch_unwind(AssertUnwindSafe(work)) {
            Ok(value) => return Ok(value),
            Err(payload) => payload,
        };
        match Unwind::classify(payload) {
            Unwind::Fault(fault) => self.escalate(fault),
            Unwind::Thrown(signal) => {
                if loud {
                    self.report_thrown(&signal);
                }
                Err(self.accept(signal))
            }
        }
    }

    fn enter(&self) -> state::Entered {
        state::enter(self.config().diagnostics.capture)
    }

    fn accept(&self, signal: ThrownSignal) -> ThrownError {
        tracing::debug!(
            origin = ?signal.origin().map(Scope::path),
            error = %signal.error(),
            location = %signal.location(),
            "Thrown error intercepted"
        );
        signal.into_error()
    }

    fn escalate(&self, fault: Fault) -> ! {
        let fault = state::observe(fault);
        self.report_fault(&fault);
        fault.resume()
    }
}

/// [`Reporter::r#try`] on the shared reporter.
pub fn r#try<R>(work: impl FnOnce() -> R) -> Result<R, ThrownError> {
    Reporter::shared().r#try(work)
}

/// [`Reporter::yell`] on the shared reporter.
pub fn yell<R>(work: impl FnOnce() -> R) -> Result<R, ThrownError> {
    Reporter::shared().yell(work)
}

/// [`Reporter::catch`] on the shared reporter. See [`catch!`](crate::catch!).
pub fn catch<R>(
    scope: Scope,
    target: &ThrownError,
    work: impl FnOnce() -> R,
    recover: impl FnOnce() -> R,
) -> R {
    Reporter::shared().catch(scope, target, work, recover)
}

/// [`Reporter::catch_all`] on the shared reporter. See
/// [`catch_all!`](crate::catch_all!).
pub fn catch_all<R>(scope: Scope, work: impl FnOnce() -> R) -> Result<R, ThrownError> {
    Reporter::shared().catch_all(scope, work)
}
