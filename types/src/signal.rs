//! The tagged payload raised by a throw.

use std::backtrace::Backtrace;
use std::panic::{Location, resume_unwind};

use serde::Deserialize;

use crate::{Scope, ThrownError};

/// When a throw records its stack trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Capture on every throw.
    #[default]
    Always,
    /// Capture only when `RUST_BACKTRACE`/`RUST_LIB_BACKTRACE` ask for it.
    Env,
    Never,
}

impl CaptureMode {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "always" => Some(Self::Always),
            "env" => Some(Self::Env),
            "never" => Some(Self::Never),
            _ => None,
        }
    }

    #[must_use]
    pub fn capture(self) -> Backtrace {
        match self {
            Self::Always => Backtrace::force_capture(),
            Self::Env => Backtrace::capture(),
            Self::Never => Backtrace::disabled(),
        }
    }
}

/// Payload of a throw.
///
/// Fields are private and the type is not `Clone`: a signal is built once at
/// the throw site and consumed once, either converted into its error by the
/// boundary that intercepts it or raised again unchanged.
#[derive(Debug)]
pub struct ThrownSignal {
    error: ThrownError,
    origin: Option<Scope>,
    location: &'static Location<'static>,
    trace: Backtrace,
}

impl ThrownSignal {
    /// Builds a signal, recording the caller's location.
    #[track_caller]
    #[must_use]
    pub fn new(error: ThrownError, origin: Option<Scope>, capture: CaptureMode) -> Self {
        Self {
            error,
            origin,
            location: Location::caller(),
            trace: capture.capture(),
        }
    }

    #[must_use]
    pub fn error(&self) -> &ThrownError {
        &self.error
    }

    #[must_use]
    pub fn origin(&self) -> Option<Scope> {
        self.origin
    }

    /// True when the signal was thrown from `scope`. Unscoped signals belong
    /// to no scope.
    #[must_use]
    pub fn belongs_to(&self, scope: Scope) -> bool {
        self.origin == Some(scope)
    }

    #[must_use]
    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }

    #[must_use]
    pub fn trace(&self) -> &Backtrace {
        &self.trace
    }

    #[must_use]
    pub fn into_error(self) -> ThrownError {
        self.error
    }

    /// Starts (or continues) unwinding with this signal as the payload.
    ///
    /// Uses `resume_unwind`, so the panic hook does not run.
    pub fn raise(self) -> ! {
        resume_unwind(Box::new(self))
    }
}
