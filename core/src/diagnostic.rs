//! Diagnostic capture and stack filtering.
//!
//! A [`Diagnostic`] is what a boundary prints when it intercepts something
//! worth surfacing. Frames are parsed from the display form of
//! [`std::backtrace::Backtrace`] and passed through a [`FrameFilter`] that
//! drops frames belonging to sleuth itself and to the unwinding machinery,
//! so what remains is application code. Filtering never affects control
//! flow; it only changes what is printed.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt::Write as _;
use std::thread;

use regex::RegexSet;
use sleuth_config::{ConfigError, TraceMode};
use sleuth_types::{Fault, Scope, ThrownSignal};

/// Symbols of frames that are never application code.
const MECHANISM_FRAMES: &[&str] = &[
    r"^sleuth_(core|types)::",
    r"^<sleuth_(core|types)::",
    r"^std::backtrace",
    r"^backtrace::",
    r"^std::panic",
    r"^std::panicking::",
    r"^core::panic",
    r"^core::panicking::",
    r"^std::sys::backtrace::",
    r"^std::sys_common::backtrace::",
    r"^core::ops::function::",
    r"^<core::panic::unwind_safe::AssertUnwindSafe<",
    r"^<alloc::boxed::Box<F,\s?A> as core::ops::function::Fn",
    r"^__rust_",
    r"^rust_begin_unwind$",
    r"^_?Unwind_",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    ThrownError,
    UnexpectedPanic,
    /// A thrown error reached a boundary in a scope other than its own.
    ScopeViolation,
}

impl DiagnosticKind {
    #[must_use]
    pub const fn header(self) -> &'static str {
        match self {
            Self::ThrownError => "intercepted thrown error",
            Self::UnexpectedPanic => "intercepted unexpected panic",
            Self::ScopeViolation => "thrown error escaped its scope",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub symbol: String,
    pub location: Option<String>,
}

impl Frame {
    pub fn new(symbol: impl Into<String>, location: Option<&str>) -> Self {
        Self {
            symbol: symbol.into(),
            location: location.map(ToString::to_string),
        }
    }
}

/// Parses the display form of a captured backtrace into frames.
///
/// Each symbol line (`  12: app::load`, or an index-less inlined symbol)
/// starts a frame; a following `at file:line:col` line sets its location.
#[must_use]
pub fn parse_backtrace(text: &str) -> Vec<Frame> {
    let mut frames: Vec<Frame> = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(location) = line.strip_prefix("at ") {
            if let Some(frame) = frames.last_mut()
                && frame.location.is_none()
            {
                frame.location = Some(location.trim().to_string());
            }
            continue;
        }
        let symbol = match line.split_once(": ") {
            Some((index, rest)) if index.chars().all(|c| c.is_ascii_digit()) => rest,
            _ => line,
        };
        frames.push(Frame::new(symbol.trim(), None));
    }
    frames
}

/// Frames of a backtrace, or nothing when it was not captured.
#[must_use]
pub fn backtrace_frames(trace: &Backtrace) -> Vec<Frame> {
    if trace.status() == BacktraceStatus::Captured {
        parse_backtrace(&trace.to_string())
    } else {
        Vec::new()
    }
}

/// Decides which frames are hidden from printed traces.
#[derive(Debug, Clone)]
pub struct FrameFilter {
    builtin: RegexSet,
    extra: RegexSet,
}

impl FrameFilter {
    /// Filter with the built-in mechanism patterns plus `extra` regexes.
    pub fn new<S: AsRef<str>>(extra: &[S]) -> Result<Self, ConfigError> {
        let extra = RegexSet::new(extra.iter().map(|p| p.as_ref())).map_err(|source| {
            ConfigError::InvalidPattern {
                pattern: extra
                    .iter()
                    .map(|p| p.as_ref())
                    .collect::<Vec<_>>()
                    .join(", "),
                source,
            }
        })?;
        Ok(Self {
            builtin: builtin_set(),
            extra,
        })
    }

    #[must_use]
    pub fn builtin() -> Self {
        Self {
            builtin: builtin_set(),
            extra: RegexSet::empty(),
        }
    }

    #[must_use]
    pub fn hides(&self, frame: &Frame) -> bool {
        self.builtin.is_match(&frame.symbol) || self.extra.is_match(&frame.symbol)
    }

    #[must_use]
    pub fn apply(&self, frames: Vec<Frame>) -> Vec<Frame> {
        frames.into_iter().filter(|f| !self.hides(f)).collect()
    }

    /// Frames to print for `mode`.
    #[must_use]
    pub fn select(&self, frames: Vec<Frame>, mode: TraceMode) -> Vec<Frame> {
        match mode {
            TraceMode::Off => Vec::new(),
            TraceMode::Filtered => self.apply(frames),
            TraceMode::Full => frames,
        }
    }
}

impl Default for FrameFilter {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_set() -> RegexSet {
    RegexSet::new(MECHANISM_FRAMES).expect("builtin frame patterns are valid")
}

/// A rendered-once report about an intercepted unwind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    /// Where the unwind came from: the throw site, or the panicking thread.
    pub locator: String,
    pub frames: Vec<Frame>,
}

impl Diagnostic {
    #[must_use]
    pub fn thrown(signal: &ThrownSignal, filter: &FrameFilter, mode: TraceMode) -> Self {
        Self {
            kind: DiagnosticKind::ThrownError,
            message: signal.error().to_string(),
            locator: format!("thrown at {}", signal.location()),
            frames: filter.select(backtrace_frames(signal.trace()), mode),
        }
    }

    /// `catching` is the scope of the boundary the signal escaped into.
    #[must_use]
    pub fn scope_violation(
        signal: &ThrownSignal,
        catching: Scope,
        filter: &FrameFilter,
        mode: TraceMode,
    ) -> Self {
        let origin = signal
            .origin()
            .map_or_else(|| "<unscoped>".to_string(), |s| s.to_string());
        Self {
            kind: DiagnosticKind::ScopeViolation,
            message: format!(
                "{} (thrown in {origin}, caught in {catching})",
                signal.error()
            ),
            locator: format!("thrown at {}", signal.location()),
            frames: filter.select(backtrace_frames(signal.trace()), mode),
        }
    }

    /// Faults carry no trace of their own; `trace` is captured by the
    /// boundary that reports them. The locator names the panic site when the
    /// panic hook saw it, and the thread either way.
    #[must_use]
    pub fn fault(fault: &Fault, trace: &Backtrace, filter: &FrameFilter, mode: TraceMode) -> Self {
        let current = thread::current();
        let name = current.name().unwrap_or("<unnamed>");
        let locator = match fault.location() {
            Some(location) => format!("panicked at {location} on thread '{name}'"),
            None => format!("thread '{name}'"),
        };
        Self {
            kind: DiagnosticKind::UnexpectedPanic,
            message: fault.message(),
            locator,
            frames: filter.select(backtrace_frames(trace), mode),
        }
    }

    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}: {}", self.kind.header(), self.message);
        out.push('\n');
        out.push_str(&self.locator);
        out.push('\n');
        for frame in &self.frames {
            out.push_str(&frame.symbol);
            out.push('\n');
            if let Some(location) = &frame.location {
                let _ = writeln!(out, "    at {location}");
            }
        }
        out
    }
}
