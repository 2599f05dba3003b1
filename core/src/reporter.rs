//! Diagnostic reporter and the last-fault marker.
//!
//! A [`Reporter`] owns everything boundaries need to print: configuration,
//! the frame filter, the output sink and the marker remembering the last
//! fault it reported. Applications normally build one at their root and
//! pass it by reference; the free functions of this crate use
//! [`Reporter::shared`].

use std::fmt;
use std::io::{self, Write as _};
use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use sleuth_config::{ConfigError, ReporterConfig};
use sleuth_types::{Fault, FaultId, Scope, ThrownSignal};

use crate::diagnostic::{Diagnostic, FrameFilter};

/// Destination of rendered diagnostics.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, text: &str);
}

/// Writes diagnostics to the process's standard error.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn emit(&self, text: &str) {
        let mut stderr = io::stderr().lock();
        // Nowhere left to report a failing stderr.
        let _ = stderr.write_all(text.as_bytes());
        let _ = stderr.flush();
    }
}

/// Collects diagnostics in memory. Clones share one buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every diagnostic emitted so far, one entry each.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.lock().clone()
    }

    #[must_use]
    pub fn contents(&self) -> String {
        self.lock().concat()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn take(&self) -> Vec<String> {
        mem::take(&mut *self.lock())
    }

    fn lock(&self) -> MutexGuard<'_, Vec<String>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticSink for MemorySink {
    fn emit(&self, text: &str) {
        self.lock().push(text.to_string());
    }
}

pub struct Reporter {
    config: ReporterConfig,
    filter: FrameFilter,
    sink: Box<dyn DiagnosticSink>,
    /// Last fault printed. Locked so that concurrent reports of one fault
    /// print once; never reset.
    last_fault: Mutex<Option<FaultId>>,
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self {
            config: ReporterConfig::default(),
            filter: FrameFilter::builtin(),
            sink: Box::new(StderrSink),
            last_fault: Mutex::new(None),
        }
    }
}

impl Reporter {
    /// Reporter writing to stderr. Fails if a `hide_frames` pattern is invalid.
    pub fn new(config: ReporterConfig) -> Result<Self, ConfigError> {
        let filter = FrameFilter::new(config.diagnostics.hide_frames.as_slice())?;
        Ok(Self {
            config,
            filter,
            sink: Box::new(StderrSink),
            last_fault: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Process-wide reporter built from [`ReporterConfig::load`] on first use.
    pub fn shared() -> &'static Reporter {
        static SHARED: OnceLock<Reporter> = OnceLock::new();
        SHARED.get_or_init(|| {
            Reporter::new(ReporterConfig::load()).unwrap_or_else(|e| {
                tracing::warn!("Falling back to default sleuth reporter: {e}");
                Reporter::default()
            })
        })
    }

    #[must_use]
    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    pub fn emit(&self, diagnostic: &Diagnostic) {
        self.sink.emit(&diagnostic.render());
    }

    pub fn report_thrown(&self, signal: &ThrownSignal) {
        self.emit(&Diagnostic::thrown(
            signal,
            &self.filter,
            self.config.diagnostics.trace,
        ));
    }

    pub fn report_scope_violation(&self, signal: &ThrownSignal, catching: Scope) {
        tracing::warn!(
            origin = ?signal.origin().map(Scope::path),
            scope = %catching,
            error = %signal.error(),
            location = %signal.location(),
            "Thrown error escaped its scope"
        );
        self.emit(&Diagnostic::scope_violation(
            signal,
            catching,
            &self.filter,
            self.config.diagnostics.trace,
        ));
    }

    /// Prints `fault` unless it is the fault reported last.
    ///
    /// Returns whether anything was printed. Deduplication is by [`FaultId`]
    /// and best-effort: it exists so a fault crossing several nested
    /// boundaries prints once.
    pub fn report_fault(&self, fault: &Fault) -> bool {
        let id = fault.id();
        {
            let mut last = self
                .last_fault
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if *last == Some(id) {
                tracing::trace!(panic = %fault.message(), "Fault already reported");
                return false;
            }
            *last = Some(id);
        }

        tracing::error!(panic = %fault.message(), "Unexpected panic intercepted");
        let trace = self.config.diagnostics.capture.capture();
        self.emit(&Diagnostic::fault(
            fault,
            &trace,
            &self.filter,
            self.config.diagnostics.trace,
        ));
        true
    }
}
