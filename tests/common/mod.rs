//! Shared test utilities and fixtures

#![allow(dead_code)]

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use sleuth_core::{CaptureMode, MemorySink, Reporter, ReporterConfig, TraceMode};

/// Reporter that prints into `sink` with no frames.
pub fn quiet_reporter(sink: &MemorySink) -> Reporter {
    reporter_with(
        sink,
        ReporterConfig::default()
            .with_trace(TraceMode::Off)
            .with_capture(CaptureMode::Never),
    )
}

/// Reporter that prints filtered traces into `sink`.
pub fn tracing_reporter(sink: &MemorySink) -> Reporter {
    reporter_with(
        sink,
        ReporterConfig::default()
            .with_trace(TraceMode::Filtered)
            .with_capture(CaptureMode::Always),
    )
}

pub fn reporter_with(sink: &MemorySink, config: ReporterConfig) -> Reporter {
    Reporter::new(config)
        .expect("test config is valid")
        .with_sink(sink.clone())
}

/// Runs `work`, which must unwind, and returns the escaping payload.
pub fn escaping_payload(work: impl FnOnce()) -> Box<dyn Any + Send> {
    catch_unwind(AssertUnwindSafe(work)).expect_err("work should unwind past every boundary")
}

/// Symbol lines of a rendered diagnostic (everything after the locator).
pub fn frame_symbols(rendered: &str) -> Vec<&str> {
    rendered
        .lines()
        .skip(3)
        .filter(|line| !line.starts_with("    at "))
        .collect()
}
