//! Printed diagnostics with real backtraces.

use std::fs;
use std::panic::resume_unwind;

use sleuth_core::{CaptureMode, MemorySink, ReporterConfig, ThrownError, TraceMode, throw};

use crate::common::{escaping_payload, frame_symbols, reporter_with, tracing_reporter};

#[inline(never)]
fn load_inventory() {
    throw(ThrownError::msg("inventory file truncated"));
}

#[test]
fn yell_prints_header_locator_and_application_frames() {
    let sink = MemorySink::new();
    let err = tracing_reporter(&sink).yell(load_inventory).unwrap_err();
    assert_eq!(err.to_string(), "inventory file truncated");

    let printed = sink.contents();
    let mut lines = printed.lines();
    assert_eq!(
        lines.next(),
        Some("intercepted thrown error: inventory file truncated")
    );
    assert_eq!(lines.next(), Some(""));
    let locator = lines.next().unwrap();
    assert!(locator.starts_with("thrown at "), "{locator}");
    assert!(locator.contains("diagnostics.rs"), "{locator}");

    let symbols = frame_symbols(&printed);
    assert!(
        symbols
            .iter()
            .any(|s| s.contains("diagnostics::load_inventory")),
        "{printed}"
    );
    for symbol in &symbols {
        assert!(!symbol.starts_with("sleuth_core::"), "{symbol}");
        assert!(!symbol.starts_with("sleuth_types::"), "{symbol}");
        assert!(!symbol.starts_with("std::panicking::"), "{symbol}");
        assert!(!symbol.starts_with("std::backtrace"), "{symbol}");
    }
}

#[test]
fn configured_patterns_hide_frames() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
[diagnostics]
trace = "filtered"
capture = "always"
hide_frames = ["load_inventory"]
"#,
    )
    .unwrap();
    let config = ReporterConfig::load_from(&path).unwrap();

    let sink = MemorySink::new();
    let _ = reporter_with(&sink, config).yell(load_inventory);
    let printed = sink.contents();
    assert!(
        frame_symbols(&printed)
            .iter()
            .all(|s| !s.contains("load_inventory")),
        "{printed}"
    );
}

#[test]
fn trace_off_prints_three_lines() {
    let sink = MemorySink::new();
    let config = ReporterConfig::default().with_trace(TraceMode::Off);
    let _ = reporter_with(&sink, config).yell(load_inventory);
    assert_eq!(sink.contents().lines().count(), 3);
}

#[test]
fn fault_diagnostic_names_panic_message() {
    let sink = MemorySink::new();
    let reporter = tracing_reporter(&sink);
    let _ = escaping_payload(|| {
        let _ = reporter.r#try(|| resume_unwind(Box::new("checksum mismatch")));
    });
    let printed = sink.contents();
    assert!(
        printed.starts_with("intercepted unexpected panic: checksum mismatch\n\nthread '"),
        "{printed}"
    );
}

#[test]
fn boundary_capture_mode_governs_throws_below_it() {
    let sink = MemorySink::new();
    let config = ReporterConfig::default()
        .with_trace(TraceMode::Filtered)
        .with_capture(CaptureMode::Never);
    let err = reporter_with(&sink, config).yell(load_inventory).unwrap_err();
    assert_eq!(err.to_string(), "inventory file truncated");
    assert_eq!(sink.contents().lines().count(), 3, "{}", sink.contents());
}

#[test]
fn panic_fault_locator_names_panic_site() {
    let sink = MemorySink::new();
    let reporter = tracing_reporter(&sink);
    let _ = escaping_payload(|| {
        let _: Result<(), _> = reporter.r#try(|| panic!("ledger overflow"));
    });
    let line = line!() - 2;
    let printed = sink.contents();
    let locator = printed.lines().nth(2).unwrap();
    assert!(
        locator.starts_with(&format!("panicked at {}:{line}:", file!())),
        "{locator}"
    );
    assert!(locator.contains(" on thread '"), "{locator}");
}
