//! Boundary behavior end to end.

use std::fmt;
use std::panic::resume_unwind;

use sleuth_core::{MemorySink, ThrownError, throw};

use crate::common::{escaping_payload, quiet_reporter};

#[derive(Debug)]
struct QuotaExceeded {
    limit: u32,
}

impl fmt::Display for QuotaExceeded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "quota of {} exceeded", self.limit)
    }
}

impl std::error::Error for QuotaExceeded {}

#[test]
fn try_returns_exactly_the_thrown_error() {
    let sink = MemorySink::new();
    let reporter = quiet_reporter(&sink);
    for text in ["a", "b", ""] {
        let err = ThrownError::msg(text);
        let thrown = err.clone();
        let caught = reporter.r#try(move || throw(thrown)).unwrap_err();
        assert!(caught.same_instance(&err));
    }
    assert!(sink.is_empty());
}

#[test]
fn try_keeps_typed_errors() {
    let sink = MemorySink::new();
    let caught = quiet_reporter(&sink)
        .r#try(|| throw(QuotaExceeded { limit: 10 }))
        .unwrap_err();
    assert_eq!(caught.downcast_ref::<QuotaExceeded>().unwrap().limit, 10);
    assert_eq!(caught.to_string(), "quota of 10 exceeded");
}

#[test]
fn try_without_throw_is_ok() {
    let sink = MemorySink::new();
    assert!(quiet_reporter(&sink).r#try(|| {}).is_ok());
}

#[test]
fn work_after_throw_does_not_run() {
    let sink = MemorySink::new();
    let fail = true;
    let mut reached = false;
    let _ = quiet_reporter(&sink).r#try(|| {
        if fail {
            throw(ThrownError::msg("stop"));
        }
        reached = true;
    });
    assert!(!reached);
}

#[test]
fn yell_matches_try_and_prints_only_for_thrown_errors() {
    let sink = MemorySink::new();
    let reporter = quiet_reporter(&sink);

    let err = ThrownError::msg("rare condition");
    let (a, b) = (err.clone(), err.clone());
    let quiet = reporter.r#try(move || throw(a)).unwrap_err();
    assert!(sink.is_empty());
    let loud = reporter.yell(move || throw(b)).unwrap_err();
    assert!(quiet.same_instance(&loud));
    assert_eq!(sink.len(), 1);

    assert_eq!(reporter.yell(|| 5).unwrap(), 5);
    assert_eq!(sink.len(), 1);
}

#[test]
fn nested_try_is_absorbed_by_inner_boundary() {
    let sink = MemorySink::new();
    let reporter = quiet_reporter(&sink);
    let outer = reporter.r#try(|| reporter.r#try(|| throw(ThrownError::msg("inner"))));
    let inner = outer.expect("outer boundary saw no throw");
    assert_eq!(inner.unwrap_err().to_string(), "inner");
}

#[test]
fn fault_passes_every_boundary_and_prints_once() {
    let sink = MemorySink::new();
    let reporter = quiet_reporter(&sink);
    let payload = escaping_payload(|| {
        let _ = reporter.r#try(|| {
            let _ = reporter.yell(|| {
                let _ = reporter.r#try(|| {
                    resume_unwind(Box::new(String::from("null handle")))
                });
            });
        });
    });
    assert_eq!(payload.downcast_ref::<String>().unwrap(), "null handle");
    assert_eq!(sink.len(), 1);
    assert!(sink.contents().starts_with("intercepted unexpected panic: null handle\n"));
}

#[test]
fn real_panics_are_faults() {
    let sink = MemorySink::new();
    let reporter = quiet_reporter(&sink);
    let payload = escaping_payload(|| {
        let _ = reporter.r#try(|| {
            let items: Vec<u8> = Vec::new();
            let index = items.len() + 3;
            items[index]
        });
    });
    assert!(payload.downcast_ref::<String>().unwrap().contains("index out of bounds"));
    assert_eq!(sink.len(), 1);
}

#[test]
fn separate_faults_each_print() {
    let sink = MemorySink::new();
    let reporter = quiet_reporter(&sink);
    let first = escaping_payload(|| {
        let _ = reporter.r#try(|| resume_unwind(Box::new("first")));
    });
    let second = escaping_payload(|| {
        let _ = reporter.r#try(|| resume_unwind(Box::new("second")));
    });
    assert_eq!(sink.len(), 2);
    drop((first, second));
}

#[test]
fn repeated_panics_each_print() {
    let sink = MemorySink::new();
    let reporter = quiet_reporter(&sink);
    for _ in 0..3 {
        let payload = escaping_payload(|| {
            let _: Result<(), _> = reporter.r#try(|| panic!("boom"));
        });
        drop(payload);
    }
    assert_eq!(sink.len(), 3);
}

#[test]
fn freed_payload_faults_each_print() {
    let sink = MemorySink::new();
    let reporter = quiet_reporter(&sink);
    for _ in 0..3 {
        drop(escaping_payload(|| {
            let _: Result<(), _> =
                reporter.r#try(|| resume_unwind(Box::new(String::from("stale cursor"))));
        }));
    }
    assert_eq!(sink.len(), 3);
}

#[derive(Debug)]
struct Halt;

#[test]
fn zero_sized_faults_each_print() {
    let sink = MemorySink::new();
    let reporter = quiet_reporter(&sink);
    let first = escaping_payload(|| {
        let _: Result<(), _> = reporter.r#try(|| resume_unwind(Box::new(Halt)));
    });
    let second = escaping_payload(|| {
        let _: Result<(), _> = reporter.r#try(|| resume_unwind(Box::new(Halt)));
    });
    assert_eq!(sink.len(), 2);
    assert!(first.is::<Halt>() && second.is::<Halt>());
    drop((first, second));

    drop(escaping_payload(|| {
        let _: Result<(), _> = reporter.yell(|| resume_unwind(Box::new(Halt)));
    }));
    assert_eq!(sink.len(), 3);
}

#[test]
fn nested_zero_sized_fault_prints_once() {
    let sink = MemorySink::new();
    let reporter = quiet_reporter(&sink);
    let payload = escaping_payload(|| {
        let _: Result<(), _> = reporter.r#try(|| {
            let _: Result<(), _> = reporter.yell(|| resume_unwind(Box::new(Halt)));
        });
    });
    assert!(payload.is::<Halt>());
    assert_eq!(sink.len(), 1);
}

#[test]
fn shared_reporter_free_functions() {
    let err = ThrownError::msg("shared");
    let thrown = err.clone();
    let caught = sleuth_core::r#try(move || throw(thrown)).unwrap_err();
    assert!(caught.same_instance(&err));
    assert_eq!(sleuth_core::r#try(|| 1).unwrap(), 1);
}
