//! Per-thread bookkeeping shared by boundaries and throws.
//!
//! - The panic generation: a process-unique number, advanced whenever a
//!   boundary is entered and whenever the panic hook sees a real panic. A
//!   fault re-raised through nested boundaries crosses no entry and no hook,
//!   so every boundary observes it in the same generation.
//! - Where the last real panic on this thread happened, as seen by the hook.
//! - The capture mode of the innermost boundary, used by throws below it.

use std::cell::{Cell, RefCell};
use std::panic::{self, PanicHookInfo};
use std::sync::Once;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use sleuth_types::{CaptureMode, Fault};

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);
static HOOK: Once = Once::new();

thread_local! {
    static GENERATION: Cell<u64> = const { Cell::new(0) };
    static LAST_PANIC: RefCell<Option<(u64, String)>> = const { RefCell::new(None) };
    static CAPTURE: Cell<Option<CaptureMode>> = const { Cell::new(None) };
}

/// Marks entry into a boundary. Restores the enclosing capture mode on drop.
#[must_use]
pub(crate) struct Entered {
    previous: Option<CaptureMode>,
}

impl Drop for Entered {
    fn drop(&mut self) {
        let _ = CAPTURE.try_with(|cell| cell.set(self.previous));
    }
}

pub(crate) fn enter(capture: CaptureMode) -> Entered {
    install_panic_hook();
    advance();
    let previous = CAPTURE.with(|cell| cell.replace(Some(capture)));
    Entered { previous }
}

/// Capture mode of the innermost boundary on this thread, if any.
pub(crate) fn capture_mode() -> Option<CaptureMode> {
    CAPTURE.try_with(Cell::get).ok().flatten()
}

/// Stamps `fault` with the current generation and, if the hook saw it
/// panic, its location.
pub(crate) fn observe(fault: Fault) -> Fault {
    let generation = GENERATION.with(Cell::get);
    let location = LAST_PANIC.with(|last| match &*last.borrow() {
        Some((seen, location)) if *seen == generation => Some(location.clone()),
        _ => None,
    });
    fault.observed(generation, location)
}

fn advance() {
    let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
    GENERATION.with(|cell| cell.set(generation));
}

/// Chains a hook in front of whatever hook is installed, once per process.
///
/// The hook cannot be replaced while this thread is panicking; installation
/// is then left to the next boundary entered outside a panic.
fn install_panic_hook() {
    if thread::panicking() {
        return;
    }
    HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            record(info);
            previous(info);
        }));
    });
}

fn record(info: &PanicHookInfo<'_>) {
    let generation = NEXT_GENERATION.fetch_add(1, Ordering::Relaxed);
    // Thread-locals may already be gone if a destructor panics at thread exit.
    if GENERATION.try_with(|cell| cell.set(generation)).is_err() {
        return;
    }
    let Some(location) = info.location() else {
        return;
    };
    let _ = LAST_PANIC.try_with(|last| {
        if let Ok(mut last) = last.try_borrow_mut() {
            *last = Some((generation, location.to_string()));
        }
    });
}
