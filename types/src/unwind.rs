//! Classification of intercepted unwind payloads.

use std::any::{Any, TypeId};
use std::error::Error;
use std::fmt;
use std::panic::resume_unwind;

use crate::{ThrownError, ThrownSignal};

/// An intercepted unwind, split into our own signals and everything else.
#[derive(Debug)]
pub enum Unwind {
    Thrown(ThrownSignal),
    Fault(Fault),
}

impl Unwind {
    #[must_use]
    pub fn classify(payload: Box<dyn Any + Send>) -> Self {
        match payload.downcast::<ThrownSignal>() {
            Ok(signal) => Self::Thrown(*signal),
            Err(payload) => Self::Fault(Fault::new(payload)),
        }
    }
}

/// Identity of a fault: its payload's address and type, plus the panic
/// generation it was observed in.
///
/// A re-raised fault keeps its box and its generation, so it keeps its id
/// across boundaries. The generation tells apart faults whose payloads share
/// an address: zero-sized payloads, or a freed payload's reused allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaultId {
    addr: usize,
    type_id: TypeId,
    generation: u64,
}

impl FaultId {
    #[must_use]
    pub fn of(payload: &(dyn Any + Send), generation: u64) -> Self {
        let any: &dyn Any = payload;
        Self {
            addr: (any as *const dyn Any).cast::<()>().addr(),
            type_id: any.type_id(),
            generation,
        }
    }
}

/// A payload that was not raised by a throw: a genuine panic.
pub struct Fault {
    payload: Box<dyn Any + Send>,
    generation: u64,
    location: Option<String>,
}

impl Fault {
    #[must_use]
    pub fn new(payload: Box<dyn Any + Send>) -> Self {
        Self {
            payload,
            generation: 0,
            location: None,
        }
    }

    /// Records the panic generation the fault was intercepted in and, when
    /// known, where it panicked.
    #[must_use]
    pub fn observed(mut self, generation: u64, location: Option<String>) -> Self {
        self.generation = generation;
        self.location = location;
        self
    }

    #[must_use]
    pub fn id(&self) -> FaultId {
        FaultId::of(&*self.payload, self.generation)
    }

    /// `file:line:col` of the panic, if a panic hook saw it.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    #[must_use]
    pub fn message(&self) -> String {
        payload_message(&*self.payload)
    }

    /// Continues unwinding with the original, unchanged payload.
    pub fn resume(self) -> ! {
        resume_unwind(self.payload)
    }
}

impl fmt::Debug for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fault")
            .field("message", &self.message())
            .finish_non_exhaustive()
    }
}

/// Best-effort text of a panic payload.
#[must_use]
pub fn payload_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(err) = payload.downcast_ref::<ThrownError>() {
        err.to_string()
    } else if let Some(err) = payload.downcast_ref::<Box<dyn Error + Send + Sync>>() {
        err.to_string()
    } else {
        "Box<dyn Any>".to_string()
    }
}
