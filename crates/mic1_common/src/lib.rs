//! Diagnostic event model shared between the MIC-1 core and whatever embeds
//! it (a frontend, a test harness, a tracer).
//!
//! The core never prints or blocks on its own: every notable event is handed
//! to a [`DiagnosticSink`] that the embedder supplied at construction time.

pub mod sink;

use std::fmt;

pub use sink::{DiagnosticSink, LogSink, RecordingSink};

/// How loud a diagnostic is. Ordered from least to most severe so sinks can
/// filter with a simple comparison.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Severity {
    #[default]
    Trace,
    Debug,
    Info,
    Warning,
    /// A rejected operation; the cycle keeps running.
    Error,
    /// The current cycle was aborted.
    Fatal,
}

impl Severity {
    /// Level used when forwarding to the `log` facade.
    pub const fn level(self) -> log::Level {
        match self {
            Severity::Trace => log::Level::Trace,
            Severity::Debug => log::Level::Debug,
            Severity::Info => log::Level::Info,
            Severity::Warning => log::Level::Warn,
            Severity::Error | Severity::Fatal => log::Level::Error,
        }
    }
}

/// Every error the core can report.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Overflow,
    ImmutableWrite,
    InputOverflow,
    UndefinedShiftOp,
    UnknownRegisterName,
    NotInBank,
    ConflictingMemoryOp,
    ProgramCounterOutOfRange,
    AddressOutOfRange,
    SubcycleOutOfOrder,
}

impl ErrorKind {
    pub const fn as_str(&self) -> &'static str {
        match *self {
            ErrorKind::Overflow => "register write overflow",
            ErrorKind::ImmutableWrite => "write to immutable register",
            ErrorKind::InputOverflow => "unit input overflow",
            ErrorKind::UndefinedShiftOp => "undefined shifter operation",
            ErrorKind::UnknownRegisterName => "unknown register name",
            ErrorKind::NotInBank => "register not in bank",
            ErrorKind::ConflictingMemoryOp => "read and write in the same cycle",
            ErrorKind::ProgramCounterOutOfRange => "microprogram counter out of range",
            ErrorKind::AddressOutOfRange => "memory address out of range",
            ErrorKind::SubcycleOutOfOrder => "subcycle out of order",
        }
    }

    /// Fatal kinds abort the rest of the cycle that raised them.
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            ErrorKind::ConflictingMemoryOp
                | ErrorKind::ProgramCounterOutOfRange
                | ErrorKind::AddressOutOfRange
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a diagnostic is about.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Progress through the fetch/route/compute/commit sequence.
    Subcycle,
    /// A memory read or write committed through MAR/MBR.
    MemoryAccess,
    /// Microprogram counter update.
    Branch,
    /// State dump requested by the embedder.
    State,
    Error(ErrorKind),
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Subcycle => f.write_str("subcycle"),
            EventKind::MemoryAccess => f.write_str("memory"),
            EventKind::Branch => f.write_str("branch"),
            EventKind::State => f.write_str("state"),
            EventKind::Error(kind) => write!(f, "error: {}", kind),
        }
    }
}

/// A single structured event emitted by the core.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: EventKind,
    pub message: String,
    pub severity: Severity,
}

impl Diagnostic {
    pub fn new(kind: EventKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            severity,
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self.kind, EventKind::Error(_))
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}: {}", self.severity, self.kind, self.message)
    }
}
