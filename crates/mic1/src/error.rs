use mic1_common::{ErrorKind, Severity};
use thiserror::Error;

use crate::sequencer::Subcycle;

pub type Result<T> = std::result::Result<T, MicError>;

/// Errors raised by the control unit.
///
/// Every variant maps onto one [`ErrorKind`]. Rejected operations leave the
/// target untouched, so retrying with the same state reproduces the same
/// error.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MicError {
    #[error("value 0x{value:X} does not fit in a {width_bytes}-byte register")]
    Overflow { value: u32, width_bytes: u8 },
    #[error("value 0x{value:X} does not fit the {field} field (max 0x{max:X})")]
    FieldOverflow {
        field: &'static str,
        value: u32,
        max: u32,
    },
    #[error("register is immutable")]
    ImmutableWrite,
    #[error("{unit} input 0x{value:X} exceeds mask 0x{mask:X}")]
    InputOverflow {
        unit: &'static str,
        value: u32,
        mask: u32,
    },
    #[error("shifter operation 0b11 is not defined")]
    UndefinedShiftOp,
    #[error("unknown register name {0:?}")]
    UnknownRegisterName(String),
    #[error("register index {0} is not in the bank")]
    NotInBank(usize),
    #[error("RD and WR asserted in the same cycle")]
    ConflictingMemoryOp,
    #[error("microprogram counter {mpc} is outside a {len}-word program")]
    ProgramCounterOutOfRange { mpc: usize, len: usize },
    #[error("memory address 0x{address:X} is outside {len} words of memory")]
    AddressOutOfRange { address: u32, len: usize },
    #[error("requested {requested:?} but the next subcycle is {expected:?}")]
    SubcycleOutOfOrder {
        expected: Subcycle,
        requested: Subcycle,
    },
}

impl MicError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MicError::Overflow { .. } | MicError::FieldOverflow { .. } => ErrorKind::Overflow,
            MicError::ImmutableWrite => ErrorKind::ImmutableWrite,
            MicError::InputOverflow { .. } => ErrorKind::InputOverflow,
            MicError::UndefinedShiftOp => ErrorKind::UndefinedShiftOp,
            MicError::UnknownRegisterName(_) => ErrorKind::UnknownRegisterName,
            MicError::NotInBank(_) => ErrorKind::NotInBank,
            MicError::ConflictingMemoryOp => ErrorKind::ConflictingMemoryOp,
            MicError::ProgramCounterOutOfRange { .. } => ErrorKind::ProgramCounterOutOfRange,
            MicError::AddressOutOfRange { .. } => ErrorKind::AddressOutOfRange,
            MicError::SubcycleOutOfOrder { .. } => ErrorKind::SubcycleOutOfOrder,
        }
    }

    #[inline]
    pub fn is_fatal(&self) -> bool {
        self.kind().is_fatal()
    }

    pub fn severity(&self) -> Severity {
        if self.is_fatal() {
            Severity::Fatal
        } else {
            Severity::Error
        }
    }
}
