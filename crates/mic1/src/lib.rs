//! MIC-1 control unit.
//!
//! A [`Sequencer`] fetches 32-bit microinstructions from program memory and
//! executes each one over four subcycles: fetch, route, compute and commit.
//! The datapath is a sixteen-register bank with three internal buses, a
//! two-input ALU with Z/N flags, a shifter and a MAR/MBR pair that reaches
//! backing memory through a two-cycle handshake.
//!
//! ```
//! use mic1::{AluOp, MicroFields, Sequencer};
//!
//! let add = MicroFields {
//!     alu: AluOp::Add.bits(),
//!     enc: true,
//!     a: 10,
//!     b: 11,
//!     c: 12,
//!     ..Default::default()
//! };
//! let mut seq = Sequencer::default();
//! seq.load_program(&[add.pack().unwrap()]);
//! seq.set_register("A", 12).unwrap();
//! seq.set_register("B", 1).unwrap();
//! seq.run_full_cycle().unwrap();
//! assert_eq!(seq.register("C").unwrap(), 13);
//! ```

pub mod alu;
pub mod bank;
pub mod config;
pub mod error;
pub mod memory;
pub mod mir;
pub mod register;
pub mod sequencer;
pub mod shifter;

pub use alu::{Alu, AluFlags, AluOp};
pub use bank::{BusSlot, RegisterBank, NUM_REGS, REGISTER_NAMES};
pub use config::SequencerConfig;
pub use error::{MicError, Result};
pub use memory::{MemOp, Memory, MemoryAccess, MemoryPort};
pub use mir::{Field, MicroFields, MicroInstruction};
pub use register::Register;
pub use sequencer::{Branch, CycleReport, Sequencer, Subcycle};
pub use shifter::{ShiftOp, Shifter};

pub use mic1_common::{
    Diagnostic, DiagnosticSink, ErrorKind, EventKind, LogSink, RecordingSink, Severity,
};
