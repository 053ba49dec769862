//! The sequencer owns every piece of the datapath and drives it through the
//! four subcycles of a microcycle:
//!
//! 1. fetch the word at MPC into the MIR,
//! 2. route registers onto the buses and into the ALU,
//! 3. compute through the ALU and shifter,
//! 4. commit memory, register writeback and the next MPC.
//!
//! Callers drive it with [`Sequencer::run_full_cycle`] or one subcycle at a
//! time with [`Sequencer::run_subcycle`] / [`Sequencer::step_subcycle`].

mod branch;
mod subcycle;

use mic1_common::{Diagnostic, DiagnosticSink, EventKind, LogSink, Severity};

use crate::alu::Alu;
use crate::bank::RegisterBank;
use crate::config::SequencerConfig;
use crate::error::{MicError, Result};
use crate::memory::{Memory, MemoryAccess, MemoryPort};
use crate::mir::{MicroInstruction, INSTRUCTION_BYTES};
use crate::register::Register;
use crate::shifter::Shifter;

pub use branch::{resolve_branch, Branch};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Subcycle {
    #[default]
    Fetch,
    Route,
    Compute,
    Commit,
}

impl Subcycle {
    /// 1-based position within the cycle.
    pub const fn number(self) -> u8 {
        match self {
            Subcycle::Fetch => 1,
            Subcycle::Route => 2,
            Subcycle::Compute => 3,
            Subcycle::Commit => 4,
        }
    }

    pub const fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Subcycle::Fetch),
            2 => Some(Subcycle::Route),
            3 => Some(Subcycle::Compute),
            4 => Some(Subcycle::Commit),
            _ => None,
        }
    }

    pub const fn next(self) -> Self {
        match self {
            Subcycle::Fetch => Subcycle::Route,
            Subcycle::Route => Subcycle::Compute,
            Subcycle::Compute => Subcycle::Commit,
            Subcycle::Commit => Subcycle::Fetch,
        }
    }
}

/// Outcome of one completed microcycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CycleReport {
    /// 1-based index of the cycle that just finished.
    pub cycle: u64,
    pub mpc_before: usize,
    pub mpc_after: usize,
    pub branch: Branch,
    pub memory: Option<MemoryAccess>,
    /// Non-fatal errors raised during the cycle, in order.
    pub errors: Vec<MicError>,
}

/// Bookkeeping for the cycle in flight.
#[derive(Clone, Debug, Default)]
struct CycleState {
    mpc_before: usize,
    branch: Branch,
    memory: Option<MemoryAccess>,
    errors: Vec<MicError>,
}

pub(crate) fn emit<D: DiagnosticSink>(
    sink: &mut D,
    kind: EventKind,
    severity: Severity,
    message: impl FnOnce() -> String,
) {
    if sink.enabled(severity) {
        sink.emit(Diagnostic::new(kind, severity, message()));
    }
}

/// MIC-1 control unit.
pub struct Sequencer<D: DiagnosticSink = LogSink> {
    config: SequencerConfig,
    /// Microprogram counter.
    mpc: usize,
    program: Vec<u32>,
    mir: Register,
    alu: Alu,
    shifter: Shifter,
    bank: RegisterBank,
    port: MemoryPort,
    memory: Memory,
    next: Subcycle,
    cycles: u64,
    current: CycleState,
    sink: D,
}

impl Sequencer<LogSink> {
    /// Sequencer reporting through the `log` facade.
    pub fn new(config: SequencerConfig) -> Self {
        let sink = LogSink::new(config.min_severity);
        Self::with_sink(config, sink)
    }
}

impl Default for Sequencer<LogSink> {
    fn default() -> Self {
        Self::new(SequencerConfig::default())
    }
}

impl<D: DiagnosticSink> Sequencer<D> {
    pub fn with_sink(config: SequencerConfig, sink: D) -> Self {
        let width = config.datapath_bytes();
        Self {
            mpc: 0,
            program: Vec::new(),
            mir: Register::new(INSTRUCTION_BYTES),
            alu: Alu::new(width),
            shifter: Shifter::new(width),
            bank: RegisterBank::new(width),
            port: MemoryPort::new(width),
            memory: Memory::new(config.memory_words, width),
            next: Subcycle::Fetch,
            cycles: 0,
            current: CycleState::default(),
            sink,
            config,
        }
    }

    /// Return every unit to power-on state. Program memory is kept.
    pub fn reset(&mut self) {
        let width = self.config.datapath_bytes();
        self.mpc = 0;
        self.mir = Register::new(INSTRUCTION_BYTES);
        self.alu = Alu::new(width);
        self.shifter = Shifter::new(width);
        self.bank = RegisterBank::new(width);
        self.port = MemoryPort::new(width);
        self.memory = Memory::new(self.config.memory_words, width);
        self.next = Subcycle::Fetch;
        self.cycles = 0;
        self.current = CycleState::default();
    }

    /// Replace program memory and restart at address 0.
    pub fn load_program(&mut self, words: &[u32]) {
        self.program = words.to_vec();
        self.mpc = 0;
        self.next = Subcycle::Fetch;
        self.current = CycleState::default();
    }

    pub fn program(&self) -> &[u32] {
        &self.program
    }

    /// Seed a register by name, with the same checks as a runtime write.
    pub fn set_register(&mut self, name: &str, value: u32) -> Result<()> {
        self.bank.register_by_name_mut(name)?.write(value)
    }

    pub fn register(&self, name: &str) -> Result<u32> {
        self.bank.register_by_name(name).map(Register::read)
    }

    pub fn seed_memory(&mut self, address: u32, value: u32) -> Result<()> {
        self.memory.write(address, value)
    }

    /// Run the given subcycle, which must be the next one due.
    ///
    /// Returns the cycle report once the commit subcycle finishes. A fatal
    /// error abandons the rest of the cycle and leaves the sequencer ready
    /// to fetch again.
    pub fn run_subcycle(&mut self, subcycle: Subcycle) -> Result<Option<CycleReport>> {
        if subcycle != self.next {
            let err = MicError::SubcycleOutOfOrder {
                expected: self.next,
                requested: subcycle,
            };
            emit(
                &mut self.sink,
                EventKind::Error(err.kind()),
                err.severity(),
                || err.to_string(),
            );
            return Err(err);
        }

        let number = subcycle.number();
        let mpc = self.mpc;
        emit(&mut self.sink, EventKind::Subcycle, Severity::Trace, || {
            format!("subcycle {} ({:?}) at MPC {}", number, subcycle, mpc)
        });

        let result = match subcycle {
            Subcycle::Fetch => self.fetch(),
            Subcycle::Route => self.route(),
            Subcycle::Compute => self.compute(),
            Subcycle::Commit => self.commit(),
        };

        match result {
            Ok(()) => {}
            Err(err) => {
                emit(
                    &mut self.sink,
                    EventKind::Error(err.kind()),
                    Severity::Fatal,
                    || format!("cycle aborted at MPC {}: {}", mpc, err),
                );
                self.next = Subcycle::Fetch;
                self.current = CycleState::default();
                return Err(err);
            }
        }

        self.next = subcycle.next();
        if subcycle != Subcycle::Commit {
            return Ok(None);
        }

        self.cycles += 1;
        let current = std::mem::take(&mut self.current);
        let report = CycleReport {
            cycle: self.cycles,
            mpc_before: current.mpc_before,
            mpc_after: self.mpc,
            branch: current.branch,
            memory: current.memory,
            errors: current.errors,
        };
        Ok(Some(report))
    }

    /// Run whichever subcycle is due next.
    pub fn step_subcycle(&mut self) -> Result<Option<CycleReport>> {
        self.run_subcycle(self.next)
    }

    /// Run the rest of the current cycle (all four subcycles when called on
    /// a cycle boundary).
    pub fn run_full_cycle(&mut self) -> Result<CycleReport> {
        loop {
            if let Some(report) = self.step_subcycle()? {
                return Ok(report);
            }
        }
    }

    /// Run `count` full cycles, stopping at the first fatal error.
    pub fn run_cycles(&mut self, count: usize) -> Result<Vec<CycleReport>> {
        (0..count).map(|_| self.run_full_cycle()).collect()
    }

    /// Record a rejected operation and keep going.
    fn record(&mut self, err: MicError) {
        let mpc = self.current.mpc_before;
        emit(
            &mut self.sink,
            EventKind::Error(err.kind()),
            err.severity(),
            || format!("MPC {}: {}", mpc, err),
        );
        self.current.errors.push(err);
    }

    #[inline]
    fn note(&mut self, result: Result<()>) {
        if let Err(err) = result {
            self.record(err);
        }
    }

    /// Dump the whole machine state to the sink at debug severity.
    pub fn log_state(&mut self) {
        if !self.sink.enabled(Severity::Debug) {
            return;
        }
        let mut lines = vec![
            format!("subcycle: {:?}, MPC: {}, cycles: {}", self.next, self.mpc, self.cycles),
            format!("MIR: {}", self.mir()),
            format!(
                "ALU: op={:?} a=0x{:04X} b=0x{:04X} out=0x{:04X} Z={} N={}",
                self.alu.op(),
                self.alu.input_a(),
                self.alu.input_b(),
                self.alu.output(),
                self.alu.zero() as u8,
                self.alu.negative() as u8
            ),
            format!(
                "shifter: op={:?} in=0x{:04X} out=0x{:04X}",
                self.shifter.op(),
                self.shifter.input(),
                self.shifter.output()
            ),
            format!(
                "MAR=0x{:04X} MBR=0x{:04X} {:?}",
                self.port.mar().read(),
                self.port.mbr().read(),
                self.port.handshake()
            ),
        ];
        lines.extend(
            self.bank
                .named()
                .map(|(name, reg)| format!("{}:\t0x{:04X}", name, reg.read())),
        );
        for line in lines {
            self.sink
                .emit(Diagnostic::new(EventKind::State, Severity::Debug, line));
        }
    }

    #[inline]
    pub fn mpc(&self) -> usize {
        self.mpc
    }

    pub fn set_mpc(&mut self, mpc: usize) {
        self.mpc = mpc;
    }

    /// Decoded view of the word currently in the MIR.
    #[inline]
    pub fn mir(&self) -> MicroInstruction {
        MicroInstruction::new(self.mir.read())
    }

    pub fn mir_register(&self) -> &Register {
        &self.mir
    }

    pub fn alu(&self) -> &Alu {
        &self.alu
    }

    pub fn shifter(&self) -> &Shifter {
        &self.shifter
    }

    pub fn bank(&self) -> &RegisterBank {
        &self.bank
    }

    pub fn bank_mut(&mut self) -> &mut RegisterBank {
        &mut self.bank
    }

    pub fn port(&self) -> &MemoryPort {
        &self.port
    }

    pub fn port_mut(&mut self) -> &mut MemoryPort {
        &mut self.port
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.memory
    }

    #[inline]
    pub fn next_subcycle(&self) -> Subcycle {
        self.next
    }

    /// Number of completed cycles.
    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn config(&self) -> &SequencerConfig {
        &self.config
    }

    pub fn diagnostics(&self) -> &D {
        &self.sink
    }

    pub fn diagnostics_mut(&mut self) -> &mut D {
        &mut self.sink
    }
}
