use mic1_common::{DiagnosticSink, EventKind, Severity};

use super::{emit, resolve_branch, Branch, CycleState, Sequencer};
use crate::bank::BusSlot;
use crate::error::{MicError, Result};
use crate::memory::{MemOp, MemoryIntent};

impl<D: DiagnosticSink> Sequencer<D> {
    /// Subcycle 1: load the MIR from program memory.
    pub(super) fn fetch(&mut self) -> Result<()> {
        // Bus routing never carries over from the previous cycle.
        self.bank.reset_buses();
        self.current = CycleState {
            mpc_before: self.mpc,
            ..CycleState::default()
        };

        let word = *self
            .program
            .get(self.mpc)
            .ok_or(MicError::ProgramCounterOutOfRange {
                mpc: self.mpc,
                len: self.program.len(),
            })?;
        self.mir.write(word)?;

        emit(&mut self.sink, EventKind::Subcycle, Severity::Trace, || {
            format!("fetched 0x{:08X}", word)
        });
        Ok(())
    }

    /// Subcycle 2: decode the MIR, route the buses and latch the ALU inputs.
    pub(super) fn route(&mut self) -> Result<()> {
        let mi = self.mir();

        self.alu.set_op(mi.alu_op());
        self.shifter.set_op(mi.shift_op());

        for (slot, index) in [(BusSlot::C, mi.c()), (BusSlot::B, mi.b()), (BusSlot::A, mi.a())] {
            let result = self.bank.assign_bus(slot, index);
            self.note(result);
        }

        let intent = MemoryIntent {
            rd: mi.rd(),
            wr: mi.wr(),
            load_mbr: mi.mbr(),
            load_mar: mi.mar(),
        };
        self.port.latch(intent);

        // AMUX picks MBR over bus A.
        let a = if mi.amux() {
            self.port.mbr().read()
        } else {
            self.bank.bus_value(BusSlot::A)
        };
        let result = self.alu.set_input_a(a);
        self.note(result);

        let b = self.bank.bus_value(BusSlot::B);
        let result = self.alu.set_input_b(b);
        self.note(result);

        if intent.load_mar {
            let result = self.port.mar_mut().write(b);
            self.note(result);
        }
        Ok(())
    }

    /// Subcycle 3: ALU then shifter.
    pub(super) fn compute(&mut self) -> Result<()> {
        let out = self.alu.compute();
        let result = self.shifter.set_input(out);
        self.note(result);
        let result = self.shifter.compute().map(|_| ());
        self.note(result);
        Ok(())
    }

    /// Subcycle 4: memory handshake, writeback and MPC update.
    ///
    /// RD and WR together abort before the handshake is aged, so a request
    /// pending from the previous cycle is still pending afterwards.
    pub(super) fn commit(&mut self) -> Result<()> {
        let mi = self.mir();
        let intent = self.port.intent();

        // Nothing else in the commit runs when RD and WR clash.
        if intent.rd && intent.wr {
            return Err(MicError::ConflictingMemoryOp);
        }

        match self.port.cycle(&mut self.memory, intent.rd, intent.wr) {
            Ok(Some(access)) => {
                emit(
                    &mut self.sink,
                    EventKind::MemoryAccess,
                    Severity::Debug,
                    || match access.op {
                        MemOp::Read => format!(
                            "read 0x{:04X} from 0x{:04X}",
                            access.value, access.address
                        ),
                        _ => format!("wrote 0x{:04X} to 0x{:04X}", access.value, access.address),
                    },
                );
                self.current.memory = Some(access);
            }
            Ok(None) => {}
            Err(err) if err.is_fatal() => return Err(err),
            Err(err) => self.record(err),
        }

        let out = self.shifter.output();
        if intent.load_mbr {
            let result = self.port.mbr_mut().write(out);
            self.note(result);
        }
        if mi.enc() {
            if let Some(reg) = self.bank.bus_register_mut(BusSlot::C) {
                let result = reg.write(out);
                self.note(result);
            }
        }

        let branch = resolve_branch(mi.cond(), mi.addr(), self.alu.flags());
        let from = self.mpc;
        match branch {
            Branch::Increment => self.mpc += 1,
            Branch::Jump(addr) => self.mpc = addr as usize,
            Branch::Stall => {}
        }
        let to = self.mpc;
        if branch != Branch::Increment {
            emit(&mut self.sink, EventKind::Branch, Severity::Debug, || {
                format!("{:?}: MPC {} -> {}", branch, from, to)
            });
        }
        self.current.branch = branch;
        Ok(())
    }
}
