use crate::error::{MicError, Result};
use crate::register::{clamp_width, Register};

/// Number of registers addressable by the 4-bit A/B/C fields.
pub const NUM_REGS: usize = 16;

/// Register names in index order.
pub const REGISTER_NAMES: [&str; NUM_REGS] = [
    "PC", "AC", "SP", "IR", "TIR", "0", "+1", "-1", "AMASK", "SMASK", "A", "B", "C", "D", "E",
    "F",
];

pub const PC: usize = 0;
pub const AC: usize = 1;
pub const SP: usize = 2;
pub const IR: usize = 3;
pub const TIR: usize = 4;
pub const ZERO: usize = 5;
pub const PLUS_ONE: usize = 6;
pub const MINUS_ONE: usize = 7;
pub const AMASK: usize = 8;
pub const SMASK: usize = 9;

/// The three internal buses. A and B feed the ALU, C carries the
/// shifter output back into the bank.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BusSlot {
    A,
    B,
    C,
}

/// Sixteen registers plus the per-cycle bus routing.
///
/// Buses hold indices into the bank rather than references, so routing is
/// plain data and can never outlive the registers it points at.
#[derive(Clone, Debug)]
pub struct RegisterBank {
    regs: [Register; NUM_REGS],
    buses: [Option<usize>; 3],
}

impl RegisterBank {
    pub fn new(width_bytes: u8) -> Self {
        let width_bytes = clamp_width(width_bytes);
        let regs = std::array::from_fn(|i| match i {
            ZERO => Register::constant(width_bytes, 0),
            PLUS_ONE => Register::constant(width_bytes, 1),
            // -1 truncated to the register width.
            MINUS_ONE => Register::constant(width_bytes, u32::MAX),
            AMASK => Register::constant(width_bytes, 0x0FFF),
            SMASK => Register::constant(width_bytes, 0x00FF),
            _ => Register::new(width_bytes),
        });
        Self {
            regs,
            buses: [None; 3],
        }
    }

    pub fn register_at(&self, index: usize) -> Result<&Register> {
        self.regs.get(index).ok_or(MicError::NotInBank(index))
    }

    pub fn register_at_mut(&mut self, index: usize) -> Result<&mut Register> {
        self.regs.get_mut(index).ok_or(MicError::NotInBank(index))
    }

    pub fn index_of(&self, name: &str) -> Result<usize> {
        REGISTER_NAMES
            .iter()
            .position(|n| *n == name)
            .ok_or_else(|| MicError::UnknownRegisterName(name.to_string()))
    }

    pub fn register_by_name(&self, name: &str) -> Result<&Register> {
        let index = self.index_of(name)?;
        Ok(&self.regs[index])
    }

    pub fn register_by_name_mut(&mut self, name: &str) -> Result<&mut Register> {
        let index = self.index_of(name)?;
        Ok(&mut self.regs[index])
    }

    /// Route `slot` to register `index` for the rest of the cycle.
    pub fn assign_bus(&mut self, slot: BusSlot, index: usize) -> Result<()> {
        if index >= NUM_REGS {
            return Err(MicError::NotInBank(index));
        }
        self.buses[slot as usize] = Some(index);
        Ok(())
    }

    #[inline]
    pub fn bus(&self, slot: BusSlot) -> Option<usize> {
        self.buses[slot as usize]
    }

    pub fn bus_register(&self, slot: BusSlot) -> Option<&Register> {
        self.bus(slot).map(|i| &self.regs[i])
    }

    pub fn bus_register_mut(&mut self, slot: BusSlot) -> Option<&mut Register> {
        let index = self.bus(slot)?;
        Some(&mut self.regs[index])
    }

    /// Value currently driven on `slot`; an unrouted bus reads as zero.
    #[inline]
    pub fn bus_value(&self, slot: BusSlot) -> u32 {
        self.bus_register(slot).map_or(0, Register::read)
    }

    /// Drop all routing. Called at the start of every cycle.
    pub fn reset_buses(&mut self) {
        self.buses = [None; 3];
    }

    /// `(name, register)` pairs in index order.
    pub fn named(&self) -> impl Iterator<Item = (&'static str, &Register)> {
        REGISTER_NAMES.iter().copied().zip(self.regs.iter())
    }

    pub fn registers(&self) -> &[Register; NUM_REGS] {
        &self.regs
    }
}
