//! Backing memory and the MAR/MBR handshake in front of it.
//!
//! Memory has one cycle of latency: a read or write only goes through when
//! the same operation was requested in the previous cycle *and* in the
//! current one. A request that lasts a single cycle never touches memory.

use crate::error::{MicError, Result};
use crate::register::{clamp_width, width_mask, Register};

/// Flat word-addressed memory behind MAR/MBR.
#[derive(Clone, Debug)]
pub struct Memory {
    words: Vec<u32>,
    mask: u32,
}

impl Memory {
    pub fn new(len: usize, width_bytes: u8) -> Self {
        Self {
            words: vec![0; len],
            mask: width_mask(width_bytes),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn out_of_range(&self, address: u32) -> MicError {
        MicError::AddressOutOfRange {
            address,
            len: self.words.len(),
        }
    }

    pub fn read(&self, address: u32) -> Result<u32> {
        self.words
            .get(address as usize)
            .copied()
            .ok_or_else(|| self.out_of_range(address))
    }

    /// Store `value` truncated to the word width.
    pub fn write(&mut self, address: u32, value: u32) -> Result<()> {
        let mask = self.mask;
        match self.words.get_mut(address as usize) {
            Some(word) => {
                *word = value & mask;
                Ok(())
            }
            None => Err(self.out_of_range(address)),
        }
    }

    pub fn words(&self) -> &[u32] {
        &self.words
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum MemOp {
    #[default]
    None,
    Read,
    Write,
}

/// The four handshake fields tracked alongside MBR.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Handshake {
    pub last_cycle_requested: bool,
    pub this_cycle_requested: bool,
    pub last_op: MemOp,
    pub this_op: MemOp,
}

impl Handshake {
    #[inline]
    pub fn is_idle(&self) -> bool {
        *self == Handshake::default()
    }

    /// Both cycles asked for the same operation.
    #[inline]
    fn confirmed(&self) -> bool {
        self.last_cycle_requested && self.this_cycle_requested && self.last_op == self.this_op
    }
}

/// Control bits latched from the microinstruction during decode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct MemoryIntent {
    pub rd: bool,
    pub wr: bool,
    pub load_mbr: bool,
    pub load_mar: bool,
}

/// A memory operation that actually went through.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MemoryAccess {
    pub op: MemOp,
    pub address: u32,
    pub value: u32,
}

/// MAR/MBR pair driving [`Memory`].
#[derive(Clone, Debug)]
pub struct MemoryPort {
    mar: Register,
    mbr: Register,
    handshake: Handshake,
    intent: MemoryIntent,
}

impl MemoryPort {
    pub fn new(width_bytes: u8) -> Self {
        let width_bytes = clamp_width(width_bytes);
        Self {
            mar: Register::new(width_bytes),
            mbr: Register::new(width_bytes),
            handshake: Handshake::default(),
            intent: MemoryIntent::default(),
        }
    }

    #[inline]
    pub fn mar(&self) -> &Register {
        &self.mar
    }

    #[inline]
    pub fn mbr(&self) -> &Register {
        &self.mbr
    }

    #[inline]
    pub fn mar_mut(&mut self) -> &mut Register {
        &mut self.mar
    }

    #[inline]
    pub fn mbr_mut(&mut self) -> &mut Register {
        &mut self.mbr
    }

    #[inline]
    pub fn handshake(&self) -> Handshake {
        self.handshake
    }

    #[inline]
    pub fn intent(&self) -> MemoryIntent {
        self.intent
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        self.handshake.is_idle()
    }

    pub fn latch(&mut self, intent: MemoryIntent) {
        self.intent = intent;
    }

    /// Age the current request into the "last cycle" slot.
    pub fn shift_request(&mut self) {
        let hs = &mut self.handshake;
        hs.last_cycle_requested = hs.this_cycle_requested;
        hs.last_op = hs.this_op;
        hs.this_cycle_requested = false;
        hs.this_op = MemOp::None;
    }

    /// Record this cycle's request from the RD/WR lines.
    pub fn request(&mut self, rd: bool, wr: bool) -> Result<()> {
        let op = match (rd, wr) {
            (true, true) => return Err(MicError::ConflictingMemoryOp),
            (true, false) => MemOp::Read,
            (false, true) => MemOp::Write,
            (false, false) => MemOp::None,
        };
        self.handshake.this_cycle_requested = rd || wr;
        self.handshake.this_op = op;
        Ok(())
    }

    /// Perform the access if the handshake is confirmed, then go idle.
    pub fn commit(&mut self, memory: &mut Memory) -> Result<Option<MemoryAccess>> {
        if !self.handshake.confirmed() {
            return Ok(None);
        }
        let address = self.mar.read();
        let op = self.handshake.this_op;
        let value = match op {
            MemOp::Read => {
                let value = memory.read(address)?;
                self.mbr.write(value)?;
                value
            }
            MemOp::Write => {
                let value = self.mbr.read();
                memory.write(address, value)?;
                value
            }
            MemOp::None => return Ok(None),
        };
        self.handshake = Handshake::default();
        Ok(Some(MemoryAccess { op, address, value }))
    }

    /// Run the whole per-cycle handshake: shift, request, commit.
    pub fn cycle(
        &mut self,
        memory: &mut Memory,
        rd: bool,
        wr: bool,
    ) -> Result<Option<MemoryAccess>> {
        self.shift_request();
        self.request(rd, wr)?;
        self.commit(memory)
    }
}
