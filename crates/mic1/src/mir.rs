//! Microinstruction word layout and decoding.
//!
//! A microinstruction is a 32-bit word split into 13 control fields, from the
//! most significant bit down:
//!
//! ```text
//! AMUX COND ALU SH MBR MAR RD WR ENC  C    B    A    ADDR
//!  1    2    2   2  1   1   1  1  1   4    4    4    8
//! ```
//!
//! [`MicroInstruction`] is a stateless view over a fetched word; the storage
//! itself lives in the sequencer's MIR [`Register`](crate::register::Register).

use std::fmt;

use crate::alu::AluOp;
use crate::error::{MicError, Result};
use crate::shifter::ShiftOp;

/// Width of a microinstruction in bytes.
pub const INSTRUCTION_BYTES: u8 = 4;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Amux,
    Cond,
    Alu,
    Sh,
    Mbr,
    Mar,
    Rd,
    Wr,
    Enc,
    C,
    B,
    A,
    Addr,
}

impl Field {
    /// MSB to LSB order.
    pub const ALL: [Field; 13] = [
        Field::Amux,
        Field::Cond,
        Field::Alu,
        Field::Sh,
        Field::Mbr,
        Field::Mar,
        Field::Rd,
        Field::Wr,
        Field::Enc,
        Field::C,
        Field::B,
        Field::A,
        Field::Addr,
    ];

    pub const fn mask(self) -> u32 {
        match self {
            Field::Amux => 0b1000_0000_0000_0000_0000_0000_0000_0000,
            Field::Cond => 0b0110_0000_0000_0000_0000_0000_0000_0000,
            Field::Alu => 0b0001_1000_0000_0000_0000_0000_0000_0000,
            Field::Sh => 0b0000_0110_0000_0000_0000_0000_0000_0000,
            Field::Mbr => 0b0000_0001_0000_0000_0000_0000_0000_0000,
            Field::Mar => 0b0000_0000_1000_0000_0000_0000_0000_0000,
            Field::Rd => 0b0000_0000_0100_0000_0000_0000_0000_0000,
            Field::Wr => 0b0000_0000_0010_0000_0000_0000_0000_0000,
            Field::Enc => 0b0000_0000_0001_0000_0000_0000_0000_0000,
            Field::C => 0b0000_0000_0000_1111_0000_0000_0000_0000,
            Field::B => 0b0000_0000_0000_0000_1111_0000_0000_0000,
            Field::A => 0b0000_0000_0000_0000_0000_1111_0000_0000,
            Field::Addr => 0b0000_0000_0000_0000_0000_0000_1111_1111,
        }
    }

    #[inline]
    pub const fn shift(self) -> u32 {
        self.mask().trailing_zeros()
    }

    /// Number of bits in the field.
    #[inline]
    pub const fn width(self) -> u32 {
        self.mask().count_ones()
    }

    /// Largest value the field can hold.
    #[inline]
    pub const fn max(self) -> u32 {
        self.mask() >> self.shift()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Field::Amux => "AMUX",
            Field::Cond => "COND",
            Field::Alu => "ALU",
            Field::Sh => "SH",
            Field::Mbr => "MBR",
            Field::Mar => "MAR",
            Field::Rd => "RD",
            Field::Wr => "WR",
            Field::Enc => "ENC",
            Field::C => "C",
            Field::B => "B",
            Field::A => "A",
            Field::Addr => "ADDR",
        }
    }

    #[inline]
    const fn extract(self, word: u32) -> u32 {
        (word & self.mask()) >> self.shift()
    }
}

/// Decoded view over one microinstruction word.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct MicroInstruction(u32);

impl MicroInstruction {
    #[inline]
    pub const fn new(word: u32) -> Self {
        Self(word)
    }

    #[inline]
    pub const fn word(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn field(self, field: Field) -> u32 {
        field.extract(self.0)
    }

    #[inline]
    pub const fn amux(self) -> bool {
        self.field(Field::Amux) != 0
    }

    #[inline]
    pub const fn cond(self) -> u8 {
        self.field(Field::Cond) as u8
    }

    #[inline]
    pub const fn alu(self) -> u8 {
        self.field(Field::Alu) as u8
    }

    #[inline]
    pub const fn sh(self) -> u8 {
        self.field(Field::Sh) as u8
    }

    #[inline]
    pub const fn mbr(self) -> bool {
        self.field(Field::Mbr) != 0
    }

    #[inline]
    pub const fn mar(self) -> bool {
        self.field(Field::Mar) != 0
    }

    #[inline]
    pub const fn rd(self) -> bool {
        self.field(Field::Rd) != 0
    }

    #[inline]
    pub const fn wr(self) -> bool {
        self.field(Field::Wr) != 0
    }

    #[inline]
    pub const fn enc(self) -> bool {
        self.field(Field::Enc) != 0
    }

    #[inline]
    pub const fn c(self) -> usize {
        self.field(Field::C) as usize
    }

    #[inline]
    pub const fn b(self) -> usize {
        self.field(Field::B) as usize
    }

    #[inline]
    pub const fn a(self) -> usize {
        self.field(Field::A) as usize
    }

    #[inline]
    pub const fn addr(self) -> u8 {
        self.field(Field::Addr) as u8
    }

    #[inline]
    pub fn alu_op(self) -> AluOp {
        AluOp::from_bits(self.alu())
    }

    #[inline]
    pub fn shift_op(self) -> ShiftOp {
        ShiftOp::from_bits(self.sh())
    }

    /// Unpack every field into a plain struct.
    pub fn fields(self) -> MicroFields {
        MicroFields {
            amux: self.amux(),
            cond: self.cond(),
            alu: self.alu(),
            sh: self.sh(),
            mbr: self.mbr(),
            mar: self.mar(),
            rd: self.rd(),
            wr: self.wr(),
            enc: self.enc(),
            c: self.c() as u8,
            b: self.b() as u8,
            a: self.a() as u8,
            addr: self.addr(),
        }
    }
}

impl From<u32> for MicroInstruction {
    fn from(word: u32) -> Self {
        Self(word)
    }
}

impl fmt::Debug for MicroInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("MicroInstruction");
        for field in Field::ALL {
            s.field(field.name(), &self.field(field));
        }
        s.finish()
    }
}

impl fmt::Display for MicroInstruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in Field::ALL.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}=0x{:X}", field.name(), self.field(*field))?;
        }
        Ok(())
    }
}

/// Control fields of a microinstruction as plain values.
///
/// This is the building side of [`MicroInstruction`]: fill in the fields and
/// [`pack`](MicroFields::pack) them into a word for program memory.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct MicroFields {
    pub amux: bool,
    pub cond: u8,
    pub alu: u8,
    pub sh: u8,
    pub mbr: bool,
    pub mar: bool,
    pub rd: bool,
    pub wr: bool,
    pub enc: bool,
    pub c: u8,
    pub b: u8,
    pub a: u8,
    pub addr: u8,
}

impl MicroFields {
    pub fn get(&self, field: Field) -> u32 {
        match field {
            Field::Amux => self.amux as u32,
            Field::Cond => self.cond as u32,
            Field::Alu => self.alu as u32,
            Field::Sh => self.sh as u32,
            Field::Mbr => self.mbr as u32,
            Field::Mar => self.mar as u32,
            Field::Rd => self.rd as u32,
            Field::Wr => self.wr as u32,
            Field::Enc => self.enc as u32,
            Field::C => self.c as u32,
            Field::B => self.b as u32,
            Field::A => self.a as u32,
            Field::Addr => self.addr as u32,
        }
    }

    /// Pack into a microinstruction word. A value that does not fit its
    /// field is rejected rather than bleeding into the neighbouring one.
    pub fn pack(&self) -> Result<u32> {
        let mut word = 0u32;
        for field in Field::ALL {
            let value = self.get(field);
            if value > field.max() {
                return Err(MicError::FieldOverflow {
                    field: field.name(),
                    value,
                    max: field.max(),
                });
            }
            word |= value << field.shift();
        }
        Ok(word)
    }

    pub fn to_instruction(&self) -> Result<MicroInstruction> {
        self.pack().map(MicroInstruction::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mic1_common::ErrorKind;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn field_masks_are_disjoint_and_cover_the_word() {
        let mut seen = 0u32;
        for field in Field::ALL {
            assert_eq!(seen & field.mask(), 0, "{} overlaps", field.name());
            seen |= field.mask();
        }
        assert_eq!(seen, u32::MAX);
    }

    #[test]
    fn field_widths_match_layout() {
        let widths: Vec<u32> = Field::ALL.iter().map(|f| f.width()).collect();
        assert_eq!(widths, vec![1, 2, 2, 2, 1, 1, 1, 1, 1, 4, 4, 4, 8]);
        assert_eq!(Field::Cond.shift(), 29);
        assert_eq!(Field::C.shift(), 16);
        assert_eq!(Field::Addr.shift(), 0);
    }

    #[test]
    fn decode_inverts_pack_for_random_fields() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let fields = MicroFields {
                amux: rng.gen(),
                cond: rng.gen_range(0..4),
                alu: rng.gen_range(0..4),
                sh: rng.gen_range(0..4),
                mbr: rng.gen(),
                mar: rng.gen(),
                rd: rng.gen(),
                wr: rng.gen(),
                enc: rng.gen(),
                c: rng.gen_range(0..16),
                b: rng.gen_range(0..16),
                a: rng.gen_range(0..16),
                addr: rng.gen(),
            };
            let word = fields.pack().unwrap();
            assert_eq!(MicroInstruction::new(word).fields(), fields);
        }
    }

    #[test]
    fn pack_inverts_decode_for_random_words() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..500 {
            let word: u32 = rng.gen();
            let mi = MicroInstruction::new(word);
            assert_eq!(mi.fields().pack().unwrap(), word);
        }
    }

    #[test]
    fn decodes_the_demo_words() {
        // Pass A with MBR, MAR and WR asserted; bus B = B, bus A = A.
        let mi = MicroInstruction::new(0b0001_0001_1010_0000_1011_1010_0000_0000);
        assert!(!mi.amux());
        assert_eq!(mi.cond(), 0);
        assert_eq!(mi.alu(), 0b10);
        assert_eq!(mi.sh(), 0);
        assert!(mi.mbr());
        assert!(mi.mar());
        assert!(!mi.rd());
        assert!(mi.wr());
        assert!(!mi.enc());
        assert_eq!(mi.c(), 0);
        assert_eq!(mi.b(), 11);
        assert_eq!(mi.a(), 10);
        assert_eq!(mi.addr(), 0);

        let rd_only = MicroInstruction::new(0b0000_0000_0100_0000_0000_0000_0000_0000);
        assert!(rd_only.rd());
        assert!(!rd_only.wr());
    }

    #[test]
    fn redecoding_a_new_word_leaves_no_stale_fields() {
        let first = MicroInstruction::new(u32::MAX);
        assert_eq!(first.addr(), 0xFF);
        let second = MicroInstruction::new(0);
        assert_eq!(second.fields(), MicroFields::default());
    }

    #[test]
    fn oversized_field_is_rejected() {
        let fields = MicroFields {
            c: 16,
            ..Default::default()
        };
        let err = fields.pack().unwrap_err();
        assert_eq!(
            err,
            MicError::FieldOverflow {
                field: Field::C.name(),
                value: 16,
                max: 0xF
            }
        );
        assert!(err.to_string().contains(Field::C.name()));
        assert_eq!(err.kind(), ErrorKind::Overflow);
    }

    #[test]
    fn opcode_fields_decode_to_closed_enums() {
        let fields = MicroFields {
            alu: 0b11,
            sh: 0b01,
            ..Default::default()
        };
        let mi = fields.to_instruction().unwrap();
        assert_eq!(mi.alu_op(), AluOp::InvA);
        assert_eq!(mi.shift_op(), ShiftOp::ShiftRight);
    }
}
