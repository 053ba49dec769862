use bitflags::bitflags;

use crate::error::{MicError, Result};
use crate::register::width_mask;

/// ALU operation selected by the 2-bit ALU field.
///
/// Bit 1 of the field is the "A" control line, bit 0 the "B" line:
///
/// | A | B | result      |
/// |---|---|-------------|
/// | 0 | 0 | `a + b`     |
/// | 0 | 1 | `a AND b`   |
/// | 1 | 0 | `a`         |
/// | 1 | 1 | `NOT a`     |
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum AluOp {
    #[default]
    Add,
    And,
    PassA,
    InvA,
}

impl AluOp {
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => AluOp::Add,
            0b01 => AluOp::And,
            0b10 => AluOp::PassA,
            _ => AluOp::InvA,
        }
    }

    pub const fn bits(self) -> u8 {
        match self {
            AluOp::Add => 0b00,
            AluOp::And => 0b01,
            AluOp::PassA => 0b10,
            AluOp::InvA => 0b11,
        }
    }
}

bitflags! {
    /// Condition outputs of the ALU. At most one is set after a compute.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct AluFlags: u8 {
        const ZERO = 0b01;
        const NEGATIVE = 0b10;
    }
}

/// Two-input combinational ALU.
#[derive(Clone, Debug)]
pub struct Alu {
    mask: u32,
    op: AluOp,
    input_a: u32,
    input_b: u32,
    output: u32,
    flags: AluFlags,
}

impl Alu {
    pub fn new(width_bytes: u8) -> Self {
        Self {
            mask: width_mask(width_bytes),
            op: AluOp::default(),
            input_a: 0,
            input_b: 0,
            output: 0,
            flags: AluFlags::empty(),
        }
    }

    #[inline]
    fn check_input(&self, value: u32) -> Result<u32> {
        if value > self.mask {
            return Err(MicError::InputOverflow {
                unit: "ALU",
                value,
                mask: self.mask,
            });
        }
        Ok(value)
    }

    /// Set the left operand. On overflow the previous operand is kept.
    pub fn set_input_a(&mut self, value: u32) -> Result<()> {
        self.input_a = self.check_input(value)?;
        Ok(())
    }

    /// Set the right operand. On overflow the previous operand is kept.
    pub fn set_input_b(&mut self, value: u32) -> Result<()> {
        self.input_b = self.check_input(value)?;
        Ok(())
    }

    #[inline]
    pub fn set_op(&mut self, op: AluOp) {
        self.op = op;
    }

    /// Evaluate the current operation and refresh Z/N.
    pub fn compute(&mut self) -> u32 {
        let a = self.input_a;
        let b = self.input_b;
        let result = match self.op {
            AluOp::Add => a.wrapping_add(b) & self.mask,
            AluOp::And => a & b,
            AluOp::PassA => a,
            AluOp::InvA => !a & self.mask,
        };
        self.output = result;

        self.flags = AluFlags::empty();
        if result == 0 {
            self.flags.insert(AluFlags::ZERO);
        } else if result & self.sign_bit() != 0 {
            self.flags.insert(AluFlags::NEGATIVE);
        }
        result
    }

    #[inline]
    fn sign_bit(&self) -> u32 {
        // mask is 2^n - 1, so this is the top bit of the width
        (self.mask >> 1) + 1
    }

    #[inline]
    pub fn op(&self) -> AluOp {
        self.op
    }

    #[inline]
    pub fn input_a(&self) -> u32 {
        self.input_a
    }

    #[inline]
    pub fn input_b(&self) -> u32 {
        self.input_b
    }

    #[inline]
    pub fn output(&self) -> u32 {
        self.output
    }

    #[inline]
    pub fn flags(&self) -> AluFlags {
        self.flags
    }

    #[inline]
    pub fn zero(&self) -> bool {
        self.flags.contains(AluFlags::ZERO)
    }

    #[inline]
    pub fn negative(&self) -> bool {
        self.flags.contains(AluFlags::NEGATIVE)
    }

    #[inline]
    pub fn mask(&self) -> u32 {
        self.mask
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(op: AluOp, a: u32, b: u32) -> Alu {
        let mut alu = Alu::new(2);
        alu.set_op(op);
        alu.set_input_a(a).unwrap();
        alu.set_input_b(b).unwrap();
        alu.compute();
        alu
    }

    #[test]
    fn op_bits_map_flag_a_to_bit_one() {
        assert_eq!(AluOp::from_bits(0b00), AluOp::Add);
        assert_eq!(AluOp::from_bits(0b01), AluOp::And);
        assert_eq!(AluOp::from_bits(0b10), AluOp::PassA);
        assert_eq!(AluOp::from_bits(0b11), AluOp::InvA);
        for bits in 0..4 {
            assert_eq!(AluOp::from_bits(bits).bits(), bits);
        }
    }

    #[test]
    fn unsupported_width_is_clamped() {
        assert_eq!(Alu::new(8).mask(), 0xFFFF_FFFF);
        assert_eq!(Alu::new(0).mask(), 0xFF);
    }

    #[test]
    fn add_wraps_at_width() {
        assert_eq!(run(AluOp::Add, 12, 1).output(), 13);
        let alu = run(AluOp::Add, 0xFFFF, 0x0001);
        assert_eq!(alu.output(), 0);
        assert!(alu.zero());
    }

    #[test]
    fn and_masks_bits() {
        assert_eq!(run(AluOp::And, 0x0F0F, 0x00FF).output(), 0x000F);
        assert_eq!(run(AluOp::And, 0x1234, 0x0FFF).output(), 0x0234);
    }

    #[test]
    fn pass_a_ignores_b() {
        assert_eq!(run(AluOp::PassA, 0x0042, 0xFFFF).output(), 0x0042);
        assert_eq!(run(AluOp::PassA, 0x7FFF, 0).output(), 0x7FFF);
    }

    #[test]
    fn inv_a_stays_inside_width() {
        assert_eq!(run(AluOp::InvA, 0x0000, 0).output(), 0xFFFF);
        assert_eq!(run(AluOp::InvA, 0x00FF, 0x1234).output(), 0xFF00);
    }

    #[test]
    fn zero_flag_only_on_zero_result() {
        let alu = run(AluOp::And, 0xF0F0, 0x0F0F);
        assert_eq!(alu.output(), 0);
        assert!(alu.zero());
        assert!(!alu.negative());

        let alu = run(AluOp::Add, 1, 1);
        assert!(!alu.zero());
        assert!(!alu.negative());
        assert!(alu.flags().is_empty());
    }

    #[test]
    fn negative_flag_tracks_sign_bit_of_width() {
        let alu = run(AluOp::PassA, 0x8000, 0);
        assert!(alu.negative());
        assert!(!alu.zero());

        let alu = run(AluOp::PassA, 0x7FFF, 0);
        assert!(!alu.negative());

        // 0x80 is negative for an 8-bit ALU but not for a 16-bit one.
        let mut narrow = Alu::new(1);
        narrow.set_op(AluOp::PassA);
        narrow.set_input_a(0x80).unwrap();
        narrow.compute();
        assert!(narrow.negative());
        assert!(!run(AluOp::PassA, 0x80, 0).negative());
    }

    #[test]
    fn flags_are_cleared_before_each_compute() {
        let mut alu = Alu::new(2);
        alu.set_op(AluOp::PassA);
        alu.set_input_a(0).unwrap();
        alu.compute();
        assert!(alu.zero());
        alu.set_input_a(0x8001).unwrap();
        alu.compute();
        assert_eq!(alu.flags(), AluFlags::NEGATIVE);
        alu.set_input_a(5).unwrap();
        alu.compute();
        assert_eq!(alu.flags(), AluFlags::empty());
    }

    #[test]
    fn z_and_n_are_never_both_set() {
        for op in [AluOp::Add, AluOp::And, AluOp::PassA, AluOp::InvA] {
            for (a, b) in [(0, 0), (0xFFFF, 1), (0x8000, 0x8000), (0x7FFF, 0x0001)] {
                let alu = run(op, a, b);
                assert!(!(alu.zero() && alu.negative()), "{:?} {:#x} {:#x}", op, a, b);
            }
        }
    }

    #[test]
    fn oversized_input_keeps_previous_value() {
        let mut alu = Alu::new(2);
        alu.set_input_a(7).unwrap();
        let err = alu.set_input_a(0x1_0000).unwrap_err();
        assert_eq!(
            err,
            MicError::InputOverflow {
                unit: "ALU",
                value: 0x1_0000,
                mask: 0xFFFF
            }
        );
        assert_eq!(alu.input_a(), 7);
        assert!(alu.set_input_b(0x2_0000).is_err());
        assert_eq!(alu.input_b(), 0);
    }
}
