use crate::error::{MicError, Result};
use crate::register::width_mask;

/// Shifter operation selected by the 2-bit SH field.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum ShiftOp {
    #[default]
    Pass,
    ShiftRight,
    ShiftLeft,
    /// `0b11` has no meaning in the microarchitecture.
    Undefined,
}

impl ShiftOp {
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => ShiftOp::Pass,
            0b01 => ShiftOp::ShiftRight,
            0b10 => ShiftOp::ShiftLeft,
            _ => ShiftOp::Undefined,
        }
    }

    pub const fn bits(self) -> u8 {
        match self {
            ShiftOp::Pass => 0b00,
            ShiftOp::ShiftRight => 0b01,
            ShiftOp::ShiftLeft => 0b10,
            ShiftOp::Undefined => 0b11,
        }
    }
}

/// One-bit shifter sitting behind the ALU output.
#[derive(Clone, Debug)]
pub struct Shifter {
    mask: u32,
    op: ShiftOp,
    input: u32,
    output: u32,
}

impl Shifter {
    pub fn new(width_bytes: u8) -> Self {
        Self {
            mask: width_mask(width_bytes),
            op: ShiftOp::default(),
            input: 0,
            output: 0,
        }
    }

    pub fn set_input(&mut self, value: u32) -> Result<()> {
        if value > self.mask {
            return Err(MicError::InputOverflow {
                unit: "shifter",
                value,
                mask: self.mask,
            });
        }
        self.input = value;
        Ok(())
    }

    #[inline]
    pub fn set_op(&mut self, op: ShiftOp) {
        self.op = op;
    }

    /// Evaluate the current operation. An undefined operation leaves the
    /// previous output in place.
    pub fn compute(&mut self) -> Result<u32> {
        self.output = match self.op {
            ShiftOp::Pass => self.input,
            ShiftOp::ShiftRight => self.input >> 1,
            ShiftOp::ShiftLeft => (self.input << 1) & self.mask,
            ShiftOp::Undefined => return Err(MicError::UndefinedShiftOp),
        };
        Ok(self.output)
    }

    #[inline]
    pub fn op(&self) -> ShiftOp {
        self.op
    }

    #[inline]
    pub fn input(&self) -> u32 {
        self.input
    }

    #[inline]
    pub fn output(&self) -> u32 {
        self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shift(op: ShiftOp, input: u32) -> u32 {
        let mut sh = Shifter::new(2);
        sh.set_op(op);
        sh.set_input(input).unwrap();
        sh.compute().unwrap()
    }

    #[test]
    fn unsupported_width_is_clamped() {
        let mut sh = Shifter::new(0);
        sh.set_op(ShiftOp::ShiftLeft);
        sh.set_input(0x80).unwrap();
        assert_eq!(sh.compute().unwrap(), 0);
        assert!(Shifter::new(8).set_input(0xFFFF_FFFF).is_ok());
    }

    #[test]
    fn truth_table() {
        assert_eq!(shift(ShiftOp::Pass, 0x1234), 0x1234);
        assert_eq!(shift(ShiftOp::ShiftRight, 0x1234), 0x091A);
        assert_eq!(shift(ShiftOp::ShiftRight, 0x0001), 0);
        assert_eq!(shift(ShiftOp::ShiftLeft, 0x1234), 0x2468);
        // Top bit falls off the width.
        assert_eq!(shift(ShiftOp::ShiftLeft, 0x8001), 0x0002);
    }

    #[test]
    fn undefined_op_keeps_previous_output() {
        let mut sh = Shifter::new(2);
        sh.set_op(ShiftOp::Pass);
        sh.set_input(0x00AA).unwrap();
        sh.compute().unwrap();

        sh.set_op(ShiftOp::from_bits(0b11));
        sh.set_input(0x0055).unwrap();
        assert_eq!(sh.compute(), Err(MicError::UndefinedShiftOp));
        assert_eq!(sh.output(), 0x00AA);
    }

    #[test]
    fn oversized_input_is_rejected() {
        let mut sh = Shifter::new(1);
        sh.set_input(0x10).unwrap();
        assert!(matches!(
            sh.set_input(0x100),
            Err(MicError::InputOverflow { unit: "shifter", .. })
        ));
        assert_eq!(sh.input(), 0x10);
    }

    #[test]
    fn op_bits_round_trip() {
        for bits in 0..4 {
            assert_eq!(ShiftOp::from_bits(bits).bits(), bits);
        }
    }
}
