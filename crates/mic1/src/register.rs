use crate::error::{MicError, Result};

/// Widest register the core supports (the 32-bit MIR).
pub const MAX_WIDTH_BYTES: u8 = 4;

/// Fixed-width storage cell.
///
/// The value always satisfies `value <= mask()`. Construction masks the
/// initial value; runtime writes that do not fit are rejected instead.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Register {
    width_bytes: u8,
    mutable: bool,
    value: u32,
}

/// Width pulled into `1..=MAX_WIDTH_BYTES`. Datapath units built with an
/// unsupported width use the nearest supported one.
#[inline]
pub const fn clamp_width(width_bytes: u8) -> u8 {
    if width_bytes == 0 {
        1
    } else if width_bytes > MAX_WIDTH_BYTES {
        MAX_WIDTH_BYTES
    } else {
        width_bytes
    }
}

/// All-ones mask for a width given in bytes, after [`clamp_width`].
#[inline]
pub const fn width_mask(width_bytes: u8) -> u32 {
    let bits = 8 * clamp_width(width_bytes) as u32;
    ((1u64 << bits) - 1) as u32
}

impl Register {
    /// A zeroed, writable register.
    pub fn new(width_bytes: u8) -> Self {
        Self::with_value(width_bytes, 0)
    }

    /// A writable register seeded with `value` truncated to the width.
    pub fn with_value(width_bytes: u8, value: u32) -> Self {
        assert!(
            (1..=MAX_WIDTH_BYTES).contains(&width_bytes),
            "Invalid register width: {} bytes",
            width_bytes
        );
        Self {
            width_bytes,
            mutable: true,
            value: value & width_mask(width_bytes),
        }
    }

    /// A read-only register holding `value` truncated to the width.
    pub fn constant(width_bytes: u8, value: u32) -> Self {
        Self {
            mutable: false,
            ..Self::with_value(width_bytes, value)
        }
    }

    #[inline]
    pub fn read(&self) -> u32 {
        self.value
    }

    pub fn write(&mut self, value: u32) -> Result<()> {
        if !self.mutable {
            return Err(MicError::ImmutableWrite);
        }
        if value > self.mask() {
            return Err(MicError::Overflow {
                value,
                width_bytes: self.width_bytes,
            });
        }
        self.value = value;
        Ok(())
    }

    #[inline]
    pub fn width_bytes(&self) -> u8 {
        self.width_bytes
    }

    #[inline]
    pub fn mask(&self) -> u32 {
        width_mask(self.width_bytes)
    }

    #[inline]
    pub fn is_mutable(&self) -> bool {
        self.mutable
    }
}
