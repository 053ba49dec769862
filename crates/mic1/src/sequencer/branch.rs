use crate::alu::AluFlags;

/// How the microprogram counter moved at the end of a cycle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Branch {
    /// MPC + 1.
    #[default]
    Increment,
    /// MPC loaded from the ADDR field.
    Jump(u8),
    /// Z or N was set but COND selected neither; MPC keeps its value.
    Stall,
}

/// Decide the next MPC move from the COND field and the ALU flags.
///
/// COND is only consulted when at least one of Z/N is set. With both flags
/// clear the counter always increments, even for COND = 0b11. When a flag
/// is set but COND does not select it, the counter is left alone for the
/// cycle.
pub fn resolve_branch(cond: u8, addr: u8, flags: AluFlags) -> Branch {
    if flags.is_empty() {
        return Branch::Increment;
    }
    let always = cond & 0b11 == 0b11;
    let on_negative = flags.contains(AluFlags::NEGATIVE) && cond & 0b01 != 0;
    let on_zero = flags.contains(AluFlags::ZERO) && cond & 0b10 != 0;
    if always || on_negative || on_zero {
        Branch::Jump(addr)
    } else {
        Branch::Stall
    }
}
