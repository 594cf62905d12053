//! The fixed register set
//!
//! No register allocation happens here: binary templates always compute
//! in `rax`/`rbx`, stack-passed arguments stage through `r10`, and
//! `r11` is reserved for the one level of indirection address operands
//! need. The argument register order is part of the frozen ABI shared
//! with the runtime support library.

use dlc_common::Width;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    A,
    B,
    C,
    D,
    Di,
    Si,
    R10,
    R11,
}

impl Reg {
    pub fn name64(&self) -> &'static str {
        match self {
            Reg::A => "%rax",
            Reg::B => "%rbx",
            Reg::C => "%rcx",
            Reg::D => "%rdx",
            Reg::Di => "%rdi",
            Reg::Si => "%rsi",
            Reg::R10 => "%r10",
            Reg::R11 => "%r11",
        }
    }

    pub fn name8(&self) -> &'static str {
        match self {
            Reg::A => "%al",
            Reg::B => "%bl",
            Reg::C => "%cl",
            Reg::D => "%dl",
            Reg::Di => "%dil",
            Reg::Si => "%sil",
            Reg::R10 => "%r10b",
            Reg::R11 => "%r11b",
        }
    }

    pub fn name(&self, width: Width) -> &'static str {
        match width {
            Width::Byte => self.name8(),
            Width::Quad => self.name64(),
        }
    }
}

/// Register carrying the argument at the given 1-based index, or `None`
/// for stack-passed arguments (index 7 and up)
pub fn arg_reg(index: usize) -> Option<Reg> {
    match index {
        1 => Some(Reg::Di),
        2 => Some(Reg::Si),
        3 => Some(Reg::D),
        4 => Some(Reg::C),
        5 => Some(Reg::A),
        6 => Some(Reg::B),
        _ => None,
    }
}
