use num_derive::{FromPrimitive, ToPrimitive};
use util::EnumFromStr;
use util_derive::EnumFromStr;

/// One 32-bit register cell, reinterpretable as a signed integer or as an
/// address into linear memory.
#[derive(Clone, Copy)]
pub union Register {
    i: i32,
    u: u32,
}

impl Register {
    pub fn i(self) -> i32 {
        unsafe { self.i }
    }

    pub fn u(self) -> u32 {
        unsafe { self.u }
    }

    pub fn set_i(&mut self, value: i32) {
        self.i = value;
    }

    pub fn set_u(&mut self, value: u32) {
        self.u = value;
    }
}

impl Default for Register {
    fn default() -> Register {
        Register { u: 0 }
    }
}

/// Identifies one of the 17 architectural registers (indices 0x0-0x10).
///
/// `R08..R0F` are named after the spec's own (slightly irregular) naming
/// scheme: the name encodes a hex suffix starting at `08`, while the
/// underlying indices continue on from `EIP` at `0x9`.
#[derive(Clone, Copy, PartialEq, Eq, Debug, ToPrimitive, FromPrimitive, EnumFromStr)]
pub enum RegisterId {
    EAX,
    EBX,
    ECX,
    EDX,
    ESI,
    EDI,
    ESP,
    EBP,
    EIP,
    R08,
    R09,
    R0A,
    R0B,
    R0C,
    R0D,
    R0E,
    R0F,
}

impl std::fmt::Display for RegisterId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

#[inline]
pub fn register_index(id: RegisterId) -> usize {
    use num::traits::ToPrimitive;
    id.to_usize().unwrap()
}
