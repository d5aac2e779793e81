//! A small register-based virtual machine: a fixed register file, a
//! byte-addressable linear memory, a downward-growing stack sharing that
//! memory, and a step executor for a fixed instruction set.
//!
//! This crate is the core described by the architecture: program
//! representation ([`program`]), machine state ([`machine`]), and the
//! opcode/register/operand vocabulary they're built from. Turning source
//! text into a [`program::Program`] is the job of the sibling `asm` crate.

pub mod constants;
pub mod fault;
pub mod machine;
pub mod memory;
pub mod opcode;
pub mod operand;
pub mod program;
pub mod register;

pub use fault::{Checked, DefaultPolicy, FaultPolicy, RuntimeFault, Unchecked};
pub use machine::{ExecError, Flags, Machine};
pub use memory::Memory;
pub use opcode::{Arity, OpCode};
pub use operand::{Operand, OperandError};
pub use program::{Instruction, Program};
pub use register::{Register, RegisterId};
pub use util::ParseEnumError;
