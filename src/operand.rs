use crate::constants::WORD_BYTES;
use crate::fault::{FaultPolicy, RuntimeFault};
use crate::machine::Machine;
use crate::register::RegisterId;

/// A single operand slot, bound to its kind at parse time (§9: "operands are
/// tagged at parse time, never stored as raw pointers").
///
/// Resolution against live storage (a register cell, an immediate, a
/// resolved branch target, or a memory cell) happens at execution time via
/// [`Operand::read`] and [`Operand::write`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operand {
    Register(RegisterId),
    Immediate(i32),
    /// A label already resolved to its instruction index by the builder.
    Label(u32),
    /// `[base]` or `[base+offset]` indirection through a register holding an
    /// address.
    Memory { base: RegisterId, offset: i32 },
}

/// Why an operand access failed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OperandError {
    /// The target is an immediate or a resolved label; neither is writable.
    NotWritable,
    Fault(RuntimeFault),
}

impl From<RuntimeFault> for OperandError {
    fn from(fault: RuntimeFault) -> OperandError {
        OperandError::Fault(fault)
    }
}

impl Operand {
    pub fn read<P: FaultPolicy>(self, machine: &Machine<P>) -> Result<i32, OperandError> {
        match self {
            Operand::Register(id) => Ok(machine.register(id).i()),
            Operand::Immediate(value) => Ok(value),
            Operand::Label(index) => Ok(index as i32),
            Operand::Memory { base, offset } => {
                let address = indirect_address(machine, base, offset);
                P::check_memory_access(address, WORD_BYTES, machine.memory().len())?;
                machine
                    .memory()
                    .read_word(address)
                    .map(|w| w as i32)
                    .map_err(|_| OperandError::Fault(RuntimeFault::BadMemoryAccess { address }))
            }
        }
    }

    /// Writes `value` into this operand's target location.
    ///
    /// Immediates and labels are not writable; attempting to write one is a
    /// builder-level error that should have been rejected during arity
    /// checking, so this returns `Err` rather than panicking.
    pub fn write<P: FaultPolicy>(
        self,
        machine: &mut Machine<P>,
        value: i32,
    ) -> Result<(), OperandError> {
        match self {
            Operand::Register(id) => {
                machine.register_mut(id).set_i(value);
                Ok(())
            }
            Operand::Immediate(_) | Operand::Label(_) => Err(OperandError::NotWritable),
            Operand::Memory { base, offset } => {
                let address = indirect_address(machine, base, offset);
                P::check_memory_access(address, WORD_BYTES, machine.memory().len())?;
                machine
                    .memory_mut()
                    .write_word(address, value as u32)
                    .map_err(|_| OperandError::Fault(RuntimeFault::BadMemoryAccess { address }))
            }
        }
    }
}

fn indirect_address<P: FaultPolicy>(machine: &Machine<P>, base: RegisterId, offset: i32) -> u32 {
    (machine.register(base).u() as i64 + offset as i64) as u32
}
