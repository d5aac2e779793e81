use std::fmt;
use std::io::Write;
use std::num::Wrapping;

use crate::fault::{FaultPolicy, RuntimeFault};
use crate::machine::{Flags, Machine};
use crate::opcode::OpCode;
use crate::program::{Instruction, Program};

#[derive(Debug)]
pub enum ExecError {
    Fault(RuntimeFault),
    /// A fetch past the end of the program, or an operand that cannot be
    /// written to (an immediate or a resolved label). The builder's arity
    /// checking is supposed to make the latter unreachable for well-formed
    /// programs.
    InvalidOperand,
    ProgramCounterOutOfRange(u32),
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ExecError::Fault(fault) => write!(f, "{}", fault),
            ExecError::InvalidOperand => write!(f, "invalid operand"),
            ExecError::ProgramCounterOutOfRange(eip) => {
                write!(f, "program counter out of range: {}", eip)
            }
        }
    }
}

impl std::error::Error for ExecError {}

impl From<RuntimeFault> for ExecError {
    fn from(fault: RuntimeFault) -> ExecError {
        ExecError::Fault(fault)
    }
}

impl From<crate::operand::OperandError> for ExecError {
    fn from(err: crate::operand::OperandError) -> ExecError {
        use crate::operand::OperandError;
        match err {
            OperandError::NotWritable => ExecError::InvalidOperand,
            OperandError::Fault(fault) => ExecError::Fault(fault),
        }
    }
}

fn w(value: i32) -> Wrapping<i32> {
    Wrapping(value)
}

pub fn step<P: FaultPolicy>(machine: &mut Machine<P>, program: &Program) -> Result<(), ExecError> {
    step_with_output(machine, program, &mut std::io::sink())
}

pub fn step_with_output<P: FaultPolicy>(
    machine: &mut Machine<P>,
    program: &Program,
    out: &mut dyn Write,
) -> Result<(), ExecError> {
    let eip = machine.eip();
    let instruction = program
        .get(eip)
        .ok_or(ExecError::ProgramCounterOutOfRange(eip))?
        .clone();

    execute::<P>(machine, &instruction, out)?;

    if !machine.is_halted() {
        machine.set_eip(machine.eip().wrapping_add(1));
    }
    Ok(())
}

/// Sets `eip` so that the driver's unconditional post-increment (in
/// [`step_with_output`]) lands it on `target`.
fn jump_to<P: FaultPolicy>(machine: &mut Machine<P>, target: u32) {
    machine.set_eip(target.wrapping_sub(1));
}

fn execute<P: FaultPolicy>(
    machine: &mut Machine<P>,
    instruction: &Instruction,
    out: &mut dyn Write,
) -> Result<(), ExecError> {
    let ops = &instruction.operands;

    match instruction.opcode {
        OpCode::Nop | OpCode::Int => {}

        OpCode::Mov => {
            let value = ops[1].read(machine)?;
            ops[0].write(machine, value)?;
        }

        OpCode::Push => {
            let value = ops[0].read(machine)?;
            machine.push(value)?;
        }

        OpCode::Pop => {
            let value = machine.pop()?;
            ops[0].write(machine, value)?;
        }

        OpCode::Pushf => {
            machine.push(machine.flags().bits() as i32)?;
        }

        // The operand is syntactically required but ignored: popf always
        // writes the popped value into FLAGS, never into a named register.
        OpCode::Popf => {
            let value = machine.pop()?;
            machine.set_flags(value as u8);
        }

        OpCode::Inc => {
            let value = ops[0].read(machine)?;
            ops[0].write(machine, (w(value) + w(1)).0)?;
        }

        OpCode::Dec => {
            let value = ops[0].read(machine)?;
            ops[0].write(machine, (w(value) - w(1)).0)?;
        }

        OpCode::Add => binary_op::<P>(machine, ops, |a, b| (w(a) + w(b)).0)?,
        OpCode::Sub => binary_op::<P>(machine, ops, |a, b| (w(a) - w(b)).0)?,
        OpCode::Mul => binary_op::<P>(machine, ops, |a, b| (w(a) * w(b)).0)?,

        OpCode::Div => {
            let a = ops[0].read(machine)?;
            let b = ops[1].read(machine)?;
            P::check_division(b)?;
            ops[0].write(machine, a.wrapping_div(b))?;
        }

        // `a` is left unchanged; the quotient's-companion remainder is
        // stashed for a later `rem` to pick up (§4.4's mod/rem two-step).
        OpCode::Mod => {
            let a = ops[0].read(machine)?;
            let b = ops[1].read(machine)?;
            P::check_division(b)?;
            machine.set_remainder(a.wrapping_rem(b));
        }

        // Retrieves the remainder stashed by the most recent `mod`, rather
        // than computing one itself.
        OpCode::Rem => {
            let remainder = machine.remainder();
            ops[0].write(machine, remainder)?;
        }

        OpCode::Not => {
            let value = ops[0].read(machine)?;
            ops[0].write(machine, !value)?;
        }

        OpCode::Xor => binary_op::<P>(machine, ops, |a, b| a ^ b)?,
        OpCode::Or => binary_op::<P>(machine, ops, |a, b| a | b)?,
        OpCode::And => binary_op::<P>(machine, ops, |a, b| a & b)?,
        OpCode::Shl => {
            let a = ops[0].read(machine)?;
            let b = ops[1].read(machine)?;
            P::check_shift_amount(b)?;
            ops[0].write(machine, a.wrapping_shl(b as u32))?;
        }
        // Logical, not arithmetic: zero-fills regardless of sign, unlike
        // `i32::wrapping_shr` (which sign-extends). Shift in the unsigned
        // domain and cast back.
        OpCode::Shr => {
            let a = ops[0].read(machine)?;
            let b = ops[1].read(machine)?;
            P::check_shift_amount(b)?;
            ops[0].write(machine, (a as u32).wrapping_shr(b as u32) as i32)?;
        }

        OpCode::Cmp => {
            let a = ops[0].read(machine)?;
            let b = ops[1].read(machine)?;
            let mut bits = 0u8;
            if a == b {
                bits |= Flags::EQUAL;
            }
            if a > b {
                bits |= Flags::GREATER;
            }
            machine.set_flags(bits);
        }

        OpCode::Jmp => {
            let target = branch_target(machine, &ops[0])?;
            jump_to(machine, target);
        }

        OpCode::Call => {
            let target = branch_target(machine, &ops[0])?;
            machine.push(machine.eip() as i32)?;
            jump_to(machine, target);
        }

        OpCode::Ret => {
            let target = machine.pop()?;
            machine.set_eip(target as u32);
        }

        OpCode::Je => branch_if::<P>(machine, &ops[0], machine.flags().is_set(Flags::EQUAL))?,
        OpCode::Jne => branch_if::<P>(machine, &ops[0], !machine.flags().is_set(Flags::EQUAL))?,
        OpCode::Jg => branch_if::<P>(machine, &ops[0], machine.flags().is_set(Flags::GREATER))?,
        // Tests the raw FLAGS bits rather than a synthesized
        // greater-or-equal condition: either bit being set takes the branch.
        OpCode::Jge => branch_if::<P>(machine, &ops[0], machine.flags().bits() != 0)?,
        OpCode::Jl => branch_if::<P>(machine, &ops[0], machine.flags().bits() == 0)?,
        OpCode::Jle => branch_if::<P>(machine, &ops[0], !machine.flags().is_set(Flags::GREATER))?,

        OpCode::Prn => {
            let value = ops[0].read(machine)?;
            writeln!(out, "{}", value).ok();
        }

        OpCode::Halt => machine.halt(),
    }

    Ok(())
}

fn binary_op<P: FaultPolicy>(
    machine: &mut Machine<P>,
    ops: &[crate::operand::Operand],
    f: impl FnOnce(i32, i32) -> i32,
) -> Result<(), ExecError> {
    let a = ops[0].read(machine)?;
    let b = ops[1].read(machine)?;
    ops[0].write(machine, f(a, b))?;
    Ok(())
}

fn branch_target<P: FaultPolicy>(
    machine: &Machine<P>,
    operand: &crate::operand::Operand,
) -> Result<u32, ExecError> {
    operand
        .read(machine)
        .map(|v| v as u32)
        .map_err(ExecError::from)
}

fn branch_if<P: FaultPolicy>(
    machine: &mut Machine<P>,
    operand: &crate::operand::Operand,
    condition: bool,
) -> Result<(), ExecError> {
    if condition {
        let target = branch_target(machine, operand)?;
        jump_to(machine, target);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::fault::Checked;
    use crate::operand::Operand;
    use crate::program::{Instruction, Program};
    use crate::register::RegisterId;
    use std::collections::HashMap;

    fn program(instructions: Vec<Instruction>) -> Program {
        Program::new(instructions, HashMap::new())
    }

    #[test]
    fn mov_then_halt() {
        let mut machine: Machine<Checked> = Machine::new(64);
        let program = program(vec![
            Instruction::new(
                OpCode::Mov,
                vec![Operand::Register(RegisterId::EAX), Operand::Immediate(5)],
            ),
            Instruction::new(OpCode::Halt, vec![]),
        ]);
        machine.step(&program).unwrap();
        assert_eq!(machine.register(RegisterId::EAX).i(), 5);
        machine.step(&program).unwrap();
        assert!(machine.is_halted());
    }

    #[test]
    fn mod_leaves_operand_unchanged_and_stashes_remainder_for_rem() {
        let mut machine: Machine<Checked> = Machine::new(64);
        machine.register_mut(RegisterId::EAX).set_i(7);
        let program = program(vec![
            Instruction::new(
                OpCode::Mod,
                vec![Operand::Register(RegisterId::EAX), Operand::Immediate(2)],
            ),
            Instruction::new(OpCode::Rem, vec![Operand::Register(RegisterId::EBX)]),
            Instruction::new(OpCode::Halt, vec![]),
        ]);
        machine.step(&program).unwrap();
        assert_eq!(machine.register(RegisterId::EAX).i(), 7);
        machine.step(&program).unwrap();
        assert_eq!(machine.register(RegisterId::EBX).i(), 1);
    }

    #[test]
    fn div_does_not_touch_the_remainder_register() {
        let mut machine: Machine<Checked> = Machine::new(64);
        machine.register_mut(RegisterId::EAX).set_i(7);
        machine.set_remainder(42);
        let program = program(vec![Instruction::new(
            OpCode::Div,
            vec![Operand::Register(RegisterId::EAX), Operand::Immediate(2)],
        )]);
        machine.step(&program).unwrap();
        assert_eq!(machine.register(RegisterId::EAX).i(), 3);
        assert_eq!(machine.remainder(), 42);
    }

    #[test]
    fn division_by_zero_faults_under_checked_policy() {
        let mut machine: Machine<Checked> = Machine::new(64);
        machine.register_mut(RegisterId::EAX).set_i(7);
        let program = program(vec![Instruction::new(
            OpCode::Div,
            vec![Operand::Register(RegisterId::EAX), Operand::Immediate(0)],
        )]);
        match machine.step(&program) {
            Err(ExecError::Fault(RuntimeFault::DivisionByZero)) => {}
            other => panic!("expected division fault, got {:?}", other),
        }
    }

    #[test]
    fn jge_takes_the_branch_on_either_flag_bit() {
        let mut machine: Machine<Checked> = Machine::new(64);
        machine.set_flags(Flags::EQUAL);
        let program = program(vec![
            Instruction::new(OpCode::Jge, vec![Operand::Label(2)]),
            Instruction::new(OpCode::Halt, vec![]),
            Instruction::new(OpCode::Nop, vec![]),
        ]);
        machine.step(&program).unwrap();
        assert_eq!(machine.eip(), 2);
    }

    #[test]
    fn call_then_ret_returns_to_the_call_site() {
        let mut machine: Machine<Checked> = Machine::new(64);
        let program = program(vec![
            Instruction::new(OpCode::Call, vec![Operand::Label(2)]),
            Instruction::new(OpCode::Halt, vec![]),
            Instruction::new(OpCode::Ret, vec![]),
        ]);
        machine.step(&program).unwrap();
        assert_eq!(machine.eip(), 2);
        machine.step(&program).unwrap();
        assert_eq!(machine.eip(), 1);
    }

    #[test]
    fn shr_is_logical_not_arithmetic() {
        let mut machine: Machine<Checked> = Machine::new(64);
        machine.register_mut(RegisterId::EAX).set_i(-1);
        let program = program(vec![Instruction::new(
            OpCode::Shr,
            vec![Operand::Register(RegisterId::EAX), Operand::Immediate(28)],
        )]);
        machine.step(&program).unwrap();
        assert_eq!(machine.register(RegisterId::EAX).i(), 0xF);
    }

    #[test]
    fn out_of_range_shift_amount_faults_under_checked_policy() {
        let mut machine: Machine<Checked> = Machine::new(64);
        machine.register_mut(RegisterId::EAX).set_i(1);
        let program = program(vec![Instruction::new(
            OpCode::Shl,
            vec![Operand::Register(RegisterId::EAX), Operand::Immediate(32)],
        )]);
        match machine.step(&program) {
            Err(ExecError::Fault(RuntimeFault::BadShiftAmount { amount: 32 })) => {}
            other => panic!("expected bad-shift-amount fault, got {:?}", other),
        }
    }

    #[test]
    fn prn_writes_the_operand_value() {
        let mut machine: Machine<Checked> = Machine::new(64);
        machine.register_mut(RegisterId::EAX).set_i(99);
        let program = program(vec![Instruction::new(
            OpCode::Prn,
            vec![Operand::Register(RegisterId::EAX)],
        )]);
        let mut buf = Vec::new();
        step_with_output(&mut machine, &program, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "99\n");
    }
}
