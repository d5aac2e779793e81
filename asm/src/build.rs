//! The program builder (spec.md §4.1): two passes over the tokenized
//! lines, label resolution followed by operand binding, emitting a
//! [`vm::Program`] ready for the executor.

use std::collections::HashMap;
use std::str::FromStr;

use vm::{Arity, Instruction, OpCode, Operand, Program, RegisterId};

use crate::error::BuildError;
use crate::lex::{Token, TokenLine};

pub fn build(lines: &[TokenLine]) -> Result<Program, BuildError> {
    let labels = resolve_labels(lines)?;
    let instructions = bind_operands(lines, &labels)?;
    Ok(Program::new(instructions, labels))
}

/// Pass 1: walk the lines once, mapping each label to the instruction
/// index it will resolve to once pass 2 runs. Blank lines and label
/// lines contribute no instruction.
fn resolve_labels(lines: &[TokenLine]) -> Result<HashMap<String, u32>, BuildError> {
    let mut labels = HashMap::new();
    let mut index = 0u32;
    for line in lines {
        match line {
            TokenLine::Blank => {}
            TokenLine::Label(name) => {
                if labels.insert(name.clone(), index).is_some() {
                    return Err(BuildError::DuplicateLabel(name.clone()));
                }
            }
            TokenLine::Instruction { .. } => index += 1,
        }
    }
    Ok(labels)
}

/// Pass 2: walk the lines again, classifying every operand token into a
/// live [`Operand`] slot and appending the terminal `Halt` sentinel.
fn bind_operands(
    lines: &[TokenLine],
    labels: &HashMap<String, u32>,
) -> Result<Vec<Instruction>, BuildError> {
    let mut instructions = Vec::new();
    for line in lines {
        if let TokenLine::Instruction { mnemonic, operands } = line {
            let opcode = OpCode::from_mnemonic(mnemonic)
                .map_err(|_| BuildError::UnknownOpcode(mnemonic.clone()))?;
            check_arity(mnemonic, opcode, operands.len())?;
            let bound = operands
                .iter()
                .map(|token| bind_operand(token, labels))
                .collect::<Result<Vec<_>, _>>()?;
            instructions.push(Instruction::new(opcode, bound));
        }
    }
    instructions.push(Instruction::new(OpCode::Halt, vec![]));
    Ok(instructions)
}

fn check_arity(mnemonic: &str, opcode: OpCode, found: usize) -> Result<(), BuildError> {
    let expected = match opcode.arity() {
        Arity::Zero => 0,
        Arity::One => 1,
        Arity::Two => 2,
    };
    if found == expected {
        Ok(())
    } else {
        Err(BuildError::ArityError {
            mnemonic: mnemonic.to_owned(),
            expected,
            found,
        })
    }
}

fn bind_operand(token: &Token, labels: &HashMap<String, u32>) -> Result<Operand, BuildError> {
    match token {
        Token::Integer(value) => Ok(Operand::Immediate(*value)),
        Token::Ident(name) => bind_identifier(name, labels),
        Token::Memory { base, offset } => bind_memory(base, *offset),
    }
}

fn bind_identifier(name: &str, labels: &HashMap<String, u32>) -> Result<Operand, BuildError> {
    if let Some(id) = register_named(name) {
        return Ok(Operand::Register(id));
    }
    if let Some(index) = labels.get(name) {
        return Ok(Operand::Label(*index));
    }
    Err(BuildError::UnknownIdentifier(name.to_owned()))
}

fn bind_memory(base: &str, offset: Option<(char, i32)>) -> Result<Operand, BuildError> {
    let base_id = register_named(base).ok_or_else(|| BuildError::UnknownIdentifier(base.to_owned()))?;
    let offset = match offset {
        None => 0,
        Some(('+', magnitude)) => magnitude,
        Some(('-', magnitude)) => -magnitude,
        Some((op, _)) => return Err(BuildError::Unsupported(format!("[{}{}N]", base, op))),
    };
    Ok(Operand::Memory {
        base: base_id,
        offset,
    })
}

/// Register names are reserved words and case-insensitive, like mnemonics
/// (spec.md §6); [`RegisterId`]'s derived `FromStr` matches the upper-case
/// variant spelling exactly, so normalize first.
fn register_named(name: &str) -> Option<RegisterId> {
    RegisterId::from_str(&name.to_ascii_uppercase()).ok()
}
