//! Assembler for the [`vm`](../vm/index.html) register machine.
//!
//! The main entry point is [`assemble`], which accepts a program written
//! in the machine's assembly language and produces a [`vm::Program`]
//! ready to hand to [`vm::Machine::run`].
//!
//! This crate plays two roles spec.md keeps conceptually separate: the
//! lexer/preprocessor collaborator (§1), here a small [pest] grammar that
//! turns source text into one [`lex::TokenLine`] per line, and the
//! in-scope program builder (§4.1), which resolves labels and binds
//! operands against that token stream.
//!
//! # Source syntax
//!
//! A line is either blank, a label definition (`name:`), or an
//! instruction: a mnemonic followed by zero or more comma-separated
//! operands. `#` starts a comment that runs to the end of the line.
//!
//! ## Operands
//!
//! - A register name (`eax`, `ebx`, ..., `esp`, `ebp`, `eip`, `r08`..`r0f`),
//!   case-insensitive.
//! - A label name, resolved to the instruction index it names.
//! - A signed decimal or `0x`-prefixed hexadecimal integer literal.
//! - `[reg]`, `[reg+N]`, `[reg-N]` for memory-indirect addressing.
//!
//! ```
//! let program = asm::assemble("mov eax, 1\nprn eax").unwrap();
//! assert_eq!(program.len(), 3); // mov, prn, and the Halt sentinel
//! ```
//!
//! [pest]: https://docs.rs/pest/

mod build;
mod error;
mod lex;
mod parser;

#[cfg(test)]
mod test;

pub use error::{BuildError, Error, LexError};
pub use lex::{Token, TokenLine};

use vm::Program;

/// Assembles `input` into a ready-to-run [`vm::Program`].
///
/// All parse-time errors abort the run before any instruction executes
/// (spec.md §7): the source is fully lexed and built, or nothing is
/// returned.
pub fn assemble(input: &str) -> Result<Program, Error> {
    let lines = lex::tokenize(input)?;
    Ok(build::build(&lines)?)
}
