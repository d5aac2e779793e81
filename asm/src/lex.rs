//! The lexer/preprocessor collaborator spec.md §1 treats as out of scope,
//! reduced to the token-stream contract §6 fixes: one [`TokenLine`] per
//! source line, comments and whitespace already gone, operands split but
//! not yet classified as register/label/immediate/memory (that happens in
//! [`crate::build`], the in-scope program builder).

use pest::iterators::Pair;
use pest::Parser;

use crate::error::LexError;
use crate::parser::{LineParser, Rule};

/// One not-yet-classified operand token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    /// A bare identifier: resolved against the register names and the
    /// label table during operand binding.
    Ident(String),
    Integer(i32),
    /// `[base]`, or `[base <op> N]` with `op` carried through unvalidated
    /// (the builder rejects anything but `+`/`-`).
    Memory {
        base: String,
        offset: Option<(char, i32)>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenLine {
    Blank,
    Label(String),
    Instruction { mnemonic: String, operands: Vec<Token> },
}

pub fn tokenize(input: &str) -> Result<Vec<TokenLine>, LexError> {
    input.lines().map(tokenize_line).collect()
}

fn tokenize_line(line: &str) -> Result<TokenLine, LexError> {
    let line_pair = LineParser::parse(Rule::line, line)?.next().unwrap();
    match line_pair.into_inner().next() {
        None => Ok(TokenLine::Blank),
        Some(pair) if pair.as_rule() == Rule::EOI => Ok(TokenLine::Blank),
        Some(pair) => match pair.as_rule() {
            Rule::label_def => {
                let name = pair.into_inner().next().unwrap().as_str().to_owned();
                Ok(TokenLine::Label(name))
            }
            Rule::instruction => tokenize_instruction(pair),
            other => unreachable!("line grammar cannot produce {:?} here", other),
        },
    }
}

fn tokenize_instruction(pair: Pair<Rule>) -> Result<TokenLine, LexError> {
    let mut parts = pair.into_inner();
    let mnemonic = parts.next().unwrap().as_str().to_owned();
    let operands = parts.map(tokenize_operand).collect::<Result<Vec<_>, _>>()?;
    Ok(TokenLine::Instruction { mnemonic, operands })
}

fn tokenize_operand(pair: Pair<Rule>) -> Result<Token, LexError> {
    let inner = pair.into_inner().next().unwrap();
    match inner.as_rule() {
        Rule::memory => tokenize_memory(inner),
        Rule::integer => parse_integer(inner.as_str()).map(Token::Integer),
        Rule::identifier => Ok(Token::Ident(inner.as_str().to_owned())),
        other => unreachable!("operand grammar cannot produce {:?} here", other),
    }
}

fn tokenize_memory(pair: Pair<Rule>) -> Result<Token, LexError> {
    let mut parts = pair.into_inner();
    let base = parts.next().unwrap().as_str().to_owned();
    let offset = match parts.next() {
        Some(memory_offset) => {
            let mut offset_parts = memory_offset.into_inner();
            let op = offset_parts.next().unwrap().as_str().chars().next().unwrap();
            let magnitude = parse_unsigned(offset_parts.next().unwrap().as_str())?;
            Some((op, magnitude))
        }
        None => None,
    };
    Ok(Token::Memory { base, offset })
}

fn parse_integer(s: &str) -> Result<i32, LexError> {
    match s.strip_prefix('-') {
        Some(rest) => parse_unsigned(rest).map(i32::wrapping_neg),
        None => parse_unsigned(s),
    }
}

fn parse_unsigned(s: &str) -> Result<i32, LexError> {
    let magnitude = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16)
    } else {
        s.parse::<u32>()
    }
    .map_err(|_| LexError::InvalidLiteral(s.to_owned()))?;
    Ok(magnitude as i32)
}
