use crate::parser::Rule;
use pest::error::Error as PestError;
use std::fmt;

/// Failures from the grammar stage (spec.md §6's lexer/preprocessor
/// collaborator): a line that doesn't match the line grammar, or an
/// integer literal whose magnitude doesn't fit a 32-bit word.
#[derive(Debug)]
pub enum LexError {
    Grammar(PestError<Rule>),
    InvalidLiteral(String),
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            LexError::Grammar(err) => write!(f, "{}", err),
            LexError::InvalidLiteral(text) => {
                write!(f, "integer literal out of range: {}", text)
            }
        }
    }
}

impl std::error::Error for LexError {}

impl From<PestError<Rule>> for LexError {
    fn from(err: PestError<Rule>) -> LexError {
        LexError::Grammar(err)
    }
}

/// Failures from the program builder (spec.md §4.1/§7).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BuildError {
    DuplicateLabel(String),
    UnknownOpcode(String),
    ArityError {
        mnemonic: String,
        expected: usize,
        found: usize,
    },
    UnknownIdentifier(String),
    /// A bracketed operand that parses but isn't one of the three
    /// supported forms (`[reg]`, `[reg+N]`, `[reg-N]`), e.g. `[reg*N]`.
    Unsupported(String),
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BuildError::DuplicateLabel(name) => write!(f, "duplicate label: {}", name),
            BuildError::UnknownOpcode(name) => write!(f, "unknown opcode: {}", name),
            BuildError::ArityError {
                mnemonic,
                expected,
                found,
            } => write!(
                f,
                "{} takes {} operand(s), found {}",
                mnemonic, expected, found
            ),
            BuildError::UnknownIdentifier(name) => write!(f, "unknown identifier: {}", name),
            BuildError::Unsupported(detail) => write!(f, "unsupported operand form: {}", detail),
        }
    }
}

impl std::error::Error for BuildError {}

/// Top-level assembly error: either stage aborts the run before any
/// instruction executes (spec.md §7).
#[derive(Debug)]
pub enum Error {
    Lex(LexError),
    Build(BuildError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Lex(err) => write!(f, "{}", err),
            Error::Build(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {}

impl From<LexError> for Error {
    fn from(err: LexError) -> Error {
        Error::Lex(err)
    }
}

impl From<BuildError> for Error {
    fn from(err: BuildError) -> Error {
        Error::Build(err)
    }
}
