//! The CLI driver collaborator (spec.md §6): opens the source file
//! (applying the implicit `.vm` extension), hands the text to [`asm`],
//! executes the resulting program on a fresh [`vm::Machine`], and maps
//! failures to the stage that produced them.

use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use vm::Machine;

#[derive(Debug)]
pub enum Error {
    Open { path: PathBuf, source: std::io::Error },
    Assemble(asm::Error),
    Run(vm::ExecError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Open { path, source } => {
                write!(f, "opening \"{}\" failed: {}", path.display(), source)
            }
            Error::Assemble(err) => write!(f, "assembling program failed: {}", err),
            Error::Run(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Non-zero on any failure (spec.md §6); the exact value tells apart
    /// which stage failed, for a caller that cares.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Open { .. } => 1,
            Error::Assemble(_) => 2,
            Error::Run(_) => 3,
        }
    }
}

/// Reads `path`, retrying with an implicit `.vm` extension if the literal
/// name isn't found (spec.md §6).
fn read_source(path: &Path) -> Result<String, Error> {
    match fs::read_to_string(path) {
        Ok(source) => Ok(source),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            let with_ext = path.with_extension("vm");
            fs::read_to_string(&with_ext).map_err(|source| Error::Open {
                path: with_ext,
                source,
            })
        }
        Err(source) => Err(Error::Open {
            path: path.to_owned(),
            source,
        }),
    }
}

/// Opens, assembles, and runs the program at `path` to completion on a
/// fresh [`vm::Machine`] with `memory_size` bytes of linear memory. `prn`
/// output goes to `out`; diagnostics are the caller's responsibility (the
/// binary in `main.rs` routes them to stderr).
pub fn run(path: &Path, memory_size: u32, out: &mut dyn Write) -> Result<(), Error> {
    let source = read_source(path)?;
    run_source(&source, memory_size, out)
}

/// Assembles and runs `source` directly, without touching the filesystem.
pub fn run_source(source: &str, memory_size: u32, out: &mut dyn Write) -> Result<(), Error> {
    let program = asm::assemble(source).map_err(Error::Assemble)?;
    let mut machine: Machine = Machine::new(memory_size);
    machine.run(&program, out).map_err(Error::Run)
}
