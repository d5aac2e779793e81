use std::mem;

/// Size in bytes of a linear-memory word (also the stack slot size).
pub const WORD_BYTES: u32 = mem::size_of::<u32>() as u32;

pub const REGISTER_COUNT: usize = 17;

/// Default linear memory size, matching the "S >= 2 MiB" floor from the spec.
pub const DEFAULT_MEMORY_SIZE: u32 = 2 * 1024 * 1024;
