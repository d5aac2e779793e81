use std::{error::Error, fmt};

pub type Endian = byteorder::LittleEndian;

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct ParseEnumError {
    pub value: String,
    pub enum_name: &'static str,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Failed to parse \"{}\" as {}.",
            &self.value, &self.enum_name
        )
    }
}

impl Error for ParseEnumError {
    fn description(&self) -> &str {
        "Failed to parse enum."
    }
}

/// Parses a fieldless enum from its variant name. Derived via `util_derive::EnumFromStr`.
pub trait EnumFromStr: Sized {
    fn from_str(s: &str) -> Result<Self, ParseEnumError>;
}
