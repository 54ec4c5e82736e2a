use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

/// Identifier of an atom inside a molecule definition (the `nr` column).
///
/// Bonded terms refer to atoms through this id, so it is kept distinct from
/// plain integers and strings to avoid mixing old and new numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtomId(u32);

impl AtomId {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for AtomId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl FromStr for AtomId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl fmt::Display for AtomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Forward so that width and alignment flags apply to the number.
        fmt::Display::fmt(&self.0, f)
    }
}
