//! Release channels (stability tiers) shared by the listfile and the catalog.

use std::fmt;

/// Release stability tier, ordered from most to least stable.
///
/// The numeric rank matches the catalog's `releaseType` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Channel {
    Release = 1,
    Beta = 2,
    Alpha = 3,
}

impl Channel {
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn from_rank(rank: u8) -> Option<Self> {
        match rank {
            1 => Some(Channel::Release),
            2 => Some(Channel::Beta),
            3 => Some(Channel::Alpha),
            _ => None,
        }
    }

    /// Parses a channel name as written in the listfile. Names are exact and lower-case.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "release" => Some(Channel::Release),
            "beta" => Some(Channel::Beta),
            "alpha" => Some(Channel::Alpha),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::Release => "release",
            Channel::Beta => "beta",
            Channel::Alpha => "alpha",
        }
    }

    /// True if a file published on `file` satisfies a filter set to `self`.
    pub fn accepts(self, file: Channel) -> bool {
        file.rank() <= self.rank()
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
