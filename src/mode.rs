//! Statistics mode dispatch: spec.md §6.

use crate::error::GeneralStatError;

/// Which engine `general_stat` should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Branch,
    Site,
    Node,
}

impl std::str::FromStr for Mode {
    type Err = GeneralStatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "branch" => Ok(Mode::Branch),
            "site" => Ok(Mode::Site),
            "node" => Ok(Mode::Node),
            other => Err(GeneralStatError::InvalidMode(other.to_string())),
        }
    }
}
