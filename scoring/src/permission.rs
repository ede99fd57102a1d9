use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Gating verdict. Ordered `Allow < Wait < Block`; stricter is greater.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum PermissionState {
    #[default]
    Allow,
    Wait,
    Block,
}

impl PermissionState {
    pub const ALL: [PermissionState; 3] = [
        PermissionState::Allow,
        PermissionState::Wait,
        PermissionState::Block,
    ];

    /// Sort key used by the ranker: executable ideas first.
    pub fn rank(self) -> u8 {
        match self {
            PermissionState::Allow => 0,
            PermissionState::Wait => 1,
            PermissionState::Block => 2,
        }
    }

    /// Join on the lattice: an external floor can only make the verdict
    /// stricter, never relax it.
    pub fn merge(self, floor: Option<PermissionState>) -> PermissionState {
        match floor {
            Some(f) => self.max(f),
            None => self,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionState::Allow => "ALLOW",
            PermissionState::Wait => "WAIT",
            PermissionState::Block => "BLOCK",
        }
    }
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALLOW" => Ok(PermissionState::Allow),
            "WAIT" => Ok(PermissionState::Wait),
            "BLOCK" => Ok(PermissionState::Block),
            other => Err(format!("Invalid PermissionState value: {other}")),
        }
    }
}
