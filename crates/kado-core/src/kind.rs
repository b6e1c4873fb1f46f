//! The closed set of bead types.
//!
//! A bead's declared name is also its type: `bead "terraform" { ... }` is the
//! terraform bead. Names outside this set are rejected by the graph
//! assembler, never by the loader.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A recognised bead type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BeadKind {
    Ansible,
    Terraform,
    Opa,
    Terragrunt,
}

/// Returned when a name is not one of the known bead types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown bead type: {0}")]
pub struct UnknownKind(pub String);

impl BeadKind {
    /// Every bead type, in declaration order.
    pub const ALL: [BeadKind; 4] = [
        BeadKind::Ansible,
        BeadKind::Terraform,
        BeadKind::Opa,
        BeadKind::Terragrunt,
    ];

    /// Returns the name used in `.kd` files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ansible => "ansible",
            Self::Terraform => "terraform",
            Self::Opa => "opa",
            Self::Terragrunt => "terragrunt",
        }
    }

    /// Returns `true` for types whose handler can change real infrastructure.
    pub fn is_mutating(&self) -> bool {
        !matches!(self, Self::Opa)
    }

}

impl fmt::Display for BeadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BeadKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownKind(s.to_owned()))
    }
}

impl Serialize for BeadKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BeadKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
