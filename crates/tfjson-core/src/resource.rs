//! # Resource Identity Primitives
//!
//! Small types shared by configuration resources, state resources, and
//! resource changes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Whether a resource is managed or a read-only data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceMode {
    /// A managed resource (`resource` blocks).
    #[serde(rename = "resource")]
    Managed,
    /// A data source (`data` blocks).
    #[serde(rename = "data")]
    Data,
}

impl ResourceMode {
    /// The wire name of the mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Managed => "resource",
            Self::Data => "data",
        }
    }
}

impl fmt::Display for ResourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Instance key of a resource created with `count` (integer) or
/// `for_each` (string).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceIndex {
    /// A `count` index.
    Int(i64),
    /// A `for_each` key.
    Key(String),
}

impl fmt::Display for ResourceIndex {
    /// Formats the index the way it appears in an address: `[0]` or
    /// `["a"]`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "[{i}]"),
            Self::Key(k) => write!(f, "[{k:?}]"),
        }
    }
}
