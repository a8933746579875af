//! Polygon group identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_GROUP;

/// Group a polygon belongs to.
///
/// Only used for colour coding and for grouping on export. Any string is
/// accepted; the renderer's palette covers `"1"` to `"5"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Group(String);

impl Group {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            Self::default()
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Group {
    fn default() -> Self {
        Self(DEFAULT_GROUP.to_string())
    }
}

impl From<&str> for Group {
    fn from(id: &str) -> Self {
        Group::new(id)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
