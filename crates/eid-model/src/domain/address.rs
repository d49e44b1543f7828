use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Address of the activity that must receive the eventual result.
///
/// Carried through every activity unchanged from submission to result
/// delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActivityAddr(Uuid);

impl ActivityAddr {
    /// Allocate a fresh address.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ActivityAddr {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ActivityAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
