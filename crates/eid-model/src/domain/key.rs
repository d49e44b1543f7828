use std::fmt;

use serde::{Deserialize, Serialize};

/// Content-derived correlation key for a single item.
///
/// The key is the only artifact that survives an item past submission:
/// results coming back from the executors carry it so they can be matched
/// to their originating input. Derivation lives in `eid-core::identity`;
/// this type only fixes the representation (64 bits, rendered as 16 hex
/// digits in logs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemKey(u64);

impl ItemKey {
    /// Wrap a raw key value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw key value.
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ItemKey {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
