use std::fmt;

use serde::{Deserialize, Serialize};

/// Capability tag used by the execution engine to select an eligible
/// executor for an activity.
///
/// Owned by the dispatcher, fixed for the lifetime of a run; activities
/// share it by cloning and never mutate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutingContext(String);

impl RoutingContext {
    /// Create a context from a capability tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The capability tag.
    pub fn tag(&self) -> &str {
        &self.0
    }
}

impl Default for RoutingContext {
    fn default() -> Self {
        Self("target".to_string())
    }
}

impl fmt::Display for RoutingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
