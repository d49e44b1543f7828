use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Role a node plays in a deployment.
///
/// Sources read datasets and submit activities, predictors execute them,
/// the target collects results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeRole {
    Source,
    Target,
    Predictor,
}

impl NodeRole {
    /// All recognized roles, for usage messages.
    pub const fn all() -> &'static [NodeRole] {
        &[NodeRole::Source, NodeRole::Target, NodeRole::Predictor]
    }

    /// Canonical token string.
    pub const fn token(&self) -> &'static str {
        match self {
            NodeRole::Source => "SOURCE",
            NodeRole::Target => "TARGET",
            NodeRole::Predictor => "PREDICTOR",
        }
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for NodeRole {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "source" => Ok(NodeRole::Source),
            "target" => Ok(NodeRole::Target),
            "predictor" => Ok(NodeRole::Predictor),
            other => Err(ModelError::UnknownRole(other.to_string())),
        }
    }
}
