use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Whether a source stops after a configured batch count or runs forever.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RunMode {
    Bounded,
    Endless,
}

impl Default for RunMode {
    fn default() -> Self {
        RunMode::Bounded
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunMode::Bounded => "bounded",
            RunMode::Endless => "endless",
        };
        f.write_str(s)
    }
}

impl FromStr for RunMode {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bounded" | "" => Ok(RunMode::Bounded),
            "endless" => Ok(RunMode::Endless),
            other => Err(ModelError::UnknownRunMode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::RunMode;

    #[test]
    fn default_is_bounded() {
        assert_eq!(RunMode::default(), RunMode::Bounded);
    }

    #[test]
    fn empty_token_falls_back_to_bounded() {
        assert_eq!(RunMode::from_str("").unwrap(), RunMode::Bounded);
    }

    #[test]
    fn parses_endless() {
        assert_eq!(RunMode::from_str("Endless").unwrap(), RunMode::Endless);
    }

    #[test]
    fn rejects_unknown_mode() {
        assert!(RunMode::from_str("forever").is_err());
    }
}
