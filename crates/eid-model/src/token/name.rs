use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// Token naming a registered inference model.
///
/// The set is closed: adding a model to the serving backend means adding a
/// variant here and a capability registered under it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelName {
    Mnist,
    MnistCnn,
    Yolo,
    TinyYolo,
    Cifar10,
}

impl ModelName {
    /// All registered tokens, for usage messages.
    pub const fn all() -> &'static [ModelName] {
        &[
            ModelName::Mnist,
            ModelName::MnistCnn,
            ModelName::Yolo,
            ModelName::TinyYolo,
            ModelName::Cifar10,
        ]
    }

    /// Canonical token string.
    pub const fn token(&self) -> &'static str {
        match self {
            ModelName::Mnist => "MNIST",
            ModelName::MnistCnn => "MNIST_CNN",
            ModelName::Yolo => "YOLO",
            ModelName::TinyYolo => "TINY_YOLO",
            ModelName::Cifar10 => "CIFAR10",
        }
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for ModelName {
    type Err = ModelError;
    fn from_str(s: &str) -> ModelResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mnist" => Ok(ModelName::Mnist),
            "mnist_cnn" | "mnist-cnn" => Ok(ModelName::MnistCnn),
            "yolo" => Ok(ModelName::Yolo),
            "tiny_yolo" | "tiny-yolo" => Ok(ModelName::TinyYolo),
            "cifar10" => Ok(ModelName::Cifar10),
            other => Err(ModelError::UnknownModel(other.to_string())),
        }
    }
}
