//! Built-in model capabilities.
//!
//! The set is closed: every model the serving backend knows is a variant
//! of `eid_model::ModelName` with a capability registered here. Each
//! capability owns its dataset reader and drives one dispatch run per
//! invocation.
mod dataset;
pub use dataset::{CifarRecordSource, DirSource, IdxPairSource};

mod cifar10;
pub use cifar10::Cifar10;

mod mnist;
pub use mnist::{Mnist, MnistCnn};

mod yolo;
pub use yolo::{TinyYolo, Yolo};

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use eid_core::registry::ModelRegistry;
use eid_model::{DispatchConfig, ModelName};

/// Register every built-in capability in the given registry.
///
/// After this call each `ModelName` token resolves to a capability
/// configured with `config` and cancelled by `cancel`.
pub fn register_builtin(
    registry: &mut ModelRegistry,
    config: &DispatchConfig,
    cancel: &CancellationToken,
) {
    registry.register(
        ModelName::Mnist,
        Arc::new(Mnist::new(config.clone(), cancel.clone())),
    );
    registry.register(
        ModelName::MnistCnn,
        Arc::new(MnistCnn::new(config.clone(), cancel.clone())),
    );
    registry.register(
        ModelName::Yolo,
        Arc::new(Yolo::new(config.clone(), cancel.clone())),
    );
    registry.register(
        ModelName::TinyYolo,
        Arc::new(TinyYolo::new(config.clone(), cancel.clone())),
    );
    registry.register(
        ModelName::Cifar10,
        Arc::new(Cifar10::new(config.clone(), cancel.clone())),
    );
}
