pub mod activity;
pub mod admission;
pub mod batch;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod identity;
pub mod metrics;
pub mod registry;
pub mod source;

pub mod prelude {
    pub use crate::activity::{ActivityFlags, ActivitySpec};
    pub use crate::admission::{AdmissionGate, MemoryProbe};
    pub use crate::batch::BatchBuilder;
    pub use crate::dispatcher::{DispatchSummary, Dispatcher};
    pub use crate::engine::{ChannelEngine, EngineError, ExecutionEngine};
    pub use crate::error::CoreError;
    pub use crate::registry::{ModelCapability, ModelRegistry};
    pub use crate::source::ItemSource;
}
