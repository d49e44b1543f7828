mod domain;
pub use domain::{ActivityAddr, Batch, Item, ItemKey, RoutingContext};

mod error;
pub use error::{ModelError, ModelResult};

mod token;
pub use token::{ModelName, NodeRole, RunMode};

mod spec;
pub use spec::DispatchConfig;
