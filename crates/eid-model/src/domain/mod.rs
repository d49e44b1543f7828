mod item;
pub use item::Item;

mod batch;
pub use batch::Batch;

mod key;
pub use key::ItemKey;

mod context;
pub use context::RoutingContext;

mod address;
pub use address::ActivityAddr;
