use std::io;

use eid_model::Item;

/// Black-box producer of raw items.
///
/// One `load` call reads one full pass over the underlying dataset, in a
/// stable order. An empty vector signals exhaustion; the dispatcher stops
/// rather than spin on a source with nothing left to give. Reading is
/// synchronous by design: the only blocking points of a dispatch run are
/// the admission gate and the inter-submission delay.
pub trait ItemSource: Send {
    /// Human-readable description for logs (typically the backing path).
    fn describe(&self) -> String;

    /// Read one pass of items.
    fn load(&mut self) -> io::Result<Vec<Item>>;
}

/// In-memory source over pre-built passes, mainly for tests and demos.
///
/// Each `load` yields the next scripted pass; once exhausted it keeps
/// returning an empty pass.
pub struct VecSource {
    passes: std::collections::VecDeque<Vec<Item>>,
}

impl VecSource {
    /// Source yielding a single pass.
    pub fn single(items: Vec<Item>) -> Self {
        Self {
            passes: std::collections::VecDeque::from([items]),
        }
    }

    /// Source yielding the given passes in order.
    pub fn passes(passes: impl IntoIterator<Item = Vec<Item>>) -> Self {
        Self {
            passes: passes.into_iter().collect(),
        }
    }
}

impl ItemSource for VecSource {
    fn describe(&self) -> String {
        format!("in-memory source ({} passes queued)", self.passes.len())
    }

    fn load(&mut self) -> io::Result<Vec<Item>> {
        Ok(self.passes.pop_front().unwrap_or_default())
    }
}
