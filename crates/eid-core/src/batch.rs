use eid_model::{Batch, Item};

use crate::error::CoreError;

/// Groups raw items into fixed-size batches for submission.
///
/// Items are consumed strictly in arrival order and batch order matches
/// input order. The final batch may be shorter when the input does not
/// divide evenly.
#[derive(Debug, Clone, Copy)]
pub struct BatchBuilder {
    batch_size: usize,
}

impl BatchBuilder {
    /// Create a builder for the given batch size.
    ///
    /// A zero batch size is a configuration error, rejected before any
    /// batching happens.
    pub fn new(batch_size: usize) -> Result<Self, CoreError> {
        if batch_size == 0 {
            return Err(CoreError::InvalidConfig(
                "batch size must be at least 1".to_string(),
            ));
        }
        Ok(Self { batch_size })
    }

    /// Configured batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Split items into `ceil(len / batch_size)` batches, preserving order.
    pub fn split(&self, items: Vec<Item>) -> Vec<Batch> {
        let mut batches = Vec::with_capacity(items.len().div_ceil(self.batch_size));
        let mut rest = items.into_iter();
        loop {
            let chunk: Vec<Item> = rest.by_ref().take(self.batch_size).collect();
            if chunk.is_empty() {
                break;
            }
            batches.push(Batch::new(chunk));
        }
        batches
    }
}
