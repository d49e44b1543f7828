use eid_model::{ActivityAddr, Batch, ItemKey, RoutingContext};

use crate::error::CoreError;

/// Role flags carried by an activity.
///
/// `may_spawn` marks a source-role activity that produces further batches;
/// `expects_events` marks a sink-role activity that terminates a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityFlags {
    pub may_spawn: bool,
    pub expects_events: bool,
}

impl ActivityFlags {
    /// Flags for a batch-producing (source-role) activity.
    pub const fn source() -> Self {
        Self {
            may_spawn: true,
            expects_events: false,
        }
    }

    /// Flags for a batch-terminating (sink-role) activity.
    pub const fn sink() -> Self {
        Self {
            may_spawn: false,
            expects_events: true,
        }
    }
}

/// One unit of work handed to the execution engine.
///
/// Immutable once assembled. Assembly consumes the batch: the payloads live
/// only here afterwards, and the dispatcher keeps nothing but the parallel
/// key sequence for logging.
#[derive(Debug)]
pub struct ActivitySpec {
    context: RoutingContext,
    flags: ActivityFlags,
    payloads: Vec<Vec<u8>>,
    targets: Option<Vec<u8>>,
    keys: Vec<ItemKey>,
    destination: ActivityAddr,
}

impl ActivitySpec {
    /// Assemble an activity from a batch and its parallel key sequence.
    ///
    /// A key-count mismatch, or a batch mixing labeled and unlabeled items,
    /// is a programming defect and fails with
    /// [`CoreError::InvariantViolation`].
    pub fn assemble(
        batch: Batch,
        keys: Vec<ItemKey>,
        destination: ActivityAddr,
        context: RoutingContext,
        flags: ActivityFlags,
    ) -> Result<Self, CoreError> {
        if batch.len() != keys.len() {
            return Err(CoreError::InvariantViolation(format!(
                "batch holds {} items but {} keys were supplied",
                batch.len(),
                keys.len()
            )));
        }

        let total = batch.len();
        let mut payloads = Vec::with_capacity(total);
        let mut targets = Vec::new();
        for item in batch.into_items() {
            let (payload, target) = item.into_parts();
            payloads.push(payload);
            if let Some(t) = target {
                targets.push(t);
            }
        }

        let targets = match targets.len() {
            0 => None,
            n if n == total => Some(targets),
            n => {
                return Err(CoreError::InvariantViolation(format!(
                    "batch mixes labeled and unlabeled items ({n} of {total} labeled)"
                )));
            }
        };

        Ok(Self {
            context,
            flags,
            payloads,
            targets,
            keys,
            destination,
        })
    }

    /// Routing context steering executor selection.
    pub fn context(&self) -> &RoutingContext {
        &self.context
    }

    /// Role flags.
    pub fn flags(&self) -> ActivityFlags {
        self.flags
    }

    /// Item payloads, in batch order.
    pub fn payloads(&self) -> &[Vec<u8>] {
        &self.payloads
    }

    /// Expected class targets, parallel to the payloads when present.
    pub fn targets(&self) -> Option<&[u8]> {
        self.targets.as_deref()
    }

    /// Correlation keys, parallel to the payloads.
    pub fn keys(&self) -> &[ItemKey] {
        &self.keys
    }

    /// Address the eventual result must be delivered to.
    pub fn destination(&self) -> ActivityAddr {
        self.destination
    }

    /// Number of items carried.
    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    /// Returns `true` if the activity carries no items.
    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{ActivityFlags, ActivitySpec};
    use crate::error::CoreError;
    use crate::identity::batch_keys;
    use eid_model::{ActivityAddr, Batch, Item, ItemKey, RoutingContext};

    fn assemble(batch: Batch, keys: Vec<ItemKey>) -> Result<ActivitySpec, CoreError> {
        ActivitySpec::assemble(
            batch,
            keys,
            ActivityAddr::new(),
            RoutingContext::default(),
            ActivityFlags::source(),
        )
    }

    #[test]
    fn key_count_mismatch_is_an_invariant_violation() {
        let batch = Batch::new(vec![Item::new(vec![1]), Item::new(vec![2])]);
        let err = assemble(batch, vec![ItemKey::new(1)]).unwrap_err();
        assert!(matches!(err, CoreError::InvariantViolation(_)));
    }

    #[test]
    fn assembly_preserves_item_order() {
        let items = vec![Item::new(vec![0]), Item::new(vec![1]), Item::new(vec![2])];
        let keys = batch_keys(&items);
        let spec = assemble(Batch::new(items), keys.clone()).unwrap();

        let first: Vec<u8> = spec.payloads().iter().map(|p| p[0]).collect();
        assert_eq!(first, vec![0, 1, 2]);
        assert_eq!(spec.keys(), keys.as_slice());
    }

    #[test]
    fn fully_labeled_batch_yields_parallel_targets() {
        let items = vec![Item::labeled(vec![0], 7), Item::labeled(vec![1], 8)];
        let keys = batch_keys(&items);
        let spec = assemble(Batch::new(items), keys).unwrap();

        assert_eq!(spec.targets(), Some([7, 8].as_slice()));
    }

    #[test]
    fn unlabeled_batch_has_no_targets() {
        let items = vec![Item::new(vec![0]), Item::new(vec![1])];
        let keys = batch_keys(&items);
        let spec = assemble(Batch::new(items), keys).unwrap();

        assert_eq!(spec.targets(), None);
    }

    #[test]
    fn mixed_labels_are_an_invariant_violation() {
        let items = vec![Item::labeled(vec![0], 1), Item::new(vec![1])];
        let keys = batch_keys(&items);
        let err = assemble(Batch::new(items), keys).unwrap_err();
        assert!(matches!(err, CoreError::InvariantViolation(_)));
    }

    #[test]
    fn source_and_sink_flags_differ() {
        assert!(ActivityFlags::source().may_spawn);
        assert!(!ActivityFlags::source().expects_events);
        assert!(!ActivityFlags::sink().may_spawn);
        assert!(ActivityFlags::sink().expects_events);
    }
}
