//! Content-derived item keys.
//!
//! A key is the only artifact of an item that survives submission; results
//! returning from the executors are matched back to their input solely
//! through it. Keys therefore must be deterministic, order-independent and
//! cheap enough to compute once per item per batch.

use sha2::{Digest, Sha256};

use eid_model::{Item, ItemKey};

/// Derive the correlation key for one item.
///
/// Pure function of the payload bytes: the same payload always yields the
/// same key, in this run and in any other. Identical items colliding is
/// intentional (dedup-friendly), distinct items collide with the odds of a
/// truncated SHA-256.
pub fn item_key(item: &Item) -> ItemKey {
    let digest = Sha256::digest(item.payload());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    ItemKey::new(u64::from_be_bytes(prefix))
}

/// Derive keys for a sequence of items, preserving order.
pub fn batch_keys<'a>(items: impl IntoIterator<Item = &'a Item>) -> Vec<ItemKey> {
    items.into_iter().map(item_key).collect()
}

#[cfg(test)]
mod tests {
    use super::{batch_keys, item_key};
    use eid_model::Item;

    #[test]
    fn key_is_deterministic() {
        let item = Item::new(vec![1, 2, 3, 4]);
        assert_eq!(item_key(&item), item_key(&item));
    }

    #[test]
    fn key_depends_on_content_not_identity() {
        let a = Item::new(vec![9, 9, 9]);
        let b = Item::new(vec![9, 9, 9]);
        assert_eq!(item_key(&a), item_key(&b));
    }

    #[test]
    fn key_ignores_target() {
        let unlabeled = Item::new(vec![5, 5]);
        let labeled = Item::labeled(vec![5, 5], 3);
        assert_eq!(item_key(&unlabeled), item_key(&labeled));
    }

    #[test]
    fn distinct_payloads_produce_distinct_keys() {
        let a = Item::new(vec![0]);
        let b = Item::new(vec![1]);
        assert_ne!(item_key(&a), item_key(&b));
    }

    #[test]
    fn batch_keys_preserve_order() {
        let items = vec![Item::new(vec![0]), Item::new(vec![1]), Item::new(vec![2])];
        let keys = batch_keys(&items);

        assert_eq!(keys.len(), 3);
        for (item, key) in items.iter().zip(&keys) {
            assert_eq!(item_key(item), *key);
        }
    }
}
