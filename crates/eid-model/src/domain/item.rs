/// One raw input record (e.g. an image) plus an optional class target.
///
/// An item exists only between the data source and the activity it is
/// consumed into. It is deliberately not `Clone`: once batched, the only
/// artifact that outlives it is its content-derived [`ItemKey`](crate::ItemKey).
#[derive(Debug, PartialEq, Eq)]
pub struct Item {
    payload: Vec<u8>,
    target: Option<u8>,
}

impl Item {
    /// Create an unlabeled item from raw payload bytes.
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            payload,
            target: None,
        }
    }

    /// Create an item carrying its expected class target.
    pub fn labeled(payload: Vec<u8>, target: u8) -> Self {
        Self {
            payload,
            target: Some(target),
        }
    }

    /// Raw payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Expected class target, if the source provides one.
    pub fn target(&self) -> Option<u8> {
        self.target
    }

    /// Decompose into payload and target, consuming the item.
    pub fn into_parts(self) -> (Vec<u8>, Option<u8>) {
        (self.payload, self.target)
    }
}
