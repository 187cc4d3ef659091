use std::collections::BTreeSet;

/// Document ids a chat turn is scoped to: whatever was uploaded before the
/// session started plus everything ingested since, without duplicates.
#[derive(Debug, Clone, Default)]
pub struct DocumentContext {
    order: Vec<u64>,
    seen: BTreeSet<u64>,
}

impl DocumentContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = u64>,
    {
        for id in ids {
            self.add(id);
        }
    }

    /// Returns true when the id was not already present. Zero is never a valid id.
    pub fn add(&mut self, id: u64) -> bool {
        if id == 0 || !self.seen.insert(id) {
            return false;
        }
        self.order.push(id);
        true
    }

    pub fn active_ids(&self) -> Vec<u64> {
        self.order.clone()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.seen.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
