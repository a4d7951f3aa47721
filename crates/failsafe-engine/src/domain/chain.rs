//! Fallback chain ordering.
//!
//! Ids are ordered by priority descending. Equal priorities keep insertion
//! order: each entry records a monotonically increasing sequence number at
//! insert time and the sort is stable on `(priority desc, sequence asc)`.
//! Re-registering an id after removal gives it a fresh sequence number.

#[derive(Debug, Clone)]
struct ChainEntry {
    id: String,
    priority: i32,
    sequence: u64,
}

/// Priority-descending ordering of a coordinator's implementation ids.
#[derive(Debug, Clone, Default)]
pub struct FallbackChain {
    entries: Vec<ChainEntry>,
    next_sequence: u64,
}

impl FallbackChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an id and re-sort. An existing entry with the same id is replaced.
    pub fn insert(&mut self, id: impl Into<String>, priority: i32) {
        let id = id.into();
        self.entries.retain(|entry| entry.id != id);
        self.entries.push(ChainEntry {
            id,
            priority,
            sequence: self.next_sequence,
        });
        self.next_sequence += 1;
        self.recompute();
    }

    /// Remove an id. Returns whether it was present.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        let removed = self.entries.len() != before;
        if removed {
            self.recompute();
        }
        removed
    }

    fn recompute(&mut self) {
        self.entries.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| a.sequence.cmp(&b.sequence))
        });
    }

    /// Highest-priority id.
    pub fn head(&self) -> Option<&str> {
        self.entries.first().map(|entry| entry.id.as_str())
    }

    /// Position of an id in the chain.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    /// The entry strictly after `id`, if `id` is present and not last.
    pub fn next_after(&self, id: &str) -> Option<&str> {
        let position = self.position(id)?;
        self.entries
            .get(position + 1)
            .map(|entry| entry.id.as_str())
    }

    /// Ids in chain order.
    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
