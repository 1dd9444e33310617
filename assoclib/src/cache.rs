use std::collections::VecDeque;
use std::fmt::{Display, Formatter};
use log::trace;
use serde::{Deserialize, Serialize};

/// The outcome of a single reference
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessKind {
    Hit,
    Miss,
}

impl Display for AccessKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessKind::Hit => f.write_str("hit"),
            AccessKind::Miss => f.write_str("miss"),
        }
    }
}

/// The tags resident in one set, least recently used at the front
///
/// Recency is purely positional: a hit moves the tag to the back, a miss appends to the back and,
/// if the set was full, drops the front
#[derive(Debug, Clone, Default)]
pub struct CacheSet {
    tags: VecDeque<u64>,
}

impl CacheSet {
    pub fn with_capacity(associativity: usize) -> Self {
        Self {
            tags: VecDeque::with_capacity(associativity),
        }
    }

    /// Looks up a tag and updates the recency order, evicting if needed
    pub fn access(&mut self, tag: u64, associativity: usize) -> AccessKind {
        match self.tags.iter().position(|t| *t == tag) {
            Some(position) => {
                self.tags.remove(position);
                self.tags.push_back(tag);
                AccessKind::Hit
            }
            None => {
                if self.tags.len() >= associativity {
                    if let Some(evicted) = self.tags.pop_front() {
                        trace!("Evicted tag {evicted:#x} for {tag:#x}");
                    }
                }
                self.tags.push_back(tag);
                AccessKind::Miss
            }
        }
    }

    /// Resident tags, least recently used first
    pub fn residents(&self) -> impl Iterator<Item = &u64> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_set_always_misses() {
        let mut set = CacheSet::default();
        assert!(set.is_empty());
        assert_eq!(set.access(7, 1), AccessKind::Miss);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn hit_moves_tag_to_most_recent() {
        let mut set = CacheSet::with_capacity(3);
        for tag in [1, 2, 3] {
            assert_eq!(set.access(tag, 3), AccessKind::Miss);
        }
        assert_eq!(set.access(1, 3), AccessKind::Hit);
        assert_eq!(set.residents().copied().collect::<Vec<_>>(), vec![2, 3, 1]);
    }

    #[test]
    fn hit_in_a_set_that_is_not_full_also_refreshes_recency() {
        let mut set = CacheSet::with_capacity(3);
        set.access(1, 3);
        set.access(2, 3);
        assert_eq!(set.access(1, 3), AccessKind::Hit);
        assert_eq!(set.residents().copied().collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn evicts_least_recently_touched() {
        let mut set = CacheSet::with_capacity(2);
        set.access(1, 2);
        set.access(2, 2);
        // 1 becomes most recent, so 2 is evicted by 3
        set.access(1, 2);
        assert_eq!(set.access(3, 2), AccessKind::Miss);
        assert_eq!(set.residents().copied().collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(set.access(2, 2), AccessKind::Miss);
        assert_eq!(set.residents().copied().collect::<Vec<_>>(), vec![3, 2]);
    }

    #[test]
    fn never_exceeds_associativity() {
        let mut set = CacheSet::with_capacity(4);
        for tag in 0..100u64 {
            set.access(tag % 9, 4);
            assert!(set.len() <= 4);
        }
    }

    #[test]
    fn labels_are_lowercase() {
        assert_eq!(AccessKind::Hit.to_string(), "hit");
        assert_eq!(serde_json::to_string(&AccessKind::Miss).unwrap(), "\"miss\"");
    }
}
