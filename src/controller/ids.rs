use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::EntityId;

/// Hands out temporary ids: -1, -2, -3, ...
///
/// Backend ids are positive, so the two spaces never meet. One allocator is
/// shared by every controller of a tracker.
#[derive(Debug)]
pub struct TempIdAllocator {
    next: AtomicI64,
}

impl Default for TempIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl TempIdAllocator {
    pub fn new() -> Self {
        Self {
            next: AtomicI64::new(-1),
        }
    }

    pub fn allocate(&self) -> EntityId {
        self.next.fetch_sub(1, Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_counts_down_from_minus_one() {
        let ids = TempIdAllocator::new();
        assert_eq!(ids.allocate(), -1);
        assert_eq!(ids.allocate(), -2);
    }

    #[test]
    fn test_unique_across_threads() {
        let ids = Arc::new(TempIdAllocator::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ids = ids.clone();
                std::thread::spawn(move || (0..100).map(|_| ids.allocate()).collect::<Vec<_>>())
            })
            .collect();
        let mut seen = HashSet::new();
        for h in handles {
            for id in h.join().unwrap() {
                assert!(id < 0);
                assert!(seen.insert(id));
            }
        }
        assert_eq!(seen.len(), 800);
    }
}
