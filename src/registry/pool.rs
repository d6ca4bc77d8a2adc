//! # Refcounted pool of icon image slots.
//!
//! [`IconPool`] models the shared-icon image list as a reference-counted
//! arena: an exclusively-owned add allocates a fresh slot, a shared add
//! resolves an existing slot by [`IconImage`] identity and bumps its
//! refcount, and releasing the last reference frees the slot. Slot indices
//! are stable for the lifetime of the slot (freed indices are reused).

use crate::registry::IconImage;

#[derive(Debug)]
struct Slot {
    image: IconImage,
    refs: usize,
}

/// Reference-counted arena of image slots.
#[derive(Debug, Default)]
pub struct IconPool {
    slots: Vec<Option<Slot>>,
}

impl IconPool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh slot for an exclusively-owned image (refs = 1).
    pub fn alloc(&mut self, image: IconImage) -> usize {
        let slot = Slot { image, refs: 1 };
        match self.slots.iter().position(Option::is_none) {
            Some(idx) => {
                self.slots[idx] = Some(slot);
                idx
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        }
    }

    /// Resolves an existing slot by image identity.
    pub fn find(&self, image: IconImage) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| s.as_ref().is_some_and(|s| s.image == image))
    }

    /// Adds a reference to an existing slot.
    pub fn retain(&mut self, idx: usize) {
        if let Some(slot) = self.slots.get_mut(idx).and_then(Option::as_mut) {
            slot.refs += 1;
        }
    }

    /// Drops a reference; the slot is freed when the last one goes.
    pub fn release(&mut self, idx: usize) {
        if let Some(entry) = self.slots.get_mut(idx) {
            if let Some(slot) = entry.as_mut() {
                slot.refs -= 1;
                if slot.refs == 0 {
                    *entry = None;
                }
            }
        }
    }

    /// Image identity stored in a slot.
    pub fn image(&self, idx: usize) -> Option<IconImage> {
        self.slots.get(idx).and_then(Option::as_ref).map(|s| s.image)
    }

    /// Number of live slots (distinct owned images).
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// True if no slot is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alloc_and_release() {
        let mut pool = IconPool::new();
        let a = pool.alloc(IconImage(1));
        let b = pool.alloc(IconImage(2));
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.image(a), Some(IconImage(1)));

        pool.release(a);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.image(a), None);
        assert_eq!(pool.image(b), Some(IconImage(2)));
    }

    #[test]
    fn test_shared_retain_keeps_slot_alive() {
        let mut pool = IconPool::new();
        let slot = pool.alloc(IconImage(7));
        let found = pool.find(IconImage(7)).expect("slot by identity");
        assert_eq!(found, slot);

        pool.retain(found);
        pool.release(slot); // owner goes away
        assert_eq!(pool.len(), 1, "sharer still holds the slot");

        pool.release(found);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_freed_index_is_reused() {
        let mut pool = IconPool::new();
        let a = pool.alloc(IconImage(1));
        pool.alloc(IconImage(2));
        pool.release(a);
        let c = pool.alloc(IconImage(3));
        assert_eq!(c, a);
    }

    #[test]
    fn test_find_misses_unknown_identity() {
        let mut pool = IconPool::new();
        pool.alloc(IconImage(1));
        assert!(pool.find(IconImage(99)).is_none());
    }
}
