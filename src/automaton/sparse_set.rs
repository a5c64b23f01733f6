//! Sparse set of state ids with O(1) clear.
//!
//! Based on: https://research.swtch.com/sparse
//!
//! Properties:
//! - Preserves insertion order, which the linear matcher uses as thread
//!   priority
//! - O(1) membership testing and insertion
//! - O(1) clearing (just reset the length counter)
//!
//! Tradeoff: capacity must be known upfront and memory is 2*capacity.

use super::arena::StateId;

/// A set of `StateId`s below a known capacity.
#[derive(Clone, Debug)]
pub struct SparseSet {
    len: usize,
    /// The ids, in insertion order.
    dense: Vec<StateId>,
    /// id -> position in `dense`. An id is present iff
    /// `sparse[id] < len && dense[sparse[id]] == id`.
    sparse: Vec<u32>,
}

impl SparseSet {
    /// A set for ids in `[0, capacity)`.
    #[inline]
    pub fn new(capacity: usize) -> Self {
        SparseSet {
            len: 0,
            dense: vec![StateId::NONE; capacity],
            sparse: vec![0; capacity],
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.dense.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert an id. Returns true if it was not already present.
    ///
    /// Panics if the id is out of range.
    #[inline]
    pub fn insert(&mut self, id: StateId) -> bool {
        if self.contains(id) {
            return false;
        }
        debug_assert!(
            self.len < self.capacity(),
            "SparseSet overflow: len={}, capacity={}",
            self.len,
            self.capacity()
        );
        self.dense[self.len] = id;
        self.sparse[id.index()] = self.len as u32;
        self.len += 1;
        true
    }

    #[inline]
    pub fn contains(&self, id: StateId) -> bool {
        let pos = self.sparse[id.index()] as usize;
        pos < self.len && self.dense[pos] == id
    }

    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// The id at insertion position `i`.
    #[inline]
    pub fn get(&self, i: usize) -> StateId {
        debug_assert!(i < self.len);
        self.dense[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(i: usize) -> StateId {
        StateId::from_index(i)
    }

    #[test]
    fn test_sparse_set_basic() {
        let mut set = SparseSet::new(10);
        assert!(set.is_empty());
        assert_eq!(set.capacity(), 10);

        assert!(set.insert(id(3)));
        assert!(set.insert(id(7)));
        assert!(set.insert(id(1)));

        assert_eq!(set.len(), 3);
        assert!(set.contains(id(3)));
        assert!(set.contains(id(7)));
        assert!(!set.contains(id(0)));

        // Duplicate insert returns false
        assert!(!set.insert(id(3)));
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_sparse_set_insertion_order() {
        let mut set = SparseSet::new(10);
        for i in [5, 2, 8, 1] {
            set.insert(id(i));
        }
        let items: Vec<_> = (0..set.len()).map(|i| set.get(i).index()).collect();
        assert_eq!(items, vec![5, 2, 8, 1]);
    }

    #[test]
    fn test_sparse_set_clear() {
        let mut set = SparseSet::new(10);
        set.insert(id(1));
        set.insert(id(2));

        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(id(1)));

        set.insert(id(5));
        assert!(set.contains(id(5)));
    }
}
