use ahash::AHashMap;
use std::mem::size_of;

/// External node identifier, as supplied by the caller.
pub type NodeId = i64;

/// Dense internal index in `0..N`.
pub type DenseId = u32;

/// Bijection between external node ids and dense ids.
///
/// Dense ids are handed out in ascending order of the external id, so two
/// loads of the same edge set produce the same mapping.
#[derive(Debug, Default)]
pub struct IdMap {
    original_to_dense: AHashMap<NodeId, DenseId>,
    dense_to_original: Vec<NodeId>,
}

impl IdMap {
    /// Builds the mapping from any sequence of ids; repeats are collapsed.
    pub fn from_ids<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = NodeId>,
    {
        let mut dense_to_original: Vec<NodeId> = ids.into_iter().collect();
        dense_to_original.sort_unstable();
        dense_to_original.dedup();
        dense_to_original.shrink_to_fit();

        let mut original_to_dense = AHashMap::with_capacity(dense_to_original.len());
        for (dense, &original) in dense_to_original.iter().enumerate() {
            original_to_dense.insert(original, dense as DenseId);
        }

        Self {
            original_to_dense,
            dense_to_original,
        }
    }

    /// External -> dense. `None` for ids never seen at build time.
    #[inline(always)]
    pub fn dense(&self, original: NodeId) -> Option<DenseId> {
        self.original_to_dense.get(&original).copied()
    }

    /// Dense -> external. `None` when `dense` is out of range.
    #[inline(always)]
    pub fn original(&self, dense: DenseId) -> Option<NodeId> {
        self.dense_to_original.get(dense as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.dense_to_original.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense_to_original.is_empty()
    }

    /// External ids in dense order (ascending).
    pub fn originals(&self) -> &[NodeId] {
        &self.dense_to_original
    }

    /// Approximate allocated bytes of both directions.
    pub fn memory_bytes(&self) -> usize {
        let forward = self.original_to_dense.capacity() * (size_of::<NodeId>() + size_of::<DenseId>());
        let inverse = self.dense_to_original.capacity() * size_of::<NodeId>();
        forward + inverse
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_map() {
        let map = IdMap::from_ids(std::iter::empty());
        assert!(map.is_empty());
        assert_eq!(map.dense(0), None);
        assert_eq!(map.original(0), None);
    }

    #[test]
    fn test_assigns_in_ascending_order() {
        let map = IdMap::from_ids([30, -5, 10, 30, 10]);
        assert_eq!(map.len(), 3);
        assert_eq!(map.originals(), &[-5, 10, 30]);
        assert_eq!(map.dense(-5), Some(0));
        assert_eq!(map.dense(10), Some(1));
        assert_eq!(map.dense(30), Some(2));
    }

    #[test]
    fn test_round_trip() {
        let ids = [7, i64::MIN, 0, i64::MAX, 42, -1];
        let map = IdMap::from_ids(ids);
        for id in ids {
            let dense = map.dense(id).unwrap();
            assert_eq!(map.original(dense), Some(id));
        }
    }

    #[test]
    fn test_unknown_lookups() {
        let map = IdMap::from_ids([1, 2]);
        assert_eq!(map.dense(3), None);
        assert_eq!(map.original(2), None);
    }

    #[test]
    fn test_insertion_order_does_not_matter() {
        let a = IdMap::from_ids([3, 1, 2]);
        let b = IdMap::from_ids([2, 3, 1, 1]);
        assert_eq!(a.originals(), b.originals());
    }
}
