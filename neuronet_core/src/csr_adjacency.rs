use std::mem::size_of;

use crate::id_map::DenseId;

/// Compressed Sparse Row (CSR) adjacency over dense ids.
/// Each row is sorted ascending and holds no repeated target.
#[derive(Debug, Default)]
pub struct CsrAdjacency {
    // Points to the start index in `targets` for a given ID.
    // Length = num_nodes + 1, non-decreasing.
    offsets: Vec<usize>,

    // The contiguous list of all (deduplicated) out-edges.
    targets: Vec<DenseId>,
}

impl CsrAdjacency {
    /// Returns the out-neighbors for a given dense_id.
    /// Returns an empty slice if the ID is out of bounds.
    #[inline(always)]
    pub fn get(&self, id: DenseId) -> &[DenseId] {
        let id = id as usize;
        match (self.offsets.get(id), self.offsets.get(id + 1)) {
            (Some(&start), Some(&end)) => &self.targets[start..end],
            _ => &[],
        }
    }

    /// Row length of `id`, 0 when out of bounds.
    #[inline(always)]
    pub fn degree(&self, id: DenseId) -> usize {
        self.get(id).len()
    }

    pub fn num_nodes(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    /// Number of stored edges, i.e. after per-row deduplication.
    pub fn num_edges(&self) -> usize {
        self.targets.len()
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    pub fn targets(&self) -> &[DenseId] {
        &self.targets
    }

    /// Iterates `(source, row)` for every dense id in ascending order.
    pub fn rows(&self) -> impl Iterator<Item = (DenseId, &[DenseId])> + '_ {
        self.offsets
            .windows(2)
            .enumerate()
            .map(|(id, w)| (id as DenseId, &self.targets[w[0]..w[1]]))
    }

    /// Allocated bytes of both arrays (capacity, not length).
    pub fn memory_bytes(&self) -> usize {
        self.offsets.capacity() * size_of::<usize>() + self.targets.capacity() * size_of::<DenseId>()
    }

    /// Builds the CSR from unsorted pairs (source -> dest).
    /// Uses a 2-pass bucket sort to avoid resizing vectors, then sorts and
    /// deduplicates every row and compacts `targets` in place.
    ///
    /// - `num_nodes`: The maximum Dense ID + 1.
    /// - `pairs`: (source, dest) pairs; sources outside `num_nodes` are dropped.
    pub fn from_pairs(num_nodes: usize, pairs: &[(DenseId, DenseId)]) -> Self {
        // Pass 1: degree histogram
        let mut counts = vec![0usize; num_nodes];
        for &(src, _) in pairs {
            if (src as usize) < num_nodes {
                counts[src as usize] += 1;
            }
        }

        let mut offsets = Vec::with_capacity(num_nodes + 1);
        let mut current_offset = 0;
        offsets.push(0);
        for count in counts {
            current_offset += count;
            offsets.push(current_offset);
        }

        // Pass 2: scatter targets using a copy of `offsets` as write cursors
        let total_edges = offsets[num_nodes];
        let mut targets = vec![0 as DenseId; total_edges];
        let mut write_cursors = offsets.clone();

        for &(src, dst) in pairs {
            if (src as usize) < num_nodes {
                let pos = write_cursors[src as usize];
                targets[pos] = dst;
                write_cursors[src as usize] += 1;
            }
        }
        drop(write_cursors);

        // Pass 3: sort + dedup each row, shifting it left over the gap
        // left by duplicates removed from earlier rows.
        let mut write = 0;
        for node in 0..num_nodes {
            let (start, end) = (offsets[node], offsets[node + 1]);
            let row = &mut targets[start..end];
            row.sort_unstable();

            offsets[node] = write;
            let mut last: Option<DenseId> = None;
            for read in start..end {
                let value = targets[read];
                if last != Some(value) {
                    targets[write] = value;
                    write += 1;
                    last = Some(value);
                }
            }
        }
        offsets[num_nodes] = write;
        targets.truncate(write);
        targets.shrink_to_fit();

        CsrAdjacency { offsets, targets }
    }
}
