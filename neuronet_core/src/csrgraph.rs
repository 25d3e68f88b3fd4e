use anyhow::Result;
use roaring::RoaringBitmap;
use std::collections::VecDeque;
use std::fmt;
use std::mem::size_of;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

use crate::csr_adjacency::CsrAdjacency;
use crate::graphbuilder::GraphBuilder;
use crate::id_map::{DenseId, IdMap, NodeId};

/// Returned by [`CsrGraph::max_degree_node`] when there is no node to report.
pub const NO_NODE: NodeId = -1;

/// Immutable sparse directed graph in CSR layout.
/// All internal logic uses dense ids (0..N); external ids only appear at
/// the query boundary.
#[derive(Debug, Default)]
pub struct CsrGraph {
    adjacency: CsrAdjacency,
    ids: IdMap,
    node_count: usize,
    // Raw pair count supplied at load time, duplicates included. The
    // deduplicated count lives in `adjacency`.
    edge_count: usize,
}

/// Summary of a loaded graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphStats {
    pub nodes: usize,
    pub edges: usize,
    pub unique_edges: usize,
    pub memory_bytes: usize,
    pub max_degree_node: NodeId,
    pub max_degree: usize,
}

impl fmt::Display for GraphStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Nodes: {}", self.nodes)?;
        writeln!(f, "Edges: {} ({} unique)", self.edges, self.unique_edges)?;
        writeln!(
            f,
            "Estimated memory: {:.2} MB",
            self.memory_bytes as f64 / 1_048_576.0
        )?;
        write!(
            f,
            "Max degree node: {} (degree {})",
            self.max_degree_node, self.max_degree
        )
    }
}

impl CsrGraph {
    /// An empty graph: no nodes, no edges.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(ids: IdMap, adjacency: CsrAdjacency, edge_count: usize) -> Self {
        Self {
            node_count: ids.len(),
            adjacency,
            ids,
            edge_count,
        }
    }

    /// Replaces the contents with the edge list at `path`.
    /// On error the current contents are left untouched.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        *self = GraphBuilder::from_path(path)?;
        Ok(())
    }

    #[inline(always)]
    fn original(&self, dense: DenseId) -> NodeId {
        self.ids.originals()[dense as usize]
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.ids.dense(node).is_some()
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Pairs supplied at load time, duplicates counted.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Edges actually stored after per-node deduplication.
    pub fn unique_edge_count(&self) -> usize {
        self.adjacency.num_edges()
    }

    /// Out-neighbors of `node` in ascending order. Empty for unknown nodes.
    pub fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        let Some(dense_id) = self.ids.dense(node) else {
            debug!(node, "neighbors of unknown node");
            return Vec::new();
        };
        self.adjacency
            .get(dense_id)
            .iter()
            .map(|&n| self.original(n))
            .collect()
    }

    /// Out-degree of `node`, 0 when unknown.
    pub fn degree(&self, node: NodeId) -> usize {
        self.ids
            .dense(node)
            .map_or(0, |dense_id| self.adjacency.degree(dense_id))
    }

    /// Node with the strictly greatest out-degree; the lowest id wins ties.
    /// `(NO_NODE, 0)` on an empty graph.
    pub fn max_degree_node(&self) -> (NodeId, usize) {
        let mut best = (NO_NODE, 0);
        for (dense_id, row) in self.adjacency.rows() {
            if row.len() > best.1 {
                best = (self.original(dense_id), row.len());
            }
        }
        best
    }

    /// Breadth-first search from `start`, never expanding past `max_depth`.
    /// Returns `(node, distance)` in discovery order, the start node first.
    /// Unknown start nodes yield an empty result.
    pub fn bounded_bfs(&self, start: NodeId, max_depth: u32) -> Vec<(NodeId, u32)> {
        let Some(start_node) = self.ids.dense(start) else {
            debug!(start, "bfs from unknown node");
            return Vec::new();
        };

        let timer = Instant::now();
        let results: Vec<(NodeId, u32)> = self
            .bfs_dense(start_node, max_depth)
            .into_iter()
            .map(|(n, depth)| (self.original(n), depth))
            .collect();

        debug!(
            start,
            max_depth,
            found = results.len(),
            elapsed_us = timer.elapsed().as_micros() as u64,
            "bounded bfs finished"
        );
        results
    }

    // State is allocated per call so concurrent searches share nothing.
    fn bfs_dense(&self, start_node: DenseId, max_depth: u32) -> Vec<(DenseId, u32)> {
        let mut results = vec![(start_node, 0)];
        let mut visited = RoaringBitmap::new(); // To handle cycles
        let mut queue = VecDeque::new();

        visited.insert(start_node);
        if max_depth > 0 {
            queue.push_back((start_node, 0u32));
        }

        while let Some((curr, depth)) = queue.pop_front() {
            let next_depth = depth + 1;
            for &next in self.adjacency.get(curr) {
                // `insert` is false when already visited
                if visited.insert(next) {
                    results.push((next, next_depth));
                    if next_depth < max_depth {
                        queue.push_back((next, next_depth));
                    }
                }
            }
        }
        results
    }

    /// Edges whose endpoints were both reached by `bounded_bfs(start, max_depth)`,
    /// grouped by origin in discovery order.
    pub fn bfs_subgraph_edges(&self, start: NodeId, max_depth: u32) -> Vec<(NodeId, NodeId)> {
        let Some(start_node) = self.ids.dense(start) else {
            return Vec::new();
        };

        let reached = self.bfs_dense(start_node, max_depth);
        let members: RoaringBitmap = reached.iter().map(|&(n, _)| n).collect();

        let mut edges = Vec::new();
        for &(n, _) in &reached {
            for &next in self.adjacency.get(n) {
                if members.contains(next) {
                    edges.push((self.original(n), self.original(next)));
                }
            }
        }
        edges
    }

    /// Every stored edge as external pairs, grouped by origin in ascending
    /// order. Duplicates from the input are not reproduced.
    pub fn all_edges(&self) -> Vec<(NodeId, NodeId)> {
        let mut edges = Vec::with_capacity(self.adjacency.num_edges());
        for (dense_id, row) in self.adjacency.rows() {
            let origin = self.original(dense_id);
            edges.extend(row.iter().map(|&n| (origin, self.original(n))));
        }
        edges
    }

    /// Bytes committed by the CSR arrays, both id tables and the counters.
    pub fn estimated_memory_bytes(&self) -> usize {
        self.adjacency.memory_bytes() + self.ids.memory_bytes() + 2 * size_of::<usize>()
    }

    pub fn stats(&self) -> GraphStats {
        let (max_degree_node, max_degree) = self.max_degree_node();
        GraphStats {
            nodes: self.node_count(),
            edges: self.edge_count(),
            unique_edges: self.unique_edge_count(),
            memory_bytes: self.estimated_memory_bytes(),
            max_degree_node,
            max_degree,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> CsrGraph {
        GraphBuilder::from_pairs(&[(1, 2), (1, 3), (2, 3), (3, 1)])
    }

    #[test]
    fn test_neighbors_and_degree() {
        let graph = triangle();
        assert_eq!(graph.neighbors(1), vec![2, 3]);
        assert_eq!(graph.neighbors(3), vec![1]);
        assert_eq!(graph.degree(1), 2);
        assert_eq!(graph.degree(2), 1);
    }

    #[test]
    fn test_unknown_node() {
        let graph = triangle();
        assert!(graph.neighbors(42).is_empty());
        assert_eq!(graph.degree(42), 0);
        assert!(graph.bounded_bfs(42, 3).is_empty());
        assert!(graph.bfs_subgraph_edges(42, 3).is_empty());
        assert!(!graph.contains(42));
    }

    #[test]
    fn test_bfs_depth_zero_returns_start() {
        let graph = triangle();
        assert_eq!(graph.bounded_bfs(1, 0), vec![(1, 0)]);
    }

    #[test]
    fn test_bfs_layers() {
        // 0 -> 1 -> 2 -> 3, plus 0 -> 2 shortcut
        let graph = GraphBuilder::from_pairs(&[(0, 1), (1, 2), (2, 3), (0, 2)]);
        assert_eq!(graph.bounded_bfs(0, 1), vec![(0, 0), (1, 1), (2, 1)]);
        assert_eq!(graph.bounded_bfs(0, 2), vec![(0, 0), (1, 1), (2, 1), (3, 2)]);
        assert_eq!(graph.bounded_bfs(0, 100), graph.bounded_bfs(0, 2));
    }

    #[test]
    fn test_bfs_follows_direction() {
        let graph = GraphBuilder::from_pairs(&[(1, 2), (3, 2)]);
        assert_eq!(graph.bounded_bfs(2, 5), vec![(2, 0)]);
        assert_eq!(graph.bounded_bfs(3, 5), vec![(3, 0), (2, 1)]);
    }

    #[test]
    fn test_bfs_self_loop() {
        let graph = GraphBuilder::from_pairs(&[(7, 7), (7, 8)]);
        assert_eq!(graph.bounded_bfs(7, 3), vec![(7, 0), (8, 1)]);
    }

    #[test]
    fn test_max_degree_tie_goes_to_lowest_id() {
        let graph = GraphBuilder::from_pairs(&[(5, 1), (5, 2), (-3, 1), (-3, 2), (1, 2)]);
        assert_eq!(graph.max_degree_node(), (-3, 2));
    }

    #[test]
    fn test_max_degree_empty() {
        assert_eq!(CsrGraph::new().max_degree_node(), (NO_NODE, 0));
    }

    #[test]
    fn test_all_edges_is_deduplicated() {
        let graph = GraphBuilder::from_pairs(&[(2, 1), (1, 2), (2, 1), (1, 1)]);
        assert_eq!(graph.all_edges(), vec![(1, 1), (1, 2), (2, 1)]);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.unique_edge_count(), 3);
    }

    #[test]
    fn test_subgraph_edges() {
        let graph = GraphBuilder::from_pairs(&[(1, 2), (2, 3), (3, 1), (3, 4)]);
        assert_eq!(graph.bfs_subgraph_edges(1, 1), vec![(1, 2)]);
        assert_eq!(
            graph.bfs_subgraph_edges(1, 2),
            vec![(1, 2), (2, 3), (3, 1)]
        );
    }

    #[test]
    fn test_memory_grows_with_structure() {
        let empty = CsrGraph::new();
        let graph = triangle();
        assert_eq!(empty.estimated_memory_bytes(), 2 * size_of::<usize>());
        assert!(graph.estimated_memory_bytes() > empty.estimated_memory_bytes());
    }

    #[test]
    fn test_failed_load_keeps_state() {
        let mut graph = triangle();
        assert!(graph.load("/definitely/not/here/edges.txt").is_err());
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.neighbors(1), vec![2, 3]);
    }

    #[test]
    fn test_stats() {
        let stats = triangle().stats();
        assert_eq!(stats.nodes, 3);
        assert_eq!(stats.edges, 4);
        assert_eq!(stats.unique_edges, 4);
        assert_eq!((stats.max_degree_node, stats.max_degree), (1, 2));
        assert!(stats.to_string().contains("Nodes: 3"));
    }
}
