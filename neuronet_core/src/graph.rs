use anyhow::Result;
use std::path::Path;

use crate::csrgraph::CsrGraph;
use crate::id_map::NodeId;

/// Query surface shared by graph representations.
///
/// Every query takes and returns external node ids. Unknown ids are not an
/// error: they read as a node with no edges.
pub trait SparseGraph: Send + Sync {
    /// Replaces the graph with the edge list at `path`. The graph keeps its
    /// previous contents when the load fails.
    fn load(&mut self, path: &Path) -> Result<()>;

    fn neighbors(&self, node: NodeId) -> Vec<NodeId>;

    fn degree(&self, node: NodeId) -> usize;

    fn node_count(&self) -> usize;

    fn edge_count(&self) -> usize;

    fn max_degree_node(&self) -> (NodeId, usize);

    fn bounded_bfs(&self, start: NodeId, max_depth: u32) -> Vec<(NodeId, u32)>;

    fn estimated_memory_bytes(&self) -> usize;
}

impl SparseGraph for CsrGraph {
    fn load(&mut self, path: &Path) -> Result<()> {
        CsrGraph::load(self, path)
    }

    fn neighbors(&self, node: NodeId) -> Vec<NodeId> {
        CsrGraph::neighbors(self, node)
    }

    fn degree(&self, node: NodeId) -> usize {
        CsrGraph::degree(self, node)
    }

    fn node_count(&self) -> usize {
        CsrGraph::node_count(self)
    }

    fn edge_count(&self) -> usize {
        CsrGraph::edge_count(self)
    }

    fn max_degree_node(&self) -> (NodeId, usize) {
        CsrGraph::max_degree_node(self)
    }

    fn bounded_bfs(&self, start: NodeId, max_depth: u32) -> Vec<(NodeId, u32)> {
        CsrGraph::bounded_bfs(self, start, max_depth)
    }

    fn estimated_memory_bytes(&self) -> usize {
        CsrGraph::estimated_memory_bytes(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_through_trait_object() {
        let path = std::env::temp_dir().join(format!("neuronet_trait_{}.txt", std::process::id()));
        {
            let mut file = std::fs::File::create(&path).unwrap();
            writeln!(file, "1 2\n1 3\n2 3\n3 1").unwrap();
        }

        let mut graph: Box<dyn SparseGraph> = Box::new(CsrGraph::new());
        assert_eq!(graph.node_count(), 0);
        graph.load(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.neighbors(1), vec![2, 3]);
        assert_eq!(graph.degree(1), 2);
        assert_eq!(graph.max_degree_node(), (1, 2));
        assert_eq!(graph.bounded_bfs(1, 1), vec![(1, 0), (2, 1), (3, 1)]);
        assert!(graph.estimated_memory_bytes() > 0);
    }

    #[test]
    fn test_trait_load_failure() {
        let mut graph: Box<dyn SparseGraph> = Box::new(CsrGraph::new());
        assert!(graph.load(Path::new("/definitely/not/here")).is_err());
        assert_eq!(graph.node_count(), 0);
    }
}
