//! Compact CSR representation of a sparse directed graph, built once from an
//! edge list and queried for adjacency, degree and depth-bounded BFS.

pub mod csr_adjacency;
pub mod csrgraph;
pub mod edgelist;
pub mod graph;
pub mod graphbuilder;
pub mod id_map;
#[cfg(feature = "parquet")]
pub mod parquet_source;

pub use csrgraph::{CsrGraph, GraphStats, NO_NODE};
pub use graph::SparseGraph;
pub use graphbuilder::GraphBuilder;
pub use id_map::{DenseId, NodeId};
