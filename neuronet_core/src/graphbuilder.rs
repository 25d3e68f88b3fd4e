use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::csr_adjacency::CsrAdjacency;
use crate::csrgraph::CsrGraph;
use crate::edgelist;
use crate::id_map::{DenseId, IdMap, NodeId};

/// Collects raw `(origin, destination)` pairs and turns them into a
/// [`CsrGraph`] in one shot.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    pairs: Vec<(NodeId, NodeId)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(edge_count: usize) -> Self {
        Self {
            pairs: Vec::with_capacity(edge_count),
        }
    }

    pub fn add_edge(&mut self, origin: NodeId, destination: NodeId) -> &mut Self {
        self.pairs.push((origin, destination));
        self
    }

    pub fn extend<I>(&mut self, pairs: I) -> &mut Self
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        self.pairs.extend(pairs);
        self
    }

    /// Number of raw pairs collected so far, duplicates included.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn build(self) -> CsrGraph {
        let start = Instant::now();
        let edge_count = self.pairs.len();

        // A. Dense ids in ascending external order
        let ids = IdMap::from_ids(self.pairs.iter().flat_map(|&(o, d)| [o, d]));

        // B. Translate pairs to dense ids. Every endpoint was registered above.
        let dense_pairs: Vec<(DenseId, DenseId)> = self
            .pairs
            .iter()
            .filter_map(|&(o, d)| Some((ids.dense(o)?, ids.dense(d)?)))
            .collect();
        drop(self.pairs);

        // C. Compact the adjacency; the temporary pair vector goes away here
        let adjacency = CsrAdjacency::from_pairs(ids.len(), &dense_pairs);
        drop(dense_pairs);

        let graph = CsrGraph::from_parts(ids, adjacency, edge_count);
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            unique_edges = graph.unique_edge_count(),
            memory_mb = graph.estimated_memory_bytes() as f64 / 1_048_576.0,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "CSR structure built"
        );
        graph
    }

    /// Shorthand for `new().extend(pairs).build()`.
    pub fn from_pairs(pairs: &[(NodeId, NodeId)]) -> CsrGraph {
        let mut builder = Self::with_capacity(pairs.len());
        builder.extend(pairs.iter().copied());
        builder.build()
    }

    /// Builds from a text edge list (see [`edgelist`]).
    pub fn from_reader<R: BufRead>(reader: R) -> Result<CsrGraph> {
        let list = edgelist::read_pairs(reader)?;
        if list.skipped > 0 {
            debug!(skipped = list.skipped, "skipped malformed edge lines");
        }
        let mut builder = Self::default();
        builder.pairs = list.pairs;
        Ok(builder.build())
    }

    /// Opens and builds from a text edge list on disk.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<CsrGraph> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading edge list");

        let file = File::open(path)
            .inspect_err(|err| warn!(path = %path.display(), error = %err, "cannot open edge list"))
            .with_context(|| format!("failed to open edge list {}", path.display()))?;

        Self::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to load edge list {}", path.display()))
    }

    /// Builds from a parquet file with `origin` and `destination` columns.
    #[cfg(feature = "parquet")]
    pub fn from_parquet<P: AsRef<Path>>(path: P) -> Result<CsrGraph> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading parquet edge list");

        let pairs = crate::parquet_source::read_pairs(path)
            .inspect_err(|err| warn!(path = %path.display(), error = %err, "cannot read parquet edge list"))?;
        let mut builder = Self::default();
        builder.pairs = pairs;
        Ok(builder.build())
    }
}
