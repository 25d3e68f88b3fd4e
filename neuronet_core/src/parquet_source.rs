//! Columnar edge lists: a parquet file with `origin` and `destination`
//! columns of any integer type.

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;

use crate::id_map::NodeId;

pub const ORIGIN_COLUMN: &str = "origin";
pub const DESTINATION_COLUMN: &str = "destination";

/// Reads every row into a pair. Rows where either side is null are skipped,
/// the same way the text reader skips unparsable lines.
pub fn read_pairs(path: &Path) -> Result<Vec<(NodeId, NodeId)>> {
    let pl_path: PlPath = PlPath::Local(Arc::from(path));
    let df: DataFrame = LazyFrame::scan_parquet(pl_path, Default::default())
        .and_then(|lf| {
            lf.select([col(ORIGIN_COLUMN), col(DESTINATION_COLUMN)])
                .collect()
        })
        .with_context(|| format!("failed to read parquet edge list {}", path.display()))?;

    let origins = df.column(ORIGIN_COLUMN)?.cast(&DataType::Int64)?;
    let destinations = df.column(DESTINATION_COLUMN)?.cast(&DataType::Int64)?;
    let o_col = origins.i64()?;
    let d_col = destinations.i64()?;

    let mut pairs: Vec<(NodeId, NodeId)> = Vec::with_capacity(o_col.len());
    for (opt_o, opt_d) in o_col.into_iter().zip(d_col.into_iter()) {
        if let (Some(origin), Some(destination)) = (opt_o, opt_d) {
            pairs.push((origin, destination));
        }
    }

    Ok(pairs)
}
