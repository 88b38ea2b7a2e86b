//! Capability interfaces for pre-built vector indexes.
//!
//! Sealed-segment search never branches on a concrete index kind. Everything
//! it needs from an index — its declared type, its operating mode, and a
//! top-K query over a batch of vectors — is expressed by the [`VectorIndex`]
//! trait, and any graph, quantized, or flat implementation is a variant
//! behind it.

pub mod adapter;
pub mod metric;
pub mod params;

pub use adapter::{AdapterRegistry, ConfAdapter};
pub use metric::MetricType;
pub use params::SearchParams;

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::error::{Result, XystonError};
use crate::segment::bitset::ExclusionMask;

/// Declared type of a vector index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexType {
    /// Exhaustive scan over raw vectors.
    Flat,
    /// Inverted-file index over raw vectors.
    IvfFlat,
    /// Inverted-file index with product quantization.
    IvfPq,
    /// Hierarchical navigable small-world graph.
    Hnsw,
}

impl IndexType {
    /// Get the canonical name of this index type.
    pub fn name(&self) -> &'static str {
        match self {
            IndexType::Flat => "FLAT",
            IndexType::IvfFlat => "IVF_FLAT",
            IndexType::IvfPq => "IVF_PQ",
            IndexType::Hnsw => "HNSW",
        }
    }

    /// Parse an index type from its canonical name.
    pub fn parse_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "FLAT" => Ok(IndexType::Flat),
            "IVF_FLAT" => Ok(IndexType::IvfFlat),
            "IVF_PQ" => Ok(IndexType::IvfPq),
            "HNSW" => Ok(IndexType::Hnsw),
            _ => Err(XystonError::invalid_argument(format!(
                "Unknown index type: {s}"
            ))),
        }
    }
}

impl std::fmt::Display for IndexType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Index-specific execution mode affecting which parameters are valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum IndexMode {
    /// Host CPU execution.
    #[default]
    Cpu,
    /// Accelerator-resident execution.
    Gpu,
}

impl IndexMode {
    /// Get the canonical name of this mode.
    pub fn name(&self) -> &'static str {
        match self {
            IndexMode::Cpu => "CPU",
            IndexMode::Gpu => "GPU",
        }
    }
}

/// A borrowed batch of query vectors, row-major.
#[derive(Debug, Clone, Copy)]
pub struct Dataset<'a> {
    data: &'a [f32],
    num_rows: usize,
    dim: usize,
}

impl<'a> Dataset<'a> {
    /// Wrap a raw query buffer, validating its length against the declared
    /// row count and dimensionality.
    pub fn new(data: &'a [f32], num_rows: usize, dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(XystonError::invalid_argument(
                "Dataset dimension must be non-zero",
            ));
        }
        let expected = num_rows * dim;
        if data.len() != expected {
            return Err(XystonError::invalid_argument(format!(
                "Query buffer holds {} values, expected {expected} ({num_rows} rows x {dim} dims)",
                data.len()
            )));
        }
        Ok(Dataset {
            data,
            num_rows,
            dim,
        })
    }

    /// Get the raw row-major buffer.
    pub fn data(&self) -> &'a [f32] {
        self.data
    }

    /// Get the number of rows (query vectors).
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Get the vector dimensionality.
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Get one row as a slice.
    pub fn row(&self, i: usize) -> &'a [f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }
}

/// Raw output of a top-K index query.
///
/// Both arrays have length `num_queries * topk`, row-major by query, ranked
/// closest-first within each row by the index's own tie-break policy.
/// Indexes that find fewer than top-K admissible candidates for a query pad
/// the remaining slots with identifier `-1` and distance `f32::INFINITY`.
#[derive(Debug, Clone, Default)]
pub struct QueryOutput {
    /// Matched vector identifiers.
    pub ids: Vec<i64>,
    /// Distances corresponding to `ids`.
    pub distances: Vec<f32>,
}

/// Capability interface of a pre-built, immutable vector index.
///
/// Implementations must be safe to query concurrently; sealed indexes are
/// read-only once built.
pub trait VectorIndex: Send + Sync + Debug {
    /// Get the declared type of this index.
    fn index_type(&self) -> IndexType;

    /// Get the operating mode this index was loaded in.
    fn index_mode(&self) -> IndexMode;

    /// Execute a top-K search for every row of `dataset`.
    ///
    /// Candidates whose bit is set in `mask` are skipped. The parameter map
    /// has already been validated by this index type's [`ConfAdapter`].
    fn query(
        &self,
        dataset: &Dataset<'_>,
        params: &SearchParams,
        mask: &ExclusionMask,
    ) -> Result<QueryOutput>;
}
