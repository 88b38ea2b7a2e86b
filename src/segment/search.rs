//! Top-K similarity search against one field of a sealed segment.
//!
//! This is the per-segment unit of work inside the engine's search fan-out:
//! validate the request against the field's index, merge the effective
//! parameter map, assemble the exclusion mask, run the opaque index query,
//! and normalize its raw output into the caller's result buffer.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{Result, XystonError};
use crate::index::adapter::AdapterRegistry;
use crate::index::params::{self, SearchParams};
use crate::index::{Dataset, MetricType};
use crate::schema::{FieldId, Schema};
use crate::segment::bitset::{ChunkedBitset, assemble_exclusion_mask};
use crate::segment::indexing::SealedIndexingRecord;

/// Sentinel `round_decimal` value disabling distance rounding.
pub const NO_ROUNDING: i32 = -1;

/// Per-call search configuration for one vector field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchInfo {
    /// Target vector field.
    pub field_id: FieldId,
    /// Number of nearest results requested per query vector.
    pub topk: usize,
    /// Decimal digits distances are rounded to, or [`NO_ROUNDING`].
    pub round_decimal: i32,
    /// Metric type the caller expects; must match the field's index.
    pub metric_type: MetricType,
    /// Caller-supplied tuning knobs. Top-K and metric type are force-set
    /// from this struct and the field's index before validation.
    #[serde(default)]
    pub search_params: SearchParams,
}

/// Caller-owned result buffer populated by [`search_sealed`].
///
/// `ids` and `distances` are parallel arrays of length
/// `num_queries * topk`, row-major by query, ranked closest-first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    /// Matched vector identifiers.
    pub ids: Vec<i64>,
    /// Distances corresponding to `ids`.
    pub distances: Vec<f32>,
    /// Number of query vectors in the batch.
    pub num_queries: usize,
    /// Results recorded per query.
    pub topk: usize,
}

impl SearchResult {
    /// Create an empty result buffer.
    pub fn new() -> Self {
        SearchResult::default()
    }

    /// Get the ids and distances for one query row.
    ///
    /// # Panics
    ///
    /// Panics if `query` is not below `num_queries`.
    pub fn query_row(&self, query: usize) -> (&[i64], &[f32]) {
        assert!(query < self.num_queries, "query {query} beyond batch");
        let start = query * self.topk;
        let end = start + self.topk;
        (&self.ids[start..end], &self.distances[start..end])
    }
}

/// Round every distance to `decimal` fractional digits.
///
/// Each value `x` becomes `(x * 10^decimal).round() / 10^decimal`, with
/// ties rounded half away from zero (`f32::round`). The rule is pinned so
/// repeated calls over identical input reproduce identical output; applying
/// it twice at the same precision is a fixed point. Negative `decimal`
/// values (the [`NO_ROUNDING`] sentinel) leave the slice untouched.
pub fn round_distances(distances: &mut [f32], decimal: i32) {
    if decimal < 0 {
        return;
    }
    let multiplier = 10f32.powi(decimal);
    for distance in distances.iter_mut() {
        *distance = (*distance * multiplier).round() / multiplier;
    }
}

/// Execute a top-K similarity search against one field's sealed index.
///
/// Preconditions are checked fail-fast, in order: the field must exist in
/// `schema`, its index must be ready in `record`, the index's configured
/// metric must equal `search_info.metric_type`, and the merged parameter
/// map must pass the index type's adapter from `adapters`. Any violation
/// propagates as a typed error and leaves `result` untouched; `result` is
/// only resized and populated after the index query has succeeded.
#[allow(clippy::too_many_arguments)]
pub fn search_sealed(
    schema: &Schema,
    record: &SealedIndexingRecord,
    adapters: &AdapterRegistry,
    search_info: &SearchInfo,
    query_data: &[f32],
    num_queries: usize,
    bitsets: &ChunkedBitset,
    segment_id: i64,
    result: &mut SearchResult,
) -> Result<()> {
    let topk = search_info.topk;
    debug!(
        "sealed search start: segment_id={segment_id}, field_id={}, nq={num_queries}, topk={topk}",
        search_info.field_id
    );

    let field = schema.field(search_info.field_id)?;
    let dim = field.dim();

    if !record.is_ready(search_info.field_id) {
        warn!(
            "sealed search rejected: segment_id={segment_id}, field '{}' not ready",
            field.name()
        );
        return Err(XystonError::not_ready(format!(
            "Field '{}' has no queryable index in segment {segment_id}",
            field.name()
        )));
    }
    let indexing = record.get_field_indexing(search_info.field_id)?;

    if indexing.metric_type != search_info.metric_type {
        return Err(XystonError::metric_mismatch(format!(
            "Field '{}' index built for {}, search requested {}",
            field.name(),
            indexing.metric_type,
            search_info.metric_type
        )));
    }

    let dataset = Dataset::new(query_data, num_queries, dim)?;

    // The field's index is authoritative for top-K and metric name.
    let mut conf = search_info.search_params.clone();
    conf.insert(params::TOPK.to_string(), json!(topk));
    conf.insert(
        params::METRIC_TYPE.to_string(),
        json!(indexing.metric_type.name()),
    );

    let index_type = indexing.index.index_type();
    let adapter = adapters.get(index_type)?;
    if let Err(err) = adapter.check_search(&conf, index_type, indexing.index.index_mode()) {
        warn!("sealed search rejected: segment_id={segment_id}, {err}");
        return Err(err);
    }

    let mask = assemble_exclusion_mask(bitsets)?;
    let output = indexing.index.query(&dataset, &conf, &mask)?;

    let total_num = num_queries * topk;
    if output.ids.len() != total_num || output.distances.len() != total_num {
        return Err(XystonError::index(format!(
            "Index returned {} ids / {} distances, expected {total_num}",
            output.ids.len(),
            output.distances.len()
        )));
    }

    let mut distances = output.distances;
    if search_info.round_decimal != NO_ROUNDING {
        round_distances(&mut distances, search_info.round_decimal);
    }

    result.ids = output.ids;
    result.distances = distances;
    result.num_queries = num_queries;
    result.topk = topk;

    debug!("sealed search done: segment_id={segment_id}, hits={total_num}");
    Ok(())
}
