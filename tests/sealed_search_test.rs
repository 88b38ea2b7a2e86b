use std::sync::Arc;

use bit_vec::BitVec;

use xyston::error::{Result, XystonError};
use xyston::index::adapter::AdapterRegistry;
use xyston::index::params::{self, SearchParams};
use xyston::index::{Dataset, IndexMode, IndexType, MetricType, QueryOutput, VectorIndex};
use xyston::schema::{DataType, FieldEntry, Schema};
use xyston::segment::bitset::{ChunkedBitset, ExclusionMask};
use xyston::segment::indexing::SealedIndexingRecord;
use xyston::segment::search::{NO_ROUNDING, SearchInfo, SearchResult, search_sealed};

const FIELD_ID: u64 = 100;
const DIM: usize = 4;

/// Brute-force scan index used to exercise the sealed search path without a
/// real ANN library. Honors the exclusion mask and pads short rows with the
/// sentinel id -1 / infinite distance.
#[derive(Debug)]
struct FlatScanIndex {
    vectors: Vec<f32>,
    dim: usize,
}

impl FlatScanIndex {
    fn new(vectors: Vec<f32>, dim: usize) -> Self {
        assert_eq!(vectors.len() % dim, 0);
        FlatScanIndex { vectors, dim }
    }

    fn num_vectors(&self) -> usize {
        self.vectors.len() / self.dim
    }
}

impl VectorIndex for FlatScanIndex {
    fn index_type(&self) -> IndexType {
        IndexType::Flat
    }

    fn index_mode(&self) -> IndexMode {
        IndexMode::Cpu
    }

    fn query(
        &self,
        dataset: &Dataset<'_>,
        search_params: &SearchParams,
        mask: &ExclusionMask,
    ) -> Result<QueryOutput> {
        let topk = params::get_u64(search_params, params::TOPK)? as usize;
        let mut output = QueryOutput::default();

        for q in 0..dataset.num_rows() {
            let query = dataset.row(q);
            let mut hits: Vec<(f32, i64)> = (0..self.num_vectors())
                .filter(|&i| !(i < mask.num_bits() && mask.is_excluded(i)))
                .map(|i| {
                    let candidate = &self.vectors[i * self.dim..(i + 1) * self.dim];
                    let distance: f32 = query
                        .iter()
                        .zip(candidate.iter())
                        .map(|(a, b)| (a - b) * (a - b))
                        .sum();
                    (distance, i as i64)
                })
                .collect();
            hits.sort_by(|a, b| a.partial_cmp(b).unwrap());
            hits.truncate(topk);
            while hits.len() < topk {
                hits.push((f32::INFINITY, -1));
            }
            for (distance, id) in hits {
                output.ids.push(id);
                output.distances.push(distance);
            }
        }
        Ok(output)
    }
}

/// Index stub that violates the output-length contract.
#[derive(Debug)]
struct ShortOutputIndex;

impl VectorIndex for ShortOutputIndex {
    fn index_type(&self) -> IndexType {
        IndexType::Flat
    }

    fn index_mode(&self) -> IndexMode {
        IndexMode::Cpu
    }

    fn query(
        &self,
        _dataset: &Dataset<'_>,
        _params: &SearchParams,
        _mask: &ExclusionMask,
    ) -> Result<QueryOutput> {
        Ok(QueryOutput {
            ids: vec![0],
            distances: vec![0.0],
        })
    }
}

fn test_schema() -> Schema {
    let mut schema = Schema::new();
    schema
        .add_field(FIELD_ID, FieldEntry::new("embedding", DataType::FloatVector, DIM))
        .unwrap();
    schema
}

/// 16 unit-ish vectors: candidate i is (i, 0, 0, 0).
fn test_vectors() -> Vec<f32> {
    let mut vectors = Vec::with_capacity(16 * DIM);
    for i in 0..16 {
        vectors.extend_from_slice(&[i as f32, 0.0, 0.0, 0.0]);
    }
    vectors
}

fn ready_record(metric: MetricType) -> SealedIndexingRecord {
    let record = SealedIndexingRecord::new();
    record.append_field_indexing(
        FIELD_ID,
        metric,
        Arc::new(FlatScanIndex::new(test_vectors(), DIM)),
    );
    record
}

fn all_visible_bitsets() -> ChunkedBitset {
    ChunkedBitset::from_chunks(vec![
        BitVec::from_elem(8, true),
        BitVec::from_elem(8, true),
    ])
}

fn search_info(topk: usize) -> SearchInfo {
    SearchInfo {
        field_id: FIELD_ID,
        topk,
        round_decimal: NO_ROUNDING,
        metric_type: MetricType::L2,
        search_params: SearchParams::new(),
    }
}

#[test]
fn test_search_sealed_end_to_end() {
    let schema = test_schema();
    let record = ready_record(MetricType::L2);
    let adapters = AdapterRegistry::default();

    // Two queries sitting on candidates 0 and 15.
    let query_data = vec![0.0, 0.0, 0.0, 0.0, 15.0, 0.0, 0.0, 0.0];
    let mut result = SearchResult::new();

    search_sealed(
        &schema,
        &record,
        &adapters,
        &search_info(3),
        &query_data,
        2,
        &all_visible_bitsets(),
        7,
        &mut result,
    )
    .unwrap();

    assert_eq!(result.num_queries, 2);
    assert_eq!(result.topk, 3);
    assert_eq!(result.ids.len(), 6);
    assert_eq!(result.distances.len(), 6);

    let (ids, distances) = result.query_row(0);
    assert_eq!(ids, &[0, 1, 2]);
    assert_eq!(distances, &[0.0, 1.0, 4.0]);

    let (ids, distances) = result.query_row(1);
    assert_eq!(ids, &[15, 14, 13]);
    assert_eq!(distances, &[0.0, 1.0, 4.0]);
}

#[test]
fn test_search_skips_excluded_candidates() {
    let schema = test_schema();
    let record = ready_record(MetricType::L2);
    let adapters = AdapterRegistry::default();

    // Hide candidates 0..8 (first chunk all zero); the best visible match
    // for a query at the origin becomes candidate 8.
    let bitsets = ChunkedBitset::from_chunks(vec![
        BitVec::from_elem(8, false),
        BitVec::from_elem(8, true),
    ]);

    let query_data = vec![0.0; DIM];
    let mut result = SearchResult::new();

    search_sealed(
        &schema,
        &record,
        &adapters,
        &search_info(3),
        &query_data,
        1,
        &bitsets,
        7,
        &mut result,
    )
    .unwrap();

    let (ids, _) = result.query_row(0);
    assert_eq!(ids, &[8, 9, 10]);
}

#[test]
fn test_search_pads_when_too_few_visible() {
    let schema = test_schema();
    let record = ready_record(MetricType::L2);
    let adapters = AdapterRegistry::default();

    // Only candidates 0 and 1 visible.
    let mut first = BitVec::from_elem(8, false);
    first.set(0, true);
    first.set(1, true);
    let bitsets = ChunkedBitset::from_chunks(vec![first, BitVec::from_elem(8, false)]);

    let query_data = vec![0.0; DIM];
    let mut result = SearchResult::new();

    search_sealed(
        &schema,
        &record,
        &adapters,
        &search_info(4),
        &query_data,
        1,
        &bitsets,
        7,
        &mut result,
    )
    .unwrap();

    let (ids, distances) = result.query_row(0);
    assert_eq!(ids, &[0, 1, -1, -1]);
    assert_eq!(&distances[..2], &[0.0, 1.0]);
    assert!(distances[2].is_infinite());
    assert!(distances[3].is_infinite());
}

#[test]
fn test_search_applies_rounding() {
    let schema = test_schema();
    let adapters = AdapterRegistry::default();

    // Candidate distances to the query are 0.3249 and 4.2025 before rounding.
    let record = SealedIndexingRecord::new();
    record.append_field_indexing(
        FIELD_ID,
        MetricType::L2,
        Arc::new(FlatScanIndex::new(
            vec![0.57, 0.0, 0.0, 0.0, 2.05, 0.0, 0.0, 0.0],
            DIM,
        )),
    );

    let mut info = search_info(2);
    info.round_decimal = 2;
    let query_data = vec![0.0; DIM];
    let mut result = SearchResult::new();

    search_sealed(
        &schema,
        &record,
        &adapters,
        &info,
        &query_data,
        1,
        &ChunkedBitset::from_chunks(vec![BitVec::from_elem(2, true)]),
        7,
        &mut result,
    )
    .unwrap();

    let (_, distances) = result.query_row(0);
    assert!((distances[0] - 0.32).abs() < 1e-6);
    assert!((distances[1] - 4.2).abs() < 1e-6);
}

#[test]
fn test_search_not_ready_is_typed_and_leaves_result_untouched() {
    let schema = test_schema();
    let record = SealedIndexingRecord::new();
    let adapters = AdapterRegistry::default();

    let query_data = vec![0.0; DIM];
    let mut result = SearchResult::new();

    let err = search_sealed(
        &schema,
        &record,
        &adapters,
        &search_info(3),
        &query_data,
        1,
        &all_visible_bitsets(),
        7,
        &mut result,
    )
    .unwrap_err();

    assert!(matches!(err, XystonError::IndexNotReady(_)));
    assert!(result.ids.is_empty());
    assert!(result.distances.is_empty());
    assert_eq!(result.num_queries, 0);
}

#[test]
fn test_search_metric_mismatch() {
    let schema = test_schema();
    let record = ready_record(MetricType::Ip);
    let adapters = AdapterRegistry::default();

    let query_data = vec![0.0; DIM];
    let mut result = SearchResult::new();

    let err = search_sealed(
        &schema,
        &record,
        &adapters,
        &search_info(3),
        &query_data,
        1,
        &all_visible_bitsets(),
        7,
        &mut result,
    )
    .unwrap_err();

    assert!(matches!(err, XystonError::MetricMismatch(_)));
}

#[test]
fn test_search_rejects_out_of_range_topk() {
    let schema = test_schema();
    let record = ready_record(MetricType::L2);
    let adapters = AdapterRegistry::default();

    let query_data = vec![0.0; DIM];
    let mut result = SearchResult::new();

    let err = search_sealed(
        &schema,
        &record,
        &adapters,
        &search_info(0),
        &query_data,
        1,
        &all_visible_bitsets(),
        7,
        &mut result,
    )
    .unwrap_err();

    assert!(matches!(err, XystonError::ParameterValidation(_)));
    assert!(result.ids.is_empty());
}

#[test]
fn test_search_requires_registered_adapter() {
    let schema = test_schema();
    let record = ready_record(MetricType::L2);
    let adapters = AdapterRegistry::new();

    let query_data = vec![0.0; DIM];
    let mut result = SearchResult::new();

    let err = search_sealed(
        &schema,
        &record,
        &adapters,
        &search_info(3),
        &query_data,
        1,
        &all_visible_bitsets(),
        7,
        &mut result,
    )
    .unwrap_err();

    assert!(matches!(err, XystonError::ParameterValidation(_)));
}

#[test]
fn test_search_validates_query_buffer_length() {
    let schema = test_schema();
    let record = ready_record(MetricType::L2);
    let adapters = AdapterRegistry::default();

    let query_data = vec![0.0; DIM + 1];
    let mut result = SearchResult::new();

    let err = search_sealed(
        &schema,
        &record,
        &adapters,
        &search_info(3),
        &query_data,
        1,
        &all_visible_bitsets(),
        7,
        &mut result,
    )
    .unwrap_err();

    assert!(matches!(err, XystonError::InvalidArgument(_)));
}

#[test]
fn test_search_rejects_short_index_output() {
    let schema = test_schema();
    let adapters = AdapterRegistry::default();
    let record = SealedIndexingRecord::new();
    record.append_field_indexing(FIELD_ID, MetricType::L2, Arc::new(ShortOutputIndex));

    let query_data = vec![0.0; DIM];
    let mut result = SearchResult::new();

    let err = search_sealed(
        &schema,
        &record,
        &adapters,
        &search_info(3),
        &query_data,
        1,
        &all_visible_bitsets(),
        7,
        &mut result,
    )
    .unwrap_err();

    assert!(matches!(err, XystonError::Index(_)));
    assert!(result.ids.is_empty());
}

#[test]
fn test_search_bitset_contract_violation_propagates() {
    let schema = test_schema();
    let record = ready_record(MetricType::L2);
    let adapters = AdapterRegistry::default();

    // Two chunks, second one ragged (12 bits).
    let mut ragged = BitVec::from_elem(12, true);
    ragged.set(3, false);
    let bitsets = ChunkedBitset::from_chunks(vec![BitVec::from_elem(8, true), ragged]);

    let query_data = vec![0.0; DIM];
    let mut result = SearchResult::new();

    let err = search_sealed(
        &schema,
        &record,
        &adapters,
        &search_info(3),
        &query_data,
        1,
        &bitsets,
        7,
        &mut result,
    )
    .unwrap_err();

    assert!(matches!(err, XystonError::BitsetContract(_)));
}

#[test]
fn test_search_repeated_calls_are_reproducible() {
    let schema = test_schema();
    let adapters = AdapterRegistry::default();

    let mut rng_vectors = Vec::with_capacity(64 * DIM);
    let mut rng = rand::rng();
    for _ in 0..64 * DIM {
        rng_vectors.push(rand::Rng::random_range(&mut rng, -1.0f32..1.0));
    }
    let record = SealedIndexingRecord::new();
    record.append_field_indexing(
        FIELD_ID,
        MetricType::L2,
        Arc::new(FlatScanIndex::new(rng_vectors, DIM)),
    );

    let bitsets = ChunkedBitset::from_chunks(vec![BitVec::from_elem(64, true)]);
    let mut info = search_info(5);
    info.round_decimal = 3;
    let query_data = vec![0.25, -0.5, 0.75, -0.125];

    let mut first = SearchResult::new();
    let mut second = SearchResult::new();
    for result in [&mut first, &mut second] {
        search_sealed(
            &schema,
            &record,
            &adapters,
            &info,
            &query_data,
            1,
            &bitsets,
            7,
            result,
        )
        .unwrap();
    }

    assert_eq!(first.ids, second.ids);
    let first_bits: Vec<u32> = first.distances.iter().map(|d| d.to_bits()).collect();
    let second_bits: Vec<u32> = second.distances.iter().map(|d| d.to_bits()).collect();
    assert_eq!(first_bits, second_bits);
}
