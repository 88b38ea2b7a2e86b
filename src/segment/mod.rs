//! Sealed-segment search: exclusion masks, index bookkeeping, invocation.
//!
//! A sealed segment is an immutable, fully-indexed partition of a
//! collection. This module owns the query path against one such segment:
//! [`bitset`] merges per-chunk visibility into the exclusion mask an index
//! consumes, [`indexing`] tracks which fields have a queryable index, and
//! [`search`] validates and runs the actual top-K invocation.

pub mod bitset;
pub mod indexing;
pub mod search;

pub use bitset::{ChunkedBitset, ExclusionMask, MASK_ALIGNMENT, assemble_exclusion_mask};
pub use indexing::{SealedFieldIndexing, SealedIndexingRecord};
pub use search::{NO_ROUNDING, SearchInfo, SearchResult, round_distances, search_sealed};
