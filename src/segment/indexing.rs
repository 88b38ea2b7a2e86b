//! Per-field index bookkeeping for a sealed segment.
//!
//! The outer load path appends one entry per vector field as its index
//! finishes building; the search path only ever takes read guards. A field
//! without an entry is not yet queryable.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Result, XystonError};
use crate::index::{MetricType, VectorIndex};
use crate::schema::FieldId;

/// The queryable index handle for one vector field of a sealed segment.
#[derive(Debug, Clone)]
pub struct SealedFieldIndexing {
    /// Metric type the index was built for.
    pub metric_type: MetricType,
    /// The pre-built index serving this field.
    pub index: Arc<dyn VectorIndex>,
}

/// Registry of per-field indexes for one sealed segment.
#[derive(Debug, Default)]
pub struct SealedIndexingRecord {
    entries: RwLock<HashMap<FieldId, Arc<SealedFieldIndexing>>>,
}

impl SealedIndexingRecord {
    /// Create an empty record.
    pub fn new() -> Self {
        SealedIndexingRecord {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Register the finished index for a field, replacing any previous one.
    pub fn append_field_indexing(
        &self,
        field_id: FieldId,
        metric_type: MetricType,
        index: Arc<dyn VectorIndex>,
    ) {
        let entry = Arc::new(SealedFieldIndexing { metric_type, index });
        self.entries.write().insert(field_id, entry);
    }

    /// Check whether a field has a queryable index.
    pub fn is_ready(&self, field_id: FieldId) -> bool {
        self.entries.read().contains_key(&field_id)
    }

    /// Get the index handle for a field.
    pub fn get_field_indexing(&self, field_id: FieldId) -> Result<Arc<SealedFieldIndexing>> {
        self.entries.read().get(&field_id).cloned().ok_or_else(|| {
            XystonError::not_ready(format!("Field {field_id} has no sealed index"))
        })
    }
}
