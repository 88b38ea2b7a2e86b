//! Parameter adapters validating search configurations per index type.
//!
//! Every index type declares which tuning knobs it understands and which
//! ranges it accepts for them; the adapter is the capability/bounds check
//! the invoker runs before handing a parameter map to the index. Adapters
//! are looked up through an [`AdapterRegistry`] passed in by the caller, so
//! tests can substitute fakes without touching process-wide state.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

use crate::error::{Result, XystonError};
use crate::index::params::{self, SearchParams};
use crate::index::{IndexMode, IndexType};

/// Smallest accepted top-K.
pub const MIN_TOPK: u64 = 1;
/// Largest accepted top-K.
pub const MAX_TOPK: u64 = 16384;
/// Largest accepted `nprobe` for IVF-family indexes on CPU.
pub const MAX_NPROBE: u64 = 65536;
/// Largest accepted `nprobe` for IVF-family indexes on GPU.
pub const MAX_NPROBE_GPU: u64 = 1024;
/// Largest accepted `ef` for HNSW indexes.
pub const MAX_EF: u64 = 32768;

/// Validates a search parameter map for one index type.
pub trait ConfAdapter: Send + Sync + Debug {
    /// Check that `params` is sufficient and in range for a search against
    /// an index of type `index_type` operating in `mode`.
    fn check_search(
        &self,
        params: &SearchParams,
        index_type: IndexType,
        mode: IndexMode,
    ) -> Result<()>;
}

fn check_range(key: &str, value: u64, min: u64, max: u64) -> Result<()> {
    if value < min || value > max {
        return Err(XystonError::param_validation(format!(
            "Parameter '{key}' = {value} out of range [{min}, {max}]"
        )));
    }
    Ok(())
}

/// Checks shared by every index type: top-K presence and range.
fn check_topk(params: &SearchParams) -> Result<u64> {
    let topk = params::get_u64(params, params::TOPK)?;
    check_range(params::TOPK, topk, MIN_TOPK, MAX_TOPK)?;
    Ok(topk)
}

/// Adapter for exhaustive flat indexes.
#[derive(Debug, Default)]
pub struct FlatConfAdapter;

impl ConfAdapter for FlatConfAdapter {
    fn check_search(
        &self,
        params: &SearchParams,
        _index_type: IndexType,
        _mode: IndexMode,
    ) -> Result<()> {
        check_topk(params)?;
        Ok(())
    }
}

/// Adapter for IVF-family indexes.
#[derive(Debug, Default)]
pub struct IvfConfAdapter;

impl ConfAdapter for IvfConfAdapter {
    fn check_search(
        &self,
        params: &SearchParams,
        _index_type: IndexType,
        mode: IndexMode,
    ) -> Result<()> {
        check_topk(params)?;
        let nprobe = params::get_u64(params, params::NPROBE)?;
        let max_nprobe = match mode {
            IndexMode::Cpu => MAX_NPROBE,
            IndexMode::Gpu => MAX_NPROBE_GPU,
        };
        check_range(params::NPROBE, nprobe, 1, max_nprobe)
    }
}

/// Adapter for HNSW graph indexes.
///
/// `ef` must be at least top-K or the graph cannot return enough candidates.
#[derive(Debug, Default)]
pub struct HnswConfAdapter;

impl ConfAdapter for HnswConfAdapter {
    fn check_search(
        &self,
        params: &SearchParams,
        _index_type: IndexType,
        _mode: IndexMode,
    ) -> Result<()> {
        let topk = check_topk(params)?;
        let ef = params::get_u64(params, params::EF)?;
        check_range(params::EF, ef, topk, MAX_EF)
    }
}

/// Lookup service mapping index types to their parameter adapters.
///
/// The default registry covers the in-tree index types; callers embedding
/// additional index kinds register their own adapters on top.
#[derive(Debug, Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<IndexType, Arc<dyn ConfAdapter>>,
}

impl AdapterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        AdapterRegistry {
            adapters: HashMap::new(),
        }
    }

    /// Register an adapter for an index type, replacing any existing one.
    pub fn register(&mut self, index_type: IndexType, adapter: Arc<dyn ConfAdapter>) {
        self.adapters.insert(index_type, adapter);
    }

    /// Get the adapter for an index type.
    pub fn get(&self, index_type: IndexType) -> Result<Arc<dyn ConfAdapter>> {
        self.adapters.get(&index_type).cloned().ok_or_else(|| {
            XystonError::param_validation(format!(
                "No parameter adapter registered for index type {index_type}"
            ))
        })
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        let mut registry = AdapterRegistry::new();
        registry.register(IndexType::Flat, Arc::new(FlatConfAdapter));
        registry.register(IndexType::IvfFlat, Arc::new(IvfConfAdapter));
        registry.register(IndexType::IvfPq, Arc::new(IvfConfAdapter));
        registry.register(IndexType::Hnsw, Arc::new(HnswConfAdapter));
        registry
    }
}
