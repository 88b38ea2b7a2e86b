//! Search parameter maps and the canonical key vocabulary.
//!
//! Search tuning knobs travel as an untyped JSON object so that index
//! implementations can declare their own keys without this layer enumerating
//! them. The constants below are the keys this layer itself reads or writes.

use serde_json::Value;

use crate::error::{Result, XystonError};

/// Number of nearest results requested per query vector.
pub const TOPK: &str = "k";

/// Canonical metric type name, see [`crate::index::MetricType::name`].
pub const METRIC_TYPE: &str = "metric_type";

/// Number of inverted lists probed by IVF-family indexes.
pub const NPROBE: &str = "nprobe";

/// Size of the HNSW dynamic candidate list during search.
pub const EF: &str = "ef";

/// Untyped search parameter map, keyed by the constants in this module plus
/// any index-specific knobs.
pub type SearchParams = serde_json::Map<String, Value>;

/// Read a required unsigned integer parameter.
pub fn get_u64(params: &SearchParams, key: &str) -> Result<u64> {
    let value = params
        .get(key)
        .ok_or_else(|| XystonError::param_validation(format!("Missing parameter '{key}'")))?;
    value.as_u64().ok_or_else(|| {
        XystonError::param_validation(format!(
            "Parameter '{key}' must be a non-negative integer, got {value}"
        ))
    })
}

/// Read a required string parameter.
pub fn get_str<'a>(params: &'a SearchParams, key: &str) -> Result<&'a str> {
    let value = params
        .get(key)
        .ok_or_else(|| XystonError::param_validation(format!("Missing parameter '{key}'")))?;
    value.as_str().ok_or_else(|| {
        XystonError::param_validation(format!("Parameter '{key}' must be a string, got {value}"))
    })
}
