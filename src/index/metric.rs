//! Metric types a vector index can be built for.

use serde::{Deserialize, Serialize};

use crate::error::{Result, XystonError};

/// Distance/similarity function an index was built for.
///
/// The canonical string names returned by [`MetricType::name`] are the values
/// carried in search parameter maps, so they must stay stable across
/// releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MetricType {
    /// Squared Euclidean distance (lower is closer).
    #[default]
    L2,
    /// Inner product similarity (higher is closer).
    Ip,
    /// Hamming distance over binary vectors.
    Hamming,
    /// Jaccard distance over binary vectors.
    Jaccard,
    /// Tanimoto distance over binary vectors.
    Tanimoto,
}

impl MetricType {
    /// Get the canonical name of this metric type.
    pub fn name(&self) -> &'static str {
        match self {
            MetricType::L2 => "L2",
            MetricType::Ip => "IP",
            MetricType::Hamming => "HAMMING",
            MetricType::Jaccard => "JACCARD",
            MetricType::Tanimoto => "TANIMOTO",
        }
    }

    /// Parse a metric type from its canonical name.
    pub fn parse_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "L2" => Ok(MetricType::L2),
            "IP" => Ok(MetricType::Ip),
            "HAMMING" => Ok(MetricType::Hamming),
            "JACCARD" => Ok(MetricType::Jaccard),
            "TANIMOTO" => Ok(MetricType::Tanimoto),
            _ => Err(XystonError::invalid_argument(format!(
                "Unknown metric type: {s}"
            ))),
        }
    }

    /// Whether this metric operates on binary vectors.
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            MetricType::Hamming | MetricType::Jaccard | MetricType::Tanimoto
        )
    }
}

impl std::fmt::Display for MetricType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
