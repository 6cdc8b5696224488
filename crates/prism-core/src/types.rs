//! Core types for PRISM diversity analysis.
//!
//! Feature types, metrics and calculation modes are closed enums. String
//! tags coming from the CLI or configuration files are parsed once, and
//! feature/metric pairs are resolved into a [`DistanceKind`] before any
//! structure is touched.

use crate::errors::{PrismError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fingerprint length used by the distance engine.
pub const DEFAULT_FINGERPRINT_BITS: usize = 1024;

/// Morgan radius used by the distance engine (ECFP4).
pub const DEFAULT_FINGERPRINT_RADIUS: u32 = 2;

// ============================================================================
// Fingerprints
// ============================================================================

/// Fixed-length bit vector fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitVector {
    words: Vec<u64>,
    nbits: usize,
}

impl BitVector {
    /// Creates an all-zero bit vector of `nbits` bits.
    pub fn new(nbits: usize) -> Self {
        Self {
            words: vec![0u64; nbits.div_ceil(64)],
            nbits,
        }
    }

    /// Creates a bit vector with the given positions set.
    pub fn from_positions(nbits: usize, positions: impl IntoIterator<Item = usize>) -> Self {
        let mut bv = Self::new(nbits);
        for pos in positions {
            bv.set(pos);
        }
        bv
    }

    /// Sets a bit. Positions are folded into the vector length.
    pub fn set(&mut self, pos: usize) {
        if self.nbits == 0 {
            return;
        }
        let pos = pos % self.nbits;
        self.words[pos / 64] |= 1u64 << (pos % 64);
    }

    /// Reads a bit. Positions are folded into the vector length.
    pub fn get(&self, pos: usize) -> bool {
        if self.nbits == 0 {
            return false;
        }
        let pos = pos % self.nbits;
        (self.words[pos / 64] >> (pos % 64)) & 1 == 1
    }

    /// Number of set bits.
    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Length in bits.
    pub fn nbits(&self) -> usize {
        self.nbits
    }

    /// Tanimoto similarity, `|a ∧ b| / |a ∨ b|`.
    ///
    /// Two empty fingerprints are identical (similarity 1.0).
    pub fn tanimoto(&self, other: &BitVector) -> f64 {
        debug_assert_eq!(self.nbits, other.nbits, "fingerprints must have the same size");

        let mut and_count = 0u32;
        let mut or_count = 0u32;
        for (w1, w2) in self.words.iter().zip(other.words.iter()) {
            and_count += (w1 & w2).count_ones();
            or_count += (w1 | w2).count_ones();
        }

        if or_count == 0 {
            return 1.0;
        }
        and_count as f64 / or_count as f64
    }

    /// Tanimoto distance, `1 - tanimoto`.
    pub fn tanimoto_distance(&self, other: &BitVector) -> f64 {
        1.0 - self.tanimoto(other)
    }
}

// ============================================================================
// Feature types and metrics
// ============================================================================

/// How structures are featurized before comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureType {
    /// Morgan/ECFP bit-vector fingerprints
    Ecfp,
    /// Numeric descriptor vectors
    Descriptors,
    /// MOE descriptor vectors (same code path as `Descriptors`)
    Moe,
}

impl FromStr for FeatureType {
    type Err = PrismError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ecfp" => Ok(FeatureType::Ecfp),
            "descriptors" => Ok(FeatureType::Descriptors),
            "moe" => Ok(FeatureType::Moe),
            other => Err(PrismError::config(format!("unknown feature type '{}'", other))),
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeatureType::Ecfp => "ecfp",
            FeatureType::Descriptors => "descriptors",
            FeatureType::Moe => "moe",
        };
        f.write_str(name)
    }
}

/// Distance functions over numeric feature vectors.
///
/// Names follow the scipy `pdist`/`cdist` vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VectorMetric {
    Euclidean,
    SqEuclidean,
    Cityblock,
    Chebyshev,
    /// Minkowski distance of order `p`
    Minkowski { p: f64 },
    Cosine,
    Correlation,
    Canberra,
    BrayCurtis,
}

impl VectorMetric {
    /// Overrides the Minkowski order; other metrics are returned unchanged.
    pub fn with_minkowski_p(self, p: f64) -> Self {
        match self {
            VectorMetric::Minkowski { .. } => VectorMetric::Minkowski { p },
            other => other,
        }
    }

    /// Checks metric parameters.
    pub fn validate(&self) -> Result<()> {
        if let VectorMetric::Minkowski { p } = self {
            if !(p.is_finite() && *p >= 1.0) {
                return Err(PrismError::config(format!(
                    "minkowski order p must be >= 1, got {}",
                    p
                )));
            }
        }
        Ok(())
    }
}

impl FromStr for VectorMetric {
    type Err = PrismError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "euclidean" => Ok(VectorMetric::Euclidean),
            "sqeuclidean" => Ok(VectorMetric::SqEuclidean),
            "cityblock" | "manhattan" => Ok(VectorMetric::Cityblock),
            "chebyshev" => Ok(VectorMetric::Chebyshev),
            "minkowski" => Ok(VectorMetric::Minkowski { p: 2.0 }),
            "cosine" => Ok(VectorMetric::Cosine),
            "correlation" => Ok(VectorMetric::Correlation),
            "canberra" => Ok(VectorMetric::Canberra),
            "braycurtis" => Ok(VectorMetric::BrayCurtis),
            other => Err(PrismError::config(format!("unknown distance metric '{}'", other))),
        }
    }
}

impl fmt::Display for VectorMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorMetric::Euclidean => f.write_str("euclidean"),
            VectorMetric::SqEuclidean => f.write_str("sqeuclidean"),
            VectorMetric::Cityblock => f.write_str("cityblock"),
            VectorMetric::Chebyshev => f.write_str("chebyshev"),
            VectorMetric::Minkowski { p } => write!(f, "minkowski(p={})", p),
            VectorMetric::Cosine => f.write_str("cosine"),
            VectorMetric::Correlation => f.write_str("correlation"),
            VectorMetric::Canberra => f.write_str("canberra"),
            VectorMetric::BrayCurtis => f.write_str("braycurtis"),
        }
    }
}

/// Requested distance metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// 1 - Tanimoto similarity of fingerprints
    Tanimoto,
    /// Maximum-common-substructure distance
    Mcs,
    /// Any vector metric over descriptor vectors
    Vector(VectorMetric),
}

impl FromStr for Metric {
    type Err = PrismError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tanimoto" => Ok(Metric::Tanimoto),
            "mcs" => Ok(Metric::Mcs),
            other => other.parse::<VectorMetric>().map(Metric::Vector),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Tanimoto => f.write_str("tanimoto"),
            Metric::Mcs => f.write_str("mcs"),
            Metric::Vector(m) => m.fmt(f),
        }
    }
}

/// A resolved, supported feature/metric calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DistanceKind {
    /// Tanimoto distance on Morgan fingerprints
    EcfpTanimoto,
    /// Maximum-common-substructure distance, normalised by atom count
    Mcs,
    /// Vector metric over descriptor vectors
    Descriptor(VectorMetric),
}

impl DistanceKind {
    /// Resolves a feature type and metric into a supported calculation.
    ///
    /// `mcs` works with every feature type since it compares molecules
    /// directly; fingerprints only support Tanimoto; descriptor vectors only
    /// support vector metrics.
    pub fn resolve(feature: FeatureType, metric: Metric) -> Result<Self> {
        match (feature, metric) {
            (FeatureType::Ecfp, Metric::Tanimoto) => Ok(DistanceKind::EcfpTanimoto),
            (_, Metric::Mcs) => Ok(DistanceKind::Mcs),
            (FeatureType::Descriptors | FeatureType::Moe, Metric::Vector(m)) => {
                m.validate()?;
                Ok(DistanceKind::Descriptor(m))
            }
            (feature, metric) => Err(PrismError::unsupported(feature, metric)),
        }
    }
}

impl fmt::Display for DistanceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceKind::EcfpTanimoto => f.write_str("ecfp/tanimoto"),
            DistanceKind::Mcs => f.write_str("mcs"),
            DistanceKind::Descriptor(m) => write!(f, "descriptors/{}", m),
        }
    }
}

/// How a distance matrix or vector is reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalcMode {
    /// The `k` smallest distances
    #[default]
    Nearest,
    /// The `k` largest distances
    Farthest,
    /// Mean of the `k` smallest distances
    Average,
    /// No reduction
    All,
}

impl FromStr for CalcMode {
    type Err = PrismError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" => Ok(CalcMode::Nearest),
            "farthest" => Ok(CalcMode::Farthest),
            "average" => Ok(CalcMode::Average),
            "all" => Ok(CalcMode::All),
            other => Err(PrismError::config(format!("unknown calculation mode '{}'", other))),
        }
    }
}

impl fmt::Display for CalcMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CalcMode::Nearest => "nearest",
            CalcMode::Farthest => "farthest",
            CalcMode::Average => "average",
            CalcMode::All => "all",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Distance containers
// ============================================================================

/// Raw engine output: a matrix for collection comparisons, a vector when a
/// single molecule is compared against a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distances {
    Matrix(Array2<f64>),
    Vector(Array1<f64>),
}

impl Distances {
    /// Number of rows (1 for a vector).
    pub fn rows(&self) -> usize {
        match self {
            Distances::Matrix(m) => m.nrows(),
            Distances::Vector(_) => 1,
        }
    }

    /// Number of compared elements per row.
    pub fn cols(&self) -> usize {
        match self {
            Distances::Matrix(m) => m.ncols(),
            Distances::Vector(v) => v.len(),
        }
    }

    pub fn as_matrix(&self) -> Option<&Array2<f64>> {
        match self {
            Distances::Matrix(m) => Some(m),
            Distances::Vector(_) => None,
        }
    }

    pub fn as_vector(&self) -> Option<&Array1<f64>> {
        match self {
            Distances::Matrix(_) => None,
            Distances::Vector(v) => Some(v),
        }
    }
}

/// Engine output together with its within-dataset flag.
///
/// `within_dataset` tells the reducer that entry `(i, i)` of each row is a
/// self comparison and must not be reported as a neighbor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedDistances {
    pub kind: DistanceKind,
    pub distances: Distances,
    pub within_dataset: bool,
}
