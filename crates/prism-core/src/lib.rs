//! # prism-core
//!
//! Core types, traits, and errors for PRISM chemical diversity analysis.
//!
//! This crate defines the fundamental abstractions used across all PRISM components:
//! - **Types**: Fingerprints, feature/metric enums, distance containers
//! - **Traits**: MoleculeToolkit, DiversityObserver, Projector
//! - **Errors**: Unified error handling with PrismError
//!
//! ## Architecture
//! ```text
//! ┌─────────────────┐
//! │  prism-core     │  ← Core types/traits
//! └─────────────────┘
//!         ▲
//!         │
//!    ┌────┴──────────────────┐
//!    │                       │
//! ┌──▼──────────┐   ┌───────▼─────────┐
//! │ prism-chem  │   │ prism-diversity │
//! └─────────────┘   └─────────────────┘
//!         ▲                 ▲
//!         └────────┬────────┘
//!                  │
//!         ┌────────▼────────┐
//!         │   prism-cli     │
//!         └─────────────────┘
//! ```

pub mod errors;
pub mod traits;
pub mod types;

// Re-export commonly used items
pub use errors::{PrismError, Result};
pub use traits::{DiversityObserver, LogObserver, MoleculeToolkit, Projector, SilentObserver};
pub use types::{
    BitVector, CalcMode, ComputedDistances, DistanceKind, Distances, FeatureType, Metric,
    VectorMetric, DEFAULT_FINGERPRINT_BITS, DEFAULT_FINGERPRINT_RADIUS,
};
