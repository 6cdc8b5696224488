//! # prism-diversity
//!
//! Pairwise molecular distances and their reductions.
//!
//! - **Engine**: Tanimoto, MCS and descriptor-vector distances within one
//!   collection or between two ([`DistanceEngine`])
//! - **Summary**: nearest/farthest/average-of-k reduction ([`summarize`])
//! - **Report**: compound-table orchestration writing pairwise tables,
//!   2-D projections and dendrogram-ordered matrices
//!
//! Chemistry comes from any [`prism_core::MoleculeToolkit`]; progress goes to
//! an injected [`prism_core::DiversityObserver`].

pub mod engine;
pub mod linkage;
pub mod metrics;
pub mod prepare;
pub mod projection;
pub mod report;
pub mod summary;
pub mod table;

pub use engine::{mcs_distance, DistanceEngine};
pub use linkage::{complete_linkage, Dendrogram, Merge};
pub use prepare::{load_compounds, prepare_compounds, ColumnNames, CompoundRecord, PreparedCompounds};
pub use projection::ClassicalMds;
pub use report::{run_diversity_report, DiversityReport, ReportOptions, DEFAULT_MAX_FOR_MCS};
pub use summary::{summarize, summarize_computed, Neighbor, Summary};
pub use table::{pairwise_table, write_pairwise_csv, PairwiseRecord};
