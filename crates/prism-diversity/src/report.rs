//! Diversity report: the file-producing orchestration over a compound table.
//!
//! Filters the compounds, builds MCS (small sets only) and Tanimoto distance
//! matrices, embeds them in 2-D and writes the tables a plotting front end
//! needs:
//!
//! - `<prefix>_mcs_dist_table.csv` pairwise MCS distances, closest first
//! - `<prefix>_mcs_proj.csv` 2-D embedding of the MCS matrix
//! - `<prefix>_tani_proj.csv` 2-D embedding of the Tanimoto matrix
//! - `<prefix>_tanimoto_clustermap.csv` Tanimoto matrix in dendrogram order

use crate::engine::DistanceEngine;
use crate::linkage::{complete_linkage, Dendrogram};
use crate::prepare::{prepare_compounds, CompoundRecord};
use crate::table::{
    pairwise_table, write_ordered_matrix_csv, write_pairwise_csv, write_projection_csv,
    PairwiseRecord,
};
use ndarray::Array2;
use prism_core::{
    DiversityObserver, MoleculeToolkit, PrismError, Projector, Result, DEFAULT_FINGERPRINT_BITS,
};
use std::path::{Path, PathBuf};

/// Fingerprint radius used by the report (ECFP8-like).
pub const REPORT_FINGERPRINT_RADIUS: u32 = 4;

/// Above this many compounds the MCS matrix is skipped.
pub const DEFAULT_MAX_FOR_MCS: usize = 300;

/// Number of closest MCS pairs echoed to the observer.
const CLOSEST_PAIRS_NOTED: usize = 10;

/// Report settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportOptions {
    pub radius: u32,
    pub nbits: usize,
    pub max_for_mcs: usize,
    pub out_dir: PathBuf,
    /// Overrides `<prefix>_tani_proj.csv`
    pub projection_file: Option<PathBuf>,
    pub file_prefix: String,
    /// Structures are already parents; skip salt stripping
    pub is_base_smiles: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            radius: REPORT_FINGERPRINT_RADIUS,
            nbits: DEFAULT_FINGERPRINT_BITS,
            max_for_mcs: DEFAULT_MAX_FOR_MCS,
            out_dir: PathBuf::from("."),
            projection_file: None,
            file_prefix: "compounds".to_string(),
            is_base_smiles: false,
        }
    }
}

impl ReportOptions {
    /// Default options with the file prefix taken from the input file stem.
    pub fn for_input(input: &Path) -> Self {
        let mut options = Self::default();
        if let Some(stem) = input.file_stem().and_then(|s| s.to_str()) {
            options.file_prefix = stem.to_string();
        }
        options
    }

    fn output_path(&self, suffix: &str) -> PathBuf {
        self.out_dir.join(format!("{}_{}", self.file_prefix, suffix))
    }

    fn tanimoto_projection_path(&self) -> PathBuf {
        match &self.projection_file {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => self.out_dir.join(path),
            None => self.output_path("tani_proj.csv"),
        }
    }
}

/// Everything the report computed, plus the files it wrote.
#[derive(Debug, Clone)]
pub struct DiversityReport {
    pub compound_ids: Vec<String>,
    pub responses: Option<Vec<String>>,
    pub tanimoto: Array2<f64>,
    pub tanimoto_projection: Array2<f64>,
    pub dendrogram: Dendrogram,
    pub mcs: Option<Array2<f64>>,
    pub mcs_table: Option<Vec<PairwiseRecord>>,
    pub mcs_projection: Option<Array2<f64>>,
    pub written: Vec<PathBuf>,
}

/// Runs the report over raw compound records.
pub fn run_diversity_report<T: MoleculeToolkit>(
    toolkit: &T,
    observer: &dyn DiversityObserver,
    projector: &dyn Projector,
    records: Vec<CompoundRecord>,
    options: &ReportOptions,
) -> Result<DiversityReport> {
    let prepared = prepare_compounds(toolkit, observer, records, options.is_base_smiles);
    if prepared.is_empty() {
        return Err(PrismError::validation("no parsable compounds to report on"));
    }
    std::fs::create_dir_all(&options.out_dir)?;

    let ids = prepared.ids();
    let responses = prepared.responses();
    let engine = DistanceEngine::new(toolkit, observer).with_fingerprint(options.radius, options.nbits);
    let mut written = Vec::new();

    let (mcs, mcs_table, mcs_projection) = if prepared.len() <= options.max_for_mcs {
        let matrix = engine.mcs_within(&prepared.molecules);
        let table = pairwise_table(matrix.view(), &ids)?;
        note_closest_pairs(observer, &table);

        let table_path = options.output_path("mcs_dist_table.csv");
        write_pairwise_csv(&table_path, &table)?;
        written.push(table_path);

        let projection = projector.project(matrix.view(), 2)?;
        let proj_path = options.output_path("mcs_proj.csv");
        write_projection_csv(&proj_path, projection.view(), &ids, responses.as_deref())?;
        written.push(proj_path);

        (Some(matrix), Some(table), Some(projection))
    } else {
        observer.note(&format!(
            "Skipping MCS: {} compounds exceeds the limit of {}",
            prepared.len(),
            options.max_for_mcs
        ));
        (None, None, None)
    };

    observer.stage_started("Computing Tanimoto distance matrix", prepared.len());
    let fps = engine.fingerprints(&prepared.molecules);
    let tanimoto = crate::engine::tanimoto_within(&fps);
    observer.stage_finished("Computing Tanimoto distance matrix");

    let tanimoto_projection = projector.project(tanimoto.view(), 2)?;
    let proj_path = options.tanimoto_projection_path();
    write_projection_csv(&proj_path, tanimoto_projection.view(), &ids, responses.as_deref())?;
    written.push(proj_path);

    let dendrogram = complete_linkage(tanimoto.view())?;
    let map_path = options.output_path("tanimoto_clustermap.csv");
    write_ordered_matrix_csv(&map_path, tanimoto.view(), &ids, &dendrogram.leaf_order)?;
    written.push(map_path);

    for path in &written {
        observer.note(&format!("Wrote {}", path.display()));
    }

    Ok(DiversityReport {
        compound_ids: ids.iter().map(|s| s.to_string()).collect(),
        responses,
        tanimoto,
        tanimoto_projection,
        dendrogram,
        mcs,
        mcs_table,
        mcs_projection,
        written,
    })
}

fn note_closest_pairs(observer: &dyn DiversityObserver, table: &[PairwiseRecord]) {
    for record in table.iter().take(CLOSEST_PAIRS_NOTED) {
        observer.note(&format!(
            "{} {} {:.3}",
            record.compound_1, record.compound_2, record.dist
        ));
    }
}
