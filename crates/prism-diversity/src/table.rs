//! Tabular exports of distance matrices.
//!
//! Every writer emits an explicit header row.

use ndarray::{ArrayView1, ArrayView2};
use prism_core::{PrismError, Result};
use serde::Serialize;
use std::path::Path;

/// One row of the pairwise distance table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PairwiseRecord {
    pub compound_1: String,
    pub compound_2: String,
    pub dist: f64,
    pub i: usize,
    pub j: usize,
}

/// Upper-triangle pairs of a within-collection matrix, sorted by distance
/// (stable, so equal distances keep `(i, j)` order).
pub fn pairwise_table<S: AsRef<str>>(
    distances: ArrayView2<'_, f64>,
    ids: &[S],
) -> Result<Vec<PairwiseRecord>> {
    let n = distances.nrows();
    if distances.ncols() != n || ids.len() != n {
        return Err(PrismError::validation(format!(
            "pairwise table needs a square matrix aligned with ids: {}x{} vs {} ids",
            n,
            distances.ncols(),
            ids.len()
        )));
    }

    let mut records = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            records.push(PairwiseRecord {
                compound_1: ids[i].as_ref().to_string(),
                compound_2: ids[j].as_ref().to_string(),
                dist: distances[[i, j]],
                i,
                j,
            });
        }
    }
    records.sort_by(|a, b| a.dist.total_cmp(&b.dist));
    Ok(records)
}

/// Writes the pairwise table with header `compound_1,compound_2,dist,i,j`.
pub fn write_pairwise_csv(path: &Path, records: &[PairwiseRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    if records.is_empty() {
        writer.write_record(["compound_1", "compound_2", "dist", "i", "j"])?;
    }
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes 2-D projection coordinates as `x,y,compound_id[,response]`.
pub fn write_projection_csv<S: AsRef<str>>(
    path: &Path,
    coords: ArrayView2<'_, f64>,
    ids: &[S],
    responses: Option<&[String]>,
) -> Result<()> {
    if coords.nrows() != ids.len() || coords.ncols() < 2 {
        return Err(PrismError::validation(format!(
            "projection of shape {:?} does not match {} ids",
            coords.dim(),
            ids.len()
        )));
    }
    if matches!(responses, Some(r) if r.len() != ids.len()) {
        return Err(PrismError::validation("responses are not aligned with ids"));
    }

    let mut writer = csv::Writer::from_path(path)?;
    let mut header = vec!["x", "y", "compound_id"];
    if responses.is_some() {
        header.push("response");
    }
    writer.write_record(&header)?;

    for (i, id) in ids.iter().enumerate() {
        let mut row = vec![
            coords[[i, 0]].to_string(),
            coords[[i, 1]].to_string(),
            id.as_ref().to_string(),
        ];
        if let Some(responses) = responses {
            row.push(responses[i].clone());
        }
        writer.write_record(&row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes a square matrix with rows and columns permuted by `order`,
/// labelled by compound id (the data behind a clustered heatmap).
pub fn write_ordered_matrix_csv<S: AsRef<str>>(
    path: &Path,
    distances: ArrayView2<'_, f64>,
    ids: &[S],
    order: &[usize],
) -> Result<()> {
    let n = ids.len();
    let valid_order = {
        let mut seen = vec![false; n];
        order.len() == n && order.iter().all(|&o| o < n && !std::mem::replace(&mut seen[o], true))
    };
    if distances.dim() != (n, n) || !valid_order {
        return Err(PrismError::validation(
            "ordered matrix needs a square matrix and a permutation of its rows",
        ));
    }

    let mut writer = csv::Writer::from_path(path)?;
    let mut header = vec!["compound_id".to_string()];
    header.extend(order.iter().map(|&o| ids[o].as_ref().to_string()));
    writer.write_record(&header)?;

    for &r in order {
        let row: ArrayView1<'_, f64> = distances.row(r);
        let mut record = vec![ids[r].as_ref().to_string()];
        record.extend(order.iter().map(|&c| row[c].to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use tempfile::TempDir;

    #[test]
    fn table_is_sorted_upper_triangle() {
        let d = array![[0.0, 0.6, 0.2], [0.6, 0.0, 0.6], [0.2, 0.6, 0.0]];
        let table = pairwise_table(d.view(), &["a", "b", "c"]).unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!((table[0].i, table[0].j), (0, 2));
        // equal distances keep (i, j) order
        assert_eq!((table[1].i, table[1].j), (0, 1));
        assert_eq!((table[2].i, table[2].j), (1, 2));
        assert_eq!(table[0].compound_2, "c");
    }

    #[test]
    fn pairwise_csv_has_expected_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pairs.csv");
        let d = array![[0.0, 0.25], [0.25, 0.0]];
        let table = pairwise_table(d.view(), &["x1", "x2"]).unwrap();
        write_pairwise_csv(&path, &table).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("compound_1,compound_2,dist,i,j"));
        assert_eq!(lines.next(), Some("x1,x2,0.25,0,1"));
    }

    #[test]
    fn empty_table_still_writes_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.csv");
        write_pairwise_csv(&path, &[]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), "compound_1,compound_2,dist,i,j");
    }

    #[test]
    fn ordered_matrix_rejects_bad_permutation() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("m.csv");
        let d = array![[0.0, 1.0], [1.0, 0.0]];
        assert!(write_ordered_matrix_csv(&path, d.view(), &["a", "b"], &[0, 0]).is_err());
        write_ordered_matrix_csv(&path, d.view(), &["a", "b"], &[1, 0]).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().next(), Some("compound_id,b,a"));
    }
}
