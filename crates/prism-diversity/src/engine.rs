//! Distance metric engine.
//!
//! Computes distances within one collection of SMILES strings or between
//! two collections, for a resolved [`DistanceKind`]:
//!
//! | B             | Tanimoto           | MCS                 | Descriptor          |
//! |---------------|--------------------|---------------------|---------------------|
//! | absent        | square, within     | square, within      | square, within      |
//! | one structure | vector over A      | vector over A       | `len(A) x 1` matrix |
//! | several       | `len(A) x len(B)`  | `len(A) x len(B)`, within | `len(A) x len(B)` |
//!
//! The MCS cross matrix keeps the within-dataset flag, matching the
//! behaviour the reducer has always seen for that path.

use crate::metrics;
use ndarray::{Array1, Array2};
use prism_core::{
    BitVector, ComputedDistances, DistanceKind, Distances, DiversityObserver, MoleculeToolkit,
    PrismError, Result, VectorMetric, DEFAULT_FINGERPRINT_BITS, DEFAULT_FINGERPRINT_RADIUS,
};

/// Pairwise distance engine over an injected chemistry toolkit.
pub struct DistanceEngine<'a, T: MoleculeToolkit> {
    toolkit: &'a T,
    observer: &'a dyn DiversityObserver,
    radius: u32,
    nbits: usize,
}

impl<'a, T: MoleculeToolkit> DistanceEngine<'a, T> {
    /// Creates an engine using radius-2, 1024-bit fingerprints.
    pub fn new(toolkit: &'a T, observer: &'a dyn DiversityObserver) -> Self {
        Self {
            toolkit,
            observer,
            radius: DEFAULT_FINGERPRINT_RADIUS,
            nbits: DEFAULT_FINGERPRINT_BITS,
        }
    }

    /// Overrides the fingerprint radius and length.
    pub fn with_fingerprint(mut self, radius: u32, nbits: usize) -> Self {
        self.radius = radius;
        self.nbits = nbits;
        self
    }

    /// Computes distances for collection `a`, optionally against `b`.
    ///
    /// Any structure that fails to parse, or any descriptor failure, fails
    /// the whole call; no partial matrix is returned.
    pub fn compute<S: AsRef<str>>(
        &self,
        kind: DistanceKind,
        a: &[S],
        b: Option<&[S]>,
    ) -> Result<ComputedDistances> {
        if a.is_empty() {
            return Err(PrismError::validation("first collection must not be empty"));
        }
        if matches!(b, Some(b) if b.is_empty()) {
            return Err(PrismError::validation("second collection must not be empty"));
        }

        let (distances, within_dataset) = match kind {
            DistanceKind::EcfpTanimoto => self.tanimoto_branch(a, b)?,
            DistanceKind::Mcs => self.mcs_branch(a, b)?,
            DistanceKind::Descriptor(metric) => self.descriptor_branch(metric, a, b)?,
        };

        Ok(ComputedDistances {
            kind,
            distances,
            within_dataset,
        })
    }

    fn tanimoto_branch<S: AsRef<str>>(
        &self,
        a: &[S],
        b: Option<&[S]>,
    ) -> Result<(Distances, bool)> {
        let fps_a = self.fingerprints(&self.parse_all(a)?);
        match b {
            None => Ok((Distances::Matrix(tanimoto_within(&fps_a)), true)),
            Some([single]) => {
                let mol = self.parse_one(0, single.as_ref())?;
                let query = self.toolkit.fingerprint(&mol, self.radius, self.nbits);
                Ok((Distances::Vector(tanimoto_single(&query, &fps_a)), false))
            }
            Some(b) => {
                let fps_b = self.fingerprints(&self.parse_all(b)?);
                Ok((Distances::Matrix(tanimoto_cross(&fps_a, &fps_b)), false))
            }
        }
    }

    fn mcs_branch<S: AsRef<str>>(&self, a: &[S], b: Option<&[S]>) -> Result<(Distances, bool)> {
        let mols_a = self.parse_all(a)?;
        match b {
            None => Ok((Distances::Matrix(self.mcs_within(&mols_a)), true)),
            Some([single]) => {
                let mol = self.parse_one(0, single.as_ref())?;
                Ok((Distances::Vector(self.mcs_single(&mol, &mols_a)), false))
            }
            Some(b) => {
                let mols_b = self.parse_all(b)?;
                Ok((Distances::Matrix(self.mcs_cross(&mols_a, &mols_b)), true))
            }
        }
    }

    fn descriptor_branch<S: AsRef<str>>(
        &self,
        metric: VectorMetric,
        a: &[S],
        b: Option<&[S]>,
    ) -> Result<(Distances, bool)> {
        let feats_a = self.descriptor_matrix(a)?;
        match b {
            Some(b) => {
                let feats_b = self.descriptor_matrix(b)?;
                let dist = metrics::cross(feats_a.view(), feats_b.view(), metric)?;
                Ok((Distances::Matrix(dist), false))
            }
            None => Ok((
                Distances::Matrix(metrics::pairwise(feats_a.view(), metric)),
                true,
            )),
        }
    }

    /// Parses every structure; the first failure aborts the batch.
    pub fn parse_all<S: AsRef<str>>(&self, smiles: &[S]) -> Result<Vec<T::Molecule>> {
        smiles
            .iter()
            .enumerate()
            .map(|(i, s)| self.parse_one(i, s.as_ref()))
            .collect()
    }

    fn parse_one(&self, index: usize, smiles: &str) -> Result<T::Molecule> {
        self.toolkit.parse_smiles(smiles).ok_or_else(|| {
            self.observer.parse_failed(index, smiles);
            PrismError::parse(index, smiles)
        })
    }

    /// Fingerprints with the engine's radius and length.
    pub fn fingerprints(&self, mols: &[T::Molecule]) -> Vec<BitVector> {
        mols.iter()
            .map(|m| self.toolkit.fingerprint(m, self.radius, self.nbits))
            .collect()
    }

    /// Descriptor vectors stacked row-wise; fail-fast on the first failure.
    pub fn descriptor_matrix<S: AsRef<str>>(&self, smiles: &[S]) -> Result<Array2<f64>> {
        self.observer.stage_started("Computing descriptors", smiles.len());
        let mut rows: Vec<Vec<f64>> = Vec::with_capacity(smiles.len());
        for (i, s) in smiles.iter().enumerate() {
            let s = s.as_ref();
            match self.toolkit.descriptors(s) {
                Some(row) => rows.push(row),
                None => {
                    self.observer.descriptor_failed(i, s);
                    return Err(PrismError::descriptor(i, s));
                }
            }
        }

        let width = rows.first().map_or(0, Vec::len);
        if let Some(i) = rows.iter().position(|r| r.len() != width) {
            return Err(PrismError::numerical(format!(
                "descriptor vector {} has length {}, expected {}",
                i,
                rows[i].len(),
                width
            )));
        }
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        let matrix = Array2::from_shape_vec((smiles.len(), width), flat)
            .map_err(|e| PrismError::numerical(e.to_string()))?;
        self.observer.stage_finished("Computing descriptors");
        Ok(matrix)
    }

    /// Symmetric MCS distance matrix with a zero diagonal.
    pub fn mcs_within(&self, mols: &[T::Molecule]) -> Array2<f64> {
        self.observer.stage_started("Computing MCS distance matrix", mols.len());
        let atoms: Vec<usize> = mols.iter().map(|m| self.toolkit.atom_count(m)).collect();
        let n = mols.len();
        let mut dist = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in (i + 1)..n {
                let common = self.toolkit.mcs_atom_count(&mols[i], &mols[j]);
                let d = mcs_distance(atoms[i], atoms[j], common);
                dist[[i, j]] = d;
                dist[[j, i]] = d;
            }
        }
        self.observer.stage_finished("Computing MCS distance matrix");
        dist
    }

    /// MCS distances of one molecule against a collection.
    pub fn mcs_single(&self, query: &T::Molecule, mols: &[T::Molecule]) -> Array1<f64> {
        let query_atoms = self.toolkit.atom_count(query);
        mols.iter()
            .map(|m| {
                let common = self.toolkit.mcs_atom_count(query, m);
                mcs_distance(query_atoms, self.toolkit.atom_count(m), common)
            })
            .collect()
    }

    /// MCS cross matrix, `a.len() x b.len()`.
    pub fn mcs_cross(&self, a: &[T::Molecule], b: &[T::Molecule]) -> Array2<f64> {
        self.observer
            .stage_started("Computing MCS distance matrix", a.len() * b.len());
        let atoms_b: Vec<usize> = b.iter().map(|m| self.toolkit.atom_count(m)).collect();
        let dist = Array2::from_shape_fn((a.len(), b.len()), |(i, j)| {
            let common = self.toolkit.mcs_atom_count(&a[i], &b[j]);
            mcs_distance(self.toolkit.atom_count(&a[i]), atoms_b[j], common)
        });
        self.observer.stage_finished("Computing MCS distance matrix");
        dist
    }
}

/// MCS distance, `1 - common / max(atoms_a, atoms_b)`.
pub fn mcs_distance(atoms_a: usize, atoms_b: usize, common: usize) -> f64 {
    let largest = atoms_a.max(atoms_b);
    if largest == 0 {
        return 0.0;
    }
    1.0 - common.min(largest) as f64 / largest as f64
}

/// Symmetric Tanimoto distance matrix with a zero diagonal.
pub fn tanimoto_within(fps: &[BitVector]) -> Array2<f64> {
    let n = fps.len();
    let mut dist = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let d = fps[i].tanimoto_distance(&fps[j]);
            dist[[i, j]] = d;
            dist[[j, i]] = d;
        }
    }
    dist
}

/// Tanimoto distances of one fingerprint against a collection.
pub fn tanimoto_single(query: &BitVector, fps: &[BitVector]) -> Array1<f64> {
    fps.iter().map(|fp| query.tanimoto_distance(fp)).collect()
}

/// Tanimoto cross matrix, `a.len() x b.len()`.
pub fn tanimoto_cross(a: &[BitVector], b: &[BitVector]) -> Array2<f64> {
    Array2::from_shape_fn((a.len(), b.len()), |(i, j)| a[i].tanimoto_distance(&b[j]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mcs_distance_normalises_by_larger_molecule() {
        assert_relative_eq!(mcs_distance(10, 10, 10), 0.0);
        assert_relative_eq!(mcs_distance(4, 8, 4), 0.5);
        assert_relative_eq!(mcs_distance(0, 0, 0), 0.0);
        assert_relative_eq!(mcs_distance(3, 5, 0), 1.0);
    }

    #[test]
    fn tanimoto_helpers_agree() {
        let fps = vec![
            BitVector::from_positions(32, [0, 1, 2]),
            BitVector::from_positions(32, [1, 2, 3]),
            BitVector::from_positions(32, [10]),
        ];
        let within = tanimoto_within(&fps);
        let cross = tanimoto_cross(&fps, &fps);
        let single = tanimoto_single(&fps[1], &fps);

        assert_relative_eq!(within[[0, 1]], 0.5);
        assert_relative_eq!(within[[0, 2]], 1.0);
        for i in 0..3 {
            assert_eq!(within[[i, i]], 0.0);
            assert_relative_eq!(single[i], within[[1, i]]);
            for j in 0..3 {
                assert_relative_eq!(cross[[i, j]], within[[i, j]]);
            }
        }
    }
}
