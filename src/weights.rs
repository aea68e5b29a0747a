//! The sample weight matrix and the summary-function contract: spec.md
//! §3 (`W[n][K]`) and §4.7.

use crate::error::GeneralStatError;

/// `W[n][K]`: a real-valued weight per sample across `K` state
/// dimensions, row-major.
#[derive(Debug, Clone)]
pub struct WeightMatrix {
    n: usize,
    k: usize,
    data: Vec<f64>,
}

impl WeightMatrix {
    /// Build from `n` rows of `k` weights each. `rows.len()` must equal
    /// `n_samples`; checked by the caller via [`WeightMatrix::validate`].
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        let n = rows.len();
        let k = rows.first().map_or(0, |r| r.len());
        let mut data = Vec::with_capacity(n * k);
        for row in &rows {
            assert_eq!(row.len(), k, "ragged weight matrix");
            data.extend_from_slice(row);
        }
        Self { n, k, data }
    }

    /// A matrix with `k` dimensions where row `samples[i]` has a `1.0` in
    /// every column `j` for which `samples[i]` is in `sample_sets[j]`.
    pub fn indicator(n_samples: usize, sample_sets: &[Vec<usize>]) -> Self {
        let k = sample_sets.len();
        let mut data = vec![0.0; n_samples * k];
        for (j, set) in sample_sets.iter().enumerate() {
            for &sample_index in set {
                data[sample_index * k + j] = 1.0;
            }
        }
        Self { n: n_samples, k, data }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.k..(i + 1) * self.k]
    }

    /// `T[K] = sum_s W[s]`, per spec.md §3.
    pub fn total(&self) -> Vec<f64> {
        let mut total = vec![0.0; self.k];
        for i in 0..self.n {
            for (j, w) in self.row(i).iter().enumerate() {
                total[j] += w;
            }
        }
        total
    }

    /// Validates the first-dimension constraint from spec.md §7
    /// (`InvalidWeights`).
    pub fn validate(&self, expected_samples: usize) -> Result<(), GeneralStatError> {
        if self.n != expected_samples {
            return Err(GeneralStatError::InvalidWeights {
                got: self.n,
                expected: expected_samples,
            });
        }
        Ok(())
    }
}

/// `f: R^K -> R^M`, pure and deterministic, per spec.md §4.7. Boxed as a
/// trait object so `general_stat` can accept closures built ad hoc by the
/// convenience statistics in `src/convenience.rs`.
pub type SummaryFn<'a> = dyn Fn(&[f64]) -> Vec<f64> + 'a;

/// Discover `M` with a single probe call, per spec.md §4.7.
pub fn probe_output_dim(weights: &WeightMatrix, f: &SummaryFn) -> usize {
    f(weights.row(0)).len()
}
