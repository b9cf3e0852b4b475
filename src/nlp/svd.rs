//! Truncated singular value decomposition by power iteration with deflation.
//!
//! Good enough for the small term-sentence matrices the summarizer builds, and it keeps the
//! build free of LAPACK.

use ndarray::{Array1, Array2};

const MAX_ITER: usize = 300;
const EPSILON: f64 = 1e-10;

/// `matrix ≈ u · diag(sigma) · vt`
#[derive(Debug, Clone)]
pub struct Svd {
    /// rows x k
    pub u: Array2<f64>,
    /// k singular values, non-increasing
    pub sigma: Array1<f64>,
    /// k x cols
    pub vt: Array2<f64>,
}

/// Compute the first `k` singular triplets of `matrix`.
///
/// `k` is capped at `min(rows, cols)`. Components past the numerical rank come back with a
/// zero singular value and zero vectors.
pub fn truncated_svd(matrix: &Array2<f64>, k: usize) -> Svd {
    let (m, n) = matrix.dim();
    let k = k.min(m).min(n);
    let mut u = Array2::zeros((m, k));
    let mut sigma = Array1::zeros(k);
    let mut vt = Array2::zeros((k, n));

    let mut work = matrix.to_owned();

    for i in 0..k {
        let (s, left, right) = power_iteration(&work);
        if s < EPSILON {
            break;
        }
        sigma[i] = s;
        u.column_mut(i).assign(&left);
        vt.row_mut(i).assign(&right);

        // deflate: remove this component from the matrix
        for row in 0..m {
            for col in 0..n {
                work[[row, col]] -= s * left[row] * right[col];
            }
        }
    }

    Svd { u, sigma, vt }
}

fn power_iteration(matrix: &Array2<f64>) -> (f64, Array1<f64>, Array1<f64>) {
    let (m, n) = matrix.dim();

    // deterministic start vector that is unlikely to be orthogonal to the top component
    let mut v: Array1<f64> = Array1::from_iter((0..n).map(|i| ((i + 1) as f64).sin() + 1.5));
    let norm = v.dot(&v).sqrt();
    v /= norm;

    let mut u = Array1::zeros(m);
    let mut sigma = 0.0;

    for _ in 0..MAX_ITER {
        let mut next_u = matrix.dot(&v);
        let norm_u = next_u.dot(&next_u).sqrt();
        if norm_u < EPSILON {
            return (0.0, Array1::zeros(m), Array1::zeros(n));
        }
        next_u /= norm_u;

        let next_v = matrix.t().dot(&next_u);
        let next_sigma = next_v.dot(&next_v).sqrt();
        if next_sigma < EPSILON {
            return (0.0, Array1::zeros(m), Array1::zeros(n));
        }

        let converged = (next_sigma - sigma).abs() < EPSILON * next_sigma.max(1.0);
        u = next_u;
        v = next_v / next_sigma;
        sigma = next_sigma;
        if converged {
            break;
        }
    }

    (sigma, u, v)
}
