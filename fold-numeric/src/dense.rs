//! Dense-matrix linear algebra: LU decomposition with a log-sum determinant, and an SVD
//! wrapper that determines rank the way §4.12 specifies — relative to the largest singular
//! value, at roughly `4 * f64::EPSILON`. Built on `nalgebra`.

use nalgebra::{DMatrix, SymmetricEigen, SVD};

/// Relative-rank epsilon used to decide how many singular values count as non-zero.
pub const RANK_EPSILON: f64 = 4.0 * f64::EPSILON;

/// Result of an LU decomposition with partial pivoting.
///
/// `sign` is `0` for a (numerically) singular matrix, matching §7's "Singular matrix"
/// error kind: the caller is expected to treat a zero sign/determinant as a degenerate
/// transform and proceed rather than abort.
pub struct LuResult {
    pub determinant: f64,
    pub sign: i32,
    pub log_abs_determinant: f64,
}

/// LU-decomposes a square matrix and extracts its determinant via a log-sum of the
/// diagonal of U, which avoids under/overflow on large matrices.
pub fn lu_determinant(mat: &DMatrix<f64>) -> LuResult {
    assert_eq!(mat.nrows(), mat.ncols(), "lu_determinant needs a square matrix");
    let lu = mat.clone().lu();
    let u = lu.u();
    let perm_sign = lu.p().determinant();

    let mut log_abs = 0.0;
    let mut sign = if perm_sign >= 0.0 { 1 } else { -1 };
    for i in 0..u.nrows() {
        let d = u[(i, i)];
        if d.abs() < 1e-300 {
            return LuResult { determinant: 0.0, sign: 0, log_abs_determinant: f64::NEG_INFINITY };
        }
        if d < 0.0 { sign = -sign; }
        log_abs += d.abs().ln();
    }
    let determinant = sign as f64 * log_abs.exp();
    LuResult { determinant, sign, log_abs_determinant: log_abs }
}

/// Numeric rank of a matrix from its singular values, counting values that are at least
/// `RANK_EPSILON` times the largest one.
pub fn svd_rank(mat: &DMatrix<f64>) -> usize {
    let svd = SVD::new(mat.clone(), false, false);
    let s = svd.singular_values;
    if s.is_empty() { return 0; }
    let largest = s[0];
    if largest <= 0.0 { return 0; }
    s.iter().filter(|&&v| v > RANK_EPSILON * largest).count()
}

/// Eigenvalues and eigenvectors of a symmetric matrix, sorted descending by eigenvalue.
/// Used by the spectral embedding step (§4.4) on the double-centered Gram matrix; `nalgebra`
/// guarantees real eigenvalues here since the input is symmetric.
pub struct SymmetricSpectrum {
    /// Descending eigenvalues.
    pub values: Vec<f64>,
    /// `columns[k]` is the eigenvector for `values[k]`.
    pub columns: Vec<nalgebra::DVector<f64>>,
}

pub fn symmetric_spectrum(mat: &DMatrix<f64>) -> SymmetricSpectrum {
    assert_eq!(mat.nrows(), mat.ncols(), "symmetric_spectrum needs a square matrix");
    let eig = SymmetricEigen::new(mat.clone());
    let mut order: Vec<usize> = (0..eig.eigenvalues.len()).collect();
    order.sort_by(|&a, &b| eig.eigenvalues[b].partial_cmp(&eig.eigenvalues[a]).unwrap());

    let values = order.iter().map(|&k| eig.eigenvalues[k]).collect();
    let columns = order.iter().map(|&k| eig.eigenvectors.column(k).into_owned()).collect();
    SymmetricSpectrum { values, columns }
}
