//! Sparse matrix construction and products.
//!
//! Thin wrappers over `sprs` CSC matrices. Triplet construction follows the
//! usual contract: duplicate (row, col) entries accumulate by summation.

use nalgebra::DMatrix;
use sprs::{CsMat, TriMat};

/// Sparse matrix in CSC format.
pub type SparseCsc = CsMat<f64>;

/// Build a sparse CSC matrix from triplets (row, col, value).
pub fn from_triplets<I>(nrows: usize, ncols: usize, triplets: I) -> SparseCsc
where
    I: IntoIterator<Item = (usize, usize, f64)>,
{
    let mut tri = TriMat::new((nrows, ncols));
    for (i, j, v) in triplets {
        tri.add_triplet(i, j, v);
    }
    tri.to_csc()
}

/// Sparse-dense product: `A * B` with a dense right-hand side.
pub fn spmm_dense(a: &SparseCsc, b: &DMatrix<f64>) -> DMatrix<f64> {
    assert_eq!(a.cols(), b.nrows());

    let mut out = DMatrix::zeros(a.rows(), b.ncols());
    for (val, (row, col)) in a.iter() {
        for k in 0..b.ncols() {
            out[(row, k)] += *val * b[(col, k)];
        }
    }
    out
}

/// Densify a sparse matrix into an `nalgebra` matrix.
pub fn to_dmatrix(a: &SparseCsc) -> DMatrix<f64> {
    let mut out = DMatrix::zeros(a.rows(), a.cols());
    for (val, (row, col)) in a.iter() {
        out[(row, col)] += *val;
    }
    out
}
