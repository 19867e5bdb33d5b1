//! Projection onto the affine subspace of valid dual certificates.
//!
//! A dual-certificate candidate is a symmetric matrix partitioned into 4x4
//! blocks, one block row per correspondence plus one for the global
//! variable. Stationarity of the dual problem constrains the off-diagonal
//! blocks to be antisymmetric with a distinguished last column, and
//! complementary slackness ties each diagonal block's last column to the
//! indicator-weighted sum of its off-diagonal row. The linear system that
//! couples the distinguished columns has a fixed pair-indexed structure
//! whose inverse is known in closed form; `inverse_map` materializes that
//! inverse as a sparse matrix and `project_dual` applies the full
//! projection.
//!
//! The inverse is derived analytically rather than factorized numerically:
//! the forward map is 2I + G Gᵀ where G is the indicator-signed oriented
//! incidence operator of the complete graph on the block indices, so its
//! inverse is x I - y C with x = (N+1) y, y = 1 / (2N + 6), and C the
//! signed pair-adjacency operator below.

use nalgebra::{DMatrix, Vector4};
use sprs::CsMat;

use crate::linalg::{kron_vec, sparse};

/// Index of the unordered block pair (i, j), i < j, in the fixed row-major
/// upper-triangular enumeration over `n_blocks` block indices.
pub fn pair_index(i: usize, j: usize, n_blocks: usize) -> usize {
    debug_assert!(i < j && j < n_blocks);
    i * n_blocks - i * (i + 1) / 2 + (j - i - 1)
}

/// Number of unordered block pairs for `n_blocks` block indices.
pub fn pair_count(n_blocks: usize) -> usize {
    n_blocks * (n_blocks - 1) / 2
}

/// Build the closed-form inverse of the pair-coupling map as a sparse
/// matrix.
///
/// Depends only on the block count and the prepended indicator vector; a
/// deterministic function of both. `theta` is the prepended indicator
/// (leading 1.0, then ±1.0 per correspondence).
pub fn inverse_map(theta: &[f64]) -> CsMat<f64> {
    let n_blocks = theta.len();
    debug_assert!(n_blocks >= 2);

    // closed-form constants of the inverse
    let n0 = (n_blocks - 1) as f64;
    let y = 1.0 / (2.0 * n0 + 6.0);
    let x = (n0 + 1.0) * y;

    let nr_vals = pair_count(n_blocks);
    let mut triplets: Vec<(usize, usize, f64)> = Vec::with_capacity(nr_vals * (2 * n_blocks - 3));

    for i in 0..n_blocks - 1 {
        for j in i + 1..n_blocks {
            let col = pair_index(i, j, n_blocks);

            // pairs sharing index i
            for p in 0..n_blocks {
                if p == i || p == j {
                    continue;
                }
                let (row, val) = if p < i {
                    (pair_index(p, i, n_blocks), y * theta[j] * theta[p])
                } else {
                    (pair_index(i, p, n_blocks), -y * theta[j] * theta[p])
                };
                triplets.push((row, col, val));
            }

            // pairs sharing index j
            for p in 0..n_blocks {
                if p == i || p == j {
                    continue;
                }
                let (row, val) = if p < j {
                    (pair_index(p, j, n_blocks), -y * theta[i] * theta[p])
                } else {
                    (pair_index(j, p, n_blocks), y * theta[i] * theta[p])
                };
                triplets.push((row, col, val));
            }
        }
    }

    for k in 0..nr_vals {
        triplets.push((k, k, x));
    }

    sparse::from_triplets(nr_vals, nr_vals, triplets)
}

/// Indicator-weighted row sum of one block row: the 4-vector
/// sum_p theta[p] * a[block row, last column of block p].
fn block_row_sum(a: &DMatrix<f64>, block: usize, theta: &[f64]) -> Vector4<f64> {
    let unit = [0.0, 0.0, 0.0, 1.0];
    let selector = kron_vec(theta, &unit);
    a.fixed_rows::<4>(4 * block) * selector
}

/// Project a symmetric matrix onto the subspace satisfying the dual
/// problem's equality constraints.
///
/// `w` must be symmetric with side 4 * theta.len(); `a_inv` is the matching
/// [`inverse_map`]. The result satisfies the affine equality constraints
/// exactly; no positive-semidefiniteness is implied. Applying the
/// projection twice is a no-op.
pub fn project_dual(w: &DMatrix<f64>, theta: &[f64], a_inv: &CsMat<f64>) -> DMatrix<f64> {
    let npm = w.nrows();
    let n_blocks = npm / 4;
    assert_eq!(npm, w.ncols());
    assert_eq!(n_blocks, theta.len());
    assert_eq!(a_inv.rows(), pair_count(n_blocks));

    // Right-hand side of the pair-coupling system: for each pair (i, j) the
    // four 1x3 slices of w at the last row of blocks i and j, combined with
    // coefficients [-theta_ij, 1] and [-1, theta_ij].
    let mut b_w = DMatrix::zeros(pair_count(n_blocks), 3);
    for i in 0..n_blocks - 1 {
        let row_i = 4 * i + 3;
        for j in i + 1..n_blocks {
            let row_j = 4 * j + 3;
            let theta_ij = theta[i] * theta[j];
            let idx = pair_index(i, j, n_blocks);
            for c in 0..3 {
                b_w[(idx, c)] = -theta_ij * w[(row_i, 4 * i + c)] + w[(row_j, 4 * i + c)]
                    - w[(row_i, 4 * j + c)]
                    + theta_ij * w[(row_j, 4 * j + c)];
            }
        }
    }

    let b_dual = sparse::spmm_dense(a_inv, &b_w);

    // Off-diagonal blocks: keep the antisymmetric part, overwrite the last
    // column and row with the solved slack vector, mirror below.
    let mut w_dual = DMatrix::zeros(npm, npm);
    for i in 0..n_blocks - 1 {
        for j in i + 1..n_blocks {
            let idx = pair_index(i, j, n_blocks);
            let w_ij = w.fixed_view::<4, 4>(4 * i, 4 * j).into_owned();
            let mut block = 0.5 * (w_ij - w_ij.transpose());
            for r in 0..3 {
                block[(r, 3)] = b_dual[(idx, r)];
                block[(3, r)] = -b_dual[(idx, r)];
            }
            block[(3, 3)] = 0.0;
            w_dual.fixed_view_mut::<4, 4>(4 * i, 4 * j).copy_from(&block);
        }
    }
    w_dual = &w_dual + w_dual.transpose();

    // Diagonal blocks: take the input block, then force complementary
    // slackness on its last column and row.
    let mut diag_sum = nalgebra::Matrix3::<f64>::zeros();
    for i in 0..n_blocks {
        let row_sum = block_row_sum(&w_dual, i, theta);
        let mut block = w.fixed_view::<4, 4>(4 * i, 4 * i).into_owned();
        for r in 0..4 {
            block[(r, 3)] = -theta[i] * row_sum[r];
            block[(3, r)] = -theta[i] * row_sum[r];
        }
        w_dual.fixed_view_mut::<4, 4>(4 * i, 4 * i).copy_from(&block);
        diag_sum += block.fixed_view::<3, 3>(0, 0).into_owned();
    }

    // Remove the common gauge freedom: subtract the mean of the diagonal
    // blocks' top-left corners from each of them.
    let diag_mean = diag_sum / n_blocks as f64;
    for i in 0..n_blocks {
        let corner = w_dual.fixed_view::<3, 3>(4 * i, 4 * i).into_owned() - diag_mean;
        w_dual.fixed_view_mut::<3, 3>(4 * i, 4 * i).copy_from(&corner);
    }

    w_dual
}
