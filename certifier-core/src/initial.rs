//! Closed-form initial guess for the dual certificate.
//!
//! Built from the KKT conditions at the candidate rotation: each
//! correspondence contributes one symmetric 4x4 block whose entries depend
//! on the residual under the candidate and on which piece of the truncated
//! cost is active (inlier quadratic or outlier plateau). The negated block
//! lands on the correspondence's diagonal slot and the positive sum on the
//! global slot, so the resulting matrix pairs to zero against the rank-one
//! lift. No iteration anywhere.

use nalgebra::{Matrix3, Matrix4, Vector3};
use sprs::CsMat;

use crate::linalg::{hat, sparse};

/// One correspondence's KKT block.
fn kkt_block(
    rotation: &Matrix3<f64>,
    src: &Vector3<f64>,
    dst: &Vector3<f64>,
    inlier: bool,
    cbar2: f64,
) -> Matrix4<f64> {
    let src_hat = hat(src);
    // residual expressed in the source frame
    let xi = rotation.transpose() * dst - src;
    let xi_hat = hat(&xi);
    let xi_sq = xi.norm_squared();

    // the 0.75/0.25 weights swap between the active quadratic piece and the
    // truncation plateau
    let (corner_weight, tail_weight, vector_weight) = if inlier {
        (0.75, 0.25, -1.5)
    } else {
        (0.25, 0.75, -0.5)
    };

    let corner: Matrix3<f64> = src_hat * src_hat
        - 0.5 * src.dot(&xi) * Matrix3::identity()
        + 0.5 * xi_hat * src_hat
        + 0.5 * xi * src.transpose()
        - corner_weight * xi_sq * Matrix3::identity()
        - 0.25 * cbar2 * Matrix3::identity();
    let vector = vector_weight * xi_hat * src;

    let mut block = Matrix4::zeros();
    block.fixed_view_mut::<3, 3>(0, 0).copy_from(&corner);
    for r in 0..3 {
        block[(r, 3)] = vector[r];
        block[(3, r)] = vector[r];
    }
    block[(3, 3)] = -corner_weight * xi_sq - tail_weight * cbar2;
    block
}

/// Assemble the sparse initial dual-certificate guess.
///
/// `theta` is the prepended indicator; correspondence i reads its sign from
/// `theta[i + 1]`. The output is symmetric, block diagonal, and sized
/// 4 * theta.len().
pub fn lambda_guess(
    rotation: &Matrix3<f64>,
    theta: &[f64],
    src: &[Vector3<f64>],
    dst: &[Vector3<f64>],
    cbar2: f64,
) -> CsMat<f64> {
    let n = theta.len() - 1;
    debug_assert_eq!(src.len(), n);
    debug_assert_eq!(dst.len(), n);

    let npm = 4 * (n + 1);
    let mut triplets: Vec<(usize, usize, f64)> = Vec::with_capacity(16 * (n + 1));
    let mut global_block = Matrix4::<f64>::zeros();

    for i in 0..n {
        let block = kkt_block(rotation, &src[i], &dst[i], theta[i + 1] > 0.0, cbar2);
        let start = 4 * (i + 1);
        for c in 0..4 {
            for r in 0..4 {
                triplets.push((start + r, start + c, -block[(r, c)]));
            }
        }
        global_block += block;
    }

    for c in 0..4 {
        for r in 0..4 {
            triplets.push((r, c, global_block[(r, c)]));
        }
    }

    sparse::from_triplets(npm, npm, triplets)
}
