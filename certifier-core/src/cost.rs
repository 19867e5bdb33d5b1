//! Primal cost matrix of the quaternion-lifted registration problem.
//!
//! The truncated least-squares registration cost with one switch variable
//! per correspondence lifts to a quadratic form over the stacked quaternion
//! variables. `q_cost` assembles that form: cross terms between the global
//! block and each correspondence block, plus a per-correspondence diagonal
//! penalty. The matrix is exactly symmetric by construction and its (0,0)
//! block is identically zero.

use nalgebra::{DMatrix, Matrix4, Vector3};

/// Coefficient table mapping vec(q qᵀ) to vec(R), both column-major, for
/// scalar-last quaternions. Fixed numeric data, identical for every call.
#[rustfmt::skip]
const ROTATION_LIFT: [[f64; 16]; 9] = [
    [1.0, 0.0, 0.0, 0.0,   0.0, -1.0, 0.0, 0.0,   0.0, 0.0, -1.0, 0.0,   0.0, 0.0, 0.0, 1.0],
    [0.0, 1.0, 0.0, 0.0,   1.0, 0.0, 0.0, 0.0,    0.0, 0.0, 0.0, 1.0,    0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 1.0, 0.0,   0.0, 0.0, 0.0, -1.0,   1.0, 0.0, 0.0, 0.0,    0.0, -1.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0,   1.0, 0.0, 0.0, 0.0,    0.0, 0.0, 0.0, -1.0,   0.0, 0.0, -1.0, 0.0],
    [-1.0, 0.0, 0.0, 0.0,  0.0, 1.0, 0.0, 0.0,    0.0, 0.0, -1.0, 0.0,   0.0, 0.0, 0.0, 1.0],
    [0.0, 0.0, 0.0, 1.0,   0.0, 0.0, 1.0, 0.0,    0.0, 1.0, 0.0, 0.0,    1.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0,   0.0, 0.0, 0.0, 1.0,    1.0, 0.0, 0.0, 0.0,    0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, -1.0,  0.0, 0.0, 1.0, 0.0,    0.0, 1.0, 0.0, 0.0,    -1.0, 0.0, 0.0, 0.0],
    [-1.0, 0.0, 0.0, 0.0,  0.0, -1.0, 0.0, 0.0,   0.0, 0.0, 1.0, 0.0,    0.0, 0.0, 0.0, 1.0],
];

/// Quaternion-space lift of one correspondence: the symmetric 4x4 matrix
/// P_k with qᵀ P_k q == dstᵀ R(q) src for every unit quaternion q.
fn correspondence_lift(src: &Vector3<f64>, dst: &Vector3<f64>) -> Matrix4<f64> {
    let outer = dst * src.transpose();
    let a = outer.as_slice(); // column-major vec of the 3x3 outer product

    let mut lifted = [0.0; 16];
    for (row, coeffs) in ROTATION_LIFT.iter().enumerate() {
        for (col, &c) in coeffs.iter().enumerate() {
            if c != 0.0 {
                lifted[col] += c * a[row];
            }
        }
    }
    Matrix4::from_column_slice(&lifted)
}

/// Assemble the symmetric (4N+4)x(4N+4) cost matrix Q = Q1 + Q2.
///
/// Q1 holds the cross terms between the global block and each
/// correspondence block; Q2 the per-correspondence diagonal penalty.
/// `cbar2` is the squared noise bound of the truncated cost.
pub fn q_cost(src: &[Vector3<f64>], dst: &[Vector3<f64>], cbar2: f64) -> DMatrix<f64> {
    assert_eq!(src.len(), dst.len());

    let n = src.len();
    let npm = 4 * (n + 1);
    let mut q = DMatrix::zeros(npm, npm);

    for k in 0..n {
        let start = 4 * (k + 1);
        let p_k = correspondence_lift(&src[k], &dst[k]);
        let norms = src[k].norm_squared() + dst[k].norm_squared();

        let ck = 0.5 * (norms - cbar2);
        let cross = -0.5 * p_k + 0.5 * ck * Matrix4::identity();
        q.fixed_view_mut::<4, 4>(0, start).copy_from(&cross);
        q.fixed_view_mut::<4, 4>(start, 0).copy_from(&cross);

        let ck_diag = 0.5 * (norms + cbar2);
        let diag = -p_k + ck_diag * Matrix4::identity();
        q.fixed_view_mut::<4, 4>(start, start).copy_from(&diag);
    }

    q
}
