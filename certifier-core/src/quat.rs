//! Quaternion embedding of the candidate rotation.
//!
//! Quaternions are stored scalar-last, `[x, y, z, w]`, matching the
//! component order assumed by the cost-matrix lifting. The embedding is a
//! change of basis that moves the candidate rotation to the identity, so the
//! dual certificate can be sought in a canonical frame.

use nalgebra::{DMatrix, Matrix3, Matrix4, Rotation3, UnitQuaternion, Vector4};

/// Left-multiplication matrix of a unit quaternion.
///
/// For unit quaternions p and q (scalar-last), `omega1(p) * q` is the
/// composition p * q. Consequences used throughout: `omega1(q) * e4 == q`
/// and `omega1(q)` is orthogonal.
pub fn omega1(q: &Vector4<f64>) -> Matrix4<f64> {
    let (x, y, z, w) = (q.x, q.y, q.z, q.w);
    Matrix4::new(
        w, -z, y, x,
        z, w, -x, y,
        -y, x, w, z,
        -x, -y, -z, w,
    )
}

/// Block-diagonal embedding: `omega1(q)` on each 4x4 diagonal block of an
/// `npm` x `npm` matrix, zero elsewhere. `npm` must be a multiple of 4.
pub fn block_diag_omega(npm: usize, q: &Vector4<f64>) -> DMatrix<f64> {
    debug_assert_eq!(npm % 4, 0);

    let omega = omega1(q);
    let mut out = DMatrix::zeros(npm, npm);
    for blk in 0..npm / 4 {
        out.fixed_view_mut::<4, 4>(blk * 4, blk * 4).copy_from(&omega);
    }
    out
}

/// Normalized scalar-last quaternion of a rotation matrix.
///
/// Caller contract: `r` has already been validated as a proper rotation.
pub fn quaternion_vec(r: &Matrix3<f64>) -> Vector4<f64> {
    let q = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(*r));
    q.coords.normalize()
}
