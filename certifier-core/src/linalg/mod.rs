//! Small dense/sparse linear-algebra helpers shared by the certifier.
//!
//! Dense work goes through `nalgebra`, sparse construction through `sprs`
//! triplets (duplicate entries accumulate by summation).

pub mod psd;
pub mod sparse;

use nalgebra::{DVector, Matrix3, Vector3};

/// Skew-symmetric "hat" map of a 3-vector: `hat(v) * w == v.cross(&w)`.
pub fn hat(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(
        0.0, -v.z, v.y,
        v.z, 0.0, -v.x,
        -v.y, v.x, 0.0,
    )
}

/// Kronecker product of two vectors: `out[i * b.len() + j] = a[i] * b[j]`.
pub fn kron_vec(a: &[f64], b: &[f64]) -> DVector<f64> {
    let mut out = DVector::zeros(a.len() * b.len());
    for (i, &ai) in a.iter().enumerate() {
        for (j, &bj) in b.iter().enumerate() {
            out[i * b.len() + j] = ai * bj;
        }
    }
    out
}
