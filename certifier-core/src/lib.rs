//! Optimality certification for robust rotation registration.
//!
//! Given a candidate rotation from a robust point-set registration
//! estimator, two corresponding 3D point sets, and a per-correspondence
//! inlier/outlier labeling, this crate certifies whether the candidate is
//! the globally optimal solution of the problem's semidefinite relaxation
//! without ever solving the SDP. It does so by searching the affine set of
//! valid dual certificates for a positive-semidefinite member with a
//! Douglas-Rachford splitting scheme:
//!
//! - **Cost lifting**: the truncated least-squares registration cost is
//!   lifted to a quadratic form over stacked unit quaternions.
//! - **Canonical frame**: a block quaternion embedding rotates the problem
//!   so the candidate sits at the identity.
//! - **Closed-form dual seed**: the KKT conditions give a sparse initial
//!   certificate guess with no iteration.
//! - **Splitting loop**: alternating PSD-cone and affine-subspace
//!   projections refine the certificate while a sub-optimality gap
//!   trajectory is recorded.
//!
//! A gap at tolerance certifies global optimality. Exhausting the iteration
//! budget is an expected, inconclusive outcome, not an error.
//!
//! # Example
//!
//! ```ignore
//! use certifier_core::{certify, CertifierSettings};
//! use nalgebra::{Matrix3, Vector3};
//!
//! let rotation = Matrix3::identity();
//! let src = vec![Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0)];
//! let dst = src.clone();
//! let theta = vec![true, true];
//!
//! let result = certify(&rotation, &src, &dst, &theta, &CertifierSettings::default())?;
//! println!("status: {}", result.status);
//! println!("gap trajectory: {:?}", result.suboptimality_traj);
//! ```

#![warn(clippy::all)]

pub mod cost;
pub mod drs;
pub mod initial;
pub mod linalg;
pub mod problem;
pub mod projection;
pub mod quat;

pub use drs::DrsCertifier;
pub use problem::{
    CertificationResult, CertificationStatus, CertifierError, CertifierSettings,
};

use nalgebra::{Matrix3, Vector3};

/// One-shot certification entry point.
///
/// Builds a [`DrsCertifier`] from `settings` and runs a single
/// certification call.
pub fn certify(
    rotation: &Matrix3<f64>,
    src: &[Vector3<f64>],
    dst: &[Vector3<f64>],
    theta: &[bool],
    settings: &CertifierSettings,
) -> Result<CertificationResult, CertifierError> {
    DrsCertifier::new(settings.clone())?.certify(rotation, src, dst, theta)
}
