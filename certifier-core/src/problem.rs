//! Input data, settings, and result types for the certifier.
//!
//! This module defines the certification call's contract: what the caller
//! must provide, which configuration constants the certifier holds, and the
//! shape of the answer it returns.

use std::fmt;

use nalgebra::{Matrix3, Vector3};
use thiserror::Error;

/// Tolerance for the orthonormality check on the candidate rotation.
const ROTATION_TOL: f64 = 1e-6;

/// Errors raised before any matrix construction begins.
///
/// Numerical trouble inside the iteration is never an error: it surfaces as
/// a non-decreasing gap trajectory and an `ExhaustedIters` status instead.
#[derive(Error, Debug)]
pub enum CertifierError {
    /// Input arrays disagree in length
    #[error("{what} has length {actual}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// No correspondences were supplied
    #[error("cannot certify an empty correspondence set")]
    EmptyProblem,

    /// Candidate rotation is not orthonormal with determinant +1
    #[error("candidate rotation is not a proper rotation matrix")]
    InvalidRotation,

    /// Bad configuration constants
    #[error("invalid settings: {0}")]
    InvalidSettings(String),
}

/// Certifier settings and parameters.
///
/// Immutable for the lifetime of a [`DrsCertifier`](crate::DrsCertifier);
/// every `certify` call re-derives all per-call state from its inputs, so a
/// certifier with fixed settings may be shared across threads.
#[derive(Debug, Clone)]
pub struct CertifierSettings {
    /// Squared noise bound: the truncation threshold of the robust cost.
    /// A residual with squared norm above this is cheaper to label outlier.
    pub cbar2: f64,

    /// Maximum number of splitting iterations
    pub max_iterations: usize,

    /// Certification threshold on the relative sub-optimality gap
    pub gap_tolerance: f64,

    /// Douglas-Rachford relaxation parameter, in (0, 2]
    pub relaxation: f64,

    /// Print per-iteration progress to stderr
    pub verbose: bool,
}

impl Default for CertifierSettings {
    fn default() -> Self {
        Self {
            cbar2: 1.0,
            max_iterations: 200,
            gap_tolerance: 1e-6,
            relaxation: 1.0,
            verbose: false,
        }
    }
}

impl CertifierSettings {
    /// Validate the configuration constants.
    pub fn validate(&self) -> Result<(), CertifierError> {
        if !(self.cbar2.is_finite() && self.cbar2 > 0.0) {
            return Err(CertifierError::InvalidSettings(format!(
                "cbar2 must be positive and finite, got {}",
                self.cbar2
            )));
        }
        if !(self.gap_tolerance.is_finite() && self.gap_tolerance > 0.0) {
            return Err(CertifierError::InvalidSettings(format!(
                "gap_tolerance must be positive and finite, got {}",
                self.gap_tolerance
            )));
        }
        if !(self.relaxation > 0.0 && self.relaxation <= 2.0) {
            return Err(CertifierError::InvalidSettings(format!(
                "relaxation must lie in (0, 2], got {}",
                self.relaxation
            )));
        }
        Ok(())
    }
}

/// Termination status of a certification call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificationStatus {
    /// The gap trajectory reached the tolerance: the candidate rotation is
    /// certified globally optimal for the relaxation.
    Certified,

    /// Iteration budget spent without reaching the tolerance. Inconclusive,
    /// not a failure: the trajectory is still reported for diagnostics.
    ExhaustedIters,
}

impl fmt::Display for CertificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertificationStatus::Certified => write!(f, "Certified"),
            CertificationStatus::ExhaustedIters => write!(f, "ExhaustedIters"),
        }
    }
}

/// Result of a certification call.
#[derive(Debug, Clone)]
pub struct CertificationResult {
    /// Termination status
    pub status: CertificationStatus,

    /// Relative sub-optimality gap recorded after each completed iteration
    pub suboptimality_traj: Vec<f64>,

    /// Smallest gap seen along the trajectory (infinity if no iterations ran)
    pub best_suboptimality: f64,

    /// Number of iterations executed
    pub iterations: usize,

    /// Primal objective at the candidate solution
    pub mu: f64,
}

/// Check the per-call inputs before any matrix is built.
///
/// Mismatched lengths, an empty correspondence set, and a non-rotation
/// candidate all fail fast here.
pub fn validate_inputs(
    rotation: &Matrix3<f64>,
    src: &[Vector3<f64>],
    dst: &[Vector3<f64>],
    theta: &[bool],
) -> Result<(), CertifierError> {
    if dst.len() != src.len() {
        return Err(CertifierError::DimensionMismatch {
            what: "destination point set",
            expected: src.len(),
            actual: dst.len(),
        });
    }
    if theta.len() != src.len() {
        return Err(CertifierError::DimensionMismatch {
            what: "inlier indicator",
            expected: src.len(),
            actual: theta.len(),
        });
    }
    if src.is_empty() {
        return Err(CertifierError::EmptyProblem);
    }

    let gram = rotation.transpose() * rotation;
    if (gram - Matrix3::identity()).norm() > ROTATION_TOL || rotation.determinant() <= 0.0 {
        return Err(CertifierError::InvalidRotation);
    }

    Ok(())
}

/// Prepend the constant 1.0 for the global block and map the boolean
/// indicator to ±1.0.
pub fn prepend_theta(theta: &[bool]) -> Vec<f64> {
    let mut out = Vec::with_capacity(theta.len() + 1);
    out.push(1.0);
    out.extend(theta.iter().map(|&t| if t { 1.0 } else { -1.0 }));
    out
}
