//! End-to-end certification scenarios.
//!
//! These tests exercise the full pipeline: cost lifting, quaternion
//! embedding, dual seeding, and the splitting loop, on both well-posed and
//! deliberately broken inputs.

use approx::assert_relative_eq;
use certifier_core::{
    certify, CertificationStatus, CertifierError, CertifierSettings, DrsCertifier,
};
use nalgebra::{Matrix3, Rotation3, Vector3};

fn sample_rotation() -> Rotation3<f64> {
    Rotation3::from_axis_angle(&Vector3::y_axis(), 0.7)
        * Rotation3::from_axis_angle(&Vector3::x_axis(), -0.25)
}

fn sample_cloud() -> Vec<Vector3<f64>> {
    vec![
        Vector3::new(1.0, 0.2, -0.5),
        Vector3::new(-0.7, 1.4, 0.3),
        Vector3::new(0.4, -0.9, 1.1),
        Vector3::new(2.0, 0.1, 0.6),
    ]
}

#[test]
fn test_single_perfect_correspondence_certifies() {
    // N = 1, source equals destination, identity rotation: the candidate is
    // trivially optimal with zero cost
    let src = vec![Vector3::new(1.0, 2.0, 3.0)];
    let dst = src.clone();
    let theta = vec![true];

    let settings = CertifierSettings {
        max_iterations: 20,
        ..Default::default()
    };
    let result = certify(&Matrix3::identity(), &src, &dst, &theta, &settings).unwrap();

    assert_eq!(result.status, CertificationStatus::Certified);
    assert_relative_eq!(result.mu, 0.0, epsilon = 1e-9);
    assert!(result.best_suboptimality <= settings.gap_tolerance);
    assert!(result.iterations <= 5, "took {} iterations", result.iterations);
}

#[test]
fn test_noiseless_rotation_certifies() {
    // exact correspondences under a non-trivial rotation, all inliers
    let rot = sample_rotation();
    let src = sample_cloud();
    let dst: Vec<_> = src.iter().map(|p| rot * p).collect();
    let theta = vec![true; src.len()];

    let certifier = DrsCertifier::new(CertifierSettings::default()).unwrap();
    let result = certifier.certify(rot.matrix(), &src, &dst, &theta).unwrap();

    assert_eq!(result.status, CertificationStatus::Certified);
    assert_relative_eq!(result.mu, 0.0, epsilon = 1e-8);
    assert!(!result.suboptimality_traj.is_empty());
}

#[test]
fn test_corrupted_inlier_is_not_certified() {
    // one correspondence is grossly wrong but still labeled inlier: the
    // candidate cannot be optimal and the gap must stay above tolerance
    let rot = sample_rotation();
    let src = sample_cloud();
    let mut dst: Vec<_> = src.iter().map(|p| rot * p).collect();
    dst[2] += Vector3::new(10.0, -8.0, 5.0);
    let theta = vec![true; src.len()];

    let settings = CertifierSettings {
        cbar2: 0.1,
        max_iterations: 60,
        ..Default::default()
    };
    let result = certify(rot.matrix(), &src, &dst, &theta, &settings).unwrap();

    assert_eq!(result.status, CertificationStatus::ExhaustedIters);
    assert_eq!(result.iterations, 60);
    assert!(result.best_suboptimality > settings.gap_tolerance);
}

#[test]
fn test_outliers_are_ignored_by_the_certificate() {
    // corrupted correspondences that are correctly labeled outliers keep a
    // sensible primal objective
    let rot = sample_rotation();
    let src = sample_cloud();
    let mut dst: Vec<_> = src.iter().map(|p| rot * p).collect();
    dst[1] += Vector3::new(4.0, 4.0, -4.0);
    let mut theta = vec![true; src.len()];
    theta[1] = false;

    let settings = CertifierSettings::default();
    let result = certify(rot.matrix(), &src, &dst, &theta, &settings).unwrap();

    // outlier labeling pays exactly the truncation constant per outlier in
    // the lifted objective
    assert_relative_eq!(result.mu, settings.cbar2, epsilon = 1e-8);
    assert_eq!(result.iterations, result.suboptimality_traj.len());
}

#[test]
fn test_empty_problem_is_rejected() {
    let err = certify(
        &Matrix3::identity(),
        &[],
        &[],
        &[],
        &CertifierSettings::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CertifierError::EmptyProblem));
}

#[test]
fn test_mismatched_lengths_are_rejected() {
    let src = vec![Vector3::new(1.0, 0.0, 0.0), Vector3::new(0.0, 1.0, 0.0)];
    let dst = vec![Vector3::new(1.0, 0.0, 0.0)];
    let theta = vec![true, true];
    let err = certify(
        &Matrix3::identity(),
        &src,
        &dst,
        &theta,
        &CertifierSettings::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CertifierError::DimensionMismatch { .. }));
}

#[test]
fn test_non_rotation_is_rejected() {
    let scaled = Matrix3::identity() * 1.5;
    let src = vec![Vector3::new(1.0, 0.0, 0.0)];
    let dst = src.clone();
    let theta = vec![true];
    let err = certify(&scaled, &src, &dst, &theta, &CertifierSettings::default()).unwrap_err();
    assert!(matches!(err, CertifierError::InvalidRotation));
}

#[test]
fn test_trajectory_is_reported_on_exhaustion() {
    // even a tiny iteration budget returns the full trajectory
    let rot = sample_rotation();
    let src = sample_cloud();
    let mut dst: Vec<_> = src.iter().map(|p| rot * p).collect();
    dst[0] += Vector3::new(6.0, 0.0, 0.0);
    let theta = vec![true; src.len()];

    let settings = CertifierSettings {
        cbar2: 0.1,
        max_iterations: 3,
        ..Default::default()
    };
    let result = certify(rot.matrix(), &src, &dst, &theta, &settings).unwrap();

    assert_eq!(result.status, CertificationStatus::ExhaustedIters);
    assert_eq!(result.suboptimality_traj.len(), 3);
    assert!(result.suboptimality_traj.iter().all(|g| g.is_finite()));
}
