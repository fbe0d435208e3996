#![allow(clippy::cast_precision_loss)]

mod accuracy;
mod errors;
mod lifecycle;

use dualtree_kde::PointSet;

/// `n` points drawn uniformly from `[0, scale)^dim`.
pub fn random_points(n: usize, dim: usize, scale: f64, seed: u64) -> PointSet {
    let mut rng = fastrand::Rng::with_seed(seed);
    PointSet::new(dim, (0..n * dim).map(|_| rng.f64() * scale).collect()).unwrap()
}

/// Asserts `got` and `want` agree within `rel` relative tolerance.
pub fn assert_close(got: &[f64], want: &[f64], rel: f64) {
    assert_eq!(got.len(), want.len());
    for (i, (g, w)) in got.iter().zip(want).enumerate() {
        let err = (g - w).abs();
        assert!(
            err <= rel * w.abs() + 1e-12,
            "point {i}: got {g}, want {w} (relative error {})",
            err / w.abs()
        );
    }
}
