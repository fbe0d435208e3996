use dualtree_kde::prelude::*;

use crate::{assert_close, random_points};

fn naive<M: Metric, K: Kernel>(
    kernel: K,
    metric: M,
    reference: &PointSet,
    query: &PointSet,
) -> Vec<f64> {
    let mut naive = NaiveKde::new(kernel, metric);
    naive.train(reference.clone()).unwrap();
    naive.evaluate(query).unwrap()
}

fn exact_matches_naive<K, T>(kernel: K, dim: usize, seed: u64)
where
    K: Kernel + Clone + Default,
    T: SpatialTree<Metric = EuclideanDistance>,
{
    let reference = random_points(300, dim, 1.0, seed);
    let query = random_points(70, dim, 1.0, seed + 1);
    let expected = naive(kernel.clone(), EuclideanDistance, &reference, &query);

    let mut kde: Kde<'_, EuclideanDistance, K, T> = Kde::builder()
        .kernel(kernel)
        .relative_error(0.0)
        .absolute_error(0.0)
        .build()
        .unwrap();
    kde.train(reference).unwrap();
    let densities = kde.evaluate(&query).unwrap();

    assert_close(&densities, &expected, 1e-9);
}

#[test]
fn test_exact_mode_matches_brute_force_kd_tree() {
    for dim in 1..=3 {
        exact_matches_naive::<_, KdTree>(GaussianKernel::new(0.3).unwrap(), dim, 10);
        exact_matches_naive::<_, KdTree>(EpanechnikovKernel::new(0.4).unwrap(), dim, 20);
        exact_matches_naive::<_, KdTree>(LaplacianKernel::new(0.2).unwrap(), dim, 30);
        exact_matches_naive::<_, KdTree>(SphericalKernel::new(0.35).unwrap(), dim, 40);
        exact_matches_naive::<_, KdTree>(TriangularKernel::new(0.5).unwrap(), dim, 50);
    }
}

#[test]
fn test_exact_mode_matches_brute_force_ball_tree() {
    for dim in 1..=3 {
        exact_matches_naive::<_, BallTree>(GaussianKernel::new(0.3).unwrap(), dim, 60);
        exact_matches_naive::<_, BallTree>(EpanechnikovKernel::new(0.4).unwrap(), dim, 70);
        exact_matches_naive::<_, BallTree>(LaplacianKernel::new(0.2).unwrap(), dim, 80);
        exact_matches_naive::<_, BallTree>(TriangularKernel::new(0.5).unwrap(), dim, 90);
    }
}

#[test]
fn test_exact_mode_other_metrics() {
    let reference = random_points(200, 2, 1.0, 100);
    let query = random_points(50, 2, 1.0, 101);
    let kernel = GaussianKernel::new(0.25).unwrap();

    let mut manhattan: Kde<'_, ManhattanDistance> = Kde::builder()
        .kernel(kernel)
        .relative_error(0.0)
        .build()
        .unwrap();
    manhattan.train(reference.clone()).unwrap();
    assert_close(
        &manhattan.evaluate(&query).unwrap(),
        &naive(kernel, ManhattanDistance, &reference, &query),
        1e-9,
    );

    let mut chebyshev: Kde<'_, ChebyshevDistance, GaussianKernel, BallTree<ChebyshevDistance>> =
        Kde::builder().kernel(kernel).relative_error(0.0).build().unwrap();
    chebyshev.train(reference.clone()).unwrap();
    assert_close(
        &chebyshev.evaluate(&query).unwrap(),
        &naive(kernel, ChebyshevDistance, &reference, &query),
        1e-9,
    );
}

#[test]
fn test_gaussian_scenario_within_five_percent() {
    let reference = random_points(500, 3, 1.0, 200);
    let query = random_points(100, 3, 1.0, 201);
    let kernel = GaussianKernel::new(1.5).unwrap();
    let expected = naive(kernel, EuclideanDistance, &reference, &query);

    for order in [TraversalOrder::DepthFirst, TraversalOrder::BreadthFirst] {
        let mut kde: Kde = Kde::builder()
            .kernel(kernel)
            .relative_error(0.05)
            .traversal(order)
            .build()
            .unwrap();
        kde.train(reference.clone()).unwrap();
        let densities = kde.evaluate(&query).unwrap();

        assert_eq!(densities.len(), 100);
        assert_close(&densities, &expected, 0.05);
    }
}

#[test]
fn test_error_bound_holds_for_every_query() {
    // Pruning moves each query's unnormalized kernel sum by at most the total tolerance.
    let reference = random_points(600, 2, 1.0, 300);
    let query = random_points(80, 2, 1.0, 301);
    let kernel = GaussianKernel::new(0.1).unwrap();
    let expected = naive(kernel, EuclideanDistance, &reference, &query);
    let scale = 600.0 * kernel.normalizer(2);

    for (relative, absolute) in [(0.01, 0.0), (0.1, 0.0), (0.5, 0.0), (0.05, 0.2)] {
        let mut kde: Kde = Kde::builder()
            .kernel(kernel)
            .relative_error(relative)
            .absolute_error(absolute)
            .build()
            .unwrap();
        kde.train(reference.clone()).unwrap();
        let densities = kde.evaluate(&query).unwrap();

        for (got, want) in densities.iter().zip(&expected) {
            let sum_error = (got - want).abs() * scale;
            assert!(
                sum_error <= relative + absolute + 1e-9,
                "kernel sum off by {sum_error} with tolerance {relative} + {absolute}"
            );
        }
    }
}

#[test]
fn test_relative_bound_when_kernel_sums_exceed_one() {
    let reference = random_points(400, 2, 1.0, 400);
    let query = random_points(60, 2, 1.0, 401);
    let kernel = GaussianKernel::new(1.0).unwrap();
    let expected = naive(kernel, EuclideanDistance, &reference, &query);

    for epsilon in [0.01, 0.1, 0.3] {
        let mut kde: Kde = Kde::builder().kernel(kernel).relative_error(epsilon).build().unwrap();
        kde.train(reference.clone()).unwrap();
        assert_close(&kde.evaluate(&query).unwrap(), &expected, epsilon);
    }
}

#[test]
fn test_depth_first_and_breadth_first_agree() {
    let reference = random_points(500, 2, 4.0, 500);
    let query = random_points(120, 2, 4.0, 501);

    let evaluate = |order: TraversalOrder| {
        let mut kde: Kde<'_, EuclideanDistance, EpanechnikovKernel> = Kde::builder()
            .bandwidth(0.6)
            .relative_error(0.1)
            .traversal(order)
            .build()
            .unwrap();
        kde.train(reference.clone()).unwrap();
        kde.evaluate(&query).unwrap()
    };

    let depth = evaluate(TraversalOrder::DepthFirst);
    let breadth = evaluate(TraversalOrder::BreadthFirst);
    assert_close(&depth, &breadth, 1e-12);
}

#[test]
fn test_evaluate_tree_reuses_query_tree() {
    let reference = random_points(250, 2, 1.0, 600);
    let query = random_points(90, 2, 1.0, 601);

    let mut kde: Kde = Kde::builder().bandwidth(0.2).relative_error(0.01).build().unwrap();
    kde.train(reference).unwrap();

    let (query_tree, old_from_new) = KdTree::build(query.clone(), EuclideanDistance);
    let from_tree = kde.evaluate_tree(&query_tree, &old_from_new).unwrap();
    let direct = kde.evaluate(&query).unwrap();
    assert_close(&from_tree, &direct, 1e-12);

    // Without the permutation results come back in tree order.
    let tree_order = kde.evaluate_tree(&query_tree, &[]).unwrap();
    for (new, &old) in old_from_new.iter().enumerate() {
        assert!((tree_order[new] - direct[old]).abs() <= 1e-12 * direct[old].max(1.0));
    }
}

#[test]
fn test_evaluate_reference_matches_explicit_query() {
    let reference = random_points(300, 3, 1.0, 700);
    let kernel = LaplacianKernel::new(0.3).unwrap();
    let expected = naive(kernel, EuclideanDistance, &reference, &reference);

    let mut kde: Kde<'_, EuclideanDistance, LaplacianKernel> =
        Kde::builder().kernel(kernel).relative_error(0.0).build().unwrap();
    kde.train(reference).unwrap();

    assert_close(&kde.evaluate_reference().unwrap(), &expected, 1e-9);
}

#[test]
fn test_evaluate_reference_on_borrowed_tree_uses_tree_order() {
    let reference = random_points(150, 2, 1.0, 800);
    let (tree, _) = KdTree::build(reference, EuclideanDistance);
    let kernel = GaussianKernel::new(0.2).unwrap();
    let expected = naive(kernel, EuclideanDistance, tree.dataset(), tree.dataset());

    let mut kde: Kde = Kde::builder().kernel(kernel).relative_error(0.0).build().unwrap();
    kde.train_with_tree(&tree).unwrap();

    assert_close(&kde.evaluate_reference().unwrap(), &expected, 1e-9);
}

#[test]
fn test_single_tree_matches_brute_force() {
    let reference = random_points(220, 2, 1.0, 900);
    let query = random_points(40, 2, 1.0, 901);
    let kernel = EpanechnikovKernel::new(0.3).unwrap();
    let expected = naive(kernel, EuclideanDistance, &reference, &query);

    let mut kde: Kde<'_, EuclideanDistance, EpanechnikovKernel, BallTree> =
        Kde::builder().kernel(kernel).relative_error(0.5).build().unwrap();
    kde.train(reference).unwrap();

    assert_close(&kde.evaluate_single_tree(&query).unwrap(), &expected, 1e-9);
}

#[test]
fn test_density_integrates_to_one() {
    // A normalized 1-D estimate summed over a fine grid approximates its integral.
    let reference = random_points(50, 1, 1.0, 1000);
    let step = 0.01;
    let grid: Vec<f64> = (0..600).map(|i| -2.5 + f64::from(i) * step).collect();

    let mut kde: Kde = Kde::builder().bandwidth(0.2).relative_error(0.0).build().unwrap();
    kde.train(reference).unwrap();
    let densities = kde.evaluate(&PointSet::new(1, grid).unwrap()).unwrap();

    let integral: f64 = densities.iter().sum::<f64>() * step;
    assert!((integral - 1.0).abs() < 1e-3, "integral was {integral}");
}
