use dualtree_kde::prelude::*;
use dualtree_kde::tree::DEFAULT_LEAF_SIZE;

use crate::random_points;

#[test]
fn test_train_rejects_empty_reference_set() {
    let mut kde: Kde = Kde::default();
    let result = kde.train(PointSet::empty(3));
    assert!(matches!(result, Err(Error::EmptyReferenceSet)));
    assert!(!kde.is_trained());
}

#[test]
fn test_train_with_tree_rejects_empty_tree() {
    let (tree, _) = KdTree::build(PointSet::empty(2), EuclideanDistance);
    let mut kde: Kde = Kde::default();
    assert!(matches!(kde.train_with_tree(&tree), Err(Error::EmptyReferenceSet)));

    let (ball, _) = BallTree::build(PointSet::empty(2), EuclideanDistance);
    let mut kde: Kde<'_, EuclideanDistance, GaussianKernel, BallTree> = Kde::default();
    assert!(matches!(kde.train_with_owned_tree(ball), Err(Error::EmptyReferenceSet)));
    assert!(!kde.is_trained());
}

#[test]
fn test_failed_training_keeps_previous_tree() {
    let mut kde: Kde = Kde::default();
    kde.train(random_points(30, 2, 1.0, 1)).unwrap();
    assert!(kde.train(PointSet::empty(2)).is_err());

    assert!(kde.is_trained());
    assert_eq!(kde.reference_tree().unwrap().dataset().len(), 30);
}

#[test]
fn test_evaluate_before_training() {
    let kde: Kde = Kde::default();
    let query = random_points(5, 2, 1.0, 2);
    let (query_tree, old_from_new) = KdTree::build(query.clone(), EuclideanDistance);

    assert!(matches!(kde.evaluate(&query), Err(Error::NotTrained)));
    assert!(matches!(
        kde.evaluate_tree(&query_tree, &old_from_new),
        Err(Error::NotTrained)
    ));
    assert!(matches!(kde.evaluate_reference(), Err(Error::NotTrained)));
    assert!(matches!(kde.evaluate_single_tree(&query), Err(Error::NotTrained)));
}

#[test]
fn test_empty_query_before_training_is_not_trained() {
    let kde: Kde = Kde::default();
    assert!(matches!(kde.evaluate(&PointSet::empty(2)), Err(Error::NotTrained)));
}

#[test]
fn test_empty_query_yields_empty_result() {
    let mut kde: Kde = Kde::default();
    kde.train(random_points(40, 2, 1.0, 3)).unwrap();

    assert!(kde.evaluate(&PointSet::empty(2)).unwrap().is_empty());
    assert!(kde.evaluate_single_tree(&PointSet::empty(2)).unwrap().is_empty());

    let (empty_tree, _) = KdTree::build(PointSet::empty(2), EuclideanDistance);
    assert!(kde.evaluate_tree(&empty_tree, &[]).unwrap().is_empty());
}

#[test]
fn test_empty_query_skips_dimension_check() {
    let mut kde: Kde = Kde::default();
    kde.train(random_points(40, 2, 1.0, 4)).unwrap();
    assert!(kde.evaluate(&PointSet::empty(5)).unwrap().is_empty());
}

#[test]
fn test_dimension_mismatch() {
    let mut kde: Kde = Kde::default();
    kde.train(random_points(40, 3, 1.0, 5)).unwrap();
    let query = random_points(10, 2, 1.0, 6);

    assert!(matches!(
        kde.evaluate(&query),
        Err(Error::DimensionMismatch {
            expected: 3,
            got: 2
        })
    ));
    assert!(matches!(
        kde.evaluate_single_tree(&query),
        Err(Error::DimensionMismatch { .. })
    ));

    let (query_tree, old_from_new) = KdTree::build(query, EuclideanDistance);
    assert!(matches!(
        kde.evaluate_tree(&query_tree, &old_from_new),
        Err(Error::DimensionMismatch { .. })
    ));
}

#[test]
fn test_query_permutation_must_match_tree() {
    let mut kde: Kde = Kde::default();
    kde.train(random_points(100, 2, 1.0, 8)).unwrap();
    let (query_tree, old_from_new) = KdTree::build(random_points(50, 2, 1.0, 9), EuclideanDistance);

    assert!(matches!(
        kde.evaluate_tree(&query_tree, &[0, 1, 2]),
        Err(Error::PermutationMismatch {
            expected: 50,
            got: 3
        })
    ));

    let mut long = old_from_new.clone();
    long.push(0);
    assert!(matches!(
        kde.evaluate_tree(&query_tree, &long),
        Err(Error::PermutationMismatch {
            expected: 50,
            got: 51
        })
    ));

    let mut out_of_range = old_from_new.clone();
    out_of_range[7] = 50;
    assert!(matches!(
        kde.evaluate_tree(&query_tree, &out_of_range),
        Err(Error::PermutationOutOfRange {
            position: 7,
            value: 50,
            len: 50
        })
    ));

    assert_eq!(kde.evaluate_tree(&query_tree, &old_from_new).unwrap().len(), 50);
    assert_eq!(kde.evaluate_tree(&query_tree, &[]).unwrap().len(), 50);
}

#[test]
fn test_relative_error_boundaries() {
    let build = |relative: f64| -> Result<Kde> { Kde::builder().relative_error(relative).build() };

    assert!(build(0.0).is_ok());
    assert!(build(1.0).is_ok());
    assert!(matches!(build(-0.1), Err(Error::InvalidRelativeError(_))));
    assert!(matches!(build(1.1), Err(Error::InvalidRelativeError(_))));
    assert!(matches!(build(f64::NAN), Err(Error::InvalidRelativeError(_))));
}

#[test]
fn test_absolute_error_boundaries() {
    let build = |absolute: f64| -> Result<Kde> { Kde::builder().absolute_error(absolute).build() };

    assert!(build(0.0).is_ok());
    assert!(build(25.0).is_ok());
    assert!(matches!(build(-0.1), Err(Error::InvalidAbsoluteError(_))));
    assert!(matches!(build(f64::NAN), Err(Error::InvalidAbsoluteError(_))));
}

#[test]
fn test_new_validates_tolerances() {
    let result: Result<Kde> = Kde::new(
        GaussianKernel::default(),
        EuclideanDistance,
        2.0,
        0.0,
        TraversalOrder::DepthFirst,
    );
    assert!(matches!(result, Err(Error::InvalidRelativeError(_))));
}

#[test]
fn test_setters_reject_and_keep_old_value() {
    let mut kde: Kde = Kde::builder().relative_error(0.3).build().unwrap();
    assert!(kde.set_relative_error(-1.0).is_err());
    assert!((kde.relative_error() - 0.3).abs() < f64::EPSILON);
    assert!(kde.set_absolute_error(-1.0).is_err());
    assert!(kde.absolute_error().abs() < f64::EPSILON);
}

#[test]
fn test_invalid_bandwidth() {
    for bandwidth in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            GaussianKernel::new(bandwidth),
            Err(Error::InvalidBandwidth(_))
        ));
        assert!(matches!(
            SphericalKernel::new(bandwidth),
            Err(Error::InvalidBandwidth(_))
        ));
        let built: Result<Kde> = Kde::builder().bandwidth(bandwidth).build();
        assert!(matches!(built, Err(Error::InvalidBandwidth(_))));
    }
}

#[test]
fn test_invalid_leaf_size() {
    let points = random_points(10, 2, 1.0, 7);
    assert!(matches!(
        KdTree::with_leaf_size(points.clone(), EuclideanDistance, 0),
        Err(Error::InvalidLeafSize)
    ));
    assert!(matches!(
        BallTree::with_leaf_size(points.clone(), EuclideanDistance, 0),
        Err(Error::InvalidLeafSize)
    ));
    assert!(KdTree::with_leaf_size(points, EuclideanDistance, DEFAULT_LEAF_SIZE).is_ok());
}

#[test]
fn test_malformed_points() {
    assert!(matches!(
        PointSet::from_points(vec![vec![0.0, 1.0], vec![2.0]]),
        Err(Error::RaggedPoints {
            expected: 2,
            got: 1,
            point_index: 1
        })
    ));
    assert!(matches!(
        PointSet::new(3, vec![0.0; 7]),
        Err(Error::MalformedPointData { len: 7, dim: 3 })
    ));
    assert!(matches!(PointSet::new(0, vec![]), Err(Error::ZeroDimensions)));
}

#[test]
fn test_error_messages() {
    assert_eq!(
        Error::DimensionMismatch {
            expected: 3,
            got: 2
        }
        .to_string(),
        "dimension mismatch: reference set has 3 dimensions but query set has 2"
    );
    assert_eq!(Error::NotTrained.to_string(), "KDE model has not been trained");
}
