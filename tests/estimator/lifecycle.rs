use dualtree_kde::kde::DEFAULT_RELATIVE_ERROR;
use dualtree_kde::prelude::*;

use crate::{assert_close, random_points};

#[test]
fn test_borrowed_kernel_and_metric() {
    let kernel = GaussianKernel::new(0.4).unwrap();
    let metric = EuclideanDistance;

    let kde: Kde = Kde::builder()
        .kernel_ref(&kernel)
        .metric_ref(&metric)
        .build()
        .unwrap();

    assert!(!kde.owns_kernel());
    assert!(!kde.owns_metric());
    assert!(core::ptr::eq(kde.kernel(), &kernel));

    let copy = kde.clone();
    assert!(!copy.owns_kernel());
    assert!(core::ptr::eq(copy.kernel(), &kernel));
}

#[test]
fn test_clone_deep_copies_owned_resources() {
    let mut kde: Kde = Kde::builder().bandwidth(0.3).relative_error(0.0).build().unwrap();
    kde.train(random_points(100, 2, 1.0, 1)).unwrap();

    let copy = kde.clone();
    assert!(copy.owns_kernel());
    assert!(copy.owns_reference_tree());
    assert!(!core::ptr::eq(copy.kernel(), kde.kernel()));
    assert!(!core::ptr::eq(
        copy.reference_tree().unwrap(),
        kde.reference_tree().unwrap()
    ));
    assert_eq!(copy.reference_permutation(), kde.reference_permutation());

    drop(kde);
    let query = random_points(20, 2, 1.0, 2);
    assert_eq!(copy.evaluate(&query).unwrap().len(), 20);
}

#[test]
fn test_clone_shares_borrowed_tree() {
    let (tree, _) = KdTree::build(random_points(60, 2, 1.0, 3), EuclideanDistance);
    let mut kde: Kde = Kde::default();
    kde.train_with_tree(&tree).unwrap();

    let copy = kde.clone();
    assert!(!copy.owns_reference_tree());
    assert!(core::ptr::eq(copy.reference_tree().unwrap(), &tree));
}

#[test]
fn test_take_leaves_default_estimator() {
    let mut kde: Kde = Kde::builder()
        .bandwidth(0.7)
        .relative_error(0.2)
        .breadth_first()
        .build()
        .unwrap();
    kde.train(random_points(50, 3, 1.0, 4)).unwrap();

    let taken = core::mem::take(&mut kde);

    assert!(taken.is_trained());
    assert!((taken.kernel().bandwidth() - 0.7).abs() < f64::EPSILON);
    assert_eq!(taken.traversal(), TraversalOrder::BreadthFirst);

    assert!(!kde.is_trained());
    assert!(kde.reference_tree().is_none());
    assert!((kde.kernel().bandwidth() - 1.0).abs() < f64::EPSILON);
    assert!((kde.relative_error() - DEFAULT_RELATIVE_ERROR).abs() < f64::EPSILON);
    assert_eq!(kde.traversal(), TraversalOrder::DepthFirst);
    assert!(matches!(kde.evaluate_reference(), Err(Error::NotTrained)));
}

#[test]
fn test_retrain_replaces_tree() {
    let mut kde: Kde = Kde::default();
    kde.train(random_points(40, 2, 1.0, 5)).unwrap();
    kde.train(random_points(70, 2, 1.0, 6)).unwrap();

    assert_eq!(kde.reference_tree().unwrap().dataset().len(), 70);
    assert_eq!(kde.reference_permutation().len(), 70);
    assert_eq!(kde.evaluate_reference().unwrap().len(), 70);
}

#[test]
fn test_train_with_tree_ownership() {
    let (tree, _) = KdTree::build(random_points(80, 2, 1.0, 7), EuclideanDistance);

    let mut borrowed: Kde = Kde::default();
    borrowed.train_with_tree(&tree).unwrap();
    assert!(borrowed.is_trained());
    assert!(!borrowed.owns_reference_tree());
    assert!(borrowed.reference_permutation().is_empty());

    let mut owned: Kde = Kde::default();
    owned.train_with_owned_tree(tree.clone()).unwrap();
    assert!(owned.owns_reference_tree());

    let query = random_points(25, 2, 1.0, 8);
    assert_close(
        &owned.evaluate(&query).unwrap(),
        &borrowed.evaluate(&query).unwrap(),
        1e-12,
    );
}

#[test]
fn test_train_after_borrowed_tree_takes_ownership() {
    let (tree, _) = KdTree::build(random_points(30, 2, 1.0, 9), EuclideanDistance);
    let mut kde: Kde = Kde::default();
    kde.train_with_tree(&tree).unwrap();
    kde.train(random_points(45, 2, 1.0, 10)).unwrap();

    assert!(kde.owns_reference_tree());
    assert_eq!(kde.reference_tree().unwrap().dataset().len(), 45);
    assert_eq!(tree.dataset().len(), 30);
}

#[test]
fn test_set_kernel_keeps_tree() {
    let reference = random_points(200, 2, 1.0, 11);
    let query = random_points(40, 2, 1.0, 12);

    let mut kde: Kde = Kde::builder().bandwidth(2.0).relative_error(0.0).build().unwrap();
    kde.train(reference.clone()).unwrap();
    let tree_before: *const KdTree = kde.reference_tree().unwrap();

    kde.set_kernel(GaussianKernel::new(0.25).unwrap());
    assert!(core::ptr::eq(kde.reference_tree().unwrap(), tree_before));
    assert!(kde.is_trained());

    let mut fresh: Kde = Kde::builder().bandwidth(0.25).relative_error(0.0).build().unwrap();
    fresh.train(reference).unwrap();

    assert_close(
        &kde.evaluate(&query).unwrap(),
        &fresh.evaluate(&query).unwrap(),
        1e-12,
    );
}

#[test]
fn test_set_kernel_ref_switches_to_borrowed() {
    let kernel = GaussianKernel::new(0.5).unwrap();
    let mut kde: Kde = Kde::default();
    kde.train(random_points(30, 2, 1.0, 13)).unwrap();

    kde.set_kernel_ref(&kernel);
    assert!(!kde.owns_kernel());
    assert!(kde.is_trained());

    kde.set_kernel(GaussianKernel::new(0.5).unwrap());
    assert!(kde.owns_kernel());
}

#[test]
fn test_changing_tolerance_after_training() {
    let reference = random_points(300, 2, 1.0, 14);
    let query = random_points(30, 2, 1.0, 15);

    let mut kde: Kde = Kde::builder().bandwidth(0.2).relative_error(0.5).build().unwrap();
    kde.train(reference.clone()).unwrap();
    kde.set_relative_error(0.0).unwrap();

    let mut naive = NaiveKde::new(GaussianKernel::new(0.2).unwrap(), EuclideanDistance);
    naive.train(reference).unwrap();

    assert_close(
        &kde.evaluate(&query).unwrap(),
        &naive.evaluate(&query).unwrap(),
        1e-9,
    );
}

#[test]
fn test_set_traversal() {
    let mut kde: Kde = Kde::default();
    kde.set_traversal(TraversalOrder::BreadthFirst);
    assert!(kde.traversal().is_breadth_first());
}
