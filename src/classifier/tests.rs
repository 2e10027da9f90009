use super::*;

/// Two well-separated 2-D clusters: label 0 near the origin, label 1 near (10, 10)
fn clustered_training_set() -> (Vec<Vec<f64>>, Vec<usize>) {
    let rows = vec![
        vec![0.0, 0.0],
        vec![0.5, 0.2],
        vec![0.1, 0.6],
        vec![10.0, 10.0],
        vec![10.4, 9.7],
        vec![9.8, 10.3],
    ];
    let labels = vec![0, 0, 0, 1, 1, 1];
    (rows, labels)
}

fn trained(k: usize) -> KnnClassifier {
    let (rows, labels) = clustered_training_set();
    let mut classifier = KnnClassifier::new(k).unwrap();
    classifier.train(&rows, &labels).unwrap();
    classifier
}

#[test]
fn test_zero_k_rejected() {
    assert_eq!(
        KnnClassifier::new(0).unwrap_err(),
        ClassifierError::InvalidK { k: 0 }
    );
}

#[test]
fn test_predict_before_train() {
    let classifier = KnnClassifier::new(3).unwrap();
    assert!(!classifier.is_trained());
    assert_eq!(
        classifier.predict(&[0.0, 0.0]),
        Err(ClassifierError::NotTrained)
    );
    assert_eq!(
        classifier.predict_batch(&[vec![0.0, 0.0]]),
        Err(ClassifierError::NotTrained)
    );
}

#[test]
fn test_dimension_mismatch() {
    let classifier = trained(3);
    assert_eq!(
        classifier.predict(&[0.0, 0.0, 0.0]),
        Err(ClassifierError::DimensionMismatch {
            expected: 2,
            actual: 3
        })
    );
}

#[test]
fn test_train_validation() {
    let mut classifier = KnnClassifier::new(1).unwrap();
    assert_eq!(
        classifier.train(&[], &[]),
        Err(ClassifierError::EmptyTrainingSet)
    );
    assert_eq!(
        classifier.train(&[vec![1.0]], &[0, 1]),
        Err(ClassifierError::LengthMismatch {
            features: 1,
            labels: 2
        })
    );
    assert_eq!(
        classifier.train(&[vec![1.0], vec![1.0, 2.0]], &[0, 1]),
        Err(ClassifierError::DimensionMismatch {
            expected: 1,
            actual: 2
        })
    );
    assert!(!classifier.is_trained());
}

#[test]
fn test_k1_recovers_training_labels() {
    let (rows, labels) = clustered_training_set();
    let classifier = trained(1);
    for (row, &label) in rows.iter().zip(&labels) {
        assert_eq!(classifier.predict(row).unwrap(), label);
    }
}

#[test]
fn test_predict_clusters() {
    let classifier = trained(3);
    assert_eq!(classifier.predict(&[1.0, 1.0]).unwrap(), 0);
    assert_eq!(classifier.predict(&[9.0, 9.5]).unwrap(), 1);
}

#[test]
fn test_k_larger_than_training_set_is_clamped() {
    let classifier = trained(50);
    let neighbors = classifier.model().unwrap().neighbors(&[0.0, 0.0]).unwrap();
    assert_eq!(neighbors.len(), 6);
    // 3 vs 3: the label owning the closest neighbor wins
    assert_eq!(classifier.predict(&[0.0, 0.0]).unwrap(), 0);
    assert_eq!(classifier.predict(&[10.0, 10.0]).unwrap(), 1);
}

#[test]
fn test_equal_distances_ranked_by_training_order() {
    let mut classifier = KnnClassifier::new(1).unwrap();
    classifier
        .train(&[vec![1.0], vec![-1.0], vec![1.0]], &[2, 1, 0])
        .unwrap();

    let neighbors = classifier.model().unwrap().neighbors(&[0.0]);
    let indices: Vec<usize> = neighbors.unwrap().iter().map(|n| n.index).collect();
    assert_eq!(indices, vec![0]);
    assert_eq!(classifier.predict(&[0.0]).unwrap(), 2);
}

#[test]
fn test_vote_tie_prefers_nearest_label() {
    let mut classifier = KnnClassifier::new(4).unwrap();
    classifier
        .train(
            &[vec![3.0], vec![1.0], vec![2.0], vec![4.0], vec![100.0]],
            &[0, 1, 0, 1, 0],
        )
        .unwrap();
    // Neighbors of 0.0: 1.0 (1), 2.0 (0), 3.0 (0), 4.0 (1) → 2 vs 2, label 1 is closest
    assert_eq!(classifier.predict(&[0.0]).unwrap(), 1);
}

#[test]
fn test_majority_beats_nearest() {
    let mut classifier = KnnClassifier::new(3).unwrap();
    classifier
        .train(&[vec![0.1], vec![0.5], vec![0.6]], &[1, 0, 0])
        .unwrap();
    assert_eq!(classifier.predict(&[0.0]).unwrap(), 0);
}

#[test]
fn test_neighbor_distances_are_euclidean() {
    let classifier = trained(2);
    let neighbors = classifier.model().unwrap().neighbors(&[3.0, 4.0]).unwrap();
    // (0.1, 0.6) is closer to (3, 4) than (0.5, 0.2) or the origin
    assert_eq!(neighbors[0].index, 2);
    assert!((neighbors[0].distance - 19.97f64.sqrt()).abs() < 1e-12);
    assert_eq!(neighbors[1].index, 1);
    assert!((euclidean_distance(&[0.0, 0.0], &[3.0, 4.0]) - 5.0).abs() < 1e-12);
}

#[test]
fn test_retrain_replaces_model() {
    let mut classifier = trained(1);
    classifier.train(&[vec![0.0]], &[4]).unwrap();
    assert_eq!(classifier.model().unwrap().dimension(), 1);
    assert_eq!(classifier.predict(&[123.0]).unwrap(), 4);
}

#[test]
fn test_batch_matches_single_and_parallel() {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    let classifier = trained(3);
    let mut rng = StdRng::seed_from_u64(42);
    let queries: Vec<Vec<f64>> = (0..37)
        .map(|_| vec![rng.gen_range(-2.0..12.0), rng.gen_range(-2.0..12.0)])
        .collect();

    let single: Vec<usize> = queries
        .iter()
        .map(|q| classifier.predict(q).unwrap())
        .collect();
    assert_eq!(classifier.predict_batch(&queries).unwrap(), single);
    for workers in [0, 1, 2, 4, 64] {
        assert_eq!(
            classifier.predict_batch_parallel(&queries, workers).unwrap(),
            single,
            "workers={}",
            workers
        );
    }
    assert!(classifier.predict_batch_parallel(&[], 4).unwrap().is_empty());
}

#[test]
fn test_parallel_propagates_errors() {
    let classifier = trained(3);
    let queries = vec![vec![0.0, 0.0], vec![1.0], vec![2.0, 2.0]];
    assert!(matches!(
        classifier.predict_batch_parallel(&queries, 3),
        Err(ClassifierError::DimensionMismatch { .. })
    ));
}

#[test]
fn test_train_on_dataset() {
    let (rows, labels) = clustered_training_set();
    let dataset = LabeledDataset::from_parts(rows, labels, 2).unwrap();
    let mut classifier = KnnClassifier::new(3).unwrap();
    classifier.train_on(&dataset).unwrap();
    assert_eq!(classifier.model().unwrap().len(), 6);
}
