use super::*;

#[test]
fn test_squared_euclidean() {
    let a = [1.0, 2.0, 3.0];
    let b = [4.0, 5.0, 6.0];
    // diffs: -3, -3, -3. sq: 9, 9, 9. sum: 27.
    let dist = squared_euclidean(&a, &b);
    assert!((dist - 27.0).abs() < f32::EPSILON);

    let dist_same = squared_euclidean(&a, &a);
    assert!(dist_same.abs() < f32::EPSILON);
}

#[test]
fn test_check_dims() {
    assert!(check_dims(&[0.0; 8], 8).is_ok());

    let err = check_dims(&[0.0; 4], 8).unwrap_err();
    match err {
        VicinityError::DimensionMismatch { query, indexed } => {
            assert_eq!(query, 4);
            assert_eq!(indexed, 8);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_dataset_rejects_bad_records() {
    // Id out of position
    let bad_id = vec![VectorRecord {
        id: 3,
        filter_attr: 0.0,
        embedding: vec![0.0; 2],
    }];
    assert!(Dataset::from_records(2, bad_id).is_err());

    // Wrong embedding width
    let bad_dim = vec![VectorRecord {
        id: 0,
        filter_attr: 0.0,
        embedding: vec![0.0; 3],
    }];
    assert!(Dataset::from_records(2, bad_dim).is_err());
}

#[test]
fn test_dataset_accessors() {
    let records = vec![
        VectorRecord {
            id: 0,
            filter_attr: 0.25,
            embedding: vec![1.0, 0.0],
        },
        VectorRecord {
            id: 1,
            filter_attr: 0.75,
            embedding: vec![0.0, 1.0],
        },
    ];
    let ds = Dataset::from_records(2, records).unwrap();
    assert_eq!(ds.len(), 2);
    assert_eq!(ds.dim(), 2);
    assert_eq!(ds.embedding(1), &[0.0, 1.0]);
    assert!((ds.filter_attr(0) - 0.25).abs() < f32::EPSILON);
}

#[test]
fn test_range_query_bounds_inclusive() {
    let q = RangeQuery {
        lower: 1.0,
        upper: 2.0,
        embedding: vec![],
    };
    assert!(q.contains(1.0));
    assert!(q.contains(2.0));
    assert!(q.contains(1.5));
    assert!(!q.contains(0.999_999));
    assert!(!q.contains(2.000_001));
}

#[test]
fn test_config_roundtrip() {
    let config = GlobalConfig::new();
    assert_eq!(config.get_oversample_factor(), 10);
    assert!((config.get_selectivity_threshold() - 0.5).abs() < f32::EPSILON);

    config.set_selectivity_threshold(0.3);
    assert!((config.get_selectivity_threshold() - 0.3).abs() < f32::EPSILON);

    config.set_ef_search(250);
    assert_eq!(config.get_ef_search(), 250);
}
