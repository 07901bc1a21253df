//! Integration tests for serialized transform records

mod common;

use common::{params_for_every_type, random_dense, random_sparse};
use sketchr::prelude::*;
use sketchr::sketch::{INPUT_DIM, OUTPUT_DIM, SEED, SKETCH_TYPE};

fn seeded(seed: u64) -> SketchOptions {
    SketchOptions::new().with_seed(seed).force_self_contained()
}

#[test]
fn test_round_trip_reproduces_every_type() {
    let (n, s) = (12, 7);
    let a = Matrix::from(random_dense(n, 4, 8));
    let b = Matrix::from(random_dense(3, n, 9));
    for params in params_for_every_type(n) {
        let name = params.sketch_type().name();
        let t = SketchTransform::new(n, s, params, &seeded(314)).unwrap();
        let record = t.serialize().unwrap();
        let back = deserialize_sketch(&record, &SketchOptions::new()).unwrap();

        assert_eq!(back.sketch_type(), t.sketch_type(), "{}", name);
        assert_eq!((back.input_dim(), back.output_dim()), (n, s), "{}", name);
        assert_eq!(back.mode(), ExecutionMode::SelfContained, "{}", name);
        assert_eq!(back.columnwise(&a).unwrap(), t.columnwise(&a).unwrap(), "{}", name);
        assert_eq!(back.rowwise(&b).unwrap(), t.rowwise(&b).unwrap(), "{}", name);
    }
}

#[test]
fn test_json_text_round_trip() {
    let (n, s) = (9, 5);
    let sparse = Matrix::from(random_sparse(n, 3, 0.5, 4));
    let opts = seeded(2718).with_default_output(MatrixKind::Dense);
    for params in params_for_every_type(n) {
        let name = params.sketch_type().name();
        let t = SketchTransform::new(n, s, params, &opts).unwrap();
        let text = t.serialize().unwrap().to_json_string().unwrap();
        let record = SerializedTransform::from_json_str(&text).unwrap();
        let back = deserialize_sketch(&record, &opts).unwrap();
        assert_eq!(back.columnwise(&sparse).unwrap(), t.columnwise(&sparse).unwrap(), "{}", name);
    }
}

#[test]
fn test_record_header_fields() {
    let t = SketchTransform::new(20, 4, SketchParams::Sjlt { density: 0.25 }, &seeded(5)).unwrap();
    let record = t.serialize().unwrap();
    assert_eq!(record.get(SKETCH_TYPE).and_then(|v| v.as_str()), Some("SJLT"));
    assert_eq!(record.get(INPUT_DIM).and_then(|v| v.as_u64()), Some(20));
    assert_eq!(record.get(OUTPUT_DIM).and_then(|v| v.as_u64()), Some(4));
    assert_eq!(record.get(SEED).and_then(|v| v.as_u64()), Some(5));
    assert_eq!(record.get("density").and_then(|v| v.as_f64()), Some(0.25));
}

#[test]
fn test_sampling_records_embed_indices() {
    let t = SketchTransform::new(15, 6, SketchParams::Urst, &seeded(6)).unwrap();
    let mut record = t.serialize().unwrap();
    let idxs = record.usize_vec_field("idxs").unwrap();
    assert_eq!(idxs.len(), 6);

    // Indices win over the seed when both are present
    record.insert(SEED, 999u64);
    let back = deserialize_sketch(&record, &SketchOptions::new()).unwrap();
    let a = Matrix::from(DenseMatrix::from_fn(15, 1, |i, _| i as f64));
    let picked: Vec<usize> = back
        .columnwise(&a)
        .unwrap()
        .to_dense()
        .column(0)
        .iter()
        .map(|v| *v as usize)
        .collect();
    assert_eq!(picked, idxs);
}

#[test]
fn test_out_of_range_indices_are_malformed() {
    let t = SketchTransform::new(5, 2, SketchParams::Urst, &seeded(6)).unwrap();
    let mut record = t.serialize().unwrap();
    record.insert("idxs", vec![0u64, 5]);
    assert!(matches!(
        deserialize_sketch(&record, &SketchOptions::new()),
        Err(Error::MalformedSerialization { .. })
    ));
}

#[test]
fn test_repeated_uniform_indices_are_malformed() {
    let t = SketchTransform::new(5, 3, SketchParams::Urst, &seeded(6)).unwrap();
    let mut record = t.serialize().unwrap();
    record.insert("idxs", vec![2u64, 2, 2]);
    match deserialize_sketch(&record, &SketchOptions::new()) {
        Err(Error::MalformedSerialization { field, .. }) => assert_eq!(field, "idxs"),
        other => panic!("unexpected {:?}", other.map(|t| t.sketch_type())),
    }

    // NURST samples with replacement
    let weights = SketchParams::Nurst {
        probabilities: vec![0.2; 5],
    };
    let t = SketchTransform::new(5, 3, weights, &seeded(6)).unwrap();
    let mut record = t.serialize().unwrap();
    record.insert("idxs", vec![2u64, 2, 2]);
    assert!(deserialize_sketch(&record, &SketchOptions::new()).is_ok());
}

#[test]
fn test_missing_header_field_is_malformed() {
    let t = SketchTransform::new(8, 4, SketchParams::Jlt, &seeded(1)).unwrap();
    let mut record = t.serialize().unwrap();
    record.remove(OUTPUT_DIM);
    match deserialize_sketch(&record, &SketchOptions::new()) {
        Err(Error::MalformedSerialization { field, .. }) => assert_eq!(field, OUTPUT_DIM),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_unknown_type_name_is_unsupported() {
    let t = SketchTransform::new(8, 4, SketchParams::Jlt, &seeded(1)).unwrap();
    let mut record = t.serialize().unwrap();
    record.insert(SKETCH_TYPE, "HolographicJLT");
    assert!(matches!(
        deserialize_sketch(&record, &SketchOptions::new()),
        Err(Error::UnsupportedConfiguration(_))
    ));
}

#[test]
fn test_default_output_comes_from_options() {
    let t = SketchTransform::new(8, 4, SketchParams::Cwt, &seeded(1)).unwrap();
    let record = t.serialize().unwrap();
    let opts = SketchOptions::new().with_default_output(MatrixKind::Dense);
    let back = deserialize_sketch(&record, &opts).unwrap();
    assert_eq!(back.default_output(), Some(MatrixKind::Dense));
    let out = back.columnwise(&Matrix::from(random_sparse(8, 2, 0.5, 1))).unwrap();
    assert_eq!(out.kind(), MatrixKind::Dense);
}
