//! Deserialization registry: record -> transform

use super::record::{SerializedTransform, INPUT_DIM, OUTPUT_DIM};
use super::{ExecutionPreference, SketchOptions, SketchParams, SketchTransform, SketchType};
use crate::backend::BackendHandle;
use crate::error::{Error, Result};
use tracing::debug;

type ParamsReader = fn(&SerializedTransform) -> Result<SketchParams>;

/// One reader per canonical type
static REGISTRY: &[(SketchType, ParamsReader)] = &[
    (SketchType::Jlt, read_jlt),
    (SketchType::Sjlt, read_sjlt),
    (SketchType::Ct, read_ct),
    (SketchType::Fjlt, read_fjlt),
    (SketchType::Cwt, read_cwt),
    (SketchType::Mmt, read_mmt),
    (SketchType::Wzt, read_wzt),
    (SketchType::GaussianRft, read_gaussian_rft),
    (SketchType::LaplacianRft, read_laplacian_rft),
    (SketchType::MaternRft, read_matern_rft),
    (SketchType::GaussianQrft, read_gaussian_qrft),
    (SketchType::LaplacianQrft, read_laplacian_qrft),
    (SketchType::ExpSemigroupRlt, read_exp_semigroup_rlt),
    (SketchType::ExpSemigroupQrlt, read_exp_semigroup_qrlt),
    (SketchType::FastGaussianRft, read_fast_gaussian_rft),
    (SketchType::FastMaternRft, read_fast_matern_rft),
    (SketchType::Ppt, read_ppt),
    (SketchType::Urst, read_urst),
    (SketchType::Nurst, read_nurst),
];

// ============================================================================
// Parameter readers
// ============================================================================

fn read_jlt(_: &SerializedTransform) -> Result<SketchParams> {
    Ok(SketchParams::Jlt)
}

fn read_sjlt(record: &SerializedTransform) -> Result<SketchParams> {
    Ok(SketchParams::Sjlt {
        density: record.f64_field("density")?,
    })
}

fn read_ct(record: &SerializedTransform) -> Result<SketchParams> {
    Ok(SketchParams::Ct {
        c: record.f64_field("C")?,
    })
}

fn read_fjlt(_: &SerializedTransform) -> Result<SketchParams> {
    Ok(SketchParams::Fjlt)
}

fn read_cwt(_: &SerializedTransform) -> Result<SketchParams> {
    Ok(SketchParams::Cwt)
}

fn read_mmt(_: &SerializedTransform) -> Result<SketchParams> {
    Ok(SketchParams::Mmt)
}

fn read_wzt(record: &SerializedTransform) -> Result<SketchParams> {
    Ok(SketchParams::Wzt {
        p: record.f64_field("P")?,
    })
}

fn read_gaussian_rft(record: &SerializedTransform) -> Result<SketchParams> {
    Ok(SketchParams::GaussianRft {
        sigma: record.f64_field("sigma")?,
    })
}

fn read_laplacian_rft(record: &SerializedTransform) -> Result<SketchParams> {
    Ok(SketchParams::LaplacianRft {
        sigma: record.f64_field("sigma")?,
    })
}

fn read_matern_rft(record: &SerializedTransform) -> Result<SketchParams> {
    Ok(SketchParams::MaternRft {
        nu: record.f64_field("nu")?,
        l: record.f64_field("l")?,
    })
}

fn read_gaussian_qrft(record: &SerializedTransform) -> Result<SketchParams> {
    Ok(SketchParams::GaussianQrft {
        sigma: record.f64_field("sigma")?,
        skip: record.u64_field("skip")?,
    })
}

fn read_laplacian_qrft(record: &SerializedTransform) -> Result<SketchParams> {
    Ok(SketchParams::LaplacianQrft {
        sigma: record.f64_field("sigma")?,
        skip: record.u64_field("skip")?,
    })
}

fn read_exp_semigroup_rlt(record: &SerializedTransform) -> Result<SketchParams> {
    Ok(SketchParams::ExpSemigroupRlt {
        beta: record.f64_field("beta")?,
    })
}

fn read_exp_semigroup_qrlt(record: &SerializedTransform) -> Result<SketchParams> {
    Ok(SketchParams::ExpSemigroupQrlt {
        beta: record.f64_field("beta")?,
        skip: record.u64_field("skip")?,
    })
}

fn read_fast_gaussian_rft(record: &SerializedTransform) -> Result<SketchParams> {
    Ok(SketchParams::FastGaussianRft {
        sigma: record.f64_field("sigma")?,
    })
}

fn read_fast_matern_rft(record: &SerializedTransform) -> Result<SketchParams> {
    Ok(SketchParams::FastMaternRft {
        nu: record.f64_field("nu")?,
        l: record.f64_field("l")?,
    })
}

fn read_ppt(record: &SerializedTransform) -> Result<SketchParams> {
    Ok(SketchParams::Ppt {
        q: record.usize_field("q")?,
        c: record.f64_field("c")?,
        gamma: record.f64_field("gamma")?,
    })
}

fn read_urst(_: &SerializedTransform) -> Result<SketchParams> {
    Ok(SketchParams::Urst)
}

fn read_nurst(record: &SerializedTransform) -> Result<SketchParams> {
    Ok(SketchParams::Nurst {
        probabilities: record.f64_vec_field("probabilities")?,
    })
}

// ============================================================================
// Deserialization
// ============================================================================

fn params_reader(sketch_type: SketchType) -> Result<ParamsReader> {
    REGISTRY
        .iter()
        .find(|(t, _)| *t == sketch_type)
        .map(|(_, reader)| *reader)
        .ok_or_else(|| {
            Error::UnsupportedConfiguration(format!("no deserializer registered for {}", sketch_type))
        })
}

/// Read and validate the parameters stored in `record`
pub(crate) fn read_params(record: &SerializedTransform) -> Result<(SketchParams, usize, usize)> {
    let sketch_type = record.sketch_type()?;
    let n = record.input_dim()?;
    let s = record.output_dim()?;
    let params = params_reader(sketch_type)?(record)?
        .validated(n, s)
        .map_err(|e| match e {
            Error::InvalidArgument { arg, reason } => Error::malformed(record_field(arg), reason),
            other => other,
        })?;
    Ok((params, n, s))
}

/// Record key holding the value a validation argument names
fn record_field(arg: &'static str) -> &'static str {
    match arg {
        "n" => INPUT_DIM,
        "s" => OUTPUT_DIM,
        other => other,
    }
}

/// Rebuild a transform from a record produced by [`SketchTransform::serialize`]
///
/// The record decides the execution mode: a record carrying a `seed` was
/// written by a self-contained transform and is resampled in-process;
/// anything else is handed to the accelerated backend.
///
/// # Errors
///
/// - `UnsupportedConfiguration` for an unknown `sketch_type`
/// - `MalformedSerialization` for missing or invalid fields
/// - `BackendUnavailable` for a backend record when no backend supports the type
pub fn deserialize_sketch(
    record: &SerializedTransform,
    options: &SketchOptions,
) -> Result<SketchTransform> {
    let (params, n, s) = read_params(record)?;
    let sketch_type = params.sketch_type();

    let transform = match record.seed()? {
        Some(seed) => SketchTransform::from_seed(n, s, params, seed, record, options)?,
        None => {
            if options.preference == ExecutionPreference::SelfContained {
                return Err(Error::BackendUnavailable(format!(
                    "{} record has no seed and self-contained execution was forced",
                    sketch_type
                )));
            }
            let backend = options
                .resolve_backend()
                .filter(|b| b.supports_type(sketch_type))
                .ok_or_else(|| {
                    Error::BackendUnavailable(format!(
                        "{} record needs an accelerated backend",
                        sketch_type
                    ))
                })?;
            let handle = BackendHandle::deserialize(backend, record)?;
            SketchTransform::from_handle(n, s, params, handle, options)
        }
    };

    debug!(
        %sketch_type,
        n,
        s,
        mode = %transform.mode(),
        "deserialized sketch transform"
    );
    Ok(transform)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> SerializedTransform {
        match value {
            serde_json::Value::Object(map) => SerializedTransform::from_map(map),
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_every_type_registered() {
        for ty in SketchType::ALL {
            assert!(params_reader(ty).is_ok(), "{} missing", ty);
        }
    }

    #[test]
    fn test_self_contained_round_trip() {
        let opts = SketchOptions::new().with_seed(99).force_self_contained();
        let t = SketchTransform::new(5, 3, SketchParams::MaternRft { nu: 1.5, l: 0.7 }, &opts).unwrap();
        let r = t.serialize().unwrap();
        let back = deserialize_sketch(&r, &SketchOptions::new()).unwrap();
        assert_eq!(back.params(), t.params());
        assert_eq!(back.seed(), Some(99));
        assert_eq!(back.serialize().unwrap(), r);
    }

    #[test]
    fn test_alias_in_record() {
        let r = record(json!({"sketch_type": "CountSketch", "N": 8, "S": 4, "seed": 1}));
        let t = deserialize_sketch(&r, &SketchOptions::new()).unwrap();
        assert_eq!(t.sketch_type(), SketchType::Cwt);
    }

    #[test]
    fn test_unknown_type() {
        let r = record(json!({"sketch_type": "Nope", "N": 8, "S": 4, "seed": 1}));
        assert!(matches!(
            deserialize_sketch(&r, &SketchOptions::new()),
            Err(Error::UnsupportedConfiguration(_))
        ));
    }

    #[test]
    fn test_missing_parameter_names_field() {
        let r = record(json!({"sketch_type": "GaussianRFT", "N": 8, "S": 4, "seed": 1}));
        match deserialize_sketch(&r, &SketchOptions::new()) {
            Err(Error::MalformedSerialization { field, .. }) => assert_eq!(field, "sigma"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_invalid_parameter_is_malformed() {
        let r = record(json!({"sketch_type": "SJLT", "N": 8, "S": 4, "density": 2.0, "seed": 1}));
        match deserialize_sketch(&r, &SketchOptions::new()) {
            Err(Error::MalformedSerialization { field, .. }) => assert_eq!(field, "density"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_invalid_dimension_names_record_key() {
        let cases = [
            (json!({"sketch_type": "JLT", "N": 0, "S": 4, "seed": 1}), INPUT_DIM),
            (json!({"sketch_type": "URST", "N": 3, "S": 5, "seed": 1}), OUTPUT_DIM),
            (json!({"sketch_type": "CT", "N": 8, "S": 4, "C": -1.0, "seed": 1}), "C"),
            (json!({"sketch_type": "WZT", "N": 8, "S": 4, "P": 0.0, "seed": 1}), "P"),
        ];
        for (value, expected) in cases {
            let r = record(value);
            match deserialize_sketch(&r, &SketchOptions::new()) {
                Err(Error::MalformedSerialization { field, .. }) => assert_eq!(field, expected),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn test_halton_skip_overflow_is_malformed() {
        for ty in ["GaussianQRFT", "LaplacianQRFT"] {
            let r = record(json!({
                "sketch_type": ty, "N": 3, "S": 4, "sigma": 1.0,
                "skip": u64::MAX, "seed": 1
            }));
            match deserialize_sketch(&r, &SketchOptions::new()) {
                Err(Error::MalformedSerialization { field, .. }) => assert_eq!(field, "skip"),
                other => panic!("unexpected {:?}", other),
            }
        }
        let r = record(json!({
            "sketch_type": "ExpSemigroupQRLT", "N": 3, "S": 4, "beta": 1.0,
            "skip": u64::MAX - 3, "seed": 1
        }));
        assert!(matches!(
            deserialize_sketch(&r, &SketchOptions::new()),
            Err(Error::MalformedSerialization { .. })
        ));
    }

    #[test]
    fn test_backend_record_without_backend() {
        let r = record(json!({"sketch_type": "JLT", "N": 8, "S": 4}));
        assert!(matches!(
            deserialize_sketch(&r, &SketchOptions::new().force_self_contained()),
            Err(Error::BackendUnavailable(_))
        ));
    }
}
