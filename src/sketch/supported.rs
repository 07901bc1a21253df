//! Supported (type, input kind, output kind) combinations

use super::SketchType;
use crate::matrix::MatrixKind;

/// Combination of a sketch type with input and output kinds
pub type Combination = (SketchType, MatrixKind, MatrixKind);

/// Whether the in-process implementation handles `(sketch_type, input, output)`
///
/// Every type reads dense or sparse input into a dense output. Hashed and
/// sampling sketches preserve sparsity, so they may also write sparse output
/// from sparse input.
pub fn self_contained_supports(sketch_type: SketchType, input: MatrixKind, output: MatrixKind) -> bool {
    match (input, output) {
        (_, MatrixKind::Dense) => true,
        (MatrixKind::Sparse, MatrixKind::Sparse) => {
            sketch_type.is_hashed() || sketch_type.is_sampling()
        }
        (MatrixKind::Dense, MatrixKind::Sparse) => false,
    }
}

/// Every combination the in-process implementation handles
pub fn self_contained_combinations() -> Vec<Combination> {
    let mut out = Vec::new();
    for ty in SketchType::ALL {
        for input in MatrixKind::ALL {
            for output in MatrixKind::ALL {
                if self_contained_supports(ty, input, output) {
                    out.push((ty, input, output));
                }
            }
        }
    }
    out
}
