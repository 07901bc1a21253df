//! Sketch type tags and the alias table

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Canonical identifier of a sketch algorithm
///
/// Every public name accepted by [`SketchType::from_str`] resolves to exactly
/// one variant; alternative names are entries in [`ALIASES`], never separate
/// variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SketchType {
    /// Dense Gaussian Johnson-Lindenstrauss projection
    Jlt,
    /// Sparse random-sign projection
    Sjlt,
    /// Cauchy projection
    Ct,
    /// Fast Johnson-Lindenstrauss transform (sign flip, DCT, sampling)
    Fjlt,
    /// Clarkson-Woodruff transform (CountSketch)
    Cwt,
    /// Meng-Mahoney transform
    Mmt,
    /// Woodruff-Zhang transform
    Wzt,
    /// Random Fourier features, Gaussian kernel
    GaussianRft,
    /// Random Fourier features, Laplacian kernel
    LaplacianRft,
    /// Random Fourier features, Matérn kernel
    MaternRft,
    /// Quasi-random Fourier features, Gaussian kernel
    GaussianQrft,
    /// Quasi-random Fourier features, Laplacian kernel
    LaplacianQrft,
    /// Random Laplace features, exponential semigroup kernel
    ExpSemigroupRlt,
    /// Quasi-random Laplace features, exponential semigroup kernel
    ExpSemigroupQrlt,
    /// Fastfood features, Gaussian kernel
    FastGaussianRft,
    /// Fastfood features, Matérn kernel
    FastMaternRft,
    /// Pham-Pagh tensor sketch for the polynomial kernel
    Ppt,
    /// Uniform sampling without replacement
    Urst,
    /// Non-uniform sampling with replacement
    Nurst,
}

/// Alternative public names and the type they resolve to
///
/// `FastJLT` names the structured transform [`SketchType::Fjlt`], not the
/// dense [`SketchType::Jlt`] that some older releases aliased it to.
pub const ALIASES: &[(&str, SketchType)] = &[
    ("SparseJLT", SketchType::Sjlt),
    ("FastJLT", SketchType::Fjlt),
    ("CountSketch", SketchType::Cwt),
    ("RRT", SketchType::GaussianRft),
    ("Fastfood", SketchType::FastGaussianRft),
    ("MaternFastfood", SketchType::FastMaternRft),
    ("TensorSketch", SketchType::Ppt),
    ("UniformSampler", SketchType::Urst),
    ("NonUniformSampler", SketchType::Nurst),
];

impl SketchType {
    /// Every sketch type, in declaration order
    pub const ALL: [SketchType; 19] = [
        SketchType::Jlt,
        SketchType::Sjlt,
        SketchType::Ct,
        SketchType::Fjlt,
        SketchType::Cwt,
        SketchType::Mmt,
        SketchType::Wzt,
        SketchType::GaussianRft,
        SketchType::LaplacianRft,
        SketchType::MaternRft,
        SketchType::GaussianQrft,
        SketchType::LaplacianQrft,
        SketchType::ExpSemigroupRlt,
        SketchType::ExpSemigroupQrlt,
        SketchType::FastGaussianRft,
        SketchType::FastMaternRft,
        SketchType::Ppt,
        SketchType::Urst,
        SketchType::Nurst,
    ];

    /// Canonical name, as written into serialized records
    pub fn name(self) -> &'static str {
        match self {
            SketchType::Jlt => "JLT",
            SketchType::Sjlt => "SJLT",
            SketchType::Ct => "CT",
            SketchType::Fjlt => "FJLT",
            SketchType::Cwt => "CWT",
            SketchType::Mmt => "MMT",
            SketchType::Wzt => "WZT",
            SketchType::GaussianRft => "GaussianRFT",
            SketchType::LaplacianRft => "LaplacianRFT",
            SketchType::MaternRft => "MaternRFT",
            SketchType::GaussianQrft => "GaussianQRFT",
            SketchType::LaplacianQrft => "LaplacianQRFT",
            SketchType::ExpSemigroupRlt => "ExpSemigroupRLT",
            SketchType::ExpSemigroupQrlt => "ExpSemigroupQRLT",
            SketchType::FastGaussianRft => "FastGaussianRFT",
            SketchType::FastMaternRft => "FastMaternRFT",
            SketchType::Ppt => "PPT",
            SketchType::Urst => "URST",
            SketchType::Nurst => "NURST",
        }
    }

    /// Whether the type is one of the hashed CountSketch-style variants
    pub fn is_hashed(self) -> bool {
        matches!(self, SketchType::Cwt | SketchType::Mmt | SketchType::Wzt)
    }

    /// Whether the type copies selected rows or columns
    pub fn is_sampling(self) -> bool {
        matches!(self, SketchType::Urst | SketchType::Nurst)
    }
}

impl fmt::Display for SketchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for SketchType {
    type Err = Error;

    /// Resolve a canonical name or an alias
    fn from_str(s: &str) -> Result<Self> {
        if let Some(ty) = SketchType::ALL.iter().find(|t| t.name() == s) {
            return Ok(*ty);
        }
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == s)
            .map(|(_, ty)| *ty)
            .ok_or_else(|| Error::UnsupportedConfiguration(format!("unknown sketch type ({})", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_names_round_trip() {
        for ty in SketchType::ALL {
            assert_eq!(ty.name().parse::<SketchType>().unwrap(), ty);
        }
    }

    #[test]
    fn test_aliases_resolve() {
        assert_eq!("TensorSketch".parse::<SketchType>().unwrap(), SketchType::Ppt);
        assert_eq!("CountSketch".parse::<SketchType>().unwrap(), SketchType::Cwt);
        assert_eq!(
            "MaternFastfood".parse::<SketchType>().unwrap(),
            SketchType::FastMaternRft
        );
    }

    #[test]
    fn test_fast_jlt_alias_is_structured_transform() {
        let ty = "FastJLT".parse::<SketchType>().unwrap();
        assert_eq!(ty, SketchType::Fjlt);
        assert_ne!(ty, SketchType::Jlt);
        assert_eq!(ty.name(), "FJLT");
    }

    #[test]
    fn test_unknown_name() {
        assert!(matches!(
            "GaussianSketch".parse::<SketchType>(),
            Err(Error::UnsupportedConfiguration(_))
        ));
    }
}
