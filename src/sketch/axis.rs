//! Application axis for sketch transforms

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Direction in which a sketch is applied to a matrix
///
/// - `Columnwise` (aliases `0`, `"columnwise"`, `"left"`): each column of `A`
///   is sketched, so `A` (n × m) maps to `S·A` (s × m).
/// - `Rowwise` (aliases `1`, `"rowwise"`, `"right"`): each row of `A` is
///   sketched, so `A` (m × n) maps to `A·Sᵗ` (m × s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    /// Sketch the columns (left application)
    #[default]
    Columnwise,
    /// Sketch the rows (right application)
    Rowwise,
}

impl Axis {
    /// Zero-based index of the matrix dimension being sketched
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Axis::Columnwise => 0,
            Axis::Rowwise => 1,
        }
    }

    /// The other axis
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Axis::Columnwise => Axis::Rowwise,
            Axis::Rowwise => Axis::Columnwise,
        }
    }

    /// Canonical name
    pub fn name(self) -> &'static str {
        match self {
            Axis::Columnwise => "columnwise",
            Axis::Rowwise => "rowwise",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn axis_error(token: impl fmt::Display) -> Error {
    Error::invalid_argument(
        "axis",
        format!(
            "dimension must be either columnwise/rowwise or left/right or 0/1, got {}",
            token
        ),
    )
}

impl FromStr for Axis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "0" | "columnwise" | "left" => Ok(Axis::Columnwise),
            "1" | "rowwise" | "right" => Ok(Axis::Rowwise),
            other => Err(axis_error(format!("'{}'", other))),
        }
    }
}

impl TryFrom<i64> for Axis {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        match value {
            0 => Ok(Axis::Columnwise),
            1 => Ok(Axis::Rowwise),
            other => Err(axis_error(other)),
        }
    }
}

/// Anything accepted as an axis argument by `SketchTransform::apply`
pub trait AxisToken {
    /// Resolve the token, rejecting unknown values with `InvalidArgument`
    fn to_axis(self) -> Result<Axis>;
}

impl AxisToken for Axis {
    fn to_axis(self) -> Result<Axis> {
        Ok(self)
    }
}

impl AxisToken for &str {
    fn to_axis(self) -> Result<Axis> {
        self.parse()
    }
}

macro_rules! impl_axis_token_int {
    ($($t:ty),*) => {
        $(
            impl AxisToken for $t {
                fn to_axis(self) -> Result<Axis> {
                    i64::try_from(self)
                        .map_err(|_| axis_error(self))
                        .and_then(Axis::try_from)
                }
            }
        )*
    };
}

impl_axis_token_int!(i32, i64, u32, usize);
