//! Flat key-value record holding a persisted sketch

use super::SketchType;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Serialized form of a sketch transform
///
/// A flat JSON object carrying `sketch_type` (canonical name), `N`, `S` and
/// the variant's own fields. Key order carries no meaning.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SerializedTransform(Map<String, Value>);

/// Field holding the canonical type name
pub const SKETCH_TYPE: &str = "sketch_type";
/// Field holding the input dimension
pub const INPUT_DIM: &str = "N";
/// Field holding the output dimension
pub const OUTPUT_DIM: &str = "S";
/// Field holding the sampling seed of a self-contained sketch
pub const SEED: &str = "seed";

impl SerializedTransform {
    /// Record header for `sketch_type` mapping `n` to `s`
    pub fn new(sketch_type: SketchType, n: usize, s: usize) -> Self {
        let mut record = Self::default();
        record.insert(SKETCH_TYPE, sketch_type.name());
        record.insert(INPUT_DIM, n as u64);
        record.insert(OUTPUT_DIM, s as u64);
        record
    }

    /// Wrap an existing JSON object
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Borrow the underlying JSON object
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Unwrap into the underlying JSON object
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Set `key` to `value`, replacing any previous value
    pub fn insert(&mut self, key: &str, value: impl Into<Value>) {
        self.0.insert(key.to_string(), value.into());
    }

    /// Raw value of `key`
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Whether `key` is present
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Remove `key`, returning its value
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Type named by the record; aliases are accepted
    pub fn sketch_type(&self) -> Result<SketchType> {
        let name = self
            .get(SKETCH_TYPE)
            .ok_or_else(|| Error::malformed(SKETCH_TYPE, "missing"))?
            .as_str()
            .ok_or_else(|| Error::malformed(SKETCH_TYPE, "expected a string"))?;
        name.parse()
    }

    /// Input dimension `N`
    pub fn input_dim(&self) -> Result<usize> {
        self.usize_field(INPUT_DIM)
    }

    /// Output dimension `S`
    pub fn output_dim(&self) -> Result<usize> {
        self.usize_field(OUTPUT_DIM)
    }

    /// Sampling seed, if the record came from a self-contained sketch
    pub fn seed(&self) -> Result<Option<u64>> {
        if self.contains(SEED) {
            self.u64_field(SEED).map(Some)
        } else {
            Ok(None)
        }
    }

    fn required(&self, key: &str) -> Result<&Value> {
        self.get(key).ok_or_else(|| Error::malformed(key, "missing"))
    }

    /// Numeric field as f64
    pub fn f64_field(&self, key: &str) -> Result<f64> {
        let value = self.required(key)?;
        as_f64(value).ok_or_else(|| Error::malformed(key, format!("expected a number, got {}", value)))
    }

    /// Non-negative integer field
    ///
    /// Integral floats such as `3.0` are accepted.
    pub fn u64_field(&self, key: &str) -> Result<u64> {
        let value = self.required(key)?;
        as_u64(value).ok_or_else(|| {
            Error::malformed(key, format!("expected a non-negative integer, got {}", value))
        })
    }

    /// Non-negative integer field as usize
    pub fn usize_field(&self, key: &str) -> Result<usize> {
        let v = self.u64_field(key)?;
        usize::try_from(v).map_err(|_| Error::malformed(key, format!("{} does not fit usize", v)))
    }

    /// Array of numbers
    pub fn f64_vec_field(&self, key: &str) -> Result<Vec<f64>> {
        self.array(key)?
            .iter()
            .map(|v| as_f64(v).ok_or_else(|| Error::malformed(key, format!("non-numeric entry {}", v))))
            .collect()
    }

    /// Array of non-negative integers
    pub fn usize_vec_field(&self, key: &str) -> Result<Vec<usize>> {
        self.array(key)?
            .iter()
            .map(|v| {
                as_u64(v)
                    .and_then(|u| usize::try_from(u).ok())
                    .ok_or_else(|| Error::malformed(key, format!("invalid index {}", v)))
            })
            .collect()
    }

    fn array(&self, key: &str) -> Result<&Vec<Value>> {
        let value = self.required(key)?;
        value
            .as_array()
            .ok_or_else(|| Error::malformed(key, format!("expected an array, got {}", value)))
    }

    /// Encode as JSON text
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode from JSON text; the top level must be an object
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
