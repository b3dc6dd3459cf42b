use ndarray::ArrayViewD;
use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

/// JSON-representable view of a framework-native numeric value.
///
/// The default serializer cannot encode tensor scalars or arrays, so
/// values are converted into this explicit dispatch first: integer-like
/// scalars become plain JSON integers, float-like scalars plain floats,
/// and arrays ordered sequences (recursively).
#[derive(Debug, Clone, PartialEq)]
pub enum TensorValue {
    Int(i64),
    Float(f64),
    List(Vec<TensorValue>),
}

impl Serialize for TensorValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TensorValue::Int(value) => serializer.serialize_i64(*value),
            TensorValue::Float(value) => serializer.serialize_f64(*value),
            TensorValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

impl From<i64> for TensorValue {
    fn from(value: i64) -> Self {
        TensorValue::Int(value)
    }
}

impl From<i32> for TensorValue {
    fn from(value: i32) -> Self {
        TensorValue::Int(value.into())
    }
}

impl From<f32> for TensorValue {
    fn from(value: f32) -> Self {
        TensorValue::Float(value.into())
    }
}

impl From<f64> for TensorValue {
    fn from(value: f64) -> Self {
        TensorValue::Float(value)
    }
}

impl From<ArrayViewD<'_, f32>> for TensorValue {
    fn from(view: ArrayViewD<'_, f32>) -> Self {
        match view.ndim() {
            0 => view
                .iter()
                .next()
                .map(|value| TensorValue::Float(f64::from(*value)))
                .unwrap_or_else(|| TensorValue::List(Vec::new())),
            1 => TensorValue::List(
                view.iter()
                    .map(|value| TensorValue::Float(f64::from(*value)))
                    .collect(),
            ),
            _ => TensorValue::List(view.outer_iter().map(TensorValue::from).collect()),
        }
    }
}
