//! Structural conversion between typed records and the dynamic [`Value`] tree.
//!
//! Records are described once with [`record!`](crate::record); the resulting
//! descriptor drives both directions field by field, since the tree itself
//! carries no type information.

pub mod field;
mod macros;
pub mod record;
pub mod value;

pub use field::{WireField, WireKind};
pub use record::{FieldDescriptor, Record, RecordDescriptor, RecordDescriptorBuilder, WireName};
pub use value::Value;

use crate::error::ConvertError;

/// Encode a record into a mapping node.
pub fn encode<R: Record>(record: &R) -> Result<Value, ConvertError> {
    R::descriptor().encode(record)
}

/// Decode a mapping node into a fresh record.
///
/// Keys missing from the mapping leave their field at its default value.
pub fn decode<R: Record>(value: &Value) -> Result<R, ConvertError> {
    R::descriptor().decode(value)
}

/// Decode a JSON value, treating `null` object entries as absent keys.
pub fn decode_json<R: Record>(json: serde_json::Value) -> Result<R, ConvertError> {
    let value = Value::try_from(json)?;
    decode(&value)
}

/// Encode a record straight to JSON.
pub fn encode_json<R: Record>(record: &R) -> Result<serde_json::Value, ConvertError> {
    encode(record).map(Value::into_json)
}
