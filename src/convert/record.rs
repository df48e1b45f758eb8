//! Record descriptors: per-type field metadata driving the converter.

use std::any::TypeId;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::OnceLock;

use schemars::{Schema, SchemaGenerator};

use super::field::{WireField, WireKind};
use super::value::Value;
use crate::error::{ConvertError, GenbindError};

/// A struct whose fields are described by a [`RecordDescriptor`].
///
/// Implement it with the [`record!`](crate::record) macro, which also caches
/// the descriptor process-wide.
pub trait Record: WireField + Default + Send + Sync {
    fn descriptor() -> &'static RecordDescriptor<Self>;
}

/// Where a field lives in the wire mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireName {
    Named(&'static str),
    /// Never encoded, never decoded; the field keeps its default.
    Omit,
}

type EncodeFn<R> = dyn Fn(&R) -> Result<Option<Value>, ConvertError> + Send + Sync;
type DecodeFn<R> = dyn Fn(&mut R, &Value) -> Result<(), ConvertError> + Send + Sync;

/// Metadata and accessors for one field of `R`.
pub struct FieldDescriptor<R> {
    name: &'static str,
    wire_name: WireName,
    kind: WireKind,
    description: Option<&'static str>,
    encode: Box<EncodeFn<R>>,
    decode: Box<DecodeFn<R>>,
    schema: fn(&mut SchemaGenerator) -> Schema,
    check: fn(&mut Vec<TypeId>) -> Result<(), String>,
}

impl<R> FieldDescriptor<R> {
    /// Declared Rust field name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn wire_name(&self) -> WireName {
        self.wire_name
    }

    pub fn kind(&self) -> &WireKind {
        &self.kind
    }

    pub fn description(&self) -> Option<&'static str> {
        self.description
    }
}

impl<R> fmt::Debug for FieldDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("wire_name", &self.wire_name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// Immutable description of a record type's fields.
pub struct RecordDescriptor<R> {
    type_name: &'static str,
    description: Option<&'static str>,
    fields: Vec<FieldDescriptor<R>>,
    // Filled on first use, never in `build`: checking a recursive record
    // calls its own `descriptor()`, whose cell is initializing at that point.
    validity: OnceLock<Result<(), String>>,
}

impl<R> fmt::Debug for RecordDescriptor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordDescriptor")
            .field("type_name", &self.type_name)
            .field("fields", &self.fields)
            .finish()
    }
}

impl<R: Record> RecordDescriptor<R> {
    pub fn builder(type_name: &'static str) -> RecordDescriptorBuilder<R> {
        RecordDescriptorBuilder {
            type_name,
            description: None,
            fields: Vec::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn description(&self) -> Option<&'static str> {
        self.description
    }

    pub fn fields(&self) -> &[FieldDescriptor<R>] {
        &self.fields
    }

    /// Wire names of the encoded fields, in declaration order.
    pub fn wire_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter_map(|field| match field.wire_name {
            WireName::Named(name) => Some(name),
            WireName::Omit => None,
        })
    }

    /// Check wire-name uniqueness and field support, recursively.
    ///
    /// The outcome is computed once per record type. [`encode`](Self::encode)
    /// and [`decode`](Self::decode) refuse to run on an invalid record.
    pub fn validate(&self) -> Result<(), GenbindError> {
        self.validity()
            .map_err(|reason| GenbindError::Configuration(reason.to_string()))
    }

    fn validity(&self) -> Result<(), &str> {
        match self.validity.get_or_init(|| self.check(&mut Vec::new())) {
            Ok(()) => Ok(()),
            Err(reason) => Err(reason.as_str()),
        }
    }

    fn ensure_valid(&self) -> Result<(), ConvertError> {
        self.validity().map_err(|reason| ConvertError::InvalidRecord {
            path: String::new(),
            record: self.type_name,
            reason: reason.to_string(),
        })
    }

    #[doc(hidden)]
    pub fn check(&self, seen: &mut Vec<TypeId>) -> Result<(), String> {
        let id = TypeId::of::<R>();
        if seen.contains(&id) {
            return Ok(());
        }
        seen.push(id);

        let mut names = HashSet::new();
        for wire_name in self.wire_names() {
            if !names.insert(wire_name) {
                return Err(format!(
                    "record '{}' uses wire name '{wire_name}' more than once",
                    self.type_name
                ));
            }
        }
        for field in &self.fields {
            if field.wire_name == WireName::Omit {
                continue;
            }
            (field.check)(seen)
                .map_err(|e| format!("record '{}', field '{}': {e}", self.type_name, field.name))?;
        }
        Ok(())
    }

    /// Encode a record into a mapping with one entry per present field.
    pub fn encode(&self, record: &R) -> Result<Value, ConvertError> {
        self.ensure_valid()?;
        let mut entries = BTreeMap::new();
        for field in &self.fields {
            let WireName::Named(wire_name) = field.wire_name else {
                continue;
            };
            if let Some(value) = (field.encode)(record).map_err(|e| e.in_field(wire_name))? {
                entries.insert(wire_name.to_string(), value);
            }
        }
        Ok(Value::Map(entries))
    }

    /// Decode a mapping into a fresh record.
    ///
    /// Missing keys leave their field at its default. Keys the record does
    /// not declare are ignored.
    pub fn decode(&self, value: &Value) -> Result<R, ConvertError> {
        self.ensure_valid()?;
        let Value::Map(entries) = value else {
            return Err(ConvertError::shape("mapping", value.kind_name()));
        };
        let mut record = R::default();
        for field in &self.fields {
            let WireName::Named(wire_name) = field.wire_name else {
                continue;
            };
            if let Some(entry) = entries.get(wire_name) {
                (field.decode)(&mut record, entry).map_err(|e| e.in_field(wire_name))?;
            }
        }
        Ok(record)
    }

    /// JSON Schema for the record, built from the same wire names the
    /// converter uses. Optional fields are not listed as required.
    pub fn json_schema(&self, generator: &mut SchemaGenerator) -> Schema {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();
        for field in &self.fields {
            let WireName::Named(wire_name) = field.wire_name else {
                continue;
            };
            let mut schema = (field.schema)(generator).to_value();
            if let (Some(description), Some(object)) = (field.description, schema.as_object_mut()) {
                object.insert("description".into(), description.into());
            }
            properties.insert(wire_name.to_string(), schema);
            if !field.kind.is_optional() {
                required.push(serde_json::Value::from(wire_name));
            }
        }

        let mut root = serde_json::Map::new();
        root.insert("type".into(), "object".into());
        if let Some(description) = self.description {
            root.insert("description".into(), description.into());
        }
        root.insert("properties".into(), serde_json::Value::Object(properties));
        root.insert("required".into(), serde_json::Value::Array(required));
        Schema::from(root)
    }
}

/// Builder for [`RecordDescriptor`].
pub struct RecordDescriptorBuilder<R> {
    type_name: &'static str,
    description: Option<&'static str>,
    fields: Vec<FieldDescriptor<R>>,
}

impl<R: Record> RecordDescriptorBuilder<R> {
    /// Describe the record as a whole.
    pub fn description(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Add a field, reached through a pair of accessors.
    pub fn field<F, G, M>(mut self, name: &'static str, wire_name: WireName, get: G, get_mut: M) -> Self
    where
        F: WireField,
        G: Fn(&R) -> &F + Send + Sync + 'static,
        M: Fn(&mut R) -> &mut F + Send + Sync + 'static,
    {
        self.fields.push(FieldDescriptor {
            name,
            wire_name,
            kind: F::wire_kind(),
            description: None,
            encode: Box::new(move |record: &R| get(record).to_wire()),
            decode: Box::new(move |record: &mut R, value: &Value| {
                *get_mut(record) = F::from_wire(value)?;
                Ok(())
            }),
            schema: SchemaGenerator::subschema_for::<F>,
            check: F::check_wire,
        });
        self
    }

    /// Attach a description to the most recently added field.
    pub fn describe(mut self, description: &'static str) -> Self {
        if let Some(field) = self.fields.last_mut() {
            field.description = Some(description);
        }
        self
    }

    pub fn build(self) -> RecordDescriptor<R> {
        RecordDescriptor {
            type_name: self.type_name,
            description: self.description,
            fields: self.fields,
            validity: OnceLock::new(),
        }
    }
}
