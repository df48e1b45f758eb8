//! JSON Schema generation for record types.

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

use schemars::generate::SchemaSettings;
use schemars::JsonSchema;

use crate::error::{GenbindError, Result};

type SchemaCache = RwLock<HashMap<TypeId, serde_json::Value>>;

fn cache() -> &'static SchemaCache {
    static CACHE: OnceLock<SchemaCache> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// JSON Schema describing `T`, with nested records inlined.
///
/// Schemas are computed once per type and cached for the life of the
/// process. Fails with a configuration error when `T` does not describe an
/// object, i.e. it is not a record type.
pub fn schema_of<T: JsonSchema + 'static>() -> Result<serde_json::Value> {
    let id = TypeId::of::<T>();
    if let Some(schema) = cache()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
    {
        return Ok(schema.clone());
    }

    let schema = generate::<T>()?;
    cache()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(id, schema.clone());
    Ok(schema)
}

fn generate<T: JsonSchema>() -> Result<serde_json::Value> {
    let generator = SchemaSettings::draft2020_12()
        .with(|settings| {
            settings.inline_subschemas = true;
            settings.meta_schema = None;
        })
        .into_generator();
    let schema = generator.into_root_schema_for::<T>().to_value();

    let is_object = schema
        .get("type")
        .and_then(serde_json::Value::as_str)
        .is_some_and(|ty| ty == "object");
    if !is_object {
        return Err(GenbindError::Configuration(format!(
            "'{}' is not a record type",
            type_name::<T>()
        )));
    }
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;
    use serde_json::json;

    #[derive(Debug, Default)]
    struct Address {
        city: String,
        zip: Option<String>,
    }

    record! {
        Address {
            city = "City name.",
            zip,
        }
    }

    #[derive(Debug, Default)]
    struct Person {
        name: String,
        age: u8,
        secret: String,
        address: Address,
        scores: Vec<f64>,
    }

    record! {
        Person: "A person." {
            name: "fullName",
            age,
            secret: skip,
            address,
            scores,
        }
    }

    #[test]
    fn schema_follows_wire_names() {
        let schema = schema_of::<Person>().unwrap();

        let properties = schema["properties"].as_object().unwrap();
        let mut keys: Vec<_> = properties.keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["address", "age", "fullName", "scores"]);
        assert_eq!(schema["description"], json!("A person."));
        assert_eq!(schema["properties"]["fullName"]["type"], json!("string"));
        assert_eq!(schema["properties"]["scores"]["type"], json!("array"));
    }

    #[test]
    fn nested_records_are_inlined_with_descriptions() {
        let schema = schema_of::<Person>().unwrap();

        let address = &schema["properties"]["address"];
        assert_eq!(address["type"], json!("object"));
        assert_eq!(address["properties"]["city"]["description"], json!("City name."));
        assert_eq!(address["required"], json!(["city"]));
    }

    #[test]
    fn optional_fields_are_not_required() {
        let schema = schema_of::<Address>().unwrap();

        assert_eq!(schema["required"], json!(["city"]));
    }

    #[test]
    fn repeated_calls_return_the_cached_schema() {
        let first = schema_of::<Address>().unwrap();
        let second = schema_of::<Address>().unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn non_record_types_are_rejected() {
        let err = schema_of::<String>().unwrap_err();

        assert!(matches!(err, GenbindError::Configuration(_)));
        assert!(err.to_string().contains("not a record type"));
    }
}
