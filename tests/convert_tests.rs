//! Structural converter tests through the public API.

use genbind::convert::{self, Record, Value, WireKind};
use genbind::error::ConvertError;
use genbind::record;
use pretty_assertions::assert_eq;
use serde_json::json;

#[derive(Debug, Default, Clone, PartialEq)]
struct B {
    x: String,
}

record! { B { x: "X" } }

#[derive(Debug, Default, Clone, PartialEq)]
struct A {
    x: i64,
    y: String,
    z: f64,
    u: B,
    v: Option<Box<B>>,
    s: Vec<i32>,
}

record! {
    A {
        x: "X",
        y: "y",
        z: skip,
        u: "U",
        v: "V",
        s: "S",
    }
}

fn sample() -> A {
    A {
        x: 1234,
        y: "abcd".into(),
        z: 12.34,
        u: B { x: "AB".into() },
        v: Some(Box::new(B { x: "CD".into() })),
        s: vec![1, 2, 3],
    }
}

#[test]
fn encode_produces_one_entry_per_wire_field() {
    let tree = convert::encode(&sample()).unwrap();

    let map = tree.as_map().unwrap();
    assert_eq!(map.len(), 5);
    assert_eq!(tree.get("X"), Some(&Value::Int(1234)));
    assert_eq!(tree.get("y").and_then(Value::as_str), Some("abcd"));
    assert_eq!(tree.get("U").and_then(|u| u.get("X")), Some(&Value::from("AB")));
    assert_eq!(tree.get("V").and_then(|v| v.get("X")), Some(&Value::from("CD")));
    assert_eq!(
        tree.get("S"),
        Some(&Value::Seq(vec![Value::Int(1), Value::Int(2), Value::Int(3)]))
    );
    assert!(tree.get("z").is_none());
}

#[test]
fn decode_fills_nested_and_boxed_records() {
    let decoded: A = convert::decode_json(json!({
        "X": 1234,
        "y": "abcd",
        "z": 99.0,
        "U": {"X": "AB"},
        "V": {"X": "CD"},
        "S": [1, 2.0, 3],
    }))
    .unwrap();

    assert_eq!(
        decoded,
        A {
            z: 0.0,
            ..sample()
        }
    );
}

#[test]
fn round_trip_preserves_every_wire_field() {
    let original = A {
        z: 0.0,
        v: None,
        ..sample()
    };

    let back: A = convert::decode(&convert::encode(&original).unwrap()).unwrap();

    assert_eq!(back, original);
}

#[test]
fn absent_optional_record_is_omitted() {
    let json = convert::encode_json(&A {
        v: None,
        ..sample()
    })
    .unwrap();

    assert!(json.get("V").is_none());
    assert_eq!(json["U"], json!({"X": "AB"}));
}

#[test]
fn json_text_round_trips_through_value() {
    let tree = convert::encode(&sample()).unwrap();

    let text = serde_json::to_string(&tree).unwrap();
    let parsed: Value = serde_json::from_str(&text).unwrap();

    assert_eq!(convert::decode::<A>(&parsed).unwrap(), convert::decode::<A>(&tree).unwrap());
}

#[test]
fn sequence_elements_must_match_the_element_kind() {
    let err = convert::decode_json::<A>(json!({"S": [1, "two"]})).unwrap_err();

    assert_eq!(
        err,
        ConvertError::TypeMismatch {
            path: "S[1]".into(),
            expected: "i32",
            found: "string".into(),
        }
    );
}

#[test]
fn sequence_fields_reject_scalars() {
    let err = convert::decode_json::<A>(json!({"S": 3})).unwrap_err();

    assert!(matches!(err, ConvertError::ShapeMismatch { expected: "sequence", .. }));
}

#[test]
fn strings_are_not_coerced() {
    let err = convert::decode_json::<A>(json!({"y": 5})).unwrap_err();

    assert_eq!(err.path(), "y");
    assert!(err.to_string().contains("expected string"));
}

#[test]
fn descriptor_reports_wire_kinds() {
    let fields = A::descriptor().fields();

    let kinds: Vec<_> = fields.iter().map(|field| field.kind().clone()).collect();
    assert_eq!(
        kinds,
        vec![
            WireKind::Integer("i64"),
            WireKind::String,
            WireKind::Float("f64"),
            WireKind::Record("B"),
            WireKind::Optional(Box::new(WireKind::Record("B"))),
            WireKind::Sequence(Box::new(WireKind::Integer("i32"))),
        ]
    );
}

#[derive(Debug, Default, Clone, PartialEq)]
struct Shadowed {
    first: i64,
    second: i64,
}

record! { Shadowed { first: "value", second: "value" } }

#[test]
fn shared_wire_names_are_rejected_instead_of_dropping_data() {
    let err = convert::encode(&Shadowed { first: 1, second: 2 }).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidRecord { record: "Shadowed", .. }));

    let err = convert::decode_json::<Shadowed>(json!({"value": 5})).unwrap_err();
    assert!(err.to_string().contains("wire name 'value' more than once"), "{err}");
}

#[test]
fn large_floats_do_not_saturate_into_integers() {
    let err = convert::decode_json::<A>(json!({"X": 9_223_372_036_854_775_808.0})).unwrap_err();

    assert_eq!(err.path(), "X");
    assert!(err.to_string().contains("out of range"), "{err}");
}
