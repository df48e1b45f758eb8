//! Per-type wire conversion and the numeric coercion rules.

use std::any::TypeId;

use schemars::JsonSchema;

use super::value::Value;
use crate::error::ConvertError;

/// Wire-level shape of a record field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireKind {
    /// Integer stored at the named width (`i32`, `u8`, ...).
    Integer(&'static str),
    Float(&'static str),
    String,
    Bool,
    /// Nested record, by type name.
    Record(&'static str),
    /// Value that may be absent (`Option<T>`).
    Optional(Box<WireKind>),
    Sequence(Box<WireKind>),
    /// A type with no wire representation.
    Unsupported(&'static str),
}

impl WireKind {
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// The first unsupported type reachable from this kind, if any.
    pub fn unsupported(&self) -> Option<&'static str> {
        match self {
            Self::Unsupported(name) => Some(name),
            Self::Optional(inner) | Self::Sequence(inner) => inner.unsupported(),
            _ => None,
        }
    }
}

/// A type that can be stored in a record field and carried on the wire.
///
/// Implemented for the integer and float primitives, `String`, `bool`,
/// `Option<T>`, `Vec<T>`, `Box<T>`, and every type declared with
/// [`record!`](crate::record). A custom type may implement it by hand; the
/// default methods reject the type as unsupported, which registration
/// reports as a configuration error.
pub trait WireField: JsonSchema + Sized + 'static {
    fn wire_kind() -> WireKind {
        WireKind::Unsupported(std::any::type_name::<Self>())
    }

    /// Encode the field. `Ok(None)` leaves the key out of the mapping.
    fn to_wire(&self) -> Result<Option<Value>, ConvertError> {
        Err(ConvertError::unsupported::<Self>())
    }

    fn from_wire(value: &Value) -> Result<Self, ConvertError> {
        let _ = value;
        Err(ConvertError::unsupported::<Self>())
    }

    /// Check that this type and everything nested in it can be converted.
    ///
    /// `seen` holds the records already being checked so recursive types
    /// terminate.
    #[doc(hidden)]
    fn check_wire(seen: &mut Vec<TypeId>) -> Result<(), String> {
        let _ = seen;
        match Self::wire_kind().unsupported() {
            Some(name) => Err(format!("type '{name}' has no wire representation")),
            None => Ok(()),
        }
    }
}

fn integer_from_wire<T>(
    value: &Value,
    expected: &'static str,
    from_i64: impl FnOnce(i64) -> Option<T>,
    from_u64: impl FnOnce(u64) -> Option<T>,
    from_f64: impl FnOnce(f64) -> Option<T>,
) -> Result<T, ConvertError> {
    let converted = match value {
        Value::Int(i) => from_i64(*i),
        Value::UInt(u) => from_u64(*u),
        // Floats truncate toward zero, then must fit the stored width.
        Value::Float(f) if f.is_finite() => from_f64(f.trunc()),
        Value::Float(_) => None,
        other => return Err(ConvertError::type_mismatch(expected, other.kind_name())),
    };
    converted.ok_or_else(|| ConvertError::type_mismatch(expected, format!("{value} (out of range)")))
}

macro_rules! impl_signed {
    ($($t:ty),*) => {$(
        impl WireField for $t {
            fn wire_kind() -> WireKind {
                WireKind::Integer(stringify!($t))
            }

            fn to_wire(&self) -> Result<Option<Value>, ConvertError> {
                Ok(Some(Value::Int(*self as i64)))
            }

            fn from_wire(value: &Value) -> Result<Self, ConvertError> {
                integer_from_wire(
                    value,
                    stringify!($t),
                    |i| <$t>::try_from(i).ok(),
                    |u| <$t>::try_from(u).ok(),
                    // MIN is a power of two, so -MIN is the exact exclusive bound.
                    |f| (f >= <$t>::MIN as f64 && f < -(<$t>::MIN as f64)).then_some(f as $t),
                )
            }
        }
    )*};
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {$(
        impl WireField for $t {
            fn wire_kind() -> WireKind {
                WireKind::Integer(stringify!($t))
            }

            fn to_wire(&self) -> Result<Option<Value>, ConvertError> {
                let wide = *self as u64;
                Ok(Some(match i64::try_from(wide) {
                    Ok(i) => Value::Int(i),
                    Err(_) => Value::UInt(wide),
                }))
            }

            fn from_wire(value: &Value) -> Result<Self, ConvertError> {
                integer_from_wire(
                    value,
                    stringify!($t),
                    |i| <$t>::try_from(i).ok(),
                    |u| <$t>::try_from(u).ok(),
                    |f| (f >= 0.0 && f < 2f64.powi(<$t>::BITS as i32)).then_some(f as $t),
                )
            }
        }
    )*};
}

macro_rules! impl_float {
    ($($t:ty),*) => {$(
        impl WireField for $t {
            fn wire_kind() -> WireKind {
                WireKind::Float(stringify!($t))
            }

            fn to_wire(&self) -> Result<Option<Value>, ConvertError> {
                Ok(Some(Value::Float(*self as f64)))
            }

            fn from_wire(value: &Value) -> Result<Self, ConvertError> {
                match value {
                    Value::Int(i) => Ok(*i as $t),
                    Value::UInt(u) => Ok(*u as $t),
                    Value::Float(f) => Ok(*f as $t),
                    other => Err(ConvertError::type_mismatch(stringify!($t), other.kind_name())),
                }
            }
        }
    )*};
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);
impl_float!(f32, f64);

impl WireField for String {
    fn wire_kind() -> WireKind {
        WireKind::String
    }

    fn to_wire(&self) -> Result<Option<Value>, ConvertError> {
        Ok(Some(Value::String(self.clone())))
    }

    fn from_wire(value: &Value) -> Result<Self, ConvertError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            other => Err(ConvertError::type_mismatch("string", other.kind_name())),
        }
    }
}

impl WireField for bool {
    fn wire_kind() -> WireKind {
        WireKind::Bool
    }

    fn to_wire(&self) -> Result<Option<Value>, ConvertError> {
        Ok(Some(Value::Bool(*self)))
    }

    fn from_wire(value: &Value) -> Result<Self, ConvertError> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(ConvertError::type_mismatch("boolean", other.kind_name())),
        }
    }
}

impl<T: WireField> WireField for Option<T> {
    fn wire_kind() -> WireKind {
        WireKind::Optional(Box::new(T::wire_kind()))
    }

    fn to_wire(&self) -> Result<Option<Value>, ConvertError> {
        match self {
            Some(inner) => inner.to_wire(),
            None => Ok(None),
        }
    }

    fn from_wire(value: &Value) -> Result<Self, ConvertError> {
        T::from_wire(value).map(Some)
    }

    fn check_wire(seen: &mut Vec<TypeId>) -> Result<(), String> {
        T::check_wire(seen)
    }
}

impl<T: WireField> WireField for Vec<T> {
    fn wire_kind() -> WireKind {
        WireKind::Sequence(Box::new(T::wire_kind()))
    }

    fn to_wire(&self) -> Result<Option<Value>, ConvertError> {
        let mut items = Vec::with_capacity(self.len());
        for (i, item) in self.iter().enumerate() {
            match item.to_wire().map_err(|e| e.in_index(i))? {
                Some(value) => items.push(value),
                None => return Err(ConvertError::shape("value", "absent element").in_index(i)),
            }
        }
        Ok(Some(Value::Seq(items)))
    }

    fn from_wire(value: &Value) -> Result<Self, ConvertError> {
        match value {
            Value::Seq(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| T::from_wire(item).map_err(|e| e.in_index(i)))
                .collect(),
            other => Err(ConvertError::shape("sequence", other.kind_name())),
        }
    }

    fn check_wire(seen: &mut Vec<TypeId>) -> Result<(), String> {
        T::check_wire(seen)
    }
}

impl<T: WireField> WireField for Box<T> {
    fn wire_kind() -> WireKind {
        T::wire_kind()
    }

    fn to_wire(&self) -> Result<Option<Value>, ConvertError> {
        (**self).to_wire()
    }

    fn from_wire(value: &Value) -> Result<Self, ConvertError> {
        T::from_wire(value).map(Box::new)
    }

    fn check_wire(seen: &mut Vec<TypeId>) -> Result<(), String> {
        T::check_wire(seen)
    }
}
