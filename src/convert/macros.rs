/// Implements [`Record`](crate::convert::Record) for a struct, along with
/// [`WireField`](crate::convert::WireField) (so it can nest in other
/// records) and [`JsonSchema`](schemars::JsonSchema) (built from the same
/// descriptor).
///
/// Each field is listed by name. A field's wire name defaults to its Rust
/// name; `field: "wireName"` overrides it and `field: skip` keeps it off the
/// wire entirely. `= "..."` attaches a description that ends up in the
/// schema. The struct must implement `Default`.
///
/// ```
/// use genbind::record;
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Forecast {
///     name: String,
///     detail: String,
///     cached: bool,
/// }
///
/// record! {
///     Forecast: "A single forecast period." {
///         name = "The name of the period.",
///         detail: "forecast" = "The forecast for the period.",
///         cached: skip,
///     }
/// }
///
/// let forecast = Forecast { name: "Tonight".into(), detail: "Clear".into(), cached: true };
/// let tree = genbind::convert::encode(&forecast).unwrap();
/// assert_eq!(tree.get("forecast").and_then(|v| v.as_str()), Some("Clear"));
/// assert!(tree.get("cached").is_none());
/// ```
#[macro_export]
macro_rules! record {
    (@wire $field:ident) => {
        $crate::convert::WireName::Named(stringify!($field))
    };
    (@wire $field:ident skip) => {
        $crate::convert::WireName::Omit
    };
    (@wire $field:ident $wire:literal) => {
        $crate::convert::WireName::Named($wire)
    };
    (
        $ty:ident $(: $desc:literal)? {
            $( $field:ident $(: $wire:tt)? $(= $fdesc:literal)? ),* $(,)?
        }
    ) => {
        impl $crate::convert::Record for $ty {
            fn descriptor() -> &'static $crate::convert::RecordDescriptor<Self> {
                static DESCRIPTOR: ::std::sync::OnceLock<$crate::convert::RecordDescriptor<$ty>> =
                    ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    #[allow(unused_mut)]
                    let mut builder =
                        $crate::convert::RecordDescriptor::<$ty>::builder(stringify!($ty));
                    $( builder = builder.description($desc); )?
                    $(
                        builder = builder.field(
                            stringify!($field),
                            $crate::record!(@wire $field $($wire)?),
                            |record| &record.$field,
                            |record| &mut record.$field,
                        );
                        $( builder = builder.describe($fdesc); )?
                    )*
                    builder.build()
                })
            }
        }

        impl $crate::convert::WireField for $ty {
            fn wire_kind() -> $crate::convert::WireKind {
                $crate::convert::WireKind::Record(stringify!($ty))
            }

            fn to_wire(
                &self,
            ) -> ::std::result::Result<
                ::std::option::Option<$crate::convert::Value>,
                $crate::error::ConvertError,
            > {
                <Self as $crate::convert::Record>::descriptor()
                    .encode(self)
                    .map(::std::option::Option::Some)
            }

            fn from_wire(
                value: &$crate::convert::Value,
            ) -> ::std::result::Result<Self, $crate::error::ConvertError> {
                <Self as $crate::convert::Record>::descriptor().decode(value)
            }

            fn check_wire(
                seen: &mut ::std::vec::Vec<::std::any::TypeId>,
            ) -> ::std::result::Result<(), ::std::string::String> {
                <Self as $crate::convert::Record>::descriptor().check(seen)
            }
        }

        impl $crate::schemars::JsonSchema for $ty {
            fn schema_name() -> ::std::borrow::Cow<'static, str> {
                ::std::borrow::Cow::Borrowed(stringify!($ty))
            }

            fn schema_id() -> ::std::borrow::Cow<'static, str> {
                ::std::borrow::Cow::Borrowed(concat!(module_path!(), "::", stringify!($ty)))
            }

            fn json_schema(
                generator: &mut $crate::schemars::SchemaGenerator,
            ) -> $crate::schemars::Schema {
                <Self as $crate::convert::Record>::descriptor().json_schema(generator)
            }
        }
    };
}
