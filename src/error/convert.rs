//! Errors raised while converting between records and dynamic values.

use thiserror::Error;

/// Failure to convert a record to or from a [`Value`](crate::convert::Value).
///
/// `path` locates the offending node inside the tree, e.g. `address.city` or
/// `tags[2]`. It is empty when the root itself is at fault.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error("shape mismatch at {}: expected {expected}, found {found}", display_path(path))]
    ShapeMismatch {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("type mismatch at {}: expected {expected}, found {found}", display_path(path))]
    TypeMismatch {
        path: String,
        expected: &'static str,
        found: String,
    },

    #[error("unsupported type at {}: {type_name}", display_path(path))]
    UnsupportedType {
        path: String,
        type_name: &'static str,
    },

    /// The record's own declaration is unusable, e.g. two fields share a
    /// wire name. Nothing is converted.
    #[error("invalid record '{record}' at {}: {reason}", display_path(path))]
    InvalidRecord {
        path: String,
        record: &'static str,
        reason: String,
    },
}

impl ConvertError {
    pub(crate) fn shape(expected: &'static str, found: &'static str) -> Self {
        Self::ShapeMismatch {
            path: String::new(),
            expected,
            found,
        }
    }

    pub(crate) fn type_mismatch(expected: &'static str, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            path: String::new(),
            expected,
            found: found.into(),
        }
    }

    pub(crate) fn unsupported<T: ?Sized>() -> Self {
        Self::UnsupportedType {
            path: String::new(),
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Path to the node that failed.
    pub fn path(&self) -> &str {
        match self {
            Self::ShapeMismatch { path, .. }
            | Self::TypeMismatch { path, .. }
            | Self::UnsupportedType { path, .. }
            | Self::InvalidRecord { path, .. } => path,
        }
    }

    /// Prefix the path with a record field's wire name.
    pub fn in_field(self, wire_name: &str) -> Self {
        self.prefix(|path| {
            if path.is_empty() {
                wire_name.to_string()
            } else if path.starts_with('[') {
                format!("{wire_name}{path}")
            } else {
                format!("{wire_name}.{path}")
            }
        })
    }

    /// Prefix the path with a sequence index.
    pub fn in_index(self, index: usize) -> Self {
        self.prefix(|path| {
            if path.is_empty() || path.starts_with('[') {
                format!("[{index}]{path}")
            } else {
                format!("[{index}].{path}")
            }
        })
    }

    fn prefix(mut self, f: impl FnOnce(&str) -> String) -> Self {
        match &mut self {
            Self::ShapeMismatch { path, .. }
            | Self::TypeMismatch { path, .. }
            | Self::UnsupportedType { path, .. }
            | Self::InvalidRecord { path, .. } => *path = f(path),
        }
        self
    }
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}
