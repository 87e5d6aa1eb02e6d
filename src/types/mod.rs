//! Binary type descriptors.
//!
//! A [`CType`] is the binary-type tag carried by every field declaration. It is decided once,
//! when the field is declared, and drives both the byte layout of the field and the way its
//! value is encoded and decoded:
//!
//! - [`CType::Scalar`] - a single [`Primitive`]
//! - [`CType::Array`] - a fixed-length array of primitives; arrays of `c_char` hold text
//! - [`CType::Record`] - a nested structure or union described by its [`Layout`]
//! - [`CType::RecordArray`] - a fixed-length array of nested structures or unions
//!
//! # Examples
//!
//! ```rust
//! use cdata::{CType, Primitive};
//!
//! let number = CType::from(Primitive::U32);
//! let text = CType::chars(10);
//! let samples = CType::array(Primitive::U16, 6);
//!
//! assert_eq!(number.size(), 4);
//! assert_eq!(text.size(), 10);
//! assert_eq!(samples.size(), 12);
//! assert_eq!(text.to_string(), "c_char_Array_10");
//! ```

use std::fmt;

mod primitive;
mod value;

pub use primitive::*;
pub use value::{Dict, Value};

use crate::layout::{Layout, LayoutRef};

/// The binary type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CType {
    /// A single primitive slot
    Scalar(Primitive),
    /// A fixed-length array of primitives
    Array {
        /// Element type
        kind: Primitive,
        /// Number of elements
        len: usize,
    },
    /// A nested structure or union
    Record(LayoutRef),
    /// A fixed-length array of nested structures or unions
    RecordArray {
        /// Layout of each element
        layout: LayoutRef,
        /// Number of elements
        len: usize,
    },
}

impl CType {
    /// A fixed-length array of `kind`
    #[must_use]
    pub fn array(kind: Primitive, len: usize) -> CType {
        CType::Array { kind, len }
    }

    /// A fixed-length `c_char` array holding text
    #[must_use]
    pub fn chars(len: usize) -> CType {
        CType::Array {
            kind: Primitive::Char,
            len,
        }
    }

    /// A nested structure or union
    #[must_use]
    pub fn record(layout: &LayoutRef) -> CType {
        CType::Record(layout.clone())
    }

    /// A fixed-length array of nested structures or unions
    #[must_use]
    pub fn record_array(layout: &LayoutRef, len: usize) -> CType {
        CType::RecordArray {
            layout: layout.clone(),
            len,
        }
    }

    /// Size of the type in bytes.
    ///
    /// Saturates at `usize::MAX`; declared fields never get there, since
    /// [`crate::FieldBuilder::build`] rejects types whose size overflows.
    #[must_use]
    pub fn size(&self) -> usize {
        self.checked_size().unwrap_or(usize::MAX)
    }

    /// Size of the type in bytes, `None` if it overflows `usize`
    #[must_use]
    pub fn checked_size(&self) -> Option<usize> {
        match self {
            CType::Scalar(kind) => Some(kind.size()),
            CType::Array { kind, len } => kind.size().checked_mul(*len),
            CType::Record(layout) => Some(layout.size()),
            CType::RecordArray { layout, len } => layout.size().checked_mul(*len),
        }
    }

    /// Natural alignment of the type in bytes
    #[must_use]
    pub fn align(&self) -> usize {
        match self {
            CType::Scalar(kind) | CType::Array { kind, .. } => kind.align(),
            CType::Record(layout) | CType::RecordArray { layout, .. } => layout.align(),
        }
    }

    /// Element count of array types
    #[must_use]
    pub fn array_len(&self) -> Option<usize> {
        match self {
            CType::Array { len, .. } | CType::RecordArray { len, .. } => Some(*len),
            CType::Scalar(_) | CType::Record(_) => None,
        }
    }

    /// Layout of nested structure types and their arrays
    #[must_use]
    pub fn layout(&self) -> Option<&Layout> {
        match self {
            CType::Record(layout) | CType::RecordArray { layout, .. } => Some(layout.as_ref()),
            CType::Scalar(_) | CType::Array { .. } => None,
        }
    }

    /// Returns true for text slots: `c_char` and arrays of it
    #[must_use]
    pub fn is_text(&self) -> bool {
        matches!(
            self,
            CType::Scalar(Primitive::Char)
                | CType::Array {
                    kind: Primitive::Char,
                    ..
                }
        )
    }

    /// Returns true if the type is a nested union or an array of unions
    #[must_use]
    pub fn is_union(&self) -> bool {
        self.layout().is_some_and(Layout::is_union)
    }
}

impl From<Primitive> for CType {
    fn from(kind: Primitive) -> Self {
        CType::Scalar(kind)
    }
}

impl From<&LayoutRef> for CType {
    fn from(layout: &LayoutRef) -> Self {
        CType::Record(layout.clone())
    }
}

impl From<LayoutRef> for CType {
    fn from(layout: LayoutRef) -> Self {
        CType::Record(layout)
    }
}

impl fmt::Display for CType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CType::Scalar(kind) => write!(f, "{}", kind.c_name()),
            CType::Array { kind, len } => write!(f, "{}_Array_{}", kind.c_name(), len),
            CType::Record(layout) => write!(f, "{}", layout.name()),
            CType::RecordArray { layout, len } => write!(f, "{}_Array_{}", layout.name(), len),
        }
    }
}
