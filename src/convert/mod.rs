//! Conversion between records and binary structures.
//!
//! Both directions walk the fields in declaration order and pick the first rule that applies:
//!
//! 1. the caller's hook, if it returns a value for the field
//! 2. the per-field encoder or decoder of the [`crate::Field`] declaration
//! 3. the default rule for the field's [`CType`]
//!
//! # Default rules
//!
//! | Binary type              | Encoding (record to binary)        | Decoding (binary to record)  |
//! |--------------------------|------------------------------------|------------------------------|
//! | integer, float, bool     | assigned directly                  | passed through               |
//! | `c_char`, `c_char` array | text as UTF-8 bytes                | bytes as UTF-8 text          |
//! | array of primitives      | element-wise                       | list of scalars              |
//! | nested structure         | encoded into the slot's layout     | record type of the layout    |
//! | array of structures      | each encoded into the slot's layout | each decoded recursively    |
//!
//! The record type of a nested layout is resolved through the [`crate::LayoutRegistry`]
//! reverse mapping. Hooks are passed down into nested records and array elements.

use crate::types::{CType, Value};

mod decoder;
mod encoder;

pub use decoder::from_ctype;
pub use encoder::{encode_as, to_ctype};

/// Encode override: `(field name, binary type, current slot value, record value)`.
///
/// Returning `Some` assigns the value into the slot and skips every other rule for the field.
pub type EncodeHook<'h> = &'h dyn Fn(&str, &CType, &Value, &Value) -> Option<Value>;

/// Decode override: `(field name, binary type, slot value)`.
///
/// Returning `Some` uses the value as the record value and skips every other rule for the
/// field.
pub type DecodeHook<'h> = &'h dyn Fn(&str, &CType, &Value) -> Option<Value>;
