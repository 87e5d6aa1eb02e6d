//! The conversion surface for typed Rust structs.
//!
//! Implementing [`CData`] for a plain struct only requires naming its [`RecordType`] and
//! mapping between the struct and a [`Record`]. Every buffer, binary structure and mapping
//! operation is then provided.

use crate::{
    convert::{DecodeHook, EncodeHook},
    layout::{CStruct, LayoutRef, OwnedStruct},
    record::{Record, RecordType},
    types::Dict,
    Result,
};

/// A typed record with a fixed binary layout.
///
/// # Examples
///
/// ```rust
/// use std::sync::OnceLock;
/// use cdata::{CData, CType, Field, LayoutKind, Primitive, Record, RecordType, Result, Value};
///
/// #[derive(Debug, PartialEq)]
/// struct Item {
///     number: u32,
///     text: String,
/// }
///
/// impl CData for Item {
///     fn record_type() -> RecordType {
///         static TYPE: OnceLock<RecordType> = OnceLock::new();
///         TYPE.get_or_init(|| {
///             RecordType::builder("Item", LayoutKind::Little)
///                 .field(Field::builder("number", Primitive::U32).build().unwrap())
///                 .field(Field::builder("text", CType::chars(10)).build().unwrap())
///                 .build()
///                 .unwrap()
///         })
///         .clone()
///     }
///
///     fn to_record(&self) -> Result<Record> {
///         Self::record_type().new_record([
///             Value::from(self.number),
///             Value::from(self.text.as_str()),
///         ])
///     }
///
///     fn from_record(record: &Record) -> Result<Self> {
///         Ok(Item {
///             number: record.get("number")?.as_u64().unwrap_or_default() as u32,
///             text: record.get("text")?.as_str().unwrap_or_default().to_string(),
///         })
///     }
/// }
///
/// let item = Item { number: 9999, text: "ABCDEFGHIJ".to_string() };
/// let bytes = item.to_bytes()?;
/// assert_eq!(bytes.len(), Item::size());
/// assert_eq!(Item::from_buffer_copy(&bytes)?, item);
/// # Ok::<(), cdata::Error>(())
/// ```
pub trait CData: Sized {
    /// The record type describing the fields of `Self`
    fn record_type() -> RecordType;

    /// Converts `self` into a record of [`CData::record_type`]
    ///
    /// # Errors
    /// Returns an error if the record can not be constructed.
    fn to_record(&self) -> Result<Record>;

    /// Builds `Self` from a record of [`CData::record_type`]
    ///
    /// # Errors
    /// Returns an error if a field is missing or holds an unexpected value.
    fn from_record(record: &Record) -> Result<Self>;

    /// The generated binary layout
    fn ctype() -> LayoutRef {
        Self::record_type().ctype()
    }

    /// Size of the binary structure in bytes
    fn size() -> usize {
        Self::record_type().size()
    }

    /// Decodes the structure held by `buffer` without copying it first
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `buffer` is too short, or any decoding error.
    fn from_buffer(buffer: &mut [u8]) -> Result<Self> {
        Self::from_record(&Self::record_type().from_buffer(buffer)?)
    }

    /// Decodes a private copy of the structure held by `buffer`
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `buffer` is too short, or any decoding error.
    fn from_buffer_copy(buffer: &[u8]) -> Result<Self> {
        Self::from_record(&Self::record_type().from_buffer_copy(buffer)?)
    }

    /// Decodes a binary structure
    ///
    /// # Errors
    /// Returns any decoding error.
    fn from_ctype<B: AsRef<[u8]>>(structure: &CStruct<B>) -> Result<Self> {
        Self::from_record(&Self::record_type().from_ctype(structure)?)
    }

    /// Decodes a binary structure, consulting `hook` first
    ///
    /// # Errors
    /// Returns any decoding error.
    fn from_ctype_with<B: AsRef<[u8]>>(
        structure: &CStruct<B>,
        hook: DecodeHook<'_>,
    ) -> Result<Self> {
        Self::from_record(&Self::record_type().from_ctype_with(structure, hook)?)
    }

    /// Encodes `self` into a fresh binary structure
    ///
    /// # Errors
    /// Returns any encoding error.
    fn to_ctype(&self) -> Result<OwnedStruct> {
        self.to_record()?.to_ctype()
    }

    /// Encodes `self`, consulting `hook` first
    ///
    /// # Errors
    /// Returns any encoding error.
    fn to_ctype_with(&self, hook: EncodeHook<'_>) -> Result<OwnedStruct> {
        self.to_record()?.to_ctype_with(hook)
    }

    /// Builds `Self` from a plain mapping
    ///
    /// # Errors
    /// Returns [`crate::Error::FieldNotFound`] or [`crate::Error::MissingField`] for keys that
    /// do not match the declared fields.
    fn from_dict(dict: &Dict) -> Result<Self> {
        Self::from_record(&Self::record_type().from_dict(dict)?)
    }

    /// Plain mapping of `self`
    ///
    /// # Errors
    /// Returns an error if the record can not be constructed.
    fn to_dict(&self) -> Result<Dict> {
        Ok(self.to_record()?.to_dict())
    }

    /// The exact byte image of the encoded value
    ///
    /// # Errors
    /// Returns any encoding error.
    fn to_bytes(&self) -> Result<Vec<u8>> {
        self.to_record()?.to_bytes()
    }

    /// Mutable byte image of the encoded value
    ///
    /// # Errors
    /// Returns any encoding error.
    fn to_bytearray(&self) -> Result<Vec<u8>> {
        self.to_record()?.to_bytearray()
    }
}
