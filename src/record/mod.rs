//! Record types and record instances.
//!
//! A [`RecordType`] is an explicit, ordered field table built once at declaration time. It
//! is the record-side half of every conversion: the [`LayoutRegistry`] derives the binary
//! layout from it, and the encoder and decoder walk its fields in declaration order.
//!
//! A [`Record`] is a value object holding one [`Value`] per field of its type. Equality is
//! structural: two records are equal if they share the record type and all field values are
//! equal.
//!
//! # Examples
//!
//! ```rust
//! use cdata::{CType, Field, LayoutKind, Primitive, RecordType, Value};
//!
//! let item = RecordType::builder("Item", LayoutKind::Little)
//!     .field(Field::builder("number", Primitive::U32).build()?)
//!     .field(Field::builder("text", CType::chars(10)).build()?)
//!     .build()?;
//!
//! let record = item.create([
//!     ("number", Value::from(9999u32)),
//!     ("text", Value::from("ABCDEFGHIJ")),
//! ])?;
//! let bytes = record.to_bytes()?;
//! assert_eq!(bytes.len(), item.size());
//! assert_eq!(&bytes[..4], &[0x0F, 0x27, 0x00, 0x00]);
//!
//! assert_eq!(item.from_buffer_copy(&bytes)?, record);
//! # Ok::<(), cdata::Error>(())
//! ```

use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

mod dict;
mod field;

pub use field::{Field, FieldBuilder, FieldDecoder, FieldEncoder};

use crate::{
    convert::{self, DecodeHook, EncodeHook},
    io::ByteOrder,
    layout::{CStruct, LayoutKind, LayoutRef, LayoutRegistry, OwnedStruct, StructView},
    types::{CType, Dict, Value},
    Error, Result,
};

static NEXT_RECORD_ID: AtomicU64 = AtomicU64::new(1);

/// Largest packing alignment accepted by [`RecordTypeBuilder::pack`]
pub const MAX_PACK: usize = 16;

struct RecordTypeInner {
    id: u64,
    name: String,
    kind: LayoutKind,
    order: ByteOrder,
    pack: usize,
    fields: Vec<Field>,
}

/// A declared record type: an ordered, immutable table of [`Field`]s.
///
/// Cloning is cheap and yields the same record type. Identity is by declaration, so two
/// separately built types with identical fields are distinct and get distinct layouts.
#[derive(Clone)]
pub struct RecordType(Arc<RecordTypeInner>);

impl RecordType {
    /// Starts the declaration of a record type named `name` with base layout `kind`
    pub fn builder(name: impl Into<String>, kind: LayoutKind) -> RecordTypeBuilder {
        RecordTypeBuilder {
            name: name.into(),
            kind,
            pack: 1,
            fields: Vec::new(),
        }
    }

    /// Builds an anonymous record type mirroring the fields of `layout` one to one
    pub(crate) fn synthetic(layout: &LayoutRef) -> RecordType {
        let fields = layout
            .fields()
            .iter()
            .map(|field| Field::new(field.name().to_string(), field.ctype().clone()))
            .collect();

        RecordType(Arc::new(RecordTypeInner {
            id: NEXT_RECORD_ID.fetch_add(1, Ordering::Relaxed),
            name: format!("_generated_record_{}", layout.name()),
            kind: layout.kind(),
            order: layout.byte_order(),
            pack: layout.pack(),
            fields,
        }))
    }

    /// Builds a copy of `self` declared with another kind, byte order and packing.
    ///
    /// `fields` replace the declared fields; their nested layouts are expected to share
    /// `order` already.
    pub(crate) fn variant(
        &self,
        kind: LayoutKind,
        order: ByteOrder,
        pack: usize,
        fields: Vec<Field>,
    ) -> RecordType {
        RecordType(Arc::new(RecordTypeInner {
            id: NEXT_RECORD_ID.fetch_add(1, Ordering::Relaxed),
            name: self.0.name.clone(),
            kind,
            order,
            pack,
            fields,
        }))
    }

    /// Process-unique identity of this record type
    #[must_use]
    pub fn id(&self) -> u64 {
        self.0.id
    }

    /// Name of the record type
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Base layout kind
    #[must_use]
    pub fn kind(&self) -> LayoutKind {
        self.0.kind
    }

    /// Base layout kind; alias of [`RecordType::kind`]
    #[must_use]
    pub fn endian(&self) -> LayoutKind {
        self.0.kind
    }

    /// Byte order of every multi-byte scalar, including nested structures
    #[must_use]
    pub fn byte_order(&self) -> ByteOrder {
        self.0.order
    }

    /// Packing alignment
    #[must_use]
    pub fn pack(&self) -> usize {
        self.0.pack
    }

    /// Fields in declaration order
    #[must_use]
    pub fn fields(&self) -> &[Field] {
        &self.0.fields
    }

    /// Looks up a field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.0.fields.iter().find(|field| field.name() == name)
    }

    /// Position of the field `name` in declaration order
    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.0.fields.iter().position(|field| field.name() == name)
    }

    /// The generated layout of this record type, shared through the global registry
    #[must_use]
    pub fn ctype(&self) -> LayoutRef {
        LayoutRegistry::global().get_or_create_layout(self, self.0.kind, self.0.pack)
    }

    /// Size of the binary structure in bytes
    #[must_use]
    pub fn size(&self) -> usize {
        self.ctype().size()
    }

    /// Keyword construction.
    ///
    /// Fields without a supplied value take their default.
    ///
    /// # Errors
    /// Returns [`crate::Error::FieldNotFound`] for a name that is not a field of this type
    /// and [`crate::Error::MissingField`] for a field with neither a value nor a default.
    pub fn create<I, K>(&self, values: I) -> Result<Record>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        let mut slots: Vec<Option<Value>> = vec![None; self.0.fields.len()];
        for (name, value) in values {
            let name = name.as_ref();
            let index = self.field_index(name).ok_or_else(|| self.not_found(name))?;
            slots[index] = Some(value);
        }

        self.fill(slots)
    }

    /// Positional construction, values are taken in declaration order.
    ///
    /// # Errors
    /// Returns [`crate::Error::FieldNotFound`] if more values than fields are given and
    /// [`crate::Error::MissingField`] for a trailing field with neither a value nor a default.
    pub fn new_record<I>(&self, values: I) -> Result<Record>
    where
        I: IntoIterator<Item = Value>,
    {
        let mut slots: Vec<Option<Value>> = vec![None; self.0.fields.len()];
        for (index, value) in values.into_iter().enumerate() {
            let slot = slots
                .get_mut(index)
                .ok_or_else(|| Error::FieldNotFound(format!("{}[{}]", self.name(), index)))?;
            *slot = Some(value);
        }

        self.fill(slots)
    }

    /// A record with every field at its default.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingField`] if a field has no default.
    pub fn default_record(&self) -> Result<Record> {
        self.fill(vec![None; self.0.fields.len()])
    }

    fn fill(&self, slots: Vec<Option<Value>>) -> Result<Record> {
        let values = self
            .0
            .fields
            .iter()
            .zip(slots)
            .map(|(field, slot)| match slot {
                Some(value) => Ok(value),
                None => field.default().cloned().ok_or_else(|| {
                    Error::MissingField(format!("{}.{}", self.name(), field.name()))
                }),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Record {
            record_type: self.clone(),
            values,
        })
    }

    fn not_found(&self, name: &str) -> Error {
        Error::FieldNotFound(format!("{}.{}", self.name(), name))
    }

    /// Decodes a binary structure into a record of this type
    ///
    /// # Errors
    /// Returns an error if a slot can not be decoded or the decoded fields do not match this
    /// record type.
    pub fn from_ctype<B: AsRef<[u8]>>(&self, structure: &CStruct<B>) -> Result<Record> {
        convert::from_ctype(self, structure, None)
    }

    /// Decodes a binary structure, consulting `hook` before any other decoding rule
    ///
    /// # Errors
    /// See [`RecordType::from_ctype`].
    pub fn from_ctype_with<B: AsRef<[u8]>>(
        &self,
        structure: &CStruct<B>,
        hook: DecodeHook<'_>,
    ) -> Result<Record> {
        convert::from_ctype(self, structure, Some(hook))
    }

    /// Decodes the structure held by `buffer` without copying it first
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `buffer` is shorter than [`RecordType::size`],
    /// or any decoding error.
    pub fn from_buffer(&self, buffer: &mut [u8]) -> Result<Record> {
        let view = self.view(buffer)?;
        self.from_ctype(&view)
    }

    /// Decodes a private copy of the structure held by `buffer`
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `buffer` is shorter than [`RecordType::size`],
    /// or any decoding error.
    pub fn from_buffer_copy(&self, buffer: &[u8]) -> Result<Record> {
        let structure = OwnedStruct::from_buffer_copy(&self.ctype(), buffer)?;
        self.from_ctype(&structure)
    }

    /// A binary structure of this type aliasing `buffer`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `buffer` is shorter than [`RecordType::size`].
    pub fn view<'a>(&self, buffer: &'a mut [u8]) -> Result<StructView<'a>> {
        StructView::from_buffer(&self.ctype(), buffer)
    }

    /// Builds a record from a plain mapping, recursing into nested record types
    ///
    /// # Errors
    /// Returns [`crate::Error::FieldNotFound`] for unknown keys and
    /// [`crate::Error::MissingField`] for required fields absent from `dict`.
    pub fn from_dict(&self, dict: &Dict) -> Result<Record> {
        dict::from_dict(self, dict)
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for RecordType {}

impl Hash for RecordType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("id", &self.0.id)
            .field("name", &self.0.name)
            .field("kind", &self.0.kind)
            .field("order", &self.0.order)
            .field("pack", &self.0.pack)
            .field("fields", &self.0.fields)
            .finish()
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.name)
    }
}

/// Builder for [`RecordType`] declarations
pub struct RecordTypeBuilder {
    name: String,
    kind: LayoutKind,
    pack: usize,
    fields: Vec<Field>,
}

impl RecordTypeBuilder {
    /// Sets the packing alignment, 1 by default
    #[must_use]
    pub fn pack(mut self, pack: usize) -> Self {
        self.pack = pack;
        self
    }

    /// Appends a field
    #[must_use]
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends several fields in order
    #[must_use]
    pub fn fields(mut self, fields: impl IntoIterator<Item = Field>) -> Self {
        self.fields.extend(fields);
        self
    }

    /// Finishes the declaration.
    ///
    /// # Errors
    /// Returns [`crate::Error::Declaration`] if `pack` is not a power of two up to
    /// [`MAX_PACK`], if two fields share a name, if a nested structure uses a different
    /// byte order than this record type, or if the structure size overflows `usize`.
    pub fn build(self) -> Result<RecordType> {
        let order = self.kind.byte_order();

        if !self.pack.is_power_of_two() || self.pack > MAX_PACK {
            return Err(declaration_error!(
                self.name,
                "pack must be a power of two between 1 and {}, got {}",
                MAX_PACK,
                self.pack
            ));
        }

        // every field may be preceded by less than `pack` bytes of padding
        let bound = self.fields.iter().try_fold(self.pack, |total, field| {
            field
                .ctype()
                .checked_size()
                .and_then(|size| size.checked_add(self.pack))
                .and_then(|size| total.checked_add(size))
        });
        if bound.is_none() {
            return Err(declaration_error!(
                self.name,
                "size of the structure overflows the address space"
            ));
        }

        for (index, field) in self.fields.iter().enumerate() {
            if self.fields[..index]
                .iter()
                .any(|other| other.name() == field.name())
            {
                return Err(declaration_error!(
                    field.name(),
                    "duplicate field in {}",
                    self.name
                ));
            }

            if let Some(layout) = field.ctype().layout() {
                if layout.byte_order() != order {
                    return Err(declaration_error!(
                        field.name(),
                        "nested {} ({}) does not share the byte order of {} ({})",
                        layout.name(),
                        layout.kind(),
                        self.name,
                        self.kind
                    ));
                }
            }
        }

        Ok(RecordType(Arc::new(RecordTypeInner {
            id: NEXT_RECORD_ID.fetch_add(1, Ordering::Relaxed),
            name: self.name,
            kind: self.kind,
            order,
            pack: self.pack,
            fields: self.fields,
        })))
    }
}

/// An instance of a [`RecordType`], one [`Value`] per field.
#[derive(Debug, Clone)]
pub struct Record {
    record_type: RecordType,
    values: Vec<Value>,
}

impl Record {
    /// The record type of this instance
    #[must_use]
    pub fn record_type(&self) -> &RecordType {
        &self.record_type
    }

    /// Value of field `name`
    ///
    /// # Errors
    /// Returns [`crate::Error::FieldNotFound`] for unknown names.
    pub fn get(&self, name: &str) -> Result<&Value> {
        let index = self
            .record_type
            .field_index(name)
            .ok_or_else(|| self.record_type.not_found(name))?;
        Ok(&self.values[index])
    }

    /// Replaces the value of field `name`
    ///
    /// # Errors
    /// Returns [`crate::Error::FieldNotFound`] for unknown names.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<()> {
        let index = self
            .record_type
            .field_index(name)
            .ok_or_else(|| self.record_type.not_found(name))?;
        self.values[index] = value.into();
        Ok(())
    }

    /// Value of the field at `index` in declaration order
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// All values in declaration order
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// (field name, value) pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.record_type
            .fields()
            .iter()
            .map(Field::name)
            .zip(self.values.iter())
    }

    /// Size of the binary structure in bytes
    #[must_use]
    pub fn size(&self) -> usize {
        self.record_type.size()
    }

    /// Encodes the record into a fresh binary structure
    ///
    /// # Errors
    /// Returns [`crate::Error::Unrepresentable`] if a field value does not fit its binary type,
    /// or any error of a per-field encoder.
    pub fn to_ctype(&self) -> Result<OwnedStruct> {
        convert::to_ctype(self, None)
    }

    /// Encodes the record, consulting `hook` before any other encoding rule
    ///
    /// # Errors
    /// See [`Record::to_ctype`].
    pub fn to_ctype_with(&self, hook: EncodeHook<'_>) -> Result<OwnedStruct> {
        convert::to_ctype(self, Some(hook))
    }

    /// The exact byte image of the encoded record
    ///
    /// # Errors
    /// See [`Record::to_ctype`].
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.to_ctype()?.into_bytes())
    }

    /// Mutable byte image of the encoded record, the same bytes as [`Record::to_bytes`]
    ///
    /// # Errors
    /// See [`Record::to_ctype`].
    pub fn to_bytearray(&self) -> Result<Vec<u8>> {
        self.to_bytes()
    }

    /// Encodes the record directly into the first [`Record::size`] bytes of `buffer`
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `buffer` is too short, or any encoding error.
    pub fn encode_into(&self, buffer: &mut [u8]) -> Result<()> {
        let mut view = self.record_type.view(buffer)?;
        view.store(self, None)
    }

    /// Plain mapping of the record, nested records become nested mappings
    #[must_use]
    pub fn to_dict(&self) -> Dict {
        dict::to_dict(self)
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.record_type == other.record_type && self.values == other.values
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.record_type.name())?;
        for (index, (name, value)) in self.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{name}={value:?}")?;
        }
        write!(f, ")")
    }
}

impl From<&RecordType> for CType {
    fn from(record: &RecordType) -> Self {
        CType::Record(record.ctype())
    }
}
