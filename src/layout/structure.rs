//! Binary structure instances.
//!
//! [`CStruct`] pairs a [`LayoutRef`] with the bytes of one instance. The byte storage is a
//! type parameter, so ownership is explicit in the type:
//!
//! - [`OwnedStruct`] (`CStruct<Vec<u8>>`) owns a private copy of its bytes
//! - [`StructView`] (`CStruct<&mut [u8]>`) aliases a caller supplied buffer; it can not
//!   outlive that buffer, and writes through it land in the buffer
//!
//! Slots are read and written through [`Value`]s following the field's [`CType`].

use crate::{
    convert::{self, EncodeHook},
    layout::{LayoutField, LayoutRef},
    record::Record,
    types::{CType, Primitive, Value},
    Error, Result,
};

/// A binary structure instance over the byte storage `B`
#[derive(Debug, Clone)]
pub struct CStruct<B> {
    layout: LayoutRef,
    data: B,
}

/// A binary structure owning its bytes
pub type OwnedStruct = CStruct<Vec<u8>>;

/// A binary structure aliasing a caller supplied buffer
pub type StructView<'a> = CStruct<&'a mut [u8]>;

fn check_size(layout: &LayoutRef, actual: usize) -> Result<()> {
    if actual < layout.size() {
        return Err(Error::OutOfBounds {
            required: layout.size(),
            actual,
        });
    }
    Ok(())
}

impl CStruct<Vec<u8>> {
    /// Creates a zero-initialised structure of `layout`
    #[must_use]
    pub fn new(layout: &LayoutRef) -> OwnedStruct {
        CStruct {
            layout: layout.clone(),
            data: vec![0; layout.size()],
        }
    }

    /// Creates a structure from a copy of the first `layout.size()` bytes of `buffer`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `buffer` is shorter than the layout.
    pub fn from_buffer_copy(layout: &LayoutRef, buffer: &[u8]) -> Result<OwnedStruct> {
        check_size(layout, buffer.len())?;
        Ok(CStruct {
            layout: layout.clone(),
            data: buffer[..layout.size()].to_vec(),
        })
    }

    /// Consumes the structure, returning its byte image
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}

impl<'a> CStruct<&'a mut [u8]> {
    /// Creates a structure aliasing the first `layout.size()` bytes of `buffer`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `buffer` is shorter than the layout.
    pub fn from_buffer(layout: &LayoutRef, buffer: &'a mut [u8]) -> Result<StructView<'a>> {
        check_size(layout, buffer.len())?;
        Ok(CStruct {
            layout: layout.clone(),
            data: &mut buffer[..layout.size()],
        })
    }
}

impl<B: AsRef<[u8]>> CStruct<B> {
    /// The layout of this structure
    #[must_use]
    pub fn layout(&self) -> &LayoutRef {
        &self.layout
    }

    /// Size of the structure in bytes
    #[must_use]
    pub fn size(&self) -> usize {
        self.layout.size()
    }

    /// The exact byte image of the structure
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_ref()
    }

    /// Copies the structure into an owned one
    #[must_use]
    pub fn to_owned_struct(&self) -> OwnedStruct {
        CStruct {
            layout: self.layout.clone(),
            data: self.as_bytes().to_vec(),
        }
    }

    /// Reads the slot of field `name`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FieldNotFound`] for unknown names.
    pub fn get(&self, name: &str) -> Result<Value> {
        let index = self.field_index(name)?;
        self.get_at(index)
    }

    /// Reads the slot of the field at `index` in declaration order.
    ///
    /// Character arrays read like C strings: the bytes up to the first NUL. Arrays read as
    /// [`Value::List`], nested structures as owned [`Value::Struct`] copies.
    ///
    /// # Errors
    /// Returns [`crate::Error::FieldNotFound`] if `index` is out of range.
    pub fn get_at(&self, index: usize) -> Result<Value> {
        let field = self.field_at(index)?;
        let data = self.as_bytes();
        let order = self.layout.byte_order();
        let offset = field.offset();

        match field.ctype() {
            CType::Scalar(kind) => kind.read(data, offset, order),
            CType::Array {
                kind: Primitive::Char,
                len,
            } => {
                let slot = &data[offset..offset + len];
                let end = slot.iter().position(|b| *b == 0).unwrap_or(slot.len());
                Ok(Value::Bytes(slot[..end].to_vec()))
            }
            CType::Array { kind, len } => (0..*len)
                .map(|i| kind.read(data, offset + i * kind.size(), order))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            CType::Record(layout) => {
                let slot = &data[offset..offset + layout.size()];
                Ok(Value::Struct(OwnedStruct::from_buffer_copy(layout, slot)?))
            }
            CType::RecordArray { layout, len } => (0..*len)
                .map(|i| {
                    let start = offset + i * layout.size();
                    OwnedStruct::from_buffer_copy(layout, &data[start..start + layout.size()])
                        .map(Value::Struct)
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
        }
    }

    fn field_at(&self, index: usize) -> Result<&LayoutField> {
        self.layout
            .fields()
            .get(index)
            .ok_or_else(|| Error::FieldNotFound(format!("{}[{}]", self.layout.name(), index)))
    }

    fn field_index(&self, name: &str) -> Result<usize> {
        self.layout
            .fields()
            .iter()
            .position(|field| field.name() == name)
            .ok_or_else(|| Error::FieldNotFound(format!("{}.{}", self.layout.name(), name)))
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> CStruct<B> {
    /// Assigns `value` to the slot of field `name`.
    ///
    /// # Errors
    /// Returns [`crate::Error::FieldNotFound`] for unknown names and
    /// [`crate::Error::Unrepresentable`] if the value does not fit the slot.
    pub fn set(&mut self, name: &str, value: &Value) -> Result<()> {
        let index = self.field_index(name)?;
        self.set_at(index, value)
    }

    /// Assigns `value` to the slot of the field at `index`.
    ///
    /// Accepted values per binary type:
    /// - scalar slots take booleans, integers and floats (`c_char` also takes one byte)
    /// - character arrays take [`Value::Bytes`] or [`Value::Text`], truncated to the slot and
    ///   zero padded
    /// - arrays take a [`Value::List`] of at most `len` elements, the rest is zeroed
    /// - nested structures take a [`Value::Struct`] of the same layout
    ///
    /// [`Value::None`] leaves the slot untouched.
    ///
    /// # Errors
    /// Returns [`crate::Error::Unrepresentable`] if the value does not fit the slot.
    pub fn set_at(&mut self, index: usize, value: &Value) -> Result<()> {
        let layout = self.layout.clone();
        let field = layout
            .fields()
            .get(index)
            .ok_or_else(|| Error::FieldNotFound(format!("{}[{}]", layout.name(), index)))?;

        if value.is_none() {
            return Ok(());
        }

        let order = layout.byte_order();
        let offset = field.offset();
        let name = field.name();
        let data = self.data.as_mut();

        match (field.ctype(), value) {
            (CType::Scalar(kind), value) => kind.write(data, offset, value, order, name),
            (
                CType::Array {
                    kind: Primitive::Char,
                    len,
                },
                Value::Bytes(_) | Value::Text(_),
            ) => {
                let bytes = match value {
                    Value::Text(text) => text.as_bytes(),
                    Value::Bytes(bytes) => bytes.as_slice(),
                    _ => &[],
                };
                let copied = bytes.len().min(*len);
                let slot = &mut data[offset..offset + len];
                slot[..copied].copy_from_slice(&bytes[..copied]);
                slot[copied..].fill(0);
                Ok(())
            }
            (CType::Array { kind, len }, Value::List(items)) => {
                if items.len() > *len {
                    return Err(too_many(name, items.len(), *len));
                }
                data[offset..offset + kind.size() * len].fill(0);
                for (i, item) in items.iter().enumerate() {
                    if !item.is_none() {
                        kind.write(data, offset + i * kind.size(), item, order, name)?;
                    }
                }
                Ok(())
            }
            (CType::Record(layout), Value::Struct(nested)) => {
                check_layout(name, layout, nested)?;
                data[offset..offset + layout.size()].copy_from_slice(nested.as_bytes());
                Ok(())
            }
            (CType::RecordArray { layout, len }, Value::List(items)) => {
                if items.len() > *len {
                    return Err(too_many(name, items.len(), *len));
                }
                data[offset..offset + layout.size() * len].fill(0);
                for (i, item) in items.iter().enumerate() {
                    let start = offset + i * layout.size();
                    match item {
                        Value::Struct(nested) => {
                            check_layout(name, layout, nested)?;
                            data[start..start + layout.size()].copy_from_slice(nested.as_bytes());
                        }
                        Value::None => {}
                        other => return Err(unrepresentable(name, field.ctype(), other)),
                    }
                }
                Ok(())
            }
            (ctype, other) => Err(unrepresentable(name, ctype, other)),
        }
    }

    /// Encodes `record` in place, overwriting every slot of this structure.
    ///
    /// On a [`StructView`] the bytes land directly in the aliased buffer.
    ///
    /// # Errors
    /// Returns [`crate::Error::Unrepresentable`] if the layout was not generated for a record
    /// type of the record's name, or an error if any field can not be encoded.
    pub fn store(&mut self, record: &Record, hook: Option<EncodeHook<'_>>) -> Result<()> {
        let record_type = record.record_type();
        if record_type.name() != self.layout.name() {
            return Err(unrepresentable_msg(
                self.layout.name(),
                format!(
                    "expected a record of {}, got {}",
                    self.layout.name(),
                    record_type.name()
                ),
            ));
        }

        let encoded = convert::encode_as(record, &self.layout, hook)?;
        self.data.as_mut().copy_from_slice(encoded.as_bytes());
        Ok(())
    }
}

impl<A: AsRef<[u8]>, B: AsRef<[u8]>> PartialEq<CStruct<B>> for CStruct<A> {
    fn eq(&self, other: &CStruct<B>) -> bool {
        self.layout == other.layout && self.as_bytes() == other.as_bytes()
    }
}

fn check_layout<B: AsRef<[u8]>>(
    name: &str,
    expected: &LayoutRef,
    actual: &CStruct<B>,
) -> Result<()> {
    if actual.layout() != expected {
        return Err(unrepresentable_msg(
            name,
            format!(
                "expected a structure of layout {}, got {}",
                expected.name(),
                actual.layout().name()
            ),
        ));
    }
    Ok(())
}

fn too_many(name: &str, count: usize, len: usize) -> Error {
    unrepresentable_msg(
        name,
        format!("{count} elements exceed the array length of {len}"),
    )
}

fn unrepresentable(name: &str, ctype: &CType, value: &Value) -> Error {
    unrepresentable_msg(
        name,
        format!("{} can not hold {}", ctype, value.kind_name()),
    )
}

fn unrepresentable_msg(name: &str, message: String) -> Error {
    tracing::warn!(field = name, "{}", message);
    Error::Unrepresentable {
        field: name.to_string(),
        message,
    }
}
