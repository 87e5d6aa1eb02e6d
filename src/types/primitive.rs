use strum::{EnumCount, EnumIter};

use crate::{
    io::{read_at, write_at, ByteOrder},
    types::Value,
    Error, Result,
};

/// All fixed-width primitive binary types a field slot can hold.
///
/// The size of every primitive equals its natural alignment. Platform dependent C types
/// (`long`, `size_t`, ...) are resolved to one of these kinds through the `C_*` constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum Primitive {
    /// `c_bool` - one byte, zero is false
    Bool,
    /// `c_char` - one raw byte, usually part of a text array
    Char,
    /// `c_int8`
    I8,
    /// `c_uint8`
    U8,
    /// `c_int16`
    I16,
    /// `c_uint16`
    U16,
    /// `c_int32`
    I32,
    /// `c_uint32`
    U32,
    /// `c_int64`
    I64,
    /// `c_uint64`
    U64,
    /// `c_float`
    F32,
    /// `c_double`
    F64,
}

/// `c_byte`
pub const C_BYTE: Primitive = Primitive::I8;
/// `c_ubyte`
pub const C_UBYTE: Primitive = Primitive::U8;
/// `c_short`
pub const C_SHORT: Primitive = Primitive::I16;
/// `c_ushort`
pub const C_USHORT: Primitive = Primitive::U16;
/// `c_int`
pub const C_INT: Primitive = Primitive::I32;
/// `c_uint`
pub const C_UINT: Primitive = Primitive::U32;
/// `c_long`, 32 bit on Windows and on 32 bit targets
#[cfg(any(windows, target_pointer_width = "32"))]
pub const C_LONG: Primitive = Primitive::I32;
/// `c_long`, 32 bit on Windows and on 32 bit targets
#[cfg(not(any(windows, target_pointer_width = "32")))]
pub const C_LONG: Primitive = Primitive::I64;
/// `c_ulong`, 32 bit on Windows and on 32 bit targets
#[cfg(any(windows, target_pointer_width = "32"))]
pub const C_ULONG: Primitive = Primitive::U32;
/// `c_ulong`, 32 bit on Windows and on 32 bit targets
#[cfg(not(any(windows, target_pointer_width = "32")))]
pub const C_ULONG: Primitive = Primitive::U64;
/// `c_longlong`
pub const C_LONGLONG: Primitive = Primitive::I64;
/// `c_ulonglong`
pub const C_ULONGLONG: Primitive = Primitive::U64;
/// `c_size_t`
#[cfg(target_pointer_width = "32")]
pub const C_SIZE_T: Primitive = Primitive::U32;
/// `c_size_t`
#[cfg(not(target_pointer_width = "32"))]
pub const C_SIZE_T: Primitive = Primitive::U64;
/// `c_ssize_t`
#[cfg(target_pointer_width = "32")]
pub const C_SSIZE_T: Primitive = Primitive::I32;
/// `c_ssize_t`
#[cfg(not(target_pointer_width = "32"))]
pub const C_SSIZE_T: Primitive = Primitive::I64;

impl Primitive {
    /// Size of the primitive in bytes
    #[must_use]
    pub const fn size(self) -> usize {
        match self {
            Primitive::Bool | Primitive::Char | Primitive::I8 | Primitive::U8 => 1,
            Primitive::I16 | Primitive::U16 => 2,
            Primitive::I32 | Primitive::U32 | Primitive::F32 => 4,
            Primitive::I64 | Primitive::U64 | Primitive::F64 => 8,
        }
    }

    /// Natural alignment of the primitive in bytes
    #[must_use]
    pub const fn align(self) -> usize {
        self.size()
    }

    /// The ctypes name of this primitive, used in diagnostics
    #[must_use]
    pub const fn c_name(self) -> &'static str {
        match self {
            Primitive::Bool => "c_bool",
            Primitive::Char => "c_char",
            Primitive::I8 => "c_int8",
            Primitive::U8 => "c_uint8",
            Primitive::I16 => "c_int16",
            Primitive::U16 => "c_uint16",
            Primitive::I32 => "c_int32",
            Primitive::U32 => "c_uint32",
            Primitive::I64 => "c_int64",
            Primitive::U64 => "c_uint64",
            Primitive::F32 => "c_float",
            Primitive::F64 => "c_double",
        }
    }

    /// Returns true for the signed integer kinds
    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Primitive::I8 | Primitive::I16 | Primitive::I32 | Primitive::I64
        )
    }

    /// Returns true for `F32` and `F64`
    #[must_use]
    pub const fn is_float(self) -> bool {
        matches!(self, Primitive::F32 | Primitive::F64)
    }

    /// Reads the slot at `offset` into its binary-side [`Value`].
    ///
    /// Signed integers become [`Value::Int`], unsigned ones [`Value::UInt`], floats
    /// [`Value::Float`]. A `Char` slot reads as a single raw byte ([`Value::Bytes`]).
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the slot exceeds `data`.
    pub fn read(self, data: &[u8], offset: usize, order: ByteOrder) -> Result<Value> {
        let mut offset = offset;
        let value = match self {
            Primitive::Bool => Value::Bool(read_at::<u8>(data, &mut offset, order)? != 0),
            Primitive::Char => Value::Bytes(vec![read_at::<u8>(data, &mut offset, order)?]),
            Primitive::I8 => Value::Int(i64::from(read_at::<i8>(data, &mut offset, order)?)),
            Primitive::U8 => Value::UInt(u64::from(read_at::<u8>(data, &mut offset, order)?)),
            Primitive::I16 => Value::Int(i64::from(read_at::<i16>(data, &mut offset, order)?)),
            Primitive::U16 => Value::UInt(u64::from(read_at::<u16>(data, &mut offset, order)?)),
            Primitive::I32 => Value::Int(i64::from(read_at::<i32>(data, &mut offset, order)?)),
            Primitive::U32 => Value::UInt(u64::from(read_at::<u32>(data, &mut offset, order)?)),
            Primitive::I64 => Value::Int(read_at::<i64>(data, &mut offset, order)?),
            Primitive::U64 => Value::UInt(read_at::<u64>(data, &mut offset, order)?),
            Primitive::F32 => Value::Float(f64::from(read_at::<f32>(data, &mut offset, order)?)),
            Primitive::F64 => Value::Float(read_at::<f64>(data, &mut offset, order)?),
        };

        Ok(value)
    }

    /// Writes `value` into the slot at `offset`.
    ///
    /// Integers are truncated to the slot width the way C assignments are. Floats are only
    /// accepted by the float kinds; a `Char` slot accepts a single byte, a one byte text or
    /// an integer.
    ///
    /// # Errors
    /// Returns [`crate::Error::Unrepresentable`] if the value does not fit this primitive,
    /// or [`crate::Error::OutOfBounds`] if the slot exceeds `data`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn write(
        self,
        data: &mut [u8],
        offset: usize,
        value: &Value,
        order: ByteOrder,
        field: &str,
    ) -> Result<()> {
        let mut offset = offset;
        let mismatch = || {
            let message = format!("{} can not hold {}", self.c_name(), value.kind_name());
            tracing::warn!(field, "{}", message);
            Error::Unrepresentable {
                field: field.to_string(),
                message,
            }
        };

        match self {
            Primitive::Bool => {
                let truthy = value.as_integer().ok_or_else(mismatch)? != 0;
                write_at(data, &mut offset, u8::from(truthy), order)
            }
            Primitive::Char => {
                let byte = match value {
                    Value::Bytes(bytes) if bytes.len() == 1 => bytes[0],
                    Value::Text(text) if text.len() == 1 => text.as_bytes()[0],
                    other => other.as_integer().ok_or_else(mismatch)? as u8,
                };
                write_at(data, &mut offset, byte, order)
            }
            Primitive::I8 => {
                let v = value.as_integer().ok_or_else(mismatch)?;
                write_at(data, &mut offset, v as i8, order)
            }
            Primitive::U8 => {
                let v = value.as_integer().ok_or_else(mismatch)?;
                write_at(data, &mut offset, v as u8, order)
            }
            Primitive::I16 => {
                let v = value.as_integer().ok_or_else(mismatch)?;
                write_at(data, &mut offset, v as i16, order)
            }
            Primitive::U16 => {
                let v = value.as_integer().ok_or_else(mismatch)?;
                write_at(data, &mut offset, v as u16, order)
            }
            Primitive::I32 => {
                let v = value.as_integer().ok_or_else(mismatch)?;
                write_at(data, &mut offset, v as i32, order)
            }
            Primitive::U32 => {
                let v = value.as_integer().ok_or_else(mismatch)?;
                write_at(data, &mut offset, v as u32, order)
            }
            Primitive::I64 => {
                let v = value.as_integer().ok_or_else(mismatch)?;
                write_at(data, &mut offset, v as i64, order)
            }
            Primitive::U64 => {
                let v = value.as_integer().ok_or_else(mismatch)?;
                write_at(data, &mut offset, v as u64, order)
            }
            Primitive::F32 => {
                let v = value.as_f64().ok_or_else(mismatch)?;
                write_at(data, &mut offset, v as f32, order)
            }
            Primitive::F64 => {
                let v = value.as_f64().ok_or_else(mismatch)?;
                write_at(data, &mut offset, v, order)
            }
        }
    }
}
