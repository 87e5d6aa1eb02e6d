//! Low-level byte order and bounds-checked reading/writing of scalar slots.
//!
//! Every multi-byte scalar in a binary structure is stored in the byte order of its layout.
//! This module provides the [`ScalarIO`] trait implemented for all fixed-width primitives,
//! and offset-tracking read/write functions that either take an explicit [`ByteOrder`] or
//! are specialised for little and big endian.
//!
//! # Usage Examples
//!
//! ```rust
//! use cdata::io::{read_at, write_at, ByteOrder};
//!
//! let mut data = [0u8; 6];
//! let mut offset = 0;
//! write_at(&mut data, &mut offset, 9999u32, ByteOrder::Little)?;
//! write_at(&mut data, &mut offset, 1u16, ByteOrder::Big)?;
//! assert_eq!(data, [0x0F, 0x27, 0x00, 0x00, 0x00, 0x01]);
//!
//! let mut offset = 0;
//! let number: u32 = read_at(&data, &mut offset, ByteOrder::Little)?;
//! assert_eq!(number, 9999);
//! # Ok::<(), cdata::Error>(())
//! ```
//!
//! # Error Handling
//!
//! All functions return [`crate::Error::OutOfBounds`] if the buffer has insufficient bytes
//! at the requested offset. Nothing is read or written in that case.

use crate::{Error, Result};

/// Byte order used to store multi-byte scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Least significant byte first
    Little,
    /// Most significant byte first
    Big,
}

impl ByteOrder {
    /// The byte order of the target this crate was compiled for.
    #[cfg(target_endian = "little")]
    pub const NATIVE: ByteOrder = ByteOrder::Little;
    /// The byte order of the target this crate was compiled for.
    #[cfg(target_endian = "big")]
    pub const NATIVE: ByteOrder = ByteOrder::Big;
}

/// Trait for implementing type-specific binary reading and writing of scalar values.
///
/// Each implementation defines a `Bytes` associated type that represents the fixed-size
/// byte array required for that type (e.g. `[u8; 4]` for `u32`).
pub trait ScalarIO: Sized + Copy {
    /// Byte array type holding the encoded value
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;
    /// Read T from a byte buffer in big-endian
    fn from_be_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
    /// Write T to a byte buffer in big-endian
    fn to_be_bytes(self) -> Self::Bytes;
}

macro_rules! impl_scalar_io {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ScalarIO for $ty {
                type Bytes = [u8; std::mem::size_of::<$ty>()];

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn from_be_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_be_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }

                fn to_be_bytes(self) -> Self::Bytes {
                    <$ty>::to_be_bytes(self)
                }
            }
        )*
    };
}

impl_scalar_io!(u8, i8, u16, i16, u32, i32, u64, i64, f32, f64);

fn check_bounds(data_len: usize, offset: usize, type_len: usize) -> Result<()> {
    match offset.checked_add(type_len) {
        Some(end) if end <= data_len => Ok(()),
        _ => Err(Error::OutOfBounds {
            required: offset.saturating_add(type_len),
            actual: data_len,
        }),
    }
}

/// Reads a value of type `T` at `offset` in the given byte order and advances the offset.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_at<T: ScalarIO>(data: &[u8], offset: &mut usize, order: ByteOrder) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    check_bounds(data.len(), *offset, type_len)?;

    let Ok(read) = data[*offset..*offset + type_len].try_into() else {
        return Err(Error::OutOfBounds {
            required: *offset + type_len,
            actual: data.len(),
        });
    };

    *offset += type_len;

    Ok(match order {
        ByteOrder::Little => T::from_le_bytes(read),
        ByteOrder::Big => T::from_be_bytes(read),
    })
}

/// Writes `value` at `offset` in the given byte order and advances the offset.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn write_at<T: ScalarIO>(
    data: &mut [u8],
    offset: &mut usize,
    value: T,
    order: ByteOrder,
) -> Result<()> {
    let type_len = std::mem::size_of::<T>();
    check_bounds(data.len(), *offset, type_len)?;

    let bytes = match order {
        ByteOrder::Little => value.to_le_bytes(),
        ByteOrder::Big => value.to_be_bytes(),
    };

    data[*offset..*offset + type_len].copy_from_slice(bytes.as_ref());
    *offset += type_len;

    Ok(())
}

/// Reads a little-endian value of type `T` at `offset` and advances the offset.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_le_at<T: ScalarIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    read_at(data, offset, ByteOrder::Little)
}

/// Reads a big-endian value of type `T` at `offset` and advances the offset.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_be_at<T: ScalarIO>(data: &[u8], offset: &mut usize) -> Result<T> {
    read_at(data, offset, ByteOrder::Big)
}

/// Writes a little-endian value of type `T` at `offset` and advances the offset.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn write_le_at<T: ScalarIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    write_at(data, offset, value, ByteOrder::Little)
}

/// Writes a big-endian value of type `T` at `offset` and advances the offset.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn write_be_at<T: ScalarIO>(data: &mut [u8], offset: &mut usize, value: T) -> Result<()> {
    write_at(data, offset, value, ByteOrder::Big)
}
