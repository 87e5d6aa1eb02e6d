// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # cdata
//!
//! Bidirectional conversion between typed records and fixed-layout, C-compatible binary
//! structures. A record type declares an ordered list of fields, each tagged with its binary
//! type; `cdata` derives the byte layout from those tags, caches it process-wide, and encodes
//! and decodes record instances to and from byte-exact buffers.
//!
//! ## Features
//!
//! - **Explicit layouts** - Field order, offsets, packing and byte order decided once per
//!   record type and shared through a thread-safe registry
//! - **Nested structures** - Nested records, fixed-length arrays of scalars and arrays of
//!   nested records are converted recursively
//! - **Byte order variants** - Native, little-endian and big-endian structures, and unions
//! - **Aliasing views** - Decode from and encode into caller buffers without copying
//! - **Hooks** - Per-field encoders and decoders, and per-call overrides that take precedence
//!
//! ## Quick Start
//!
//! ```rust
//! use cdata::prelude::*;
//!
//! let item = RecordType::builder("Item", LayoutKind::Little)
//!     .field(Field::builder("number", Primitive::U32).build()?)
//!     .field(Field::builder("text", CType::chars(10)).build()?)
//!     .build()?;
//!
//! let data = RecordType::builder("Data", LayoutKind::Little)
//!     .field(Field::builder("item", &item).build()?)
//!     .field(Field::builder("items", CType::record_array(&item.ctype(), 2)).build()?)
//!     .build()?;
//! assert_eq!(data.size(), 42);
//!
//! let first = item.create([("number", Value::from(1u32)), ("text", Value::from("one"))])?;
//! let second = item.create([("number", Value::from(2u32)), ("text", Value::from("two"))])?;
//! let record = data.create([
//!     ("item", Value::from(first.clone())),
//!     ("items", Value::list([first, second])),
//! ])?;
//!
//! let bytes = record.to_bytes()?;
//! assert_eq!(data.from_buffer_copy(&bytes)?, record);
//! # Ok::<(), cdata::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Binary type descriptors ([`CType`], [`Primitive`]) and dynamic [`Value`]s
//! - [`layout`] - Generated [`Layout`]s, the [`LayoutRegistry`] and binary [`CStruct`] instances
//! - [`record`] - Declared [`RecordType`]s, [`Field`] metadata and [`Record`] instances
//! - [`convert`] - The encoder and decoder between records and binary structures
//! - [`io`] - Offset based reading and writing of scalars in either byte order
//! - [`CData`] - The conversion surface for typed Rust structs
//!
//! ## Thread Safety
//!
//! Record types, layouts and the registry are `Send + Sync`. The registry serializes its
//! get-or-insert sequences per key; once inserted, cache entries are never mutated. A
//! [`StructView`] borrows its buffer mutably, so two conversions can never alias the same
//! buffer at the same time.
//!
//! ## Logging
//!
//! `cdata` emits [`tracing`](https://docs.rs/tracing) events: `debug` when the registry
//! generates a layout or a synthetic record type, `warn` when a value can not be represented
//! by its field. No subscriber is installed by the library.

#[macro_use]
pub(crate) mod error;

/// Shared functionality which is used in unit tests
#[cfg(test)]
pub(crate) mod test;

mod mixin;

pub mod convert;
pub mod io;
pub mod layout;
pub mod record;
pub mod types;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use cdata::prelude::*;
///
/// let point = RecordType::builder("Point", LayoutKind::Big)
///     .field(Field::builder("x", Primitive::I16).build()?)
///     .field(Field::builder("y", Primitive::I16).build()?)
///     .build()?;
/// let record = point.new_record([Value::from(1i16), Value::from(-1i16)])?;
/// assert_eq!(record.to_bytes()?, [0x00, 0x01, 0xFF, 0xFF]);
/// # Ok::<(), cdata::Error>(())
/// ```
pub mod prelude;

/// `cdata` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always
/// [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `cdata` Error type
///
/// The error type for every fallible operation of this crate, covering declaration,
/// buffer, lookup and conversion errors.
pub use error::Error;

pub use convert::{DecodeHook, EncodeHook};
pub use io::ByteOrder;
pub use layout::{
    CStruct, Layout, LayoutField, LayoutKey, LayoutKind, LayoutRef, LayoutRegistry, OwnedStruct,
    StructView,
};
pub use mixin::CData;
pub use record::{Field, FieldBuilder, Record, RecordType, RecordTypeBuilder, MAX_PACK};
pub use types::{CType, Dict, Primitive, Value};
