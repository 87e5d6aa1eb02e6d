//! # cdata Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the cdata library. Import it to declare record types and convert them without
//! spelling out every module path.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all cdata operations
pub use crate::Error;

/// The result type used throughout cdata
pub use crate::Result;

// ================================================================================================
// Declarations
// ================================================================================================

/// Binary type descriptors
pub use crate::types::{
    CType, Primitive, C_BYTE, C_INT, C_LONG, C_LONGLONG, C_SHORT, C_SIZE_T, C_SSIZE_T, C_UBYTE,
    C_UINT, C_ULONG, C_ULONGLONG, C_USHORT,
};

/// Record types and their field declarations
pub use crate::record::{Field, Record, RecordType};

/// Base layout kinds
pub use crate::layout::LayoutKind;

// ================================================================================================
// Conversion
// ================================================================================================

/// Dynamic values held by records and binary slots
pub use crate::types::{Dict, Value};

/// Binary structure instances
pub use crate::layout::{CStruct, LayoutRef, OwnedStruct, StructView};

/// Per-call overrides
pub use crate::convert::{DecodeHook, EncodeHook};

/// Conversion surface for typed structs
pub use crate::CData;
