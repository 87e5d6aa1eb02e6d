use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! declaration_error {
    ($field:expr, $fmt:expr $(, $arg:expr)* $(,)?) => {
        crate::Error::Declaration {
            field: $field.to_string(),
            message: format!($fmt $(, $arg)*),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Every operation in this crate is a synchronous, in-memory transformation, so errors are
/// raised at the exact call that violated a contract and are never retried.
///
/// # Error Categories
///
/// ## Declaration Errors
/// - [`Error::Declaration`] - A field or record type was declared with invalid metadata
///
/// ## Buffer Errors
/// - [`Error::OutOfBounds`] - A supplied buffer is smaller than the layout requires
///
/// ## Lookup Errors
/// - [`Error::FieldNotFound`] - A field name does not exist on the target record type
/// - [`Error::MissingField`] - A required field did not receive a value
///
/// ## Conversion Errors
/// - [`Error::Unrepresentable`] - A value does not fit the binary type of its field
/// - [`Error::Malformed`] - A binary slot holds data that cannot be decoded
///
/// # Examples
///
/// ```rust
/// use cdata::{CType, Error, Field};
///
/// match Field::builder("name", CType::chars(4)).default("too long").build() {
///     Err(Error::Declaration { field, message }) => {
///         assert_eq!(field, "name");
///         assert!(message.ends_with("must be equal or less than 4"));
///     }
///     _ => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// A field or record type was declared with invalid metadata.
    ///
    /// Raised at declaration time, e.g. when the default value of a fixed-length array
    /// field is longer than the array, or when a nested layout does not share the byte
    /// order of its parent.
    #[error("Invalid declaration of '{field}' - {message}")]
    Declaration {
        /// The field (or record type) the declaration error refers to
        field: String,
        /// Description of the violated constraint
        message: String,
    },

    /// The supplied buffer is smaller than the layout of the record type.
    #[error("Buffer of {actual} bytes is too small, {required} bytes are required")]
    OutOfBounds {
        /// Number of bytes the layout requires
        required: usize,
        /// Number of bytes that were supplied
        actual: usize,
    },

    /// The field name does not exist on the target record type.
    #[error("Field not found - {0}")]
    FieldNotFound(String),

    /// A required field did not receive a value and has no default.
    #[error("Missing value for required field - {0}")]
    MissingField(String),

    /// A value matches none of the encoding rules for the binary type of its field.
    #[error("Field '{field}' can not be represented - {message}")]
    Unrepresentable {
        /// The field whose value could not be encoded
        field: String,
        /// Description of the type mismatch
        message: String,
    },

    /// The binary data could not be decoded.
    ///
    /// The error includes the source location where the problem was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },
}
