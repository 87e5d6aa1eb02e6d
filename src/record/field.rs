//! Field declarations.
//!
//! A [`Field`] is the declaration-time contract of one record field: its name, its binary
//! type, an optional default and optional per-field encoder and decoder functions. Fields are
//! immutable once built; [`FieldBuilder::build`] is where the declaration checks run.
//!
//! # Examples
//!
//! ```rust
//! use cdata::{CType, Field, Primitive, Value};
//!
//! let number = Field::builder("number", CType::from(Primitive::U32)).build()?;
//! let text = Field::builder("text", CType::chars(10))
//!     .default("none")
//!     .extra("doc", "free text")
//!     .build()?;
//!
//! assert!(number.default().is_none());
//! assert_eq!(text.default(), Some(&Value::from("none")));
//! # Ok::<(), cdata::Error>(())
//! ```

use std::{collections::BTreeMap, fmt, sync::Arc};

use crate::{
    types::{CType, Value},
    Result,
};

/// Per-field encoder, maps a record value to the value assigned into the binary slot
pub type FieldEncoder = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// Per-field decoder, maps a binary slot value to the record value
pub type FieldDecoder = Arc<dyn Fn(&Value) -> Result<Value> + Send + Sync>;

/// The declaration of a single record field.
#[derive(Clone)]
pub struct Field {
    name: String,
    ctype: CType,
    default: Option<Value>,
    encoder: Option<FieldEncoder>,
    decoder: Option<FieldDecoder>,
    extra: BTreeMap<String, Value>,
}

impl Field {
    /// Starts the declaration of a field named `name` with binary type `ctype`
    pub fn builder(name: impl Into<String>, ctype: impl Into<CType>) -> FieldBuilder {
        FieldBuilder {
            field: Field::new(name.into(), ctype.into()),
        }
    }

    /// A required field without metadata
    pub(crate) fn new(name: String, ctype: CType) -> Field {
        Field {
            name,
            ctype,
            default: None,
            encoder: None,
            decoder: None,
            extra: BTreeMap::new(),
        }
    }

    /// This declaration with its binary type replaced, metadata kept
    pub(crate) fn with_ctype(&self, ctype: CType) -> Field {
        Field {
            ctype,
            ..self.clone()
        }
    }

    /// Name of the field
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binary type of the field
    #[must_use]
    pub fn ctype(&self) -> &CType {
        &self.ctype
    }

    /// Default value; a field without one must receive a value on construction
    #[must_use]
    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns true if the field has no default
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// Per-field encoder, if declared
    #[must_use]
    pub fn encoder(&self) -> Option<&FieldEncoder> {
        self.encoder.as_ref()
    }

    /// Per-field decoder, if declared
    #[must_use]
    pub fn decoder(&self) -> Option<&FieldDecoder> {
        self.decoder.as_ref()
    }

    /// Extra metadata passed through from the declaration
    #[must_use]
    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("ctype", &self.ctype)
            .field("default", &self.default)
            .field("encoder", &self.encoder.is_some())
            .field("decoder", &self.decoder.is_some())
            .field("extra", &self.extra)
            .finish()
    }
}

/// Builder for [`Field`] declarations
pub struct FieldBuilder {
    field: Field,
}

impl FieldBuilder {
    /// Sets the default value
    #[must_use]
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.field.default = Some(value.into());
        self
    }

    /// Sets the per-field encoder
    #[must_use]
    pub fn encoder<F>(mut self, encoder: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.field.encoder = Some(Arc::new(encoder));
        self
    }

    /// Sets the per-field decoder
    #[must_use]
    pub fn decoder<F>(mut self, decoder: F) -> Self
    where
        F: Fn(&Value) -> Result<Value> + Send + Sync + 'static,
    {
        self.field.decoder = Some(Arc::new(decoder));
        self
    }

    /// Attaches an extra metadata entry
    #[must_use]
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.field.extra.insert(key.into(), value.into());
        self
    }

    /// Finishes the declaration.
    ///
    /// # Errors
    /// Returns [`crate::Error::Declaration`] if the size of the binary type overflows
    /// `usize`, or if the field is an array and its default value holds more elements (or
    /// bytes of text) than the array length.
    pub fn build(self) -> Result<Field> {
        let field = self.field;

        if field.ctype.checked_size().is_none() {
            return Err(declaration_error!(
                field.name,
                "size of {} overflows the address space",
                field.ctype
            ));
        }

        if let (Some(limit), Some(len)) = (
            field.ctype.array_len(),
            field.default.as_ref().and_then(Value::len),
        ) {
            if len > limit {
                return Err(declaration_error!(
                    field.name,
                    "The length of default value for {} field must be equal or less than {}",
                    field.ctype,
                    limit
                ));
            }
        }

        Ok(field)
    }
}
