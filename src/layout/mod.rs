//! Generated binary layouts and the structures built on top of them.
//!
//! A [`Layout`] is the blueprint of a binary structure: the ordered list of field names and
//! binary types, their byte offsets, the packing alignment and the [`LayoutKind`]. Layouts are
//! never built directly; the [`LayoutRegistry`] derives them from record types and hands out
//! one shared [`LayoutRef`] per (record type, kind, byte order, pack) key.
//!
//! # Key Components
//!
//! - [`Layout`] / [`LayoutField`] - Field order, offsets and size of a structure or union
//! - [`LayoutKind`] - Native, little endian, big endian structure, or union
//! - [`LayoutRegistry`] - Process-wide cache of layouts and the reverse mapping to record types
//! - [`CStruct`] - A binary structure instance, owning its bytes or aliasing a caller buffer
//!
//! # Offsets
//!
//! Each field is placed at the next offset aligned to `min(field_align, pack)`. Union fields
//! all start at offset zero. The total size is padded to `min(max_field_align, pack)`, so with
//! the default `pack` of 1 the size is exactly the sum of the field sizes.

use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use strum::{Display, EnumCount, EnumIter};

use crate::{io::ByteOrder, types::CType};

mod registry;
mod structure;

pub use registry::{LayoutKey, LayoutRegistry};
pub use structure::{CStruct, OwnedStruct, StructView};

/// A reference-counted pointer to a [`Layout`]
pub type LayoutRef = Arc<Layout>;

static NEXT_LAYOUT_ID: AtomicU64 = AtomicU64::new(1);

/// The base kind of a generated layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount, Display)]
pub enum LayoutKind {
    /// Structure in the byte order of the target
    Native,
    /// Structure with little-endian scalars
    Little,
    /// Structure with big-endian scalars
    Big,
    /// Union, every field starts at offset zero. Declared unions use the native byte order;
    /// a union nested in a structure of another byte order follows its parent.
    Union,
}

impl LayoutKind {
    /// Byte order applied to every multi-byte scalar of the layout
    #[must_use]
    pub fn byte_order(self) -> ByteOrder {
        match self {
            LayoutKind::Little => ByteOrder::Little,
            LayoutKind::Big => ByteOrder::Big,
            LayoutKind::Native | LayoutKind::Union => ByteOrder::NATIVE,
        }
    }

    /// The structure kind storing scalars in `order`
    #[must_use]
    pub fn structure(order: ByteOrder) -> LayoutKind {
        match order {
            ByteOrder::Little => LayoutKind::Little,
            ByteOrder::Big => LayoutKind::Big,
        }
    }
}

/// A single field of a [`Layout`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LayoutField {
    name: String,
    ctype: CType,
    offset: usize,
}

impl LayoutField {
    /// Name of the field, unique within the layout
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binary type of the field
    #[must_use]
    pub fn ctype(&self) -> &CType {
        &self.ctype
    }

    /// Byte offset of the field from the start of the structure
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Size of the field in bytes
    #[must_use]
    pub fn size(&self) -> usize {
        self.ctype.size()
    }
}

/// The generated blueprint of a binary structure or union.
///
/// Two layouts are equal only if they are the same generated layout; structurally identical
/// layouts derived from different record types stay distinct, matching how generated classes
/// behave.
#[derive(Debug)]
pub struct Layout {
    id: u64,
    name: String,
    kind: LayoutKind,
    order: ByteOrder,
    pack: usize,
    fields: Vec<LayoutField>,
    size: usize,
    align: usize,
}

fn align_up(offset: usize, align: usize) -> usize {
    offset.div_ceil(align) * align
}

impl Layout {
    /// Computes offsets and size for `fields` in declaration order, in the byte order of
    /// `kind`.
    ///
    /// `pack` must be a power of two and the total size must fit `usize`, which the record
    /// type builder guarantees.
    pub(crate) fn new<I>(name: &str, kind: LayoutKind, pack: usize, fields: I) -> Layout
    where
        I: IntoIterator<Item = (String, CType)>,
    {
        Layout::with_order(name, kind, kind.byte_order(), pack, fields)
    }

    /// As [`Layout::new`], storing every multi-byte scalar in `order`
    pub(crate) fn with_order<I>(
        name: &str,
        kind: LayoutKind,
        order: ByteOrder,
        pack: usize,
        fields: I,
    ) -> Layout
    where
        I: IntoIterator<Item = (String, CType)>,
    {
        let mut offset = 0;
        let mut union_size = 0;
        let mut max_align = 1;

        let fields = fields
            .into_iter()
            .map(|(name, ctype)| {
                let align = ctype.align().min(pack).max(1);
                max_align = max_align.max(align);

                let field_offset = if kind == LayoutKind::Union {
                    union_size = union_size.max(ctype.size());
                    0
                } else {
                    let field_offset = align_up(offset, align);
                    offset = field_offset + ctype.size();
                    field_offset
                };

                LayoutField {
                    name,
                    ctype,
                    offset: field_offset,
                }
            })
            .collect();

        let raw_size = if kind == LayoutKind::Union {
            union_size
        } else {
            offset
        };

        Layout {
            id: NEXT_LAYOUT_ID.fetch_add(1, Ordering::Relaxed),
            name: name.to_string(),
            kind,
            order,
            pack,
            fields,
            size: align_up(raw_size, max_align),
            align: max_align,
        }
    }

    /// Process-unique identity of this generated layout
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Name of the record type the layout was generated for
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The base kind of the layout
    #[must_use]
    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    /// Byte order of every multi-byte scalar in the layout
    #[must_use]
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Returns true if the layout is a union
    #[must_use]
    pub fn is_union(&self) -> bool {
        self.kind == LayoutKind::Union
    }

    /// Maximum alignment used when placing fields
    #[must_use]
    pub fn pack(&self) -> usize {
        self.pack
    }

    /// Fields in declaration order
    #[must_use]
    pub fn fields(&self) -> &[LayoutField] {
        &self.fields
    }

    /// Looks up a field by name
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&LayoutField> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Size of the structure in bytes
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Alignment of the structure when nested in another one
    #[must_use]
    pub fn align(&self) -> usize {
        self.align
    }
}

impl PartialEq for Layout {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Layout {}

impl Hash for Layout {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {:?}, pack {}) {{",
            self.name, self.kind, self.order, self.pack
        )?;
        for field in &self.fields {
            write!(f, " {}@{}: {};", field.name, field.offset, field.ctype)?;
        }
        write!(f, " }}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Primitive;

    fn fields() -> Vec<(String, CType)> {
        vec![
            ("flag".to_string(), CType::from(Primitive::U8)),
            ("value".to_string(), CType::from(Primitive::U32)),
            ("short".to_string(), CType::from(Primitive::U16)),
        ]
    }

    #[test]
    fn packed() {
        let layout = Layout::new("Packed", LayoutKind::Little, 1, fields());
        let offsets: Vec<usize> = layout.fields().iter().map(LayoutField::offset).collect();
        assert_eq!(offsets, [0, 1, 5]);
        assert_eq!(layout.size(), 7);
        assert_eq!(layout.align(), 1);
    }

    #[test]
    fn aligned() {
        let layout = Layout::new("Aligned", LayoutKind::Little, 8, fields());
        let offsets: Vec<usize> = layout.fields().iter().map(LayoutField::offset).collect();
        assert_eq!(offsets, [0, 4, 8]);
        assert_eq!(layout.size(), 12);
        assert_eq!(layout.align(), 4);

        let layout = Layout::new("Pack2", LayoutKind::Little, 2, fields());
        let offsets: Vec<usize> = layout.fields().iter().map(LayoutField::offset).collect();
        assert_eq!(offsets, [0, 2, 6]);
        assert_eq!(layout.size(), 8);
    }

    #[test]
    fn union() {
        let layout = Layout::new("Overlay", LayoutKind::Union, 1, fields());
        assert!(layout.fields().iter().all(|field| field.offset() == 0));
        assert_eq!(layout.size(), 4);
        assert!(layout.is_union());
        assert_eq!(layout.byte_order(), ByteOrder::NATIVE);

        let big = Layout::with_order("Overlay", LayoutKind::Union, ByteOrder::Big, 1, fields());
        assert!(big.is_union());
        assert_eq!(big.size(), 4);
        assert_eq!(big.byte_order(), ByteOrder::Big);
    }

    #[test]
    fn structure_kinds() {
        assert_eq!(LayoutKind::structure(ByteOrder::Big), LayoutKind::Big);
        assert_eq!(LayoutKind::structure(ByteOrder::Little), LayoutKind::Little);
    }

    #[test]
    fn identity() {
        let a = Layout::new("Same", LayoutKind::Big, 1, fields());
        let b = Layout::new("Same", LayoutKind::Big, 1, fields());
        assert_ne!(a, b);
        assert_eq!(a.field("value").map(LayoutField::offset), Some(1));
        assert!(a.field("missing").is_none());
        assert_eq!(a.byte_order(), ByteOrder::Big);
    }
}
