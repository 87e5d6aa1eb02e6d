//! Process-wide cache of generated layouts.
//!
//! The [`LayoutRegistry`] closes a bidirectional cache loop:
//!
//! - **Forward**: (record type, kind, byte order, pack) to the one generated [`Layout`] of
//!   that key.
//!   Kinds other than the declared one get variant layouts whose nested structures share
//!   the requested byte order
//! - **Reverse**: generated layout back to the record type it was built from, so nested
//!   structures found while decoding (e.g. elements of an array of structures) resolve to
//!   their declared record type. Layouts without an origin get a synthetic record type with
//!   one field per layout field, cached as if it had been declared.
//!
//! # Thread Safety
//!
//! Both maps are `DashMap`s. Lookups that miss go through the `entry` API, which holds the
//! shard lock across the check-then-insert sequence, so a key is never built twice. A shard
//! of `records` may be locked while a shard of `layouts` is held, never the reverse. Entries
//! are never mutated or evicted after insertion; readers of a cached entry only clone an
//! `Arc`. The cache is unbounded: record types form a small, static set for the lifetime of
//! the process.

use std::sync::{Arc, OnceLock};

use dashmap::{mapref::entry::Entry, DashMap};

use crate::{
    io::ByteOrder,
    layout::{Layout, LayoutKind, LayoutRef},
    record::RecordType,
    types::CType,
};

/// Cache key of a generated layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayoutKey {
    /// Identity of the record type
    pub record: u64,
    /// Base kind of the layout
    pub kind: LayoutKind,
    /// Byte order of the layout's scalars
    pub order: ByteOrder,
    /// Packing alignment
    pub pack: usize,
}

/// Bidirectional cache between record types and their generated layouts.
///
/// Most code uses the process-wide instance from [`LayoutRegistry::global`]; separate
/// instances are useful for isolated tests.
#[derive(Default)]
pub struct LayoutRegistry {
    /// Generated layouts by (record type, kind, byte order, pack)
    layouts: DashMap<LayoutKey, LayoutRef>,
    /// Originating record types by layout identity
    records: DashMap<u64, RecordType>,
}

static GLOBAL: OnceLock<LayoutRegistry> = OnceLock::new();

impl LayoutRegistry {
    /// Creates an empty registry
    #[must_use]
    pub fn new() -> Self {
        LayoutRegistry {
            layouts: DashMap::new(),
            records: DashMap::new(),
        }
    }

    /// The process-wide registry, initialised on first use
    pub fn global() -> &'static LayoutRegistry {
        GLOBAL.get_or_init(LayoutRegistry::new)
    }

    /// Returns the layout of `record` for `kind` and `pack`, generating it on first use.
    ///
    /// Repeated calls with an equal key return the identical [`LayoutRef`]. A freshly
    /// generated layout is also registered in the reverse mapping.
    ///
    /// Asking for a kind or packing other than the declared one yields a variant: nested
    /// structures whose byte order differs from the requested one are re-derived in that
    /// byte order, recursively, so the whole structure shares one byte order. The variant
    /// layout maps back to a variant record type declared with the requested kind.
    pub fn get_or_create_layout(
        &self,
        record: &RecordType,
        kind: LayoutKind,
        pack: usize,
    ) -> LayoutRef {
        let order = if kind == record.kind() {
            record.byte_order()
        } else {
            kind.byte_order()
        };
        self.layout_for(record, kind, order, pack)
    }

    fn layout_for(
        &self,
        record: &RecordType,
        kind: LayoutKind,
        order: ByteOrder,
        pack: usize,
    ) -> LayoutRef {
        let key = LayoutKey {
            record: record.id(),
            kind,
            order,
            pack,
        };

        if let Some(layout) = self.layouts.get(&key) {
            return layout.value().clone();
        }

        if kind != record.kind() || order != record.byte_order() || pack != record.pack() {
            // nested layouts are derived through this registry, so no shard may be held here;
            // a concurrent caller may derive a second variant, the first one inserted wins
            let variant = self.variant(record, kind, order, pack);
            let layout = self.layout_for(&variant, kind, order, pack);
            return self.layouts.entry(key).or_insert(layout).value().clone();
        }

        match self.layouts.entry(key) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                let layout = Arc::new(Layout::with_order(
                    record.name(),
                    kind,
                    order,
                    pack,
                    record
                        .fields()
                        .iter()
                        .map(|field| (field.name().to_string(), field.ctype().clone())),
                ));
                tracing::debug!(
                    record = record.name(),
                    layout_id = layout.id(),
                    size = layout.size(),
                    "generated layout {} ({:?})",
                    kind,
                    order
                );

                self.records.insert(layout.id(), record.clone());
                entry.insert(layout.clone());
                layout
            }
        }
    }

    /// `record` declared with `kind`, `order` and `pack`, nested structures re-derived in
    /// `order`
    fn variant(
        &self,
        record: &RecordType,
        kind: LayoutKind,
        order: ByteOrder,
        pack: usize,
    ) -> RecordType {
        let fields = record
            .fields()
            .iter()
            .map(|field| {
                let ctype = match field.ctype() {
                    CType::Record(layout) if layout.byte_order() != order => {
                        CType::Record(self.reordered(layout, order))
                    }
                    CType::RecordArray { layout, len } if layout.byte_order() != order => {
                        CType::RecordArray {
                            layout: self.reordered(layout, order),
                            len: *len,
                        }
                    }
                    other => other.clone(),
                };
                field.with_ctype(ctype)
            })
            .collect();

        record.variant(kind, order, pack, fields)
    }

    fn reordered(&self, layout: &LayoutRef, order: ByteOrder) -> LayoutRef {
        let nested = self.get_or_create_record_type(layout);
        let kind = if layout.is_union() {
            LayoutKind::Union
        } else {
            LayoutKind::structure(order)
        };
        self.layout_for(&nested, kind, order, layout.pack())
    }

    /// Returns the record type that `layout` was generated for.
    ///
    /// If no record type is associated with the layout, a synthetic one mirroring the layout
    /// fields is generated, registered, and returned. The synthetic type maps back to the
    /// very same layout.
    pub fn get_or_create_record_type(&self, layout: &LayoutRef) -> RecordType {
        if let Some(record) = self.records.get(&layout.id()) {
            return record.value().clone();
        }

        let record = match self.records.entry(layout.id()) {
            Entry::Occupied(entry) => return entry.get().clone(),
            Entry::Vacant(entry) => {
                let record = RecordType::synthetic(layout);
                tracing::debug!(
                    layout = layout.name(),
                    layout_id = layout.id(),
                    "generated synthetic record type {}",
                    record.name()
                );
                entry.insert(record.clone());
                record
            }
        };

        // the records entry is released before a layouts shard is locked
        self.layouts.insert(
            LayoutKey {
                record: record.id(),
                kind: layout.kind(),
                order: layout.byte_order(),
                pack: layout.pack(),
            },
            layout.clone(),
        );
        record
    }

    /// Number of forward cache entries; a variant layout is cached under both the record
    /// type it was requested for and its variant record type
    #[must_use]
    pub fn layout_count(&self) -> usize {
        self.layouts.len()
    }

    /// Number of record types in the reverse mapping
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        record::Field,
        types::{CType, Primitive},
    };

    fn point() -> RecordType {
        RecordType::builder("Point", LayoutKind::Little)
            .field(
                Field::builder("x", CType::from(Primitive::I32))
                    .build()
                    .unwrap(),
            )
            .field(
                Field::builder("y", CType::from(Primitive::I32))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn idempotent() {
        let registry = LayoutRegistry::new();
        let point = point();

        let a = registry.get_or_create_layout(&point, LayoutKind::Little, 1);
        let b = registry.get_or_create_layout(&point, LayoutKind::Little, 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.layout_count(), 1);

        let big = registry.get_or_create_layout(&point, LayoutKind::Big, 1);
        assert!(!Arc::ptr_eq(&a, &big));
        let packed = registry.get_or_create_layout(&point, LayoutKind::Little, 4);
        assert!(!Arc::ptr_eq(&a, &packed));
        assert_eq!(registry.layout_count(), 5);
        assert_eq!(registry.record_count(), 3);

        let again = registry.get_or_create_layout(&point, LayoutKind::Big, 1);
        assert!(Arc::ptr_eq(&big, &again));
        assert_eq!(registry.layout_count(), 5);
    }

    #[test]
    fn reverse_mapping() {
        let registry = LayoutRegistry::new();
        let point = point();

        let layout = registry.get_or_create_layout(&point, LayoutKind::Little, 1);
        assert_eq!(registry.get_or_create_record_type(&layout), point);
    }

    #[test]
    fn variant_reorders_nested_layouts() {
        let registry = LayoutRegistry::new();
        let point = point();
        let nested = registry.get_or_create_layout(&point, LayoutKind::Little, 1);
        let path = RecordType::builder("Path", LayoutKind::Little)
            .field(
                Field::builder("start", CType::Record(nested.clone()))
                    .build()
                    .unwrap(),
            )
            .field(
                Field::builder("steps", CType::record_array(&nested, 2))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();

        let big = registry.get_or_create_layout(&path, LayoutKind::Big, 1);
        assert_eq!(big.byte_order(), ByteOrder::Big);
        for field in big.fields() {
            let layout = match field.ctype() {
                CType::Record(layout) | CType::RecordArray { layout, .. } => layout,
                other => panic!("unexpected {other}"),
            };
            assert_eq!(layout.byte_order(), ByteOrder::Big);
            assert_eq!(layout.kind(), LayoutKind::Big);
            assert!(!Arc::ptr_eq(layout, &nested));
        }

        let variant = registry.get_or_create_record_type(&big);
        assert_ne!(variant, path);
        assert_eq!(variant.name(), "Path");
        assert_eq!(variant.kind(), LayoutKind::Big);
        assert!(Arc::ptr_eq(
            &registry.get_or_create_layout(&variant, LayoutKind::Big, 1),
            &big
        ));

        let start = match big.fields()[0].ctype() {
            CType::Record(layout) => registry.get_or_create_record_type(layout),
            other => panic!("unexpected {other}"),
        };
        assert_eq!(start.name(), "Point");
        assert_eq!(start.byte_order(), ByteOrder::Big);
    }

    #[test]
    fn nested_union_follows_parent_order() {
        let registry = LayoutRegistry::new();
        let overlay = RecordType::builder("Overlay", LayoutKind::Union)
            .field(Field::builder("word", Primitive::U32).build().unwrap())
            .field(
                Field::builder("bytes", CType::array(Primitive::U8, 4))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let union = registry.get_or_create_layout(&overlay, LayoutKind::Union, 1);
        let frame = RecordType::builder("Frame", LayoutKind::Native)
            .field(
                Field::builder("body", CType::Record(union))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();

        let order = match ByteOrder::NATIVE {
            ByteOrder::Little => ByteOrder::Big,
            ByteOrder::Big => ByteOrder::Little,
        };
        let swapped = registry.get_or_create_layout(&frame, LayoutKind::structure(order), 1);
        let CType::Record(body) = swapped.fields()[0].ctype() else {
            panic!("body is not a nested structure");
        };
        assert!(body.is_union());
        assert_eq!(body.byte_order(), order);
    }

    #[test]
    fn synthetic_record_type() {
        let registry = LayoutRegistry::new();
        let layout = Arc::new(Layout::new(
            "Anonymous",
            LayoutKind::Big,
            1,
            [
                ("a".to_string(), CType::from(Primitive::U16)),
                ("b".to_string(), CType::chars(4)),
            ],
        ));

        let record = registry.get_or_create_record_type(&layout);
        let names: Vec<&str> = record.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(record.kind(), LayoutKind::Big);

        let again = registry.get_or_create_record_type(&layout);
        assert_eq!(record, again);
        assert_eq!(registry.record_count(), 1);

        let back = registry.get_or_create_layout(&record, LayoutKind::Big, 1);
        assert!(Arc::ptr_eq(&layout, &back));
    }

    #[test]
    fn global_is_shared() {
        let point = point();
        assert!(Arc::ptr_eq(&point.ctype(), &point.ctype()));
        assert!(std::ptr::eq(
            LayoutRegistry::global(),
            LayoutRegistry::global()
        ));
    }
}
