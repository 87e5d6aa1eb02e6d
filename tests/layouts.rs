//! Integration tests for layout generation: caching, unions, packing and the reverse mapping.

use std::sync::Arc;

use cdata::{prelude::*, LayoutRegistry, Result};
use strum::IntoEnumIterator;

fn header_type(kind: LayoutKind, pack: usize) -> Result<RecordType> {
    RecordType::builder("Header", kind)
        .pack(pack)
        .field(Field::builder("tag", Primitive::U8).build()?)
        .field(Field::builder("length", Primitive::U32).build()?)
        .field(Field::builder("flags", Primitive::U16).build()?)
        .field(Field::builder("checksum", Primitive::U64).build()?)
        .build()
}

#[test]
fn test_layout_is_cached() -> Result<()> {
    let header = header_type(LayoutKind::Little, 1)?;

    let first = header.ctype();
    let second = header.ctype();
    assert!(Arc::ptr_eq(&first, &second));

    let registry = LayoutRegistry::global();
    let direct = registry.get_or_create_layout(&header, LayoutKind::Little, 1);
    assert!(Arc::ptr_eq(&first, &direct));

    let big = registry.get_or_create_layout(&header, LayoutKind::Big, 1);
    assert!(!Arc::ptr_eq(&first, &big));
    assert_eq!(big.size(), first.size());
    Ok(())
}

#[test]
fn test_every_kind_generates_a_layout() -> Result<()> {
    for kind in LayoutKind::iter() {
        let header = header_type(kind, 1)?;
        let layout = header.ctype();
        assert_eq!(layout.kind(), kind);
        assert_eq!(layout.name(), "Header");

        let names: Vec<&str> = layout.fields().iter().map(|field| field.name()).collect();
        assert_eq!(names, ["tag", "length", "flags", "checksum"]);
    }
    Ok(())
}

#[test]
fn test_packed_offsets() -> Result<()> {
    let packed = header_type(LayoutKind::Little, 1)?.ctype();
    let offsets: Vec<usize> = packed.fields().iter().map(|field| field.offset()).collect();
    assert_eq!(offsets, [0, 1, 5, 7]);
    assert_eq!(packed.size(), 15);
    Ok(())
}

#[test]
fn test_aligned_offsets() -> Result<()> {
    let aligned = header_type(LayoutKind::Little, 8)?;
    let layout = aligned.ctype();
    let offsets: Vec<usize> = layout.fields().iter().map(|field| field.offset()).collect();
    assert_eq!(offsets, [0, 4, 8, 16]);
    assert_eq!(layout.size(), 24);
    assert_eq!(aligned.pack(), 8);

    let pack4 = header_type(LayoutKind::Little, 4)?.ctype();
    let offsets: Vec<usize> = pack4.fields().iter().map(|field| field.offset()).collect();
    assert_eq!(offsets, [0, 4, 8, 12]);
    assert_eq!(pack4.size(), 20);

    let record = aligned.new_record([
        Value::from(1u8),
        Value::from(2u32),
        Value::from(3u16),
        Value::from(4u64),
    ])?;
    let bytes = record.to_bytes()?;
    assert_eq!(bytes.len(), 24);
    assert_eq!(&bytes[1..4], &[0, 0, 0]);
    assert_eq!(aligned.from_buffer_copy(&bytes)?, record);
    Ok(())
}

#[test]
fn test_invalid_pack() {
    for pack in [0, 6, 64] {
        assert!(matches!(
            header_type(LayoutKind::Little, pack),
            Err(Error::Declaration { .. })
        ));
    }
}

#[test]
fn test_union_overlays_fields() -> Result<()> {
    let number = RecordType::builder("Number", LayoutKind::Union)
        .field(Field::builder("word", Primitive::U32).build()?)
        .field(
            Field::builder("bytes", CType::array(Primitive::U8, 4))
                .build()?,
        )
        .field(Field::builder("half", Primitive::U16).build()?)
        .build()?;

    let layout = number.ctype();
    assert!(layout.is_union());
    assert_eq!(layout.size(), 4);
    assert!(layout.fields().iter().all(|field| field.offset() == 0));

    let raw = 0x1122_3344u32.to_ne_bytes();
    let mut buffer = raw.to_vec();
    let view = number.view(&mut buffer)?;
    assert_eq!(view.get("word")?, Value::UInt(0x1122_3344));
    assert_eq!(view.get("bytes")?, Value::list(raw));
    assert_eq!(
        view.get("half")?,
        Value::from(u16::from_ne_bytes([raw[0], raw[1]]))
    );
    Ok(())
}

#[test]
fn test_union_inside_native_struct() -> Result<()> {
    let value = RecordType::builder("ValueUnion", LayoutKind::Union)
        .field(Field::builder("int", Primitive::I32).build()?)
        .field(
            Field::builder("float", Primitive::F32)
                .default(Value::None)
                .build()?,
        )
        .build()?;
    let tagged = RecordType::builder("Tagged", LayoutKind::Native)
        .field(Field::builder("tag", Primitive::U8).build()?)
        .field(Field::builder("value", &value).build()?)
        .build()?;
    assert_eq!(tagged.size(), 5);

    let inner = value.create([("int", Value::from(-5))])?;
    assert!(inner.get("float")?.is_none());

    let record = tagged.new_record([Value::from(1u8), Value::from(inner)])?;
    let decoded = tagged.from_buffer_copy(&record.to_bytes()?)?;
    let decoded_inner = decoded.get("value")?.as_record().expect("nested union");
    assert_eq!(decoded_inner.get("int")?, &Value::Int(-5));
    Ok(())
}

#[test]
fn test_synthetic_record_type() -> Result<()> {
    let header = header_type(LayoutKind::Big, 1)?;
    let layout = header.ctype();

    let registry = LayoutRegistry::new();
    let synthetic = registry.get_or_create_record_type(&layout);
    assert_ne!(synthetic, header);
    assert_eq!(synthetic.name(), "_generated_record_Header");
    assert_eq!(synthetic.kind(), LayoutKind::Big);
    assert_eq!(synthetic.fields().len(), 4);
    assert!(synthetic.fields().iter().all(Field::is_required));

    assert_eq!(registry.get_or_create_record_type(&layout), synthetic);
    let back = registry.get_or_create_layout(&synthetic, LayoutKind::Big, 1);
    assert!(Arc::ptr_eq(&back, &layout));
    Ok(())
}

#[test]
fn test_registry_is_thread_safe() -> Result<()> {
    let header = header_type(LayoutKind::Little, 2)?;
    let registry = Arc::new(LayoutRegistry::new());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let header = header.clone();
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                registry.get_or_create_layout(&header, LayoutKind::Little, 2)
            })
        })
        .collect();

    let layouts: Vec<LayoutRef> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread panicked"))
        .collect();
    assert!(layouts
        .windows(2)
        .all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    assert_eq!(registry.layout_count(), 1);
    assert_eq!(registry.record_count(), 1);
    Ok(())
}
