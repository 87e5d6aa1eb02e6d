//! Integration tests for byte order variants of otherwise identical record types.

use cdata::{prelude::*, ByteOrder, LayoutRegistry, Result};

fn sample_type(name: &str, kind: LayoutKind) -> Result<RecordType> {
    let item = RecordType::builder(format!("{name}Item"), kind)
        .field(Field::builder("item_number", Primitive::U8).build()?)
        .field(Field::builder("item_string", CType::chars(10)).build()?)
        .build()?;

    RecordType::builder(name, kind)
        .field(Field::builder("number", Primitive::U32).build()?)
        .field(Field::builder("string", CType::chars(20)).build()?)
        .field(Field::builder("item", &item).build()?)
        .field(
            Field::builder("shorts", CType::array(Primitive::I16, 2))
                .build()?,
        )
        .build()
}

fn sample_record(record_type: &RecordType) -> Result<Record> {
    let item = match record_type.field("item").map(Field::ctype) {
        Some(CType::Record(layout)) => LayoutRegistry::global()
            .get_or_create_record_type(layout)
            .new_record([Value::from(7u8), Value::from("item")])?,
        _ => unreachable!("item is a nested record field"),
    };

    record_type.new_record([
        Value::from(0x0102_0304u32),
        Value::from("text"),
        Value::from(item),
        Value::list([0x0A0Bi16, -2]),
    ])
}

#[test]
fn test_big_and_little_are_byte_reversed() -> Result<()> {
    let big = sample_type("Big", LayoutKind::Big)?;
    let little = sample_type("Little", LayoutKind::Little)?;
    assert_eq!(big.size(), little.size());

    let big_bytes = sample_record(&big)?.to_bytes()?;
    let little_bytes = sample_record(&little)?.to_bytes()?;

    // number
    assert_eq!(&big_bytes[..4], &[1, 2, 3, 4]);
    assert_eq!(&little_bytes[..4], &[4, 3, 2, 1]);

    // string, item_number and item_string are byte sized
    assert_eq!(&big_bytes[4..35], &little_bytes[4..35]);
    assert_eq!(&big_bytes[4..8], b"text");
    assert_eq!(big_bytes[24], 7);

    // shorts
    assert_eq!(&big_bytes[35..], &[0x0A, 0x0B, 0xFF, 0xFE]);
    assert_eq!(&little_bytes[35..], &[0x0B, 0x0A, 0xFE, 0xFF]);
    Ok(())
}

#[test]
fn test_round_trip_per_byte_order() -> Result<()> {
    for (name, kind) in [
        ("RoundBig", LayoutKind::Big),
        ("RoundLittle", LayoutKind::Little),
        ("RoundNative", LayoutKind::Native),
    ] {
        let record_type = sample_type(name, kind)?;
        let record = sample_record(&record_type)?;
        assert_eq!(record_type.from_buffer_copy(&record.to_bytes()?)?, record);
        assert_eq!(record_type.endian(), kind);
    }
    Ok(())
}

#[test]
fn test_native_matches_target() -> Result<()> {
    let native = sample_type("Native", LayoutKind::Native)?;
    let bytes = sample_record(&native)?.to_bytes()?;

    let expected = match ByteOrder::NATIVE {
        ByteOrder::Little => [4, 3, 2, 1],
        ByteOrder::Big => [1, 2, 3, 4],
    };
    assert_eq!(&bytes[..4], &expected);
    assert_eq!(native.ctype().byte_order(), ByteOrder::NATIVE);
    Ok(())
}

#[test]
fn test_nested_byte_order_must_match() -> Result<()> {
    let little_item = RecordType::builder("LittleItem", LayoutKind::Little)
        .field(Field::builder("value", Primitive::U16).build()?)
        .build()?;

    let result = RecordType::builder("BigOuter", LayoutKind::Big)
        .field(Field::builder("item", &little_item).build()?)
        .build();

    match result {
        Err(Error::Declaration { field, message }) => {
            assert_eq!(field, "item");
            assert!(message.contains("byte order"));
        }
        other => panic!("expected a declaration error, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_requested_byte_order_reaches_nested_records() -> Result<()> {
    let registry = LayoutRegistry::global();
    let inner = RecordType::builder("Inner", LayoutKind::Little)
        .field(Field::builder("n", Primitive::U32).build()?)
        .build()?;
    let outer = RecordType::builder("Outer", LayoutKind::Little)
        .field(Field::builder("n", Primitive::U32).build()?)
        .field(Field::builder("item", &inner).build()?)
        .field(
            Field::builder("items", CType::record_array(&inner.ctype(), 2))
                .build()?,
        )
        .build()?;

    let big = registry.get_or_create_layout(&outer, LayoutKind::Big, 1);
    assert_eq!(big.byte_order(), ByteOrder::Big);
    let mut pending = vec![big.clone()];
    while let Some(layout) = pending.pop() {
        assert_eq!(layout.byte_order(), ByteOrder::Big, "{layout}");
        for field in layout.fields() {
            if let CType::Record(nested) | CType::RecordArray { layout: nested, .. } =
                field.ctype()
            {
                pending.push(nested.clone());
            }
        }
    }

    let record = outer.new_record([
        Value::from(1u32),
        Value::from(inner.new_record([Value::from(1u32)])?),
        Value::list([
            Value::from(inner.new_record([Value::from(2u32)])?),
            Value::from(inner.new_record([Value::from(3u32)])?),
        ]),
    ])?;
    let expected: [u8; 16] = [0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3];
    let little: [u8; 16] = [1, 0, 0, 0, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0];
    let structure = cdata::convert::encode_as(&record, &big, None)?;
    assert_eq!(structure.as_bytes(), &expected[..]);
    assert_eq!(record.to_bytes()?, little);

    let variant = registry.get_or_create_record_type(&big);
    assert_ne!(variant, outer);
    assert_eq!(variant.kind(), LayoutKind::Big);
    let decoded = variant.from_buffer_copy(&expected)?;
    match decoded.get("item")? {
        Value::Record(item) => {
            assert_eq!(item.get("n")?, &Value::UInt(1));
            assert_eq!(item.record_type().byte_order(), ByteOrder::Big);
        }
        other => panic!("item decoded as {other:?}"),
    }
    assert_eq!(decoded.to_bytes()?, expected);

    let rebuilt = outer.from_ctype(&structure)?;
    assert_eq!(rebuilt.get("n")?, &Value::UInt(1));
    assert_eq!(rebuilt.to_bytes()?, little);
    Ok(())
}
