use crate::{
    convert::EncodeHook,
    layout::{LayoutRef, OwnedStruct},
    record::Record,
    types::{CType, Value},
    Result,
};

/// Encodes `record` into a fresh binary structure of its record type's layout.
///
/// # Errors
/// Returns [`crate::Error::Unrepresentable`] if a value fits none of the encoding rules of its
/// field, or any error returned by a per-field encoder.
pub fn to_ctype(record: &Record, hook: Option<EncodeHook<'_>>) -> Result<OwnedStruct> {
    encode_as(record, &record.record_type().ctype(), hook)
}

/// Encodes `record` into a fresh binary structure of `layout`.
///
/// Slots are filled by name from the record's fields, so `layout` may be any layout generated
/// for the record type, e.g. one in another byte order. Nested records are encoded into the
/// layout of the slot that holds them.
///
/// # Errors
/// Returns [`crate::Error::FieldNotFound`] if `layout` has a slot the record lacks, and the
/// errors of [`to_ctype`].
pub fn encode_as(
    record: &Record,
    layout: &LayoutRef,
    hook: Option<EncodeHook<'_>>,
) -> Result<OwnedStruct> {
    let record_type = record.record_type();
    let mut structure = OwnedStruct::new(layout);

    for (index, slot) in layout.fields().iter().enumerate() {
        let value = record.get(slot.name())?;

        if let Some(hook) = hook {
            let current = structure.get_at(index)?;
            if let Some(replacement) = hook(slot.name(), slot.ctype(), &current, value) {
                structure.set_at(index, &replacement)?;
                continue;
            }
        }

        let encoded = match record_type.field(slot.name()).and_then(|f| f.encoder()) {
            Some(encoder) => encoder(value)?,
            None => encode_value(slot.ctype(), value, hook)?,
        };
        structure.set_at(index, &encoded)?;
    }

    Ok(structure)
}

fn encode_value(ctype: &CType, value: &Value, hook: Option<EncodeHook<'_>>) -> Result<Value> {
    let encoded = match (ctype, value) {
        (_, Value::Text(text)) if ctype.is_text() => Value::Bytes(text.as_bytes().to_vec()),
        (CType::Record(layout), Value::Record(nested)) => {
            Value::Struct(encode_as(nested, layout, hook)?)
        }
        (CType::RecordArray { layout, .. }, Value::List(items)) => Value::List(
            items
                .iter()
                .map(|item| match item {
                    Value::Record(nested) => encode_as(nested, layout, hook).map(Value::Struct),
                    other => Ok(other.clone()),
                })
                .collect::<Result<Vec<_>>>()?,
        ),
        (_, other) => other.clone(),
    };

    Ok(encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        record::{Field, RecordType},
        test::{data_record, item_record},
        types::Primitive,
        Error, LayoutKind,
    };

    #[test]
    fn item_bytes() {
        let structure = to_ctype(&item_record(9999, "ABCDEFGHIJ"), None).unwrap();
        assert_eq!(structure.as_bytes(), b"\x0F\x27\x00\x00ABCDEFGHIJ");
    }

    #[test]
    fn nested_bytes() {
        let bytes = to_ctype(&data_record(), None).unwrap().into_bytes();
        assert_eq!(bytes.len(), 120);
        // item.number follows number and text[20]
        assert_eq!(&bytes[24..28], &[1, 0, 0, 0]);
        // last int_array element
        assert_eq!(&bytes[118..120], &[6, 0]);
    }

    #[test]
    fn hook_overrides_metadata_encoder() {
        let tagged = RecordType::builder("Tagged", LayoutKind::Little)
            .field(
                Field::builder("value", Primitive::U8)
                    .encoder(|_| Ok(Value::from(1u8)))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap();
        let record = tagged.create([("value", Value::from(0u8))]).unwrap();

        assert_eq!(to_ctype(&record, None).unwrap().as_bytes(), &[1]);

        let hook = |_: &str, _: &CType, current: &Value, _: &Value| {
            assert_eq!(current, &Value::UInt(0));
            Some(Value::from(2u8))
        };
        assert_eq!(to_ctype(&record, Some(&hook)).unwrap().as_bytes(), &[2]);

        let absent = |_: &str, _: &CType, _: &Value, _: &Value| -> Option<Value> { None };
        assert_eq!(to_ctype(&record, Some(&absent)).unwrap().as_bytes(), &[1]);
    }

    #[test]
    fn unrepresentable_value() {
        let mut record = item_record(1, "x");
        record.set("number", "not a number").unwrap();

        assert!(matches!(
            to_ctype(&record, None),
            Err(Error::Unrepresentable { field, .. }) if field == "number"
        ));
    }

    #[test]
    fn unset_field_stays_zeroed() {
        let mut record = item_record(5, "abc");
        record.set("text", Value::None).unwrap();
        let structure = to_ctype(&record, None).unwrap();
        assert_eq!(&structure.as_bytes()[4..], &[0u8; 10]);
    }
}
