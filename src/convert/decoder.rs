use crate::{
    convert::DecodeHook,
    layout::{CStruct, LayoutRegistry, OwnedStruct},
    record::{Record, RecordType},
    types::{CType, Value},
    Result,
};

/// Decodes `structure` into a record of `record_type`.
///
/// The fields are taken from the structure's layout and matched to `record_type` by name;
/// fields of `record_type` absent from the layout take their defaults.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for text slots that are not valid UTF-8,
/// [`crate::Error::FieldNotFound`] if the layout has a field `record_type` does not declare,
/// or any error returned by a per-field decoder.
pub fn from_ctype<B: AsRef<[u8]>>(
    record_type: &RecordType,
    structure: &CStruct<B>,
    hook: Option<DecodeHook<'_>>,
) -> Result<Record> {
    let layout = structure.layout();
    let mut values = Vec::with_capacity(layout.fields().len());

    for (index, field) in layout.fields().iter().enumerate() {
        let slot = structure.get_at(index)?;

        if let Some(replacement) = hook.and_then(|hook| hook(field.name(), field.ctype(), &slot)) {
            values.push((field.name(), replacement));
            continue;
        }

        let decoded = match record_type.field(field.name()).and_then(|f| f.decoder()) {
            Some(decoder) => decoder(&slot)?,
            None => decode_value(field.name(), field.ctype(), slot, hook)?,
        };
        values.push((field.name(), decoded));
    }

    record_type.create(values)
}

fn decode_value(
    name: &str,
    ctype: &CType,
    slot: Value,
    hook: Option<DecodeHook<'_>>,
) -> Result<Value> {
    let decoded = match slot {
        Value::Bytes(bytes) if ctype.is_text() => match String::from_utf8(bytes) {
            Ok(text) => Value::Text(text),
            Err(error) => {
                return Err(malformed_error!(
                    "Text of field '{}' is not valid UTF-8 - {}",
                    name,
                    error
                ))
            }
        },
        Value::Struct(nested) => Value::Record(decode_struct(&nested, hook)?),
        Value::List(items) if matches!(ctype, CType::RecordArray { .. }) => Value::List(
            items
                .into_iter()
                .map(|item| match item {
                    Value::Struct(nested) => decode_struct(&nested, hook).map(Value::Record),
                    other => Ok(other),
                })
                .collect::<Result<Vec<_>>>()?,
        ),
        other => other,
    };

    Ok(decoded)
}

fn decode_struct(structure: &OwnedStruct, hook: Option<DecodeHook<'_>>) -> Result<Record> {
    let record_type = LayoutRegistry::global().get_or_create_record_type(structure.layout());
    from_ctype(&record_type, structure, hook)
}
