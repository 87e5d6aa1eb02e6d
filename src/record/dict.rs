//! Conversion between records and plain name to value mappings.

use crate::{
    layout::LayoutRegistry,
    record::{Record, RecordType},
    types::{CType, Dict, Value},
    Error, Result,
};

pub(crate) fn from_dict(record_type: &RecordType, dict: &Dict) -> Result<Record> {
    if let Some(unknown) = dict.keys().find(|key| record_type.field(key).is_none()) {
        return Err(Error::FieldNotFound(format!(
            "{}.{}",
            record_type.name(),
            unknown
        )));
    }

    let values = record_type
        .fields()
        .iter()
        .filter_map(|field| {
            dict.get(field.name())
                .map(|value| Ok((field.name(), nested_from_dict(field.ctype(), value)?)))
        })
        .collect::<Result<Vec<_>>>()?;

    record_type.create(values)
}

/// Mappings in record slots become records of the nested layout's record type
fn nested_from_dict(ctype: &CType, value: &Value) -> Result<Value> {
    match (ctype, value) {
        (CType::Record(layout), Value::Dict(nested)) => {
            let record_type = LayoutRegistry::global().get_or_create_record_type(layout);
            Ok(Value::Record(from_dict(&record_type, nested)?))
        }
        (CType::RecordArray { layout, .. }, Value::List(items)) => {
            let record_type = LayoutRegistry::global().get_or_create_record_type(layout);
            items
                .iter()
                .map(|item| match item {
                    Value::Dict(nested) => from_dict(&record_type, nested).map(Value::Record),
                    other => Ok(other.clone()),
                })
                .collect::<Result<Vec<_>>>()
                .map(Value::List)
        }
        (_, other) => Ok(other.clone()),
    }
}

pub(crate) fn to_dict(record: &Record) -> Dict {
    record
        .iter()
        .map(|(name, value)| (name.to_string(), nested_to_dict(value)))
        .collect()
}

fn nested_to_dict(value: &Value) -> Value {
    match value {
        Value::Record(record) => Value::Dict(to_dict(record)),
        Value::List(items) => Value::List(items.iter().map(nested_to_dict).collect()),
        other => other.clone(),
    }
}
