//! Record type and record factories shared by the unit tests.
//!
//! The declarations mirror a small but complete shape: a flat `Item` and a `Data` record
//! that nests it once and as an array, next to scalars, text and a scalar array.

use std::sync::OnceLock;

use crate::{
    layout::LayoutKind,
    record::{Field, Record, RecordType},
    types::{CType, Primitive, Value},
};

/// `Item { number: u32, text: char[10] }`, little endian, 14 bytes
pub fn item_type() -> RecordType {
    static ITEM: OnceLock<RecordType> = OnceLock::new();
    ITEM.get_or_init(|| {
        RecordType::builder("Item", LayoutKind::Little)
            .field(Field::builder("number", Primitive::U32).build().unwrap())
            .field(Field::builder("text", CType::chars(10)).build().unwrap())
            .build()
            .unwrap()
    })
    .clone()
}

/// `Data { number: u32, text: char[20], item: Item, items: Item[5], int_array: u16[6] }`,
/// little endian, 120 bytes
pub fn data_type() -> RecordType {
    static DATA: OnceLock<RecordType> = OnceLock::new();
    DATA.get_or_init(|| {
        let item = item_type().ctype();
        RecordType::builder("Data", LayoutKind::Little)
            .field(Field::builder("number", Primitive::U32).build().unwrap())
            .field(Field::builder("text", CType::chars(20)).build().unwrap())
            .field(Field::builder("item", &item).build().unwrap())
            .field(
                Field::builder("items", CType::record_array(&item, 5))
                    .build()
                    .unwrap(),
            )
            .field(
                Field::builder("int_array", CType::array(Primitive::U16, 6))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap()
    })
    .clone()
}

/// An `Item` record holding `number` and `text`
pub fn item_record(number: u32, text: &str) -> Record {
    item_type()
        .create([
            ("number", Value::from(number)),
            ("text", Value::from(text)),
        ])
        .unwrap()
}

/// A fully populated `Data` record
pub fn data_record() -> Record {
    let items = (0..5u32).map(|i| item_record(100 + i, &format!("item {i}")));

    data_type()
        .create([
            ("number", Value::from(9999u32)),
            ("text", Value::from("ABCDEFGHIJKLMNOPQRST")),
            ("item", Value::from(item_record(1, "first"))),
            ("items", Value::list(items)),
            ("int_array", Value::list([1u16, 2, 3, 4, 5, 6])),
        ])
        .unwrap()
}
