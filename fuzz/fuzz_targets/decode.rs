#![no_main]

use std::sync::OnceLock;

use cdata::prelude::*;
use libfuzzer_sys::fuzz_target;

fn packet_type() -> Option<&'static RecordType> {
    static TYPE: OnceLock<Option<RecordType>> = OnceLock::new();
    TYPE.get_or_init(|| {
        let entry = RecordType::builder("Entry", LayoutKind::Big)
            .field(Field::builder("id", Primitive::U16).build().ok()?)
            .field(Field::builder("name", CType::chars(6)).build().ok()?)
            .build()
            .ok()?;
        RecordType::builder("Packet", LayoutKind::Big)
            .field(Field::builder("magic", Primitive::U32).build().ok()?)
            .field(Field::builder("ratio", Primitive::F64).build().ok()?)
            .field(
                Field::builder("entries", CType::record_array(&entry.ctype(), 3))
                    .build()
                    .ok()?,
            )
            .build()
            .ok()
    })
    .as_ref()
}

fuzz_target!(|data: &[u8]| {
    let Some(packet) = packet_type() else {
        return;
    };

    if let Ok(record) = packet.from_buffer_copy(data) {
        let _ = record.to_bytes();
        let _ = packet.from_dict(&record.to_dict());
    }
});
