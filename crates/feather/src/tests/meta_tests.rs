use crate::meta::{ColumnMeta, TableMeta};
use crate::FeatherType;

fn sample_meta() -> TableMeta {
    TableMeta {
        version: 1,
        num_rows: 42,
        description: Some("test table".to_owned()),
        metadata: Some("{\"origin\":\"unit test\"}".to_owned()),
        columns: vec![
            ColumnMeta {
                name: "ints".to_owned(),
                user_metadata: Some("{\"unit\":\"m\"}".to_owned()),
                type_byte: FeatherType::Int32.type_byte(),
                offset: 8,
                length: 42,
                null_count: 0,
                total_bytes: 168,
            },
            ColumnMeta {
                name: "words".to_owned(),
                user_metadata: None,
                type_byte: FeatherType::Utf8.type_byte(),
                offset: 176,
                length: 42,
                null_count: 3,
                total_bytes: 512,
            },
        ],
    }
}

// -------------------- Encode / parse --------------------

#[test]
fn encode_parse_roundtrip() {
    let meta = sample_meta();
    let block = meta.encode();
    let parsed = TableMeta::parse(&block).unwrap();
    assert_eq!(parsed, meta);
}

#[test]
fn optional_fields_absent() {
    let meta = TableMeta {
        version: 1,
        num_rows: 0,
        description: None,
        metadata: None,
        columns: vec![ColumnMeta {
            name: "c".to_owned(),
            user_metadata: None,
            type_byte: FeatherType::Bool.type_byte(),
            offset: 8,
            length: 0,
            null_count: 0,
            total_bytes: 0,
        }],
    };
    let parsed = TableMeta::parse(&meta.encode()).unwrap();
    assert_eq!(parsed, meta);
}

#[test]
fn no_columns() {
    let meta = TableMeta {
        version: 1,
        num_rows: 0,
        description: None,
        metadata: None,
        columns: vec![],
    };
    let parsed = TableMeta::parse(&meta.encode()).unwrap();
    assert_eq!(parsed, meta);
}

#[test]
fn unknown_type_byte_survives() {
    let mut meta = sample_meta();
    meta.columns[0].type_byte = 77;
    let parsed = TableMeta::parse(&meta.encode()).unwrap();
    assert_eq!(parsed.columns[0].type_byte, 77);
}

#[test]
fn encoded_block_is_8_aligned() {
    assert_eq!(sample_meta().encode().len() % 8, 0);
    // Optional strings change the layout; alignment must hold regardless.
    let mut meta = sample_meta();
    meta.description = None;
    meta.columns[0].user_metadata = None;
    assert_eq!(meta.encode().len() % 8, 0);
}

// -------------------- Malformed blocks --------------------

#[test]
fn parse_empty_block_fails() {
    assert!(TableMeta::parse(&[]).is_err());
}

#[test]
fn parse_garbage_fails() {
    assert!(TableMeta::parse(&[0xFF; 16]).is_err());
}

#[test]
fn parse_truncated_block_fails() {
    let block = sample_meta().encode();
    // Chop enough off the end that some reference dangles.
    assert!(TableMeta::parse(&block[..block.len() / 2]).is_err());
}
