//! Registry collaborators working together on framed payloads.

use gsrserde_core::{
    DataFormat, DataFormatDecoderFactory, DispatchConfiguration, RegistryDecoder, SchemaDescriptor,
};
use gsrserde_registry::{DefaultDataFormatDecoderFactory, MemorySchemaRegistry, WireFrame, COMPRESSION_ZLIB};
use uuid::Uuid;

#[test]
fn framed_json_payload_decodes_end_to_end() {
    let registry = MemorySchemaRegistry::new();
    let id = Uuid::new_v4();
    registry
        .add(id, SchemaDescriptor::new("Order", r#"{"type":"object"}"#, DataFormat::Json))
        .unwrap();

    let payload = WireFrame::encode(id, br#"{"order_id": "A-1", "qty": 3}"#);
    assert!(registry.can_decode(&payload));

    let body = registry.decode(&payload).unwrap();
    let schema = registry.decode_schema(&payload).unwrap();
    let factory = DefaultDataFormatDecoderFactory::new();
    let decoder = factory
        .get_decoder(schema.data_format, &DispatchConfiguration::default())
        .unwrap();
    let value = decoder.deserialize(&body, &schema).unwrap();

    let json = value.as_json().unwrap();
    assert_eq!(json["order_id"], "A-1");
    assert_eq!(json["qty"], 3);
}

#[test]
fn zlib_payload_is_recognised_but_not_decoded() {
    let registry = MemorySchemaRegistry::new();
    let id = Uuid::new_v4();
    registry
        .add(id, SchemaDescriptor::new("Order", "{}", DataFormat::Json))
        .unwrap();

    let mut payload = WireFrame::encode(id, b"compressed");
    payload[1] = COMPRESSION_ZLIB;

    assert!(registry.can_decode(&payload));
    let err = registry.decode(&payload).unwrap_err();
    assert_eq!(err.to_string(), "Unsupported compression byte: 0x05");
}

#[test]
fn hex_fixture_parses() {
    let payload = hex::decode("0300000000000000000000000000000000007b7d").unwrap();
    let frame = WireFrame::parse(&payload).unwrap();
    assert_eq!(frame.schema_version_id, Uuid::nil());
    assert_eq!(frame.body, b"{}");
}
