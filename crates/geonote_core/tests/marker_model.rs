use geonote_core::{
    decode_markers, encode_markers, CodecError, Coordinate, Marker, MarkerValidationError,
};

fn home() -> Marker {
    Marker {
        id: 1_700_000_000_000,
        coordinate: Coordinate::new(47.2, 38.9),
        title: "Home".to_string(),
        description: "My place".to_string(),
    }
}

#[test]
fn marker_serialization_uses_expected_wire_fields() {
    let json = serde_json::to_value(home()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "id": 1_700_000_000_000_i64,
            "coordinate": { "latitude": 47.2, "longitude": 38.9 },
            "title": "Home",
            "description": "My place"
        })
    );
}

#[test]
fn payload_written_by_an_older_client_decodes() {
    let payload = br#"[
        {"coordinate":{"latitude":47.21855589547013,"longitude":38.918362567185625},
         "title":"Cafe","description":"Good coffee","id":1650000000000}
    ]"#;

    let markers = decode_markers(payload).unwrap();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].id, 1_650_000_000_000);
    assert_eq!(markers[0].coordinate.latitude, 47.218_555_895_470_13);
    assert_eq!(markers[0].title, "Cafe");
}

#[test]
fn encoded_collection_is_a_utf8_json_array() {
    let mut other = home();
    other.id += 1;
    other.title = "Работа".to_string();
    let bytes = encode_markers(&[home(), other.clone()]).unwrap();

    let text = std::str::from_utf8(&bytes).unwrap();
    assert!(text.starts_with('['));
    assert!(text.contains("Работа"));
    assert_eq!(decode_markers(&bytes).unwrap(), vec![home(), other]);
}

#[test]
fn decode_rejects_non_json_and_wrong_shape() {
    assert!(matches!(
        decode_markers(b"not json").unwrap_err(),
        CodecError::Json(_)
    ));
    assert!(matches!(
        decode_markers(br#"{"id":1}"#).unwrap_err(),
        CodecError::Json(_)
    ));
    assert!(matches!(
        decode_markers(br#"[{"id":1,"title":"a","description":"b"}]"#).unwrap_err(),
        CodecError::Json(_)
    ));
}

#[test]
fn decode_rejects_blank_persisted_fields() {
    let payload = serde_json::json!([{
        "id": 5,
        "coordinate": { "latitude": 1.0, "longitude": 2.0 },
        "title": "   ",
        "description": "x"
    }]);
    let bytes = serde_json::to_vec(&payload).unwrap();

    let err = decode_markers(&bytes).unwrap_err();
    assert!(matches!(
        err,
        CodecError::InvalidMarker {
            id: 5,
            reason: MarkerValidationError::EmptyTitle
        }
    ));
}

#[test]
fn validate_accepts_stored_marker_and_rejects_blank_description() {
    let mut marker = home();
    marker.validate().unwrap();

    marker.description = "\n".to_string();
    assert_eq!(
        marker.validate().unwrap_err(),
        MarkerValidationError::EmptyDescription
    );
}

#[test]
fn validation_messages_are_user_facing() {
    assert_eq!(
        MarkerValidationError::EmptyTitle.to_string(),
        "title must not be empty"
    );
    assert_eq!(
        MarkerValidationError::EmptyDescription.to_string(),
        "description must not be empty"
    );
}
