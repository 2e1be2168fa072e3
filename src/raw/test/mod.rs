mod props;

use super::*;
use crate::{cstr, rawdoc, spec::ElementType};
use pretty_assertions::assert_eq;

#[test]
fn string_from_document() {
    let rawdoc = rawdoc! {
        "this": "first",
        "that": "second",
        "something": "else",
    };
    assert_eq!(rawdoc.get_str("that").unwrap(), Some("second"));
}

#[test]
fn nested_document() {
    let rawdoc = rawdoc! {
        "outer": {
            "inner": "surprise",
            "i64": 6_i64,
        }
    };
    let subdoc = rawdoc
        .get_document("outer")
        .expect("get doc result")
        .expect("get doc option");
    assert_eq!(subdoc.get_str("inner").unwrap(), Some("surprise"));
    assert_eq!(subdoc.get_i64("i64").unwrap(), Some(6));
}

#[test]
fn iterate() {
    let rawdoc = rawdoc! {
        "apples": "oranges",
        "peanut butter": "chocolate",
        "easy as": { "do": 1_i32, "re": 2_i32, "mi": 3_i32 },
    };
    let mut iter = rawdoc.iter();
    let next = iter.next().unwrap().unwrap();
    assert_eq!(next.name(), "apples");
    assert_eq!(next.as_str().unwrap(), "oranges");
    let next = iter.next().unwrap().unwrap();
    assert_eq!(next.name(), "peanut butter");
    let next = iter.next().unwrap().unwrap();
    assert_eq!(next.name(), "easy as");
    assert_eq!(next.element_type(), ElementType::EmbeddedDocument);
    assert!(iter.next().is_none());
}

#[test]
fn document_header_invariants() {
    // too short
    assert!(RawDocument::from_bytes(b"\x04\x00\x00\x00")
        .unwrap_err()
        .is_invalid_document_size());
    // length prefix disagrees with the buffer
    assert!(RawDocument::from_bytes(b"\x06\x00\x00\x00\x00")
        .unwrap_err()
        .is_invalid_document_size());
    // missing trailing NUL
    assert!(RawDocument::from_bytes(b"\x05\x00\x00\x00\x01")
        .unwrap_err()
        .is_invalid_document_size());
    // minimal empty document
    let doc = RawDocument::from_bytes(b"\x05\x00\x00\x00\x00").unwrap();
    assert!(doc.is_empty());
    assert_eq!(doc.byte_size(), 5);
}

#[test]
fn parse_string_element() {
    let bytes = b"\x02hello\x00\x06\x00\x00\x00world\x00";
    let elem = RawElement::from_bytes(bytes).unwrap();
    assert_eq!(elem.name(), "hello");
    assert_eq!(elem.element_type(), ElementType::String);
    assert_eq!(elem.as_str().unwrap(), "world");
    assert_eq!(elem.size(), 18);
    assert_eq!(elem.size(), 1 + "hello".len() + 1 + elem.payload().len());
}

#[test]
fn typed_read_mismatch() {
    let bytes = b"\x02hello\x00\x06\x00\x00\x00world\x00";
    let elem = RawElement::from_bytes(bytes).unwrap();
    let err = elem.as_bool().unwrap_err();
    assert!(err.is_incompatible_element_conversion());
    assert_eq!(err.key.as_deref(), Some("hello"));
}

#[test]
fn unknown_tag_is_invalid_element_type() {
    let bytes = b"\x13name\x00\x01\x00\x00\x00";
    let err = RawElement::from_bytes(bytes).unwrap_err();
    assert!(err.is_invalid_element_type());

    let mut doc = rawdoc! { "a": 1_i32 }.into_vec();
    doc[4] = 0xDE;
    let doc = RawDocumentBuf::from_bytes(doc).unwrap();
    let err = doc.iter().next().unwrap().unwrap_err();
    assert!(err.is_invalid_element_type());
}

#[test]
fn element_size_must_match_exactly() {
    // declared string length overruns the element
    let bytes = b"\x02hi\x00\x0A\x00\x00\x00world\x00";
    assert!(RawElement::from_bytes(bytes).unwrap_err().is_invalid_element_size());

    // trailing bytes after the payload
    let bytes = b"\x08b\x00\x01\xFF";
    assert!(RawElement::from_bytes(bytes).is_err());
}

#[test]
fn retagging_preserves_payload_bytes() {
    let mut elem = RawElementBuf::new(cstr!("n"), 1_i32).unwrap();
    let payload: Vec<u8> = elem.as_raw_element().payload().to_vec();

    elem.set_element_type(ElementType::Int64);
    assert_eq!(elem.element_type(), ElementType::Int64);
    assert_eq!(elem.as_raw_element().payload(), payload.as_slice());

    // an int32 payload does not satisfy the int64 shape
    let err = elem.value().unwrap_err();
    assert!(err.is_invalid_element_size());

    // retagging back restores readability
    elem.set_element_type(ElementType::Int32);
    assert_eq!(elem.as_raw_element().as_i32().unwrap(), 1);

    assert!(elem.set_element_type_tag(0x42).unwrap_err().is_invalid_element_type());
}

#[test]
fn typed_construction_pins_the_tag() {
    let elem = RawElementBuf::new_with_type(cstr!("n"), 0x10, 5_i32).unwrap();
    assert_eq!(elem.element_type(), ElementType::Int32);

    // unknown tag
    let err = RawElementBuf::new_with_type(cstr!("n"), 0x42, 5_i32).unwrap_err();
    assert!(err.is_invalid_element_type());

    // shape does not fit the requested tag
    let err = RawElementBuf::new_with_type(cstr!("n"), 0x12, 5_i32).unwrap_err();
    assert!(matches!(
        err.kind,
        crate::error::ErrorKind::IncompatibleTypeConversion { .. }
    ));
}

#[test]
fn visit_passes_decoded_values() {
    let elem = RawElementBuf::new(cstr!("greeting"), "hello").unwrap();
    let seen = elem
        .as_raw_element()
        .visit(|name, element_type, value| {
            (name.to_string(), element_type, value.as_str().map(String::from))
        })
        .unwrap();
    assert_eq!(seen.0, "greeting");
    assert_eq!(seen.1, ElementType::String);
    assert_eq!(seen.2.as_deref(), Some("hello"));
}

#[test]
fn set_value_reencodes_and_retags() {
    let mut elem = RawElementBuf::new(cstr!("v"), 1_i32).unwrap();
    elem.set_value("text").unwrap();
    assert_eq!(elem.element_type(), ElementType::String);
    assert_eq!(elem.name(), "v");
    assert_eq!(elem.as_raw_element().as_str().unwrap(), "text");

    elem.set_value(true).unwrap();
    assert_eq!(elem.element_type(), ElementType::Boolean);
    assert_eq!(elem.size(), 1 + 1 + 1 + 1);
}

#[test]
fn set_name_rewrites_element() {
    let mut elem = RawElementBuf::new(cstr!("old"), "payload").unwrap();
    elem.set_name("renamed").unwrap();
    assert_eq!(elem.name(), "renamed");
    assert_eq!(elem.as_raw_element().as_str().unwrap(), "payload");
    assert_eq!(elem.size(), 1 + "renamed".len() + 1 + 4 + "payload".len() + 1);
}

#[test]
fn failed_mutations_leave_elements_untouched() {
    let mut elem = RawElementBuf::new(cstr!("key"), 7_i32).unwrap();
    let snapshot = elem.as_bytes().to_vec();

    assert!(elem.set_name("bad\0name").is_err());
    assert_eq!(elem.as_bytes(), snapshot.as_slice());

    assert_eq!(elem.name(), "key");
    assert_eq!(elem.element_type(), ElementType::Int32);
    assert_eq!(elem.size(), snapshot.len());
}

#[test]
fn element_equality_compares_name_type_and_payload() {
    let a = RawElementBuf::new(cstr!("x"), 1_i32).unwrap();
    let b = RawElementBuf::new(cstr!("x"), 1_i32).unwrap();
    let c = RawElementBuf::new(cstr!("y"), 1_i32).unwrap();
    let d = RawElementBuf::new(cstr!("x"), 2_i32).unwrap();
    let e = RawElementBuf::new(cstr!("x"), 1_i64).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_ne!(a, d);
    assert_ne!(a, e);
}

#[test]
fn duplicate_names_are_preserved() {
    let mut doc = RawDocumentBuf::new();
    doc.append(cstr!("a"), 1_i32);
    doc.append(cstr!("a"), 2_i32);

    // by-name lookup returns the first match
    assert_eq!(doc.get_i32("a").unwrap(), Some(1));

    // iteration observes both
    let values: Vec<i32> = doc.iter().map(|e| e.unwrap().as_i32().unwrap()).collect();
    assert_eq!(values, vec![1, 2]);
}

#[test]
fn replace_rewrites_in_place() {
    let mut doc = rawdoc! { "a": 1_i32, "b": "middle", "c": true };

    assert!(doc.replace("b", 9_i64).unwrap());
    assert_eq!(doc.get_i64("b").unwrap(), Some(9));
    assert_eq!(doc.get_i32("a").unwrap(), Some(1));
    assert_eq!(doc.get_bool("c").unwrap(), Some(true));
    assert_eq!(doc.byte_size(), doc.as_bytes().len());

    assert!(!doc.replace("missing", 0_i32).unwrap());
    doc.validate().unwrap();
}

#[test]
fn remove_drops_elements() {
    let mut doc = rawdoc! { "a": 1_i32, "b": 2_i32, "c": 3_i32 };
    assert!(doc.remove("b").unwrap());
    assert_eq!(doc.get("b").unwrap().map(|_| ()), None);
    assert_eq!(doc.element_count().unwrap(), 2);
    assert_eq!(doc.byte_size(), doc.as_bytes().len());
    doc.validate().unwrap();

    assert!(!doc.remove("b").unwrap());
}

#[test]
fn reader_writer_round_trip() {
    let doc = rawdoc! { "kind": "test", "n": 12_i32 };
    let mut bytes = Vec::new();
    doc.to_writer(&mut bytes).unwrap();
    assert_eq!(bytes, doc.as_bytes());

    let read = RawDocumentBuf::from_reader(bytes.as_slice()).unwrap();
    assert_eq!(read, doc);

    // truncated input
    assert!(RawDocumentBuf::from_reader(&bytes[..bytes.len() - 2]).is_err());
}

#[test]
fn from_elements_round_trips_documents() {
    let doc = rawdoc! { "a": 1_i32, "s": "x", "sub": { "inner": true } };
    let elements: Vec<RawElementBuf> = doc
        .iter()
        .map(|e| e.unwrap().to_raw_element_buf())
        .collect();
    let rebuilt = RawDocumentBuf::from_elements(elements).unwrap();
    assert_eq!(rebuilt.as_bytes(), doc.as_bytes());
}

#[test]
fn validate_catches_interior_corruption() {
    let mut bytes = rawdoc! { "s": "hello" }.into_vec();
    // corrupt the string's declared length
    bytes[7] = 0x7F;
    let doc = RawDocumentBuf::from_bytes(bytes).unwrap();
    assert!(doc.validate().is_err());
}

#[test]
fn array_element_names_are_indices() {
    let mut arr = RawArrayBuf::new();
    arr.push(1_i32);
    arr.push("two");
    arr.push(true);
    assert_eq!(arr.len(), 3);
    arr.validate().unwrap();

    assert_eq!(arr.get_i32(0).unwrap(), Some(1));
    assert_eq!(arr.get_str(1).unwrap(), Some("two"));
    assert_eq!(arr.get_bool(2).unwrap(), Some(true));
    assert_eq!(arr.get(3).unwrap(), None);
}
