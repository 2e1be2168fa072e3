//! Cross-module scenarios exercising the document model, the JSON codec, and
//! path selection together.

use crate::{
    builder::DocumentBuilder,
    cstr,
    json,
    path::path_select,
    rawdoc,
    spec::ElementType,
    RawDocumentBuf,
    RawElementBuf,
};
use pretty_assertions::assert_eq;

#[test]
fn builder_output_survives_json_and_selection() {
    let doc = DocumentBuilder::new()
        .append(cstr!("store"), rawdoc! { "book": [ { "price": 10_i32 }, { "price": 20_i32 } ] })
        .build();

    let text = json::to_string(&doc).unwrap();
    assert_eq!(text, r#"{"store":{"book":[{"price":10},{"price":20}]}}"#);

    let reread = json::from_str(&text).unwrap();
    assert_eq!(reread.as_bytes(), doc.as_bytes());

    let matches = path_select(&reread, "$.store.book[?(@.price<15)].price").unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].as_i32().unwrap(), 10);

    let all_prices = path_select(&reread, "$..price").unwrap();
    let prices: Vec<i32> = all_prices.iter().map(|e| e.as_i32().unwrap()).collect();
    assert_eq!(prices, vec![10, 20]);
}

#[test]
fn json_canonical_round_trip() {
    let inputs = [
        r#"{"a":1,"b":[true,null]}"#,
        r#"{"nested":{"deep":{"deeper":[1,2,3]}}}"#,
        r#"{"unicode":"héllo wörld","digits":[0,-1,2147483648]}"#,
        r#"{"empty_doc":{},"empty_arr":[]}"#,
    ];
    for input in inputs {
        let doc = json::from_str(input).unwrap();
        assert_eq!(json::to_string(&doc).unwrap(), input, "for input {}", input);
    }
}

#[test]
fn scenario_bytes_from_spec_examples() {
    // {"hello": "world"} as a single string element
    let elem = RawElementBuf::new(cstr!("hello"), "world").unwrap();
    assert_eq!(
        elem.as_bytes(),
        b"\x02hello\x00\x06\x00\x00\x00world\x00"
    );

    // builder scenario: ("n", 1), ("s", "x")
    let doc = DocumentBuilder::new()
        .append(cstr!("n"), 1_i32)
        .append(cstr!("s"), "x")
        .build();
    assert_eq!(doc.as_bytes()[0], 0x15);
    assert_eq!(doc.byte_size(), 21);
}

#[test]
fn selection_does_not_allocate_new_documents() {
    // matched elements borrow the original buffer
    let doc = rawdoc! { "a": { "x": 1_i32 } };
    let matches = path_select(&doc, "$.a.x").unwrap();
    let base = doc.as_bytes().as_ptr() as usize;
    let elem_ptr = matches[0].as_bytes().as_ptr() as usize;
    assert!(elem_ptr > base && elem_ptr < base + doc.byte_size());
}

#[test]
fn mutation_keeps_documents_selectable() {
    let mut doc = rawdoc! { "a": 1_i32, "b": { "c": 2_i32 } };
    doc.replace("a", "changed").unwrap();
    doc.validate().unwrap();

    assert_eq!(path_select(&doc, "$.b.c").unwrap()[0].as_i32().unwrap(), 2);
    assert_eq!(doc.get_str("a").unwrap(), Some("changed"));
}

#[test]
fn empty_document_behaviour() {
    let doc = RawDocumentBuf::new();
    assert!(doc.is_empty());
    assert_eq!(doc.element_count().unwrap(), 0);
    assert_eq!(json::to_string(&doc).unwrap(), "{}");
    assert!(path_select(&doc, "$.anything").unwrap().is_empty());
    assert!(path_select(&doc, "$..anything").unwrap().is_empty());
}

#[test]
fn deeply_nested_selection() {
    let doc = json::from_str(
        r#"{"l1":{"l2":{"l3":{"l4":{"target":42}}}}}"#,
    )
    .unwrap();
    let matches = path_select(&doc, "$.l1.l2.l3.l4.target").unwrap();
    assert_eq!(matches[0].as_i32().unwrap(), 42);

    let recursive = path_select(&doc, "$..target").unwrap();
    assert_eq!(recursive.len(), 1);
    assert_eq!(recursive[0].as_i32().unwrap(), 42);
}

#[test]
fn wildcard_and_union_combinations() {
    let doc = json::from_str(
        r#"{"store":{"book":[{"t":"a"},{"t":"b"}],"bicycle":{"t":"c"}}}"#,
    )
    .unwrap();

    // every immediate child of store, then every t beneath
    let matches = path_select(&doc, "$.store.*..t").unwrap();
    let titles: Vec<&str> = matches.iter().map(|e| e.as_str().unwrap()).collect();
    assert_eq!(titles, vec!["a", "b", "c"]);

    let union = path_select(&doc, "$.store['book','bicycle']").unwrap();
    assert_eq!(union.len(), 2);
    assert_eq!(union[0].element_type(), ElementType::Array);
    assert_eq!(union[1].element_type(), ElementType::EmbeddedDocument);
}

#[test]
fn numeric_filters_against_mixed_documents() {
    let doc = json::from_str(
        r#"{"items":[{"n":1},{"n":5},{"x":"no n"},{"n":9}]}"#,
    )
    .unwrap();

    // children without the path short-circuit to false rather than erroring
    let matches = path_select(&doc, "$.items[?(@.n > 2)]").unwrap();
    assert_eq!(matches.len(), 2);
}

#[test]
fn arithmetic_in_filters() {
    let doc = json::from_str(r#"{"rows":[{"w":2,"h":3},{"w":4,"h":4}]}"#).unwrap();
    let matches = path_select(&doc, "$.rows[?(@.w * @.h == 16)]").unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].name(), "1");
}
