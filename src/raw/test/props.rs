use proptest::prelude::*;

use crate::{
    datetime::Timestamp,
    oid::ObjectId,
    raw::{
        Binary,
        CString,
        RawArrayBuf,
        RawBson,
        RawDocumentBuf,
        RawElementBuf,
        RawJavaScriptCodeWithScope,
        Regex,
    },
    spec::BinarySubtype,
    DateTime,
};

fn arbitrary_binary_subtype() -> impl Strategy<Value = BinarySubtype> {
    prop_oneof![
        Just(BinarySubtype::Generic),
        Just(BinarySubtype::Function),
        Just(BinarySubtype::BinaryOld),
        Just(BinarySubtype::UuidOld),
        Just(BinarySubtype::Uuid),
        Just(BinarySubtype::Md5),
    ]
}

fn arbitrary_cstring() -> impl Strategy<Value = CString> {
    "[^\0]*".prop_map(|s| CString::try_from(s).unwrap())
}

fn arbitrary_raw_bson() -> impl Strategy<Value = RawBson> {
    let scalars = prop_oneof![
        Just(RawBson::Null),
        Just(RawBson::Undefined),
        Just(RawBson::MinKey),
        Just(RawBson::MaxKey),
        any::<String>().prop_map(RawBson::String),
        any::<bool>().prop_map(RawBson::Boolean),
        any::<f64>().prop_map(RawBson::Double),
        any::<i32>().prop_map(RawBson::Int32),
        any::<i64>().prop_map(RawBson::Int64),
    ];
    let extended = prop_oneof![
        any::<i64>().prop_map(|ms| RawBson::DateTime(DateTime::from_millis(ms))),
        any::<(u32, u32)>().prop_map(|(time, increment)| {
            RawBson::Timestamp(Timestamp { time, increment })
        }),
        any::<[u8; 12]>().prop_map(|bytes| RawBson::ObjectId(ObjectId::from_bytes(bytes))),
        (arbitrary_cstring(), arbitrary_cstring()).prop_map(|(pattern, options)| {
            RawBson::RegularExpression(Regex { pattern, options })
        }),
        any::<String>().prop_map(RawBson::JavaScriptCode),
        any::<String>().prop_map(RawBson::Symbol),
        (arbitrary_binary_subtype(), any::<Vec<u8>>()).prop_map(|(subtype, bytes)| {
            let bytes = if let BinarySubtype::BinaryOld = subtype {
                // the deprecated subtype wraps the payload in a second length prefix
                let mut newbytes = Vec::with_capacity(bytes.len() + 4);
                newbytes.extend_from_slice(&(bytes.len() as i32).to_le_bytes());
                newbytes.extend_from_slice(&bytes);
                newbytes
            } else {
                bytes
            };
            RawBson::Binary(Binary { subtype, bytes })
        }),
    ];
    let leaf = prop_oneof![scalars, extended];

    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec((arbitrary_cstring(), inner.clone()), 0..8)
                .prop_map(document_from_pairs)
                .prop_map(RawBson::Document),
            prop::collection::vec(inner.clone(), 0..8).prop_map(|values| {
                let mut arr = RawArrayBuf::new();
                for value in values {
                    arr.push(value);
                }
                RawBson::Array(arr)
            }),
            (
                prop::collection::vec((arbitrary_cstring(), inner), 0..8),
                any::<String>()
            )
                .prop_map(|(scope, code)| {
                    RawBson::JavaScriptCodeWithScope(RawJavaScriptCodeWithScope {
                        code,
                        scope: document_from_pairs(scope),
                    })
                }),
        ]
    })
}

fn document_from_pairs(pairs: Vec<(CString, RawBson)>) -> RawDocumentBuf {
    let mut doc = RawDocumentBuf::new();
    for (key, value) in pairs {
        doc.append(key, value);
    }
    doc
}

fn arbitrary_document() -> impl Strategy<Value = RawDocumentBuf> {
    prop::collection::vec((arbitrary_cstring(), arbitrary_raw_bson()), 0..8)
        .prop_map(document_from_pairs)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn serialised_documents_reparse_byte_for_byte(doc in arbitrary_document()) {
        let bytes = doc.clone().into_vec();
        let reparsed = RawDocumentBuf::from_bytes(bytes.clone()).unwrap();
        prop_assert_eq!(&reparsed, &doc);
        reparsed.validate().unwrap();

        let elements: Vec<RawElementBuf> = reparsed
            .iter()
            .map(|e| e.unwrap().to_raw_element_buf())
            .collect();
        let rebuilt = RawDocumentBuf::from_elements(elements).unwrap();
        prop_assert_eq!(rebuilt.as_bytes(), bytes.as_slice());
    }

    #[test]
    fn element_size_law_holds(doc in arbitrary_document()) {
        for result in doc.iter() {
            let elem = result.unwrap();
            prop_assert_eq!(
                elem.size(),
                1 + elem.name().len() + 1 + elem.payload().len()
            );
        }
    }

    #[test]
    fn length_prefix_matches_serialised_length(doc in arbitrary_document()) {
        prop_assert_eq!(doc.byte_size(), doc.as_bytes().len());
    }
}
