//! Conversion between JSON text and BSON bytes.
//!
//! The reader materialises a full document: JSON text is parsed (UTF-16 and
//! UTF-32 inputs are transcoded to UTF-8 first), and each value is encoded
//! straight into BSON bytes. Integer literals become int32 when they fit and
//! int64 otherwise; any fractional or exponent form becomes a double.
//!
//! The writer emits canonical UTF-8 JSON with no whitespace. BSON types with
//! no JSON counterpart use their conventional `$`-keyed object forms
//! (`$oid`, `$date`, `$binary`, `$regex`, ...), and the reader accepts every
//! form the writer emits.
//!
//! ```
//! use bsonpath::json;
//!
//! let doc = json::from_str(r#"{"a":1,"b":[true,null]}"#)?;
//! assert_eq!(json::to_string(&doc)?, r#"{"a":1,"b":[true,null]}"#);
//! # Ok::<(), bsonpath::error::Error>(())
//! ```

mod models;
mod reader;
mod writer;

pub use self::{
    reader::{array_from_str, array_from_utf16, array_from_utf32, from_str, from_utf16, from_utf32},
    writer::{array_to_string, to_string},
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ErrorKind,
        raw::RawBsonRef,
        rawdoc,
        spec::{BinarySubtype, ElementType},
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn document_shapes() {
        let doc = from_str(r#"{"a":1,"b":[true,null]}"#).unwrap();

        assert_eq!(doc.get_i32("a").unwrap(), Some(1));
        let arr = doc.get_array("b").unwrap().unwrap();
        assert_eq!(arr.get_bool(0).unwrap(), Some(true));
        assert_eq!(arr.get(1).unwrap(), Some(RawBsonRef::Null));
        assert_eq!(arr.element_count().unwrap(), 2);
    }

    #[test]
    fn numbers_choose_narrowest_integer() {
        let doc = from_str(r#"{"i":7,"big":3000000000,"d":1.5,"e":1e2,"neg":-2147483649}"#).unwrap();
        assert_eq!(doc.get_i32("i").unwrap(), Some(7));
        assert_eq!(doc.get_i64("big").unwrap(), Some(3_000_000_000));
        assert_eq!(doc.get_f64("d").unwrap(), Some(1.5));
        assert_eq!(doc.get_f64("e").unwrap(), Some(100.0));
        assert_eq!(doc.get_i64("neg").unwrap(), Some(-2_147_483_649));
    }

    #[test]
    fn integer_out_of_range_is_rejected() {
        let err = from_str(r#"{"x":18446744073709551615}"#).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::JsonParse { .. }));
    }

    #[test]
    fn lexical_errors_carry_positions() {
        let err = from_str("{\"a\":\n tru}").unwrap_err();
        match err.kind {
            ErrorKind::JsonParse { line, .. } => assert_eq!(line, 2),
            other => panic!("expected JsonParse, got {:?}", other),
        }
    }

    #[test]
    fn top_level_shape_is_enforced() {
        assert!(from_str("[1,2]").is_err());
        assert!(array_from_str("{}").is_err());
        assert!(array_from_str("[1,2]").is_ok());
    }

    #[test]
    fn escapes_round_trip() {
        let input = r#"{"s":"a\"b\\c\u0009d"}"#;
        let doc = from_str(input).unwrap();
        assert_eq!(doc.get_str("s").unwrap(), Some("a\"b\\c\td"));
        assert_eq!(to_string(&doc).unwrap(), input);
    }

    #[test]
    fn surrogate_pairs_combine() {
        let doc = from_str(r#"{"s":"😀"}"#).unwrap();
        assert_eq!(doc.get_str("s").unwrap(), Some("😀"));
    }

    #[test]
    fn utf16_and_utf32_inputs_transcode() {
        let text = r#"{"a":1}"#;
        let utf16: Vec<u16> = text.encode_utf16().collect();
        let utf32: Vec<u32> = text.chars().map(|c| c as u32).collect();

        assert_eq!(from_utf16(&utf16).unwrap(), from_str(text).unwrap());
        assert_eq!(from_utf32(&utf32).unwrap(), from_str(text).unwrap());

        // unpaired surrogate
        assert!(from_utf16(&[0x7B, 0xD800, 0x7D]).is_err());
        // out-of-range scalar
        assert!(from_utf32(&[0x7B, 0x11_0000, 0x7D]).is_err());
    }

    #[test]
    fn extended_types_round_trip() {
        let json = concat!(
            r#"{"id":{"$oid":"507f1f77bcf86cd799439011"},"#,
            r#""when":{"$date":"2014-03-01T10:15:00Z"},"#,
            r#""blob":{"$binary":"AQID","$type":"00"},"#,
            r#""pat":{"$regex":"^a.*","$options":"i"},"#,
            r#""ts":{"$timestamp":{"t":5,"i":2}},"#,
            r#""js":{"$code":"return 1;"},"#,
            r#""sym":{"$symbol":"legacy"},"#,
            r#""lo":{"$minKey":1},"hi":{"$maxKey":1}}"#,
        );
        let doc = from_str(json).unwrap();

        assert_eq!(
            doc.get_object_id("id").unwrap().unwrap().to_hex(),
            "507f1f77bcf86cd799439011"
        );
        let blob = doc.get_binary("blob").unwrap().unwrap();
        assert_eq!(blob.subtype, BinarySubtype::Generic);
        assert_eq!(blob.bytes, &[1, 2, 3]);
        let pat = doc.get_regex("pat").unwrap().unwrap();
        assert_eq!(pat.pattern, "^a.*");
        assert_eq!(pat.options, "i");

        assert_eq!(to_string(&doc).unwrap(), json);
    }

    #[test]
    fn far_dates_fall_back_to_millis() {
        let json = r#"{"d":{"$date":{"$numberLong":"-1000"}}}"#;
        let doc = from_str(json).unwrap();
        assert_eq!(
            doc.get_datetime("d").unwrap().unwrap().timestamp_millis(),
            -1000
        );
        assert_eq!(to_string(&doc).unwrap(), json);
    }

    #[test]
    fn non_finite_doubles_are_rejected_on_write() {
        let doc = rawdoc! { "bad": f64::NAN };
        let err = to_string(&doc).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::IncompatibleTypeConversion { .. }));

        let doc = rawdoc! { "bad": f64::INFINITY };
        assert!(to_string(&doc).is_err());
    }

    #[test]
    fn doubles_stay_distinguishable_from_integers() {
        let doc = rawdoc! { "d": 1.0, "i": 1_i32 };
        let json = to_string(&doc).unwrap();
        assert_eq!(json, r#"{"d":1.0,"i":1}"#);

        let back = from_str(&json).unwrap();
        assert_eq!(
            back.get("d").unwrap().unwrap().element_type(),
            ElementType::Double
        );
        assert_eq!(
            back.get("i").unwrap().unwrap().element_type(),
            ElementType::Int32
        );
    }

    #[test]
    fn undefined_writes_as_null() {
        let mut doc = crate::raw::RawDocumentBuf::new();
        doc.append(crate::cstr!("u"), crate::raw::RawBson::Undefined);
        assert_eq!(to_string(&doc).unwrap(), r#"{"u":null}"#);
    }

    #[test]
    fn trailing_garbage_is_fatal() {
        assert!(from_str(r#"{"a":1} extra"#).is_err());
        assert!(from_str(r#"{"a":1,}"#).is_err());
    }
}
