//! Fluent construction of documents and arrays.
//!
//! A builder accumulates elements into its own buffer; finalisation appends
//! the trailing NUL and patches the length prefix.
//!
//! ```
//! use bsonpath::{builder::DocumentBuilder, cstr};
//!
//! let doc = DocumentBuilder::new()
//!     .append(cstr!("n"), 1_i32)
//!     .append(cstr!("s"), "x")
//!     .build();
//! assert_eq!(doc.get_i32("n")?, Some(1));
//! # Ok::<(), bsonpath::error::Error>(())
//! ```

use crate::raw::{CStr, RawArrayBuf, RawBson, RawDocumentBuf};

/// A fluent builder for a BSON document. Each [`append`](DocumentBuilder::append) consumes the
/// builder and returns it, and [`build`](DocumentBuilder::build) consumes it for good.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    doc: RawDocumentBuf,
}

impl DocumentBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            doc: RawDocumentBuf::new(),
        }
    }

    /// Appends one element.
    pub fn append(mut self, key: impl AsRef<CStr>, value: impl Into<RawBson>) -> Self {
        self.doc.append(key, value);
        self
    }

    /// Finalises the builder into a document.
    pub fn build(self) -> RawDocumentBuf {
        self.doc
    }
}

impl From<DocumentBuilder> for RawBson {
    fn from(builder: DocumentBuilder) -> Self {
        RawBson::Document(builder.build())
    }
}

/// A fluent builder for a BSON array; element names are synthesised as ascending decimal strings
/// starting at "0".
#[derive(Debug, Default)]
pub struct ArrayBuilder {
    arr: RawArrayBuf,
}

impl ArrayBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            arr: RawArrayBuf::new(),
        }
    }

    /// Appends one value.
    pub fn push(mut self, value: impl Into<RawBson>) -> Self {
        self.arr.push(value);
        self
    }

    /// Finalises the builder into an array.
    pub fn build(self) -> RawArrayBuf {
        self.arr
    }
}

impl From<ArrayBuilder> for RawBson {
    fn from(builder: ArrayBuilder) -> Self {
        RawBson::Array(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cstr;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_bytes_match_wire_format() {
        let doc = DocumentBuilder::new()
            .append(cstr!("n"), 1_i32)
            .append(cstr!("s"), "x")
            .build();
        let expected: &[u8] = &[
            0x15, 0x00, 0x00, 0x00, // total length = 21
            0x10, b'n', 0x00, 0x01, 0x00, 0x00, 0x00, // "n": int32 1
            0x02, b's', 0x00, 0x02, 0x00, 0x00, 0x00, b'x', 0x00, // "s": "x"
            0x00, // terminator
        ];
        assert_eq!(doc.as_bytes(), expected);
    }

    #[test]
    fn empty_builder_is_minimal_document() {
        let doc = DocumentBuilder::new().build();
        assert_eq!(doc.as_bytes(), &[5, 0, 0, 0, 0]);
    }

    #[test]
    fn nested_builders_embed_as_documents() {
        let doc = DocumentBuilder::new()
            .append(
                cstr!("sub"),
                DocumentBuilder::new().append(cstr!("x"), true),
            )
            .append(cstr!("arr"), ArrayBuilder::new().push(1_i32).push(2_i32))
            .build();

        let sub = doc.get_document("sub").unwrap().unwrap();
        assert_eq!(sub.get_bool("x").unwrap(), Some(true));

        let arr = doc.get_array("arr").unwrap().unwrap();
        assert_eq!(arr.get_i32(0).unwrap(), Some(1));
        assert_eq!(arr.get_i32(1).unwrap(), Some(2));
        assert_eq!(arr.get_i32(2).unwrap(), None);
    }

    #[test]
    fn array_builder_synthesises_decimal_keys() {
        let arr = ArrayBuilder::new().push("a").push("b").build();
        let keys: Vec<String> = arr
            .as_doc()
            .iter()
            .map(|e| e.unwrap().name().to_string())
            .collect();
        assert_eq!(keys, vec!["0", "1"]);
    }
}
