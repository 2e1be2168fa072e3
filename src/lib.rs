//! BSON, short for Binary JSON, is a binary-encoded serialization of JSON-like documents.
//! Like JSON, BSON supports the embedding of documents and arrays within other documents
//! and arrays, and it extends JSON with types such as datetimes, 12-byte object ids, and
//! binary data.
//!
//! ```text
//! // JSON equivalent
//! {"hello": "world"}
//!
//! // BSON encoding
//! \x16\x00\x00\x00                   // total document size
//! \x02                               // 0x02 = type String
//! hello\x00                          // field name
//! \x06\x00\x00\x00world\x00          // field value
//! \x00                               // 0x00 = type EOO ('end of object')
//! ```
//!
//! This crate works with BSON bytes *in place*: a [`raw::RawDocument`] is a view over a
//! byte slice whose elements are parsed as they are accessed, and a
//! [`raw::RawDocumentBuf`] owns its buffer and supports appending and editing. On top of
//! that model sit three surfaces:
//!
//! * the [`builder`] module and the [`rawdoc!`]/[`rawarr!`]/[`rawbson!`] macros for
//!   constructing documents;
//! * the [`json`] module, converting JSON text (UTF-8, UTF-16, or UTF-32) to BSON bytes
//!   and back, with `$`-keyed object forms for the types JSON lacks;
//! * the [`path`] module, selecting elements by JSONPath-like path strings with embedded
//!   filter expressions.
//!
//! ```
//! use bsonpath::{json, path::path_select, rawdoc};
//!
//! let doc = rawdoc! {
//!     "store": { "book": [ { "price": 10_i32 }, { "price": 20_i32 } ] }
//! };
//!
//! let cheap = path_select(&doc, "$.store.book[?(@.price < 15)].price")?;
//! assert_eq!(cheap.len(), 1);
//! assert_eq!(cheap[0].as_i32()?, 10);
//!
//! assert_eq!(
//!     json::to_string(&doc)?,
//!     r#"{"store":{"book":[{"price":10},{"price":20}]}}"#,
//! );
//! # Ok::<(), bsonpath::error::Error>(())
//! ```
//!
//! For more information about the encoding itself, see [bsonspec.org](http://bsonspec.org).

#[doc(inline)]
pub use self::{
    datetime::{DateTime, Timestamp},
    oid::ObjectId,
    raw::{
        RawArray,
        RawArrayBuf,
        RawBinaryRef,
        RawBson,
        RawBsonRef,
        RawDbPointerRef,
        RawDocument,
        RawDocumentBuf,
        RawElement,
        RawElementBuf,
        RawJavaScriptCodeWithScope,
        RawJavaScriptCodeWithScopeRef,
        RawRegexRef,
    },
};

#[macro_use]
mod macros;
mod base64;
pub mod builder;
pub mod datetime;
pub mod error;
pub mod json;
pub mod oid;
pub mod path;
pub mod raw;
pub mod spec;

#[cfg(test)]
mod tests;
