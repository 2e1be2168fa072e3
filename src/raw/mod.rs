//! An API for interacting with BSON bytes in place.
//!
//! Documents and elements in this module never deserialize into an
//! intermediate tree: a [`RawDocument`] is a thin view over a byte slice, and
//! its contents are parsed lazily as they are iterated or accessed. The
//! owning counterpart [`RawDocumentBuf`] adds appending and in-place editing
//! while keeping the same byte-level representation.
//!
//! ```
//! use bsonpath::raw::RawDocument;
//!
//! let bytes = b"\x13\x00\x00\x00\x02hi\x00\x06\x00\x00\x00y'all\x00\x00";
//! let doc = RawDocument::from_bytes(bytes)?;
//! assert_eq!(doc.get_str("hi")?, Some("y'all"));
//! # Ok::<(), bsonpath::error::Error>(())
//! ```

mod array;
mod bson;
mod bson_ref;
mod cstr;
mod document;
mod document_buf;
mod elem;
mod iter;
#[cfg(test)]
mod test;

pub use self::{
    array::{RawArray, RawArrayBuf, RawArrayIter},
    bson::{Binary, DbPointer, RawBson, RawJavaScriptCodeWithScope, Regex},
    bson_ref::{
        RawBinaryRef,
        RawBsonRef,
        RawDbPointerRef,
        RawJavaScriptCodeWithScopeRef,
        RawRegexRef,
    },
    cstr::{assert_valid_cstr, cstr, validate_cstr, CStr, CString, IsValidCStr},
    document::RawDocument,
    document_buf::RawDocumentBuf,
    elem::{RawElement, RawElementBuf},
    iter::Iter,
};

use crate::error::{Error, Result};

pub(crate) const MIN_BSON_DOCUMENT_SIZE: i32 = 4 + 1; // length prefix + trailing NUL
pub(crate) const MIN_CODE_WITH_SCOPE_SIZE: i32 = 4 + 4 + 1 + MIN_BSON_DOCUMENT_SIZE;

/// Read a little-endian i32 from the front of the slice.
pub(crate) fn i32_from_slice(val: &[u8]) -> Result<i32> {
    let arr = val
        .get(..4)
        .and_then(|s| <[u8; 4]>::try_from(s).ok())
        .ok_or_else(|| Error::invalid_element_size(4, val.len()))?;
    Ok(i32::from_le_bytes(arr))
}

/// Read a little-endian i64 from the front of the slice.
pub(crate) fn i64_from_slice(val: &[u8]) -> Result<i64> {
    let arr = val
        .get(..8)
        .and_then(|s| <[u8; 8]>::try_from(s).ok())
        .ok_or_else(|| Error::invalid_element_size(8, val.len()))?;
    Ok(i64::from_le_bytes(arr))
}

/// Read a little-endian IEEE-754 double from the front of the slice.
pub(crate) fn f64_from_slice(val: &[u8]) -> Result<f64> {
    let arr = val
        .get(..8)
        .and_then(|s| <[u8; 8]>::try_from(s).ok())
        .ok_or_else(|| Error::invalid_element_size(8, val.len()))?;
    Ok(f64::from_le_bytes(arr))
}

/// Read a boolean byte, rejecting anything other than 0 or 1.
pub(crate) fn read_bool(val: &[u8]) -> Result<bool> {
    match val.first() {
        Some(0) => Ok(false),
        Some(1) => Ok(true),
        Some(b) => Err(Error::incompatible_type_conversion(format!(
            "boolean must be stored as 0 or 1, found {}",
            b
        ))),
        None => Err(Error::invalid_element_size(1, 0)),
    }
}

/// Read a NUL-terminated UTF-8 string from the front of the slice.
pub(crate) fn read_nullterminated(buf: &[u8]) -> Result<&str> {
    let mut splits = buf.splitn(2, |x| *x == 0);
    let value = splits
        .next()
        .ok_or_else(|| Error::invalid_element_size(1, 0))?;
    if splits.next().is_some() {
        try_to_str(value)
    } else {
        // no NUL before the end of the buffer
        Err(Error::invalid_element_size(buf.len() + 1, buf.len()))
    }
}

/// Read a length-prefixed UTF-8 string (prefix counts the trailing NUL) from
/// the front of the slice.
pub(crate) fn read_lenencoded(buf: &[u8]) -> Result<&str> {
    let length = i32_from_slice(buf)?;
    if length < 1 {
        return Err(Error::invalid_element_size(1, length.max(0) as usize));
    }
    let end = checked_add(4, length as usize)?;
    if buf.len() < end {
        return Err(Error::invalid_element_size(end, buf.len()));
    }
    if buf[end - 1] != 0 {
        return Err(Error::invalid_element_size(end, end - 1));
    }
    try_to_str(&buf[4..end - 1])
}

pub(crate) fn try_to_str(data: &[u8]) -> Result<&str> {
    std::str::from_utf8(data).map_err(|_| crate::error::ErrorKind::Utf8Encoding.into())
}

/// Append a NUL-terminated string.
pub(crate) fn write_cstring(buf: &mut Vec<u8>, s: &CStr) {
    s.append_to(buf);
}

/// Append a length-prefixed string (prefix counts the trailing NUL).
pub(crate) fn write_string(buf: &mut Vec<u8>, s: &str) {
    buf.extend(((s.len() + 1) as i32).to_le_bytes());
    buf.extend(s.as_bytes());
    buf.push(0);
}

pub(crate) fn checked_add(lhs: usize, rhs: usize) -> Result<usize> {
    lhs.checked_add(rhs)
        .ok_or_else(|| Error::invalid_document_size(usize::MAX, lhs))
}
