use std::borrow::Cow;

use super::{i32_from_slice, Iter, RawArray, RawBinaryRef, RawBsonRef, RawDocumentBuf, RawElement, RawRegexRef};
use crate::{
    datetime::Timestamp,
    error::{Error, Result},
    oid::ObjectId,
    DateTime,
};

/// A slice of a BSON document (akin to [`std::str`]). This can be created from a
/// [`RawDocumentBuf`] or any type containing valid BSON data, including static binary literals,
/// [`Vec<u8>`](std::vec::Vec), or arrays.
///
/// This is an _unsized_ type, meaning that it must always be used behind a pointer like `&`. For an
/// owned version of this type, see [`RawDocumentBuf`].
///
/// Accessing elements within a [`RawDocument`] is similar to element access in a decoded document
/// tree, but because the contents are parsed during iteration instead of at creation time, format
/// errors can happen at any time during use.
///
/// Individual elements can be accessed using [`RawDocument::get`] or any of the type-specific
/// getters, such as [`RawDocument::get_object_id`] or [`RawDocument::get_str`]. Note that
/// accessing elements is an O(N) operation, as it requires iterating through the document from the
/// beginning to find the requested key.
#[derive(PartialEq)]
#[repr(transparent)]
pub struct RawDocument {
    data: [u8],
}

impl RawDocument {
    /// Constructs a new [`RawDocument`], validating _only_ the
    /// following invariants:
    ///   * `data` is at least five bytes long (the minimum for a valid BSON document)
    ///   * the initial four bytes of `data` accurately represent the length of the bytes as
    ///     required by the BSON spec.
    ///   * the last byte of `data` is a 0
    ///
    /// Note that the internal structure of the bytes representing the BSON elements is _not_
    /// validated at all by this method. If the bytes do not conform to the BSON spec, then method
    /// calls on the [`RawDocument`] will return Errors where appropriate.
    pub fn from_bytes<D: AsRef<[u8]> + ?Sized>(data: &D) -> Result<&RawDocument> {
        let data = data.as_ref();

        if data.len() < 5 {
            return Err(Error::invalid_document_size(5, data.len()));
        }

        let length = i32_from_slice(data)?;

        if length < 0 || data.len() != length as usize {
            return Err(Error::invalid_document_size(
                length.max(0) as usize,
                data.len(),
            ));
        }

        if data[data.len() - 1] != 0 {
            return Err(Error::invalid_document_size(length as usize, data.len()));
        }

        Ok(RawDocument::from_bytes_unchecked(data))
    }

    /// Creates a new [`RawDocument`] referencing the provided data slice.
    pub(crate) fn from_bytes_unchecked<D: AsRef<[u8]> + ?Sized>(data: &D) -> &RawDocument {
        // SAFETY:
        //
        // Dereferencing a raw pointer requires unsafe due to the potential that the pointer is
        // null, dangling, or misaligned. We know the pointer is not null or dangling due to the
        // fact that it's created by a safe reference. Converting &[u8] to *const [u8] will be
        // properly aligned due to them being references to the same type, and converting *const
        // [u8] to *const RawDocument is aligned due to the fact that the only field in a
        // RawDocument is a [u8] and it is #[repr(transparent)], meaning the structs are
        // represented identically at the byte level.
        unsafe { &*(data.as_ref() as *const [u8] as *const RawDocument) }
    }

    /// Creates a new [`RawDocumentBuf`] with an owned copy of this document's bytes.
    pub fn to_raw_document_buf(&self) -> RawDocumentBuf {
        // unwrap is ok here because the bytes were already verified in from_bytes
        RawDocumentBuf::from_bytes(self.data.to_vec()).unwrap()
    }

    /// Gets an iterator over the elements in the document.
    pub fn iter(&self) -> Iter<'_> {
        self.into_iter()
    }

    /// Gets the element with the given key by iterating until the key is found, returning
    /// `Ok(None)` if no element matches.
    pub fn get(&self, key: impl AsRef<str>) -> Result<Option<RawElement<'_>>> {
        for result in self.into_iter() {
            let elem = result?;
            if key.as_ref() == elem.name() {
                return Ok(Some(elem));
            }
        }
        Ok(None)
    }

    fn get_with<'a, T>(
        &'a self,
        key: impl AsRef<str>,
        f: impl FnOnce(&RawElement<'a>) -> Result<T>,
    ) -> Result<Option<T>> {
        match self.get(key)? {
            Some(elem) => Ok(Some(f(&elem)?)),
            None => Ok(None),
        }
    }

    /// Gets the BSON double with the given key, failing if the value is another type.
    pub fn get_f64(&self, key: impl AsRef<str>) -> Result<Option<f64>> {
        self.get_with(key, RawElement::as_f64)
    }

    /// Gets the string with the given key, failing if the value is another type.
    pub fn get_str(&self, key: impl AsRef<str>) -> Result<Option<&'_ str>> {
        self.get_with(key, RawElement::as_str)
    }

    /// Gets the embedded document with the given key, failing if the value is another type.
    pub fn get_document(&self, key: impl AsRef<str>) -> Result<Option<&'_ RawDocument>> {
        self.get_with(key, RawElement::as_document)
    }

    /// Gets the array with the given key, failing if the value is another type.
    pub fn get_array(&self, key: impl AsRef<str>) -> Result<Option<&'_ RawArray>> {
        self.get_with(key, RawElement::as_array)
    }

    /// Gets the binary value with the given key, failing if the value is another type.
    pub fn get_binary(&self, key: impl AsRef<str>) -> Result<Option<RawBinaryRef<'_>>> {
        self.get_with(key, RawElement::as_binary)
    }

    /// Gets the ObjectId with the given key, failing if the value is another type.
    pub fn get_object_id(&self, key: impl AsRef<str>) -> Result<Option<ObjectId>> {
        self.get_with(key, RawElement::as_object_id)
    }

    /// Gets the boolean with the given key, failing if the value is another type.
    pub fn get_bool(&self, key: impl AsRef<str>) -> Result<Option<bool>> {
        self.get_with(key, RawElement::as_bool)
    }

    /// Gets the datetime with the given key, failing if the value is another type.
    pub fn get_datetime(&self, key: impl AsRef<str>) -> Result<Option<DateTime>> {
        self.get_with(key, RawElement::as_datetime)
    }

    /// Gets the regex with the given key, failing if the value is another type.
    pub fn get_regex(&self, key: impl AsRef<str>) -> Result<Option<RawRegexRef<'_>>> {
        self.get_with(key, RawElement::as_regex)
    }

    /// Gets the timestamp with the given key, failing if the value is another type.
    pub fn get_timestamp(&self, key: impl AsRef<str>) -> Result<Option<Timestamp>> {
        self.get_with(key, RawElement::as_timestamp)
    }

    /// Gets the i32 with the given key, failing if the value is another type.
    pub fn get_i32(&self, key: impl AsRef<str>) -> Result<Option<i32>> {
        self.get_with(key, RawElement::as_i32)
    }

    /// Gets the i64 with the given key, failing if the value is another type.
    pub fn get_i64(&self, key: impl AsRef<str>) -> Result<Option<i64>> {
        self.get_with(key, RawElement::as_i64)
    }

    /// Counts the elements in the document. This requires a full pass.
    pub fn element_count(&self) -> Result<usize> {
        let mut count = 0;
        for result in self.iter() {
            result?;
            count += 1;
        }
        Ok(count)
    }

    /// Whether the document contains no elements.
    pub fn is_empty(&self) -> bool {
        self.data.len() == 5
    }

    /// The total byte length of the document recorded in its length prefix.
    pub fn byte_size(&self) -> usize {
        self.data.len()
    }

    /// Performs a full structural validation: every element (and every element
    /// of every embedded document) must parse and decode end-to-end.
    pub fn validate(&self) -> Result<()> {
        for result in self.iter() {
            let elem = result?;
            match elem.value()? {
                RawBsonRef::Document(doc) => doc.validate()?,
                RawBsonRef::Array(arr) => arr.as_doc().validate()?,
                RawBsonRef::JavaScriptCodeWithScope(c_w_s) => c_w_s.scope.validate()?,
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns a reference to the contained data as a `&[u8]`.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl std::fmt::Debug for RawDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawDocument")
            .field("data", &hex::encode(&self.data))
            .finish()
    }
}

impl AsRef<RawDocument> for RawDocument {
    fn as_ref(&self) -> &RawDocument {
        self
    }
}

impl ToOwned for RawDocument {
    type Owned = RawDocumentBuf;

    fn to_owned(&self) -> Self::Owned {
        self.to_raw_document_buf()
    }
}

impl<'a> From<&'a RawDocument> for Cow<'a, RawDocument> {
    fn from(rdr: &'a RawDocument) -> Self {
        Cow::Borrowed(rdr)
    }
}

impl<'a> IntoIterator for &'a RawDocument {
    type IntoIter = Iter<'a>;
    type Item = Result<RawElement<'a>>;

    fn into_iter(self) -> Iter<'a> {
        Iter::new(self)
    }
}
