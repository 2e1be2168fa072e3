use std::{borrow::Cow, ops::Deref};

use super::{Iter, RawBinaryRef, RawBson, RawBsonRef, RawDocument, RawDocumentBuf, RawElement};
use crate::{
    error::{Error, Result},
    oid::ObjectId,
    DateTime,
};

/// A slice of a BSON array: a document whose element names are the decimal
/// representations of their zero-based indices.
///
/// This is an _unsized_ type, meaning that it must always be used behind a pointer like `&`. For
/// an owned version of this type, see [`RawArrayBuf`].
#[derive(PartialEq)]
#[repr(transparent)]
pub struct RawArray {
    doc: RawDocument,
}

impl RawArray {
    pub(crate) fn from_doc(doc: &RawDocument) -> &RawArray {
        // SAFETY:
        //
        // Dereferencing a raw pointer requires unsafe due to the potential that the pointer is
        // null, dangling, or misaligned. We know the pointer is not null or dangling due to the
        // fact that it's created by a safe reference. Converting &RawDocument to *const
        // RawDocument will be properly aligned due to them being references to the same type, and
        // converting *const RawDocument to *const RawArray is aligned due to the fact that the
        // only field in a RawArray is a RawDocument and it is #[repr(transparent)], meaning the
        // structs are represented identically at the byte level.
        unsafe { &*(doc as *const RawDocument as *const RawArray) }
    }

    /// Constructs a new [`RawArray`] from the provided bytes, validating the document header
    /// invariants only.
    pub fn from_bytes<D: AsRef<[u8]> + ?Sized>(data: &D) -> Result<&RawArray> {
        Ok(RawArray::from_doc(RawDocument::from_bytes(data)?))
    }

    /// The document underlying this array.
    pub fn as_doc(&self) -> &RawDocument {
        &self.doc
    }

    /// Gets the value at the given index.
    pub fn get(&self, index: usize) -> Result<Option<RawBsonRef<'_>>> {
        match self.doc.get(itoa(index))? {
            Some(elem) => Ok(Some(elem.value()?)),
            None => Ok(None),
        }
    }

    fn get_with<'a, T>(
        &'a self,
        index: usize,
        f: impl FnOnce(&RawElement<'a>) -> Result<T>,
    ) -> Result<Option<T>> {
        match self.doc.get(itoa(index))? {
            Some(elem) => Ok(Some(f(&elem).map_err(|mut e| {
                e.key = None;
                e.index = Some(index);
                e
            })?)),
            None => Ok(None),
        }
    }

    /// Gets the BSON double at the given index, failing if the value is another type.
    pub fn get_f64(&self, index: usize) -> Result<Option<f64>> {
        self.get_with(index, RawElement::as_f64)
    }

    /// Gets the string at the given index, failing if the value is another type.
    pub fn get_str(&self, index: usize) -> Result<Option<&'_ str>> {
        self.get_with(index, RawElement::as_str)
    }

    /// Gets the embedded document at the given index, failing if the value is another type.
    pub fn get_document(&self, index: usize) -> Result<Option<&'_ RawDocument>> {
        self.get_with(index, RawElement::as_document)
    }

    /// Gets the array at the given index, failing if the value is another type.
    pub fn get_array(&self, index: usize) -> Result<Option<&'_ RawArray>> {
        self.get_with(index, RawElement::as_array)
    }

    /// Gets the binary value at the given index, failing if the value is another type.
    pub fn get_binary(&self, index: usize) -> Result<Option<RawBinaryRef<'_>>> {
        self.get_with(index, RawElement::as_binary)
    }

    /// Gets the ObjectId at the given index, failing if the value is another type.
    pub fn get_object_id(&self, index: usize) -> Result<Option<ObjectId>> {
        self.get_with(index, RawElement::as_object_id)
    }

    /// Gets the boolean at the given index, failing if the value is another type.
    pub fn get_bool(&self, index: usize) -> Result<Option<bool>> {
        self.get_with(index, RawElement::as_bool)
    }

    /// Gets the datetime at the given index, failing if the value is another type.
    pub fn get_datetime(&self, index: usize) -> Result<Option<DateTime>> {
        self.get_with(index, RawElement::as_datetime)
    }

    /// Gets the i32 at the given index, failing if the value is another type.
    pub fn get_i32(&self, index: usize) -> Result<Option<i32>> {
        self.get_with(index, RawElement::as_i32)
    }

    /// Gets the i64 at the given index, failing if the value is another type.
    pub fn get_i64(&self, index: usize) -> Result<Option<i64>> {
        self.get_with(index, RawElement::as_i64)
    }

    /// Counts the elements in the array. This requires a full pass.
    pub fn element_count(&self) -> Result<usize> {
        self.doc.element_count()
    }

    /// Whether the array contains no elements.
    pub fn is_empty(&self) -> bool {
        self.doc.is_empty()
    }

    /// The total byte length of the array recorded in its length prefix.
    pub fn byte_size(&self) -> usize {
        self.doc.byte_size()
    }

    /// Performs a full structural validation, additionally requiring the element names to be the
    /// canonical ascending decimal indices.
    pub fn validate(&self) -> Result<()> {
        self.doc.validate()?;
        for (index, result) in self.doc.iter().enumerate() {
            // validate() above already vetted the iteration
            let elem = result?;
            if elem.name() != itoa(index) {
                return Err(Error::incompatible_type_conversion(format!(
                    "expected array key \"{}\", found \"{}\"",
                    index,
                    elem.name()
                )));
            }
        }
        Ok(())
    }

    /// Returns a reference to the contained data as a `&[u8]`.
    pub fn as_bytes(&self) -> &[u8] {
        self.doc.as_bytes()
    }

    /// Gets an iterator over the values in the array.
    pub fn iter(&self) -> RawArrayIter<'_> {
        self.into_iter()
    }
}

fn itoa(index: usize) -> String {
    index.to_string()
}

impl std::fmt::Debug for RawArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawArray")
            .field("data", &hex::encode(self.as_bytes()))
            .finish()
    }
}

impl ToOwned for RawArray {
    type Owned = RawArrayBuf;

    fn to_owned(&self) -> Self::Owned {
        RawArrayBuf::from_raw_array(self)
    }
}

impl<'a> From<&'a RawArray> for Cow<'a, RawArray> {
    fn from(arr: &'a RawArray) -> Self {
        Cow::Borrowed(arr)
    }
}

/// An iterator over the values of a BSON array.
pub struct RawArrayIter<'a> {
    inner: Iter<'a>,
}

impl<'a> Iterator for RawArrayIter<'a> {
    type Item = Result<RawBsonRef<'a>>;

    fn next(&mut self) -> Option<Result<RawBsonRef<'a>>> {
        match self.inner.next() {
            Some(Ok(elem)) => Some(elem.value()),
            Some(Err(e)) => Some(Err(e)),
            None => None,
        }
    }
}

impl<'a> IntoIterator for &'a RawArray {
    type IntoIter = RawArrayIter<'a>;
    type Item = Result<RawBsonRef<'a>>;

    fn into_iter(self) -> RawArrayIter<'a> {
        RawArrayIter {
            inner: self.doc.iter(),
        }
    }
}

/// An owned BSON array, backed by a buffer of raw BSON bytes.
///
/// Appended values get ascending decimal keys synthesised automatically,
/// starting at "0".
#[derive(Clone, PartialEq)]
pub struct RawArrayBuf {
    inner: RawDocumentBuf,
    len: usize,
}

impl RawArrayBuf {
    /// Creates a new, empty array.
    pub fn new() -> RawArrayBuf {
        Self {
            inner: RawDocumentBuf::new(),
            len: 0,
        }
    }

    fn from_raw_array(arr: &RawArray) -> RawArrayBuf {
        let len = arr.doc.iter().count();
        Self {
            inner: arr.doc.to_raw_document_buf(),
            len,
        }
    }

    /// Constructs a new [`RawArrayBuf`] from the provided bytes, validating the document header
    /// invariants only.
    pub fn from_bytes(data: Vec<u8>) -> Result<RawArrayBuf> {
        let inner = RawDocumentBuf::from_bytes(data)?;
        let len = inner.element_count()?;
        Ok(Self { inner, len })
    }

    /// Appends a value to the end of the array.
    pub fn push(&mut self, value: impl Into<RawBson>) {
        // decimal keys cannot contain interior nuls
        let index = crate::raw::CString::from_unchecked(itoa(self.len));
        self.inner.append(index, value);
        self.len += 1;
    }

    /// The number of elements in the array.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the array contains no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the contained data as a `Vec<u8>`.
    pub fn into_vec(self) -> Vec<u8> {
        self.inner.into_vec()
    }
}

impl Default for RawArrayBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RawArrayBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawArrayBuf")
            .field("data", &hex::encode(self.as_bytes()))
            .finish()
    }
}

impl Deref for RawArrayBuf {
    type Target = RawArray;

    fn deref(&self) -> &Self::Target {
        RawArray::from_doc(self.inner.deref())
    }
}

impl AsRef<RawArray> for RawArrayBuf {
    fn as_ref(&self) -> &RawArray {
        self.deref()
    }
}

impl std::borrow::Borrow<RawArray> for RawArrayBuf {
    fn borrow(&self) -> &RawArray {
        self.deref()
    }
}

impl<'a> IntoIterator for &'a RawArrayBuf {
    type IntoIter = RawArrayIter<'a>;
    type Item = Result<RawBsonRef<'a>>;

    fn into_iter(self) -> RawArrayIter<'a> {
        self.deref().into_iter()
    }
}

impl<T: Into<RawBson>> FromIterator<T> for RawArrayBuf {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut buf = RawArrayBuf::new();
        for item in iter {
            buf.push(item);
        }
        buf
    }
}
