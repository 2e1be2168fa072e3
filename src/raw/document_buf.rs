use std::{
    borrow::{Borrow, Cow},
    io::{Read, Write},
    ops::Deref,
};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use super::{CStr, Iter, RawBson, RawDocument, RawElement, MIN_BSON_DOCUMENT_SIZE};
use crate::error::{Error, Result};

/// An owned BSON document (akin to [`std::path::PathBuf`]), backed by a buffer of raw BSON bytes.
///
/// This type implements `Deref` to [`RawDocument`], meaning that all methods on [`RawDocument`]
/// are available on [`RawDocumentBuf`] values as well. This includes [`RawDocument::get`] or any
/// of the type-specific getters, such as [`RawDocument::get_object_id`] or
/// [`RawDocument::get_str`].
///
/// ```
/// use bsonpath::raw::RawDocumentBuf;
///
/// let mut doc = RawDocumentBuf::new();
/// doc.append(bsonpath::cstr!("answer"), 42_i32);
/// assert_eq!(doc.get_i32("answer")?, Some(42));
/// # Ok::<(), bsonpath::error::Error>(())
/// ```
#[derive(Clone, PartialEq)]
pub struct RawDocumentBuf {
    data: Vec<u8>,
}

impl RawDocumentBuf {
    /// Creates a new, empty document.
    pub fn new() -> RawDocumentBuf {
        let mut data: Vec<u8> = MIN_BSON_DOCUMENT_SIZE.to_le_bytes().to_vec();
        data.push(0);
        Self { data }
    }

    /// Constructs a new [`RawDocumentBuf`] from the provided bytes, validating the same header
    /// invariants as [`RawDocument::from_bytes`].
    pub fn from_bytes(data: Vec<u8>) -> Result<RawDocumentBuf> {
        let _ = RawDocument::from_bytes(data.as_slice())?;
        Ok(Self { data })
    }

    /// Reads a single document from the reader.
    ///
    /// This is the entry point for byte sources without a contiguous in-memory representation;
    /// the document is materialised into its own buffer and validated as usual.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<RawDocumentBuf> {
        let length = reader.read_i32::<LittleEndian>()?;
        if length < MIN_BSON_DOCUMENT_SIZE {
            return Err(Error::invalid_document_size(length.max(0) as usize, 4));
        }

        let mut data = Vec::with_capacity(length as usize);
        data.extend(length.to_le_bytes());
        data.resize(length as usize, 0);
        reader.read_exact(&mut data[4..])?;

        Self::from_bytes(data)
    }

    /// Writes the document's bytes to the writer.
    pub fn to_writer<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_i32::<LittleEndian>(self.data.len() as i32)?;
        writer.write_all(&self.data[4..])?;
        Ok(())
    }

    /// Gets an iterator over the elements in the [`RawDocumentBuf`], which yields
    /// `Result<RawElement<'_>>`.
    pub fn iter(&self) -> Iter<'_> {
        self.into_iter()
    }

    /// Appends an element to the end of the document, updating the length prefix.
    pub fn append(&mut self, key: impl AsRef<CStr>, value: impl Into<RawBson>) {
        // unwrap is ok here because CStr keys and RawBson values cannot produce
        // unencodable payloads
        self.try_append(key, value).unwrap()
    }

    fn try_append(&mut self, key: impl AsRef<CStr>, value: impl Into<RawBson>) -> Result<()> {
        let value = value.into();
        let original_len = self.data.len();

        // overwrite the trailing NUL with the new element
        self.data[original_len - 1] = value.element_type() as u8;
        key.as_ref().append_to(&mut self.data);
        let result = value.as_raw_bson_ref().append_to(&mut self.data);
        if result.is_err() {
            self.data.truncate(original_len - 1);
            self.data.push(0);
            return result;
        }

        self.data.push(0);
        let new_len = (self.data.len() as i32).to_le_bytes();
        self.data[0..4].copy_from_slice(&new_len);
        Ok(())
    }

    /// Replaces the value of the first element with the given key, rewriting the element's byte
    /// range and the length prefix in one step. Returns `false` if no element matched.
    pub fn replace(&mut self, key: impl AsRef<str>, value: impl Into<RawBson>) -> Result<bool> {
        let key = key.as_ref();
        let range = match self.element_range(key)? {
            Some(r) => r,
            None => return Ok(false),
        };

        let value = value.into();
        let name: &CStr = key.try_into()?;
        let mut replacement = vec![value.element_type() as u8];
        name.append_to(&mut replacement);
        value.as_raw_bson_ref().append_to(&mut replacement)?;

        self.data.splice(range, replacement);
        let new_len = (self.data.len() as i32).to_le_bytes();
        self.data[0..4].copy_from_slice(&new_len);
        Ok(true)
    }

    /// Removes the first element with the given key, updating the length prefix. Returns `false`
    /// if no element matched.
    pub fn remove(&mut self, key: impl AsRef<str>) -> Result<bool> {
        let range = match self.element_range(key.as_ref())? {
            Some(r) => r,
            None => return Ok(false),
        };

        self.data.drain(range);
        let new_len = (self.data.len() as i32).to_le_bytes();
        self.data[0..4].copy_from_slice(&new_len);
        Ok(true)
    }

    fn element_range(&self, key: &str) -> Result<Option<std::ops::Range<usize>>> {
        let base = self.data.as_ptr() as usize;
        for result in self.iter() {
            let elem = result?;
            if elem.name() == key {
                let start = elem.as_bytes().as_ptr() as usize - base;
                return Ok(Some(start..start + elem.size()));
            }
        }
        Ok(None)
    }

    /// Serialises a sequence of owned elements into a single document.
    pub fn from_elements<I>(elements: I) -> Result<RawDocumentBuf>
    where
        I: IntoIterator<Item = crate::raw::RawElementBuf>,
    {
        let mut data: Vec<u8> = MIN_BSON_DOCUMENT_SIZE.to_le_bytes().to_vec();
        for elem in elements {
            data.extend(elem.as_bytes());
        }
        data.push(0);
        let len = (data.len() as i32).to_le_bytes();
        data[0..4].copy_from_slice(&len);
        RawDocumentBuf::from_bytes(data)
    }

    /// Returns the contained data as a `Vec<u8>`.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl Default for RawDocumentBuf {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RawDocumentBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawDocumentBuf")
            .field("data", &hex::encode(&self.data))
            .finish()
    }
}

impl<'a> From<RawDocumentBuf> for Cow<'a, RawDocument> {
    fn from(rd: RawDocumentBuf) -> Self {
        Cow::Owned(rd)
    }
}

impl<'a> From<&'a RawDocumentBuf> for Cow<'a, RawDocument> {
    fn from(rd: &'a RawDocumentBuf) -> Self {
        Cow::Borrowed(rd.as_ref())
    }
}

impl<'a> IntoIterator for &'a RawDocumentBuf {
    type IntoIter = Iter<'a>;
    type Item = Result<RawElement<'a>>;

    fn into_iter(self) -> Iter<'a> {
        Iter::new(self)
    }
}

impl AsRef<RawDocument> for RawDocumentBuf {
    fn as_ref(&self) -> &RawDocument {
        RawDocument::from_bytes_unchecked(&self.data)
    }
}

impl Deref for RawDocumentBuf {
    type Target = RawDocument;

    fn deref(&self) -> &Self::Target {
        RawDocument::from_bytes_unchecked(&self.data)
    }
}

impl Borrow<RawDocument> for RawDocumentBuf {
    fn borrow(&self) -> &RawDocument {
        self.deref()
    }
}

