use super::{
    checked_add,
    f64_from_slice,
    i32_from_slice,
    i64_from_slice,
    read_bool,
    read_lenencoded,
    read_nullterminated,
    write_cstring,
    CStr,
    RawArray,
    RawBinaryRef,
    RawBson,
    RawBsonRef,
    RawDbPointerRef,
    RawDocument,
    RawJavaScriptCodeWithScopeRef,
    RawRegexRef,
    MIN_BSON_DOCUMENT_SIZE,
    MIN_CODE_WITH_SCOPE_SIZE,
};
use crate::{
    datetime::Timestamp,
    error::{Error, Result},
    oid::ObjectId,
    spec::{BinarySubtype, ElementType},
    DateTime,
};

/// A view of a single element inside a document: its name, its type tag, and
/// its undecoded payload bytes.
///
/// The element's wire encoding is `tag || name || 0x00 || payload`, and
/// [`size`](RawElement::size) is the length of that whole range. Payloads are
/// decoded on demand via [`value`](RawElement::value) or the typed accessors.
#[derive(Debug, Clone, Copy)]
pub struct RawElement<'a> {
    name: &'a str,
    element_type: ElementType,
    bytes: &'a [u8],
}

impl<'a> RawElement<'a> {
    pub(crate) fn new(name: &'a str, element_type: ElementType, bytes: &'a [u8]) -> Self {
        Self {
            name,
            element_type,
            bytes,
        }
    }

    /// Parses a standalone element from the front of `bytes`. The slice must
    /// contain exactly one element; trailing bytes are an error.
    pub fn from_bytes(bytes: &'a [u8]) -> Result<Self> {
        let tag = *bytes.first().ok_or_else(|| Error::invalid_element_size(1, 0))?;
        let element_type =
            ElementType::from_u8(tag).ok_or_else(|| Error::invalid_element_type(tag))?;
        let name = read_nullterminated(&bytes[1..])?;
        let payload_offset = 1 + name.len() + 1;
        let payload_size = measure_payload(element_type, &bytes[payload_offset..])
            .map_err(|e| e.with_key(name))?;
        let total = checked_add(payload_offset, payload_size)?;
        if bytes.len() != total {
            return Err(Error::invalid_element_size(total, bytes.len()).with_key(name));
        }
        Ok(Self::new(name, element_type, bytes))
    }

    /// The element's name.
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The element's type tag.
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// The length in bytes of the element's full wire encoding.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    /// The element's full wire encoding.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// The element's undecoded payload bytes.
    pub fn payload(&self) -> &'a [u8] {
        &self.bytes[1 + self.name.len() + 1..]
    }

    /// Identity of the element's backing byte range, for deduplication of
    /// selection results.
    pub(crate) fn identity(&self) -> (usize, usize) {
        (self.bytes.as_ptr() as usize, self.bytes.len())
    }

    /// Decodes the payload under the element's type tag.
    pub fn value(&self) -> Result<RawBsonRef<'a>> {
        self.decode().map_err(|e| e.with_key(self.name))
    }

    /// Decodes the element and passes its name, type tag, and value to `f`.
    /// Empty-payload types decode to their payloadless variants.
    pub fn visit<R>(&self, f: impl FnOnce(&'a str, ElementType, RawBsonRef<'a>) -> R) -> Result<R> {
        Ok(f(self.name, self.element_type, self.value()?))
    }

    fn decode(&self) -> Result<RawBsonRef<'a>> {
        let payload = self.payload();
        Ok(match self.element_type {
            ElementType::Double => {
                expect_exact(payload, 8)?;
                RawBsonRef::Double(f64_from_slice(payload)?)
            }
            ElementType::String => RawBsonRef::String(read_lenencoded_exact(payload)?),
            ElementType::EmbeddedDocument => {
                RawBsonRef::Document(RawDocument::from_bytes(payload)?)
            }
            ElementType::Array => RawBsonRef::Array(RawArray::from_bytes(payload)?),
            ElementType::Binary => {
                if payload.len() < 5 {
                    return Err(Error::invalid_element_size(5, payload.len()));
                }
                let len = i32_from_slice(payload)?;
                if len < 0 || checked_add(len as usize, 5)? != payload.len() {
                    return Err(Error::invalid_element_size(
                        len.max(0) as usize + 5,
                        payload.len(),
                    ));
                }
                let subtype = BinarySubtype::from(payload[4]);
                let data = match subtype {
                    BinarySubtype::BinaryOld => {
                        // the deprecated subtype carries a second, inner length prefix
                        if len < 4 {
                            return Err(Error::invalid_element_size(4, len as usize));
                        }
                        let oldlength = i32_from_slice(&payload[5..])?;
                        if oldlength < 0 || oldlength as usize + 4 != len as usize {
                            return Err(Error::incompatible_type_conversion(
                                "old binary subtype has wrong inner declared length",
                            ));
                        }
                        &payload[9..]
                    }
                    _ => &payload[5..],
                };
                RawBsonRef::Binary(RawBinaryRef {
                    subtype,
                    bytes: data,
                })
            }
            ElementType::Undefined => {
                expect_exact(payload, 0)?;
                RawBsonRef::Undefined
            }
            ElementType::ObjectId => {
                expect_exact(payload, 12)?;
                let mut bytes = [0u8; 12];
                bytes.copy_from_slice(payload);
                RawBsonRef::ObjectId(ObjectId::from_bytes(bytes))
            }
            ElementType::Boolean => {
                expect_exact(payload, 1)?;
                RawBsonRef::Boolean(read_bool(payload)?)
            }
            ElementType::DateTime => {
                expect_exact(payload, 8)?;
                RawBsonRef::DateTime(DateTime::from_millis(i64_from_slice(payload)?))
            }
            ElementType::Null => {
                expect_exact(payload, 0)?;
                RawBsonRef::Null
            }
            ElementType::RegularExpression => {
                let pattern = read_nullterminated(payload)?;
                let rest = &payload[pattern.len() + 1..];
                let options = read_nullterminated(rest)?;
                if pattern.len() + 1 + options.len() + 1 != payload.len() {
                    return Err(Error::invalid_element_size(
                        pattern.len() + 1 + options.len() + 1,
                        payload.len(),
                    ));
                }
                RawBsonRef::RegularExpression(RawRegexRef { pattern, options })
            }
            ElementType::DbPointer => {
                let namespace = read_lenencoded(payload)?;
                let oid_start = 4 + namespace.len() + 1;
                if payload.len() != oid_start + 12 {
                    return Err(Error::invalid_element_size(oid_start + 12, payload.len()));
                }
                let mut bytes = [0u8; 12];
                bytes.copy_from_slice(&payload[oid_start..]);
                RawBsonRef::DbPointer(RawDbPointerRef {
                    namespace,
                    id: ObjectId::from_bytes(bytes),
                })
            }
            ElementType::JavaScriptCode => {
                RawBsonRef::JavaScriptCode(read_lenencoded_exact(payload)?)
            }
            ElementType::Symbol => RawBsonRef::Symbol(read_lenencoded_exact(payload)?),
            ElementType::JavaScriptCodeWithScope => {
                let declared = i32_from_slice(payload)?;
                if declared < MIN_CODE_WITH_SCOPE_SIZE || declared as usize != payload.len() {
                    return Err(Error::invalid_element_size(
                        declared.max(0) as usize,
                        payload.len(),
                    ));
                }
                let code = read_lenencoded(&payload[4..])?;
                let scope_start = 4 + 4 + code.len() + 1;
                let scope = RawDocument::from_bytes(&payload[scope_start..])?;
                RawBsonRef::JavaScriptCodeWithScope(RawJavaScriptCodeWithScopeRef { code, scope })
            }
            ElementType::Int32 => {
                expect_exact(payload, 4)?;
                RawBsonRef::Int32(i32_from_slice(payload)?)
            }
            ElementType::Timestamp => {
                expect_exact(payload, 8)?;
                RawBsonRef::Timestamp(Timestamp::from_le_i64(i64_from_slice(payload)?))
            }
            ElementType::Int64 => {
                expect_exact(payload, 8)?;
                RawBsonRef::Int64(i64_from_slice(payload)?)
            }
            ElementType::MinKey => {
                expect_exact(payload, 0)?;
                RawBsonRef::MinKey
            }
            ElementType::MaxKey => {
                expect_exact(payload, 0)?;
                RawBsonRef::MaxKey
            }
        })
    }

    fn typed<T>(
        &self,
        expected: ElementType,
        f: impl FnOnce(RawBsonRef<'a>) -> Option<T>,
    ) -> Result<T> {
        if self.element_type != expected {
            return Err(
                Error::incompatible_element_conversion(expected, self.element_type)
                    .with_key(self.name),
            );
        }
        let value = self.value()?;
        // the tag matched, so the decoded variant always matches too
        f(value).ok_or_else(|| {
            Error::incompatible_element_conversion(expected, self.element_type).with_key(self.name)
        })
    }

    /// Reads the element as a double, failing if it carries another type.
    pub fn as_f64(&self) -> Result<f64> {
        self.typed(ElementType::Double, RawBsonRef::as_f64)
    }

    /// Reads the element as a string, failing if it carries another type.
    pub fn as_str(&self) -> Result<&'a str> {
        self.typed(ElementType::String, RawBsonRef::as_str)
    }

    /// Reads the element as an embedded document, failing if it carries another type.
    pub fn as_document(&self) -> Result<&'a RawDocument> {
        self.typed(ElementType::EmbeddedDocument, RawBsonRef::as_document)
    }

    /// Reads the element as an array, failing if it carries another type.
    pub fn as_array(&self) -> Result<&'a RawArray> {
        self.typed(ElementType::Array, RawBsonRef::as_array)
    }

    /// Reads the element as a boolean, failing if it carries another type.
    pub fn as_bool(&self) -> Result<bool> {
        self.typed(ElementType::Boolean, RawBsonRef::as_bool)
    }

    /// Reads the element as an i32, failing if it carries another type.
    pub fn as_i32(&self) -> Result<i32> {
        self.typed(ElementType::Int32, RawBsonRef::as_i32)
    }

    /// Reads the element as an i64, failing if it carries another type.
    pub fn as_i64(&self) -> Result<i64> {
        self.typed(ElementType::Int64, RawBsonRef::as_i64)
    }

    /// Reads the element as an ObjectId, failing if it carries another type.
    pub fn as_object_id(&self) -> Result<ObjectId> {
        self.typed(ElementType::ObjectId, RawBsonRef::as_object_id)
    }

    /// Reads the element as a datetime, failing if it carries another type.
    pub fn as_datetime(&self) -> Result<DateTime> {
        self.typed(ElementType::DateTime, RawBsonRef::as_datetime)
    }

    /// Reads the element as a timestamp, failing if it carries another type.
    pub fn as_timestamp(&self) -> Result<Timestamp> {
        self.typed(ElementType::Timestamp, RawBsonRef::as_timestamp)
    }

    /// Reads the element as a binary value, failing if it carries another type.
    pub fn as_binary(&self) -> Result<RawBinaryRef<'a>> {
        self.typed(ElementType::Binary, RawBsonRef::as_binary)
    }

    /// Reads the element as a regular expression, failing if it carries another type.
    pub fn as_regex(&self) -> Result<RawRegexRef<'a>> {
        self.typed(ElementType::RegularExpression, RawBsonRef::as_regex)
    }

    /// Creates an owned, editable copy of this element.
    pub fn to_raw_element_buf(&self) -> RawElementBuf {
        RawElementBuf {
            data: self.bytes.to_vec(),
            name_len: self.name.len(),
        }
    }
}

impl<'a, 'b> PartialEq<RawElement<'b>> for RawElement<'a> {
    fn eq(&self, other: &RawElement<'b>) -> bool {
        self.bytes == other.bytes
    }
}

fn expect_exact(payload: &[u8], expected: usize) -> Result<()> {
    if payload.len() != expected {
        return Err(Error::invalid_element_size(expected, payload.len()));
    }
    Ok(())
}

/// Like [`read_lenencoded`], but requires the string to span the whole payload.
fn read_lenencoded_exact(payload: &[u8]) -> Result<&str> {
    let s = read_lenencoded(payload)?;
    if 4 + s.len() + 1 != payload.len() {
        return Err(Error::invalid_element_size(4 + s.len() + 1, payload.len()));
    }
    Ok(s)
}

/// Computes the byte length of a payload of the given type sitting at the
/// front of `buf`, without decoding it.
pub(crate) fn measure_payload(element_type: ElementType, buf: &[u8]) -> Result<usize> {
    let available = buf.len();
    let fits = |needed: usize| -> Result<usize> {
        if available < needed {
            Err(Error::invalid_element_size(needed, available))
        } else {
            Ok(needed)
        }
    };

    match element_type {
        ElementType::Null
        | ElementType::Undefined
        | ElementType::MinKey
        | ElementType::MaxKey => Ok(0),
        ElementType::Boolean => fits(1),
        ElementType::Int32 => fits(4),
        ElementType::Double
        | ElementType::Int64
        | ElementType::DateTime
        | ElementType::Timestamp => fits(8),
        ElementType::ObjectId => fits(12),
        ElementType::String | ElementType::JavaScriptCode | ElementType::Symbol => {
            let len = i32_from_slice(buf)?;
            if len < 1 {
                return Err(Error::invalid_element_size(1, len.max(0) as usize));
            }
            fits(checked_add(4, len as usize)?)
        }
        ElementType::EmbeddedDocument | ElementType::Array => {
            let len = i32_from_slice(buf)?;
            if len < MIN_BSON_DOCUMENT_SIZE {
                return Err(Error::invalid_document_size(len.max(0) as usize, available));
            }
            fits(len as usize)
        }
        ElementType::Binary => {
            let len = i32_from_slice(buf)?;
            if len < 0 {
                return Err(Error::invalid_element_size(5, available));
            }
            fits(checked_add(4 + 1, len as usize)?)
        }
        ElementType::RegularExpression => {
            let pattern = read_nullterminated(buf)?;
            let options = read_nullterminated(&buf[pattern.len() + 1..])?;
            Ok(pattern.len() + 1 + options.len() + 1)
        }
        ElementType::DbPointer => {
            let len = i32_from_slice(buf)?;
            if len < 1 {
                return Err(Error::invalid_element_size(1, len.max(0) as usize));
            }
            fits(checked_add(4 + 12, len as usize)?)
        }
        ElementType::JavaScriptCodeWithScope => {
            let len = i32_from_slice(buf)?;
            if len < MIN_CODE_WITH_SCOPE_SIZE {
                return Err(Error::invalid_element_size(
                    MIN_CODE_WITH_SCOPE_SIZE as usize,
                    len.max(0) as usize,
                ));
            }
            fits(len as usize)
        }
    }
}

/// A single element backed by its own buffer, supporting in-place edits.
///
/// Every mutation assembles the replacement encoding fully before swapping it
/// in, so a failed mutation leaves the element byte-for-byte unchanged.
#[derive(Clone, PartialEq)]
pub struct RawElementBuf {
    data: Vec<u8>,
    name_len: usize,
}

impl RawElementBuf {
    /// Encodes an element from a name and a value, inferring the type tag
    /// from the value's shape.
    pub fn new(name: impl AsRef<CStr>, value: impl Into<RawBson>) -> Result<Self> {
        let value = value.into();
        let name = name.as_ref();
        let mut data = vec![value.element_type() as u8];
        write_cstring(&mut data, name);
        value.as_raw_bson_ref().append_to(&mut data)?;
        Ok(Self {
            data,
            name_len: name.len(),
        })
    }

    /// Encodes an element with an explicit type tag, rejecting unknown tags
    /// and values whose shape cannot be encoded under the tag.
    pub fn new_with_type(
        name: impl AsRef<CStr>,
        tag: u8,
        value: impl Into<RawBson>,
    ) -> Result<Self> {
        let element_type =
            ElementType::from_u8(tag).ok_or_else(|| Error::invalid_element_type(tag))?;
        let value = value.into();
        if value.element_type() != element_type {
            return Err(Error::incompatible_type_conversion(format!(
                "cannot encode a {:?} value under type {:?}",
                value.element_type(),
                element_type
            )));
        }
        Self::new(name, value)
    }

    /// Constructs an element from its wire encoding, validating it end-to-end.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let name_len = RawElement::from_bytes(&data)?.name().len();
        Ok(Self { data, name_len })
    }

    /// Gets a borrowed view of this element.
    ///
    /// The name range is untouched by type-tag edits, so it stays valid even
    /// when the payload no longer fits the current tag; payload faults
    /// surface when the value is decoded.
    pub fn as_raw_element(&self) -> RawElement<'_> {
        // unwrap is ok here because the name bytes were validated as UTF-8 at
        // construction and are only ever replaced by validated names
        let name = std::str::from_utf8(&self.data[1..1 + self.name_len]).unwrap();
        // unwrap is ok here because construction rejects unknown tags and
        // set_element_type takes the closed enum
        let element_type = ElementType::from_u8(self.data[0]).unwrap();
        RawElement::new(name, element_type, &self.data)
    }

    /// The element's name.
    pub fn name(&self) -> &str {
        self.as_raw_element().name()
    }

    /// The element's type tag.
    pub fn element_type(&self) -> ElementType {
        self.as_raw_element().element_type()
    }

    /// The length in bytes of the element's wire encoding.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Decodes the payload under the element's type tag.
    pub fn value(&self) -> Result<RawBsonRef<'_>> {
        self.as_raw_element().value()
    }

    /// Renames the element, rewriting its encoding.
    pub fn set_name(&mut self, name: impl AsRef<str>) -> Result<()> {
        let name: &CStr = name.as_ref().try_into()?;
        let data = {
            let elem = self.as_raw_element();
            let mut data = Vec::with_capacity(1 + name.len() + 1 + elem.payload().len());
            data.push(self.data[0]);
            write_cstring(&mut data, name);
            data.extend(elem.payload());
            data
        };
        self.data = data;
        self.name_len = name.len();
        Ok(())
    }

    /// Changes the element's type tag, preserving the payload bytes verbatim.
    ///
    /// Subsequent reads may fail if the payload does not fit the new type's
    /// shape.
    pub fn set_element_type(&mut self, element_type: ElementType) {
        self.data[0] = element_type as u8;
    }

    /// Replaces the element's value, re-encoding the payload and updating the
    /// type tag to match the new value's shape.
    pub fn set_value(&mut self, value: impl Into<RawBson>) -> Result<()> {
        let value = value.into();
        let data = {
            let elem = self.as_raw_element();
            let name: &CStr = elem.name().try_into()?;
            let mut data = vec![value.element_type() as u8];
            write_cstring(&mut data, name);
            value.as_raw_bson_ref().append_to(&mut data)?;
            data
        };
        self.data = data;
        Ok(())
    }

    /// Changes the element's type tag from a raw byte, rejecting tags outside
    /// the BSON spec.
    pub fn set_element_type_tag(&mut self, tag: u8) -> Result<()> {
        let element_type =
            ElementType::from_u8(tag).ok_or_else(|| Error::invalid_element_type(tag))?;
        self.set_element_type(element_type);
        Ok(())
    }

    /// The element's full wire encoding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the element, returning its wire encoding.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }
}

impl std::fmt::Debug for RawElementBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawElementBuf")
            .field("data", &hex::encode(&self.data))
            .finish()
    }
}
