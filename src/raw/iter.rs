use super::{
    checked_add,
    elem::measure_payload,
    read_nullterminated,
    RawDocument,
    RawElement,
};
use crate::{
    error::{Error, Result},
    spec::ElementType,
};

/// An iterator over a document's elements.
pub struct Iter<'a> {
    doc: &'a RawDocument,
    offset: usize,

    /// Whether the underlying doc is assumed to be valid or if an error has been encountered.
    /// After an error, all subsequent iterations will return None.
    valid: bool,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(doc: &'a RawDocument) -> Self {
        Self {
            doc,
            offset: 4,
            valid: true,
        }
    }

    fn step(&mut self) -> Result<RawElement<'a>> {
        let bytes = self.doc.as_bytes();
        let tag = bytes[self.offset];
        let key = read_nullterminated(&bytes[self.offset + 1..])?;

        let element_type = ElementType::from_u8(tag)
            .ok_or_else(|| Error::invalid_element_type(tag).with_key(key))?;

        let valueoffset = self.offset + 1 + key.len() + 1; // type tag + key + \0
        let payload_size = measure_payload(element_type, &bytes[valueoffset..])
            .map_err(|e| e.with_key(key))?;
        let end = checked_add(valueoffset, payload_size)?;
        if bytes.len() - 1 < end {
            let available = (bytes.len() - 1).saturating_sub(valueoffset);
            return Err(Error::invalid_element_size(end - valueoffset, available).with_key(key));
        }

        let element = RawElement::new(key, element_type, &bytes[self.offset..end]);
        self.offset = end;
        Ok(element)
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = Result<RawElement<'a>>;

    fn next(&mut self) -> Option<Result<RawElement<'a>>> {
        if !self.valid {
            return None;
        } else if self.offset == self.doc.as_bytes().len() - 1 {
            if self.doc.as_bytes()[self.offset] == 0 {
                // end of document marker
                return None;
            } else {
                self.valid = false;
                return Some(Err(Error::invalid_document_size(
                    self.doc.byte_size(),
                    self.doc.as_bytes().len(),
                )));
            }
        } else if self.offset >= self.doc.as_bytes().len() {
            self.valid = false;
            return Some(Err(Error::invalid_document_size(
                self.doc.byte_size(),
                self.offset,
            )));
        }

        let result = self.step();
        if result.is_err() {
            self.valid = false;
        }

        Some(result)
    }
}
