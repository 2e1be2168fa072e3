use core::str;

use crate::error::{Error, ErrorKind, Result};

// The name of an encoded element must itself fit in a length-prefixed element.
pub(crate) const MAX_NAME_LEN: usize = (i32::MAX - 2) as usize;

/// A BSON-spec cstring: zero or more UTF-8 encoded characters, excluding the null byte.
#[derive(Debug)]
#[repr(transparent)]
pub struct CStr {
    data: [u8],
}

impl<'a> TryFrom<&'a str> for &'a CStr {
    type Error = Error;

    fn try_from(value: &str) -> Result<&CStr> {
        match validate_cstr(value) {
            Some(cs) if cs.len() <= MAX_NAME_LEN => Ok(cs),
            Some(cs) => Err(ErrorKind::NameTooLong { length: cs.len() }.into()),
            None => Err(ErrorKind::EmbeddedNulInName.into()),
        }
    }
}

impl CStr {
    const fn from_str_unchecked(value: &str) -> &Self {
        // Safety: the conversion is safe because CStr is repr(transparent), and the deref is safe
        // because the pointer came from a safe reference.
        unsafe { &*(value.as_bytes() as *const [u8] as *const CStr) }
    }

    pub fn as_str(&self) -> &str {
        // Safety: the only way to construct a CStr is from a valid &str.
        unsafe { str::from_utf8_unchecked(&self.data) }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub(crate) fn append_to(&self, buf: &mut Vec<u8>) {
        buf.extend(&self.data);
        buf.push(0);
    }
}

impl<'a, 'b> PartialEq<&'b CStr> for &'a CStr {
    fn eq(&self, other: &&CStr) -> bool {
        self.as_str() == other.as_str()
    }
}

impl PartialEq<str> for CStr {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl std::fmt::Display for CStr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_str().fmt(f)
    }
}

impl AsRef<CStr> for CStr {
    fn as_ref(&self) -> &CStr {
        self
    }
}

impl std::borrow::ToOwned for CStr {
    type Owned = CString;

    fn to_owned(&self) -> Self::Owned {
        self.into()
    }
}

#[diagnostic::on_unimplemented(message = "the string literal contains a zero byte")]
pub trait ValidCStr {}
pub struct IsValidCStr<const VALID: bool>;
impl ValidCStr for IsValidCStr<true> {}

pub const fn validate_cstr(text: &str) -> Option<&CStr> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == 0 {
            return None;
        }
        i += 1;
    }
    Some(CStr::from_str_unchecked(text))
}

pub const fn assert_valid_cstr<T: ValidCStr>() {}

/// Validates a string literal as a [`CStr`] at compile time.
#[macro_export]
macro_rules! cstr {
    ($text:expr) => {{
        const VALIDATED: Option<&$crate::raw::CStr> = $crate::raw::validate_cstr($text);
        const VALID: bool = VALIDATED.is_some();
        $crate::raw::assert_valid_cstr::<$crate::raw::IsValidCStr<VALID>>();
        VALIDATED.unwrap()
    }};
}
pub use cstr;

/// An owned BSON-spec cstring.
#[derive(Clone, Eq, PartialEq, Hash)]
#[repr(transparent)]
pub struct CString {
    data: String,
}

impl TryFrom<String> for CString {
    type Error = Error;

    fn try_from(data: String) -> Result<Self> {
        let _: &CStr = data.as_str().try_into()?;
        Ok(Self { data })
    }
}

impl TryFrom<&str> for CString {
    type Error = Error;

    fn try_from(data: &str) -> Result<Self> {
        let cs: &CStr = data.try_into()?;
        Ok(cs.into())
    }
}

impl CString {
    pub(crate) fn from_unchecked(data: String) -> Self {
        Self { data }
    }

    pub fn into_string(self) -> String {
        self.data
    }

    pub fn as_str(&self) -> &str {
        self.data.as_str()
    }
}

impl From<&CStr> for CString {
    fn from(value: &CStr) -> Self {
        Self {
            data: value.as_str().into(),
        }
    }
}

impl AsRef<CStr> for CString {
    fn as_ref(&self) -> &CStr {
        CStr::from_str_unchecked(self.data.as_str())
    }
}

impl std::borrow::Borrow<CStr> for CString {
    fn borrow(&self) -> &CStr {
        self.as_ref()
    }
}

impl std::fmt::Debug for CString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.data.fmt(f)
    }
}

impl std::fmt::Display for CString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.data.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn literal_names_validate() {
        let cs = cstr!("hello");
        assert_eq!(cs.as_str(), "hello");
        assert_eq!(cs.len(), 5);
    }

    #[test]
    fn interior_nul_is_rejected() {
        let err = <&CStr>::try_from("a\0b").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::EmbeddedNulInName));
        assert!(CString::try_from("a\0b".to_string()).is_err());
    }

    #[test]
    fn owned_round_trip() {
        let owned = CString::try_from("key").unwrap();
        let borrowed: &CStr = owned.as_ref();
        assert_eq!(borrowed.as_str(), "key");
        assert_eq!(CString::from(borrowed), owned);
    }
}
