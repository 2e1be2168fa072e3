//! Constants derived from the [BSON Specification](http://bsonspec.org/spec.html).

/// All available BSON element types.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[repr(u8)]
#[non_exhaustive]
pub enum ElementType {
    /// 64-bit binary floating point
    Double = 0x01,
    /// UTF-8 string
    String = 0x02,
    /// Embedded document
    EmbeddedDocument = 0x03,
    /// Array
    Array = 0x04,
    /// Binary data
    Binary = 0x05,
    /// Deprecated. Undefined (value)
    Undefined = 0x06,
    /// [ObjectId](http://dochub.mongodb.org/core/objectids)
    ObjectId = 0x07,
    /// Boolean value
    Boolean = 0x08,
    /// UTC datetime
    DateTime = 0x09,
    /// Null value
    Null = 0x0A,
    /// Regular expression
    RegularExpression = 0x0B,
    /// Deprecated. DBPointer
    DbPointer = 0x0C,
    /// JavaScript code
    JavaScriptCode = 0x0D,
    /// Deprecated. Symbol
    Symbol = 0x0E,
    /// JavaScript code with scope
    JavaScriptCodeWithScope = 0x0F,
    /// 32-bit signed integer
    Int32 = 0x10,
    /// Timestamp
    Timestamp = 0x11,
    /// 64-bit signed integer
    Int64 = 0x12,
    /// Min key
    MinKey = 0xFF,
    /// Max key
    MaxKey = 0x7F,
}

impl ElementType {
    /// Attempt to convert from a `u8`.
    pub fn from_u8(tag: u8) -> Option<Self> {
        Some(match tag {
            0x01 => ElementType::Double,
            0x02 => ElementType::String,
            0x03 => ElementType::EmbeddedDocument,
            0x04 => ElementType::Array,
            0x05 => ElementType::Binary,
            0x06 => ElementType::Undefined,
            0x07 => ElementType::ObjectId,
            0x08 => ElementType::Boolean,
            0x09 => ElementType::DateTime,
            0x0A => ElementType::Null,
            0x0B => ElementType::RegularExpression,
            0x0C => ElementType::DbPointer,
            0x0D => ElementType::JavaScriptCode,
            0x0E => ElementType::Symbol,
            0x0F => ElementType::JavaScriptCodeWithScope,
            0x10 => ElementType::Int32,
            0x11 => ElementType::Timestamp,
            0x12 => ElementType::Int64,
            0xFF => ElementType::MinKey,
            0x7F => ElementType::MaxKey,
            _ => return None,
        })
    }
}

/// The available binary subtypes, plus a user-defined slot.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
#[non_exhaustive]
pub enum BinarySubtype {
    Generic,
    Function,
    BinaryOld,
    UuidOld,
    Uuid,
    Md5,
    UserDefined(u8),
}

impl From<BinarySubtype> for u8 {
    fn from(t: BinarySubtype) -> u8 {
        match t {
            BinarySubtype::Generic => 0x00,
            BinarySubtype::Function => 0x01,
            BinarySubtype::BinaryOld => 0x02,
            BinarySubtype::UuidOld => 0x03,
            BinarySubtype::Uuid => 0x04,
            BinarySubtype::Md5 => 0x05,
            BinarySubtype::UserDefined(x) => x,
        }
    }
}

impl From<u8> for BinarySubtype {
    fn from(t: u8) -> BinarySubtype {
        match t {
            0x00 => BinarySubtype::Generic,
            0x01 => BinarySubtype::Function,
            0x02 => BinarySubtype::BinaryOld,
            0x03 => BinarySubtype::UuidOld,
            0x04 => BinarySubtype::Uuid,
            0x05 => BinarySubtype::Md5,
            _ => BinarySubtype::UserDefined(t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_type_round_trip() {
        for tag in 0x01..=0x12u8 {
            let et = ElementType::from_u8(tag).expect("valid tag");
            assert_eq!(et as u8, tag);
        }
        assert_eq!(ElementType::from_u8(0xFF), Some(ElementType::MinKey));
        assert_eq!(ElementType::from_u8(0x7F), Some(ElementType::MaxKey));
        assert_eq!(ElementType::from_u8(0x13), None);
        assert_eq!(ElementType::from_u8(0x00), None);
        assert_eq!(ElementType::from_u8(0xDE), None);
    }

    #[test]
    fn binary_subtype_round_trip() {
        for byte in 0x00..=0x05u8 {
            let subtype = BinarySubtype::from(byte);
            assert_eq!(u8::from(subtype), byte);
        }
        assert_eq!(BinarySubtype::from(0x80), BinarySubtype::UserDefined(0x80));
    }
}
