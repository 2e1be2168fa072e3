use super::{bson::RawBson, write_cstring, write_string, CStr, RawArray, RawDocument};
use crate::{
    datetime::Timestamp,
    error::Result,
    oid::ObjectId,
    spec::{BinarySubtype, ElementType},
    DateTime,
};

/// A BSON value referencing raw bytes stored elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawBsonRef<'a> {
    /// 64-bit binary floating point
    Double(f64),
    /// UTF-8 string
    String(&'a str),
    /// Array
    Array(&'a RawArray),
    /// Embedded document
    Document(&'a RawDocument),
    /// Boolean value
    Boolean(bool),
    /// Null value
    Null,
    /// Regular expression
    RegularExpression(RawRegexRef<'a>),
    /// JavaScript code
    JavaScriptCode(&'a str),
    /// JavaScript code w/ scope
    JavaScriptCodeWithScope(RawJavaScriptCodeWithScopeRef<'a>),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// Timestamp
    Timestamp(Timestamp),
    /// Binary data
    Binary(RawBinaryRef<'a>),
    /// [ObjectId](http://dochub.mongodb.org/core/objectids)
    ObjectId(ObjectId),
    /// UTC datetime
    DateTime(DateTime),
    /// Symbol (Deprecated)
    Symbol(&'a str),
    /// Undefined value (Deprecated)
    Undefined,
    /// Max key
    MaxKey,
    /// Min key
    MinKey,
    /// DBPointer (Deprecated)
    DbPointer(RawDbPointerRef<'a>),
}

impl<'a> RawBsonRef<'a> {
    /// Get the [`ElementType`] of this value.
    pub fn element_type(&self) -> ElementType {
        match *self {
            RawBsonRef::Double(..) => ElementType::Double,
            RawBsonRef::String(..) => ElementType::String,
            RawBsonRef::Array(..) => ElementType::Array,
            RawBsonRef::Document(..) => ElementType::EmbeddedDocument,
            RawBsonRef::Boolean(..) => ElementType::Boolean,
            RawBsonRef::Null => ElementType::Null,
            RawBsonRef::RegularExpression(..) => ElementType::RegularExpression,
            RawBsonRef::JavaScriptCode(..) => ElementType::JavaScriptCode,
            RawBsonRef::JavaScriptCodeWithScope(..) => ElementType::JavaScriptCodeWithScope,
            RawBsonRef::Int32(..) => ElementType::Int32,
            RawBsonRef::Int64(..) => ElementType::Int64,
            RawBsonRef::Timestamp(..) => ElementType::Timestamp,
            RawBsonRef::Binary(..) => ElementType::Binary,
            RawBsonRef::ObjectId(..) => ElementType::ObjectId,
            RawBsonRef::DateTime(..) => ElementType::DateTime,
            RawBsonRef::Symbol(..) => ElementType::Symbol,
            RawBsonRef::Undefined => ElementType::Undefined,
            RawBsonRef::MaxKey => ElementType::MaxKey,
            RawBsonRef::MinKey => ElementType::MinKey,
            RawBsonRef::DbPointer(..) => ElementType::DbPointer,
        }
    }

    /// Gets the `f64` that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// double.
    pub fn as_f64(self) -> Option<f64> {
        match self {
            RawBsonRef::Double(d) => Some(d),
            _ => None,
        }
    }

    /// Gets the `&str` that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// string.
    pub fn as_str(self) -> Option<&'a str> {
        match self {
            RawBsonRef::String(s) => Some(s),
            _ => None,
        }
    }

    /// Gets the [`RawArray`] that's referenced or returns [`None`] if the referenced value isn't a
    /// BSON array.
    pub fn as_array(self) -> Option<&'a RawArray> {
        match self {
            RawBsonRef::Array(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`RawDocument`] that's referenced or returns [`None`] if the referenced value
    /// isn't a BSON document.
    pub fn as_document(self) -> Option<&'a RawDocument> {
        match self {
            RawBsonRef::Document(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the `bool` that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// boolean.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            RawBsonRef::Boolean(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the `i32` that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// Int32.
    pub fn as_i32(self) -> Option<i32> {
        match self {
            RawBsonRef::Int32(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the `i64` that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// Int64.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            RawBsonRef::Int64(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`ObjectId`] that's referenced or returns [`None`] if the referenced value isn't a
    /// BSON ObjectId.
    pub fn as_object_id(self) -> Option<ObjectId> {
        match self {
            RawBsonRef::ObjectId(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`RawBinaryRef`] that's referenced or returns [`None`] if the referenced value
    /// isn't a BSON binary.
    pub fn as_binary(self) -> Option<RawBinaryRef<'a>> {
        match self {
            RawBsonRef::Binary(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`RawRegexRef`] that's referenced or returns [`None`] if the referenced value
    /// isn't a BSON regular expression.
    pub fn as_regex(self) -> Option<RawRegexRef<'a>> {
        match self {
            RawBsonRef::RegularExpression(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`DateTime`] that's referenced or returns [`None`] if the referenced value isn't a
    /// BSON datetime.
    pub fn as_datetime(self) -> Option<DateTime> {
        match self {
            RawBsonRef::DateTime(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the symbol that's referenced or returns [`None`] if the referenced value isn't a BSON
    /// symbol.
    pub fn as_symbol(self) -> Option<&'a str> {
        match self {
            RawBsonRef::Symbol(v) => Some(v),
            _ => None,
        }
    }

    /// Gets the [`Timestamp`] that's referenced or returns [`None`] if the referenced value isn't
    /// a BSON timestamp.
    pub fn as_timestamp(self) -> Option<Timestamp> {
        match self {
            RawBsonRef::Timestamp(timestamp) => Some(timestamp),
            _ => None,
        }
    }

    /// Gets the null value that's referenced or returns [`None`] if the referenced value isn't a
    /// BSON null.
    pub fn as_null(self) -> Option<()> {
        match self {
            RawBsonRef::Null => Some(()),
            _ => None,
        }
    }

    /// Gets the [`RawDbPointerRef`] that's referenced or returns [`None`] if the referenced value
    /// isn't a BSON DB pointer.
    pub fn as_db_pointer(self) -> Option<RawDbPointerRef<'a>> {
        match self {
            RawBsonRef::DbPointer(d) => Some(d),
            _ => None,
        }
    }

    /// Gets the code that's referenced or returns [`None`] if the referenced value isn't BSON
    /// JavaScript.
    pub fn as_javascript(self) -> Option<&'a str> {
        match self {
            RawBsonRef::JavaScriptCode(s) => Some(s),
            _ => None,
        }
    }

    /// Gets the [`RawJavaScriptCodeWithScopeRef`] that's referenced or returns [`None`] if the
    /// referenced value isn't BSON JavaScript with scope.
    pub fn as_javascript_with_scope(self) -> Option<RawJavaScriptCodeWithScopeRef<'a>> {
        match self {
            RawBsonRef::JavaScriptCodeWithScope(s) => Some(s),
            _ => None,
        }
    }

    /// Convert this [`RawBsonRef`] to the equivalent owned [`RawBson`].
    pub fn to_raw_bson(self) -> RawBson {
        match self {
            RawBsonRef::Double(d) => RawBson::Double(d),
            RawBsonRef::String(s) => RawBson::String(s.to_string()),
            RawBsonRef::Array(a) => RawBson::Array(a.to_owned()),
            RawBsonRef::Document(d) => RawBson::Document(d.to_owned()),
            RawBsonRef::Boolean(b) => RawBson::Boolean(b),
            RawBsonRef::Null => RawBson::Null,
            RawBsonRef::RegularExpression(re) => RawBson::RegularExpression(super::Regex {
                // wire cstrings cannot contain interior nuls
                pattern: super::CString::from_unchecked(re.pattern.to_string()),
                options: super::CString::from_unchecked(re.options.to_string()),
            }),
            RawBsonRef::JavaScriptCode(c) => RawBson::JavaScriptCode(c.to_owned()),
            RawBsonRef::JavaScriptCodeWithScope(c_w_s) => {
                RawBson::JavaScriptCodeWithScope(super::RawJavaScriptCodeWithScope {
                    code: c_w_s.code.to_string(),
                    scope: c_w_s.scope.to_owned(),
                })
            }
            RawBsonRef::Int32(i) => RawBson::Int32(i),
            RawBsonRef::Int64(i) => RawBson::Int64(i),
            RawBsonRef::Timestamp(t) => RawBson::Timestamp(t),
            RawBsonRef::Binary(b) => RawBson::Binary(super::Binary {
                subtype: b.subtype,
                bytes: b.bytes.to_vec(),
            }),
            RawBsonRef::ObjectId(o) => RawBson::ObjectId(o),
            RawBsonRef::DateTime(dt) => RawBson::DateTime(dt),
            RawBsonRef::Symbol(s) => RawBson::Symbol(s.to_string()),
            RawBsonRef::Undefined => RawBson::Undefined,
            RawBsonRef::MaxKey => RawBson::MaxKey,
            RawBsonRef::MinKey => RawBson::MinKey,
            RawBsonRef::DbPointer(d) => RawBson::DbPointer(super::DbPointer {
                namespace: d.namespace.to_string(),
                id: d.id,
            }),
        }
    }

    /// Append this value's payload encoding (everything after the element's
    /// name) to the buffer.
    pub(crate) fn append_to(self, buf: &mut Vec<u8>) -> Result<()> {
        match self {
            RawBsonRef::Double(d) => {
                buf.extend(d.to_le_bytes());
            }
            RawBsonRef::String(s) => {
                write_string(buf, s);
            }
            RawBsonRef::Document(d) => {
                buf.extend(d.as_bytes());
            }
            RawBsonRef::Array(a) => {
                buf.extend(a.as_bytes());
            }
            RawBsonRef::Binary(b) => {
                buf.extend((b.bytes.len() as i32).to_le_bytes());
                buf.push(b.subtype.into());
                buf.extend(b.bytes);
            }
            RawBsonRef::Boolean(b) => {
                buf.push(b as u8);
            }
            RawBsonRef::DateTime(dt) => {
                buf.extend(dt.timestamp_millis().to_le_bytes());
            }
            RawBsonRef::DbPointer(dbp) => {
                write_string(buf, dbp.namespace);
                buf.extend(dbp.id.bytes());
            }
            RawBsonRef::RegularExpression(re) => {
                let pattern: &CStr = re.pattern.try_into()?;
                let options: &CStr = re.options.try_into()?;
                write_cstring(buf, pattern);
                write_cstring(buf, options);
            }
            RawBsonRef::JavaScriptCode(js) => {
                write_string(buf, js);
            }
            RawBsonRef::JavaScriptCodeWithScope(code_w_scope) => {
                buf.extend((code_w_scope.len() as i32).to_le_bytes());
                write_string(buf, code_w_scope.code);
                buf.extend(code_w_scope.scope.as_bytes());
            }
            RawBsonRef::Timestamp(ts) => {
                buf.extend(ts.to_le_bytes());
            }
            RawBsonRef::ObjectId(oid) => {
                buf.extend(oid.bytes());
            }
            RawBsonRef::Symbol(s) => {
                write_string(buf, s);
            }
            RawBsonRef::Int32(i) => {
                buf.extend(i.to_le_bytes());
            }
            RawBsonRef::Int64(i) => {
                buf.extend(i.to_le_bytes());
            }
            RawBsonRef::Null | RawBsonRef::Undefined | RawBsonRef::MinKey | RawBsonRef::MaxKey => {}
        }
        Ok(())
    }
}

/// A BSON binary value referencing raw bytes stored elsewhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawBinaryRef<'a> {
    /// The subtype of the binary value.
    pub subtype: BinarySubtype,

    /// The binary bytes.
    pub bytes: &'a [u8],
}

/// A BSON regex referencing raw bytes stored elsewhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawRegexRef<'a> {
    /// The regex pattern to match.
    pub pattern: &'a str,

    /// The options for the regex.
    pub options: &'a str,
}

/// A BSON "code with scope" value referencing raw bytes stored elsewhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawJavaScriptCodeWithScopeRef<'a> {
    /// The JavaScript code.
    pub code: &'a str,

    /// The scope document containing variable bindings.
    pub scope: &'a RawDocument,
}

impl<'a> RawJavaScriptCodeWithScopeRef<'a> {
    pub(crate) fn len(self) -> usize {
        4 + 4 + self.code.len() + 1 + self.scope.as_bytes().len()
    }
}

/// A BSON DB pointer value referencing raw bytes stored elsewhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawDbPointerRef<'a> {
    /// The database and collection the pointer refers to.
    pub namespace: &'a str,

    /// The id of the referenced document.
    pub id: ObjectId,
}

impl<'a> From<i32> for RawBsonRef<'a> {
    fn from(i: i32) -> Self {
        RawBsonRef::Int32(i)
    }
}

impl<'a> From<i64> for RawBsonRef<'a> {
    fn from(i: i64) -> Self {
        RawBsonRef::Int64(i)
    }
}

impl<'a> From<&'a str> for RawBsonRef<'a> {
    fn from(s: &'a str) -> Self {
        RawBsonRef::String(s)
    }
}

impl<'a> From<f64> for RawBsonRef<'a> {
    fn from(f: f64) -> Self {
        RawBsonRef::Double(f)
    }
}

impl<'a> From<bool> for RawBsonRef<'a> {
    fn from(b: bool) -> Self {
        RawBsonRef::Boolean(b)
    }
}

impl<'a> From<&'a RawDocument> for RawBsonRef<'a> {
    fn from(d: &'a RawDocument) -> Self {
        RawBsonRef::Document(d)
    }
}

impl<'a> From<&'a RawArray> for RawBsonRef<'a> {
    fn from(a: &'a RawArray) -> Self {
        RawBsonRef::Array(a)
    }
}

impl<'a> From<ObjectId> for RawBsonRef<'a> {
    fn from(o: ObjectId) -> Self {
        RawBsonRef::ObjectId(o)
    }
}

impl<'a> From<DateTime> for RawBsonRef<'a> {
    fn from(dt: DateTime) -> Self {
        RawBsonRef::DateTime(dt)
    }
}

impl<'a> From<Timestamp> for RawBsonRef<'a> {
    fn from(ts: Timestamp) -> Self {
        RawBsonRef::Timestamp(ts)
    }
}
