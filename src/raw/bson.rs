use super::{
    cstr::CString,
    RawArrayBuf,
    RawBinaryRef,
    RawBsonRef,
    RawDbPointerRef,
    RawDocumentBuf,
    RawJavaScriptCodeWithScopeRef,
    RawRegexRef,
};
use crate::{
    datetime::Timestamp,
    oid::ObjectId,
    spec::{BinarySubtype, ElementType},
    DateTime,
};

/// A BSON value backed by owned raw BSON bytes.
#[derive(Debug, Clone, PartialEq)]
pub enum RawBson {
    /// 64-bit binary floating point
    Double(f64),
    /// UTF-8 string
    String(String),
    /// Array
    Array(RawArrayBuf),
    /// Embedded document
    Document(RawDocumentBuf),
    /// Boolean value
    Boolean(bool),
    /// Null value
    Null,
    /// Regular expression
    RegularExpression(Regex),
    /// JavaScript code
    JavaScriptCode(String),
    /// JavaScript code w/ scope
    JavaScriptCodeWithScope(RawJavaScriptCodeWithScope),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// Timestamp
    Timestamp(Timestamp),
    /// Binary data
    Binary(Binary),
    /// [ObjectId](http://dochub.mongodb.org/core/objectids)
    ObjectId(ObjectId),
    /// UTC datetime
    DateTime(DateTime),
    /// Symbol (Deprecated)
    Symbol(String),
    /// Undefined value (Deprecated)
    Undefined,
    /// Max key
    MaxKey,
    /// Min key
    MinKey,
    /// DBPointer (Deprecated)
    DbPointer(DbPointer),
}

impl RawBson {
    /// Get the [`ElementType`] of this value.
    pub fn element_type(&self) -> ElementType {
        self.as_raw_bson_ref().element_type()
    }

    /// Gets a [`RawBsonRef`] value referencing this owned value.
    pub fn as_raw_bson_ref(&self) -> RawBsonRef<'_> {
        match self {
            RawBson::Double(d) => RawBsonRef::Double(*d),
            RawBson::String(s) => RawBsonRef::String(s),
            RawBson::Array(a) => RawBsonRef::Array(a),
            RawBson::Document(d) => RawBsonRef::Document(d),
            RawBson::Boolean(b) => RawBsonRef::Boolean(*b),
            RawBson::Null => RawBsonRef::Null,
            RawBson::RegularExpression(re) => RawBsonRef::RegularExpression(RawRegexRef {
                pattern: re.pattern.as_str(),
                options: re.options.as_str(),
            }),
            RawBson::JavaScriptCode(c) => RawBsonRef::JavaScriptCode(c),
            RawBson::JavaScriptCodeWithScope(c_w_s) => {
                RawBsonRef::JavaScriptCodeWithScope(RawJavaScriptCodeWithScopeRef {
                    code: &c_w_s.code,
                    scope: &c_w_s.scope,
                })
            }
            RawBson::Int32(i) => RawBsonRef::Int32(*i),
            RawBson::Int64(i) => RawBsonRef::Int64(*i),
            RawBson::Timestamp(ts) => RawBsonRef::Timestamp(*ts),
            RawBson::Binary(b) => RawBsonRef::Binary(RawBinaryRef {
                subtype: b.subtype,
                bytes: &b.bytes,
            }),
            RawBson::ObjectId(o) => RawBsonRef::ObjectId(*o),
            RawBson::DateTime(dt) => RawBsonRef::DateTime(*dt),
            RawBson::Symbol(s) => RawBsonRef::Symbol(s),
            RawBson::Undefined => RawBsonRef::Undefined,
            RawBson::MaxKey => RawBsonRef::MaxKey,
            RawBson::MinKey => RawBsonRef::MinKey,
            RawBson::DbPointer(d) => RawBsonRef::DbPointer(RawDbPointerRef {
                namespace: &d.namespace,
                id: d.id,
            }),
        }
    }
}

/// A BSON binary value with an owned payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    /// The subtype of the binary value.
    pub subtype: BinarySubtype,

    /// The binary bytes.
    pub bytes: Vec<u8>,
}

/// A BSON regular expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Regex {
    /// The regex pattern to match.
    pub pattern: CString,

    /// The options for the regex.
    pub options: CString,
}

/// A BSON "code with scope" value with owned code and scope.
#[derive(Debug, Clone, PartialEq)]
pub struct RawJavaScriptCodeWithScope {
    /// The JavaScript code.
    pub code: String,

    /// The scope document containing variable bindings.
    pub scope: RawDocumentBuf,
}

/// A BSON DB pointer value.
#[derive(Debug, Clone, PartialEq)]
pub struct DbPointer {
    /// The database and collection the pointer refers to.
    pub namespace: String,

    /// The id of the referenced document.
    pub id: ObjectId,
}

impl From<f32> for RawBson {
    fn from(f: f32) -> Self {
        RawBson::Double(f as f64)
    }
}

impl From<f64> for RawBson {
    fn from(f: f64) -> Self {
        RawBson::Double(f)
    }
}

impl From<i8> for RawBson {
    fn from(i: i8) -> Self {
        RawBson::Int32(i as i32)
    }
}

impl From<i16> for RawBson {
    fn from(i: i16) -> Self {
        RawBson::Int32(i as i32)
    }
}

impl From<i32> for RawBson {
    fn from(i: i32) -> Self {
        RawBson::Int32(i)
    }
}

impl From<i64> for RawBson {
    fn from(i: i64) -> Self {
        RawBson::Int64(i)
    }
}

impl From<bool> for RawBson {
    fn from(b: bool) -> Self {
        RawBson::Boolean(b)
    }
}

impl From<&str> for RawBson {
    fn from(s: &str) -> Self {
        RawBson::String(s.to_owned())
    }
}

impl From<String> for RawBson {
    fn from(s: String) -> Self {
        RawBson::String(s)
    }
}

impl From<RawDocumentBuf> for RawBson {
    fn from(d: RawDocumentBuf) -> Self {
        RawBson::Document(d)
    }
}

impl From<RawArrayBuf> for RawBson {
    fn from(a: RawArrayBuf) -> Self {
        RawBson::Array(a)
    }
}

impl From<[u8; 12]> for RawBson {
    fn from(bytes: [u8; 12]) -> Self {
        RawBson::ObjectId(ObjectId::from_bytes(bytes))
    }
}

impl From<ObjectId> for RawBson {
    fn from(o: ObjectId) -> Self {
        RawBson::ObjectId(o)
    }
}

impl From<DateTime> for RawBson {
    fn from(dt: DateTime) -> Self {
        RawBson::DateTime(dt)
    }
}

impl From<Timestamp> for RawBson {
    fn from(ts: Timestamp) -> Self {
        RawBson::Timestamp(ts)
    }
}

impl From<Binary> for RawBson {
    fn from(b: Binary) -> Self {
        RawBson::Binary(b)
    }
}

impl From<(BinarySubtype, Vec<u8>)> for RawBson {
    fn from((subtype, bytes): (BinarySubtype, Vec<u8>)) -> Self {
        RawBson::Binary(Binary { subtype, bytes })
    }
}

impl From<Regex> for RawBson {
    fn from(re: Regex) -> Self {
        RawBson::RegularExpression(re)
    }
}

impl From<(CString, CString)> for RawBson {
    fn from((pattern, options): (CString, CString)) -> Self {
        RawBson::RegularExpression(Regex { pattern, options })
    }
}

impl From<DbPointer> for RawBson {
    fn from(d: DbPointer) -> Self {
        RawBson::DbPointer(d)
    }
}

impl From<(String, ObjectId)> for RawBson {
    fn from((namespace, id): (String, ObjectId)) -> Self {
        RawBson::DbPointer(DbPointer { namespace, id })
    }
}

impl From<(String, [u8; 12])> for RawBson {
    fn from((namespace, id): (String, [u8; 12])) -> Self {
        RawBson::DbPointer(DbPointer {
            namespace,
            id: ObjectId::from_bytes(id),
        })
    }
}

impl<T: Into<RawBson>> From<Option<T>> for RawBson {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => RawBson::Null,
        }
    }
}
