use thiserror::Error;

use crate::spec::ElementType;

pub type Result<T> = std::result::Result<T, Error>;

/// An error that can occur in the `bsonpath` crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,

    /// The document key associated with the error, if any.
    pub key: Option<String>,

    /// The array index associated with the error, if any.
    pub index: Option<usize>,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(key) = self.key.as_deref() {
            write!(f, "Error at key \"{key}\": ")?;
        } else if let Some(index) = self.index {
            write!(f, "Error at array index {index}: ")?;
        }

        write!(f, "{}", self.kind)
    }
}

/// The types of errors that can occur in the `bsonpath` crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A type tag outside the set defined by the BSON spec was encountered.
    #[error("invalid element type: {tag:#04x}")]
    #[non_exhaustive]
    InvalidElementType {
        /// The offending tag byte.
        tag: u8,
    },

    /// A typed read was requested for a different wire type than the element carries.
    #[error("incompatible element conversion: expected type {expected:?}, got type {actual:?}")]
    #[non_exhaustive]
    IncompatibleElementConversion {
        /// The type requested by the caller.
        expected: ElementType,

        /// The type stored on the wire.
        actual: ElementType,
    },

    /// A value cannot be encoded under (or decoded from) the target element type.
    #[error("incompatible type conversion: {message}")]
    #[non_exhaustive]
    IncompatibleTypeConversion { message: String },

    /// An element payload does not match its declared or fixed width.
    #[error("invalid element size: expected {expected} bytes, got {actual}")]
    #[non_exhaustive]
    InvalidElementSize {
        /// The number of bytes the element shape requires.
        expected: usize,

        /// The number of bytes actually available or declared.
        actual: usize,
    },

    /// A document length prefix disagrees with its buffer, or the trailing NUL is missing.
    #[error("invalid document size: declared {declared} bytes, buffer holds {actual}")]
    #[non_exhaustive]
    InvalidDocumentSize {
        /// The length recorded in the document's prefix.
        declared: usize,

        /// The byte length actually available.
        actual: usize,
    },

    /// An element name exceeds the encodable length.
    #[error("element name too long: {length} bytes")]
    #[non_exhaustive]
    NameTooLong { length: usize },

    /// An element name contains an interior NUL byte.
    #[error("embedded nul in element name")]
    EmbeddedNulInName,

    /// Invalid UTF-8 bytes were encountered.
    #[error("invalid UTF-8")]
    Utf8Encoding,

    /// JSON text failed to parse.
    #[error("JSON parse error at line {line}, column {column}: {message}")]
    #[non_exhaustive]
    JsonParse {
        message: String,
        line: usize,
        column: usize,
    },

    /// A selection path failed to parse.
    #[error("path parse error at offset {offset}: {message}")]
    #[non_exhaustive]
    PathParse { message: String, offset: usize },

    /// A filter expression failed to parse or compile.
    #[error("expression parse error at offset {offset}: {message}")]
    #[non_exhaustive]
    ExpressionParse { message: String, offset: usize },

    /// A filter expression failed during evaluation.
    #[error("expression evaluation error: {message}")]
    #[non_exhaustive]
    ExpressionEvaluation { message: String },

    /// A [`std::io::Error`] occurred.
    #[error("an IO error occurred: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            key: None,
            index: None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        ErrorKind::Io(value).into()
    }
}

impl Error {
    pub(crate) fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub(crate) fn invalid_element_type(tag: u8) -> Self {
        ErrorKind::InvalidElementType { tag }.into()
    }

    pub(crate) fn incompatible_element_conversion(
        expected: ElementType,
        actual: ElementType,
    ) -> Self {
        ErrorKind::IncompatibleElementConversion { expected, actual }.into()
    }

    pub(crate) fn incompatible_type_conversion(message: impl ToString) -> Self {
        ErrorKind::IncompatibleTypeConversion {
            message: message.to_string(),
        }
        .into()
    }

    pub(crate) fn invalid_element_size(expected: usize, actual: usize) -> Self {
        ErrorKind::InvalidElementSize { expected, actual }.into()
    }

    pub(crate) fn invalid_document_size(declared: usize, actual: usize) -> Self {
        ErrorKind::InvalidDocumentSize { declared, actual }.into()
    }

    pub(crate) fn path_parse(message: impl ToString, offset: usize) -> Self {
        ErrorKind::PathParse {
            message: message.to_string(),
            offset,
        }
        .into()
    }

    pub(crate) fn expression_parse(message: impl ToString, offset: usize) -> Self {
        ErrorKind::ExpressionParse {
            message: message.to_string(),
            offset,
        }
        .into()
    }

    pub(crate) fn expression_evaluation(message: impl ToString) -> Self {
        ErrorKind::ExpressionEvaluation {
            message: message.to_string(),
        }
        .into()
    }

    pub(crate) fn json_parse(message: impl ToString, line: usize, column: usize) -> Self {
        ErrorKind::JsonParse {
            message: message.to_string(),
            line,
            column,
        }
        .into()
    }

    #[cfg(test)]
    pub(crate) fn is_invalid_element_type(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidElementType { .. })
    }

    #[cfg(test)]
    pub(crate) fn is_incompatible_element_conversion(&self) -> bool {
        matches!(self.kind, ErrorKind::IncompatibleElementConversion { .. })
    }

    #[cfg(test)]
    pub(crate) fn is_invalid_element_size(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidElementSize { .. })
    }

    #[cfg(test)]
    pub(crate) fn is_invalid_document_size(&self) -> bool {
        matches!(self.kind, ErrorKind::InvalidDocumentSize { .. })
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::json_parse(&error, error.line(), error.column())
    }
}
