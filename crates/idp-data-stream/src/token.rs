use serde_json::Number;
use std::fmt;

/// Maximum nesting depth accepted by the reader and writer.
pub const MAX_NESTING_DEPTH: usize = 512;

/// Kind of the next token in a stream, as reported by
/// [`TokenReader::peek`](crate::TokenReader::peek).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// An object member name.
    Name,
    /// `{`
    BeginObject,
    /// `}`
    EndObject,
    /// `[`
    BeginArray,
    /// `]`
    EndArray,
    /// A string value.
    String,
    /// A number value.
    Number,
    /// `true` or `false`.
    Bool,
    /// `null`
    Null,
    /// Input exhausted at a token boundary.
    EndDocument,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Name => "NAME",
            TokenKind::BeginObject => "BEGIN_OBJECT",
            TokenKind::EndObject => "END_OBJECT",
            TokenKind::BeginArray => "BEGIN_ARRAY",
            TokenKind::EndArray => "END_ARRAY",
            TokenKind::String => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::Bool => "BOOL",
            TokenKind::Null => "NULL",
            TokenKind::EndDocument => "END_DOCUMENT",
        };
        f.write_str(s)
    }
}

/// A scalar value accepted by [`TokenWriter::value`](crate::TokenWriter::value).
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// `null`
    Null,
    /// `true` / `false`
    Bool(bool),
    /// Any JSON number.
    Number(Number),
    /// A string; escaped on output.
    String(String),
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Bool(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<Number> for Scalar {
    fn from(value: Number) -> Self {
        Scalar::Number(value)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Scalar::Null)
    }
}

/// Position inside the document, shared by reader and writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    EmptyDocument,
    NonEmptyDocument,
    EmptyObject,
    DanglingName,
    NonEmptyObject,
    EmptyArray,
    NonEmptyArray,
}
