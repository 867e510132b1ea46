//! Incremental JSON token writer.

use crate::errors::StreamError;
use crate::token::{Scalar, Scope, MAX_NESTING_DEPTH};
use serde_json::Value;
use std::io::{self, Write};

/// Push-style writer for a single JSON document.
///
/// Tokens are written to the sink in exactly the order the methods are
/// called. The writer tracks the document structure and rejects calls that
/// would produce invalid JSON with [`StreamError::InvalidState`].
///
/// Once [`close`](Self::close) has been called, or the sink reports that the
/// peer went away, every further call fails with
/// [`StreamError::StreamClosed`].
///
/// # Example
///
/// ```rust
/// use idp_data_stream::TokenWriter;
///
/// let mut out = Vec::new();
/// let mut writer = TokenWriter::new(&mut out);
/// writer.begin_object()?;
/// writer.name("exported-by")?;
/// writer.value("admin")?;
/// writer.end_object()?;
/// writer.close()?;
/// drop(writer);
/// assert_eq!(out, br#"{"exported-by":"admin"}"#);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # See Also
///
/// - [`TokenReader`](crate::TokenReader) - Read token streams
pub struct TokenWriter<'a> {
    sink: Box<dyn Write + 'a>,
    stack: Vec<Scope>,
    indent: String,
    closed: bool,
}

impl<'a> TokenWriter<'a> {
    /// Creates a compact writer over `sink`.
    pub fn new<W: Write + 'a>(sink: W) -> Self {
        Self {
            sink: Box::new(sink),
            stack: vec![Scope::EmptyDocument],
            indent: String::new(),
            closed: false,
        }
    }

    /// Sets the per-level indentation. An empty string produces compact output.
    ///
    /// Indentation is cosmetic and never changes member order.
    pub fn set_indent(&mut self, indent: &str) {
        self.indent = indent.to_string();
    }

    /// Returns true once the writer has been closed.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Writes `{`.
    pub fn begin_object(&mut self) -> Result<(), StreamError> {
        self.before_value()?;
        self.push(Scope::EmptyObject)?;
        self.raw(b"{")
    }

    /// Writes the `}` closing the current object.
    pub fn end_object(&mut self) -> Result<(), StreamError> {
        self.close_scope(Scope::EmptyObject, Scope::NonEmptyObject, b"}")
    }

    /// Writes `[`.
    pub fn begin_array(&mut self) -> Result<(), StreamError> {
        self.before_value()?;
        self.push(Scope::EmptyArray)?;
        self.raw(b"[")
    }

    /// Writes the `]` closing the current array.
    pub fn end_array(&mut self) -> Result<(), StreamError> {
        self.close_scope(Scope::EmptyArray, Scope::NonEmptyArray, b"]")
    }

    /// Writes an object member name. Must be followed by exactly one value.
    pub fn name(&mut self, name: &str) -> Result<(), StreamError> {
        self.ensure_open()?;
        match self.top() {
            Scope::EmptyObject => {}
            Scope::NonEmptyObject => self.raw(b",")?,
            Scope::DanglingName => {
                return Err(StreamError::InvalidState(format!(
                    "name '{name}' written while a previous name has no value"
                )))
            }
            _ => {
                return Err(StreamError::InvalidState(format!(
                    "name '{name}' written outside of an object"
                )))
            }
        }
        self.newline()?;
        self.set_top(Scope::DanglingName);
        self.string(name)
    }

    /// Writes a scalar value.
    pub fn value(&mut self, value: impl Into<Scalar>) -> Result<(), StreamError> {
        self.before_value()?;
        match value.into() {
            Scalar::Null => self.raw(b"null"),
            Scalar::Bool(true) => self.raw(b"true"),
            Scalar::Bool(false) => self.raw(b"false"),
            Scalar::Number(n) => self.raw(n.to_string().as_bytes()),
            Scalar::String(s) => self.string(&s),
        }
    }

    /// Writes an arbitrary JSON value as a sequence of tokens.
    pub fn json_value(&mut self, value: &Value) -> Result<(), StreamError> {
        match value {
            Value::Null => self.value(Scalar::Null),
            Value::Bool(b) => self.value(*b),
            Value::Number(n) => self.value(n.clone()),
            Value::String(s) => self.value(s.as_str()),
            Value::Array(items) => {
                self.begin_array()?;
                for item in items {
                    self.json_value(item)?;
                }
                self.end_array()
            }
            Value::Object(map) => {
                self.begin_object()?;
                for (name, item) in map {
                    self.name(name)?;
                    self.json_value(item)?;
                }
                self.end_object()
            }
        }
    }

    /// Flushes buffered output to the sink.
    pub fn flush(&mut self) -> Result<(), StreamError> {
        self.ensure_open()?;
        match self.sink.flush() {
            Ok(()) => Ok(()),
            Err(e) => Err(self.sink_failed(e)),
        }
    }

    /// Flushes and closes the writer.
    ///
    /// Fails with [`StreamError::InvalidState`] if the document is incomplete.
    pub fn close(&mut self) -> Result<(), StreamError> {
        self.ensure_open()?;
        if self.stack != [Scope::NonEmptyDocument] {
            return Err(StreamError::InvalidState("incomplete document".to_string()));
        }
        self.flush()?;
        self.closed = true;
        Ok(())
    }

    fn before_value(&mut self) -> Result<(), StreamError> {
        self.ensure_open()?;
        match self.top() {
            Scope::EmptyDocument => {
                self.set_top(Scope::NonEmptyDocument);
                Ok(())
            }
            Scope::NonEmptyDocument => Err(StreamError::InvalidState(
                "document already has a top-level value".to_string(),
            )),
            Scope::EmptyArray => {
                self.set_top(Scope::NonEmptyArray);
                self.newline()
            }
            Scope::NonEmptyArray => {
                self.raw(b",")?;
                self.newline()
            }
            Scope::DanglingName => {
                self.set_top(Scope::NonEmptyObject);
                if self.indent.is_empty() {
                    self.raw(b":")
                } else {
                    self.raw(b": ")
                }
            }
            Scope::EmptyObject | Scope::NonEmptyObject => Err(StreamError::InvalidState(
                "value inside an object must be preceded by a name".to_string(),
            )),
        }
    }

    fn close_scope(&mut self, empty: Scope, nonempty: Scope, token: &[u8]) -> Result<(), StreamError> {
        self.ensure_open()?;
        let top = self.top();
        if top == Scope::DanglingName {
            return Err(StreamError::InvalidState("dangling name".to_string()));
        }
        if top != empty && top != nonempty {
            return Err(StreamError::InvalidState(format!(
                "cannot write '{}' here",
                String::from_utf8_lossy(token)
            )));
        }
        self.stack.pop();
        if top == nonempty {
            self.newline()?;
        }
        self.raw(token)
    }

    fn push(&mut self, scope: Scope) -> Result<(), StreamError> {
        if self.stack.len() > MAX_NESTING_DEPTH {
            return Err(StreamError::InvalidState(format!(
                "nesting deeper than {MAX_NESTING_DEPTH} levels"
            )));
        }
        self.stack.push(scope);
        Ok(())
    }

    fn top(&self) -> Scope {
        self.stack.last().copied().unwrap_or(Scope::NonEmptyDocument)
    }

    fn set_top(&mut self, scope: Scope) {
        if let Some(top) = self.stack.last_mut() {
            *top = scope;
        }
    }

    fn newline(&mut self) -> Result<(), StreamError> {
        if self.indent.is_empty() {
            return Ok(());
        }
        let mut line = String::from("\n");
        for _ in 1..self.stack.len() {
            line.push_str(&self.indent);
        }
        self.raw(line.as_bytes())
    }

    fn string(&mut self, s: &str) -> Result<(), StreamError> {
        let escaped = serde_json::to_string(s)
            .map_err(|e| StreamError::InvalidState(format!("cannot encode string: {e}")))?;
        self.raw(escaped.as_bytes())
    }

    fn raw(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        match self.sink.write_all(bytes) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.sink_failed(e)),
        }
    }

    fn ensure_open(&self) -> Result<(), StreamError> {
        if self.closed {
            return Err(StreamError::StreamClosed);
        }
        Ok(())
    }

    fn sink_failed(&mut self, e: io::Error) -> StreamError {
        match e.kind() {
            io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected => {
                self.closed = true;
                StreamError::StreamClosed
            }
            _ => StreamError::Io(e),
        }
    }
}

impl Drop for TokenWriter<'_> {
    fn drop(&mut self) {
        if !self.closed {
            let _ = self.sink.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_with(indent: &str, f: impl FnOnce(&mut TokenWriter<'_>)) -> String {
        let mut out = Vec::new();
        {
            let mut writer = TokenWriter::new(&mut out);
            writer.set_indent(indent);
            f(&mut writer);
            writer.close().unwrap();
        }
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_compact_output() {
        let out = write_with("", |w| {
            w.begin_object().unwrap();
            w.name("a").unwrap();
            w.value(1i64).unwrap();
            w.name("b").unwrap();
            w.begin_array().unwrap();
            w.value(true).unwrap();
            w.value(Scalar::Null).unwrap();
            w.end_array().unwrap();
            w.end_object().unwrap();
        });
        assert_eq!(out, r#"{"a":1,"b":[true,null]}"#);
    }

    #[test]
    fn test_indented_output() {
        let out = write_with("  ", |w| {
            w.begin_object().unwrap();
            w.name("a").unwrap();
            w.begin_array().unwrap();
            w.value("x").unwrap();
            w.end_array().unwrap();
            w.name("b").unwrap();
            w.begin_object().unwrap();
            w.end_object().unwrap();
            w.end_object().unwrap();
        });
        assert_eq!(out, "{\n  \"a\": [\n    \"x\"\n  ],\n  \"b\": {}\n}");
    }

    #[test]
    fn test_string_escaping() {
        let out = write_with("", |w| w.value("quote\" slash\\ nl\n tab\t").unwrap());
        assert_eq!(out, r#""quote\" slash\\ nl\n tab\t""#);
    }

    #[test]
    fn test_json_value_matches_serde() {
        let value = json!({"clients": [{"id": "c1", "scope": ["openid"], "ttl": 3600}]});
        let out = write_with("", |w| w.json_value(&value).unwrap());
        assert_eq!(out, serde_json::to_string(&value).unwrap());
    }

    #[test]
    fn test_value_without_name_in_object_is_rejected() {
        let mut out = Vec::new();
        let mut writer = TokenWriter::new(&mut out);
        writer.begin_object().unwrap();
        assert!(matches!(writer.value(1i64), Err(StreamError::InvalidState(_))));
    }

    #[test]
    fn test_name_outside_object_is_rejected() {
        let mut out = Vec::new();
        let mut writer = TokenWriter::new(&mut out);
        writer.begin_array().unwrap();
        assert!(matches!(writer.name("x"), Err(StreamError::InvalidState(_))));
    }

    #[test]
    fn test_second_top_level_value_is_rejected() {
        let mut out = Vec::new();
        let mut writer = TokenWriter::new(&mut out);
        writer.value(1i64).unwrap();
        assert!(matches!(writer.value(2i64), Err(StreamError::InvalidState(_))));
    }

    #[test]
    fn test_close_incomplete_document_is_rejected() {
        let mut out = Vec::new();
        let mut writer = TokenWriter::new(&mut out);
        writer.begin_object().unwrap();
        assert!(matches!(writer.close(), Err(StreamError::InvalidState(_))));
    }

    #[test]
    fn test_calls_after_close_fail() {
        let mut out = Vec::new();
        let mut writer = TokenWriter::new(&mut out);
        writer.begin_object().unwrap();
        writer.end_object().unwrap();
        writer.close().unwrap();
        assert!(writer.is_closed());
        assert!(matches!(writer.begin_object(), Err(StreamError::StreamClosed)));
        assert!(matches!(writer.name("x"), Err(StreamError::StreamClosed)));
        assert!(matches!(writer.value("x"), Err(StreamError::StreamClosed)));
        assert!(matches!(writer.close(), Err(StreamError::StreamClosed)));
    }
}
