//! Incremental JSON token reader.

use crate::errors::StreamError;
use crate::token::{Scope, TokenKind, MAX_NESTING_DEPTH};
use serde_json::{Map, Number, Value};
use std::io::{self, Read};

const BUFFER_SIZE: usize = 8 * 1024;

/// A token that has been scanned but not yet consumed.
#[derive(Debug, Clone, PartialEq)]
enum Peeked {
    BeginObject,
    EndObject,
    BeginArray,
    EndArray,
    Name(String),
    String(String),
    Number(String),
    Bool(bool),
    Null,
    EndDocument,
}

impl Peeked {
    fn kind(&self) -> TokenKind {
        match self {
            Peeked::BeginObject => TokenKind::BeginObject,
            Peeked::EndObject => TokenKind::EndObject,
            Peeked::BeginArray => TokenKind::BeginArray,
            Peeked::EndArray => TokenKind::EndArray,
            Peeked::Name(_) => TokenKind::Name,
            Peeked::String(_) => TokenKind::String,
            Peeked::Number(_) => TokenKind::Number,
            Peeked::Bool(_) => TokenKind::Bool,
            Peeked::Null => TokenKind::Null,
            Peeked::EndDocument => TokenKind::EndDocument,
        }
    }
}

/// Pull-style reader over a single JSON document.
///
/// The reader scans the underlying source one token at a time and never
/// buffers more than a fixed-size window of input, so documents of any size
/// can be traversed. Values that the caller is not interested in can be
/// discarded with [`skip_value`](Self::skip_value).
///
/// [`TokenKind::EndDocument`] is reported whenever the input is exhausted at
/// a token boundary, at any depth. Structural reads then fail with
/// [`StreamError::Malformed`]. After any `Malformed` error the read position
/// is undefined and the reader must be abandoned.
///
/// # Example
///
/// ```rust
/// use idp_data_stream::{TokenKind, TokenReader};
///
/// let mut reader = TokenReader::new(r#"{"keep": 1, "drop": [1, 2, {"x": null}]}"#.as_bytes());
/// reader.begin_object()?;
/// assert_eq!(reader.next_name()?, "keep");
/// assert_eq!(reader.next_number()?.as_i64(), Some(1));
/// assert_eq!(reader.next_name()?, "drop");
/// reader.skip_value()?;
/// assert_eq!(reader.peek()?, TokenKind::EndObject);
/// reader.end_object()?;
/// reader.end_document()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # See Also
///
/// - [`TokenWriter`](crate::TokenWriter) - Emit token streams
pub struct TokenReader<'a> {
    source: Box<dyn Read + 'a>,
    buffer: Vec<u8>,
    pos: usize,
    limit: usize,
    consumed: u64,
    stack: Vec<Scope>,
    peeked: Option<Peeked>,
}

impl<'a> TokenReader<'a> {
    /// Creates a reader positioned before the document's top-level value.
    pub fn new<R: Read + 'a>(source: R) -> Self {
        Self {
            source: Box::new(source),
            buffer: vec![0u8; BUFFER_SIZE],
            pos: 0,
            limit: 0,
            consumed: 0,
            stack: vec![Scope::EmptyDocument],
            peeked: None,
        }
    }

    /// Returns the number of bytes consumed from the source so far.
    pub fn position(&self) -> u64 {
        self.consumed + self.pos as u64
    }

    /// Returns the current nesting depth (0 at the top level).
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Returns the kind of the next token without consuming it.
    pub fn peek(&mut self) -> Result<TokenKind, StreamError> {
        let peeked = match self.peeked.take() {
            Some(peeked) => peeked,
            None => self.scan()?,
        };
        let kind = peeked.kind();
        self.peeked = Some(peeked);
        Ok(kind)
    }

    /// Returns true if the current object or array has another element.
    pub fn has_next(&mut self) -> Result<bool, StreamError> {
        Ok(!matches!(
            self.peek()?,
            TokenKind::EndObject | TokenKind::EndArray | TokenKind::EndDocument
        ))
    }

    /// Consumes the `{` that opens an object.
    pub fn begin_object(&mut self) -> Result<(), StreamError> {
        self.take_expected(TokenKind::BeginObject)?;
        self.push(Scope::EmptyObject)
    }

    /// Consumes the `}` that closes the current object.
    pub fn end_object(&mut self) -> Result<(), StreamError> {
        self.take_expected(TokenKind::EndObject)?;
        self.stack.pop();
        Ok(())
    }

    /// Consumes the `[` that opens an array.
    pub fn begin_array(&mut self) -> Result<(), StreamError> {
        self.take_expected(TokenKind::BeginArray)?;
        self.push(Scope::EmptyArray)
    }

    /// Consumes the `]` that closes the current array.
    pub fn end_array(&mut self) -> Result<(), StreamError> {
        self.take_expected(TokenKind::EndArray)?;
        self.stack.pop();
        Ok(())
    }

    /// Consumes an object member name.
    pub fn next_name(&mut self) -> Result<String, StreamError> {
        match self.take_expected(TokenKind::Name)? {
            Peeked::Name(name) => Ok(name),
            other => Err(self.mismatch(TokenKind::Name, other.kind())),
        }
    }

    /// Consumes a string value.
    pub fn next_string(&mut self) -> Result<String, StreamError> {
        match self.take_expected(TokenKind::String)? {
            Peeked::String(value) => Ok(value),
            other => Err(self.mismatch(TokenKind::String, other.kind())),
        }
    }

    /// Consumes a number value.
    pub fn next_number(&mut self) -> Result<Number, StreamError> {
        match self.take_expected(TokenKind::Number)? {
            Peeked::Number(text) => serde_json::from_str::<Number>(&text)
                .map_err(|_| self.malformed(format!("number '{text}' is out of range"))),
            other => Err(self.mismatch(TokenKind::Number, other.kind())),
        }
    }

    /// Consumes a boolean value.
    pub fn next_bool(&mut self) -> Result<bool, StreamError> {
        match self.take_expected(TokenKind::Bool)? {
            Peeked::Bool(value) => Ok(value),
            other => Err(self.mismatch(TokenKind::Bool, other.kind())),
        }
    }

    /// Consumes a `null` literal.
    pub fn next_null(&mut self) -> Result<(), StreamError> {
        self.take_expected(TokenKind::Null)?;
        Ok(())
    }

    /// Consumes and discards one complete value.
    ///
    /// Objects and arrays are traversed to their matching end token without
    /// being materialized. If the reader is positioned on a member name, the
    /// name and its value are skipped together. On return the cursor sits
    /// immediately after the skipped value.
    pub fn skip_value(&mut self) -> Result<(), StreamError> {
        let mut depth = 0usize;
        loop {
            match self.peek()? {
                TokenKind::BeginObject => {
                    self.begin_object()?;
                    depth += 1;
                }
                TokenKind::BeginArray => {
                    self.begin_array()?;
                    depth += 1;
                }
                TokenKind::EndObject if depth > 0 => {
                    self.end_object()?;
                    depth -= 1;
                }
                TokenKind::EndArray if depth > 0 => {
                    self.end_array()?;
                    depth -= 1;
                }
                TokenKind::Name => {
                    self.take()?;
                    continue;
                }
                TokenKind::EndDocument => {
                    return Err(self.malformed("unexpected end of input while skipping a value"));
                }
                kind @ (TokenKind::EndObject | TokenKind::EndArray) => {
                    return Err(self.malformed(format!("expected a value to skip but found {kind}")));
                }
                TokenKind::String | TokenKind::Number | TokenKind::Bool | TokenKind::Null => {
                    self.take()?;
                }
            }
            if depth == 0 {
                return Ok(());
            }
        }
    }

    /// Consumes exactly one value and returns it as a [`serde_json::Value`].
    ///
    /// Intended for small, bounded values such as a single entity; callers
    /// that need to traverse large regions should use the token methods.
    pub fn read_value(&mut self) -> Result<Value, StreamError> {
        match self.peek()? {
            TokenKind::BeginObject => {
                self.begin_object()?;
                let mut map = Map::new();
                while self.has_next()? {
                    let name = self.next_name()?;
                    let value = self.read_value()?;
                    map.insert(name, value);
                }
                self.end_object()?;
                Ok(Value::Object(map))
            }
            TokenKind::BeginArray => {
                self.begin_array()?;
                let mut items = Vec::new();
                while self.has_next()? {
                    items.push(self.read_value()?);
                }
                self.end_array()?;
                Ok(Value::Array(items))
            }
            TokenKind::String => Ok(Value::String(self.next_string()?)),
            TokenKind::Number => Ok(Value::Number(self.next_number()?)),
            TokenKind::Bool => Ok(Value::Bool(self.next_bool()?)),
            TokenKind::Null => {
                self.next_null()?;
                Ok(Value::Null)
            }
            kind => Err(self.malformed(format!("expected a value but found {kind}"))),
        }
    }

    /// Verifies that the top-level value is complete and no input remains.
    pub fn end_document(&mut self) -> Result<(), StreamError> {
        match self.peek()? {
            TokenKind::EndDocument if self.stack == [Scope::NonEmptyDocument] => Ok(()),
            TokenKind::EndDocument => Err(self.malformed("unexpected end of input")),
            kind => Err(self.mismatch(TokenKind::EndDocument, kind)),
        }
    }

    fn take(&mut self) -> Result<Peeked, StreamError> {
        match self.peeked.take() {
            Some(peeked) => Ok(peeked),
            None => self.scan(),
        }
    }

    fn take_expected(&mut self, expected: TokenKind) -> Result<Peeked, StreamError> {
        let found = self.peek()?;
        if found != expected {
            return Err(self.mismatch(expected, found));
        }
        self.take()
    }

    fn push(&mut self, scope: Scope) -> Result<(), StreamError> {
        if self.stack.len() > MAX_NESTING_DEPTH {
            return Err(self.malformed(format!(
                "nesting deeper than {MAX_NESTING_DEPTH} levels"
            )));
        }
        self.stack.push(scope);
        Ok(())
    }

    fn set_top(&mut self, scope: Scope) {
        if let Some(top) = self.stack.last_mut() {
            *top = scope;
        }
    }

    fn malformed(&self, reason: impl Into<String>) -> StreamError {
        StreamError::Malformed {
            offset: self.position(),
            reason: reason.into(),
        }
    }

    fn mismatch(&self, expected: TokenKind, found: TokenKind) -> StreamError {
        if found == TokenKind::EndDocument {
            return self.malformed(format!("expected {expected} but input ended"));
        }
        self.malformed(format!("expected {expected} but found {found}"))
    }

    /// Scans the next token according to the current scope.
    fn scan(&mut self) -> Result<Peeked, StreamError> {
        let top = match self.stack.last() {
            Some(top) => *top,
            None => return Err(self.malformed("reader has no open scope")),
        };

        match top {
            Scope::EmptyDocument => {
                let Some(c) = self.next_non_whitespace()? else {
                    return Ok(Peeked::EndDocument);
                };
                self.set_top(Scope::NonEmptyDocument);
                self.scan_value(c)
            }
            Scope::NonEmptyDocument => match self.next_non_whitespace()? {
                None => Ok(Peeked::EndDocument),
                Some(c) => Err(self.malformed(format!(
                    "unexpected {} after the top-level value",
                    describe(c)
                ))),
            },
            Scope::EmptyArray | Scope::NonEmptyArray => {
                let Some(mut c) = self.next_non_whitespace()? else {
                    return Ok(Peeked::EndDocument);
                };
                if c == b']' {
                    return Ok(Peeked::EndArray);
                }
                if top == Scope::NonEmptyArray {
                    if c != b',' {
                        return Err(self.malformed(format!(
                            "expected ',' or ']' but found {}",
                            describe(c)
                        )));
                    }
                    c = match self.next_non_whitespace()? {
                        Some(c) => c,
                        None => return Ok(Peeked::EndDocument),
                    };
                }
                self.set_top(Scope::NonEmptyArray);
                self.scan_value(c)
            }
            Scope::EmptyObject | Scope::NonEmptyObject => {
                let Some(mut c) = self.next_non_whitespace()? else {
                    return Ok(Peeked::EndDocument);
                };
                if c == b'}' {
                    return Ok(Peeked::EndObject);
                }
                if top == Scope::NonEmptyObject {
                    if c != b',' {
                        return Err(self.malformed(format!(
                            "expected ',' or '}}' but found {}",
                            describe(c)
                        )));
                    }
                    c = match self.next_non_whitespace()? {
                        Some(c) => c,
                        None => return Ok(Peeked::EndDocument),
                    };
                }
                if c != b'"' {
                    return Err(self.malformed(format!(
                        "expected a member name but found {}",
                        describe(c)
                    )));
                }
                let name = self.scan_string()?;
                self.set_top(Scope::DanglingName);
                Ok(Peeked::Name(name))
            }
            Scope::DanglingName => {
                let Some(c) = self.next_non_whitespace()? else {
                    return Ok(Peeked::EndDocument);
                };
                if c != b':' {
                    return Err(self.malformed(format!(
                        "expected ':' after member name but found {}",
                        describe(c)
                    )));
                }
                self.set_top(Scope::NonEmptyObject);
                let Some(c) = self.next_non_whitespace()? else {
                    return Ok(Peeked::EndDocument);
                };
                self.scan_value(c)
            }
        }
    }

    fn scan_value(&mut self, c: u8) -> Result<Peeked, StreamError> {
        match c {
            b'{' => Ok(Peeked::BeginObject),
            b'[' => Ok(Peeked::BeginArray),
            b'"' => Ok(Peeked::String(self.scan_string()?)),
            b't' => {
                self.scan_literal(b"rue")?;
                Ok(Peeked::Bool(true))
            }
            b'f' => {
                self.scan_literal(b"alse")?;
                Ok(Peeked::Bool(false))
            }
            b'n' => {
                self.scan_literal(b"ull")?;
                Ok(Peeked::Null)
            }
            b'-' | b'0'..=b'9' => Ok(Peeked::Number(self.scan_number(c)?)),
            other => Err(self.malformed(format!("unexpected {}", describe(other)))),
        }
    }

    fn scan_literal(&mut self, rest: &[u8]) -> Result<(), StreamError> {
        for expected in rest {
            match self.next_byte()? {
                Some(b) if b == *expected => {}
                Some(b) => {
                    return Err(self.malformed(format!("invalid literal near {}", describe(b))))
                }
                None => return Err(self.malformed("unexpected end of input in literal")),
            }
        }
        match self.peek_byte()? {
            Some(b) if b.is_ascii_alphanumeric() || b == b'_' => {
                Err(self.malformed(format!("invalid literal near {}", describe(b))))
            }
            _ => Ok(()),
        }
    }

    /// Scans a number literal. Only the grammar is checked here; conversion
    /// is left to [`next_number`](Self::next_number) so skipped values never
    /// need to fit a `Number`.
    fn scan_number(&mut self, first: u8) -> Result<String, StreamError> {
        let mut text = String::new();
        text.push(first as char);
        while let Some(b) = self.peek_byte()? {
            if b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E') {
                text.push(b as char);
                self.pos += 1;
            } else {
                break;
            }
        }
        if is_number_literal(text.as_bytes()) {
            Ok(text)
        } else {
            Err(self.malformed(format!("invalid number '{text}'")))
        }
    }

    /// Scans a string body; the opening quote has already been consumed.
    fn scan_string(&mut self) -> Result<String, StreamError> {
        let mut bytes = Vec::new();
        loop {
            let Some(b) = self.next_byte()? else {
                return Err(self.malformed("unterminated string"));
            };
            match b {
                b'"' => break,
                b'\\' => self.scan_escape(&mut bytes)?,
                0x00..=0x1f => {
                    return Err(self.malformed("unescaped control character in string"));
                }
                _ => bytes.push(b),
            }
        }
        String::from_utf8(bytes).map_err(|_| self.malformed("invalid UTF-8 in string"))
    }

    fn scan_escape(&mut self, out: &mut Vec<u8>) -> Result<(), StreamError> {
        let Some(b) = self.next_byte()? else {
            return Err(self.malformed("unterminated escape sequence"));
        };
        let ch = match b {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{8}',
            b'f' => '\u{c}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => {
                let unit = self.scan_hex4()?;
                if (0xD800..0xDC00).contains(&unit) {
                    if self.next_byte()? != Some(b'\\') || self.next_byte()? != Some(b'u') {
                        return Err(self.malformed("unpaired surrogate in \\u escape"));
                    }
                    let low = self.scan_hex4()?;
                    if !(0xDC00..0xE000).contains(&low) {
                        return Err(self.malformed("unpaired surrogate in \\u escape"));
                    }
                    let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                    char::from_u32(code)
                        .ok_or_else(|| self.malformed("invalid code point in \\u escape"))?
                } else {
                    char::from_u32(unit)
                        .ok_or_else(|| self.malformed("unpaired surrogate in \\u escape"))?
                }
            }
            other => {
                return Err(self.malformed(format!(
                    "invalid escape sequence \\{}",
                    other as char
                )))
            }
        };
        let mut encoded = [0u8; 4];
        out.extend_from_slice(ch.encode_utf8(&mut encoded).as_bytes());
        Ok(())
    }

    fn scan_hex4(&mut self) -> Result<u32, StreamError> {
        let mut value = 0u32;
        for _ in 0..4 {
            let Some(b) = self.next_byte()? else {
                return Err(self.malformed("unterminated \\u escape"));
            };
            let digit = (b as char)
                .to_digit(16)
                .ok_or_else(|| self.malformed("invalid hex digit in \\u escape"))?;
            value = value * 16 + digit;
        }
        Ok(value)
    }

    fn next_non_whitespace(&mut self) -> Result<Option<u8>, StreamError> {
        while let Some(b) = self.next_byte()? {
            if !matches!(b, b' ' | b'\t' | b'\n' | b'\r') {
                return Ok(Some(b));
            }
        }
        Ok(None)
    }

    fn next_byte(&mut self) -> Result<Option<u8>, StreamError> {
        let b = self.peek_byte()?;
        if b.is_some() {
            self.pos += 1;
        }
        Ok(b)
    }

    fn peek_byte(&mut self) -> Result<Option<u8>, StreamError> {
        if self.pos == self.limit && !self.fill()? {
            return Ok(None);
        }
        Ok(Some(self.buffer[self.pos]))
    }

    fn fill(&mut self) -> Result<bool, StreamError> {
        self.consumed += self.limit as u64;
        self.pos = 0;
        self.limit = 0;
        loop {
            match self.source.read(&mut self.buffer) {
                Ok(0) => return Ok(false),
                Ok(n) => {
                    self.limit = n;
                    return Ok(true);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

fn describe(b: u8) -> String {
    if b.is_ascii_graphic() {
        format!("'{}'", b as char)
    } else {
        format!("byte 0x{b:02x}")
    }
}

/// Checks `-? (0 | [1-9][0-9]*) (. [0-9]+)? ([eE] [+-]? [0-9]+)?`.
fn is_number_literal(text: &[u8]) -> bool {
    fn digits(text: &[u8], mut i: usize) -> usize {
        while i < text.len() && text[i].is_ascii_digit() {
            i += 1;
        }
        i
    }

    let mut i = 0;
    if text.first() == Some(&b'-') {
        i += 1;
    }
    match text.get(i) {
        Some(b'0') => i += 1,
        Some(b'1'..=b'9') => i = digits(text, i + 1),
        _ => return false,
    }
    if text.get(i) == Some(&b'.') {
        let end = digits(text, i + 1);
        if end == i + 1 {
            return false;
        }
        i = end;
    }
    if matches!(text.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(text.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let end = digits(text, i);
        if end == i {
            return false;
        }
        i = end;
    }
    i == text.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader(input: &str) -> TokenReader<'_> {
        TokenReader::new(input.as_bytes())
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut r = reader(r#"{"a": true}"#);
        assert_eq!(r.peek().unwrap(), TokenKind::BeginObject);
        assert_eq!(r.peek().unwrap(), TokenKind::BeginObject);
        r.begin_object().unwrap();
        assert_eq!(r.peek().unwrap(), TokenKind::Name);
        assert_eq!(r.next_name().unwrap(), "a");
        assert_eq!(r.peek().unwrap(), TokenKind::Bool);
        assert!(r.next_bool().unwrap());
        r.end_object().unwrap();
        r.end_document().unwrap();
    }

    #[test]
    fn test_escapes_and_surrogates() {
        let mut r = reader(r#""a\"b\\c\/\né😀""#);
        assert_eq!(r.next_string().unwrap(), "a\"b\\c/\né😀");
    }

    #[test]
    fn test_lone_low_surrogate_is_malformed() {
        let mut r = reader(r#""\udc00""#);
        assert!(r.peek().unwrap_err().is_malformed());
    }

    #[test]
    fn test_numbers() {
        let mut r = reader("[0, -12, 3.5, 1e3]");
        r.begin_array().unwrap();
        assert_eq!(r.next_number().unwrap().as_i64(), Some(0));
        assert_eq!(r.next_number().unwrap().as_i64(), Some(-12));
        assert_eq!(r.next_number().unwrap().as_f64(), Some(3.5));
        assert_eq!(r.next_number().unwrap().as_f64(), Some(1000.0));
        r.end_array().unwrap();
    }

    #[test]
    fn test_number_grammar() {
        for ok in ["0", "-0", "12", "3.25", "1e400", "-1E+2", "6.02e-23"] {
            assert!(is_number_literal(ok.as_bytes()), "{ok}");
        }
        for bad in ["-", "01", "1.", ".5", "1e", "1e+", "1.2.3", "+1", "1-2"] {
            assert!(!is_number_literal(bad.as_bytes()), "{bad}");
        }
    }

    #[test]
    fn test_out_of_range_number_fails_only_when_read() {
        let mut r = reader("[1e400, 1e400]");
        r.begin_array().unwrap();
        assert_eq!(r.peek().unwrap(), TokenKind::Number);
        r.skip_value().unwrap();
        assert!(r.next_number().unwrap_err().is_malformed());
    }

    #[test]
    fn test_invalid_number_is_malformed() {
        let mut r = reader("[1.2.3]");
        r.begin_array().unwrap();
        assert!(r.peek().unwrap_err().is_malformed());
    }

    #[test]
    fn test_name_mismatch_reports_expected_kind() {
        let mut r = reader("[1]");
        let err = r.next_name().unwrap_err();
        match err {
            StreamError::Malformed { reason, .. } => {
                assert!(reason.contains("expected NAME"), "{reason}");
            }
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_position_tracks_consumed_bytes() {
        let mut r = reader(r#"  {"a":1}"#);
        r.begin_object().unwrap();
        assert_eq!(r.position(), 3);
    }

    #[test]
    fn test_depth_limit() {
        let input = "[".repeat(MAX_NESTING_DEPTH + 1);
        let mut r = reader(&input);
        let mut result = Ok(());
        for _ in 0..=MAX_NESTING_DEPTH {
            result = r.begin_array();
            if result.is_err() {
                break;
            }
        }
        assert!(result.unwrap_err().is_malformed());
    }
}
