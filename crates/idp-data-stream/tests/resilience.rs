use idp_data_stream::{StreamError, TokenKind, TokenReader, TokenWriter};
use std::io::{self, Write};

fn read_all(input: &str) -> Result<serde_json::Value, StreamError> {
    let mut reader = TokenReader::new(input.as_bytes());
    let value = reader.read_value()?;
    reader.end_document()?;
    Ok(value)
}

fn assert_malformed(input: &str) {
    match read_all(input) {
        Err(StreamError::Malformed { .. }) => {}
        other => panic!("expected Malformed for {input:?}, got {other:?}"),
    }
}

/// Sink whose peer has gone away.
struct HungUp;

impl Write for HungUp {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink that fails with a non-disconnect error.
struct DiskFull;

impl Write for DiskFull {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "no space left"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_truncated_object_reports_end_document_then_fails() {
    let mut reader = TokenReader::new(r#"{"a": 1"#.as_bytes());
    reader.begin_object().unwrap();
    assert_eq!(reader.next_name().unwrap(), "a");
    reader.skip_value().unwrap();
    assert_eq!(reader.peek().unwrap(), TokenKind::EndDocument);
    assert!(reader.end_object().unwrap_err().is_malformed());
}

#[test]
fn test_name_without_value() {
    let mut reader = TokenReader::new(r#"{"a":"#.as_bytes());
    reader.begin_object().unwrap();
    reader.next_name().unwrap();
    assert!(reader.skip_value().unwrap_err().is_malformed());
}

#[test]
fn test_empty_input() {
    let mut reader = TokenReader::new(&b""[..]);
    assert_eq!(reader.peek().unwrap(), TokenKind::EndDocument);
    assert!(reader.begin_object().unwrap_err().is_malformed());
}

#[test]
fn test_end_document_inside_object_is_malformed() {
    let mut reader = TokenReader::new(r#"{"a": {}"#.as_bytes());
    reader.begin_object().unwrap();
    reader.next_name().unwrap();
    reader.skip_value().unwrap();
    assert!(reader.end_document().unwrap_err().is_malformed());
}

#[test]
fn test_structural_errors() {
    assert_malformed(r#"{"a" 1}"#);
    assert_malformed(r#"{"a": 1 "b": 2}"#);
    assert_malformed(r#"{"a": 1,}"#);
    assert_malformed(r#"{a: 1}"#);
    assert_malformed("[1 2]");
    assert_malformed("[1,]");
    assert_malformed("[,]");
    assert_malformed("{]");
    assert_malformed("[}");
}

#[test]
fn test_token_errors() {
    assert_malformed(r#""unterminated"#);
    assert_malformed(r#""bad \q escape""#);
    assert_malformed(r#""bad \u12G4""#);
    assert_malformed("\"raw\ncontrol\"");
    assert_malformed("tru");
    assert_malformed("nul");
    assert_malformed("trueish");
    assert_malformed("-");
    assert_malformed("01");
    assert_malformed("+1");
}

#[test]
fn test_out_of_range_number_can_be_skipped() {
    let mut reader = TokenReader::new(r#"{"huge": 1e400, "big": -12345678901234567890123, "n": 7}"#.as_bytes());
    reader.begin_object().unwrap();
    assert_eq!(reader.next_name().unwrap(), "huge");
    assert_eq!(reader.peek().unwrap(), TokenKind::Number);
    reader.skip_value().unwrap();
    assert_eq!(reader.next_name().unwrap(), "big");
    reader.skip_value().unwrap();
    assert_eq!(reader.next_name().unwrap(), "n");
    assert_eq!(reader.next_number().unwrap().as_u64(), Some(7));
    reader.end_object().unwrap();
    reader.end_document().unwrap();
}

#[test]
fn test_out_of_range_number_fails_when_materialized() {
    assert_malformed("[1e400]");
    assert_malformed("[1.5e]");
}

#[test]
fn test_trailing_content_is_malformed() {
    assert_malformed("{} {}");
    assert_malformed("{} x");
    assert!(read_all("{}  \n").is_ok());
}

#[test]
fn test_invalid_utf8_is_malformed() {
    let bytes: &[u8] = b"\"\xff\xfe\"";
    let mut reader = TokenReader::new(bytes);
    assert!(reader.peek().unwrap_err().is_malformed());
}

#[test]
fn test_malformed_reports_offset() {
    let mut reader = TokenReader::new(r#"{"a": 1 "b": 2}"#.as_bytes());
    reader.begin_object().unwrap();
    reader.next_name().unwrap();
    reader.skip_value().unwrap();
    match reader.peek().unwrap_err() {
        StreamError::Malformed { offset, .. } => assert_eq!(offset, 9),
        other => panic!("expected Malformed, got {other:?}"),
    }
}

#[test]
fn test_broken_pipe_closes_writer() {
    let mut writer = TokenWriter::new(HungUp);
    assert!(matches!(writer.begin_object(), Err(StreamError::StreamClosed)));
    assert!(writer.is_closed());
    assert!(matches!(writer.name("x"), Err(StreamError::StreamClosed)));
}

#[test]
fn test_other_sink_errors_are_io() {
    let mut writer = TokenWriter::new(DiskFull);
    assert!(matches!(writer.begin_object(), Err(StreamError::Io(_))));
    assert!(!writer.is_closed());
}
