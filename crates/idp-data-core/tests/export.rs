use chrono::{TimeZone, Utc};
use idp_data_core::{
    format_timestamp, ExportComposer, ExportError, ExportOutcome, FixedClock, ImportError,
    SectionCodec, VersionRegistry, EXPORTED_AT, EXPORTED_BY, EXPORTED_FROM, MITREID_CONNECT_1_1,
    MITREID_CONNECT_1_2,
};
use idp_data_stream::{TokenReader, TokenWriter};
use serde_json::{json, Value};
use std::io::{self, Write};
use std::sync::Arc;

/// Exporter that writes a fixed list of sections.
struct Sections {
    sections: Vec<(&'static str, Value)>,
}

impl SectionCodec for Sections {
    fn version(&self) -> &str {
        MITREID_CONNECT_1_2
    }

    fn import_section(&self, reader: &mut TokenReader<'_>) -> Result<(), ImportError> {
        Ok(reader.skip_value()?)
    }

    fn export_section(&self, writer: &mut TokenWriter<'_>) -> Result<(), ExportError> {
        for (name, value) in &self.sections {
            writer.name(name)?;
            writer.json_value(value)?;
        }
        Ok(())
    }
}

/// Import-only codec.
struct ImportOnly;

impl SectionCodec for ImportOnly {
    fn version(&self) -> &str {
        MITREID_CONNECT_1_1
    }

    fn import_section(&self, reader: &mut TokenReader<'_>) -> Result<(), ImportError> {
        Ok(reader.skip_value()?)
    }
}

/// Exporter that wrongly closes the root object itself.
struct ClosesRoot;

impl SectionCodec for ClosesRoot {
    fn version(&self) -> &str {
        MITREID_CONNECT_1_2
    }

    fn import_section(&self, reader: &mut TokenReader<'_>) -> Result<(), ImportError> {
        Ok(reader.skip_value()?)
    }

    fn export_section(&self, writer: &mut TokenWriter<'_>) -> Result<(), ExportError> {
        writer.end_object()?;
        Ok(())
    }
}

/// Sink that accepts a fixed number of bytes, then reports a disconnected peer.
struct Disconnecting {
    written: Vec<u8>,
    budget: usize,
}

impl Write for Disconnecting {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.budget == 0 {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "peer went away"));
        }
        let n = buf.len().min(self.budget);
        self.written.extend_from_slice(&buf[..n]);
        self.budget -= n;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn composer(codec: Arc<dyn SectionCodec>) -> ExportComposer {
    let version = codec.version().to_string();
    let registry = VersionRegistry::builder()
        .register(codec)
        .current(version)
        .build()
        .unwrap();
    let clock = FixedClock(Utc.with_ymd_and_hms(2015, 6, 1, 12, 0, 0).unwrap());
    ExportComposer::new(Arc::new(registry), "https://idp.test/").with_clock(Arc::new(clock))
}

/// Reads the top-level member names and values in document order.
fn members(bytes: &[u8]) -> Vec<(String, Value)> {
    let mut reader = TokenReader::new(bytes);
    let mut out = Vec::new();
    reader.begin_object().unwrap();
    while reader.has_next().unwrap() {
        let name = reader.next_name().unwrap();
        let value = reader.read_value().unwrap();
        out.push((name, value));
    }
    reader.end_object().unwrap();
    reader.end_document().unwrap();
    out
}

#[test]
fn test_envelope_precedes_data_section() {
    let composer = composer(Arc::new(Sections {
        sections: vec![(MITREID_CONNECT_1_2, json!({"clients": [{"clientId": "c1"}]}))],
    }));

    let mut out = Vec::new();
    let outcome = composer.export(&mut out, "alice");
    assert_eq!(outcome, ExportOutcome::Completed);

    let members = members(&out);
    assert_eq!(
        members,
        vec![
            (EXPORTED_AT.to_string(), json!("2015-06-01T12:00:00+0000")),
            (EXPORTED_FROM.to_string(), json!("https://idp.test/")),
            (EXPORTED_BY.to_string(), json!("alice")),
            (
                MITREID_CONNECT_1_2.to_string(),
                json!({"clients": [{"clientId": "c1"}]})
            ),
        ]
    );
}

#[test]
fn test_envelope_first_with_many_sections() {
    let composer = composer(Arc::new(Sections {
        sections: vec![
            ("a", json!(1)),
            (MITREID_CONNECT_1_2, json!({})),
            ("z", json!([true])),
        ],
    }));

    let mut out = Vec::new();
    assert!(composer.export(&mut out, "admin@example.org").is_completed());

    let names: Vec<String> = members(&out).into_iter().map(|(name, _)| name).collect();
    assert_eq!(
        names,
        vec![EXPORTED_AT, EXPORTED_FROM, EXPORTED_BY, "a", MITREID_CONNECT_1_2, "z"]
    );
}

#[test]
fn test_default_output_is_indented() {
    let composer = composer(Arc::new(Sections {
        sections: vec![(MITREID_CONNECT_1_2, json!({}))],
    }));

    let mut out = Vec::new();
    assert!(composer.export(&mut out, "alice").is_completed());

    let text = String::from_utf8(out).unwrap();
    assert!(text.starts_with("{\n  \"exported-at\": \"2015-06-01T12:00:00+0000\",\n"));
    assert!(text.ends_with("\n}"));
}

#[test]
fn test_timestamp_format() {
    let at = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 58).unwrap();
    assert_eq!(format_timestamp(at), "2024-02-29T23:59:58+0000");
}

#[test]
fn test_import_only_current_version_aborts() {
    let composer = composer(Arc::new(ImportOnly));

    let mut out = Vec::new();
    match composer.export(&mut out, "alice") {
        ExportOutcome::Aborted { reason } => {
            assert!(reason.contains("does not support export"), "{reason}");
        }
        ExportOutcome::Completed => panic!("export should not complete"),
    }
}

#[test]
fn test_exporter_closing_root_aborts() {
    let composer = composer(Arc::new(ClosesRoot));
    let mut out = Vec::new();
    assert!(!composer.export(&mut out, "alice").is_completed());
}

#[test]
fn test_disconnected_sink_is_not_an_error() {
    let composer = composer(Arc::new(Sections {
        sections: vec![(MITREID_CONNECT_1_2, json!({"clients": [1, 2, 3]}))],
    }))
    .with_indent("");

    let mut sink = Disconnecting {
        written: Vec::new(),
        budget: 20,
    };
    let outcome = composer.export(&mut sink, "alice");

    match outcome {
        ExportOutcome::Aborted { reason } => assert!(reason.contains("stream closed"), "{reason}"),
        ExportOutcome::Completed => panic!("export should not complete"),
    }
    assert_eq!(sink.written, br#"{"exported-at":"2015"#);
}
