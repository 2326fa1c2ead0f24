// Tests for report formatting and the output writer

use super::*;
use ktjson_core::pipeline::DocumentReport;
use ktjson_core::transform::analyze;
use ktjson_core::{ErrorKind, Warning};
use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

fn writer(format: OutputFormat, quiet: bool) -> (OutputWriter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let output = OutputWriter::with_writer(format, false, quiet, Box::new(buffer.clone()));
    (output, buffer)
}

fn document(name: &str, status: DocumentStatus, changes: usize) -> DocumentReport {
    let mut report = DocumentReport::new(
        PathBuf::from(format!("en/{}", name)),
        PathBuf::from(format!("es/{}", name)),
        name,
    );
    report.status = status;
    report.changes = changes;
    report
}

fn sample_batch() -> BatchReport {
    let mut batch = BatchReport::new();
    let mut written = document("actions.json", DocumentStatus::Written, 12);
    written
        .warnings
        .push(Warning::new("/actions/3/name", "google returned an empty translation"));
    batch.push(written);
    batch.push(document(
        "ops_2025.json",
        DocumentStatus::skipped("no translatable strings"),
        0,
    ));
    batch.push(document(
        "teams/KT1.json",
        DocumentStatus::Failed {
            kind: ErrorKind::Structural,
            message: "invalid JSON".to_string(),
        },
        0,
    ));
    batch
}

#[test]
fn test_batch_report_human() {
    let formatted = OutputFormat::Human
        .format_batch_report(&sample_batch(), false)
        .unwrap();

    assert_eq!(
        formatted,
        "  ✓ written     es/actions.json (12 changes)\n\
         \x20     warning /actions/3/name: google returned an empty translation\n\
         \x20 - skipped     es/ops_2025.json: no translatable strings\n\
         \x20 ✗ failed      es/teams/KT1.json [structural]: invalid JSON\n\
         1 written, 1 skipped, 1 failed, 0 interrupted (1 warnings)\n"
    );
}

#[test]
fn test_batch_report_json_has_summary_and_documents() {
    let formatted = OutputFormat::Json
        .format_batch_report(&sample_batch(), false)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&formatted).unwrap();

    assert_eq!(value["summary"]["written"], 1);
    assert_eq!(value["summary"]["failed"], 1);
    assert_eq!(value["documents"].as_array().unwrap().len(), 3);
    assert_eq!(value["documents"][1]["status"]["status"], "skipped");
}

#[test]
fn test_interrupted_line_names_partial() {
    let mut batch = BatchReport::new();
    batch.push(document(
        "actions.json",
        DocumentStatus::Interrupted {
            partial: Some(PathBuf::from("es/actions.json.partial")),
        },
        4,
    ));

    let formatted = format_batch_report_human(&batch, false);
    assert!(formatted.contains("! interrupted es/actions.json (partial: es/actions.json.partial)"));
    assert!(formatted.ends_with("0 written, 0 skipped, 0 failed, 1 interrupted\n"));
}

#[test]
fn test_unicode_report_human() {
    let report = analyze("{\"name\": \"It\u{2019}s\"}");
    let formatted = format_unicode_report_human("teams.json", &report);

    assert!(formatted.starts_with("teams.json: found 1 non-ASCII characters (1 fixable)"));
    assert!(formatted.contains("(U+2019) -> ''': 1 occurrences"));
    assert!(formatted.contains("Line 1, Col 12:"));

    let clean = format_unicode_report_human("weapon_rules.json", &analyze("{}"));
    assert_eq!(clean, "[OK] weapon_rules.json: no ambiguous Unicode characters found\n");
}

#[test]
fn test_quiet_suppresses_messages_but_not_results() {
    let (mut output, buffer) = writer(OutputFormat::Human, true);
    output.info("loading rules").unwrap();
    output.success("done").unwrap();
    output.batch_report(&sample_batch()).unwrap();

    let contents = buffer.contents();
    assert!(!contents.contains("loading rules"));
    assert!(!contents.contains("done\n"));
    assert!(contents.contains("1 written, 1 skipped, 1 failed"));
}

#[test]
fn test_machine_formats_skip_messages() {
    let (mut output, buffer) = writer(OutputFormat::Json, false);
    output.info("loading rules").unwrap();
    output.warning("careful").unwrap();
    output.data(&serde_json::json!({"written": 2})).unwrap();

    assert_eq!(buffer.contents(), "{\"written\":2}\n");
}

#[test]
fn test_table_alignment() {
    let (mut output, buffer) = writer(OutputFormat::Human, false);
    output
        .table(
            &["identity", "translate"],
            vec![
                vec!["teams".to_string(), "allow".to_string()],
                vec!["actions.json".to_string(), "heuristic".to_string()],
            ],
        )
        .unwrap();

    let contents = buffer.contents();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines[0], "identity     │ translate");
    assert_eq!(lines[2], "teams        │ allow    ");
    assert_eq!(lines[3], "actions.json │ heuristic");
}

#[test]
fn test_custom_writer_never_shows_progress() {
    let (output, _) = writer(OutputFormat::Human, false);
    assert!(!output.show_progress());
    assert!(output.progress_bar(10, "translating").is_none());
}
