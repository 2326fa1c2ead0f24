//! End-to-end document pipeline tests against a local stub provider

use async_trait::async_trait;
use ktjson_core::http::{HttpError, RetryPolicy};
use ktjson_core::pipeline::{backup_path, partial_path};
use ktjson_core::{
    discovery, DocumentJob, DocumentPipeline, DocumentStatus, ErrorKind, Interrupt, LanguageCode,
    PipelineOptions, Stage, TranslationProvider, Translator,
};
use ktjson_rules::default_rules;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// Upper-cases every line
struct Shouting;

#[async_trait]
impl TranslationProvider for Shouting {
    fn name(&self) -> &str {
        "shouting"
    }

    async fn translate(
        &self,
        text: &str,
        _source: &LanguageCode,
        _target: &LanguageCode,
    ) -> Result<String, HttpError> {
        Ok(text.to_uppercase())
    }
}

/// Triggers the interrupt after a number of calls, answering slowly after that
struct Interrupting {
    interrupt: Interrupt,
    after: usize,
    calls: AtomicUsize,
}

#[async_trait]
impl TranslationProvider for Interrupting {
    fn name(&self) -> &str {
        "interrupting"
    }

    async fn translate(
        &self,
        text: &str,
        _source: &LanguageCode,
        _target: &LanguageCode,
    ) -> Result<String, HttpError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call + 1 >= self.after {
            self.interrupt.trigger();
            tokio::time::sleep(Duration::from_secs(5)).await;
        }
        Ok(format!("<{}>", text))
    }
}

fn translator(provider: Arc<dyn TranslationProvider>) -> Translator {
    Translator::new(provider, "en".parse().unwrap(), "es".parse().unwrap())
        .with_retry(RetryPolicy::none())
}

fn write_json(path: &Path, value: &Value) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn test_translates_only_allowed_fields() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("en/actions.json");
    let destination = dir.path().join("es/actions.json");
    write_json(
        &source,
        &json!({
            "actions": [
                {"id": "act-01", "name": "Shoot", "AP": 1, "effects": ["Deal 1 damage", "  "]},
                {"id": "act-02", "name": "Dash", "seq": 2, "type": "universal"}
            ]
        }),
    );

    let rules = default_rules().unwrap();
    let pipeline = DocumentPipeline::new(&rules);
    let job = DocumentJob::new(&source, &destination, "actions.json");

    let report = pipeline
        .translate(&job, &translator(Arc::new(Shouting)), &mut |_| {})
        .await;

    assert_eq!(report.status, DocumentStatus::Written);
    assert_eq!(report.stage, Some(Stage::Written));
    assert_eq!(report.changes, 3);
    assert_eq!(
        read_json(&destination),
        json!({
            "actions": [
                {"id": "act-01", "name": "SHOOT", "AP": 1, "effects": ["DEAL 1 DAMAGE", "  "]},
                {"id": "act-02", "name": "DASH", "seq": 2, "type": "universal"}
            ]
        })
    );
    // source untouched, no backup for a separate destination
    assert_eq!(read_json(&source)["actions"][0]["name"], "Shoot");
    assert!(!backup_path(&source).exists());
}

#[tokio::test]
async fn test_output_is_pretty_and_unescaped() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("en/weapon_rules.json");
    let destination = dir.path().join("es/weapon_rules.json");
    write_json(&source, &json!({"weapon_rules": [{"name": "ceño"}]}));

    let rules = default_rules().unwrap();
    let pipeline = DocumentPipeline::new(&rules);
    let job = DocumentJob::new(&source, &destination, "weapon_rules.json");
    pipeline
        .translate(&job, &translator(Arc::new(Shouting)), &mut |_| {})
        .await;

    let text = fs::read_to_string(&destination).unwrap();
    assert_eq!(
        text,
        "{\n  \"weapon_rules\": [\n    {\n      \"name\": \"CEÑO\"\n    }\n  ]\n}"
    );
}

#[tokio::test]
async fn test_malformed_json_leaves_destination_absent() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("en/actions.json");
    let destination = dir.path().join("es/actions.json");
    fs::create_dir_all(source.parent().unwrap()).unwrap();
    fs::write(&source, "{\"actions\": [").unwrap();

    let rules = default_rules().unwrap();
    let pipeline = DocumentPipeline::new(&rules);
    let job = DocumentJob::new(&source, &destination, "actions.json");
    let report = pipeline
        .translate(&job, &translator(Arc::new(Shouting)), &mut |_| {})
        .await;

    match report.status {
        DocumentStatus::Failed { kind, .. } => assert_eq!(kind, ErrorKind::Structural),
        other => panic!("expected a structural failure, got {:?}", other),
    }
    assert_eq!(report.stage, None);
    assert!(!destination.exists());
}

#[tokio::test]
async fn test_wrong_shape_is_structural() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("en/actions.json");
    let destination = dir.path().join("es/actions.json");
    write_json(&source, &json!({"actions": {"name": "Shoot"}}));

    let rules = default_rules().unwrap();
    let pipeline = DocumentPipeline::new(&rules);
    let job = DocumentJob::new(&source, &destination, "actions.json");
    let report = pipeline
        .translate(&job, &translator(Arc::new(Shouting)), &mut |_| {})
        .await;

    assert!(report.is_failed());
    assert_eq!(report.stage, Some(Stage::Loaded));
    assert!(!destination.exists());
}

#[tokio::test]
async fn test_unknown_document_is_skipped() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("en/notes.json");
    let destination = dir.path().join("es/notes.json");
    write_json(&source, &json!({"name": "Shoot"}));

    let rules = default_rules().unwrap();
    let pipeline = DocumentPipeline::new(&rules);
    let job = DocumentJob::new(&source, &destination, "notes.json");
    let report = pipeline
        .translate(&job, &translator(Arc::new(Shouting)), &mut |_| {})
        .await;

    assert!(matches!(report.status, DocumentStatus::Skipped { .. }));
    assert!(!destination.exists());
}

#[tokio::test]
async fn test_interrupt_writes_partial_only() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("en/actions.json");
    let destination = dir.path().join("es/actions.json");
    write_json(
        &source,
        &json!({"actions": [{"name": "Shoot\nnow"}, {"name": "Dash\nnow"}]}),
    );

    let rules = default_rules().unwrap();
    let interrupt = Interrupt::new();
    let pipeline = DocumentPipeline::new(&rules)
        .with_interrupt(interrupt.clone())
        .with_options(PipelineOptions {
            checkpoint_on_interrupt: true,
            ..Default::default()
        });
    // multiline names travel alone: the first call answers, the second hangs
    let provider = Arc::new(Interrupting {
        interrupt,
        after: 2,
        calls: AtomicUsize::new(0),
    });
    let job = DocumentJob::new(&source, &destination, "actions.json");
    let report = pipeline.translate(&job, &translator(provider), &mut |_| {}).await;

    let partial = partial_path(&destination);
    assert_eq!(
        report.status,
        DocumentStatus::Interrupted {
            partial: Some(partial.clone())
        }
    );
    assert_eq!(report.stage, Some(Stage::ReValidated));
    assert!(!destination.exists());
    assert_eq!(
        read_json(&partial),
        json!({"actions": [{"name": "<Shoot\nnow>"}, {"name": "Dash\nnow"}]})
    );
}

#[test]
fn test_in_place_fix_backs_up_exact_bytes() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("weapon_rules.json");
    let original = "{\"weapon_rules\":[{\"name\":\"Don\u{2019}t \u{2014} stop\u{2026}\"}],  \"n\": 1}";
    fs::write(&file, original).unwrap();

    let rules = default_rules().unwrap();
    let pipeline = DocumentPipeline::new(&rules);
    let (report, stats) = pipeline.normalize(&DocumentJob::in_place(&file, "weapon_rules.json"));

    assert_eq!(report.status, DocumentStatus::Written);
    assert_eq!(stats.total, 3);
    assert_eq!(fs::read_to_string(backup_path(&file)).unwrap(), original);
    assert_eq!(
        read_json(&file),
        json!({"weapon_rules": [{"name": "Don't - stop..."}], "n": 1})
    );
}

#[test]
fn test_normalize_fixes_root_arrays_and_space_only_fields() {
    let dir = TempDir::new().unwrap();
    let list = dir.path().join("list.json");
    fs::write(&list, "[\"don\u{2019}t\", \"\u{2026}\"]").unwrap();
    let doc = dir.path().join("ploys.json");
    fs::write(
        &doc,
        "{\"sep\": \"\u{00A0}\", \"quote\": \"it\u{2019}s\", \"list\": [\"don\u{2019}t\"]}",
    )
    .unwrap();

    let rules = default_rules().unwrap();
    let pipeline = DocumentPipeline::new(&rules);

    let (report, stats) = pipeline.normalize(&DocumentJob::in_place(&list, "list.json"));
    assert_eq!(report.status, DocumentStatus::Written);
    assert_eq!(stats.total, 2);
    assert_eq!(read_json(&list), json!(["don't", "..."]));

    let (report, stats) = pipeline.normalize(&DocumentJob::in_place(&doc, "ploys.json"));
    assert_eq!(report.status, DocumentStatus::Written);
    assert_eq!(report.changes, 3);
    assert_eq!(stats.total, 3);
    assert_eq!(
        read_json(&doc),
        json!({"sep": " ", "quote": "it's", "list": ["don't"]})
    );
}

#[test]
fn test_clean_document_is_not_rewritten() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("actions.json");
    let original = "{\"actions\": [{\"name\": \"plain ascii\"}]}";
    fs::write(&file, original).unwrap();

    let rules = default_rules().unwrap();
    let pipeline = DocumentPipeline::new(&rules);
    let (report, stats) = pipeline.normalize(&DocumentJob::in_place(&file, "actions.json"));

    assert!(matches!(report.status, DocumentStatus::Skipped { .. }));
    assert!(stats.is_empty());
    assert_eq!(fs::read_to_string(&file).unwrap(), original);
}

#[test]
fn test_clean_prunes_deprecated_team_fields() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("teams/IMP-AOD.json");
    write_json(
        &file,
        &json!({
            "killteamId": "IMP-AOD",
            "isPublished": true,
            "userId": "u1",
            "opTypes": [{
                "opTypeName": "Sergeant",
                "opId": "x",
                "currWOUNDS": 12,
                "weapons": [{"wepName": "Bolt rifle", "isDefault": true}]
            }]
        }),
    );

    let rules = default_rules().unwrap();
    let pipeline = DocumentPipeline::new(&rules);
    let job = DocumentJob::in_place(&file, rules.resolve_identity("teams/IMP-AOD.json"));
    let report = pipeline.clean(&job);

    assert_eq!(report.status, DocumentStatus::Written);
    assert_eq!(report.changes, 5);
    assert_eq!(
        read_json(&file),
        json!({
            "killteamId": "IMP-AOD",
            "opTypes": [{
                "opTypeName": "Sergeant",
                "weapons": [{"wepName": "Bolt rifle"}]
            }]
        })
    );
}

#[tokio::test]
async fn test_batch_continues_after_failure() {
    let dir = TempDir::new().unwrap();
    let en = dir.path().join("en");
    let es = dir.path().join("es");
    fs::create_dir_all(&en).unwrap();
    fs::write(en.join("actions.json"), "not json").unwrap();
    write_json(&en.join("weapon_rules.json"), &json!({"weapon_rules": [{"name": "Lethal"}]}));
    write_json(
        &en.join("teams/AA.json"),
        &json!({"killteamId": "AA", "killteamName": "Alpha"}),
    );

    let rules = default_rules().unwrap();
    let documents = discovery::discover_documents(&en, &discovery::default_documents()).unwrap();
    let jobs = discovery::translation_jobs(&rules, &en, &es, &documents);
    let pipeline = DocumentPipeline::new(&rules);

    let batch = pipeline
        .translate_all(&jobs, &translator(Arc::new(Shouting)), &mut ktjson_core::pipeline::Silent)
        .await;

    let summary = batch.summary();
    assert_eq!(summary.written, 2);
    assert_eq!(summary.failed, 1);
    assert!(batch.has_failures());
    assert_eq!(read_json(&es.join("teams/AA.json"))["killteamName"], "ALPHA");
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("en/actions.json");
    let destination = dir.path().join("es/actions.json");
    write_json(&source, &json!({"actions": [{"name": "Shoot"}]}));

    let rules = default_rules().unwrap();
    let pipeline = DocumentPipeline::new(&rules).with_options(PipelineOptions {
        dry_run: true,
        ..Default::default()
    });
    let job = DocumentJob::new(&source, &destination, "actions.json");
    let report = pipeline
        .translate(&job, &translator(Arc::new(Shouting)), &mut |_| {})
        .await;

    assert_eq!(report.stage, Some(Stage::ReValidated));
    assert!(matches!(report.status, DocumentStatus::Skipped { .. }));
    assert!(!destination.exists());
}
