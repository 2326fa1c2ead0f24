//! Rules command handler

use super::utils::{load_rules, rule_source};
use crate::cli::{RulesAction, RulesArgs, RulesClassifyArgs, RulesFileArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use ktjson_rules::{ClassificationPolicy, RuleError, RuleLoader, RuleSet, RuleSource};
use serde::Serialize;

/// Handle the rules command
pub fn handle_rules(args: RulesArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    match args.action {
        RulesAction::Show(args) => show(args, config, output),
        RulesAction::Validate(args) => validate(args, config, output),
        RulesAction::Classify(args) => classify(args, config, output),
    }
}

fn show(args: RulesFileArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let rules = load_rules(args.file.as_deref(), config)?;
    if !output.is_human() {
        return output.data(rules.definition());
    }

    output.info(&format!("Rule set version {}", rules.version()))?;
    if let Some(description) = &rules.definition().description {
        output.writeln(description)?;
    }

    output.section("Identities")?;
    let matchers = rules
        .definition()
        .identities
        .iter()
        .map(|m| vec![m.pattern.clone(), m.identity.clone()])
        .collect();
    output.table(&["pattern", "identity"], matchers)?;

    output.section("Documents")?;
    let documents = rules
        .definition()
        .documents
        .iter()
        .map(|(identity, document)| {
            let policy = match &document.translate {
                Some(ClassificationPolicy::Allow(_)) => "allow",
                Some(ClassificationPolicy::Heuristic(_)) => "heuristic",
                None => "-",
            };
            let prune = if document.prune.is_empty() { "-" } else { "yes" };
            vec![identity.clone(), policy.to_string(), prune.to_string()]
        })
        .collect();
    output.table(&["identity", "translate", "prune"], documents)
}

#[derive(Serialize)]
struct ValidationOutput {
    source: String,
    valid: bool,
    violations: Vec<String>,
}

fn validate(args: RulesFileArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let source = rule_source(args.file.as_deref(), config)?;
    let loader = RuleLoader::new()?;

    let violations = match &source {
        RuleSource::File(path) => {
            if !path.exists() {
                return Err(Error::FileNotFound { path: path.clone() });
            }
            loader.check_file(path)?
        }
        RuleSource::Bundled(_) => Vec::new(),
    };

    if violations.is_empty() {
        // Schema-valid files can still carry bad identity patterns
        loader.load(&source)?;
    }

    let result = ValidationOutput {
        source: source.to_string(),
        valid: violations.is_empty(),
        violations,
    };

    if output.is_human() {
        if result.valid {
            output.success(&format!("✓ {} is valid", result.source))?;
        } else {
            output.error(&format!("✗ {} failed validation", result.source))?;
            for violation in &result.violations {
                output.writeln(&format!("  - {}", violation))?;
            }
        }
    } else {
        output.data(&result)?;
    }

    match source {
        RuleSource::File(path) if !result.valid => Err(RuleError::Schema {
            path,
            violations: result.violations,
        }
        .into()),
        _ => Ok(()),
    }
}

#[derive(Serialize)]
struct ClassifyOutput {
    document: String,
    identity: String,
    known: bool,
    path: Vec<String>,
    field: String,
    translate: bool,
    prune: bool,
}

fn classify_field(rules: &RuleSet, document: &str, path: &str, field: &str) -> ClassifyOutput {
    let identity = rules.resolve_identity(document);
    let path: Vec<String> = path
        .split('.')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect();
    ClassifyOutput {
        document: document.to_string(),
        known: rules.classifier(&identity).is_known(),
        translate: rules.classify(&identity, &path, field),
        prune: rules.prunes(&identity, &path, field),
        identity,
        path,
        field: field.to_string(),
    }
}

fn classify(args: RulesClassifyArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let rules = load_rules(args.rules.as_deref(), config)?;
    let result = classify_field(&rules, &args.document, &args.path, &args.field);

    if !output.is_human() {
        return output.data(&result);
    }

    if !result.known {
        output.warning(&format!(
            "'{}' resolves to unknown identity '{}', nothing is selected",
            result.document, result.identity
        ))?;
    }
    let location = if result.path.is_empty() {
        result.field.clone()
    } else {
        format!("{}.{}", result.path.join("."), result.field)
    };
    output.writeln(&format!("{} [{}] {}", result.document, result.identity, location))?;
    output.writeln(&format!("  translate: {}", if result.translate { "yes" } else { "no" }))?;
    output.writeln(&format!("  prune:     {}", if result.prune { "yes" } else { "no" }))
}
