//! Build script for the diagnostic catalog.
//!
//! Reads `catalog/diagnostics.json`, checks it, and writes four files into
//! `OUT_DIR` that `src/lib.rs` pulls in with `include!`:
//! - `generated_codes.rs`: one `pub const` per code
//! - `generated_explain.rs`: code → description
//! - `generated_severity.rs`: code → default severity
//! - `generated_templates.rs`: (code, variant) → message template

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const CATALOG: &str = "catalog/diagnostics.json";
const HEADER: &str = "// Auto-generated from catalog/diagnostics.json. Do not edit.\n\n";

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Catalog {
    diagnostics: Vec<Entry>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Entry {
    id: String,
    const_name: String,
    severity: String,
    summary: String,
    description: String,
    context_keys: BTreeSet<String>,
    message_templates: BTreeMap<String, String>,
}

impl Entry {
    fn severity_path(&self) -> &'static str {
        match self.severity.as_str() {
            "error" => "Severity::Error",
            "warn" => "Severity::Warn",
            other => panic!("{}: invalid severity '{other}'", self.id),
        }
    }
}

fn main() {
    println!("cargo:rerun-if-changed={CATALOG}");

    let raw =
        fs::read_to_string(CATALOG).unwrap_or_else(|e| panic!("failed to read {CATALOG}: {e}"));
    let catalog: Catalog =
        serde_json::from_str(&raw).unwrap_or_else(|e| panic!("invalid {CATALOG}: {e}"));
    check_catalog(&catalog.diagnostics);

    let out = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));
    let entries = &catalog.diagnostics;

    write_generated(&out, "generated_codes.rs", &{
        let mut codes = String::from(HEADER);
        for e in entries {
            codes.push_str(&format!("/// {}\n", e.summary));
            codes.push_str(&format!("pub const {}: &str = \"{}\";\n\n", e.const_name, e.id));
        }
        codes
    });

    write_generated(
        &out,
        "generated_explain.rs",
        &match_on_id(entries, |e| format!("Some(\"{}\")", escape(&e.description))),
    );

    write_generated(
        &out,
        "generated_severity.rs",
        &match_on_id(entries, |e| format!("Some({})", e.severity_path())),
    );

    write_generated(&out, "generated_templates.rs", &{
        let mut templates = String::from(HEADER);
        templates.push_str("match (id, variant) {\n");
        for e in entries {
            for (variant, template) in &e.message_templates {
                templates.push_str(&format!(
                    "    (\"{}\", \"{variant}\") => Some(\"{}\"),\n",
                    e.id,
                    escape(template)
                ));
            }
        }
        templates.push_str("    _ => None,\n}\n");
        templates
    });
}

/// Reject catalogs that would generate colliding or unusable code.
fn check_catalog(entries: &[Entry]) {
    let mut ids = HashSet::new();
    let mut names = HashSet::new();
    for e in entries {
        assert!(ids.insert(e.id.as_str()), "duplicate id '{}'", e.id);
        assert!(
            names.insert(e.const_name.as_str()),
            "{}: duplicate constName '{}'",
            e.id,
            e.const_name
        );
        assert!(
            is_const_ident(&e.const_name),
            "{}: constName '{}' is not SCREAMING_SNAKE_CASE",
            e.id,
            e.const_name
        );
        assert!(
            !e.message_templates.is_empty(),
            "{}: no message templates",
            e.id
        );
        e.severity_path();
        for (variant, template) in &e.message_templates {
            check_placeholders(e, variant, template);
        }
    }
}

/// Every `{key}` in a template must be a declared context key.
fn check_placeholders(entry: &Entry, variant: &str, template: &str) {
    for key in placeholders(template) {
        assert!(
            entry.context_keys.contains(key),
            "{}: template '{variant}' uses '{{{key}}}', which is not in contextKeys",
            entry.id
        );
    }
}

fn placeholders(template: &str) -> impl Iterator<Item = &str> {
    template
        .split('{')
        .skip(1)
        .filter_map(|rest| rest.split_once('}'))
        .map(|(key, _)| key.trim())
        .filter(|key| !key.is_empty())
}

fn is_const_ident(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_uppercase())
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// A `match id { .. }` expression with one arm per entry.
fn match_on_id(entries: &[Entry], arm: impl Fn(&Entry) -> String) -> String {
    let mut out = String::from(HEADER);
    out.push_str("match id {\n");
    for e in entries {
        out.push_str(&format!("    \"{}\" => {},\n", e.id, arm(e)));
    }
    out.push_str("    _ => None,\n}\n");
    out
}

fn write_generated(out: &Path, name: &str, contents: &str) {
    fs::write(out.join(name), contents).unwrap_or_else(|e| panic!("failed to write {name}: {e}"));
}

fn escape(value: &str) -> String {
    value.chars().flat_map(char::escape_default).collect()
}
