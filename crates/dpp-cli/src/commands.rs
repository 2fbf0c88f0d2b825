use std::fs;

use anyhow::{Context, Result, bail};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{ContentArrangement, Table};
use serde_json::Value;
use tracing::info_span;

use dpp_core::Bridge;
use dpp_map::MappingLoader;
use dpp_model::{Document, Source, SourceOptions};

use crate::cli::{CheckArgs, ExtractArgs, TransformArgs};

pub fn run_transform(args: &TransformArgs) -> Result<()> {
    let span = info_span!("transform", source = %args.source.display());
    let _guard = span.enter();
    let bridge = Bridge::new()?;
    let config = bridge
        .load_mapping(&args.mapping)
        .with_context(|| format!("load mapping {}", args.mapping.display()))?;
    let documents = bridge.transform(
        &Source::path(&args.source),
        &config,
        args.output.as_deref(),
    )?;
    if args.strict
        && let Some(schema) = config.mapping.target.schema.as_deref()
    {
        enforce_conformance(&bridge, schema, &documents)?;
    }
    match &args.output {
        Some(path) => println!(
            "Transformed {} record(s) -> {}",
            documents.len(),
            path.display()
        ),
        None => println!("{}", serde_json::to_string_pretty(&documents)?),
    }
    Ok(())
}

/// The opt-in hard-validation path behind `--strict`.
fn enforce_conformance(bridge: &Bridge, schema: &str, documents: &[Document]) -> Result<()> {
    let registry = bridge.schema_registry();
    let mut failures = Vec::new();
    for (index, document) in documents.iter().enumerate() {
        if let Err(error) = registry.validate(schema, &Value::Object(document.clone())) {
            failures.push(format!("document {index}: {error}"));
        }
    }
    if !failures.is_empty() {
        bail!(
            "{} of {} document(s) failed validation against '{schema}':\n{}",
            failures.len(),
            documents.len(),
            failures.join("\n")
        );
    }
    Ok(())
}

pub fn run_extract(args: &ExtractArgs) -> Result<()> {
    let bridge = Bridge::new()?;
    let mut options = SourceOptions::new(&args.connector);
    options.root = args.root.clone();
    options.delimiter = args.delimiter;
    options.sheet = args.sheet.clone();
    options.header_row = args.header_row;
    options.skip_rows = args.skip_rows;
    let records = bridge.extract(&Source::path(&args.source), &options)?;
    let rendered = serde_json::to_string_pretty(&records)?;
    match &args.output {
        Some(path) => {
            fs::write(path, rendered + "\n")
                .with_context(|| format!("write records to {}", path.display()))?;
            println!("Extracted {} record(s) -> {}", records.len(), path.display());
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

/// Lints mapping files without touching any source data. Returns whether
/// every file passed.
pub fn run_check(args: &CheckArgs) -> Result<bool> {
    let loader = MappingLoader::new()?;
    let mut failures = 0usize;
    for path in &args.mappings {
        match loader.load(path) {
            Ok(config) => {
                println!(
                    "ok: {} ({} rules, connector {})",
                    path.display(),
                    config.rules.len(),
                    config.mapping.source.connector
                );
            }
            Err(error) => {
                failures += 1;
                eprintln!("invalid: {}\n{error}", path.display());
            }
        }
    }
    if failures > 0 {
        eprintln!(
            "{failures} of {} mapping file(s) failed",
            args.mappings.len()
        );
    }
    Ok(failures == 0)
}

pub fn run_connectors() -> Result<()> {
    let bridge = Bridge::new()?;
    let mut table = Table::new();
    table.set_header(vec!["Connector", "Description"]);
    apply_table_style(&mut table);
    for (name, description) in bridge.connector_registry().descriptions() {
        table.add_row(vec![name, description]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_schemas() -> Result<()> {
    let bridge = Bridge::new()?;
    let registry = bridge.schema_registry();
    let mut table = Table::new();
    table.set_header(vec!["Schema", "JSON-LD context"]);
    apply_table_style(&mut table);
    for name in registry.names() {
        let context = if registry.context(&name).is_some() {
            "bundled"
        } else {
            "-"
        };
        table.add_row(vec![name, context.to_string()]);
    }
    println!("{table}");
    Ok(())
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(100);
}
