//! Minimal CLI: load documents → fill a demo model | describe a demo model
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde_json::Value;

use crate::models::Target;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// fill demo structures from JSON/NDJSON documents, or list their field descriptors
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// fill one model per input document and print the results as a JSON array
    Fill(FillOut),
    /// print the field descriptors of a model
    Describe(DescribeOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document.
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns or '-' for stdin
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct FillOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// model to fill
    #[arg(long, value_enum)]
    target: Target,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct DescribeOut {
    /// model to describe
    #[arg(long, value_enum)]
    target: Target,

    /// print the listing as JSON instead of a table
    #[arg(long)]
    json: bool,
}

/// One input document, labelled with where it came from.
#[derive(Debug, Clone, PartialEq)]
struct Document {
    source: String,
    value: Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load(&self) -> Result<Vec<Document>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let mut documents = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = if source_path == Path::new("-") {
                let mut buffer = String::new();
                std::io::stdin()
                    .read_to_string(&mut buffer)
                    .context("failed to read stdin")?;
                buffer
            } else {
                std::fs::read_to_string(&source_path)
                    .with_context(|| format!("failed to read source file ({source_path_str})"))?
            };
            documents.extend(self.parse(&source_path_str, &source)?);
        }
        Ok(documents)
    }

    fn parse(&self, label: &str, source: &str) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        if self.ndjson {
            for (index, line) in source.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                let label = format!("{label}:{}", index + 1);
                let value = serde_json::from_str::<Value>(line)
                    .with_context(|| format!("failed to parse JSON line ({label})"))?;
                documents.extend(self.select(&label, value)?);
            }
        } else {
            let value = serde_json::from_str::<Value>(source)
                .with_context(|| format!("failed to parse JSON source file ({label})"))?;
            documents.extend(self.select(label, value)?);
        }
        Ok(documents)
    }

    /// Applies the JSON pointer, then the jq filter.
    fn select(&self, label: &str, value: Value) -> Result<Vec<Document>> {
        let value = match self.json_pointer.as_deref() {
            None => value,
            Some(pointer) => value
                .pointer(pointer)
                .cloned()
                .with_context(|| format!("JSON pointer {pointer} matched nothing ({label})"))?,
        };
        let values = match self.jq_expr.as_deref() {
            None => vec![value],
            Some(jq_expr) => crate::jq_exec::run_jaq(jq_expr, &value)
                .with_context(|| format!("failed to apply jq expression ({label})"))?,
        };
        Ok(values
            .into_iter()
            .map(|value| Document { source: label.to_string(), value })
            .collect())
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> Result<()> {
        match &self.cmd {
            Command::Fill(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(());
                }

                // 1) load documents
                let documents = target.input_settings.load()?;

                // 2) fill in parallel against one shared registry
                let registry = crate::models::registry();
                let results = documents
                    .par_iter()
                    .map(|document| target.target.fill(&document.value, &registry))
                    .collect::<Vec<_>>();

                // 3) report & collect
                let mut filled = Vec::with_capacity(documents.len());
                let mut failures = 0usize;
                for (document, result) in documents.iter().zip(results) {
                    match result {
                        Ok(value) => {
                            eprintln!("✅ {}", document.source.green());
                            filled.push(value);
                        }
                        Err(error) => {
                            failures += 1;
                            eprintln!("❌ {}: {}", document.source.red(), format!("{error:#}").red());
                        }
                    }
                }

                let output = serde_json::to_string_pretty(&filled)?;
                write_output(target.out.as_deref(), &output)?;
                if failures > 0 {
                    bail!("{failures} of {} documents failed to fill", documents.len());
                }
                Ok(())
            }
            Command::Describe(target) => {
                let listing = target.target.describe();
                if target.json {
                    println!("{}", serde_json::to_string_pretty(&listing)?);
                    return Ok(());
                }
                let width = listing.iter().map(|field| field.path.len()).max().unwrap_or(0);
                for field in &listing {
                    let mut line = format!(
                        "{}  {}",
                        format!("{:width$}", field.path).bold(),
                        field.kind.cyan(),
                    );
                    if let Some(default) = field.default.as_deref() {
                        line.push_str(&format!("  default={default}"));
                    }
                    if let Some(validate) = field.validate.as_deref() {
                        line.push_str(&format!("  validate={}", validate.yellow()));
                    }
                    println!("{line}");
                }
                Ok(())
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn write_output(out: Option<&Path>, contents: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, contents)
                .with_context(|| format!("failed to write {}", out.display()))?;
        }
        None => println!("{contents}"),
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            // literal path or '-'
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings() -> InputSettings {
        InputSettings { ndjson: false, json_pointer: None, jq_expr: None, input: vec![] }
    }

    #[test]
    fn ndjson_lines_are_labelled_and_blank_lines_skipped() {
        let settings = InputSettings { ndjson: true, ..settings() };
        let docs = settings.parse("people.ndjson", "{\"name\":\"a\"}\n\n{\"name\":\"b\"}\n").unwrap();
        let labels: Vec<&str> = docs.iter().map(|d| d.source.as_str()).collect();
        assert_eq!(labels, ["people.ndjson:1", "people.ndjson:3"]);
        assert_eq!(docs[1].value, json!({"name": "b"}));
    }

    #[test]
    fn pointer_selects_before_jq() {
        let settings = InputSettings {
            json_pointer: Some("/data".into()),
            jq_expr: Some(".items[]".into()),
            ..settings()
        };
        let docs = settings.parse("in.json", r#"{"data": {"items": [{"a": 1}, {"a": 2}]}}"#).unwrap();
        let values: Vec<Value> = docs.into_iter().map(|d| d.value).collect();
        assert_eq!(values, vec![json!({"a": 1}), json!({"a": 2})]);
    }

    #[test]
    fn missing_pointer_target_is_an_error() {
        let settings = InputSettings { json_pointer: Some("/nope".into()), ..settings() };
        let err = settings.parse("in.json", "{}").unwrap_err();
        assert!(format!("{err:#}").contains("JSON pointer /nope matched nothing (in.json)"));
    }

    #[test]
    fn malformed_json_names_the_source() {
        let err = settings().parse("bad.json", "{").unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }

    #[test]
    fn literal_paths_pass_through_and_empty_globs_fail() {
        let paths = resolve_file_path_patterns(["a.json", "-"]).unwrap();
        assert_eq!(paths, vec![PathBuf::from("a.json"), PathBuf::from("-")]);

        let err = resolve_file_path_patterns(["/definitely/not/here/*.json"]).unwrap_err();
        assert!(err.to_string().contains("matched no files"));
    }

    #[test]
    fn cli_parses_fill_arguments() {
        let cli = CommandLineInterface::try_parse_from([
            "structfill", "fill", "--target", "house", "-i", "a.json", "b.json", "--ndjson",
        ])
        .unwrap();
        let Command::Fill(fill) = cli.cmd else { panic!("expected fill") };
        assert_eq!(fill.target, Target::House);
        assert_eq!(fill.input_settings.input, ["a.json", "b.json"]);
        assert!(fill.input_settings.ndjson);
    }
}
