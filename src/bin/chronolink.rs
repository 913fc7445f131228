use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chronolink::config::{
    ChronoConfig, ConfigOverrides, GraphOverrides, OutputOverrides, DEFAULT_CONFIG_FILE,
};
use chronolink::{close_document, render, Document, OutputFormat};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: chronolink <document.json> [--config FILE] \
[--format json|jsonl|dot|table] [--no-reduce] [--anchor ID] [--add-inverted] [--dump-dir DIR]";

/// Flags that take a value
const VALUE_FLAGS: [&str; 4] = ["--config", "--format", "--anchor", "--dump-dir"];

fn parse_arg(flag: &str) -> Option<String> {
    let mut args = std::env::args();
    while let Some(arg) = args.next() {
        if arg == flag {
            return args.next();
        }
    }
    None
}

fn has_flag(flag: &str) -> bool {
    std::env::args().any(|arg| arg == flag)
}

fn document_path() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            args.next();
        } else if !arg.starts_with("--") {
            return Some(PathBuf::from(arg));
        }
    }
    None
}

fn overrides() -> anyhow::Result<ConfigOverrides> {
    let format = parse_arg("--format")
        .map(|value| value.parse::<OutputFormat>())
        .transpose()?;
    let reduce = has_flag("--no-reduce").then_some(false);
    let add_inverted = has_flag("--add-inverted").then_some(true);

    Ok(ConfigOverrides {
        graph: Some(GraphOverrides {
            anchor_node: parse_arg("--anchor"),
            add_inverted,
            dump_dir: parse_arg("--dump-dir").map(PathBuf::from),
        }),
        output: Some(OutputOverrides { format, reduce }),
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if has_flag("--help") || has_flag("-h") {
        println!("{USAGE}");
        return Ok(());
    }
    let Some(path) = document_path() else {
        bail!("missing document path\n{USAGE}");
    };

    let config_path = parse_arg("--config").or_else(|| {
        Path::new(DEFAULT_CONFIG_FILE)
            .exists()
            .then(|| DEFAULT_CONFIG_FILE.to_string())
    });
    let config = ChronoConfig::load(config_path.as_deref(), overrides()?)
        .context("failed to load configuration")?;

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut document = Document::from_json(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    if document.source.is_none() {
        document.source = Some(path.display().to_string());
    }

    let outcome = close_document(&document, config.graph.clone(), config.output.reduce)?;
    if !outcome.is_consistent() {
        eprintln!(
            "{}: {} inconsistent constraint(s)",
            path.display(),
            outcome.graph.inconsistencies().len()
        );
    }

    match config.output.format {
        OutputFormat::Json => println!("{}", outcome.minimal.to_json()?),
        OutputFormat::Jsonl => println!("{}", outcome.minimal.to_jsonl()?),
        OutputFormat::Dot => print!("{}", render::export_to_dot(&outcome.graph)),
        OutputFormat::Table => print!("{}", render::matrix_table(&outcome.graph)),
    }

    Ok(())
}
