use std::error::Error;
use std::fs;
use std::io::{self, Read, Write};

use clap::{Parser, ValueEnum};
use serde::Serialize;
use serde_json::Value;

use jsonquery::{CacheOptions, Document, NodeRef, QueryCache};

#[derive(Parser, Debug)]
#[command(name = "jsonquery", version, about = "Query JSON documents with path expressions")]
struct Args {
    /// Input JSON file path. Omit or use '-' to read from stdin.
    input: Option<String>,

    /// Path expression to evaluate (prints the whole document if omitted).
    #[arg(short, long, value_name = "expr")]
    query: Option<String>,

    /// Print only the first match.
    #[arg(long)]
    first: bool,

    /// Output format for the document or each match.
    #[arg(long, value_enum, value_name = "format", default_value_t = Format::Json)]
    format: Format,

    /// Compile the query without the query cache.
    #[arg(long = "no-cache")]
    no_cache: bool,

    /// Output file path (prints to stdout if omitted).
    #[arg(short, long, value_name = "file")]
    output: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Json,
    Xml,
    Text,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("ERROR  {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let input = read_input(args.input.as_deref())?;
    let doc = jsonquery::from_str(&input)?;

    let rendered = match args.query.as_deref() {
        None => render_document(&doc, args.format)?,
        Some(expr) => {
            let cache = QueryCache::with_options(&CacheOptions::new().with_disabled(args.no_cache));
            let mut matches = cache.find(doc.root(), expr)?;
            tracing::debug!(query = expr, matches = matches.len(), "query evaluated");
            if args.first {
                matches.truncate(1);
            }
            render_matches(&matches, args.format, args.first)?
        }
    };

    write_output(args.output.as_deref(), rendered.as_bytes())?;
    if let Some(path) = args.output.as_deref().filter(|path| *path != "-") {
        let input_label = args.input.as_deref().filter(|p| *p != "-").unwrap_or("stdin");
        println!("✔ Queried {input_label} → {path}");
    }
    Ok(())
}

fn render_document(doc: &Document, format: Format) -> Result<String, Box<dyn Error>> {
    Ok(match format {
        Format::Json => pretty_json(&doc.to_json(false)?)?,
        Format::Xml => doc.to_markup_text(),
        Format::Text => doc.root().inner_text(),
    })
}

fn render_matches(matches: &[NodeRef<'_>], format: Format, first: bool) -> Result<String, Box<dyn Error>> {
    match format {
        Format::Json => {
            let values = matches
                .iter()
                .map(|node| node.to_json(false))
                .collect::<jsonquery::Result<Vec<_>>>()?;
            let value = if first {
                values.into_iter().next().unwrap_or(Value::Null)
            } else {
                Value::Array(values)
            };
            pretty_json(&value)
        }
        Format::Xml => Ok(join_lines(matches, |node| node.to_markup_text())),
        Format::Text => Ok(join_lines(matches, |node| node.inner_text())),
    }
}

fn join_lines(matches: &[NodeRef<'_>], render: impl Fn(&NodeRef<'_>) -> String) -> String {
    matches.iter().map(render).collect::<Vec<_>>().join("\n")
}

fn pretty_json(value: &Value) -> Result<String, Box<dyn Error>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8(out)?)
}

fn read_input(input: Option<&str>) -> Result<String, Box<dyn Error>> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(fs::read_to_string(path)?),
    }
}

fn write_output(path: Option<&str>, data: &[u8]) -> Result<(), Box<dyn Error>> {
    match path {
        Some(path) if path != "-" => fs::write(path, data)?,
        _ => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle.write_all(data)?;
        }
    }
    Ok(())
}
