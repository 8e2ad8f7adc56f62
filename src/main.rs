//! docblock — print the `@` annotations of class and method doc comments.
//!
//! Two modes:
//!
//! - **stdin mode**: `docblock < comment.txt` reads one raw doc comment;
//!   `docblock -t Class::method < Source.php` resolves it from source first.
//! - **file mode**: `docblock -t UserController src/Http/*.php` indexes each
//!   file and reports the target, or every documented declaration.

mod render;

use anyhow::{Context, Result};
use clap::Parser;
use docblock::{AnnotationParser, DeclarationResolver, Reference, SourceIndex};
use render::{Entry, Parameters, QueryResult};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "docblock",
    about = "Read @ annotations from the doc comments of classes and methods"
)]
struct Cli {
    /// Input source files (glob patterns and directories supported). If omitted, reads from stdin.
    files: Vec<String>,

    /// Declaration to read: `Class` or `Class::method`
    #[arg(short = 't', long)]
    target: Option<String>,

    /// Look up a single annotation instead of listing all of them
    #[arg(short = 'k', long, conflicts_with = "declarations")]
    key: Option<String>,

    /// Parse the values of this tag as `type name` declarations
    #[arg(short = 'd', long)]
    declarations: Option<String>,

    /// Output format: json (default), text
    #[arg(short = 'f', long, default_value = "json")]
    format: String,
}

fn main() -> Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .try_init();

    let cli = Cli::parse();
    let renderer = render::create_renderer(&cli.format)?;

    let entries = if cli.files.is_empty() {
        stdin_mode(&cli)?
    } else {
        file_mode(&cli)?
    };

    print!("{}", renderer.render(&entries)?);
    Ok(())
}

/// stdin mode: a raw doc comment, or source text when a target is given.
fn stdin_mode(cli: &Cli) -> Result<Vec<Entry>> {
    let mut input = String::new();
    io::stdin()
        .read_to_string(&mut input)
        .context("failed to read stdin")?;

    let entry = match cli.target.as_deref() {
        Some(target) => {
            let reference = Reference::parse(target);
            let index = SourceIndex::parse(&input);
            if !reference.is_empty() && !index.references().contains(&reference) {
                anyhow::bail!("declaration not found: {}", reference);
            }
            read_entry(cli, &index, &reference, None)?
        }
        None => Entry {
            file: None,
            target: "-".to_string(),
            result: query(cli, &mut AnnotationParser::new(input))?,
        },
    };
    Ok(vec![entry])
}

/// file mode: index every input file and read the requested declarations.
fn file_mode(cli: &Cli) -> Result<Vec<Entry>> {
    let target = cli.target.as_deref().map(Reference::parse);
    if let Some(ref reference) = target {
        if reference.is_empty() {
            return Err(docblock::Error::EmptyReference {
                method: reference.method.clone(),
            }
            .into());
        }
    }
    let mut entries = Vec::new();

    for path in expand_globs(&cli.files)? {
        let source = match fs::read_to_string(&path) {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
                continue;
            }
        };
        let index = SourceIndex::parse(&source);
        let file = path.to_string_lossy().to_string();

        match target {
            Some(ref reference) => {
                if !index.references().contains(reference) {
                    tracing::debug!(path = %file, %reference, "target not declared in file");
                    continue;
                }
                entries.push(read_entry(cli, &index, reference, Some(&file))?);
            }
            None => {
                for reference in index.references() {
                    if index.doc_comment(reference).is_empty() {
                        continue;
                    }
                    entries.push(read_entry(cli, &index, reference, Some(&file))?);
                }
            }
        }
    }

    if let Some(reference) = target {
        if entries.is_empty() {
            anyhow::bail!("declaration not found: {}", reference);
        }
    }
    Ok(entries)
}

fn read_entry(
    cli: &Cli,
    index: &SourceIndex,
    reference: &Reference,
    file: Option<&str>,
) -> Result<Entry> {
    let mut parser = AnnotationParser::read(index, reference)?;
    let result = query(cli, &mut parser).with_context(|| format!("failed to read {}", reference))?;
    Ok(Entry {
        file: file.map(str::to_string),
        target: reference.to_string(),
        result,
    })
}

/// Run the query selected by --key / --declarations against one comment.
fn query(cli: &Cli, parser: &mut AnnotationParser) -> Result<QueryResult> {
    if let Some(ref key) = cli.key {
        return Ok(QueryResult::Value(parser.lookup(key)));
    }
    if let Some(ref tag) = cli.declarations {
        return Ok(QueryResult::Declarations(parser.variable_declarations(tag)?));
    }
    Ok(QueryResult::Parameters(Parameters(parser.occurrences())))
}

/// File extensions scanned when a directory is given.
const SUPPORTED_EXTENSIONS: &[&str] = &["php", "inc"];

/// Expand glob patterns into a list of real file paths.
/// Also handles bare directory paths by scanning for supported file types.
fn expand_globs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for pattern in patterns {
        let path = Path::new(pattern);
        if path.is_file() {
            files.push(path.to_path_buf());
            continue;
        }
        // Directories are scanned non-recursively
        if path.is_dir() {
            let entries = fs::read_dir(path)
                .with_context(|| format!("failed to read directory: {}", path.display()))?;
            for entry in entries.flatten() {
                let p = entry.path();
                if p.is_file() && has_supported_extension(&p) {
                    files.push(p);
                }
            }
            continue;
        }
        let matches: Vec<_> = glob::glob(pattern)
            .with_context(|| format!("invalid glob pattern: {}", pattern))?
            .filter_map(|r| r.ok())
            .filter(|p| p.is_file())
            .collect();
        if matches.is_empty() {
            tracing::warn!(pattern = %pattern, "no files matched");
        }
        files.extend(matches);
    }
    // Sort for deterministic output
    files.sort();
    files.dedup();
    Ok(files)
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}
