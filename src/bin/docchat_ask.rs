//! Offline question answering over local files.
//!
//! Extracts the given files (directories are walked recursively, in sorted order), builds one
//! document from them, and prints the answer to `--query`. Shares extractor configuration with
//! the HTTP server.
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use docchat::{
    config, corpus,
    extraction::{ExtractorRegistry, UploadedFile, mime_from_path},
    logging,
    retrieval::{Query, answer_query},
};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(
    name = "docchat-ask",
    about = "Answer a question from the text of local PDF, image, or text files"
)]
struct Cli {
    /// Question to answer.
    #[arg(short, long)]
    query: String,
    /// Print the aggregated document before the answer.
    #[arg(long)]
    show_document: bool,
    /// Files or directories to read.
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    config::init_config();
    logging::init_tracing(logging::Console::Stderr);

    let query = Query::new(&cli.query).context("--query must not be blank")?;
    let files = collect_files(&cli.paths)?;
    if files.is_empty() {
        bail!("no files found under the given paths");
    }

    let mut uploads = Vec::with_capacity(files.len());
    for path in &files {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        uploads.push(UploadedFile::new(
            path.display().to_string(),
            mime_from_path(path),
            bytes,
        ));
    }

    let registry = ExtractorRegistry::from_config(config::get_config());
    let fragments = registry.extract_all(&uploads).await;
    for fragment in fragments.iter().filter(|fragment| fragment.failed()) {
        eprintln!(
            "warning: could not extract {}: {}",
            fragment.file_name,
            fragment.error.as_deref().unwrap_or("unknown error")
        );
    }
    let document = corpus::build_document(fragments.iter().map(|fragment| &fragment.text));

    if cli.show_document {
        println!("{document}");
        println!("---");
    }
    println!("{}", answer_query(&document, &query));
    Ok(())
}

/// Expand directories into their files, keeping explicit files in the order given.
fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(walk_dir(path)?);
        } else if path.is_file() {
            files.push(path.clone());
        } else {
            bail!("{} does not exist", path.display());
        }
    }
    Ok(files)
}

fn walk_dir(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}
