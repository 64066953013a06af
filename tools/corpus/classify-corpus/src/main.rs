//! Corpus classification check
//!
//! Classifies every file named on the command line and prints one JSON line
//! per file. Directories are walked recursively. Set `RUST_LOG=debug` to see
//! per-call classifier logs.
//!
//! ```text
//! classify-corpus docs/ samples/topic.dita > records.jsonl
//! ```

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use content_classifier::Classifier;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn collect_files(path: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    if path.is_dir() {
        let mut entries: Vec<PathBuf> = fs::read_dir(path)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<_, _>>()?;
        entries.sort();
        for entry in entries {
            collect_files(&entry, files)?;
        }
    } else {
        files.push(path.to_path_buf());
    }
    Ok(())
}

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <file_or_dir>...", args[0]);
        process::exit(1);
    }

    let mut files = Vec::new();
    for arg in &args[1..] {
        if let Err(e) = collect_files(Path::new(arg), &mut files) {
            eprintln!("Error reading {}: {}", arg, e);
            process::exit(1);
        }
    }

    let classifier = Classifier::new();
    let mut by_mtype: BTreeMap<String, usize> = BTreeMap::new();
    let mut failures = 0usize;

    for file in &files {
        let content = match fs::read(file) {
            Ok(content) => content,
            Err(e) => {
                tracing::warn!(path = %file.display(), error = %e, "Skipping unreadable file");
                failures += 1;
                continue;
            }
        };
        let ext = file
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        let result = classifier.classify(&content, ext);
        *by_mtype.entry(result.record.mtype_string()).or_default() += 1;
        if result.is_terminal() {
            failures += 1;
        }

        let line = serde_json::json!({
            "path": file.display().to_string(),
            "record": result.record,
            "error": result.error,
            "terminal": result.is_terminal(),
        });
        println!("{line}");
    }

    for (mtype, count) in &by_mtype {
        tracing::info!(mtype = %mtype, count, "Corpus summary");
    }
    eprintln!("Classified {} files, {} failed", files.len(), failures);
}
