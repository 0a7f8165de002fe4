use crate::model::{Corpus, FaqEntry};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Either `{"faq": [...]}` or a bare array of records.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonCorpus {
    Wrapped { faq: Vec<FaqEntry> },
    Bare(Vec<FaqEntry>),
}

/// Loads a corpus, choosing the format from the file extension
/// (`.json`, `.jsonl` or `.csv`). Entry order is preserved.
pub fn load_corpus(path: &Path) -> Result<Corpus> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let entries = match ext.as_str() {
        "json" => load_entries_json(path)?,
        "jsonl" => load_entries_jsonl(path)?,
        "csv" => load_entries_csv(path)?,
        other => anyhow::bail!(
            "unsupported corpus format '.{other}' for {} (expected .json, .jsonl or .csv)",
            path.display()
        ),
    };

    Ok(Corpus::new(entries))
}

pub fn load_entries_json(path: &Path) -> Result<Vec<FaqEntry>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let parsed: JsonCorpus = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parse faq json {}", path.display()))?;

    Ok(match parsed {
        JsonCorpus::Wrapped { faq } => faq,
        JsonCorpus::Bare(entries) => entries,
    })
}

pub fn load_entries_jsonl(path: &Path) -> Result<Vec<FaqEntry>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut entries = Vec::new();

    for (lineno, line) in reader.lines().enumerate() {
        let line = line.context("read jsonl line")?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: FaqEntry = serde_json::from_str(&line)
            .with_context(|| format!("parse faq entry on line {}", lineno + 1))?;
        entries.push(entry);
    }

    Ok(entries)
}

pub fn load_entries_csv(path: &Path) -> Result<Vec<FaqEntry>> {
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("open {}", path.display()))?;
    let mut entries = Vec::new();

    for record in reader.deserialize() {
        let entry: FaqEntry = record.context("parse faq csv record")?;
        entries.push(entry);
    }

    Ok(entries)
}
