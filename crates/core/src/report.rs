use crate::models::{ExtractionResult, SearchOptions};
use crate::SearchError;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_OUTPUT_DIR: &str = "./loot";
const EXTRACTED_FILE: &str = "confluence_extracted.txt";
const CONTENT_FILE: &str = "confluence_content.txt";
const SEPARATOR_WIDTH: usize = 50;

pub fn output_file_name(options: &SearchOptions) -> &'static str {
    if options.search_content || options.search_binaries {
        EXTRACTED_FILE
    } else {
        CONTENT_FILE
    }
}

pub fn render_record(out: &mut String, record: &ExtractionResult) {
    let page = record.page();
    let _ = writeln!(out, "URL: {}", page.url);
    let _ = writeln!(out, "Page Title: {}", page.title);
    if let Some(attachment) = record.attachment_title() {
        let _ = writeln!(out, "Attachment Title: {attachment}");
    }
    if let Some((term, snippet)) = record.snippet() {
        let _ = writeln!(out, "Search Term: {term}");
        let _ = writeln!(out, "Extracted Info: {snippet}");
    }
    out.push_str(&"-".repeat(SEPARATOR_WIDTH));
    out.push('\n');
}

pub fn render_records(records: &[ExtractionResult]) -> String {
    let mut out = String::new();
    for record in records {
        render_record(&mut out, record);
    }
    out
}

/// Writes every record to `dir/file_name`, creating `dir` if needed.
pub fn write_report(
    dir: &Path,
    file_name: &str,
    records: &[ExtractionResult],
) -> Result<PathBuf, SearchError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);

    if records.is_empty() {
        info!("No content to write to file.");
    }
    fs::write(&path, render_records(records))?;

    info!(path = %path.display(), records = records.len(), "saved extracted content");
    Ok(path)
}
