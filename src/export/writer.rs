use crate::api::request::ApiResult;
use crate::export::flatten::{flatten_result, FlatTable};
use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_JSON_INDENT: usize = 2;

/// The two supported output shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON, full fidelity
    Json,
    /// Flattened entries, one row per entry
    Csv,
}

impl OutputFormat {
    /// `.csv` (any case) means CSV; everything else is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => OutputFormat::Csv,
            _ => OutputFormat::Json,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }
}

/// What an export actually did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Json { path: PathBuf },
    Csv { path: PathBuf, rows: usize },
    /// CSV was requested but the result had no entries; no file was written.
    NoEntries,
}

/// Timestamped file name for exports with no explicit target, e.g.
/// `dehashed_results_20240131_093000.csv`.
pub fn default_filename(format: OutputFormat) -> String {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    format!("dehashed_results_{}.{}", timestamp, format.extension())
}

pub fn to_pretty_json(value: &Value, indent: usize) -> Result<String> {
    let indent = " ".repeat(indent);
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8(out)?)
}

/// Print the whole result as indented JSON on stdout.
pub fn print_pretty(result: &ApiResult, indent: usize) -> Result<()> {
    let text = to_pretty_json(result.as_value(), indent)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", text)?;
    Ok(())
}

pub fn write_json(result: &ApiResult, path: &Path, indent: usize) -> Result<ExportOutcome> {
    let text = to_pretty_json(result.as_value(), indent)?;
    std::fs::write(path, text)
        .with_context(|| format!("Failed to write JSON to {}", path.display()))?;

    info!(target: "export", "wrote JSON result to {}", path.display());
    Ok(ExportOutcome::Json {
        path: path.to_path_buf(),
    })
}

/// Flatten the result's entries and write them as CSV. Nothing is written
/// when there are no entries.
pub fn write_csv(result: &ApiResult, path: &Path) -> Result<ExportOutcome> {
    let Some(table) = flatten_result(result) else {
        info!(target: "export", "no entries to export to {}", path.display());
        return Ok(ExportOutcome::NoEntries);
    };

    let file = File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_table(&table, BufWriter::new(file))?;

    info!(target: "export", "wrote {} rows to {}", table.len(), path.display());
    Ok(ExportOutcome::Csv {
        path: path.to_path_buf(),
        rows: table.len(),
    })
}

/// Write the header row then every data row.
pub fn write_table<W: Write>(table: &FlatTable, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export(
    result: &ApiResult,
    path: &Path,
    format: OutputFormat,
    indent: usize,
) -> Result<ExportOutcome> {
    match format {
        OutputFormat::Json => write_json(result, path, indent),
        OutputFormat::Csv => write_csv(result, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_from_path() {
        assert_eq!(OutputFormat::from_path(Path::new("out.csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("OUT.CSV")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_path(Path::new("out.json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("out.txt")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_path(Path::new("results")), OutputFormat::Json);
    }

    #[test]
    fn test_default_filename() {
        let name = default_filename(OutputFormat::Csv);
        assert!(name.starts_with("dehashed_results_"));
        assert!(name.ends_with(".csv"));
    }

    #[test]
    fn test_pretty_json_indent() {
        let text = to_pretty_json(&json!({"a": [1]}), 4).unwrap();
        assert_eq!(text, "{\n    \"a\": [\n        1\n    ]\n}");
    }

    #[test]
    fn test_write_table_quotes_fields() {
        let result = ApiResult::new(json!({
            "entries": [{"id": "1", "name": "Doe, Jane", "raw_record": "say \"hi\""}]
        }));
        let table = flatten_result(&result).unwrap();

        let mut out = Vec::new();
        write_table(&table, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "id,name,raw_record\n1,\"Doe, Jane\",\"say \"\"hi\"\"\"\n");
    }
}
