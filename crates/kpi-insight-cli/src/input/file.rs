use kpi_insight_core::scoring::RaterEntry;
use std::fs;
use std::path::{Path, PathBuf};

/// Layout of a rater-input document: a JSON array or a CSV table with
/// `kpi_id,role,rating` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingsFormat {
    Json,
    Csv,
}

impl RatingsFormat {
    /// Format from a file extension; anything but `.csv` is JSON.
    pub fn from_path(path: &Path) -> Self {
        let is_csv = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if is_csv {
            RatingsFormat::Csv
        } else {
            RatingsFormat::Json
        }
    }

    /// Format of piped text with no file name: JSON opens with `[` or `{`.
    pub fn sniff(text: &str) -> Self {
        match text.trim_start().chars().next() {
            Some('[') | Some('{') => RatingsFormat::Json,
            _ => RatingsFormat::Csv,
        }
    }
}

/// Read rater inputs from a file. The format follows the file extension.
pub fn read_ratings(path: &str) -> Result<Vec<RaterEntry>, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let contents = fs::read_to_string(&canonical)
        .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
    parse_ratings(
        &contents,
        RatingsFormat::from_path(&canonical),
        &canonical.display().to_string(),
    )
}

/// Parse a rater-input document. `source` names it in error messages.
pub fn parse_ratings(
    text: &str,
    format: RatingsFormat,
    source: &str,
) -> Result<Vec<RaterEntry>, Box<dyn std::error::Error>> {
    match format {
        RatingsFormat::Csv => {
            let mut rdr = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_reader(text.as_bytes());
            let mut entries = Vec::new();
            for record in rdr.deserialize() {
                let entry: RaterEntry =
                    record.map_err(|e| format!("Failed to parse '{}': {}", source, e))?;
                entries.push(entry);
            }
            Ok(entries)
        }
        RatingsFormat::Json => {
            let entries: Vec<RaterEntry> = serde_json::from_str(text)
                .map_err(|e| format!("Failed to parse '{}': {}", source, e))?;
            Ok(entries)
        }
    }
}

/// Resolve and validate the path, preventing directory traversal.
pub fn resolve_path(path: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let p = Path::new(path);
    let canonical = if p.is_absolute() {
        p.to_path_buf()
    } else {
        std::env::current_dir()?.join(p)
    };

    if !canonical.exists() {
        return Err(format!("File not found: {}", canonical.display()).into());
    }

    if !canonical.is_file() {
        return Err(format!("Not a file: {}", canonical.display()).into());
    }

    Ok(canonical)
}
