use std::collections::BTreeMap;
use std::path::Path;

use calamine::{open_workbook_auto, Reader};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::grid::{Cell, Grid};
use crate::records::{parse_grid, ImportError, TransactionRecord};
use crate::stats::calculate_statistics;

const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xls"];
const PREVIEW_ROW_LIMIT: usize = 10;

/// Result of one file ingestion: the normalized records plus what the parser
/// learned about the sheet, so the caller can show what was matched.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub file: String,
    pub header_row: usize,
    pub columns: BTreeMap<String, String>,
    pub records: Vec<TransactionRecord>,
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

/// Decode the first worksheet of an .xlsx/.xls file into a raw grid with
/// array-of-rows semantics. No header inference happens here.
pub fn read_workbook_grid(path: &Path) -> Result<Grid, ImportError> {
    let suffix = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if !SUPPORTED_EXTENSIONS.contains(&suffix.as_str()) {
        return Err(ImportError::UnsupportedFormat(suffix));
    }

    let mut workbook =
        open_workbook_auto(path).map_err(|e| ImportError::Workbook(e.to_string()))?;
    let sheet_names = workbook.sheet_names().to_owned();
    let first_sheet = sheet_names
        .first()
        .cloned()
        .ok_or_else(|| ImportError::Workbook("không tìm thấy worksheet".to_string()))?;
    let range = workbook
        .worksheet_range(&first_sheet)
        .map_err(|e| ImportError::Workbook(e.to_string()))?;

    let grid: Grid = range
        .rows()
        .map(|row| row.iter().map(Cell::from_sheet_value).collect())
        .collect();
    debug!(sheet = %first_sheet, rows = grid.len(), "worksheet decoded");
    Ok(grid)
}

/// Full ingestion of one export file. A sheet that parses to zero records is
/// an error at this level; the record builder itself treats it as a valid
/// empty result.
pub fn import_workbook(path: &Path) -> Result<ImportOutcome, ImportError> {
    let grid = read_workbook_grid(path)?;
    let parse = parse_grid(&grid)?;
    if parse.records.is_empty() {
        return Err(ImportError::EmptyDataset);
    }
    Ok(ImportOutcome {
        file: file_name(path),
        header_row: parse.header_row,
        columns: parse.columns,
        records: parse.records,
    })
}

/// Preview payload for the ingestion dialog: mapping, counts, the first rows
/// and the summary over the whole file.
pub fn preview_workbook(path: &Path) -> Result<Value, ImportError> {
    let outcome = import_workbook(path)?;
    let statistics = calculate_statistics(&outcome.records);
    Ok(json!({
        "file": outcome.file,
        "header_row": outcome.header_row,
        "columns": outcome.columns,
        "parsed_count": outcome.records.len(),
        "preview_rows": outcome
            .records
            .iter()
            .take(PREVIEW_ROW_LIMIT)
            .collect::<Vec<_>>(),
        "statistics": statistics,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn create_temp_path(prefix: &str, ext: &str) -> PathBuf {
        let unique = format!("fuelpos_{prefix}_{}.{ext}", std::process::id());
        std::env::temp_dir().join(unique)
    }

    #[test]
    fn unsupported_extension_is_rejected_before_decoding() {
        let path = create_temp_path("unsupported", "csv");
        fs::write(&path, "STT,Ngày\n1,01/05/2024\n").expect("write temp csv");
        let err = read_workbook_grid(&path).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(ext) if ext == "csv"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_surfaces_a_workbook_error() {
        let path = create_temp_path("missing", "xlsx");
        let _ = fs::remove_file(&path);
        assert!(matches!(
            read_workbook_grid(&path),
            Err(ImportError::Workbook(_))
        ));
    }

    #[test]
    fn corrupt_workbook_surfaces_a_workbook_error() {
        let path = create_temp_path("corrupt", "xlsx");
        fs::write(&path, b"not a workbook").expect("write temp file");
        assert!(matches!(
            read_workbook_grid(&path),
            Err(ImportError::Workbook(_))
        ));
        let _ = fs::remove_file(&path);
    }
}
