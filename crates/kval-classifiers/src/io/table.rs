//! Delimited, JSON and spreadsheet table reader.
use std::collections::HashSet;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use csv::StringRecord;

use crate::data_handling::Dataset;
use crate::math::{Array1, Array2};

/// Raw tabular data: numeric feature cells and label cells, either of which
/// may be missing. Produced by `read_table`, consumed by `cleaning`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub feature_names: Vec<String>,
    pub label_name: String,
    pub rows: Vec<Vec<Option<f64>>>,
    pub labels: Vec<Option<String>>,
    /// Per row, the trimmed cells of the excluded columns in header order.
    /// Duplicate detection compares them along with features and label.
    pub excluded_cells: Vec<Vec<String>>,
}

impl RawTable {
    pub fn nrows(&self) -> usize {
        self.rows.len()
    }

    pub fn missing_cells(&self) -> usize {
        self.rows.iter().flatten().filter(|v| v.is_none()).count()
            + self.labels.iter().filter(|l| l.is_none()).count()
    }

    /// Convert to a dataset; fails if any cell is still missing.
    pub fn into_dataset(self) -> Result<Dataset<String>> {
        let n_features = self.feature_names.len();
        let mut data = Vec::with_capacity(self.rows.len() * n_features);
        for (row_idx, row) in self.rows.iter().enumerate() {
            for (col, value) in row.iter().enumerate() {
                let value = value.ok_or_else(|| {
                    anyhow!(
                        "Missing value in column '{}' at row {}",
                        self.feature_names[col],
                        row_idx + 1
                    )
                })?;
                data.push(value);
            }
        }
        let labels = self
            .labels
            .into_iter()
            .enumerate()
            .map(|(row_idx, label)| {
                label.ok_or_else(|| anyhow!("Missing label at row {}", row_idx + 1))
            })
            .collect::<Result<Vec<_>>>()?;

        let x = Array2::from_shape_vec((labels.len(), n_features), data)
            .context("Failed to build feature matrix")?;
        Ok(Dataset::new(x, Array1::from_vec(labels), self.feature_names)?)
    }
}

/// Configuration for reading an input table.
#[derive(Debug, Clone)]
pub struct TableReaderConfig {
    /// Column holding the class labels.
    pub label_column: String,
    /// Columns dropped before building features (e.g. sample identifiers).
    pub exclude_columns: Vec<String>,
    /// Cell values treated as missing, besides the empty string.
    pub missing_markers: Vec<String>,
}

impl Default for TableReaderConfig {
    fn default() -> Self {
        Self {
            label_column: "classtype_v1".to_string(),
            exclude_columns: vec!["Sample code number".to_string()],
            missing_markers: vec![
                "NA".to_string(),
                "NaN".to_string(),
                "nan".to_string(),
                "null".to_string(),
                "?".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableFormat {
    Delimited(u8),
    Json,
    Excel,
}

fn detect_format(path: &Path) -> Result<TableFormat> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    match ext.as_deref() {
        Some("csv") | Some("txt") => Ok(TableFormat::Delimited(b',')),
        Some("tsv") => Ok(TableFormat::Delimited(b'\t')),
        Some("json") => Ok(TableFormat::Json),
        Some("xlsx") => Ok(TableFormat::Excel),
        _ => bail!(
            "Unsupported file format: {} (expected one of .csv, .xlsx, .tsv, .txt, .json)",
            path.display()
        ),
    }
}

/// Read a table from `.csv`, `.tsv`, `.txt`, `.json` (array of records) or
/// `.xlsx` (first worksheet, first row as header).
pub fn read_table<P: AsRef<Path>>(path: P, config: &TableReaderConfig) -> Result<RawTable> {
    let path = path.as_ref();
    log::info!("Importing {}", path.display());
    let (headers, records) = match detect_format(path)? {
        TableFormat::Delimited(delimiter) => read_delimited(path, delimiter)?,
        TableFormat::Json => read_json_records(path)?,
        TableFormat::Excel => read_excel(path)?,
    };
    build_table(&headers, records, config)
}

fn read_delimited(path: &Path, delimiter: u8) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open table: {}", path.display()))?;

    let headers: StringRecord = reader
        .headers()
        .context("Failed to read header row")?
        .clone();

    let mut records = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;
        records.push(record.iter().map(str::to_string).collect());
    }
    Ok((headers.iter().map(str::to_string).collect(), records))
}

fn read_json_records(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read table: {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON table: {}", path.display()))?;
    let rows = value
        .as_array()
        .ok_or_else(|| anyhow!("JSON table must be an array of records"))?;

    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        let object = row
            .as_object()
            .ok_or_else(|| anyhow!("JSON table rows must be objects"))?;
        for key in object.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let records = rows
        .iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| match row.get(h) {
                    None | Some(serde_json::Value::Null) => String::new(),
                    Some(serde_json::Value::String(s)) => s.trim().to_string(),
                    Some(other) => other.to_string(),
                })
                .collect()
        })
        .collect();
    Ok((headers, records))
}

fn read_excel(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| anyhow!("Workbook has no worksheets: {}", path.display()))?
        .with_context(|| format!("Failed to read first worksheet: {}", path.display()))?;

    let cell_text = |cell: &Data| match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    };
    let mut rows = range.rows();
    let headers: Vec<String> = rows
        .next()
        .ok_or_else(|| anyhow!("Worksheet is empty: {}", path.display()))?
        .iter()
        .map(cell_text)
        .collect();
    let records = rows.map(|row| row.iter().map(cell_text).collect()).collect();
    Ok((headers, records))
}

fn find_column(headers: &[String], name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case(name.trim()))
}

fn build_table(
    headers: &[String],
    records: Vec<Vec<String>>,
    config: &TableReaderConfig,
) -> Result<RawTable> {
    let label_idx = find_column(headers, &config.label_column)
        .ok_or_else(|| anyhow!("Missing label column '{}'", config.label_column))?;

    let excluded: HashSet<String> = config
        .exclude_columns
        .iter()
        .map(|c| c.trim().to_ascii_lowercase())
        .collect();
    let (excluded_indices, feature_indices): (Vec<usize>, Vec<usize>) = (0..headers.len())
        .filter(|&idx| idx != label_idx)
        .partition(|&idx| excluded.contains(&headers[idx].trim().to_ascii_lowercase()));
    if feature_indices.is_empty() {
        bail!("No feature columns left after excluding the label and excluded columns");
    }

    let is_missing = |cell: &str| cell.is_empty() || config.missing_markers.iter().any(|m| m == cell);

    let mut rows = Vec::with_capacity(records.len());
    let mut labels = Vec::with_capacity(records.len());
    let mut excluded_cells = Vec::with_capacity(records.len());
    for (row_idx, record) in records.iter().enumerate() {
        let cell = |idx: usize| record.get(idx).map(|s| s.trim()).unwrap_or("");

        excluded_cells.push(
            excluded_indices
                .iter()
                .map(|&idx| cell(idx).to_string())
                .collect(),
        );

        let label = cell(label_idx);
        labels.push(if is_missing(label) {
            None
        } else {
            Some(canonical_label(label))
        });

        let mut row = Vec::with_capacity(feature_indices.len());
        for &idx in &feature_indices {
            let raw = cell(idx);
            if is_missing(raw) {
                row.push(None);
                continue;
            }
            let value = raw.parse::<f64>().with_context(|| {
                format!(
                    "Invalid numeric value '{}' in column '{}' at row {}",
                    raw,
                    headers[idx],
                    row_idx + 1
                )
            })?;
            row.push(Some(value));
        }
        rows.push(row);
    }

    let table = RawTable {
        feature_names: feature_indices.iter().map(|&i| headers[i].clone()).collect(),
        label_name: headers[label_idx].clone(),
        rows,
        labels,
        excluded_cells,
    };
    log::info!(
        "Imported {} rows, {} feature columns, {} missing cells",
        table.nrows(),
        table.feature_names.len(),
        table.missing_cells()
    );
    Ok(table)
}

/// `"4.0"` and `"4"` name the same class.
fn canonical_label(raw: &str) -> String {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
        _ => raw.to_string(),
    }
}
