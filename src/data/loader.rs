use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, ArrayRef, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
    StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{CellValue, Table};

// ---------------------------------------------------------------------------
// Load errors
// ---------------------------------------------------------------------------

/// Load-time errors. Both are fatal for the session: without a table there is
/// nothing to explore.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read data source '{path}': {source:#}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
    #[error("data source '{path}' has no columns")]
    SchemaEmpty { path: PathBuf },
}

// ---------------------------------------------------------------------------
// Process-wide table cache
// ---------------------------------------------------------------------------

/// Loaded tables keyed by source identity. Tables are immutable, so the cache
/// never needs invalidation; repeated `load` calls on the same source return
/// the same `Arc` without touching storage again.
static TABLE_CACHE: OnceLock<Mutex<HashMap<PathBuf, Arc<Table>>>> = OnceLock::new();

fn cache() -> &'static Mutex<HashMap<PathBuf, Arc<Table>>> {
    TABLE_CACHE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Source identity: the canonical path where resolvable, the literal path
/// otherwise (a nonexistent file fails later with a proper diagnostic).
fn cache_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a table from a file, consulting the process-wide cache first.
/// Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row naming the columns, scalar cells
/// * `.json`    – records array: `[{ "col": value, ... }, ...]`
/// * `.parquet` – scalar columns
pub fn load(path: &Path) -> Result<Arc<Table>, LoadError> {
    let key = cache_key(path);

    {
        let guard = cache().lock().unwrap_or_else(|e| e.into_inner());
        if let Some(table) = guard.get(&key) {
            log::debug!("table cache hit for {}", key.display());
            return Ok(Arc::clone(table));
        }
    }

    let table = read_table(path).map_err(|source| LoadError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;
    if table.column_names().is_empty() {
        return Err(LoadError::SchemaEmpty {
            path: path.to_path_buf(),
        });
    }

    let table = Arc::new(table);
    let mut guard = cache().lock().unwrap_or_else(|e| e.into_inner());
    Ok(Arc::clone(
        guard.entry(key).or_insert_with(|| Arc::clone(&table)),
    ))
}

fn read_table(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one scalar cell per field.
/// Cell types are inferred per column: a column is integer / float / bool
/// only when every non-empty cell parses as that type, otherwise text.
/// Empty cells become null.
fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut raw_columns: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: {} fields, header has {}",
                record.len(),
                headers.len()
            );
        }
        for (col_idx, field) in record.iter().enumerate() {
            raw_columns[col_idx].push(field.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw_columns)
        .map(|(name, raw)| (name, infer_column(&raw)))
        .collect();
    Table::from_columns(columns)
}

/// Assign one [`CellValue`] variant to a whole raw CSV column.
fn infer_column(raw: &[String]) -> Vec<CellValue> {
    let non_empty: Vec<&str> = raw
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    let parse: fn(&str) -> CellValue = if non_empty.is_empty() {
        |_| CellValue::Null
    } else if non_empty.iter().all(|s| s.parse::<i64>().is_ok()) {
        |s| match s.parse::<i64>() {
            Ok(i) => CellValue::Integer(i),
            Err(_) => CellValue::Null,
        }
    } else if non_empty.iter().all(|s| s.parse::<f64>().is_ok()) {
        |s| match s.parse::<f64>() {
            Ok(f) => CellValue::Float(f),
            Err(_) => CellValue::Null,
        }
    } else if non_empty.iter().all(|s| *s == "true" || *s == "false") {
        |s| CellValue::Bool(s == "true")
    } else {
        |s| CellValue::Text(s.to_string())
    };

    raw.iter()
        .map(|s| {
            let s = s.trim();
            if s.is_empty() {
                CellValue::Null
            } else {
                parse(s)
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default
/// `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "age": 30, "city": "NY" },
///   { "age": 40, "city": "LA" }
/// ]
/// ```
///
/// Column order is first-seen key order across the records; keys missing
/// from a record become null.
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut column_order: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !column_order.contains(key) {
                column_order.push(key.clone());
            }
        }
    }

    let mut columns: Vec<(String, Vec<CellValue>)> = column_order
        .into_iter()
        .map(|name| (name, Vec::with_capacity(records.len())))
        .collect();

    for rec in records {
        // Validated as objects above.
        let obj = rec.as_object().context("record is not a JSON object")?;
        for (name, values) in &mut columns {
            values.push(obj.get(name).map_or(CellValue::Null, json_to_cell));
        }
    }

    Table::from_columns(columns)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with scalar columns (strings, ints, floats, bools).
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let schema = builder.schema().clone();
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<(String, Vec<CellValue>)> = schema
        .fields()
        .iter()
        .map(|f| (f.name().clone(), Vec::new()))
        .collect();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, (name, values)) in columns.iter_mut().enumerate() {
            let array = batch.column(col_idx);
            for row in 0..batch.num_rows() {
                values.push(cell_from_array(array, row).with_context(|| {
                    format!("column '{name}', row {row}")
                })?);
            }
        }
    }

    Table::from_columns(columns)
}

/// Extract a single scalar cell from an Arrow column at a given row.
fn cell_from_array(col: &ArrayRef, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 | DataType::LargeUtf8 => {
            if let Some(s) = col.as_any().downcast_ref::<StringArray>() {
                CellValue::Text(s.value(row).to_string())
            } else {
                // LargeStringArray
                let s = col.as_string::<i64>();
                CellValue::Text(s.value(row).to_string())
            }
        }
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().unwrap();
            CellValue::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().unwrap();
            CellValue::Integer(arr.value(row))
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().unwrap();
            CellValue::Float(arr.value(row) as f64)
        }
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().unwrap();
            CellValue::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col.as_any().downcast_ref::<BooleanArray>().unwrap();
            CellValue::Bool(arr.value(row))
        }
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(cell)
}
