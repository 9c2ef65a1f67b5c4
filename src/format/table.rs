//! CSV tables
//!
//! Two layouts are supported. The default has a `parameter,value` header and one
//! row per parameter; the row layout has a header of names and one row of values
//! per snapshot.

use super::SerializationError;
use crate::parameters::value::Value;
use indexmap::IndexMap;
use std::path::Path;

#[cfg(feature = "csv")]
pub(crate) fn write_csv(
    path: &Path,
    data: &IndexMap<String, Value>,
    as_row: bool,
) -> Result<(), SerializationError> {
    let mut writer = csv::WriterBuilder::new().from_path(path)?;

    if as_row {
        let cells = data.values().map(to_cell).collect::<Result<Vec<_>, _>>()?;
        writer.write_record(data.keys())?;
        writer.write_record(&cells)?;
    } else {
        writer.write_record(["parameter", "value"])?;
        for (key, value) in data {
            writer.write_record([key.as_str(), to_cell(value)?.as_str()])?;
        }
    }

    writer.flush()?;
    Ok(())
}

#[cfg(feature = "csv")]
pub(crate) fn read_csv(path: &Path, row: Option<usize>) -> Result<Value, SerializationError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;
    let mut records = reader.records();
    let mut map = IndexMap::new();

    match row {
        Some(row) => {
            let header = match records.next() {
                Some(header) => header?,
                None => return Err(SerializationError::MissingRow(row)),
            };
            let record = if row == 0 { None } else { records.nth(row - 1) };
            let record = match record {
                Some(record) => record?,
                None => return Err(SerializationError::MissingRow(row)),
            };
            for (key, cell) in header.iter().zip(record.iter()) {
                map.insert(key.to_string(), from_cell(cell));
            }
        }
        None => {
            for (i, record) in records.enumerate() {
                let record = record?;
                // Rows that are not name/value pairs are skipped
                if record.len() != 2 {
                    continue;
                }
                if i == 0 && &record[0] == "parameter" && &record[1] == "value" {
                    continue;
                }
                map.insert(record[0].to_string(), from_cell(&record[1]));
            }
        }
    }

    Ok(Value::Map(map))
}

#[cfg(not(feature = "csv"))]
pub(crate) fn write_csv(
    _path: &Path,
    _data: &IndexMap<String, Value>,
    _as_row: bool,
) -> Result<(), SerializationError> {
    Err(SerializationError::FeatureDisabled("csv"))
}

#[cfg(not(feature = "csv"))]
pub(crate) fn read_csv(_path: &Path, _row: Option<usize>) -> Result<Value, SerializationError> {
    Err(SerializationError::FeatureDisabled("csv"))
}

#[cfg_attr(not(feature = "csv"), allow(dead_code))]
fn to_cell(value: &Value) -> Result<String, serde_json::Error> {
    match value {
        Value::Null => Ok(String::new()),
        Value::Str(s) => Ok(s.clone()),
        other => serde_json::to_string(other),
    }
}

#[cfg_attr(not(feature = "csv"), allow(dead_code))]
fn from_cell(cell: &str) -> Value {
    if cell.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(cell).unwrap_or_else(|_| Value::Str(cell.to_string()))
}
