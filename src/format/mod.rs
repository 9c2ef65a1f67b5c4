//! # Parameter File Formats
//!
//! Reading and writing parameter snapshots. The codec is chosen from the file
//! extension:
//!
//! - `.json`: a pretty-printed mapping of names to values
//! - `.yaml` / `.yml`: the same mapping as YAML (feature `yaml`)
//! - `.csv`: two `parameter,value` columns, or a header row of names followed by
//!   rows of values (feature `csv`)
//!
//! JSON and YAML round-trip values exactly. CSV cells hold strings raw and
//! everything else as JSON text; on reading, empty cells become `Null` and any
//! cell that parses as JSON takes that value, so a string such as `"12"` or
//! `"true"` comes back as a number or boolean.
//!
//! JSON and CSV have no representation for NaN or infinite floats, so writing
//! one to those formats fails with [`SerializationError::NonFiniteFloat`]. YAML
//! writes them as `.nan` / `.inf`.
//!
//! Entries read from a file may be written in an expanded form,
//! `{"value": ..., "unit": ...}`. The unit is reported separately in
//! [`FileContents::units`]; entries marked `"__external__": true` are skipped.
//! A map-valued parameter that has one of those keys itself is written wrapped
//! as `{"value": <map>}` (see [`wrap_expanded_keys`]) so it reads back whole.

mod document;
mod table;

use crate::parameters::value::{TypeTag, Value};
use indexmap::IndexMap;
use std::path::Path;

/// Error that can occur during serialization/deserialization
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[cfg(feature = "yaml")]
    #[error("YAML serialization error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[cfg(feature = "csv")]
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Unsupported file format for parameter loading: {0}")]
    UnsupportedFormat(String),

    #[error("Support for {0} files was not compiled in")]
    FeatureDisabled(&'static str),

    #[error("Key '{0}' not found")]
    MissingKey(String),

    #[error("Expected a mapping of parameter names to values, found <{0}>")]
    NotAMapping(TypeTag),

    #[error("Row {0} not found")]
    MissingRow(usize),

    #[error("Parameter '{0}' holds a non-finite float, which this format cannot represent")]
    NonFiniteFloat(String),
}

/// Keys that mark a mapping entry as expanded on reading
const EXPANDED_KEYS: [&str; 3] = ["value", "unit", "__external__"];

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Csv,
    Json,
    Yaml,
}

impl Format {
    /// Select the format from the extension of `path`
    ///
    /// # Examples
    ///
    /// ```
    /// use param_track::format::Format;
    ///
    /// assert_eq!(Format::from_path("obs.yml").unwrap(), Format::Yaml);
    /// assert!(Format::from_path("obs.npz").is_err());
    /// ```
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SerializationError> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("csv") => Ok(Format::Csv),
            Some("json") => Ok(Format::Json),
            Some("yaml") | Some("yml") => Ok(Format::Yaml),
            _ => Err(SerializationError::UnsupportedFormat(
                path.display().to_string(),
            )),
        }
    }
}

/// Options for reading a parameter file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadOptions {
    /// Read the parameters from this top-level key instead of the whole document
    pub use_key: Option<String>,

    /// For CSV files laid out as rows: the 1-based data row to read
    pub csv_row: Option<usize>,
}

impl ReadOptions {
    pub fn use_key(mut self, key: &str) -> Self {
        self.use_key = Some(key.to_string());
        self
    }

    pub fn csv_row(mut self, row: usize) -> Self {
        self.csv_row = Some(row);
        self
    }
}

/// Options for writing a parameter file
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WriteOptions {
    /// For CSV files: write a header row of names and a single row of values
    pub csv_as_row: bool,
}

/// Parameters read from a file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileContents {
    /// Values by name, in file order
    pub values: IndexMap<String, Value>,

    /// Units by name, for entries that declared one
    pub units: IndexMap<String, String>,
}

/// Read parameters from `path`
pub fn read_file<P: AsRef<Path>>(
    path: P,
    options: &ReadOptions,
) -> Result<FileContents, SerializationError> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    tracing::debug!("Reading parameters from {} as {:?}", path.display(), format);

    let document = match format {
        Format::Json => document::read_json(path)?,
        Format::Yaml => document::read_yaml(path)?,
        Format::Csv => table::read_csv(path, options.csv_row)?,
    };

    let mut map = match document {
        Value::Map(map) => map,
        other => return Err(SerializationError::NotAMapping(other.type_tag())),
    };

    if let Some(key) = &options.use_key {
        map = match map.shift_remove(key) {
            Some(Value::Map(inner)) => inner,
            Some(other) => return Err(SerializationError::NotAMapping(other.type_tag())),
            None => return Err(SerializationError::MissingKey(key.clone())),
        };
    }

    Ok(normalize(map))
}

/// Write a parameter snapshot to `path`
pub fn write_file<P: AsRef<Path>>(
    path: P,
    data: &IndexMap<String, Value>,
    options: &WriteOptions,
) -> Result<(), SerializationError> {
    let path = path.as_ref();
    let format = Format::from_path(path)?;
    tracing::debug!(
        "Writing {} parameters to {} as {:?}",
        data.len(),
        path.display(),
        format
    );

    if matches!(format, Format::Json | Format::Csv) {
        if let Some((name, _)) = data.iter().find(|(_, value)| has_non_finite(value)) {
            return Err(SerializationError::NonFiniteFloat(name.clone()));
        }
    }

    match format {
        Format::Json => document::write_json(path, data),
        Format::Yaml => document::write_yaml(path, data),
        Format::Csv => table::write_csv(path, data, options.csv_as_row),
    }
}

/// Split expanded `{value, unit}` entries into values and units
fn normalize(map: IndexMap<String, Value>) -> FileContents {
    let mut contents = FileContents::default();

    for (key, entry) in map {
        let fields = match entry {
            Value::Map(fields) => fields,
            plain => {
                contents.values.insert(key, plain);
                continue;
            }
        };

        if fields.get("__external__") == Some(&Value::Bool(true)) {
            continue;
        }

        let mut expanded = false;
        if let Some(unit) = fields.get("unit") {
            expanded = true;
            contents.units.insert(key.clone(), unit_text(unit));
            contents.values.insert(key.clone(), Value::Null);
        }
        if let Some(value) = fields.get("value") {
            expanded = true;
            contents.values.insert(key.clone(), value.clone());
        }
        if !expanded {
            contents.values.insert(key, Value::Map(fields));
        }
    }

    contents
}

/// Wrap a map that would otherwise be read back as an expanded entry
///
/// # Examples
///
/// ```
/// use indexmap::IndexMap;
/// use param_track::format::wrap_expanded_keys;
/// use param_track::parameters::Value;
///
/// let mut fit = IndexMap::new();
/// fit.insert("value".to_string(), Value::from(3));
/// let wrapped = wrap_expanded_keys(Value::Map(fit.clone()));
/// assert_eq!(wrapped.as_map().unwrap()["value"], Value::Map(fit));
///
/// assert_eq!(wrap_expanded_keys(Value::from(3)), Value::from(3));
/// ```
pub fn wrap_expanded_keys(value: Value) -> Value {
    match value {
        Value::Map(fields) if EXPANDED_KEYS.iter().any(|key| fields.contains_key(*key)) => {
            let mut wrapper = IndexMap::new();
            wrapper.insert("value".to_string(), Value::Map(fields));
            Value::Map(wrapper)
        }
        other => other,
    }
}

fn has_non_finite(value: &Value) -> bool {
    match value {
        Value::Float(x) => !x.is_finite(),
        Value::List(items) => items.iter().any(has_non_finite),
        Value::Map(fields) => fields.values().any(has_non_finite),
        _ => false,
    }
}

fn unit_text(unit: &Value) -> String {
    match unit {
        Value::Str(s) => s.clone(),
        Value::List(items) if !items.is_empty() => format!("[{}]", items[0]),
        other => other.to_string(),
    }
}
