//! JSON and YAML documents

use super::SerializationError;
use crate::parameters::value::Value;
use indexmap::IndexMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub(crate) fn read_json(path: &Path) -> Result<Value, SerializationError> {
    let file = File::open(path)?;
    let value = serde_json::from_reader(BufReader::new(file))?;
    Ok(value)
}

pub(crate) fn write_json(
    path: &Path,
    data: &IndexMap<String, Value>,
) -> Result<(), SerializationError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, data)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(feature = "yaml")]
pub(crate) fn read_yaml(path: &Path) -> Result<Value, SerializationError> {
    let file = File::open(path)?;
    let value = serde_yaml::from_reader(BufReader::new(file))?;
    Ok(value)
}

#[cfg(feature = "yaml")]
pub(crate) fn write_yaml(
    path: &Path,
    data: &IndexMap<String, Value>,
) -> Result<(), SerializationError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_yaml::to_writer(&mut writer, data)?;
    writer.flush()?;
    Ok(())
}

#[cfg(not(feature = "yaml"))]
pub(crate) fn read_yaml(_path: &Path) -> Result<Value, SerializationError> {
    Err(SerializationError::FeatureDisabled("yaml"))
}

#[cfg(not(feature = "yaml"))]
pub(crate) fn write_yaml(
    _path: &Path,
    _data: &IndexMap<String, Value>,
) -> Result<(), SerializationError> {
    Err(SerializationError::FeatureDisabled("yaml"))
}
