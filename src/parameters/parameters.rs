//! Parameter registry implementation
//!
//! This module provides the Parameters struct, which keeps a named group of
//! parameter values for an owning object. It gates which names may be introduced,
//! records each parameter's type tag, and logs every change.

use crate::error::{ParamTrackError, Result};
use crate::format::{self, ReadOptions, WriteOptions};
use crate::parameters::config::{is_entry_point_name, is_flag_name, is_reserved, TrackConfig};
use crate::parameters::log::{ChangeLog, LogEntry, LogFilter, OpKind};
use crate::parameters::typecheck::{TagCheck, TypeCheck};
use crate::parameters::value::{TypeTag, Value};
use indexmap::IndexMap;
use std::fmt;
use std::io::{self, Write};
use std::path::Path;

/// Lifecycle state of a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackState {
    /// Not yet initialized: every name is accepted
    Unlocked,

    /// Initialized: the mode flags apply
    Active,
}

/// Which entry point a mutation came through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Set,
    Add,
}

/// Options for [`Parameters::show`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShowOptions {
    /// Include the line with the mode flags
    pub include_internal: bool,

    /// Include the type tag of each parameter
    pub show_types: bool,
}

impl Default for ShowOptions {
    fn default() -> Self {
        Self {
            include_internal: true,
            show_types: true,
        }
    }
}

/// Options for [`Parameters::to_file`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportOptions {
    /// Write each parameter as `{value, type[, unit]}`
    pub include_types: bool,

    /// Also write the note and mode flags
    pub include_internal: bool,

    /// Only write these parameters
    pub include: Option<Vec<String>>,

    /// For CSV files: write a header row of names and a single row of values
    pub csv_as_row: bool,
}

/// A registry of named parameters
///
/// An owning object keeps a `Parameters` as a field and forwards to it. Values are
/// kept in insertion order together with their type tags. All mutations go
/// through a single primitive that applies the mode flags of the registry's
/// [`TrackConfig`] and appends to its [`ChangeLog`].
///
/// # Examples
///
/// ```
/// use param_track::parameters::{Parameters, TrackConfig, Value};
///
/// let config = TrackConfig::new("cfg").strict(true).raise_on_unknown(true);
/// let mut params = Parameters::initialized(config, [("a", 1)]);
///
/// params.set([("a", 2)]).unwrap();
/// assert_eq!(params.get("a").unwrap(), &Value::from(2));
///
/// // Unknown names are rejected in strict mode...
/// assert!(params.set([("b", 3)]).is_err());
///
/// // ...but can always be added explicitly
/// params.add([("b", 3)]).unwrap();
/// assert_eq!(params.get("b").unwrap(), &Value::from(3));
/// ```
pub struct Parameters {
    config: TrackConfig,

    /// Current value of each parameter
    values: IndexMap<String, Value>,

    /// Recorded type tag of each parameter; same keys as `values`
    types: IndexMap<String, TypeTag>,

    /// Units of the parameters that have one
    units: IndexMap<String, String>,

    log: ChangeLog,

    state: TrackState,

    type_check: Box<dyn TypeCheck>,
}

impl Parameters {
    /// Create a new, uninitialized registry
    ///
    /// Until [`Parameters::initialize`] is called every name is accepted.
    pub fn new() -> Self {
        Self {
            config: TrackConfig::default(),
            values: IndexMap::new(),
            types: IndexMap::new(),
            units: IndexMap::new(),
            log: ChangeLog::new(),
            state: TrackState::Unlocked,
            type_check: Box::new(TagCheck),
        }
    }

    /// Create an initialized registry with no parameters
    pub fn with_config(config: TrackConfig) -> Self {
        Self::initialized(config, Vec::<(String, Value)>::new())
    }

    /// Create an initialized registry seeded with `initial`
    pub fn initialized<I, K, V>(config: TrackConfig, initial: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut params = Self::new();
        params.initialize(config, Vec::<String>::new(), initial);
        params
    }

    /// Read a parameter file and build an initialized registry from it
    pub fn load<P: AsRef<Path>>(path: P, options: &ReadOptions, config: TrackConfig) -> Result<Self> {
        let path = path.as_ref();
        let contents = format::read_file(path, options).map_err(|source| {
            ParamTrackError::Serialization {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let mut params = Self::initialized(config, contents.values);
        for (name, unit) in contents.units {
            if params.contains(&name) {
                params.units.insert(name, unit);
            }
        }
        Ok(params)
    }

    /// Install the comparator used when type checking is enabled
    pub fn with_type_check<C: TypeCheck + 'static>(mut self, check: C) -> Self {
        self.set_type_check(check);
        self
    }

    /// Replace the comparator used when type checking is enabled
    pub fn set_type_check<C: TypeCheck + 'static>(&mut self, check: C) {
        self.type_check = Box::new(check);
    }

    /// (Re)initialize the registry
    ///
    /// The flags of `config` are applied silently, existing parameters are
    /// cleared, every name in `names` is seeded with `Null`, and then every pair
    /// of `initial` is seeded. Reserved names are skipped with a warning; nothing
    /// else is checked. The change log is kept.
    ///
    /// # Arguments
    ///
    /// * `config` - Note and mode flags to apply
    /// * `names` - Names to seed with `Null`
    /// * `initial` - Name/value pairs to seed
    ///
    /// # Examples
    ///
    /// ```
    /// use param_track::parameters::{Parameters, TrackConfig, TrackState};
    ///
    /// let mut params = Parameters::new();
    /// params.initialize(TrackConfig::new("rx").strict(true), ["band"], [("gain", 3)]);
    ///
    /// assert_eq!(params.state(), TrackState::Active);
    /// assert!(params.get("band").unwrap().is_null());
    /// assert_eq!(params.names(), vec!["band", "gain"]);
    /// ```
    pub fn initialize<N, S, I, K, V>(&mut self, config: TrackConfig, names: N, initial: I)
    where
        N: IntoIterator<Item = S>,
        S: Into<String>,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.silent_update(config.flag_entries());
        self.values.clear();
        self.types.clear();
        self.units.clear();

        let seeds = names
            .into_iter()
            .map(|name| -> (String, Value) { (name.into(), Value::Null) })
            .chain(initial.into_iter().map(|(k, v)| -> (String, Value) { (k.into(), v.into()) }));
        for (name, value) in seeds {
            if is_reserved(&name) {
                self.warn(&name, format!("Attempt to initialize internal name '{}' -- ignored.", name));
                continue;
            }
            self.commit(name, value, OpKind::Init);
        }

        self.state = TrackState::Active;
    }

    /// Set parameters, subject to the strict and type-check policies
    ///
    /// Every pair is handled independently: valid pairs are applied even when
    /// others fail. A single failure is returned as is, several as
    /// [`ParamTrackError::Multiple`].
    ///
    /// # Arguments
    ///
    /// * `pairs` - Name/value pairs to apply
    ///
    /// # Returns
    ///
    /// `Ok(())` if every pair was applied or skipped with a warning, or the
    /// error(s) of the pairs that were refused
    ///
    /// # Examples
    ///
    /// ```
    /// use param_track::parameters::{Parameters, TrackConfig, Value};
    /// use param_track::ParamTrackError;
    ///
    /// let config = TrackConfig::new("rx").strict(true).raise_on_unknown(true);
    /// let mut params = Parameters::initialized(config, [("gain", 3)]);
    ///
    /// let err = params.set([("gain", 5), ("offset", 1)]).unwrap_err();
    /// assert!(matches!(err, ParamTrackError::UnknownInStrictMode { .. }));
    /// assert_eq!(params.get("gain").unwrap(), &Value::from(5));
    /// ```
    pub fn set<I, K, V>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.apply_all(pairs, Entry::Set)
    }

    /// Set a single parameter
    pub fn set_one<V: Into<Value>>(&mut self, name: &str, value: V) -> Result<()> {
        self.pt_set(name.to_string(), value.into(), Entry::Set)
    }

    /// Add or update parameters regardless of strict mode
    ///
    /// This is the only way to introduce a new name into a strict registry.
    /// Reserved names still fail; type mismatches are only warned about.
    ///
    /// # Arguments
    ///
    /// * `pairs` - Name/value pairs to add or update
    ///
    /// # Returns
    ///
    /// `Ok(())` unless a pair used a reserved name
    ///
    /// # Examples
    ///
    /// ```
    /// use param_track::parameters::{Parameters, TrackConfig};
    ///
    /// let mut params = Parameters::with_config(TrackConfig::new("rx").strict(true));
    /// params.add([("gain", 3)]).unwrap();
    /// assert!(params.contains("gain"));
    /// assert!(params.add([("set", 1)]).is_err());
    /// ```
    pub fn add<I, K, V>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.apply_all(pairs, Entry::Add)
    }

    /// Write values without any checks
    ///
    /// Flag names (`ptstrict`, `ptnote`, ...) update the mode flags. Entry-point
    /// names are ignored with a warning. Everything else is written as a
    /// parameter. Nothing is printed, but every write is logged.
    ///
    /// # Arguments
    ///
    /// * `pairs` - Name/value pairs to write; flag names change the mode flags
    ///
    /// # Examples
    ///
    /// ```
    /// use param_track::parameters::{Parameters, TrackConfig, Value};
    ///
    /// let mut params = Parameters::with_config(TrackConfig::new("rx").strict(true));
    /// params.silent_update([("ptstrict", Value::from(false)), ("gain", Value::from(3))]);
    ///
    /// assert!(!params.config().strict);
    /// assert_eq!(params.get("gain").unwrap(), &Value::from(3));
    /// ```
    pub fn silent_update<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        for (name, value) in pairs {
            let name = name.into();
            let value = value.into();

            if is_entry_point_name(&name) {
                self.warn(&name, format!("Attempt to set internal method '{}' -- ignored.", name));
            } else if let Some(previous) = self.config.apply_flag(&name, &value) {
                let current = self.config.flag(&name);
                let detail = format!("Internal flag '{}' set to {}", name, value);
                self.log.post(OpKind::SilentUpdate, &name, Some(previous), current, detail);
            } else {
                self.commit(name, value, OpKind::SilentUpdate);
            }
        }
    }

    /// Get the value of a parameter
    pub fn get(&self, name: &str) -> Result<&Value> {
        self.values
            .get(name)
            .ok_or_else(|| ParamTrackError::ParameterNotFound {
                name: name.to_string(),
            })
    }

    /// Get the value of a parameter, or `default` if it is not tracked
    pub fn get_or<'a>(&'a self, name: &str, default: &'a Value) -> &'a Value {
        self.values.get(name).unwrap_or(default)
    }

    /// Remove parameters
    ///
    /// Absent names are ignored and leave no log entry.
    ///
    /// # Arguments
    ///
    /// * `names` - Names of the parameters to remove
    ///
    /// # Returns
    ///
    /// The number of parameters removed
    ///
    /// # Examples
    ///
    /// ```
    /// use param_track::parameters::{Parameters, TrackConfig};
    ///
    /// let mut params = Parameters::initialized(TrackConfig::default(), [("a", 1), ("b", 2)]);
    /// assert_eq!(params.delete(["a", "missing"]), 1);
    /// assert_eq!(params.names(), vec!["b"]);
    /// ```
    pub fn delete<I, S>(&mut self, names: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut removed = 0;
        for name in names {
            let name = name.as_ref();
            if let Some(old) = self.values.shift_remove(name) {
                self.types.shift_remove(name);
                self.units.shift_remove(name);
                let detail = format!("Deleting parameter '{}'  [previous value <{}>: {}]", name, old.type_tag(), old);
                self.log.post(OpKind::Delete, name, Some(old), None, detail);
                removed += 1;
            }
        }
        removed
    }

    /// Whether `name` is a tracked parameter
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of tracked parameters
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parameter names in insertion order
    pub fn names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }

    /// Name/value pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Recorded type tag of a parameter
    pub fn type_of(&self, name: &str) -> Option<TypeTag> {
        self.types.get(name).copied()
    }

    /// Unit of a parameter, if one was recorded
    pub fn unit(&self, name: &str) -> Option<&str> {
        self.units.get(name).map(String::as_str)
    }

    /// Attach a unit to a tracked parameter
    pub fn set_unit(&mut self, name: &str, unit: &str) -> Result<()> {
        if !self.contains(name) {
            return Err(ParamTrackError::ParameterNotFound {
                name: name.to_string(),
            });
        }
        self.units.insert(name.to_string(), unit.to_string());
        Ok(())
    }

    /// Current note and mode flags
    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    pub fn note(&self) -> &str {
        &self.config.note
    }

    /// Lifecycle state
    pub fn state(&self) -> TrackState {
        self.state
    }

    /// The full change log
    pub fn log(&self) -> &ChangeLog {
        &self.log
    }

    /// Log entries matching `filter`
    pub fn log_query(&self, filter: &LogFilter) -> Vec<&LogEntry> {
        self.log.query(filter)
    }

    /// Render the change log as text
    pub fn show_log(&self) -> String {
        self.log.render()
    }

    /// Render the note, the mode flags and the parameters as text
    pub fn show(&self, options: ShowOptions) -> String {
        let mut s = format!("Parameter Tracking: {}\n", self.config.note);
        if options.include_internal {
            s.push_str(&self.config.summary());
            s.push('\n');
        }
        for (name, value) in &self.values {
            s.push_str("  ");
            s.push_str(name);
            if options.show_types {
                if let Some(tag) = self.types.get(name) {
                    s.push_str(&format!(" <{}>", tag));
                }
            }
            s.push_str(&format!(" : {}", value));
            if let Some(unit) = self.units.get(name) {
                s.push_str(&format!(" [{}]", unit));
            }
            s.push('\n');
        }
        s
    }

    /// Write the output of [`Parameters::show`] to `sink`
    pub fn show_to<W: Write>(&self, sink: &mut W, options: ShowOptions) -> io::Result<()> {
        sink.write_all(self.show(options).as_bytes())
    }

    /// Snapshot of the parameters as a flat mapping
    ///
    /// With `include_types` every entry becomes a mapping holding `value`,
    /// `type` and, when known, `unit`. With `include_internal` the note and mode
    /// flags come first.
    pub fn to_dict(&self, include_types: bool, include_internal: bool) -> IndexMap<String, Value> {
        let mut dict = IndexMap::new();
        if include_internal {
            for (name, value) in self.config.flag_entries() {
                dict.insert(name.to_string(), value);
            }
        }
        for (name, value) in &self.values {
            let entry = if include_types {
                let mut fields = IndexMap::new();
                fields.insert("value".to_string(), value.clone());
                if let Some(tag) = self.types.get(name) {
                    fields.insert("type".to_string(), Value::from(tag.name()));
                }
                if let Some(unit) = self.units.get(name) {
                    fields.insert("unit".to_string(), Value::from(unit.as_str()));
                }
                Value::Map(fields)
            } else {
                value.clone()
            };
            dict.insert(name.clone(), entry);
        }
        dict
    }

    /// Write the parameters to a file, choosing the format from its extension
    ///
    /// Without `include_types`, a map-valued parameter that has a `value`,
    /// `unit` or `__external__` key is written wrapped as `{"value": <map>}` so
    /// that reading the file gives the map back unchanged.
    ///
    /// # Arguments
    ///
    /// * `path` - Destination file; `.json`, `.yaml`, `.yml` or `.csv`
    /// * `options` - What to include and, for CSV, the layout
    ///
    /// # Returns
    ///
    /// `Ok(())` if the file was written, or a [`ParamTrackError::Serialization`]
    /// naming the path
    ///
    /// # Examples
    ///
    /// ```
    /// use param_track::format::ReadOptions;
    /// use param_track::parameters::{ExportOptions, Parameters, TrackConfig};
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let path = dir.path().join("rx.json");
    ///
    /// let params = Parameters::initialized(TrackConfig::new("rx"), [("gain", 3)]);
    /// params.to_file(&path, &ExportOptions::default()).unwrap();
    ///
    /// let restored = Parameters::load(&path, &ReadOptions::default(), TrackConfig::new("rx")).unwrap();
    /// assert_eq!(restored.to_dict(false, false), params.to_dict(false, false));
    /// ```
    pub fn to_file<P: AsRef<Path>>(&self, path: P, options: &ExportOptions) -> Result<()> {
        let path = path.as_ref();
        let mut dict = self.to_dict(options.include_types, options.include_internal);
        if let Some(include) = &options.include {
            dict.retain(|name, _| is_flag_name(name) || include.iter().any(|n| n == name));
        }
        if !options.include_types {
            dict = dict
                .into_iter()
                .map(|(name, value)| (name, format::wrap_expanded_keys(value)))
                .collect();
        }

        let write_options = WriteOptions {
            csv_as_row: options.csv_as_row,
        };
        format::write_file(path, &dict, &write_options).map_err(|source| {
            ParamTrackError::Serialization {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Set parameters from a file, choosing the format from its extension
    ///
    /// Values go through [`Parameters::set`], so strict mode and type checks
    /// apply. Flag entries in the file are ignored with a warning. Units are
    /// recorded for the parameters that end up tracked.
    pub fn from_file<P: AsRef<Path>>(&mut self, path: P, options: &ReadOptions) -> Result<()> {
        let path = path.as_ref();
        let contents = format::read_file(path, options).map_err(|source| {
            ParamTrackError::Serialization {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let mut pairs = Vec::with_capacity(contents.values.len());
        for (name, value) in contents.values {
            if is_flag_name(&name) {
                self.warn(&name, format!("Internal flag '{}' in {} -- ignored.", name, path.display()));
            } else {
                pairs.push((name, value));
            }
        }
        let result = self.set(pairs);

        for (name, unit) in contents.units {
            if self.contains(&name) {
                self.units.insert(name, unit);
            }
        }
        result
    }

    fn apply_all<I, K, V>(&mut self, pairs: I, entry: Entry) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut errors = Vec::new();
        for (name, value) in pairs {
            if let Err(err) = self.pt_set(name.into(), value.into(), entry) {
                errors.push(err);
            }
        }
        ParamTrackError::collect(errors)
    }

    /// The checked mutation primitive behind `set` and `add`
    fn pt_set(&mut self, name: String, value: Value, entry: Entry) -> Result<()> {
        if is_reserved(&name) {
            return Err(ParamTrackError::ReservedName { name });
        }

        let old_tag = self.types.get(&name).copied();
        let gated = entry == Entry::Set && self.state == TrackState::Active && self.config.strict;

        match old_tag {
            None if gated => {
                if self.config.raise_on_unknown {
                    return Err(ParamTrackError::UnknownInStrictMode { name });
                }
                let message = format!(
                    "Unknown parameter '{}' in strict mode -- ignored.  Use add to add new parameters.",
                    name
                );
                self.warn(&name, message);
                return Ok(());
            }
            Some(old_tag) if self.config.check_type => {
                let compatible = match self.values.get(&name) {
                    Some(old) => self.type_check.compatible(&name, old, &value),
                    None => true,
                };
                if !compatible {
                    let new_tag = value.type_tag();
                    if entry == Entry::Set && self.config.raise_on_type_mismatch {
                        return Err(ParamTrackError::TypeMismatch {
                            name,
                            old: old_tag,
                            new: new_tag,
                        });
                    }
                    let message = format!(
                        "Parameter types don't match for '{}': <old: {}> vs <new: {}> -- resetting to <{}>.",
                        name, old_tag, new_tag, new_tag
                    );
                    self.warn(&name, message);
                }
            }
            _ => {}
        }

        let kind = match entry {
            Entry::Set => OpKind::Set,
            Entry::Add => OpKind::Add,
        };
        self.commit(name, value, kind);
        Ok(())
    }

    /// Apply a mutation and log it
    fn commit(&mut self, name: String, value: Value, kind: OpKind) {
        let tag = value.type_tag();
        let old = self.values.insert(name.clone(), value.clone());
        self.types.insert(name.clone(), tag);

        let verb = match (kind, &old) {
            (OpKind::Add, None) => "Adding",
            (_, Some(_)) => "Resetting",
            _ => "Setting",
        };
        let detail = match &old {
            Some(prev) => format!(
                "{} parameter '{}' as <{}>:  {}     [previous value <{}>: {}]",
                verb,
                name,
                tag,
                value,
                prev.type_tag(),
                prev
            ),
            None => format!("{} parameter '{}' as <{}>:  {}", verb, name, tag, value),
        };

        if self.config.verbose && matches!(kind, OpKind::Set | OpKind::Add) {
            tracing::info!("{}", detail);
        }
        self.log.post(kind, &name, old, Some(value), detail);
    }

    /// Record a non-fatal policy warning
    fn warn(&mut self, name: &str, message: String) {
        tracing::warn!("{}", message);
        self.log.post(OpKind::Warning, name, None, None, message);
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameters")
            .field("config", &self.config)
            .field("values", &self.values)
            .field("types", &self.types)
            .field("units", &self.units)
            .field("state", &self.state)
            .field("log_len", &self.log.len())
            .finish()
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.show(ShowOptions::default()).trim_end())
    }
}
