//! Configuration options for a parameter registry.
//!
//! This module defines the note and the mode flags that govern how the registry
//! treats new names and type changes, together with the reserved names those flags
//! (and the registry's entry points) occupy.

use crate::parameters::value::Value;
use serde::{Deserialize, Serialize};

/// Name of the note flag
pub const NOTE: &str = "ptnote";
/// Name of the strict-mode flag
pub const STRICT: &str = "ptstrict";
/// Name of the raise-on-unknown flag
pub const RAISE_ON_UNKNOWN: &str = "pterr";
/// Name of the verbosity flag
pub const VERBOSE: &str = "ptverbose";
/// Name of the type-check flag
pub const CHECK_TYPE: &str = "pttype";
/// Name of the raise-on-type-mismatch flag
pub const RAISE_ON_TYPE_MISMATCH: &str = "pttypeerr";

/// Names of the internal flags, in display order
pub const FLAG_NAMES: [&str; 6] = [
    NOTE,
    STRICT,
    RAISE_ON_UNKNOWN,
    VERBOSE,
    CHECK_TYPE,
    RAISE_ON_TYPE_MISMATCH,
];

/// Names of the public registry entry points
pub const ENTRY_POINT_NAMES: [&str; 16] = [
    "initialize",
    "set",
    "set_one",
    "add",
    "silent_update",
    "get",
    "get_or",
    "delete",
    "show",
    "show_to",
    "show_log",
    "log_query",
    "to_dict",
    "to_file",
    "from_file",
    "load",
];

/// Whether `name` is an internal flag name
pub fn is_flag_name(name: &str) -> bool {
    FLAG_NAMES.contains(&name)
}

/// Whether `name` is an entry-point name
pub fn is_entry_point_name(name: &str) -> bool {
    ENTRY_POINT_NAMES.contains(&name)
}

/// Whether `name` can never be used as a parameter name
///
/// # Examples
///
/// ```
/// use param_track::parameters::config::is_reserved;
///
/// assert!(is_reserved("ptstrict"));
/// assert!(is_reserved("to_file"));
/// assert!(!is_reserved("exposure"));
/// ```
pub fn is_reserved(name: &str) -> bool {
    is_flag_name(name) || is_entry_point_name(name)
}

/// Note and mode flags of a parameter registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Free-text description shown in the header of `show`. Default: "Parameter tracking"
    pub note: String,

    /// Reject names that are not yet tracked when using `set`. Default: false
    pub strict: bool,

    /// In strict mode, fail on unknown names instead of warning. Default: false
    pub raise_on_unknown: bool,

    /// Emit a line for every change made through `set` and `add`. Default: false
    pub verbose: bool,

    /// Compare the type of a new value against the recorded one. Default: false
    pub check_type: bool,

    /// With type checking on, fail on a mismatch instead of warning. Default: false
    pub raise_on_type_mismatch: bool,
}

impl Default for TrackConfig {
    fn default() -> Self {
        Self {
            note: "Parameter tracking".to_string(),
            strict: false,
            raise_on_unknown: false,
            verbose: false,
            check_type: false,
            raise_on_type_mismatch: false,
        }
    }
}

impl TrackConfig {
    /// Create a configuration with default flags and the given note
    pub fn new(note: &str) -> Self {
        Self::default().with_note(note)
    }

    pub fn with_note(mut self, note: &str) -> Self {
        self.note = note.to_string();
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn raise_on_unknown(mut self, raise: bool) -> Self {
        self.raise_on_unknown = raise;
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn check_type(mut self, check: bool) -> Self {
        self.check_type = check;
        self
    }

    pub fn raise_on_type_mismatch(mut self, raise: bool) -> Self {
        self.raise_on_type_mismatch = raise;
        self
    }

    /// The flags as `(name, value)` pairs, in display order
    pub fn flag_entries(&self) -> Vec<(&'static str, Value)> {
        vec![
            (NOTE, Value::from(self.note.as_str())),
            (STRICT, Value::from(self.strict)),
            (RAISE_ON_UNKNOWN, Value::from(self.raise_on_unknown)),
            (VERBOSE, Value::from(self.verbose)),
            (CHECK_TYPE, Value::from(self.check_type)),
            (RAISE_ON_TYPE_MISMATCH, Value::from(self.raise_on_type_mismatch)),
        ]
    }

    /// Read a flag by name
    pub fn flag(&self, name: &str) -> Option<Value> {
        self.flag_entries()
            .into_iter()
            .find(|(flag, _)| *flag == name)
            .map(|(_, value)| value)
    }

    /// Update a flag by name, returning the previous value
    ///
    /// Boolean flags take the truthiness of `value`; the note takes its display
    /// text. Returns `None` if `name` is not a flag.
    pub fn apply_flag(&mut self, name: &str, value: &Value) -> Option<Value> {
        let previous = self.flag(name)?;
        match name {
            NOTE => {
                self.note = match value {
                    Value::Str(s) => s.clone(),
                    other => other.to_string(),
                }
            }
            STRICT => self.strict = value.is_truthy(),
            RAISE_ON_UNKNOWN => self.raise_on_unknown = value.is_truthy(),
            VERBOSE => self.verbose = value.is_truthy(),
            CHECK_TYPE => self.check_type = value.is_truthy(),
            RAISE_ON_TYPE_MISMATCH => self.raise_on_type_mismatch = value.is_truthy(),
            _ => return None,
        }
        Some(previous)
    }

    /// One-line summary of the boolean flags
    pub fn summary(&self) -> String {
        format!(
            "{}: {}, {}: {}, {}: {}, {}: {}, {}: {}",
            STRICT,
            self.strict,
            RAISE_ON_UNKNOWN,
            self.raise_on_unknown,
            VERBOSE,
            self.verbose,
            CHECK_TYPE,
            self.check_type,
            RAISE_ON_TYPE_MISMATCH,
            self.raise_on_type_mismatch
        )
    }
}
