use crate::format::SerializationError;
use crate::parameters::value::TypeTag;
use std::path::PathBuf;
use thiserror::Error;

/// Error types for the param-track library.
#[derive(Error, Debug)]
pub enum ParamTrackError {
    /// Attempt to use an internal flag or entry-point name as a parameter.
    #[error("'{name}' is reserved for internal use and cannot be a parameter name")]
    ReservedName { name: String },

    /// A name that is not yet tracked was set while strict mode raises on unknown names.
    #[error("Unknown parameter '{name}' in strict mode")]
    UnknownInStrictMode { name: String },

    /// A new value's type does not match the recorded type and mismatches raise.
    #[error("Parameter types don't match for '{name}': <old: {old}> vs <new: {new}>")]
    TypeMismatch {
        name: String,
        old: TypeTag,
        new: TypeTag,
    },

    /// Parameter not found.
    #[error("Parameter not found: {name}")]
    ParameterNotFound { name: String },

    /// Codec failure while reading or writing a parameter file.
    #[error("Serialization failed for '{}': {source}", .path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: SerializationError,
    },

    /// Several pairs of one bulk call failed; the remaining pairs were applied.
    #[error("{} parameters failed: {}", .0.len(), join_messages(.0))]
    Multiple(Vec<ParamTrackError>),
}

fn join_messages(errors: &[ParamTrackError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ParamTrackError {
    /// Fold the failures of a best-effort bulk call into a single result
    pub fn collect(mut errors: Vec<ParamTrackError>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(ParamTrackError::Multiple(errors)),
        }
    }

    /// The individual failures, flattening `Multiple`
    pub fn failures(&self) -> Vec<&ParamTrackError> {
        match self {
            ParamTrackError::Multiple(errors) => errors.iter().flat_map(|e| e.failures()).collect(),
            other => vec![other],
        }
    }
}

/// Result type alias for param-track operations.
pub type Result<T> = std::result::Result<T, ParamTrackError>;
