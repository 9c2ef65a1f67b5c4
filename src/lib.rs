//! # param-track
//!
//! `param-track` keeps track of a named group of parameters on behalf of an
//! owning object: small scientific or configuration-style types that want loose,
//! chatty attribute management without building a schema.
//!
//! The library provides:
//! - A parameter registry with strict mode, type tracking and a change log
//! - Silent updates for trusted writes and for changing the mode flags
//! - Log queries by name, operation and loosely written times
//! - Snapshots to and from CSV, JSON and YAML files
//!
//! ## Basic Usage
//!
//! ```
//! use param_track::parameters::{Parameters, TrackConfig};
//! use param_track::ParamTrackError;
//!
//! let config = TrackConfig::new("cfg").strict(true).raise_on_unknown(true);
//! let mut params = Parameters::initialized(config, [("a", 1)]);
//!
//! params.set([("a", 2)]).unwrap();
//! assert!(matches!(
//!     params.set([("b", 3)]),
//!     Err(ParamTrackError::UnknownInStrictMode { .. })
//! ));
//! params.add([("b", 3)]).unwrap();
//!
//! println!("{}", params);
//! ```

// Public modules
pub mod error;

// Parameter system
pub mod parameters;

// File formats
pub mod format;

// Re-exports for convenience
pub use error::{ParamTrackError, Result};
pub use parameters::{Parameters, TrackConfig, Tracked, Value};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
