//! # Parameter System
//!
//! This module provides a small registry for keeping track of a named group of
//! parameters inside an owning object, in the spirit of loose, chatty
//! configuration classes used in scientific code.
//!
//! ## Key Features
//!
//! - **Named Parameters**: Values of any [`Value`] shape, kept in insertion order
//! - **Strict Mode**: Refuse (or warn about) names that were never introduced
//! - **Type Tracking**: Record each parameter's [`TypeTag`] and check later sets
//!   against it, with a pluggable [`TypeCheck`]
//! - **Change Log**: Every mutation is logged and can be queried by name, kind
//!   or time
//! - **Serialization Support**: Snapshot to and restore from CSV, JSON and YAML
//!   files (see [`crate::format`])
//!
//! ## Mutation Entry Points
//!
//! - [`Parameters::initialize`]: set the mode flags and seed the parameters
//! - [`Parameters::set`]: change parameters, subject to strict and type checks
//! - [`Parameters::add`]: introduce parameters even in strict mode
//! - [`Parameters::silent_update`]: unchecked writes, also the only way to
//!   change the mode flags after initialization
//! - [`Parameters::delete`]: remove parameters
//!
//! ## Example Usage
//!
//! ```rust
//! use param_track::parameters::{LogFilter, OpKind, Parameters, TrackConfig, Value};
//!
//! let config = TrackConfig::new("Receiver").check_type(true);
//! let mut params = Parameters::initialized(config, [("gain", 3)]);
//!
//! // A type change is warned about and applied
//! params.set([("gain", "high")]).unwrap();
//! assert_eq!(params.get("gain").unwrap(), &Value::from("high"));
//!
//! let warnings = params.log_query(&LogFilter::new().kind(OpKind::Warning));
//! assert_eq!(warnings.len(), 1);
//!
//! // Loosen or tighten the mode flags through the silent path
//! params.silent_update([("ptstrict", true)]);
//! assert!(params.config().strict);
//! ```

pub mod config;
pub mod log;
pub mod parameters;
pub mod timespec;
pub mod tracked;
pub mod typecheck;
pub mod value;


// Re-export key types
pub use config::TrackConfig;
pub use log::{ChangeLog, LogEntry, LogFilter, OpKind};
pub use parameters::{ExportOptions, Parameters, ShowOptions, TrackState};
pub use timespec::{parse_time_spec, TimeSpecError};
pub use tracked::Tracked;
pub use typecheck::{TagCheck, TypeCheck};
pub use value::{TypeTag, Value};
