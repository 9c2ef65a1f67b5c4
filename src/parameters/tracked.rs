//! Owners of a parameter registry
//!
//! A type that keeps its parameters in a [`Parameters`] field implements
//! [`Tracked`] to get forwarding methods. An owner that needs its own validation
//! overrides [`Tracked::set_parameters`], runs its checks, and then hands the
//! pairs to [`Parameters::set`] to do the actual change and logging.

use crate::error::Result;
use crate::parameters::parameters::{Parameters, ShowOptions};
use crate::parameters::value::Value;

/// A type that owns a parameter registry
///
/// # Examples
///
/// ```
/// use param_track::parameters::{Parameters, TrackConfig, Tracked};
///
/// struct Receiver {
///     params: Parameters,
/// }
///
/// impl Tracked for Receiver {
///     fn parameters(&self) -> &Parameters {
///         &self.params
///     }
///
///     fn parameters_mut(&mut self) -> &mut Parameters {
///         &mut self.params
///     }
/// }
///
/// let mut rx = Receiver {
///     params: Parameters::initialized(TrackConfig::new("rx"), [("gain", 3)]),
/// };
/// rx.set_parameters([("gain", 5)]).unwrap();
/// assert_eq!(rx.parameter("gain").unwrap().as_i64(), Some(5));
/// ```
pub trait Tracked {
    fn parameters(&self) -> &Parameters;

    fn parameters_mut(&mut self) -> &mut Parameters;

    /// Set parameters; override to validate before delegating
    fn set_parameters<I, K, V>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.parameters_mut().set(pairs)
    }

    fn add_parameters<I, K, V>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        self.parameters_mut().add(pairs)
    }

    fn parameter(&self, name: &str) -> Result<&Value> {
        self.parameters().get(name)
    }

    fn show_parameters(&self) -> String {
        self.parameters().show(ShowOptions::default())
    }
}
