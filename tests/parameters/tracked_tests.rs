//! Integration tests for owners of a registry
//!
//! An owner overrides `set_parameters` to run its own checks before delegating.

use param_track::parameters::{Parameters, TrackConfig, Tracked, Value};
use param_track::{ParamTrackError, Result};

struct Telescope {
    params: Parameters,
    rejected: Vec<String>,
}

impl Telescope {
    fn new() -> Self {
        let config = TrackConfig::new("Telescope").strict(true).raise_on_unknown(true);
        Self {
            params: Parameters::initialized(
                config,
                [("elevation", Value::from(45.0)), ("azimuth", Value::from(180.0))],
            ),
            rejected: Vec::new(),
        }
    }
}

impl Tracked for Telescope {
    fn parameters(&self) -> &Parameters {
        &self.params
    }

    fn parameters_mut(&mut self) -> &mut Parameters {
        &mut self.params
    }

    fn set_parameters<I, K, V>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut accepted = Vec::new();
        for (name, value) in pairs {
            let name = name.into();
            let value = value.into();
            // Elevation must stay above the horizon
            if name == "elevation" && value.as_f64().map_or(true, |el| !(0.0..=90.0).contains(&el)) {
                self.rejected.push(name);
                continue;
            }
            accepted.push((name, value));
        }
        self.parameters_mut().set(accepted)
    }
}

#[test]
fn test_override_validates_before_delegating() {
    let mut scope = Telescope::new();

    scope.set_parameters([("elevation", -5.0)]).unwrap();
    assert_eq!(scope.parameter("elevation").unwrap(), &Value::from(45.0));
    assert_eq!(scope.rejected, vec!["elevation"]);

    scope.set_parameters([("elevation", 60.0), ("azimuth", 90.0)]).unwrap();
    assert_eq!(scope.parameter("elevation").unwrap(), &Value::from(60.0));
    assert_eq!(scope.parameter("azimuth").unwrap(), &Value::from(90.0));
}

#[test]
fn test_override_keeps_registry_policy() {
    let mut scope = Telescope::new();

    assert!(matches!(
        scope.set_parameters([("focus", 1.0)]),
        Err(ParamTrackError::UnknownInStrictMode { .. })
    ));

    scope.add_parameters([("focus", 1.0)]).unwrap();
    scope.set_parameters([("focus", 2.0)]).unwrap();
    assert_eq!(scope.parameter("focus").unwrap(), &Value::from(2.0));
}

#[test]
fn test_show_parameters_forwards() {
    let scope = Telescope::new();
    let shown = scope.show_parameters();
    assert!(shown.starts_with("Parameter Tracking: Telescope"));
    assert!(shown.contains("  elevation <float> : 45.0"));
}
