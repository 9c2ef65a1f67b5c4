//! Integration tests for parameter files
//!
//! These tests write registries to disk and read them back through every format.

use crate::test_helpers::{observation, temp_file};
use approx::assert_relative_eq;
use param_track::format::{ReadOptions, SerializationError};
use param_track::parameters::{ExportOptions, OpKind, Parameters, TrackConfig, Value};
use param_track::ParamTrackError;

fn round_trip(extension: &str) -> (Parameters, Parameters) {
    let original = observation();
    let (_dir, path) = temp_file(extension);

    original.to_file(&path, &ExportOptions::default()).unwrap();
    let restored =
        Parameters::load(&path, &ReadOptions::default(), TrackConfig::new("Observation")).unwrap();
    (original, restored)
}

#[test]
fn test_json_round_trip_is_exact() {
    let (original, restored) = round_trip("json");
    assert_eq!(restored.to_dict(true, false), original.to_dict(true, false));
    assert_eq!(restored.names(), original.names());
}

#[cfg(feature = "yaml")]
#[test]
fn test_yaml_round_trip_is_exact() {
    let (original, restored) = round_trip("yaml");
    assert_eq!(restored.to_dict(true, false), original.to_dict(true, false));

    let (original, restored) = round_trip("yml");
    assert_eq!(restored.to_dict(false, false), original.to_dict(false, false));
}

#[cfg(feature = "csv")]
#[test]
fn test_csv_round_trip_values() {
    let (original, restored) = round_trip("csv");
    assert_eq!(restored.to_dict(false, false), original.to_dict(false, false));
    assert_relative_eq!(restored.get("exposure").unwrap().as_f64().unwrap(), 12.5);
}

#[cfg(feature = "csv")]
#[test]
fn test_csv_coerces_numeric_looking_strings() {
    let mut original = Parameters::with_config(TrackConfig::default());
    original
        .add([("serial", Value::from("42")), ("flag", Value::from("true"))])
        .unwrap();
    let (_dir, path) = temp_file("csv");
    original.to_file(&path, &ExportOptions::default()).unwrap();

    let restored = Parameters::load(&path, &ReadOptions::default(), TrackConfig::default()).unwrap();

    // Types are not preserved, but the values still match as text
    assert_eq!(restored.get("serial").unwrap(), &Value::from(42));
    assert_eq!(restored.get("flag").unwrap(), &Value::from(true));
    for name in ["serial", "flag"] {
        assert_eq!(
            restored.get(name).unwrap().to_string(),
            original.get(name).unwrap().to_string()
        );
    }
}

#[cfg(feature = "csv")]
#[test]
fn test_csv_row_layout() {
    let original = observation();
    let (_dir, path) = temp_file("csv");
    let options = ExportOptions {
        csv_as_row: true,
        ..Default::default()
    };
    original.to_file(&path, &options).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("source,exposure,channels,"));

    let restored = Parameters::load(
        &path,
        &ReadOptions::default().csv_row(1),
        TrackConfig::new("Observation"),
    )
    .unwrap();
    assert_eq!(restored.to_dict(false, false), original.to_dict(false, false));
}

#[test]
fn test_types_and_units_round_trip() {
    let mut original = observation();
    original.set_unit("exposure", "s").unwrap();
    let (_dir, path) = temp_file("json");
    let options = ExportOptions {
        include_types: true,
        ..Default::default()
    };
    original.to_file(&path, &options).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"type\": \"float\""));
    assert!(text.contains("\"unit\": \"s\""));

    let restored =
        Parameters::load(&path, &ReadOptions::default(), TrackConfig::new("Observation")).unwrap();
    assert_eq!(restored.to_dict(false, false), original.to_dict(false, false));
    assert_eq!(restored.unit("exposure"), Some("s"));
    assert_eq!(restored.unit("source"), None);
}

#[test]
fn test_map_with_value_key_round_trips() {
    let mut fit = indexmap::IndexMap::new();
    fit.insert("value".to_string(), Value::from(3));
    fit.insert("label".to_string(), Value::from("peak"));
    let mut shadow = indexmap::IndexMap::new();
    shadow.insert("__external__".to_string(), Value::from(true));
    shadow.insert("unit".to_string(), Value::from("K"));

    let original = Parameters::initialized(
        TrackConfig::new("Fit"),
        [("fit", Value::Map(fit)), ("shadow", Value::Map(shadow))],
    );

    for extension in ["json", "yaml", "csv"] {
        if (extension == "yaml" && !cfg!(feature = "yaml"))
            || (extension == "csv" && !cfg!(feature = "csv"))
        {
            continue;
        }
        let (_dir, path) = temp_file(extension);
        original.to_file(&path, &ExportOptions::default()).unwrap();

        let restored = Parameters::load(&path, &ReadOptions::default(), TrackConfig::new("Fit")).unwrap();
        assert_eq!(
            restored.to_dict(false, false),
            original.to_dict(false, false),
            "{} round trip",
            extension
        );
        assert_eq!(restored.unit("shadow"), None);
    }
}

#[test]
fn test_non_finite_float_is_rejected_by_json() {
    let params = Parameters::initialized(TrackConfig::default(), [("x", f64::NAN)]);
    let (_dir, path) = temp_file("json");

    match params.to_file(&path, &ExportOptions::default()) {
        Err(ParamTrackError::Serialization {
            source: SerializationError::NonFiniteFloat(name),
            ..
        }) => assert_eq!(name, "x"),
        other => panic!("Expected NonFiniteFloat, got {:?}", other),
    }
    assert!(!path.exists());
}

#[test]
fn test_include_filter() {
    let original = observation();
    let (_dir, path) = temp_file("json");
    let options = ExportOptions {
        include: Some(vec!["source".to_string(), "channels".to_string()]),
        ..Default::default()
    };
    original.to_file(&path, &options).unwrap();

    let restored = Parameters::load(&path, &ReadOptions::default(), TrackConfig::default()).unwrap();
    assert_eq!(restored.names(), vec!["source", "channels"]);
}

#[test]
fn test_from_file_ignores_internal_flags() {
    let config = TrackConfig::new("Written").strict(true);
    let written = Parameters::initialized(config, [("gain", 3)]);
    let (_dir, path) = temp_file("json");
    let options = ExportOptions {
        include_internal: true,
        ..Default::default()
    };
    written.to_file(&path, &options).unwrap();

    let mut params = Parameters::initialized(TrackConfig::default(), [("gain", 1)]);
    params.from_file(&path, &ReadOptions::default()).unwrap();

    assert_eq!(params.get("gain").unwrap(), &Value::from(3));
    assert!(!params.config().strict);
    assert_eq!(params.note(), "Parameter tracking");
    assert!(!params.contains("ptstrict"));

    let warnings = params
        .log()
        .entries()
        .iter()
        .filter(|e| e.kind == OpKind::Warning)
        .count();
    assert_eq!(warnings, 6);
}

#[test]
fn test_from_file_respects_strict_mode() {
    let (_dir, path) = temp_file("json");
    std::fs::write(&path, r#"{"gain": 5, "offset": 0.1}"#).unwrap();

    let config = TrackConfig::default().strict(true).raise_on_unknown(true);
    let mut params = Parameters::initialized(config, [("gain", 1)]);

    match params.from_file(&path, &ReadOptions::default()) {
        Err(ParamTrackError::UnknownInStrictMode { name }) => assert_eq!(name, "offset"),
        other => panic!("Expected UnknownInStrictMode, got {:?}", other),
    }
    assert_eq!(params.get("gain").unwrap(), &Value::from(5));
    assert!(!params.contains("offset"));
}

#[test]
fn test_from_file_with_key_and_expanded_entries() {
    let (_dir, path) = temp_file("json");
    std::fs::write(
        &path,
        r#"{
            "receiver": {
                "gain": {"value": 3, "unit": "dB"},
                "lo": {"unit": ["MHz", 1]},
                "secret": {"__external__": true, "value": 1},
                "band": "L"
            },
            "other": {"gain": 100}
        }"#,
    )
    .unwrap();

    let mut params = Parameters::with_config(TrackConfig::default());
    params
        .from_file(&path, &ReadOptions::default().use_key("receiver"))
        .unwrap();

    assert_eq!(params.names(), vec!["gain", "lo", "band"]);
    assert_eq!(params.get("gain").unwrap(), &Value::from(3));
    assert_eq!(params.unit("gain"), Some("dB"));
    assert!(params.get("lo").unwrap().is_null());
    assert_eq!(params.unit("lo"), Some("[MHz]"));

    let missing = params.from_file(&path, &ReadOptions::default().use_key("absent"));
    match missing {
        Err(ParamTrackError::Serialization {
            source: SerializationError::MissingKey(key),
            ..
        }) => assert_eq!(key, "absent"),
        other => panic!("Expected MissingKey, got {:?}", other),
    }
}

#[test]
fn test_unsupported_extension() {
    let params = observation();
    let (_dir, path) = temp_file("npz");

    match params.to_file(&path, &ExportOptions::default()) {
        Err(ParamTrackError::Serialization { path: failed, source }) => {
            assert_eq!(failed, path);
            assert!(matches!(source, SerializationError::UnsupportedFormat(_)));
        }
        other => panic!("Expected Serialization error, got {:?}", other),
    }
    assert!(!path.exists());
}

#[test]
fn test_missing_file_reports_path() {
    let (_dir, path) = temp_file("json");
    let mut params = Parameters::new();

    let err = params.from_file(&path, &ReadOptions::default()).unwrap_err();
    assert!(err.to_string().contains("params.json"));
    assert!(matches!(
        err,
        ParamTrackError::Serialization {
            source: SerializationError::IoError(_),
            ..
        }
    ));
}

#[test]
fn test_document_must_be_a_mapping() {
    let (_dir, path) = temp_file("json");
    std::fs::write(&path, "[1, 2, 3]").unwrap();

    let err = Parameters::load(&path, &ReadOptions::default(), TrackConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        ParamTrackError::Serialization {
            source: SerializationError::NotAMapping(_),
            ..
        }
    ));
}
