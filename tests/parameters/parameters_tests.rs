//! Integration tests for the Parameters registry
//!
//! These tests verify that the mutation protocol behaves correctly in various scenarios.

use crate::test_helpers::{at_level, capture_events, observation};
use param_track::parameters::{OpKind, Parameters, TrackConfig, TrackState, TypeTag, Value};
use param_track::ParamTrackError;
use tracing::Level;

#[test]
fn test_add_then_get_returns_value() {
    let names = ["gain", "Gain", "x1", "_hidden", "pt", "ptstrictly", "a.b", "with space"];
    let mut params = Parameters::with_config(TrackConfig::default().strict(true));

    for (i, name) in names.iter().enumerate() {
        params.add([(*name, i as i64)]).unwrap();
        assert_eq!(params.get(name).unwrap(), &Value::from(i as i64));
    }
    assert_eq!(params.len(), names.len());
}

#[test]
fn test_strict_raise_leaves_values_unchanged() {
    let config = TrackConfig::new("cfg").strict(true).raise_on_unknown(true);
    let mut params = Parameters::initialized(config, [("a", 1)]);
    let snapshot = params.to_dict(true, false);

    assert!(params.set([("b", 2)]).is_err());
    assert_eq!(params.to_dict(true, false), snapshot);
}

#[test]
fn test_strict_warn_leaves_values_unchanged() {
    let config = TrackConfig::new("cfg").strict(true);
    let mut params = Parameters::initialized(config, [("a", 1)]);
    let snapshot = params.to_dict(true, false);

    params.set([("b", 2)]).unwrap();
    assert_eq!(params.to_dict(true, false), snapshot);
}

#[test]
fn test_failed_set_never_removes_existing_parameter() {
    let config = TrackConfig::default()
        .check_type(true)
        .raise_on_type_mismatch(true);
    let mut params = Parameters::initialized(config, [("a", 1)]);

    assert!(params.set([("a", "one")]).is_err());
    assert!(params.set([("set", 1)]).is_err());
    assert_eq!(params.get("a").unwrap(), &Value::from(1));
    assert_eq!(params.type_of("a"), Some(TypeTag::Int));
}

#[test]
fn test_values_and_types_share_keys() {
    let mut params = observation();
    params.add([("extra", 1)]).unwrap();
    params.silent_update([("quiet", "yes")]);
    params.delete(["exposure"]);
    params.set([("channels", 2048.0)]).unwrap();

    for name in params.names() {
        assert!(params.type_of(&name).is_some(), "{} has no type tag", name);
    }
    assert_eq!(params.type_of("exposure"), None);
    assert_eq!(params.type_of("channels"), Some(TypeTag::Float));
}

#[test]
fn test_insertion_order_is_kept() {
    let mut params = Parameters::initialized(TrackConfig::default(), [("z", 1), ("a", 2)]);
    params.add([("m", 3)]).unwrap();
    params.set([("z", 10)]).unwrap();

    assert_eq!(params.names(), vec!["z", "a", "m"]);
    let shown = params.show(Default::default());
    let z = shown.find("  z <int>").unwrap();
    let a = shown.find("  a <int>").unwrap();
    let m = shown.find("  m <int>").unwrap();
    assert!(z < a && a < m);
}

#[test]
fn test_lifecycle_states() {
    let mut params = Parameters::new();
    assert_eq!(params.state(), TrackState::Unlocked);

    params.initialize(
        TrackConfig::default().strict(true),
        ["a"],
        Vec::<(String, Value)>::new(),
    );
    assert_eq!(params.state(), TrackState::Active);
    assert!(params.get("a").unwrap().is_null());
}

#[test]
fn test_strict_cannot_be_loosened_by_parameter_traffic() {
    let config = TrackConfig::default().strict(true).raise_on_unknown(true);
    let mut params = Parameters::with_config(config);

    for name in ["ptstrict", "pterr", "ptnote"] {
        assert!(matches!(
            params.set([(name, Value::from(false))]),
            Err(ParamTrackError::ReservedName { .. })
        ));
        assert!(matches!(
            params.add([(name, Value::from(false))]),
            Err(ParamTrackError::ReservedName { .. })
        ));
    }
    assert!(params.config().strict);
    assert!(params.config().raise_on_unknown);
}

#[test]
fn test_log_records_each_mutation_kind() {
    let mut params = Parameters::initialized(TrackConfig::default(), [("a", 1)]);
    params.set([("a", 2)]).unwrap();
    params.add([("b", 3)]).unwrap();
    params.silent_update([("c", 4)]);
    params.delete(["a"]);

    let kinds: Vec<OpKind> = params
        .log()
        .entries()
        .iter()
        .filter(|e| e.kind != OpKind::SilentUpdate || e.name == "c")
        .map(|e| e.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![OpKind::Init, OpKind::Set, OpKind::Add, OpKind::SilentUpdate, OpKind::Delete]
    );

    let set = &params.log().entries()[params.log().len() - 4];
    assert_eq!(set.kind, OpKind::Set);
    assert_eq!(set.old, Some(Value::from(1)));
    assert_eq!(set.new, Some(Value::from(2)));
}

#[test]
fn test_verbose_set_emits_one_info_line() {
    let config = TrackConfig::default().verbose(true);
    let mut params = Parameters::initialized(config, [("a", 1)]);

    let events = capture_events(|| params.set([("a", 2)]).unwrap());
    let info = at_level(&events, Level::INFO);
    assert_eq!(info.len(), 1);
    assert_eq!(
        info[0].message,
        "Resetting parameter 'a' as <int>:  2     [previous value <int>: 1]"
    );

    let last = params.log().last().unwrap();
    assert_eq!(last.kind, OpKind::Set);
    assert_eq!(last.detail, info[0].message);

    let events = capture_events(|| params.add([("b", 3)]).unwrap());
    let info = at_level(&events, Level::INFO);
    assert_eq!(info.len(), 1);
    assert!(info[0].message.starts_with("Adding parameter 'b'"));
}

#[test]
fn test_quiet_set_emits_no_info_line() {
    let mut params = Parameters::initialized(TrackConfig::default(), [("a", 1)]);

    let events = capture_events(|| {
        params.set([("a", 2)]).unwrap();
        params.add([("b", 3)]).unwrap();
    });
    assert!(at_level(&events, Level::INFO).is_empty());
    assert_eq!(params.log().last().unwrap().kind, OpKind::Add);
}

#[test]
fn test_silent_update_emits_nothing_even_when_verbose() {
    let config = TrackConfig::default().verbose(true);
    let mut params = Parameters::initialized(config, [("a", 1)]);

    let events = capture_events(|| {
        params.silent_update([("a", 5), ("c", 6)]);
        params.silent_update([("ptstrict", true)]);
    });
    assert!(events.is_empty(), "unexpected events: {:?}", events);
    assert_eq!(params.get("a").unwrap(), &Value::from(5));
    assert!(params.config().strict);
}

#[test]
fn test_type_mismatch_warning_is_emitted() {
    let config = TrackConfig::default().check_type(true);
    let mut params = Parameters::initialized(config, [("a", 1)]);

    let events = capture_events(|| params.set([("a", "one")]).unwrap());
    let warn = at_level(&events, Level::WARN);
    assert_eq!(warn.len(), 1);
    assert_eq!(
        warn[0].message,
        "Parameter types don't match for 'a': <old: int> vs <new: str> -- resetting to <str>."
    );
    assert!(at_level(&events, Level::INFO).is_empty());
    assert_eq!(params.type_of("a"), Some(TypeTag::Str));
}

#[test]
fn test_strict_skip_warning_is_emitted() {
    let config = TrackConfig::default().strict(true);
    let mut params = Parameters::initialized(config, [("a", 1)]);

    let events = capture_events(|| params.set([("b", 2)]).unwrap());
    let warn = at_level(&events, Level::WARN);
    assert_eq!(warn.len(), 1);
    assert!(warn[0].message.starts_with("Unknown parameter 'b' in strict mode"));
}

#[test]
fn test_display_matches_show() {
    let params = observation();
    let rendered = format!("{}", params);
    assert!(rendered.starts_with("Parameter Tracking: Observation\n"));
    assert!(rendered.contains("  source <str> : Cas A"));
    assert!(rendered.contains("  taps <list> : [0.25, 0.5, 0.25]"));
    assert!(rendered.contains("  settings <map> : {mode: \"drift\", dwell: 30}"));
    assert!(rendered.contains("  backend <null> : null"));
}
