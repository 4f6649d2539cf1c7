//! Unit tests for request matchers

use serde_json::json;
use stk_domain::Error;
use stk_domain::value_objects::{BodyMatcher, UrlMatcher};

#[test]
fn test_exact_url_matcher() {
    let matcher = UrlMatcher::from("/people");
    assert!(matcher.matches("/people"));
    assert!(!matcher.matches("/people/1"));
    assert_eq!(matcher.to_string(), "/people");
}

#[test]
fn test_pattern_url_matcher_is_unanchored() {
    let matcher = UrlMatcher::pattern(r"people/\d+").unwrap();
    assert!(matcher.matches("/api/people/42"));
    assert!(!matcher.matches("/api/people/me"));
    assert_eq!(matcher.to_string(), r"/people/\d+/");
}

#[test]
fn test_invalid_pattern_is_configuration_error() {
    let error = UrlMatcher::pattern("(").unwrap_err();
    assert!(matches!(error, Error::Configuration { .. }));
}

#[test]
fn test_any_body_matches_everything() {
    let matcher = BodyMatcher::default();
    assert!(matcher.matches(None));
    assert!(matcher.matches(Some(&json!({"x": 1}))));
    assert_eq!(matcher.to_string(), "");
}

#[test]
fn test_json_body_is_structural() {
    let matcher = BodyMatcher::from(json!({"name": "Ben", "tags": [1, 2]}));
    assert!(matcher.matches(Some(&json!({"tags": [1, 2], "name": "Ben"}))));
    assert!(!matcher.matches(Some(&json!({"name": "Ben"}))));
    assert!(!matcher.matches(None));
}

#[test]
fn test_null_body_matches_missing_body() {
    let matcher = BodyMatcher::from(json!(null));
    assert!(matcher.matches(None));
}

#[test]
fn test_predicate_body() {
    let matcher = BodyMatcher::predicate(|body| body.get("name").is_some());
    assert!(matcher.matches(Some(&json!({"name": "Nigel"}))));
    assert!(!matcher.matches(None));
    assert_eq!(format!("{matcher:?}"), "Predicate(..)");
}

#[test]
fn test_optional_body_conversion() {
    assert!(matches!(BodyMatcher::from(None::<serde_json::Value>), BodyMatcher::Any));
    assert!(matches!(
        BodyMatcher::from(Some(json!(1))),
        BodyMatcher::Json(_)
    ));
}
