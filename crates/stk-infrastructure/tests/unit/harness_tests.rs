//! Tests for the per-test fixture

use std::rc::Rc;

use serde_json::{Value, json};
use stk_application::{Invokable, Locals, Registry, Scope};
use stk_domain::constants::ROOT_SCOPE;
use stk_domain::error::Error;
use stk_domain::value_objects::BodyMatcher;
use stk_infrastructure::{ConfigBuilder, TestBed};

#[test]
fn test_mocks_share_the_root_scope() {
    let mut bed = TestBed::new(Registry::new().snapshot()).unwrap();
    let root = bed.root_scope().unwrap();
    let backend = bed.http_backend().unwrap();
    let timeout = bed.timeout().unwrap();

    assert!(backend.root_scope().same_as(&root));
    assert_eq!(root.digest_ttl(), 10);
    assert_eq!(timeout.pending_count(), 0);
}

#[test]
fn test_configured_ttl_reaches_root_scope() {
    let config = ConfigBuilder::new().with_digest_ttl(3).build();
    let mut bed = TestBed::with_config(Registry::new().snapshot(), config).unwrap();
    assert_eq!(bed.root_scope().unwrap().digest_ttl(), 3);
    assert_eq!(bed.config().digest.ttl, 3);
}

#[test]
fn test_invalid_config_is_rejected() {
    let config = ConfigBuilder::new().with_digest_ttl(0).build();
    let result = TestBed::with_config(Registry::new().snapshot(), config);
    assert!(matches!(result, Err(Error::Configuration { .. })));
}

#[test]
fn test_overrides_are_per_test_bed() {
    let mut registry = Registry::new();
    registry.value("greeting", "Hey".to_string()).unwrap();
    let snapshot = registry.snapshot();

    let mut first = TestBed::new(snapshot.clone()).unwrap();
    first.override_value("greeting", "Good day".to_string()).unwrap();
    let mut second = TestBed::new(snapshot).unwrap();

    assert_eq!(*first.get::<String>("greeting").unwrap(), "Good day");
    assert_eq!(*second.get::<String>("greeting").unwrap(), "Hey");
}

#[test]
fn test_controller_gets_child_scope_as_local() {
    let mut bed = TestBed::new(Registry::new().snapshot()).unwrap();
    let child = bed.root_scope().unwrap().create_child();
    let controller = Invokable::new(["$scope", ROOT_SCOPE], |deps| {
        let scope = deps.get::<Scope>("$scope")?;
        let root = deps.get::<Scope>(ROOT_SCOPE)?;
        Ok(Rc::new(scope.parent().is_some_and(|p| p.same_as(&root))))
    });

    let result = bed
        .invoke(&controller, &Locals::new().with("$scope", child))
        .unwrap();
    assert!(*result.downcast::<bool>().unwrap());
}

#[test]
fn test_teardown_verifies_transport_and_destroys_tree() {
    let mut bed = TestBed::new(Registry::new().snapshot()).unwrap();
    let root = bed.root_scope().unwrap();
    let backend = bed.http_backend().unwrap();
    backend
        .expect("GET", "/people", BodyMatcher::Any)
        .respond(200, json!([]));
    root.create_child();

    let err = bed.teardown().unwrap_err();
    assert!(matches!(err, Error::UnsatisfiedExpectation { count: 1, .. }));
    assert!(root.is_destroyed());
    assert!(root.children().is_empty());
}

#[test]
fn test_clean_teardown() {
    let mut bed = TestBed::new(Registry::new().snapshot()).unwrap();
    let backend = bed.http_backend().unwrap();
    backend
        .expect("GET", "/people", BodyMatcher::Any)
        .respond(200, json!([]));
    let promise = backend.request("GET", "/people", None).unwrap();
    backend.flush().unwrap();

    assert_eq!(promise.value().map(|r| r.body), Some(Value::Array(vec![])));
    bed.teardown().unwrap();
}

#[test]
fn test_teardown_without_instantiated_mocks() {
    let bed = TestBed::new(Registry::new().snapshot()).unwrap();
    bed.teardown().unwrap();
}
