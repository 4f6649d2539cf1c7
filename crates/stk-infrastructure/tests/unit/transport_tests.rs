//! Tests for request matching, flushing and verification

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{Value, json};
use stk_application::{PromiseState, Scope};
use stk_domain::error::Error;
use stk_domain::value_objects::{BodyMatcher, Response, UrlMatcher};
use stk_infrastructure::MockTransport;

fn transport() -> (Scope, MockTransport) {
    let root = Scope::new_root(10);
    let backend = MockTransport::new(root.clone());
    (root, backend)
}

#[test]
fn test_expected_request_resolves_on_flush() {
    let (_root, backend) = transport();
    backend
        .expect("POST", "/people", json!({"name": "Ben"}))
        .respond(201, json!({"id": 1}));

    let promise = backend
        .request("POST", "/people", Some(json!({"name": "Ben"})))
        .unwrap();
    assert!(promise.is_pending());

    backend.flush().unwrap();
    assert_eq!(promise.value().map(|r| r.body), Some(json!({"id": 1})));
    backend.verify_no_outstanding_expectation().unwrap();
    backend.verify_no_outstanding_request().unwrap();
}

#[test]
fn test_non_success_status_rejects() {
    let (_root, backend) = transport();
    backend
        .expect("GET", "/people/9", BodyMatcher::Any)
        .respond(404, json!({"error": "missing"}));

    let promise = backend.request("GET", "/people/9", None).unwrap();
    backend.flush().unwrap();

    match promise.state() {
        PromiseState::Rejected(response) => assert_eq!(response.status, 404),
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[test]
fn test_mismatching_request_names_expectation() {
    let (_root, backend) = transport();
    backend
        .expect("POST", "/people", BodyMatcher::Any)
        .respond(201, json!(null));

    let err = backend.request("GET", "/other", None).unwrap_err();
    match err {
        Error::UnexpectedRequest { method, url, detail } => {
            assert_eq!(method, "GET");
            assert_eq!(url, "/other");
            assert_eq!(detail, ", expected POST /people");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(backend.expectation_count(), 1);
}

#[test]
fn test_request_without_rules_is_unexpected() {
    let (_root, backend) = transport();
    let err = backend.request("GET", "/other", None).unwrap_err();
    assert_eq!(err.to_string(), "Unexpected request: GET /other");
}

#[test]
fn test_expectations_are_consumed_in_order() {
    let (_root, backend) = transport();
    backend.expect("GET", "/a", BodyMatcher::Any).respond(200, json!("a"));
    backend.expect("GET", "/b", BodyMatcher::Any).respond(200, json!("b"));

    assert!(backend.request("GET", "/b", None).is_err());
    let a = backend.request("GET", "/a", None).unwrap();
    let b = backend.request("GET", "/b", None).unwrap();
    backend.flush().unwrap();

    assert_eq!(a.value().unwrap().body, json!("a"));
    assert_eq!(b.value().unwrap().body, json!("b"));
}

#[test]
fn test_expectation_body_must_match() {
    let (_root, backend) = transport();
    backend
        .expect("POST", "/people", json!({"name": "Ben"}))
        .respond(201, json!(null));

    let err = backend
        .request("POST", "/people", Some(json!({"name": "Nigel"})))
        .unwrap_err();
    assert!(err.to_string().contains(r#"with body {"name":"Ben"}"#));
}

#[test]
fn test_definitions_are_reusable_fallbacks() {
    let (_root, backend) = transport();
    backend
        .when("GET", UrlMatcher::pattern(r"^/people/\d+$").unwrap(), BodyMatcher::Any)
        .respond(200, json!({"name": "Ben"}));

    let first = backend.request("GET", "/people/1", None).unwrap();
    let second = backend.request("GET", "/people/2", None).unwrap();
    backend.flush().unwrap();

    assert!(first.value().is_some());
    assert!(second.value().is_some());
    backend.verify_no_outstanding_expectation().unwrap();
}

#[test]
fn test_expectation_head_wins_over_definitions() {
    let (_root, backend) = transport();
    backend.when("GET", "/config", BodyMatcher::Any).respond(200, json!({}));
    backend.expect("POST", "/people", BodyMatcher::Any).respond(201, json!(null));

    assert!(matches!(
        backend.request("GET", "/config", None),
        Err(Error::UnexpectedRequest { .. })
    ));
    backend.request("POST", "/people", None).unwrap();
    backend.request("GET", "/config", None).unwrap();
    assert_eq!(backend.pending_count(), 2);
}

#[test]
fn test_flush_without_pending_requests_fails() {
    let (_root, backend) = transport();
    assert!(matches!(backend.flush(), Err(Error::NoPendingRequests)));
}

#[test]
fn test_flush_count_releases_exactly_n() {
    let (_root, backend) = transport();
    backend.when("GET", "/tick", BodyMatcher::Any).respond(200, json!(1));
    let first = backend.request("GET", "/tick", None).unwrap();
    let second = backend.request("GET", "/tick", None).unwrap();

    backend.flush_count(1).unwrap();
    assert!(!first.is_pending());
    assert!(second.is_pending());
    assert!(matches!(
        backend.flush_count(2),
        Err(Error::NoPendingRequests)
    ));
    assert!(!second.is_pending());
}

#[test]
fn test_flush_digests_root_scope_once() {
    let (root, backend) = transport();
    backend.expect("GET", "/people", BodyMatcher::Any).respond(200, json!(["Ben"]));
    let people = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&people);
    root.watch(
        "people",
        |scope| scope.get("people").unwrap_or(Value::Null),
        move |new, _, _| seen.borrow_mut().push(new.clone()),
    );

    let promise = backend.request("GET", "/people", None).unwrap();
    let target = root.clone();
    promise.on_fulfilled(move |response| target.set("people", response.body.clone()));

    let report = backend.flush().unwrap();
    assert_eq!(report.listener_calls, 1);
    assert_eq!(*people.borrow(), vec![json!(["Ben"])]);
}

#[test]
fn test_flush_releases_requests_issued_by_continuations() {
    let (_root, backend) = transport();
    backend.when("GET", "/a", BodyMatcher::Any).respond(200, json!("a"));
    backend.when("GET", "/b", BodyMatcher::Any).respond(200, json!("b"));
    let chained = Rc::new(RefCell::new(None));

    let slot = Rc::clone(&chained);
    let follow_up = backend.clone();
    backend
        .request("GET", "/a", None)
        .unwrap()
        .on_fulfilled(move |_| {
            *slot.borrow_mut() = follow_up.request("GET", "/b", None).ok();
        });

    backend.flush().unwrap();
    let chained = chained.borrow();
    assert_eq!(
        chained.as_ref().and_then(|p| p.value()).map(|r| r.body),
        Some(json!("b"))
    );
    assert_eq!(backend.pending_count(), 0);
}

#[test]
fn test_verification_reports_outstanding_work() {
    let (_root, backend) = transport();
    backend.expect("GET", "/a", BodyMatcher::Any).respond(200, json!(null));
    backend.expect("GET", "/b", BodyMatcher::Any).respond(200, json!(null));
    backend.request("GET", "/a", None).unwrap();

    match backend.verify_no_outstanding_expectation().unwrap_err() {
        Error::UnsatisfiedExpectation { count, remaining } => {
            assert_eq!(count, 1);
            assert_eq!(remaining, "GET /b");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(matches!(
        backend.verify_no_outstanding_request(),
        Err(Error::OutstandingRequest { count: 1 })
    ));

    backend.reset_expectations();
    backend.verify_no_outstanding_expectation().unwrap();
    backend.verify_no_outstanding_request().unwrap();
}

#[test]
fn test_response_headers_are_delivered() {
    let (_root, backend) = transport();
    backend
        .expect("POST", "/people", BodyMatcher::Any)
        .respond_with(Response::new(201, json!(null)).with_header("Location", "/people/3"));

    let promise = backend.request("post", "/people", None).unwrap();
    backend.flush().unwrap();
    let response = promise.value().unwrap();
    assert_eq!(response.headers["Location"], "/people/3");
}

#[test]
fn test_body_predicate_may_inspect_backend() {
    let root = Scope::new_root(10);
    let backend = Rc::new(MockTransport::new(root));
    let weak = Rc::downgrade(&backend);
    backend
        .expect(
            "POST",
            "/people",
            BodyMatcher::predicate(move |_| {
                weak.upgrade()
                    .is_some_and(|b| b.pending_count() == 0 && b.expectation_count() == 1)
            }),
        )
        .respond(201, json!({"id": 1}));

    let promise = backend
        .request("POST", "/people", Some(json!({"name": "Ben"})))
        .unwrap();
    assert_eq!(backend.pending_count(), 1);
    assert_eq!(backend.expectation_count(), 0);

    backend.flush().unwrap();
    assert_eq!(promise.value().map(|r| r.status), Some(201));
}

#[test]
fn test_definition_predicate_may_declare_rules() {
    let root = Scope::new_root(10);
    let backend = Rc::new(MockTransport::new(root));
    let weak = Rc::downgrade(&backend);
    backend
        .when(
            "PUT",
            "/people/1",
            BodyMatcher::predicate(move |_| {
                if let Some(b) = weak.upgrade() {
                    let _ = format!("{b:?}");
                    b.when("GET", "/people/1", BodyMatcher::Any)
                        .respond(200, json!({"id": 1}));
                }
                true
            }),
        )
        .respond(204, json!(null));

    backend
        .request("PUT", "/people/1", Some(json!({"name": "Ben"})))
        .unwrap();
    let fetched = backend.request("GET", "/people/1", None).unwrap();

    backend.flush().unwrap();
    assert_eq!(fetched.value().map(|r| r.body), Some(json!({"id": 1})));
}
