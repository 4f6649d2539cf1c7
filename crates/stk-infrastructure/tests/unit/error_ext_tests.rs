//! Error extension tests

use std::error::Error as _;
use std::io;

use stk_domain::error::Error;
use stk_infrastructure::ErrorContext;

fn failing_read() -> Result<String, io::Error> {
    Err(io::Error::new(io::ErrorKind::NotFound, "no such file"))
}

#[test]
fn test_context_wraps_foreign_error() {
    let err = failing_read().context("Failed to read stk.toml").unwrap_err();
    match &err {
        Error::Configuration { message, .. } => {
            assert_eq!(message, "Failed to read stk.toml: no such file");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.source().is_some());
}

#[test]
fn test_with_context_is_lazy() {
    let ok: Result<u8, io::Error> = Ok(1);
    let value = ok
        .with_context(|| -> String { panic!("context built for a success") })
        .unwrap();
    assert_eq!(value, 1);

    let err = failing_read()
        .with_context(|| format!("Failed to read {}", "custom.toml"))
        .unwrap_err();
    assert!(err.to_string().contains("custom.toml"));
}
