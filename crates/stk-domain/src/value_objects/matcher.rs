//! Request matchers
//!
//! URLs match exactly or by regular expression; bodies match structurally
//! (JSON equality), by predicate, or not at all.

use crate::error::{Error, Result};
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// Matches the URL of an incoming request
#[derive(Debug, Clone)]
pub enum UrlMatcher {
    /// Byte-for-byte equality
    Exact(String),
    /// Unanchored regular expression search
    Pattern(Regex),
}

impl UrlMatcher {
    /// Compile a regular expression matcher
    pub fn pattern(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|e| {
                Error::configuration_with_source(format!("Invalid URL pattern '{pattern}'"), e)
            })
    }

    /// Whether `url` satisfies this matcher
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(expected) => expected == url,
            Self::Pattern(regex) => regex.is_match(url),
        }
    }
}

impl From<&str> for UrlMatcher {
    fn from(url: &str) -> Self {
        Self::Exact(url.to_string())
    }
}

impl From<String> for UrlMatcher {
    fn from(url: String) -> Self {
        Self::Exact(url)
    }
}

impl From<Regex> for UrlMatcher {
    fn from(regex: Regex) -> Self {
        Self::Pattern(regex)
    }
}

impl fmt::Display for UrlMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(url) => f.write_str(url),
            Self::Pattern(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

/// Matches the body of an incoming request
#[derive(Clone, Default)]
pub enum BodyMatcher {
    /// Any body, including none
    #[default]
    Any,
    /// Structural equality; a missing body compares as `null`
    Json(Value),
    /// Custom predicate over the body (`null` when missing)
    Predicate(Rc<dyn Fn(&Value) -> bool>),
}

impl BodyMatcher {
    /// Build a predicate matcher
    pub fn predicate(f: impl Fn(&Value) -> bool + 'static) -> Self {
        Self::Predicate(Rc::new(f))
    }

    /// Whether `body` satisfies this matcher
    pub fn matches(&self, body: Option<&Value>) -> bool {
        let body = body.unwrap_or(&Value::Null);
        match self {
            Self::Any => true,
            Self::Json(expected) => expected == body,
            Self::Predicate(f) => f(body),
        }
    }
}

impl From<Value> for BodyMatcher {
    fn from(body: Value) -> Self {
        Self::Json(body)
    }
}

impl From<Option<Value>> for BodyMatcher {
    fn from(body: Option<Value>) -> Self {
        body.map_or(Self::Any, Self::Json)
    }
}

impl fmt::Debug for BodyMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("Any"),
            Self::Json(body) => f.debug_tuple("Json").field(body).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl fmt::Display for BodyMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => Ok(()),
            Self::Json(body) => write!(f, " with body {body}"),
            Self::Predicate(_) => f.write_str(" with matching body"),
        }
    }
}
