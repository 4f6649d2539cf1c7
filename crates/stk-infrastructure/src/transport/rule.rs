//! Request rules and the builder that completes them

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use stk_domain::value_objects::{BodyMatcher, HttpMethod, Response, UrlMatcher};

use super::TransportState;

/// Method, URL and body constraints of an expectation or definition
#[derive(Debug, Clone)]
pub struct RequestRule {
    pub method: HttpMethod,
    pub url: UrlMatcher,
    pub body: BodyMatcher,
}

impl RequestRule {
    pub fn matches(&self, method: &HttpMethod, url: &str, body: Option<&Value>) -> bool {
        self.method == *method && self.url.matches(url) && self.body.matches(body)
    }
}

impl fmt::Display for RequestRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}{}", self.method, self.url, self.body)
    }
}

/// A rule paired with its canned response
#[derive(Debug, Clone)]
pub(crate) struct Rule {
    pub(crate) request: RequestRule,
    pub(crate) response: Response,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RuleKind {
    /// Consumed once, in declaration order
    Expectation,
    /// Reusable fallback
    Definition,
}

/// Returned by [`MockTransport::expect`](super::MockTransport::expect) and
/// [`MockTransport::when`](super::MockTransport::when); nothing is registered
/// until a response is supplied.
#[must_use = "a rule is only registered once a response is given"]
pub struct ResponseBuilder {
    state: Rc<RefCell<TransportState>>,
    kind: RuleKind,
    request: RequestRule,
}

impl ResponseBuilder {
    pub(crate) fn new(
        state: Rc<RefCell<TransportState>>,
        kind: RuleKind,
        request: RequestRule,
    ) -> Self {
        Self {
            state,
            kind,
            request,
        }
    }

    /// Answer with `status` and `body`
    pub fn respond(self, status: u16, body: Value) {
        self.respond_with(Response::new(status, body));
    }

    /// Answer with a fully built response
    pub fn respond_with(self, response: Response) {
        let rule = Rule {
            request: self.request,
            response,
        };
        let mut state = self.state.borrow_mut();
        match self.kind {
            RuleKind::Expectation => state.expectations.push_back(rule),
            RuleKind::Definition => state.definitions.push(rule),
        }
    }
}

impl fmt::Debug for ResponseBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseBuilder")
            .field("kind", &self.kind)
            .field("request", &self.request.to_string())
            .finish()
    }
}
