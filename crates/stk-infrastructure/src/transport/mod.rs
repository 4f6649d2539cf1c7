//! Mock Transport
//!
//! Deterministic stand-in for an HTTP backend. Nothing leaves the process:
//! a request is matched against declared rules, parked, and answered only
//! when the test calls [`MockTransport::flush`].
//!
//! ## Matching
//!
//! ```text
//! request(method, url, body)
//!   expectation queue non-empty?
//!     head matches  ──► consume head, park request
//!     otherwise     ──► UnexpectedRequest (expected: head)
//!   first matching definition? ──► park request
//!   otherwise                  ──► UnexpectedRequest
//! ```
//!
//! Flushing settles parked requests in FIFO order (2xx fulfils, anything
//! else rejects) and then runs one digest on the root scope.

pub mod rule;

pub use rule::{RequestRule, ResponseBuilder};

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use stk_application::{Deferred, DigestReport, Promise, Provider, Scope};
use stk_domain::constants::{HTTP_BACKEND, ROOT_SCOPE};
use stk_domain::error::{Error, Result};
use stk_domain::value_objects::{BodyMatcher, HttpMethod, Response, UrlMatcher};
use tracing::{debug, warn};

use rule::{Rule, RuleKind};

/// Promise handed back for every accepted request
pub type ResponsePromise = Promise<Response, Response>;

struct PendingRequest {
    method: HttpMethod,
    url: String,
    response: Response,
    deferred: Deferred<Response, Response>,
}

impl PendingRequest {
    fn release(self) {
        debug!(
            method = %self.method,
            url = %self.url,
            status = self.response.status,
            "Releasing response"
        );
        if self.response.is_success() {
            self.deferred.resolve(self.response);
        } else {
            self.deferred.reject(self.response);
        }
    }
}

#[derive(Default)]
pub(crate) struct TransportState {
    pub(crate) expectations: VecDeque<Rule>,
    pub(crate) definitions: Vec<Rule>,
    pending: VecDeque<PendingRequest>,
}

/// Scripted HTTP backend bound to one scope tree
#[derive(Clone)]
pub struct MockTransport {
    root: Scope,
    state: Rc<RefCell<TransportState>>,
}

impl MockTransport {
    /// Create a transport that digests `root` after each flush
    pub fn new(root: Scope) -> Self {
        Self {
            root,
            state: Rc::new(RefCell::new(TransportState::default())),
        }
    }

    /// Provider installing a transport under `$httpBackend`
    pub fn provider() -> Provider {
        Provider::factory(HTTP_BACKEND, [ROOT_SCOPE], |deps| {
            let root = deps.get::<Scope>(ROOT_SCOPE)?;
            Ok(Rc::new(Self::new(Scope::clone(&root))))
        })
    }

    /// Declare a request that must arrive, in order, exactly once
    pub fn expect(
        &self,
        method: impl Into<HttpMethod>,
        url: impl Into<UrlMatcher>,
        body: impl Into<BodyMatcher>,
    ) -> ResponseBuilder {
        self.builder(RuleKind::Expectation, method.into(), url.into(), body.into())
    }

    /// Declare a reusable response for requests not covered by expectations
    pub fn when(
        &self,
        method: impl Into<HttpMethod>,
        url: impl Into<UrlMatcher>,
        body: impl Into<BodyMatcher>,
    ) -> ResponseBuilder {
        self.builder(RuleKind::Definition, method.into(), url.into(), body.into())
    }

    fn builder(
        &self,
        kind: RuleKind,
        method: HttpMethod,
        url: UrlMatcher,
        body: BodyMatcher,
    ) -> ResponseBuilder {
        ResponseBuilder::new(
            Rc::clone(&self.state),
            kind,
            RequestRule { method, url, body },
        )
    }

    /// Issue a request
    ///
    /// The returned promise stays pending until a flush releases it.
    pub fn request(
        &self,
        method: impl Into<HttpMethod>,
        url: &str,
        body: Option<Value>,
    ) -> Result<ResponsePromise> {
        let method = method.into();
        // Matchers may call back into the backend, so no borrow is held
        // while they run.
        let head = self.state.borrow().expectations.front().cloned();
        let response = match head {
            Some(head) => {
                if !head.request.matches(&method, url, body.as_ref()) {
                    let expected = Some(head.request.to_string());
                    debug!(%method, url, ?expected, "Request does not match next expectation");
                    return Err(Error::unexpected_request(method.as_str(), url, expected));
                }
                self.state.borrow_mut().expectations.pop_front();
                head.response
            }
            None => {
                let definitions = self.state.borrow().definitions.clone();
                let accepted = definitions
                    .into_iter()
                    .find(|rule| rule.request.matches(&method, url, body.as_ref()));
                let Some(rule) = accepted else {
                    debug!(%method, url, "No rule accepts request");
                    return Err(Error::unexpected_request(method.as_str(), url, None));
                };
                rule.response
            }
        };

        debug!(%method, url, status = response.status, "Request accepted");
        let (deferred, promise) = Deferred::new();
        self.state.borrow_mut().pending.push_back(PendingRequest {
            method,
            url: url.to_string(),
            response,
            deferred,
        });
        Ok(promise)
    }

    /// Release every parked response, including ones parked while
    /// flushing, then digest the root scope once
    pub fn flush(&self) -> Result<DigestReport> {
        if self.pending_count() == 0 {
            return Err(Error::NoPendingRequests);
        }
        let mut released = 0;
        while let Some(request) = self.next_pending() {
            request.release();
            released += 1;
        }
        debug!(released, "Transport flushed");
        self.root.digest()
    }

    /// Release exactly `count` parked responses, then digest the root scope
    pub fn flush_count(&self, count: usize) -> Result<DigestReport> {
        for _ in 0..count {
            let request = self.next_pending().ok_or(Error::NoPendingRequests)?;
            request.release();
        }
        debug!(released = count, "Transport flushed");
        self.root.digest()
    }

    fn next_pending(&self) -> Option<PendingRequest> {
        self.state.borrow_mut().pending.pop_front()
    }

    /// Fail if any expectation was never requested
    pub fn verify_no_outstanding_expectation(&self) -> Result<()> {
        let state = self.state.borrow();
        if state.expectations.is_empty() {
            return Ok(());
        }
        let remaining: Vec<String> = state
            .expectations
            .iter()
            .map(|rule| rule.request.to_string())
            .collect();
        warn!(?remaining, "Unsatisfied expectations");
        Err(Error::unsatisfied_expectation(&remaining))
    }

    /// Fail if any request is still waiting for a flush
    pub fn verify_no_outstanding_request(&self) -> Result<()> {
        let count = self.pending_count();
        if count == 0 {
            return Ok(());
        }
        warn!(count, "Unflushed requests");
        Err(Error::OutstandingRequest { count })
    }

    /// Drop all expectations and parked requests (definitions are kept)
    pub fn reset_expectations(&self) {
        let mut state = self.state.borrow_mut();
        state.expectations.clear();
        state.pending.clear();
    }

    pub fn pending_count(&self) -> usize {
        self.state.borrow().pending.len()
    }

    pub fn expectation_count(&self) -> usize {
        self.state.borrow().expectations.len()
    }

    pub fn root_scope(&self) -> &Scope {
        &self.root
    }
}

impl fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MockTransport")
            .field("root", &self.root.id())
            .field("expectations", &state.expectations.len())
            .field("definitions", &state.definitions.len())
            .field("pending", &state.pending.len())
            .finish()
    }
}
