//! Value objects for the mock transport wire contract
//!
//! No bytes are transmitted: a request is a method, a URL and an optional
//! JSON body, and a response is a status code plus an opaque JSON body.

pub mod http;
pub mod matcher;

pub use http::{HttpMethod, Response};
pub use matcher::{BodyMatcher, UrlMatcher};
