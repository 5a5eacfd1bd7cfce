//! HTTP headers abstraction for [`HttpRequest`](crate::http::request::HttpRequest),
//! [`HttpResponse`](crate::http::response::HttpResponse) and the per-request
//! [`HandlerContext`](crate::handler::context::HandlerContext).
//!
//! Headers are stored in an ordered map to preserve insertion order.
//! Names are case-insensitive: they are folded to lowercase on the way in, so
//! `Content-Type` and `content-type` address the same entry. Values are kept
//! as strings; anything `Display` can be stored and is rendered once, when set.
//! Control characters other than tab are dropped from values, so a value can
//! never end its header line early.
//!
//! This abstraction does not enforce any HTTP semantics. Higher-level types
//! apply their own rules on top of it, and the
//! [`validator`](crate::http::validator) module checks request headers.

use std::fmt::Display;

use indexmap::IndexMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpHeaders {
    headers: IndexMap<String, String>,
}

impl HttpHeaders {
    pub fn new() -> Self {
        Self {
            headers: IndexMap::new(),
        }
    }

    pub fn set(&mut self, name: &str, value: impl Display) {
        let mut value = value.to_string();
        value.retain(|c| c == '\t' || !c.is_control());
        self.headers.insert(name.to_ascii_lowercase(), value);
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name.to_ascii_lowercase().as_str())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.headers.shift_remove(name.to_ascii_lowercase().as_str())
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Wire form: one `name: value\r\n` line per header.
    pub fn stringify(&self) -> String {
        let mut result = String::new();
        for (name, value) in &self.headers {
            result.push_str(name);
            result.push_str(": ");
            result.push_str(value);
            result.push_str("\r\n");
        }
        result
    }
}
