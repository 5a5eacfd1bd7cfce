use percent_encoding::percent_decode_str;

use crate::http::HttpMethod;
use crate::http::headers::HttpHeaders;
use crate::http::query::QueryParams;

/// A parsed request, as handed from the transport to the dispatcher.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Request target exactly as sent.
    pub target: String,
    /// Percent-decoded path part of the target.
    pub path: String,
    /// Raw query string, without the leading `?`.
    pub query: String,
    pub http_version: (u8, u8),

    pub headers: HttpHeaders,
    pub body: Vec<u8>,
}

impl HttpRequest {
    pub fn new() -> Self {
        Self {
            method: HttpMethod::Get,
            target: String::new(),
            path: String::new(),
            query: String::new(),
            http_version: (1, 1),
            headers: HttpHeaders::new(),
            body: Vec::new(),
        }
    }

    /// Build a request for `target` (path plus optional query string).
    pub fn with_target(method: HttpMethod, target: &str) -> Self {
        let mut req = Self::new();
        req.method = method;
        req.set_target(target);
        req
    }

    /// Stores the target and splits it into decoded path and raw query.
    pub fn set_target(&mut self, target: &str) {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, query),
            None => (target, ""),
        };

        self.target = target.to_string();
        self.path = percent_decode_str(path).decode_utf8_lossy().into_owned();
        self.query = query.to_string();
    }

    pub fn query_params(&self) -> QueryParams {
        QueryParams::parse(&self.query)
    }

    pub fn content_length(&self) -> Option<&str> {
        self.headers.get("content-length")
    }
}

impl Default for HttpRequest {
    fn default() -> Self {
        Self::new()
    }
}
