pub mod encoding;
pub mod headers;
pub mod parser;
pub mod query;
pub mod request;
pub mod response;
pub mod status;
pub mod validator;

use std::fmt;

/// HTTP versions the parser can recognise.
/// Only 1.0 and 1.1 are served; the rest are rejected by the [`validator`].
#[derive(PartialEq, PartialOrd, Debug, Clone, Copy)]
pub enum HttpVersion {
    V0_9,
    V1_0,
    V1_1,
    V2_0,
    V3_0,
}

impl HttpVersion {
    /// Check if a tuple (major, minor) corresponds to a known HTTP version
    pub fn from_pair(v: (u8, u8)) -> Option<HttpVersion> {
        match v {
            (0, 9) => Some(HttpVersion::V0_9),
            (1, 0) => Some(HttpVersion::V1_0),
            (1, 1) => Some(HttpVersion::V1_1),
            (2, 0) => Some(HttpVersion::V2_0),
            (3, 0) => Some(HttpVersion::V3_0),
            _ => None,
        }
    }
}

/// Request methods. Handlers declare the subset they answer to.
#[derive(PartialEq, Eq, Hash, Debug, Clone, Copy)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Connect,
    Options,
    Trace,
}

pub const HTTP_METHOD_MAX_LEN: usize = 7;

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Connect => "CONNECT",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Lower-cased verb name, as used to pick the handler method.
    pub fn verb_name(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Head => "head",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Connect => "connect",
            HttpMethod::Options => "options",
            HttpMethod::Trace => "trace",
        }
    }

    /// Method tokens are case-sensitive on the wire.
    pub fn from_token(method: &str) -> Option<HttpMethod> {
        match method {
            "GET" => Some(HttpMethod::Get),
            "HEAD" => Some(HttpMethod::Head),
            "POST" => Some(HttpMethod::Post),
            "PUT" => Some(HttpMethod::Put),
            "DELETE" => Some(HttpMethod::Delete),
            "PATCH" => Some(HttpMethod::Patch),
            "TRACE" => Some(HttpMethod::Trace),
            "OPTIONS" => Some(HttpMethod::Options),
            "CONNECT" => Some(HttpMethod::Connect),
            _ => None,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verb_names_are_lowercase_tokens() {
        for method in [HttpMethod::Get, HttpMethod::Post, HttpMethod::Options] {
            assert_eq!(method.verb_name(), method.as_str().to_lowercase());
            assert_eq!(HttpMethod::from_token(method.as_str()), Some(method));
        }
    }

    #[test]
    fn lowercase_tokens_are_not_methods() {
        assert_eq!(HttpMethod::from_token("get"), None);
    }
}
