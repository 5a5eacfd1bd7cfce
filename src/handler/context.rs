//! Per-request state handed to a handler.
//!
//! A [`HandlerContext`] lives for exactly one request. The handler owns it
//! mutably while its verb method runs; once the dispatcher has encoded the
//! reply, the context is consumed and its status and headers are final.

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use crate::handler::codec::{Outcome, Response};
use crate::handler::reply::Reply;
use crate::handler::template::{Bindings, TemplateCache};
use crate::http::headers::HttpHeaders;
use crate::http::query::QueryParams;
use crate::http::request::HttpRequest;
use crate::http::status::Status;

/// Positional path captures. An optional group that did not take part in
/// the match is `None`; the verb method decides what that defaults to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captures(Vec<Option<String>>);

impl Captures {
    pub fn new(groups: Vec<Option<String>>) -> Self {
        Self(groups)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).and_then(|group| group.as_deref())
    }

    pub fn get_or<'a>(&'a self, index: usize, default: &'a str) -> &'a str {
        self.get(index).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> {
        self.0.iter().map(|group| group.as_deref())
    }
}

/// Set by `error` and `redirect`; takes precedence over the returned reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Directive {
    Error { code: u16, message: String },
    Redirect(String),
}

pub struct HandlerContext<'a> {
    request: &'a HttpRequest,
    config: &'a ServerConfig,
    templates: &'a TemplateCache,
    captures: Captures,
    query: QueryParams,

    status: Status,
    headers: HttpHeaders,
    directive: Option<Directive>,
}

impl<'a> HandlerContext<'a> {
    pub fn new(
        request: &'a HttpRequest,
        captures: Captures,
        config: &'a ServerConfig,
        templates: &'a TemplateCache,
    ) -> Self {
        let mut headers = HttpHeaders::new();
        headers.set("content-type", "text/html");

        Self {
            request,
            config,
            templates,
            captures,
            query: request.query_params(),
            status: Status::OK,
            headers,
            directive: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.request.path
    }

    pub fn request(&self) -> &HttpRequest {
        self.request
    }

    pub fn config(&self) -> &ServerConfig {
        self.config
    }

    pub fn captures(&self) -> &Captures {
        &self.captures
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn set_header(&mut self, name: &str, value: impl std::fmt::Display) {
        self.headers.set(name, value);
    }

    /// First query value for `name`.
    pub fn argument(&self, name: &str) -> Result<&str> {
        self.query
            .first(name)
            .ok_or_else(|| Error::MissingArgument(name.to_string()))
    }

    pub fn argument_or<'s>(&'s self, name: &str, default: &'s str) -> &'s str {
        self.query.first(name).unwrap_or(default)
    }

    /// Switch to a plain-text error response. The message, or an empty body,
    /// is returned so it can be the verb method's result.
    ///
    /// Codes outside the built-in reason table get an empty reason phrase;
    /// use [`error_with_reason`](Self::error_with_reason) to name them.
    pub fn error(&mut self, code: u16, message: Option<&str>) -> Reply {
        self.error_with_status(Status::from_code_or_bare(code), message)
    }

    pub fn error_with_reason(&mut self, code: u16, reason: &str, message: Option<&str>) -> Reply {
        self.error_with_status(Status::custom(code, reason), message)
    }

    fn error_with_status(&mut self, status: Status, message: Option<&str>) -> Reply {
        let message = message.unwrap_or_default().to_string();
        self.headers.set("content-type", "text/plain");
        self.directive = Some(Directive::Error {
            code: status.code(),
            message: message.clone(),
        });
        self.status = status;
        Reply::Text(message)
    }

    pub fn redirect(&mut self, url: &str) -> Reply {
        self.status = Status::REDIRECT;
        self.headers.set("location", url);
        self.directive = Some(Directive::Redirect(url.to_string()));
        Reply::Empty
    }

    /// Substitute `bindings` into the named view.
    pub fn render<B>(&self, view: &str, bindings: &B) -> Result<String>
    where
        B: Bindings + ?Sized,
    {
        self.templates
            .render(&self.config.view_path, view, bindings)
    }

    /// Render the view once per item and concatenate, with no separator.
    pub fn render_list<I>(&self, view: &str, items: I) -> Result<String>
    where
        I: IntoIterator,
        I::Item: Bindings,
    {
        self.templates
            .render_list(&self.config.view_path, view, items)
    }

    pub(crate) fn take_directive(&mut self) -> Option<Directive> {
        self.directive.take()
    }

    pub(crate) fn into_outcome(self, response: Response) -> Outcome {
        Outcome {
            status: self.status,
            headers: self.headers,
            response,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;

    fn with_context<T>(target: &str, f: impl FnOnce(&mut HandlerContext<'_>) -> T) -> T {
        let req = HttpRequest::with_target(HttpMethod::Get, target);
        let config = ServerConfig::default();
        let templates = TemplateCache::new();
        let mut ctx = HandlerContext::new(&req, Captures::default(), &config, &templates);
        f(&mut ctx)
    }

    #[test]
    fn defaults_to_200_html() {
        with_context("/", |ctx| {
            assert_eq!(ctx.status().code(), 200);
            assert_eq!(ctx.header("Content-Type"), Some("text/html"));
        });
    }

    #[test]
    fn arguments_use_first_value() {
        with_context("/?q=a&q=b", |ctx| {
            assert_eq!(ctx.argument("q").unwrap(), "a");
            assert_eq!(ctx.query().all("q"), ["a", "b"]);
        });
    }

    #[test]
    fn missing_argument_needs_a_default() {
        with_context("/?q=", |ctx| {
            assert!(matches!(ctx.argument("q"), Err(Error::MissingArgument(name)) if name == "q"));
            assert_eq!(ctx.argument_or("q", "fallback"), "fallback");
        });
    }

    #[test]
    fn error_sets_status_and_plain_text() {
        with_context("/", |ctx| {
            let reply = ctx.error(403, Some("nope"));
            assert!(matches!(reply, Reply::Text(ref body) if body == "nope"));
            assert_eq!(ctx.status().to_string(), "403 Forbidden");
            assert_eq!(ctx.header("content-type"), Some("text/plain"));
        });
    }

    #[test]
    fn error_with_unknown_code_takes_a_reason() {
        with_context("/", |ctx| {
            ctx.error_with_reason(418, "I'm a teapot", None);
            assert_eq!(ctx.status().to_string(), "418 I'm a teapot");
        });
    }

    #[test]
    fn redirect_sets_location() {
        with_context("/", |ctx| {
            let reply = ctx.redirect("/elsewhere");
            assert!(matches!(reply, Reply::Empty));
            assert_eq!(ctx.status().code(), 302);
            assert_eq!(ctx.header("location"), Some("/elsewhere"));
        });
    }

    #[test]
    fn redirect_target_cannot_add_headers() {
        with_context("/login?next=/x%0d%0aSet-Cookie:%20admin=1", |ctx| {
            let next = ctx.argument_or("next", "/").to_string();
            assert_eq!(next, "/x\r\nSet-Cookie: admin=1");

            ctx.redirect(&next);
            assert_eq!(ctx.header("location"), Some("/xSet-Cookie: admin=1"));
            assert!(!ctx.headers().contains("set-cookie"));
            assert!(!ctx.headers().stringify().contains("\r\nSet-Cookie"));
        });
    }

    #[test]
    fn captures_default_when_group_unmatched() {
        let caps = Captures::new(vec![None, Some("x".into())]);
        assert_eq!(caps.get_or(0, "0"), "0");
        assert_eq!(caps.get_or(1, "0"), "x");
        assert_eq!(caps.get(5), None);
    }
}
