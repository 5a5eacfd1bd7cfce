use crate::error::Result;
use crate::handler::context::{Captures, HandlerContext};
use crate::handler::reply::Reply;
use crate::handler::{Handler, HandlerFactory, Verb, factory};
use crate::http::HttpMethod;
use crate::http::status::Status;

const ALL_VERBS: &[Verb] = &[
    HttpMethod::Get,
    HttpMethod::Head,
    HttpMethod::Post,
    HttpMethod::Put,
    HttpMethod::Delete,
    HttpMethod::Patch,
    HttpMethod::Options,
];

/// Answers every verb with a fixed error status.
///
/// Used for routing misses. The body is the standard reason phrase for the
/// code, or empty for codes outside the reason table.
#[derive(Debug, Clone, Copy)]
pub struct ErrorHandler {
    code: u16,
}

impl ErrorHandler {
    pub fn new(code: u16) -> Self {
        Self { code }
    }

    pub fn not_found() -> Self {
        Self::new(404)
    }

    pub fn factory(code: u16) -> HandlerFactory {
        factory(move || ErrorHandler::new(code))
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    fn respond(&self, ctx: &mut HandlerContext<'_>) -> Result<Reply> {
        let status = Status::from_code_or_bare(self.code);
        let message = status.reason().to_string();
        Ok(ctx.error(self.code, Some(&message)))
    }
}

impl Handler for ErrorHandler {
    fn verbs(&self) -> &'static [Verb] {
        ALL_VERBS
    }

    fn get(&mut self, ctx: &mut HandlerContext<'_>, _args: &Captures) -> Result<Reply> {
        self.respond(ctx)
    }

    fn head(&mut self, ctx: &mut HandlerContext<'_>, _args: &Captures) -> Result<Reply> {
        self.respond(ctx)
    }

    fn post(&mut self, ctx: &mut HandlerContext<'_>, _args: &Captures) -> Result<Reply> {
        self.respond(ctx)
    }

    fn put(&mut self, ctx: &mut HandlerContext<'_>, _args: &Captures) -> Result<Reply> {
        self.respond(ctx)
    }

    fn delete(&mut self, ctx: &mut HandlerContext<'_>, _args: &Captures) -> Result<Reply> {
        self.respond(ctx)
    }

    fn patch(&mut self, ctx: &mut HandlerContext<'_>, _args: &Captures) -> Result<Reply> {
        self.respond(ctx)
    }

    fn options(&mut self, ctx: &mut HandlerContext<'_>, _args: &Captures) -> Result<Reply> {
        self.respond(ctx)
    }
}
