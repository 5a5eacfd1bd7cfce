//! Request handlers and the dispatch pipeline.
//!
//! A [`Handler`] is built fresh for every request by the factory registered
//! with its route. It declares the verbs it answers through
//! [`Handler::verbs`]; the dispatcher checks that set before calling the
//! matching verb method, and treats a verb outside it as a routing miss.

pub mod codec;
pub mod context;
pub mod dispatcher;
pub mod reply;
pub mod responses;
pub mod router;
pub mod static_files;
pub mod template;

use std::sync::Arc;

use crate::error::Result;
use crate::http::HttpMethod;

use context::{Captures, HandlerContext};
use reply::Reply;

/// Verbs a handler may implement.
pub type Verb = HttpMethod;

/// Builds one handler instance per request.
pub type HandlerFactory = Arc<dyn Fn() -> Box<dyn Handler> + Send + Sync>;

/// Wrap a constructor as a [`HandlerFactory`].
pub fn factory<F, H>(build: F) -> HandlerFactory
where
    F: Fn() -> H + Send + Sync + 'static,
    H: Handler + 'static,
{
    Arc::new(move || Box::new(build()) as Box<dyn Handler>)
}

/// Per-request handler.
///
/// Only the methods for verbs listed in [`verbs`](Handler::verbs) are ever
/// called. Captured path groups arrive positionally in `args`.
pub trait Handler: Send {
    fn verbs(&self) -> &'static [Verb];

    fn get(&mut self, ctx: &mut HandlerContext<'_>, _args: &Captures) -> Result<Reply> {
        Ok(not_implemented(ctx))
    }

    fn head(&mut self, ctx: &mut HandlerContext<'_>, _args: &Captures) -> Result<Reply> {
        Ok(not_implemented(ctx))
    }

    fn post(&mut self, ctx: &mut HandlerContext<'_>, _args: &Captures) -> Result<Reply> {
        Ok(not_implemented(ctx))
    }

    fn put(&mut self, ctx: &mut HandlerContext<'_>, _args: &Captures) -> Result<Reply> {
        Ok(not_implemented(ctx))
    }

    fn delete(&mut self, ctx: &mut HandlerContext<'_>, _args: &Captures) -> Result<Reply> {
        Ok(not_implemented(ctx))
    }

    fn patch(&mut self, ctx: &mut HandlerContext<'_>, _args: &Captures) -> Result<Reply> {
        Ok(not_implemented(ctx))
    }

    fn options(&mut self, ctx: &mut HandlerContext<'_>, _args: &Captures) -> Result<Reply> {
        Ok(not_implemented(ctx))
    }
}

fn not_implemented(ctx: &mut HandlerContext<'_>) -> Reply {
    ctx.error(404, Some("Not Found"))
}

/// Whether `handler` both declares `verb` and has a method for it.
pub fn supports(handler: &dyn Handler, verb: Verb) -> bool {
    has_method(verb) && handler.verbs().contains(&verb)
}

fn has_method(verb: Verb) -> bool {
    !matches!(verb, HttpMethod::Connect | HttpMethod::Trace)
}

/// Call the verb method for `verb`. Callers check [`supports`] first.
pub(crate) fn invoke(
    handler: &mut dyn Handler,
    verb: Verb,
    ctx: &mut HandlerContext<'_>,
    args: &Captures,
) -> Result<Reply> {
    match verb {
        HttpMethod::Get => handler.get(ctx, args),
        HttpMethod::Head => handler.head(ctx, args),
        HttpMethod::Post => handler.post(ctx, args),
        HttpMethod::Put => handler.put(ctx, args),
        HttpMethod::Delete => handler.delete(ctx, args),
        HttpMethod::Patch => handler.patch(ctx, args),
        HttpMethod::Options => handler.options(ctx, args),
        HttpMethod::Connect | HttpMethod::Trace => Ok(not_implemented(ctx)),
    }
}
