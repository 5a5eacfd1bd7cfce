//! The single dispatch point.
//!
//! Route lookup, handler construction, verb resolution, invocation and
//! response encoding all happen here, and so does error capture: any `Err`
//! or panic out of a verb method, or a reply that fails to encode, becomes a
//! 500 for that request alone.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tracing::{debug, error};

use crate::config::ServerConfig;
use crate::error::Error;
use crate::handler::codec::{Outcome, ResponseCodec};
use crate::handler::context::{Captures, HandlerContext};
use crate::handler::responses::ErrorHandler;
use crate::handler::router::RouteTable;
use crate::handler::template::TemplateCache;
use crate::handler::{Handler, invoke, supports};
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;
use crate::http::status::Status;

pub struct Dispatcher {
    routes: RouteTable,
    config: Arc<ServerConfig>,
    templates: Arc<TemplateCache>,
}

impl Dispatcher {
    pub fn new(
        routes: RouteTable,
        config: Arc<ServerConfig>,
        templates: Arc<TemplateCache>,
    ) -> Self {
        Self {
            routes,
            config,
            templates,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn templates(&self) -> &TemplateCache {
        &self.templates
    }

    /// Entry point for the transport: request in, wire response out.
    pub fn app(&self, req: &HttpRequest) -> HttpResponse {
        self.handle(req).into_http()
    }

    pub fn handle(&self, req: &HttpRequest) -> Outcome {
        let verb = req.method;
        let (mut handler, captures) = self.resolve(req);

        if !supports(handler.as_ref(), verb) {
            debug!(method = %verb, path = %req.path, "no {} method on matched handler", verb.verb_name());
            handler = Box::new(ErrorHandler::not_found());
        }

        let mut ctx = HandlerContext::new(req, captures.clone(), &self.config, &self.templates);

        let result = catch_unwind(AssertUnwindSafe(|| {
            invoke(handler.as_mut(), verb, &mut ctx, &captures)
        }))
        .unwrap_or_else(|payload| Err(Error::Panic(panic_message(payload.as_ref()))));

        match result.and_then(|reply| ResponseCodec::encode(reply, &mut ctx)) {
            Ok(response) => ctx.into_outcome(response),
            Err(err) => self.fault(req, err),
        }
    }

    fn resolve(&self, req: &HttpRequest) -> (Box<dyn Handler>, Captures) {
        match self.routes.lookup(&req.path) {
            Some(hit) => {
                let handler = (**hit.factory())();
                (handler, hit.captures)
            }
            None => (Box::new(ErrorHandler::not_found()), Captures::default()),
        }
    }

    fn fault(&self, req: &HttpRequest, err: Error) -> Outcome {
        let detail = err.chain();
        error!(method = %req.method, path = %req.path, error = %detail, "handler failed");

        let body = if self.config.debug {
            detail
        } else {
            Status::SERVER_ERROR.reason().to_string()
        };
        Outcome::error(Status::SERVER_ERROR, body)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
