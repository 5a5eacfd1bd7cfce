//! A small regex-routed HTTP framework.
//!
//! Handlers are registered against regular expressions, tried in order, and
//! built fresh for every request. A handler's verb method receives the
//! pattern's capture groups positionally and returns a [`Reply`]: text, a
//! JSON-serializable value, or a lazily produced byte stream.
//!
//! ```no_run
//! use sluice::{Captures, Handler, HandlerContext, Reply, Result, Server, ServerConfig, Verb};
//! use sluice::http::HttpMethod;
//!
//! struct Page;
//!
//! impl Handler for Page {
//!     fn verbs(&self) -> &'static [Verb] {
//!         &[HttpMethod::Get]
//!     }
//!
//!     fn get(&mut self, ctx: &mut HandlerContext<'_>, args: &Captures) -> Result<Reply> {
//!         let id = args.get_or(0, "index");
//!         Ok(ctx.render("page.htm", &[("page_id", id)])?.into())
//!     }
//! }
//!
//! let mut server = Server::new(ServerConfig::default());
//! server.add_handler(r"/page/([a-z0-9_\-]+)", sluice::factory(|| Page))?;
//! server.enable_static(None, None)?;
//! server.serve(8080, None, false)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logging;
pub mod net;
pub mod server;

pub use config::ServerConfig;
pub use error::{Error, Result};
pub use handler::codec::{Outcome, Response};
pub use handler::context::{Captures, HandlerContext};
pub use handler::dispatcher::Dispatcher;
pub use handler::reply::Reply;
pub use handler::responses::ErrorHandler;
pub use handler::static_files::StaticFiles;
pub use handler::template::{Bindings, TemplateCache};
pub use handler::{Handler, HandlerFactory, Verb, factory};
pub use server::Server;
