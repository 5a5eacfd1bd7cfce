use std::collections::HashMap;

use sluice::http::HttpMethod;
use sluice::{Captures, Handler, HandlerContext, Reply, Result, Server, ServerConfig, Verb, factory};

struct Index;

impl Handler for Index {
    fn verbs(&self) -> &'static [Verb] {
        &[HttpMethod::Get, HttpMethod::Head]
    }

    fn get(&mut self, ctx: &mut HandlerContext<'_>, _args: &Captures) -> Result<Reply> {
        let name = ctx.config().server_name.clone();
        Ok(format!("<h1>Welcome to {name}!</h1>").into())
    }

    fn head(&mut self, ctx: &mut HandlerContext<'_>, args: &Captures) -> Result<Reply> {
        self.get(ctx, args)
    }
}

struct Page;

impl Handler for Page {
    fn verbs(&self) -> &'static [Verb] {
        &[HttpMethod::Get]
    }

    fn get(&mut self, _ctx: &mut HandlerContext<'_>, args: &Captures) -> Result<Reply> {
        Ok(format!("<b>PAGE {}</b>", args.get_or(0, "0")).into())
    }
}

struct Echo;

impl Handler for Echo {
    fn verbs(&self) -> &'static [Verb] {
        &[HttpMethod::Get]
    }

    fn get(&mut self, ctx: &mut HandlerContext<'_>, _args: &Captures) -> Result<Reply> {
        let params: HashMap<String, Vec<String>> = ctx
            .query()
            .iter()
            .map(|(name, values)| (name.to_string(), values.to_vec()))
            .collect();
        Ok(Reply::json(params))
    }
}

fn main() -> std::io::Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => ServerConfig::from_file(path),
        None => ServerConfig::default(),
    };
    sluice::logging::init(config.quiet);

    let port = config.port;
    let quiet = config.quiet;
    let mut server = Server::new(config);
    let routes = server
        .add_handlers([
            ("/", factory(|| Index)),
            (r"/page/(\d+)?", factory(|| Page)),
            ("/echo", factory(|| Echo)),
        ])
        .and_then(|server| server.enable_static(None, None));
    if let Err(err) = routes {
        return Err(std::io::Error::other(err));
    }

    server.serve(port, None, quiet)
}
