use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use async_std::net::TcpListener;
use async_std::task;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::Result;
use crate::handler::HandlerFactory;
use crate::handler::dispatcher::Dispatcher;
use crate::handler::router::RouteTable;
use crate::handler::static_files::StaticFiles;
use crate::handler::template::TemplateCache;
use crate::net::server::HttpServer;

/// Route registration and serving.
///
/// Routes are tried in the order they are added. Once serving starts the
/// table is frozen and shared by every request; so is the template cache,
/// which belongs to this server alone.
pub struct Server {
    config: Arc<ServerConfig>,
    routes: RouteTable,
    templates: Arc<TemplateCache>,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            routes: RouteTable::new(),
            templates: Arc::new(TemplateCache::new()),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn add_handler(&mut self, pattern: &str, factory: HandlerFactory) -> Result<&mut Self> {
        self.routes.register(pattern, factory)?;
        Ok(self)
    }

    pub fn add_handlers<'p, I>(&mut self, handlers: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (&'p str, HandlerFactory)>,
    {
        for (pattern, factory) in handlers {
            self.add_handler(pattern, factory)?;
        }
        Ok(self)
    }

    /// Mount the static file handler. Defaults come from `static_path` and
    /// `static_url` in the configuration.
    pub fn enable_static(
        &mut self,
        path: Option<PathBuf>,
        route: Option<&str>,
    ) -> Result<&mut Self> {
        let mount = StaticFiles::new(
            path.unwrap_or_else(|| self.config.static_path.clone()),
            route.unwrap_or(&self.config.static_url),
            self.config.chunk_size,
        );
        info!(root = %mount.root.display(), route = %mount.route, "static files enabled");
        let factory = mount.factory();
        self.add_handler(&mount.route, factory)
    }

    pub fn into_app(self) -> Arc<Dispatcher> {
        Arc::new(Dispatcher::new(self.routes, self.config, self.templates))
    }

    /// Bind and serve forever. Without an address every interface is bound.
    pub fn serve(self, port: u16, address: Option<IpAddr>, quiet: bool) -> std::io::Result<()> {
        task::block_on(self.run(port, address, quiet))
    }

    pub async fn run(self, port: u16, address: Option<IpAddr>, quiet: bool) -> std::io::Result<()> {
        let quiet = quiet || self.config.quiet;
        let addr = SocketAddr::new(address.unwrap_or(self.config.address), port);
        let listener = TcpListener::bind(addr).await?;

        if !quiet {
            let host = banner_host(addr.ip());
            info!("Serving on http://{host}:{port}");
            info!("(Type Ctrl-C to stop)");
        }

        let config = Arc::clone(&self.config);
        HttpServer::new(self.into_app(), config, quiet)
            .run(listener)
            .await
    }

    /// Serve on an already bound listener.
    pub fn serve_listener(self, listener: std::net::TcpListener, quiet: bool) -> std::io::Result<()> {
        let config = Arc::clone(&self.config);
        let quiet = quiet || config.quiet;
        let server = HttpServer::new(self.into_app(), config, quiet);
        task::block_on(server.run(TcpListener::from(listener)))
    }
}

/// The machine's name when every interface is bound, else the bound address.
fn banner_host(ip: IpAddr) -> String {
    if !ip.is_unspecified() {
        return ip.to_string();
    }
    hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "localhost".to_string())
}
