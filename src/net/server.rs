//! Core HTTP transport.
//!
//! This module implements the low-level HTTP server runtime.
//! It is responsible only for networking concerns such as:
//! - accepting TCP connections,
//! - reading raw bytes from the network,
//! - writing raw bytes back to the client.
//!
//! Request parsing and validation are delegated to the `http` modules, and
//! everything between a parsed request and a response belongs to the
//! [`Dispatcher`](crate::handler::dispatcher::Dispatcher).
//!
//! ## Request handling flow
//!
//! 1. Accept a TCP connection and spawn a task for it
//! 2. Incrementally parse the bytes into an [`HttpRequest`]
//!    (delegated to [`RequestParser`])
//! 3. Validate the request once its headers are known
//!    (delegated to [`Validator`])
//! 4. Run the dispatcher on the blocking pool, so a slow handler only
//!    occupies its own thread
//! 5. Write the status line and headers, then the body; streamed bodies are
//!    pulled one chunk at a time, also on the blocking pool
//!
//! One request is served per connection (`connection: close`).

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use async_std::future;
use async_std::net::{TcpListener, TcpStream};
use async_std::prelude::*;
use async_std::task;
use tracing::{debug, info, warn};

use crate::config::ServerConfig;
use crate::handler::dispatcher::Dispatcher;
use crate::http::HttpMethod;
use crate::http::encoding;
use crate::http::parser::*;
use crate::http::request::HttpRequest;
use crate::http::response::{Body, ChunkStream, HttpResponse};
use crate::http::status::Status;
use crate::http::validator::{Validator, ValidatorError};

/// Errors that can occur while reading and parsing an HTTP request from the stream
/// used to interrupt the flow and return appropriate responses.
enum ReadError {
    Io(std::io::Error),
    ConnectionClosed,
    TimedOut,
    Parser(ParserError),
    Validator(ValidatorError),
}

pub struct HttpServer {
    app: Arc<Dispatcher>,
    config: Arc<ServerConfig>,
    quiet: bool,
}

impl HttpServer {
    pub fn new(app: Arc<Dispatcher>, config: Arc<ServerConfig>, quiet: bool) -> Self {
        Self { app, config, quiet }
    }

    /// Accepts connections forever, spawning one task per client.
    pub async fn run(self, listener: TcpListener) -> std::io::Result<()> {
        let server = Arc::new(self);
        let mut incoming = listener.incoming();

        while let Some(stream) = incoming.next().await {
            let stream = match stream {
                Ok(stream) => stream,
                Err(err) => {
                    warn!(%err, "failed to accept connection");
                    continue;
                }
            };

            let server = Arc::clone(&server);
            task::spawn(async move {
                if let Err(err) = server.handle_client(stream).await {
                    debug!(%err, "connection ended with an error");
                }
            });
        }

        Ok(())
    }

    /// Reads and incrementally parses an HTTP request from the TCP stream.
    ///
    /// The request is validated as soon as all headers are read, before the
    /// body (if any) is buffered.
    async fn read_request(&self, stream: &mut TcpStream) -> Result<HttpRequest, ReadError> {
        let mut parser = RequestParser::new(ParserLimits::from(self.config.as_ref()));
        let mut req = HttpRequest::new();
        let mut buffer = vec![0; self.config.buffer_size.max(1)];
        let mut pending: &[u8] = &[];

        loop {
            match parser.feed(pending, &mut req).map_err(ReadError::Parser)? {
                ParserOutcome::Done => return Ok(req),
                ParserOutcome::HeadersDone => {
                    Validator::validate_request(&req).map_err(ReadError::Validator)?;
                    pending = &[];
                    continue;
                }
                ParserOutcome::Incomplete => {}
            }

            let n = loop {
                match stream.read(&mut buffer).await {
                    Ok(0) => return Err(ReadError::ConnectionClosed),
                    Ok(n) => break n,
                    Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                    Err(e) => return Err(ReadError::Io(e)),
                }
            };
            pending = &buffer[..n];
        }
    }

    /// Handles a single client connection.
    /// Reads the HTTP request, dispatches it, and writes back the response.
    async fn handle_client(&self, mut stream: TcpStream) -> std::io::Result<()> {
        let peer = stream.peer_addr().ok();
        let read = future::timeout(self.config.read_timeout, self.read_request(&mut stream))
            .await
            .unwrap_or(Err(ReadError::TimedOut));

        let req = match read {
            Ok(req) => req,
            Err(ReadError::Io(err)) => {
                debug!(%err, "I/O error while reading request");
                return Ok(());
            }
            Err(ReadError::ConnectionClosed) => return Ok(()),
            Err(ReadError::TimedOut) => {
                return self.reject(&mut stream, Status::REQUEST_TIMEOUT).await;
            }
            Err(ReadError::Parser(err)) => {
                return self.reject(&mut stream, err.into_http_status()).await;
            }
            Err(ReadError::Validator(err)) => {
                return self.reject(&mut stream, err.into_http_status()).await;
            }
        };

        let app = Arc::clone(&self.app);
        let (req, mut response) = task::spawn_blocking(move || {
            let response = app.app(&req);
            (req, response)
        })
        .await;

        if self.config.compression {
            encoding::apply(&req, &mut response);
        }

        if !self.quiet {
            info!(
                peer = %peer.map(|p| p.to_string()).unwrap_or_default(),
                method = %req.method,
                target = %req.target,
                status = response.status.code(),
                "request"
            );
        }

        let send_body = req.method != HttpMethod::Head;
        self.write_response(&mut stream, response, send_body).await
    }

    async fn reject(&self, stream: &mut TcpStream, status: Status) -> std::io::Result<()> {
        if !self.quiet {
            info!(status = status.code(), "rejected request");
        }
        let reason = status.reason().to_string();
        self.write_response(stream, HttpResponse::plain(status, &reason), true)
            .await
    }

    /// Writes the response head, then the body unless `send_body` is false.
    async fn write_response(
        &self,
        stream: &mut TcpStream,
        mut response: HttpResponse,
        send_body: bool,
    ) -> std::io::Result<()> {
        response.fill_content_length();
        response
            .headers
            .set("date", httpdate::fmt_http_date(SystemTime::now()));
        response.headers.set("server", &self.config.server_name);
        response.headers.set("connection", "close");

        let timeout = self.config.write_timeout;
        write_all(stream, response.build_head().as_bytes(), timeout).await?;

        if send_body {
            match response.body {
                Body::Full(bytes) => write_all(stream, &bytes, timeout).await?,
                Body::Stream(chunks) => write_stream(stream, chunks, timeout).await?,
            }
        }
        stream.flush().await
    }
}

async fn write_all(stream: &mut TcpStream, bytes: &[u8], timeout: Duration) -> std::io::Result<()> {
    future::timeout(timeout, stream.write_all(bytes))
        .await
        .unwrap_or_else(|_| Err(std::io::ErrorKind::TimedOut.into()))
}

/// Pulls chunks one at a time so the body is never buffered whole. On any
/// error the stream is dropped here, which releases its source.
async fn write_stream(
    stream: &mut TcpStream,
    mut chunks: ChunkStream,
    timeout: Duration,
) -> std::io::Result<()> {
    loop {
        let (rest, next) = task::spawn_blocking(move || {
            let next = chunks.next();
            (chunks, next)
        })
        .await;
        chunks = rest;

        match next {
            Some(Ok(bytes)) => write_all(stream, &bytes, timeout).await?,
            Some(Err(err)) => return Err(err),
            None => return Ok(()),
        }
    }
}
