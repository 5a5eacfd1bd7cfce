//! Turns what a handler returned into a response.
//!
//! Precedence: an `error` or `redirect` recorded on the context wins over
//! the returned value. Otherwise JSON values are serialized (and the
//! content type switched to `application/json`), text is sent as a single
//! chunk and streams are passed through untouched.

use crate::error::Result;
use crate::handler::context::{Directive, HandlerContext};
use crate::handler::reply::Reply;
use crate::http::headers::HttpHeaders;
use crate::http::response::{Body, ChunkStream, HttpResponse};
use crate::http::status::Status;

/// The single body variant produced for a request.
#[derive(Debug)]
pub enum Response {
    Text(String),
    /// Already serialized JSON.
    Json(Vec<u8>),
    Redirect(String),
    Stream(ChunkStream),
    Error { code: u16, message: String },
}

/// Status, headers and body of a dispatched request.
#[derive(Debug)]
pub struct Outcome {
    pub status: Status,
    pub headers: HttpHeaders,
    pub response: Response,
}

impl Outcome {
    /// Generic plain-text error, detached from any handler state.
    pub fn error(status: Status, message: String) -> Self {
        let mut headers = HttpHeaders::new();
        headers.set("content-type", "text/plain");
        Self {
            response: Response::Error {
                code: status.code(),
                message,
            },
            status,
            headers,
        }
    }

    pub fn into_http(self) -> HttpResponse {
        let body = match self.response {
            Response::Text(text) => Body::Full(text.into_bytes()),
            Response::Json(bytes) => Body::Full(bytes),
            Response::Redirect(_) => Body::empty(),
            Response::Stream(stream) => Body::Stream(stream),
            Response::Error { message, .. } => Body::Full(message.into_bytes()),
        };

        let mut res = HttpResponse {
            status: self.status,
            headers: self.headers,
            body,
        };
        res.fill_content_length();
        res
    }
}

pub struct ResponseCodec;

impl ResponseCodec {
    pub fn encode(reply: Reply, ctx: &mut HandlerContext<'_>) -> Result<Response> {
        if let Some(directive) = ctx.take_directive() {
            return Ok(match directive {
                Directive::Error { code, message } => Response::Error { code, message },
                Directive::Redirect(url) => Response::Redirect(url),
            });
        }

        Ok(match reply {
            Reply::Json(value) => {
                let bytes = value.to_json()?;
                ctx.set_header("content-type", "application/json");
                Response::Json(bytes)
            }
            Reply::Text(text) => Response::Text(text),
            Reply::Stream(stream) => Response::Stream(stream),
            Reply::Empty => Response::Text(String::new()),
        })
    }
}
