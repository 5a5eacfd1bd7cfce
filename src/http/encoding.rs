//! Optional compression of buffered response bodies.
//!
//! Streamed bodies are never compressed: their `content-length` is already
//! on the wire before the first chunk is produced.

use flate2::Compression;
use flate2::write::{DeflateEncoder, GzEncoder};
use std::io::Write;

use tracing::warn;

use crate::http::request::HttpRequest;
use crate::http::response::{Body, HttpResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncoding {
    Gzip,
    Deflate,
}

impl ContentEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentEncoding::Gzip => "gzip",
            ContentEncoding::Deflate => "deflate",
        }
    }

    /// Preferred encoding listed in an `accept-encoding` value, if any.
    pub fn negotiate(accept: &str) -> Option<ContentEncoding> {
        let offered: Vec<&str> = accept
            .split(',')
            .map(|token| token.split(';').next().unwrap_or("").trim())
            .collect();

        if offered.iter().any(|t| t.eq_ignore_ascii_case("gzip")) {
            Some(ContentEncoding::Gzip)
        } else if offered.iter().any(|t| t.eq_ignore_ascii_case("deflate")) {
            Some(ContentEncoding::Deflate)
        } else {
            None
        }
    }
}

pub fn apply(req: &HttpRequest, res: &mut HttpResponse) {
    let Some(algo) = req.headers.get("accept-encoding").and_then(ContentEncoding::negotiate)
    else {
        return;
    };
    if res.headers.contains("content-encoding") {
        return;
    }
    let Body::Full(body) = &res.body else {
        return;
    };
    if body.is_empty() {
        return;
    }

    match compress(body, algo) {
        Ok(compressed) => {
            res.body = Body::Full(compressed);
            res.headers.set("content-encoding", algo.as_str());
            res.headers.remove("content-length");
            res.fill_content_length();
        }
        Err(err) => warn!(%err, encoding = algo.as_str(), "compression failed, sending identity"),
    }
}

fn compress(body: &[u8], algo: ContentEncoding) -> std::io::Result<Vec<u8>> {
    match algo {
        ContentEncoding::Gzip => {
            let mut e = GzEncoder::new(Vec::new(), Compression::default());
            e.write_all(body)?;
            e.finish()
        }
        ContentEncoding::Deflate => {
            let mut e = DeflateEncoder::new(Vec::new(), Compression::default());
            e.write_all(body)?;
            e.finish()
        }
    }
}
