use std::fmt;
use std::io;

use crate::http::headers::HttpHeaders;
use crate::http::status::Status;

/// Lazily produced response body chunks.
///
/// Single pass: once exhausted or dropped, the producer has released whatever
/// it was reading from.
pub struct ChunkStream {
    inner: Box<dyn Iterator<Item = io::Result<Vec<u8>>> + Send>,
}

impl ChunkStream {
    pub fn new<I>(chunks: I) -> Self
    where
        I: Iterator<Item = io::Result<Vec<u8>>> + Send + 'static,
    {
        Self {
            inner: Box::new(chunks),
        }
    }

    /// Drain the stream into one buffer.
    pub fn collect_bytes(self) -> io::Result<Vec<u8>> {
        let mut out = Vec::new();
        for chunk in self {
            out.extend_from_slice(&chunk?);
        }
        Ok(out)
    }
}

impl Iterator for ChunkStream {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl fmt::Debug for ChunkStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ChunkStream(..)")
    }
}

#[derive(Debug)]
pub enum Body {
    Full(Vec<u8>),
    Stream(ChunkStream),
}

impl Body {
    pub fn empty() -> Self {
        Body::Full(Vec::new())
    }

    pub fn into_bytes(self) -> io::Result<Vec<u8>> {
        match self {
            Body::Full(bytes) => Ok(bytes),
            Body::Stream(stream) => stream.collect_bytes(),
        }
    }
}

/// Wire-level response: status line, headers and body.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: Status,
    pub headers: HttpHeaders,
    pub body: Body,
}

impl HttpResponse {
    pub fn new(status: Status) -> Self {
        Self {
            status,
            headers: HttpHeaders::new(),
            body: Body::empty(),
        }
    }

    /// Plain-text response, used for transport-level failures.
    pub fn plain(status: Status, text: &str) -> Self {
        let mut res = Self::new(status);
        res.headers.set("content-type", "text/plain");
        res.body = Body::Full(text.as_bytes().to_vec());
        res
    }

    pub fn status_line(&self) -> String {
        self.status.to_string()
    }

    pub fn header_pairs(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    /// Sets `content-length` for buffered bodies that do not carry one yet.
    pub fn fill_content_length(&mut self) {
        if self.headers.contains("content-length") {
            return;
        }
        if let Body::Full(bytes) = &self.body {
            self.headers.set("content-length", bytes.len());
        }
    }

    // HTTP/1.1 <status> <reason>\r\n
    // <header_name>: <header_value>\r\n
    // ...
    // \r\n
    pub fn build_head(&self) -> String {
        format!("HTTP/1.1 {}\r\n{}\r\n", self.status, self.headers.stringify())
    }
}
