//! Incremental HTTP/1.x request parser.
//!
//! Bytes are fed as they arrive from the socket; the parser walks the
//! request line, the header block and then `content-length` bytes of body.
//! It reports [`ParserOutcome::HeadersDone`] once, between headers and body,
//! so the caller can validate the request before any body is buffered.

use crate::config::ServerConfig;
use crate::http::request::HttpRequest;
use crate::http::status::Status;
use crate::http::*;

#[derive(PartialEq, Debug)]
pub enum ParserOutcome {
    Incomplete,
    HeadersDone,
    Done,
}

// Parser errors stay independent from status codes and are mapped later.
#[derive(PartialEq, Debug)]
pub enum ParserError {
    Malformed,
    TooLongUri,
    HeadersTooLarge,
    PayloadTooLarge,
    HttpVersionNotSupported,
}

impl ParserError {
    pub fn into_http_status(self) -> Status {
        match self {
            ParserError::Malformed => Status::BAD_REQUEST,
            ParserError::TooLongUri => Status::URI_TOO_LONG,
            ParserError::HeadersTooLarge => Status::REQUEST_HEADER_FIELDS_TOO_LARGE,
            ParserError::PayloadTooLarge => Status::PAYLOAD_TOO_LARGE,
            ParserError::HttpVersionNotSupported => Status::HTTP_VERSION_NOT_SUPPORTED,
        }
    }
}

#[derive(PartialEq, PartialOrd, Debug)]
enum ParserState {
    RequestLine,
    Headers,
    Body,
    Done,
}

#[derive(Debug, Clone, Copy)]
pub struct ParserLimits {
    pub max_path_size: usize,
    pub max_header_size: usize,
    pub max_body_size: usize,
}

impl From<&ServerConfig> for ParserLimits {
    fn from(cfg: &ServerConfig) -> Self {
        Self {
            max_path_size: cfg.max_path_size,
            max_header_size: cfg.max_header_size,
            max_body_size: cfg.max_body_size,
        }
    }
}

pub struct RequestParser {
    buf: Vec<u8>,
    state: ParserState,
    limits: ParserLimits,
    content_length: usize,
}

// "METHOD " + " HTTP/x.y\r\n"
const REQUEST_LINE_OVERHEAD: usize = HTTP_METHOD_MAX_LEN + 1 + 11;

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

impl RequestParser {
    pub fn new(limits: ParserLimits) -> Self {
        Self {
            buf: Vec::new(),
            state: ParserState::RequestLine,
            limits,
            content_length: 0,
        }
    }

    fn parse_request_line(&mut self, req: &mut HttpRequest) -> Result<bool, ParserError> {
        let Some(end) = find(&self.buf, b"\r\n") else {
            if self.buf.len() > self.limits.max_path_size + REQUEST_LINE_OVERHEAD {
                return Err(ParserError::TooLongUri);
            }
            return Ok(false);
        };

        // Request line: METHOD TARGET HTTP/VERSION
        let line = std::str::from_utf8(&self.buf[..end]).map_err(|_| ParserError::Malformed)?;
        let parts: Vec<&str> = line.split(' ').collect();
        if parts.len() != 3 {
            return Err(ParserError::Malformed);
        }

        let method = HttpMethod::from_token(parts[0]).ok_or(ParserError::Malformed)?;

        let target = parts[1];
        if target.len() > self.limits.max_path_size {
            return Err(ParserError::TooLongUri);
        }
        if !target.starts_with('/') {
            return Err(ParserError::Malformed);
        }

        let (major, minor) = parts[2]
            .strip_prefix("HTTP/")
            .and_then(|v| v.split_once('.'))
            .and_then(|(maj, min)| Some((maj.parse::<u8>().ok()?, min.parse::<u8>().ok()?)))
            .ok_or(ParserError::Malformed)?;
        if major != 1 {
            return Err(ParserError::HttpVersionNotSupported);
        }

        req.method = method;
        req.set_target(target);
        req.http_version = (major, minor);

        self.buf.drain(..end + 2);
        self.state = ParserState::Headers;
        Ok(true)
    }

    fn parse_headers(&mut self, req: &mut HttpRequest) -> Result<bool, ParserError> {
        // An empty header block is just the terminating blank line.
        let (block_end, consumed) = if self.buf.starts_with(b"\r\n") {
            (0, 2)
        } else {
            match find(&self.buf, b"\r\n\r\n") {
                Some(end) => (end, end + 4),
                None => {
                    if self.buf.len() > self.limits.max_header_size {
                        return Err(ParserError::HeadersTooLarge);
                    }
                    return Ok(false);
                }
            }
        };

        if block_end > self.limits.max_header_size {
            return Err(ParserError::HeadersTooLarge);
        }

        let block =
            std::str::from_utf8(&self.buf[..block_end]).map_err(|_| ParserError::Malformed)?;
        for line in block.split("\r\n") {
            if line.is_empty() {
                continue;
            }
            let (name, value) = line.split_once(':').ok_or(ParserError::Malformed)?;
            let name = name.trim();
            if name.is_empty() || name.contains(char::is_whitespace) {
                return Err(ParserError::Malformed);
            }
            req.headers.set(name, value.trim());
        }

        self.content_length = match req.content_length() {
            Some(value) => value.parse::<usize>().map_err(|_| ParserError::Malformed)?,
            None => 0,
        };
        if self.content_length > self.limits.max_body_size {
            return Err(ParserError::PayloadTooLarge);
        }

        self.buf.drain(..consumed);
        self.state = if self.content_length > 0 {
            ParserState::Body
        } else {
            ParserState::Done
        };
        Ok(true)
    }

    fn parse_body(&mut self, req: &mut HttpRequest) -> bool {
        let missing = self.content_length - req.body.len();
        let to_copy = missing.min(self.buf.len());

        req.body.extend(self.buf.drain(..to_copy));
        if req.body.len() == self.content_length {
            self.state = ParserState::Done;
            return true;
        }
        false
    }

    pub fn feed(
        &mut self,
        data: &[u8],
        req: &mut HttpRequest,
    ) -> Result<ParserOutcome, ParserError> {
        self.buf.extend_from_slice(data);

        // Iteratively parse request based on current state while data is available
        loop {
            match self.state {
                ParserState::RequestLine => {
                    if !self.parse_request_line(req)? {
                        return Ok(ParserOutcome::Incomplete);
                    }
                }
                ParserState::Headers => {
                    if !self.parse_headers(req)? {
                        return Ok(ParserOutcome::Incomplete);
                    }
                    return Ok(ParserOutcome::HeadersDone);
                }
                ParserState::Body => {
                    if !self.parse_body(req) {
                        return Ok(ParserOutcome::Incomplete);
                    }
                }
                ParserState::Done => return Ok(ParserOutcome::Done),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> ParserLimits {
        ParserLimits::from(&ServerConfig::default())
    }

    fn parse_all(raw: &[u8]) -> Result<HttpRequest, ParserError> {
        let mut parser = RequestParser::new(limits());
        let mut req = HttpRequest::new();
        let mut data = raw;
        loop {
            match parser.feed(data, &mut req)? {
                ParserOutcome::Done => return Ok(req),
                ParserOutcome::HeadersDone => data = &[],
                ParserOutcome::Incomplete => panic!("request should be complete"),
            }
        }
    }

    #[test]
    fn parses_request_line_and_headers() {
        let req = parse_all(b"GET /page/5?q=1 HTTP/1.1\r\nHost: x\r\nX-Thing: a b \r\n\r\n").unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "/page/5");
        assert_eq!(req.query, "q=1");
        assert_eq!(req.http_version, (1, 1));
        assert_eq!(req.headers.get("x-thing"), Some("a b"));
    }

    #[test]
    fn request_without_headers() {
        let req = parse_all(b"GET / HTTP/1.0\r\n\r\n").unwrap();
        assert_eq!(req.path, "/");
        assert!(req.headers.is_empty());
    }

    #[test]
    fn body_arrives_in_pieces() {
        let mut parser = RequestParser::new(limits());
        let mut req = HttpRequest::new();

        let head = b"POST /p HTTP/1.1\r\nHost: x\r\nContent-Length: 5\r\n\r\nhe";
        assert_eq!(parser.feed(&head[..10], &mut req), Ok(ParserOutcome::Incomplete));
        assert_eq!(parser.feed(&head[10..], &mut req), Ok(ParserOutcome::HeadersDone));
        assert_eq!(parser.feed(&[], &mut req), Ok(ParserOutcome::Incomplete));
        assert_eq!(parser.feed(b"llo", &mut req), Ok(ParserOutcome::Done));
        assert_eq!(req.body, b"hello");
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_all(b"GET /\r\n\r\n").unwrap_err(), ParserError::Malformed);
        assert_eq!(parse_all(b"BREW / HTTP/1.1\r\n\r\n").unwrap_err(), ParserError::Malformed);
        assert_eq!(
            parse_all(b"GET / HTTP/1.1\r\nno-colon\r\n\r\n").unwrap_err(),
            ParserError::Malformed
        );
    }

    #[test]
    fn rejects_unsupported_version() {
        assert_eq!(
            parse_all(b"GET / HTTP/2.0\r\n\r\n").unwrap_err(),
            ParserError::HttpVersionNotSupported
        );
    }

    #[test]
    fn enforces_limits() {
        let long = format!("GET /{} HTTP/1.1\r\n\r\n", "a".repeat(2000));
        assert_eq!(parse_all(long.as_bytes()).unwrap_err(), ParserError::TooLongUri);

        let big = b"POST / HTTP/1.1\r\nContent-Length: 99999999\r\n\r\n";
        assert_eq!(parse_all(big).unwrap_err(), ParserError::PayloadTooLarge);
    }
}
