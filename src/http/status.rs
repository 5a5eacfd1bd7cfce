use std::borrow::Cow;
use std::fmt;

/// A status code paired with the reason phrase written on the status line.
///
/// Handlers only get reasons for free for the codes in [`Status::from_code`];
/// any other code must come with its own reason via [`Status::custom`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    code: u16,
    reason: Cow<'static, str>,
}

impl Status {
    pub const OK: Status = Status::fixed(200, "OK");
    pub const REDIRECT: Status = Status::fixed(302, "Redirect");
    pub const UNAUTHORIZED: Status = Status::fixed(401, "Unauthorized");
    pub const FORBIDDEN: Status = Status::fixed(403, "Forbidden");
    pub const NOT_FOUND: Status = Status::fixed(404, "Not Found");
    pub const SERVER_ERROR: Status = Status::fixed(500, "Server error");

    // Transport-level statuses, produced before a request reaches a handler.
    pub const BAD_REQUEST: Status = Status::fixed(400, "Bad Request");
    pub const REQUEST_TIMEOUT: Status = Status::fixed(408, "Request Timeout");
    pub const PAYLOAD_TOO_LARGE: Status = Status::fixed(413, "Payload Too Large");
    pub const URI_TOO_LONG: Status = Status::fixed(414, "URI Too Long");
    pub const REQUEST_HEADER_FIELDS_TOO_LARGE: Status =
        Status::fixed(431, "Request Header Fields Too Large");
    pub const HTTP_VERSION_NOT_SUPPORTED: Status =
        Status::fixed(505, "HTTP Version Not Supported");

    const fn fixed(code: u16, reason: &'static str) -> Status {
        Status {
            code,
            reason: Cow::Borrowed(reason),
        }
    }

    /// Look up the reason for one of the handler-facing codes.
    pub fn from_code(code: u16) -> Option<Status> {
        match code {
            200 => Some(Status::OK),
            302 => Some(Status::REDIRECT),
            401 => Some(Status::UNAUTHORIZED),
            403 => Some(Status::FORBIDDEN),
            404 => Some(Status::NOT_FOUND),
            500 => Some(Status::SERVER_ERROR),
            _ => None,
        }
    }

    pub fn custom(code: u16, reason: impl Into<String>) -> Status {
        Status {
            code,
            reason: Cow::Owned(reason.into()),
        }
    }

    /// Known reason, or an empty reason phrase for codes outside the table.
    pub fn from_code_or_bare(code: u16) -> Status {
        Status::from_code(code).unwrap_or_else(|| Status::custom(code, ""))
    }

    pub fn code(&self) -> u16 {
        self.code
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// `"<code> <reason>"`, the status part of the status line.
impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.reason)
    }
}
