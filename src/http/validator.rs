use crate::http::HttpMethod;
use crate::http::HttpVersion;
use crate::http::request::HttpRequest;
use crate::http::status::Status;

#[derive(Debug, PartialEq)]
pub enum ValidatorError {
    HttpVersionNotSupported,
    MissingHost,
    BodyNotAllowed,
    UnsupportedTransferEncoding,
}

impl ValidatorError {
    pub fn into_http_status(self) -> Status {
        match self {
            ValidatorError::HttpVersionNotSupported => Status::HTTP_VERSION_NOT_SUPPORTED,
            ValidatorError::MissingHost => Status::BAD_REQUEST,
            ValidatorError::BodyNotAllowed => Status::BAD_REQUEST,
            ValidatorError::UnsupportedTransferEncoding => Status::BAD_REQUEST,
        }
    }
}

/// Checks a request once its headers are known, before any body is read.
pub struct Validator;

impl Validator {
    fn validate_http_version(v: (u8, u8)) -> Result<HttpVersion, ValidatorError> {
        match HttpVersion::from_pair(v) {
            Some(version @ (HttpVersion::V1_0 | HttpVersion::V1_1)) => Ok(version),
            _ => Err(ValidatorError::HttpVersionNotSupported),
        }
    }

    fn validate_http_method(
        content_length: Option<&str>,
        method: &HttpMethod,
    ) -> Result<(), ValidatorError> {
        match method {
            HttpMethod::Get | HttpMethod::Head => match content_length {
                Some(n) if n != "0" => Err(ValidatorError::BodyNotAllowed),
                _ => Ok(()),
            },
            _ => Ok(()),
        }
    }

    pub fn validate_request(req: &HttpRequest) -> Result<(), ValidatorError> {
        let version = Self::validate_http_version(req.http_version)?;

        if version == HttpVersion::V1_1 && !req.headers.contains("host") {
            return Err(ValidatorError::MissingHost);
        }

        // Request bodies are only accepted with a declared length.
        if req.headers.contains("transfer-encoding") {
            return Err(ValidatorError::UnsupportedTransferEncoding);
        }

        Self::validate_http_method(req.content_length(), &req.method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: HttpMethod, version: (u8, u8), headers: &[(&str, &str)]) -> HttpRequest {
        let mut req = HttpRequest::with_target(method, "/");
        req.http_version = version;
        for (name, value) in headers {
            req.headers.set(name, value);
        }
        req
    }

    #[test]
    fn http11_requires_host() {
        let req = request(HttpMethod::Get, (1, 1), &[]);
        assert_eq!(Validator::validate_request(&req), Err(ValidatorError::MissingHost));

        let req = request(HttpMethod::Get, (1, 0), &[]);
        assert_eq!(Validator::validate_request(&req), Ok(()));
    }

    #[test]
    fn get_with_body_is_rejected() {
        let req = request(HttpMethod::Get, (1, 1), &[("host", "x"), ("content-length", "3")]);
        assert_eq!(Validator::validate_request(&req), Err(ValidatorError::BodyNotAllowed));
    }

    #[test]
    fn post_without_body_is_fine() {
        let req = request(HttpMethod::Post, (1, 1), &[("host", "x")]);
        assert_eq!(Validator::validate_request(&req), Ok(()));
    }

    #[test]
    fn chunked_uploads_are_rejected() {
        let req = request(
            HttpMethod::Post,
            (1, 1),
            &[("host", "x"), ("transfer-encoding", "chunked")],
        );
        assert_eq!(
            Validator::validate_request(&req),
            Err(ValidatorError::UnsupportedTransferEncoding)
        );
    }
}
