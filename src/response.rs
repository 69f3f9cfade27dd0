use std::fmt::Write;

use bytes::{Bytes, BytesMut};
use http::StatusCode;

use crate::constants;

/// A complete HTTP/1.0 response, always sent with `Connection: close`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    headers: &'static [(&'static str, &'static str)],
    body: String,
}

const PREFLIGHT_HEADERS: &[(&str, &str)] = &[
    ("Content-Type", "text/html"),
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Headers", "content-type"),
];

impl Response {
    pub(crate) fn html(status: StatusCode, message: &str) -> Response {
        Response {
            status,
            headers: &[],
            body: format!("<html>{}</html>\r\n", message),
        }
    }

    /// `200 OK` with the upload form.
    pub(crate) fn upload_form() -> Response {
        Response {
            status: StatusCode::OK,
            headers: &[],
            body: format!("{}\r\n", constants::INDEX_HTML),
        }
    }

    /// `200 OK` answering a CORS preflight.
    pub(crate) fn preflight() -> Response {
        Response {
            status: StatusCode::OK,
            headers: PREFLIGHT_HEADERS,
            body: String::new(),
        }
    }

    /// `200 OK` confirming how many body bytes were consumed.
    pub(crate) fn uploaded(consumed: u64, content_length: u64) -> Response {
        Response::html(
            StatusCode::OK,
            &format!("Upload OK {}/{} bytes", consumed, content_length),
        )
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Serializes the status line, headers and body.
    pub fn into_bytes(self) -> Bytes {
        let mut buf = BytesMut::with_capacity(64 + self.body.len());

        // Writing into a `BytesMut` cannot fail.
        let _ = write!(
            buf,
            "HTTP/1.0 {} {}\r\nConnection: close\r\n",
            self.status.as_str(),
            self.status.canonical_reason().unwrap_or("")
        );
        for (name, value) in self.headers {
            let _ = write!(buf, "{}: {}\r\n", name, value);
        }
        buf.extend_from_slice(constants::CRLF.as_bytes());
        buf.extend_from_slice(self.body.as_bytes());

        buf.freeze()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uploaded_response() {
        let bytes = Response::uploaded(10, 10).into_bytes();
        assert_eq!(
            &bytes[..],
            &b"HTTP/1.0 200 OK\r\nConnection: close\r\n\r\n<html>Upload OK 10/10 bytes</html>\r\n"[..]
        );
    }

    #[test]
    fn test_preflight_response() {
        let bytes = Response::preflight().into_bytes();
        assert_eq!(
            &bytes[..],
            &b"HTTP/1.0 200 OK\r\nConnection: close\r\nContent-Type: text/html\r\nAccess-Control-Allow-Origin: *\r\nAccess-Control-Allow-Headers: content-type\r\n\r\n"[..]
        );
    }

    #[test]
    fn test_bad_request_response() {
        let bytes = Response::html(StatusCode::BAD_REQUEST, "Not found: /x").into_bytes();
        assert!(bytes.starts_with(b"HTTP/1.0 400 Bad Request\r\n"));
        assert!(bytes.ends_with(b"<html>Not found: /x</html>\r\n"));
    }

    #[test]
    fn test_upload_form_response() {
        let resp = Response::upload_form();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.body().contains("enctype=\"multipart/form-data\""));
    }
}
