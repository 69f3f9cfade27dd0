use std::fmt::{self, Debug, Display, Formatter};
use std::io;

use http::StatusCode;

use crate::response::Response;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A set of errors that can occur while parsing a request and its multipart
/// body.
#[non_exhaustive]
pub enum Error {
    /// The request line does not have exactly three space separated tokens,
    /// a header line has no `": "` separator, or the head is not valid UTF-8.
    MalformedRequestLine { line: String },

    /// The request head grew past the configured limit before its terminator
    /// was found.
    HeadTooLarge { limit: usize },

    /// A `POST` body without a numeric `Content-Length` header.
    MissingOrInvalidContentLength { value: Option<String> },

    /// The `Content-Type` header is not `multipart/form-data`.
    UnsupportedContentType { content_type: Option<String> },

    /// Failed to convert the `Content-Type` to [`mime::Mime`] type.
    DecodeContentType(mime::FromStrError),

    /// No boundary found in `Content-Type` header.
    NoBoundary,

    /// The boundary markers would not fit in the retained scan margin.
    BoundaryTooLong { len: usize, margin: usize },

    /// The retained scan margin is not shorter than the scan buffer, so the
    /// buffer could never be drained into a part.
    InvalidLimits { buffer: usize, margin: usize },

    /// No route matches the request method and path.
    UnknownRoute { path: String },

    /// A scan or part header buffer grew past its limit. The connection must
    /// be aborted.
    BufferLimitExceeded { len: usize, limit: usize },

    /// A part's headers carry no usable `filename` attribute.
    UnresolvedPartFilename { part: usize },

    /// A part was closed before its header block was complete.
    IncompletePartHeaders { part: usize },

    /// The part sink failed to store data.
    SinkWrite { id: String, cause: io::Error },

    /// Stream read failed.
    StreamReadFailed(BoxError),

    /// The byte stream ended before the request was complete.
    IncompleteStream,
}

impl Error {
    /// Returns the response to send for this error, if the connection should
    /// be answered at all.
    ///
    /// Fatal errors return `None`: the connection must be closed without a
    /// response.
    pub fn response(&self) -> Option<Response> {
        let status = match self {
            Error::BufferLimitExceeded { .. } | Error::StreamReadFailed(_) | Error::IncompleteStream => return None,
            Error::HeadTooLarge { .. } => StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE,
            Error::SinkWrite { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };

        let body = match self {
            Error::UnsupportedContentType { content_type } => {
                format!("Content-Type not supported: {}", content_type.as_deref().unwrap_or(""))
            }
            Error::UnknownRoute { path } => format!("Not found: {}", path),
            Error::SinkWrite { .. } => "Failed to store upload".to_owned(),
            err => err.to_string(),
        };

        Some(Response::html(status, &body))
    }

    /// Whether the error must abort the connection without a response.
    pub fn is_fatal(&self) -> bool {
        self.response().is_none()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::MalformedRequestLine { line } => write!(f, "malformed request line: {:?}", line),
            Error::HeadTooLarge { limit } => write!(f, "request head exceeded the maximum size limit: {} bytes", limit),
            Error::MissingOrInvalidContentLength { value } => match value {
                Some(value) => write!(f, "invalid Content-Length: {:?}", value),
                None => f.write_str("missing Content-Length"),
            },
            Error::UnsupportedContentType { content_type } => write!(
                f,
                "Content-Type is not multipart/form-data: {}",
                content_type.as_deref().unwrap_or("<none>")
            ),
            Error::DecodeContentType(err) => {
                write!(f, "Failed to convert Content-Type to `mime::Mime` type: {}", err)
            }
            Error::NoBoundary => f.write_str("multipart boundary not found in Content-Type"),
            Error::BoundaryTooLong { len, margin } => write!(
                f,
                "multipart boundary of {} bytes does not fit the {} byte scan margin",
                len, margin
            ),
            Error::InvalidLimits { buffer, margin } => write!(
                f,
                "scan margin of {} bytes must be shorter than the {} byte scan buffer",
                margin, buffer
            ),
            Error::UnknownRoute { path } => write!(f, "no route for path: {}", path),
            Error::BufferLimitExceeded { len, limit } => {
                write!(f, "buffer exceeded the maximum size limit: {}/{} bytes", len, limit)
            }
            Error::UnresolvedPartFilename { part } => write!(f, "part {} has no filename", part),
            Error::IncompletePartHeaders { part } => write!(f, "part {} ended before its headers", part),
            Error::SinkWrite { id, cause } => write!(f, "failed to write part '{}': {}", id, cause),
            Error::StreamReadFailed(err) => write!(f, "stream read failed: {}", err),
            Error::IncompleteStream => f.write_str("incomplete request stream"),
        }
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::DecodeContentType(err) => Some(err),
            Error::SinkWrite { cause, .. } => Some(cause),
            Error::StreamReadFailed(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string().eq(&other.to_string())
    }
}

impl Eq for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_errors_have_no_response() {
        assert!(Error::BufferLimitExceeded { len: 2049, limit: 2048 }.is_fatal());
        assert!(Error::IncompleteStream.is_fatal());
        assert!(!Error::NoBoundary.is_fatal());
    }

    #[test]
    fn test_error_statuses() {
        let status = |err: Error| err.response().map(|resp| resp.status());

        assert_eq!(
            status(Error::MalformedRequestLine { line: "GET /".into() }),
            Some(StatusCode::BAD_REQUEST)
        );
        assert_eq!(
            status(Error::MissingOrInvalidContentLength { value: None }),
            Some(StatusCode::BAD_REQUEST)
        );
        assert_eq!(
            status(Error::InvalidLimits { buffer: 128, margin: 128 }),
            Some(StatusCode::BAD_REQUEST)
        );
        assert_eq!(
            status(Error::HeadTooLarge { limit: 8192 }),
            Some(StatusCode::REQUEST_HEADER_FIELDS_TOO_LARGE)
        );
        assert_eq!(
            status(Error::SinkWrite {
                id: "a.out".into(),
                cause: io::Error::new(io::ErrorKind::Other, "disk full"),
            }),
            Some(StatusCode::INTERNAL_SERVER_ERROR)
        );
    }

    #[test]
    fn test_route_error_bodies() {
        let resp = Error::UnknownRoute { path: "/nope".into() }.response().unwrap();
        assert!(resp.body().contains("Not found: /nope"));

        let resp = Error::UnsupportedContentType {
            content_type: Some("text/plain".into()),
        }
        .response()
        .unwrap();
        assert!(resp.body().contains("Content-Type not supported: text/plain"));
    }
}
