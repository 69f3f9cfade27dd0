//! An incremental, bounded-memory parser for `multipart/form-data` file
//! uploads.
//!
//! Raw connection bytes go into a [`RequestMachine`] in whatever chunks the
//! socket produces. The machine parses the request head, routes it, and for a
//! multipart `POST` runs the body through a [`MultipartScanner`] that cuts it
//! into [`FilePart`]s. Each part streams its payload into a [`PartSink`] as
//! soon as it is identified, so no part is ever held in memory whole.
//!
//! # Examples
//!
//! ```
//! use partstream::{MemorySink, RequestMachine};
//!
//! let body = "--X\r\nContent-Disposition: form-data; name=\"f\"; filename=\"a.txt\"\r\n\r\nhello\r\n--X--\r\n";
//! let request = format!(
//!     "POST / HTTP/1.0\r\nContent-Type: multipart/form-data; boundary=X\r\nContent-Length: {}\r\n\r\n{}",
//!     body.len(),
//!     body
//! );
//!
//! let mut machine = RequestMachine::new(MemorySink::new());
//! let mut response = None;
//! for chunk in request.as_bytes().chunks(16) {
//!     if let Some(bytes) = machine.on_data(chunk).unwrap() {
//!         response = Some(bytes);
//!     }
//! }
//!
//! assert!(response.unwrap().starts_with(b"HTTP/1.0 200 OK"));
//! assert_eq!(machine.sink().get("a.txt.out"), Some(&b"hello"[..]));
//! ```

#![cfg_attr(nightly, feature(doc_cfg))]

pub use bytes;

pub use error::Error;
pub use head::HeadInfo;
pub use limits::Limits;
pub use multipart::MultipartScanner;
#[cfg(feature = "log")]
pub use observer::LogObserver;
pub use observer::{Event, NoopObserver, Observer};
pub use part::FilePart;
pub use request::RequestMachine;
pub use response::Response;
pub use sink::{FileSink, MemorySink, PartSink};
pub use state::RequestState;
#[cfg(feature = "tokio-io")]
pub use stream::drive_reader;
pub use stream::drive;

mod constants;
mod content_disposition;
mod error;
mod head;
mod helpers;
mod limits;
mod multipart;
mod observer;
mod part;
mod request;
mod response;
mod sink;
mod state;
mod stream;

/// A Result type often returned from methods that can have `partstream` errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Parses the `Content-Type` header to extract the boundary value.
pub fn parse_boundary<T: AsRef<str>>(content_type: T) -> crate::Result<String> {
    let m = content_type
        .as_ref()
        .parse::<mime::Mime>()
        .map_err(crate::Error::DecodeContentType)?;

    if !(m.type_() == mime::MULTIPART && m.subtype() == mime::FORM_DATA) {
        return Err(crate::Error::UnsupportedContentType {
            content_type: Some(content_type.as_ref().to_owned()),
        });
    }

    m.get_param(mime::BOUNDARY)
        .map(|name| name.as_str().to_owned())
        .ok_or(crate::Error::NoBoundary)
}
