use std::sync::Arc;

use bytes::{Buf, Bytes, BytesMut};
use http::Method;

use crate::head::HeadInfo;
use crate::limits::Limits;
use crate::multipart::MultipartScanner;
use crate::observer::{self, Event, Observer};
use crate::response::Response;
use crate::sink::PartSink;
use crate::state::RequestState;
use crate::{constants, helpers};

/// Drives one request from raw connection bytes to a response.
///
/// Feed every chunk read from the connection to [`on_data`](RequestMachine::on_data)
/// in order. It returns `Ok(None)` while more input is needed and
/// `Ok(Some(bytes))` once the response is ready, after which the connection
/// should be closed. Uploaded parts are written to the sink as they arrive.
///
/// On `Err` the machine is done. Write [`Error::response`](crate::Error::response)
/// if there is one, otherwise drop the connection.
///
/// # Examples
///
/// ```
/// use partstream::{MemorySink, RequestMachine};
///
/// let body = "--X\r\nContent-Disposition: form-data; name=\"files\"; filename=\"a.txt\"\r\n\r\nhello\r\n--X--\r\n";
/// let head = format!(
///     "POST / HTTP/1.0\r\nContent-Type: multipart/form-data; boundary=X\r\nContent-Length: {}\r\n\r\n",
///     body.len()
/// );
///
/// let mut machine = RequestMachine::new(MemorySink::new());
/// assert_eq!(machine.on_data(head.as_bytes()).unwrap(), None);
///
/// let response = machine.on_data(body.as_bytes()).unwrap().unwrap();
/// assert!(response.starts_with(b"HTTP/1.0 200 OK"));
/// assert_eq!(machine.sink().get("a.txt.out"), Some(&b"hello"[..]));
/// ```
pub struct RequestMachine<S> {
    state: RequestState,
    head_buf: BytesMut,
    head: Option<HeadInfo>,
    scanner: Option<MultipartScanner>,
    consumed: u64,
    content_length: u64,
    sink: S,
    limits: Limits,
    observer: Arc<dyn Observer>,
}

impl<S: PartSink> RequestMachine<S> {
    /// Creates a machine with the default [`Limits`] writing parts to `sink`.
    pub fn new(sink: S) -> RequestMachine<S> {
        RequestMachine {
            state: RequestState::AwaitingHead,
            head_buf: BytesMut::new(),
            head: None,
            scanner: None,
            consumed: 0,
            content_length: 0,
            sink,
            limits: Limits::default(),
            observer: observer::default_observer(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> RequestMachine<S> {
        self.limits = limits;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> RequestMachine<S> {
        self.observer = observer;
        self
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    /// The parsed request head, once available.
    pub fn head(&self) -> Option<&HeadInfo> {
        self.head.as_ref()
    }

    /// The multipart scanner, for `POST` requests with a multipart body.
    ///
    /// After the response, [`MultipartScanner::is_finished`] tells whether
    /// the closing boundary was actually seen.
    pub fn scanner(&self) -> Option<&MultipartScanner> {
        self.scanner.as_ref()
    }

    /// Body bytes consumed so far.
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Consumes the next chunk of the connection.
    ///
    /// The upload response is produced as soon as `Content-Length` body bytes
    /// have been consumed, whether or not the closing boundary was among
    /// them. A body cut short of its closing boundary still gets the 200, but
    /// its last part is never closed: the bytes retained for boundary
    /// detection are dropped and the sink is not finalized. Check
    /// `scanner().map_or(true, |s| s.is_finished())` to tell the two apart.
    pub fn on_data(&mut self, data: &[u8]) -> crate::Result<Option<Bytes>> {
        let res = match self.state {
            RequestState::AwaitingHead => self.on_head_data(data),
            RequestState::AwaitingBody => self.on_body_data(data),
            RequestState::Done => return Ok(None),
        };

        if let Err(err) = &res {
            self.observer.on_event(&Event::Rejected { error: err });
            self.state = RequestState::Done;
        }

        res
    }

    fn on_head_data(&mut self, data: &[u8]) -> crate::Result<Option<Bytes>> {
        self.head_buf.extend_from_slice(data);

        let head_end = match helpers::find_bytes(&self.head_buf, constants::CRLF_CRLF.as_bytes()) {
            Some(idx) if idx <= self.limits.head => idx,
            None if self.head_buf.len() <= self.limits.head + constants::CRLF_CRLF.len() => return Ok(None),
            _ => return Err(crate::Error::HeadTooLarge { limit: self.limits.head }),
        };

        let mut buf = std::mem::take(&mut self.head_buf);
        let head = HeadInfo::parse(&buf[..head_end])?;
        buf.advance(head_end + constants::CRLF_CRLF.len());

        self.observer.on_event(&Event::HeadParsed {
            method: head.method(),
            path: head.path(),
            protocol: head.protocol(),
        });

        let routed = match (head.method(), head.path()) {
            (&Method::POST, _) => self.open_body(&head).map(|()| None),
            (&Method::GET, "/") => Ok(Some(Response::upload_form())),
            (&Method::OPTIONS, _) => Ok(Some(Response::preflight())),
            _ => Err(crate::Error::UnknownRoute {
                path: head.path().to_owned(),
            }),
        };
        self.head = Some(head);

        match routed {
            Ok(None) => {
                self.state = RequestState::AwaitingBody;
                self.on_body_data(&buf)
            }
            Ok(Some(response)) => Ok(Some(self.respond(response))),
            Err(err @ crate::Error::UnsupportedContentType { .. }) | Err(err @ crate::Error::UnknownRoute { .. }) => {
                self.observer.on_event(&Event::Rejected { error: &err });
                match err.response() {
                    Some(response) => Ok(Some(self.respond(response))),
                    None => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }

    fn open_body(&mut self, head: &HeadInfo) -> crate::Result<()> {
        let content_type = head.header("Content-Type");
        let boundary = match content_type {
            Some(content_type) if content_type.contains(constants::MULTIPART_FORM_DATA) => {
                crate::parse_boundary(content_type)?
            }
            _ => {
                return Err(crate::Error::UnsupportedContentType {
                    content_type: content_type.map(str::to_owned),
                });
            }
        };

        let content_length = head.header("Content-Length");
        self.content_length = content_length
            .and_then(|value| value.trim().parse::<u64>().ok())
            .ok_or_else(|| crate::Error::MissingOrInvalidContentLength {
                value: content_length.map(str::to_owned),
            })?;

        self.scanner = Some(MultipartScanner::new(&boundary, self.limits)?);
        Ok(())
    }

    fn on_body_data(&mut self, data: &[u8]) -> crate::Result<Option<Bytes>> {
        let remaining = self.content_length - self.consumed;
        let take = (data.len() as u64).min(remaining) as usize;
        let (body, excess) = data.split_at(take);

        if !excess.is_empty() {
            self.observer.on_event(&Event::ExcessDiscarded { len: excess.len() });
        }

        self.consumed += take as u64;
        self.observer.on_event(&Event::BodyProgress {
            len: take,
            consumed: self.consumed,
            content_length: self.content_length,
        });

        let finished = match self.scanner.as_mut() {
            Some(scanner) => {
                scanner.on_data(body, &mut self.sink, &*self.observer)?;
                scanner.is_finished()
            }
            None => false,
        };

        if self.consumed < self.content_length {
            return Ok(None);
        }

        self.observer.on_event(&Event::BodyComplete {
            consumed: self.consumed,
            finished,
        });
        Ok(Some(self.respond(Response::uploaded(self.consumed, self.content_length))))
    }

    fn respond(&mut self, response: Response) -> Bytes {
        self.observer.on_event(&Event::Responded {
            status: response.status(),
        });
        self.state = RequestState::Done;
        response.into_bytes()
    }
}
