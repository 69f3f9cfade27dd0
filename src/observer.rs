//! Structured events emitted while a request is parsed.

use std::fmt::{self, Display, Formatter};

use http::{Method, StatusCode};

use crate::helpers::HexPreview;

/// Something that happened while parsing a request.
#[derive(Debug, Clone, Copy)]
#[non_exhaustive]
pub enum Event<'a> {
    /// The request head was parsed.
    HeadParsed { method: &'a Method, path: &'a str, protocol: &'a str },

    /// A response is about to be returned.
    Responded { status: StatusCode },

    /// The request failed with `error`.
    Rejected { error: &'a crate::Error },

    /// A body chunk was accepted.
    BodyProgress { len: usize, consumed: u64, content_length: u64 },

    /// Bytes past `Content-Length` were dropped.
    ExcessDiscarded { len: usize },

    /// `Content-Length` bytes were consumed. `finished` is `false` when the
    /// closing boundary never arrived, in which case the active part was
    /// neither closed nor given its retained tail.
    BodyComplete { consumed: u64, finished: bool },

    /// Bytes before the first boundary were dropped.
    PreambleDiscarded { len: usize },

    /// A boundary opened a new part.
    PartStarted { part: usize },

    /// A part's headers named its sink identifier.
    PartResolved { part: usize, id: &'a str },

    /// Bytes were handed to a part.
    PartData { part: usize, data: &'a [u8] },

    /// A part was closed and its sink finalized.
    PartClosed { part: usize, id: &'a str, written: u64 },

    /// The closing boundary was found.
    BodyEnd,

    /// Bytes after the closing boundary were dropped.
    EpilogueDiscarded { len: usize },
}

impl Display for Event<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Event::HeadParsed { method, path, protocol } => {
                write!(f, "got request {} {} {}", method, path, protocol)
            }
            Event::Responded { status } => write!(f, "responding {}", status),
            Event::Rejected { error } => write!(f, "request rejected: {}", error),
            Event::BodyProgress {
                len,
                consumed,
                content_length,
            } => write!(f, "body chunk {} bytes, {}/{}", len, consumed, content_length),
            Event::ExcessDiscarded { len } => write!(f, "discarding {} bytes past Content-Length", len),
            Event::BodyComplete { consumed, finished } => {
                write!(f, "body fully read, {} bytes, closing boundary seen: {}", consumed, finished)
            }
            Event::PreambleDiscarded { len } => write!(f, "discarding {} bytes before the first boundary", len),
            Event::PartStarted { part } => write!(f, "part {} started", part),
            Event::PartResolved { part, id } => write!(f, "part {} writing to {}", part, id),
            Event::PartData { part, data } => {
                write!(f, "part {} data {} bytes [{}]", part, data.len(), HexPreview(data))
            }
            Event::PartClosed { part, id, written } => {
                write!(f, "part {} closed, {} bytes written to {}", part, written, id)
            }
            Event::BodyEnd => f.write_str("found closing boundary"),
            Event::EpilogueDiscarded { len } => write!(f, "discarding {} bytes after the closing boundary", len),
        }
    }
}

/// Receives parser events.
///
/// An observer is shared by every request of a process, so it takes `&self`
/// and must be thread safe.
pub trait Observer: Send + Sync {
    fn on_event(&self, event: &Event<'_>);
}

/// Drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn on_event(&self, _: &Event<'_>) {}
}

/// Forwards events to the [`log`] facade under the `partstream` target.
#[cfg(feature = "log")]
#[cfg_attr(nightly, doc(cfg(feature = "log")))]
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

#[cfg(feature = "log")]
impl Observer for LogObserver {
    fn on_event(&self, event: &Event<'_>) {
        let level = match event {
            Event::PartData { .. } | Event::BodyProgress { .. } => log::Level::Trace,
            Event::Rejected { .. } | Event::ExcessDiscarded { .. } => log::Level::Warn,
            Event::BodyComplete { finished: false, .. } => log::Level::Warn,
            Event::Responded { .. } | Event::BodyComplete { .. } => log::Level::Info,
            _ => log::Level::Debug,
        };
        log::log!(target: "partstream", level, "{}", event);
    }
}

#[cfg(feature = "log")]
pub(crate) fn default_observer() -> std::sync::Arc<dyn Observer> {
    std::sync::Arc::new(LogObserver)
}

#[cfg(not(feature = "log"))]
pub(crate) fn default_observer() -> std::sync::Arc<dyn Observer> {
    std::sync::Arc::new(NoopObserver)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records the rendered events.
    #[derive(Default)]
    pub(crate) struct Recorder(pub(crate) Mutex<Vec<String>>);

    impl Observer for Recorder {
        fn on_event(&self, event: &Event<'_>) {
            self.0.lock().unwrap().push(event.to_string());
        }
    }

    impl Recorder {
        pub(crate) fn events(&self) -> Vec<String> {
            self.0.lock().unwrap().clone()
        }
    }

    #[test]
    fn test_event_display() {
        let event = Event::PartData { part: 1, data: b"\r\n" };
        assert_eq!(event.to_string(), "part 1 data 2 bytes [0xd 0xa]");

        let event = Event::Responded { status: StatusCode::OK };
        assert_eq!(event.to_string(), "responding 200 OK");

        let event = Event::BodyComplete { consumed: 69, finished: false };
        assert_eq!(event.to_string(), "body fully read, 69 bytes, closing boundary seen: false");
    }

    #[test]
    fn test_recorder() {
        let recorder = Recorder::default();
        recorder.on_event(&Event::BodyEnd);
        NoopObserver.on_event(&Event::BodyEnd);
        assert_eq!(recorder.events(), vec!["found closing boundary".to_owned()]);
    }
}
