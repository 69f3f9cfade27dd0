use bytes::{Buf, BytesMut};

use crate::constants;
use crate::helpers;
use crate::limits::Limits;
use crate::observer::{Event, Observer};
use crate::part::FilePart;
use crate::sink::PartSink;

/// Splits a `multipart/form-data` body into [`FilePart`]s as it arrives.
///
/// The scanner keeps at most [`Limits::buffer_limit`] bytes. While a part is
/// open and no boundary is in sight, everything but the trailing
/// [`Limits::retained_margin`] bytes is handed to the part, so a marker that
/// straddles two chunks is still found whole on the next call.
///
/// # Examples
///
/// ```
/// use partstream::{Limits, MemorySink, MultipartScanner, NoopObserver};
///
/// let data = b"--X\r\nContent-Disposition: form-data; name=\"f\"; filename=\"a.txt\"\r\n\r\nhello\r\n--X--\r\n";
///
/// let mut sink = MemorySink::new();
/// let mut scanner = MultipartScanner::new("X", Limits::default()).unwrap();
///
/// for chunk in data.chunks(7) {
///     scanner.on_data(chunk, &mut sink, &NoopObserver).unwrap();
/// }
///
/// assert!(scanner.is_finished());
/// assert_eq!(sink.get("a.txt.out"), Some(&b"hello"[..]));
/// ```
#[derive(Debug)]
pub struct MultipartScanner {
    boundary_start: Vec<u8>,
    boundary_end: Vec<u8>,
    buf: BytesMut,
    limits: Limits,
    part: Option<FilePart>,
    next_part_idx: usize,
    finished: bool,
}

enum Marker {
    Start(usize),
    End(usize),
}

impl MultipartScanner {
    /// Creates a scanner for `boundary`, the bare token from the
    /// `Content-Type` header.
    ///
    /// The closing marker must be shorter than [`Limits::retained_margin`],
    /// which in turn must be shorter than [`Limits::buffer_limit`].
    pub fn new(boundary: &str, limits: Limits) -> crate::Result<MultipartScanner> {
        let boundary_start = constants::boundary_start(boundary);
        let boundary_end = constants::boundary_end(boundary);

        if boundary_end.len() >= limits.margin {
            return Err(crate::Error::BoundaryTooLong {
                len: boundary.len(),
                margin: limits.margin,
            });
        }

        if limits.margin >= limits.buffer {
            return Err(crate::Error::InvalidLimits {
                buffer: limits.buffer,
                margin: limits.margin,
            });
        }

        Ok(MultipartScanner {
            boundary_start,
            boundary_end,
            buf: BytesMut::with_capacity(limits.buffer),
            limits,
            part: None,
            next_part_idx: 0,
            finished: false,
        })
    }

    /// Whether the closing boundary has been consumed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The part currently receiving data.
    pub fn active_part(&self) -> Option<&FilePart> {
        self.part.as_ref()
    }

    /// Bytes held back, waiting for more input.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Consumes the next chunk of the body. An empty chunk only re-scans what
    /// is already buffered.
    pub fn on_data<S: PartSink + ?Sized>(
        &mut self,
        mut chunk: &[u8],
        sink: &mut S,
        observer: &dyn Observer,
    ) -> crate::Result<()> {
        loop {
            if self.finished {
                if !chunk.is_empty() {
                    observer.on_event(&Event::EpilogueDiscarded { len: chunk.len() });
                }
                return Ok(());
            }

            let room = self.limits.buffer.saturating_sub(self.buf.len());
            if room == 0 && !chunk.is_empty() {
                return Err(crate::Error::BufferLimitExceeded {
                    len: self.buf.len() + chunk.len(),
                    limit: self.limits.buffer,
                });
            }

            let take = room.min(chunk.len());
            self.buf.extend_from_slice(&chunk[..take]);
            chunk = &chunk[take..];

            self.scan(sink, observer)?;

            if chunk.is_empty() {
                return Ok(());
            }
        }
    }

    fn scan<S: PartSink + ?Sized>(&mut self, sink: &mut S, observer: &dyn Observer) -> crate::Result<()> {
        while !self.finished {
            match self.next_marker() {
                Some(Marker::Start(idx)) => {
                    self.close_part(idx, sink, observer)?;
                    self.buf.advance(self.boundary_start.len());

                    let part = FilePart::new(self.next_part_idx, self.limits.buffer);
                    observer.on_event(&Event::PartStarted { part: part.index() });
                    self.next_part_idx += 1;
                    self.part = Some(part);
                }
                Some(Marker::End(idx)) => {
                    self.close_part(idx, sink, observer)?;
                    self.buf.advance(self.boundary_end.len());
                    observer.on_event(&Event::BodyEnd);

                    if !self.buf.is_empty() {
                        observer.on_event(&Event::EpilogueDiscarded { len: self.buf.len() });
                    }
                    self.buf = BytesMut::new();
                    self.finished = true;
                }
                None => return self.flush_before_margin(sink, observer),
            }
        }

        Ok(())
    }

    fn next_marker(&self) -> Option<Marker> {
        let start = helpers::find_bytes(&self.buf, &self.boundary_start);
        let end = helpers::find_bytes(&self.buf, &self.boundary_end);

        match (start, end) {
            (Some(start), Some(end)) if end < start => Some(Marker::End(end)),
            (Some(start), _) => Some(Marker::Start(start)),
            (None, Some(end)) => Some(Marker::End(end)),
            (None, None) => None,
        }
    }

    /// Delivers everything before the marker at `idx` to the active part, less
    /// the CRLF that belongs to the marker, and closes the part.
    fn close_part<S: PartSink + ?Sized>(
        &mut self,
        idx: usize,
        sink: &mut S,
        observer: &dyn Observer,
    ) -> crate::Result<()> {
        let mut data = self.buf.split_to(idx);
        if data.ends_with(constants::CRLF.as_bytes()) {
            data.truncate(data.len() - constants::CRLF.len());
        }

        match self.part.take() {
            Some(mut part) => {
                part.on_data(&data, sink, observer)?;
                part.close(sink, observer)
            }
            None => {
                if !data.is_empty() {
                    observer.on_event(&Event::PreambleDiscarded { len: data.len() });
                }
                Ok(())
            }
        }
    }

    fn flush_before_margin<S: PartSink + ?Sized>(
        &mut self,
        sink: &mut S,
        observer: &dyn Observer,
    ) -> crate::Result<()> {
        let part = match self.part.as_mut() {
            Some(part) => part,
            None => return Ok(()),
        };

        if self.buf.len() <= self.limits.margin {
            return Ok(());
        }

        let data = self.buf.split_to(self.buf.len() - self.limits.margin);
        part.on_data(&data, sink, observer)
    }
}
