use bytes::{Buf, BytesMut};

use crate::content_disposition;
use crate::observer::{Event, Observer};
use crate::sink::PartSink;
use crate::{constants, helpers};

/// One part of a multipart body.
///
/// A part buffers bytes only until its own header block is complete. Once the
/// `filename` attribute is resolved every further byte goes straight to the
/// [`PartSink`] under the resolved identifier.
#[derive(Debug)]
pub struct FilePart {
    idx: usize,
    buf: BytesMut,
    limit: usize,
    headers: Option<Vec<String>>,
    id: Option<String>,
    written: u64,
}

impl FilePart {
    /// Creates the part with index `idx` whose header buffer is capped at
    /// `limit` bytes.
    pub fn new(idx: usize, limit: usize) -> FilePart {
        FilePart {
            idx,
            buf: BytesMut::new(),
            limit,
            headers: None,
            id: None,
            written: 0,
        }
    }

    pub fn index(&self) -> usize {
        self.idx
    }

    /// The raw header lines, once the header block is complete.
    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    /// The sink identifier, once the header block is complete.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Payload bytes handed to the sink so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Feeds the next slice of this part.
    pub fn on_data<S: PartSink + ?Sized>(
        &mut self,
        data: &[u8],
        sink: &mut S,
        observer: &dyn Observer,
    ) -> crate::Result<()> {
        if data.is_empty() {
            return Ok(());
        }

        observer.on_event(&Event::PartData { part: self.idx, data });

        if let Some(id) = self.id.as_deref() {
            sink.append(id, data).map_err(|cause| crate::Error::SinkWrite {
                id: id.to_owned(),
                cause,
            })?;
            self.written += data.len() as u64;
            return Ok(());
        }

        self.buf.extend_from_slice(data);

        let header_end = match helpers::find_bytes(&self.buf, constants::CRLF_CRLF.as_bytes()) {
            Some(idx) => idx,
            None if self.buf.len() > self.limit => {
                return Err(crate::Error::BufferLimitExceeded {
                    len: self.buf.len(),
                    limit: self.limit,
                });
            }
            None => return Ok(()),
        };

        let header_bytes = self.buf.split_to(header_end);
        self.buf.advance(constants::CRLF_CRLF.len());

        let headers: Vec<String> = helpers::decode_utf8_lossy(&header_bytes)
            .split(constants::CRLF)
            .map(str::to_owned)
            .collect();

        let file_name = content_disposition::file_name(headers.iter().map(String::as_str))
            .ok_or(crate::Error::UnresolvedPartFilename { part: self.idx })?;
        let id = format!("{}{}", file_name, constants::PART_ID_SUFFIX);

        observer.on_event(&Event::PartResolved { part: self.idx, id: &id });

        sink.create(&id, &self.buf).map_err(|cause| crate::Error::SinkWrite {
            id: id.clone(),
            cause,
        })?;
        self.written = self.buf.len() as u64;

        // Everything from here on streams through.
        self.buf = BytesMut::new();
        self.headers = Some(headers);
        self.id = Some(id);

        Ok(())
    }

    /// Ends the part: no more payload follows.
    pub fn close<S: PartSink + ?Sized>(self, sink: &mut S, observer: &dyn Observer) -> crate::Result<()> {
        let id = self
            .id
            .as_deref()
            .ok_or(crate::Error::IncompletePartHeaders { part: self.idx })?;

        sink.finalize(id).map_err(|cause| crate::Error::SinkWrite {
            id: id.to_owned(),
            cause,
        })?;

        observer.on_event(&Event::PartClosed {
            part: self.idx,
            id,
            written: self.written,
        });

        Ok(())
    }
}
