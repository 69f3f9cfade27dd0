use bytes::Bytes;
use futures_util::stream::{Stream, StreamExt};
#[cfg(feature = "tokio-io")]
use tokio::io::AsyncRead;
#[cfg(feature = "tokio-io")]
use tokio_util::io::ReaderStream;

use crate::request::RequestMachine;
use crate::sink::PartSink;

/// Feeds every chunk of `stream` to `machine` until it produces a response.
///
/// Resolves to the response bytes, or [`Error::IncompleteStream`](crate::Error::IncompleteStream)
/// if the stream ends first. Chunks after the response are not polled.
///
/// # Examples
///
/// ```
/// use partstream::{MemorySink, RequestMachine};
/// use bytes::Bytes;
/// use std::convert::Infallible;
/// use futures_util::stream::iter;
///
/// # async fn run() {
/// let chunks = vec!["GET / HTTP/1.0\r\n", "\r\n"];
/// let stream = iter(chunks.into_iter().map(|chunk| Result::<Bytes, Infallible>::Ok(Bytes::from(chunk))));
///
/// let mut machine = RequestMachine::new(MemorySink::new());
/// let response = partstream::drive(&mut machine, stream).await.unwrap();
/// assert!(response.starts_with(b"HTTP/1.0 200 OK"));
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(run());
/// ```
pub async fn drive<S, St, O, E>(machine: &mut RequestMachine<S>, stream: St) -> crate::Result<Bytes>
where
    S: PartSink,
    St: Stream<Item = Result<O, E>>,
    O: AsRef<[u8]>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    futures_util::pin_mut!(stream);

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|err| crate::Error::StreamReadFailed(err.into()))?;

        if let Some(response) = machine.on_data(chunk.as_ref())? {
            return Ok(response);
        }
    }

    Err(crate::Error::IncompleteStream)
}

/// Reads `reader` to the end of the request, feeding `machine` as data
/// arrives.
///
/// # Optional
///
/// This requires the optional `tokio-io` feature to be enabled.
#[cfg(feature = "tokio-io")]
#[cfg_attr(nightly, doc(cfg(feature = "tokio-io")))]
pub async fn drive_reader<S, R>(machine: &mut RequestMachine<S>, reader: R) -> crate::Result<Bytes>
where
    S: PartSink,
    R: AsyncRead,
{
    drive(machine, ReaderStream::new(reader)).await
}
