use std::fs;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::stream;
use partstream::{FileSink, MemorySink, NoopObserver, RequestMachine, RequestState};

const BODY: &str = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"files\"; filename=\"a-text-file.txt\"\r\nContent-Type: text/plain\r\n\r\nHello world\nHello\r\nWorld\rAgain\r\n--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"files\"; filename=\"empty.bin\"\r\nContent-Type: application/octet-stream\r\n\r\n\r\n--X-BOUNDARY--\r\n";

fn request(body: &str) -> String {
    format!(
        "POST / HTTP/1.0\r\nHost: localhost\r\nContent-Type: multipart/form-data; boundary=X-BOUNDARY\r\nContent-Length: {}\r\n\r\n{}",
        body.len(),
        body
    )
}

fn byte_stream(data: String) -> impl stream::Stream<Item = partstream::Result<Bytes>> {
    stream::iter(
        data.into_bytes()
            .into_iter()
            .map(|b| partstream::Result::Ok(Bytes::copy_from_slice(&[b]))),
    )
}

#[tokio::test]
async fn test_upload_basic() {
    let mut machine = RequestMachine::new(MemorySink::new()).with_observer(Arc::new(NoopObserver));
    let response = partstream::drive(&mut machine, byte_stream(request(BODY))).await.unwrap();

    let expected = format!("Upload OK {0}/{0} bytes", BODY.len());
    assert!(std::str::from_utf8(&response).unwrap().contains(&expected));
    assert_eq!(machine.state(), RequestState::Done);

    let head = machine.head().unwrap();
    assert_eq!(head.header("Host"), Some("localhost"));

    let sink = machine.into_sink();
    assert_eq!(
        sink.get("a-text-file.txt.out"),
        Some(&b"Hello world\nHello\r\nWorld\rAgain"[..])
    );
    assert_eq!(sink.get("empty.bin.out"), Some(&b""[..]));
    assert!(sink.is_finalized("a-text-file.txt.out"));
    assert!(sink.is_finalized("empty.bin.out"));
}

#[tokio::test]
async fn test_upload_empty_form() {
    let mut machine = RequestMachine::new(MemorySink::new());
    let response = partstream::drive(&mut machine, byte_stream(request("--X-BOUNDARY--\r\n")))
        .await
        .unwrap();

    assert!(response.starts_with(b"HTTP/1.0 200 OK"));
    assert!(machine.sink().is_empty());
}

#[tokio::test]
async fn test_get_form_touches_no_sink() {
    let mut machine = RequestMachine::new(MemorySink::new());
    let response = partstream::drive(&mut machine, byte_stream("GET / HTTP/1.0\r\n\r\n".to_owned()))
        .await
        .unwrap();

    assert!(std::str::from_utf8(&response).unwrap().contains("<form"));
    assert!(machine.sink().is_empty());
}

#[tokio::test]
async fn test_text_plain_is_rejected() {
    let mut machine = RequestMachine::new(MemorySink::new());
    let response = partstream::drive(
        &mut machine,
        byte_stream("POST / HTTP/1.0\r\nContent-Type: text/plain\r\nContent-Length: 2\r\n\r\nhi".to_owned()),
    )
    .await
    .unwrap();

    assert!(response.starts_with(b"HTTP/1.0 400 Bad Request\r\n"));
    assert!(machine.scanner().is_none());
}

#[test]
fn test_upload_to_files() {
    let root = std::env::temp_dir().join(format!("partstream-integration-{}", std::process::id()));
    fs::create_dir_all(&root).unwrap();

    let payload: Vec<u8> = (0..10_000u32).map(|n| (n % 251) as u8).collect();
    let mut body = b"--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"files\"; filename=\"blob.bin\"\r\n\r\n".to_vec();
    body.extend_from_slice(&payload);
    body.extend_from_slice(b"\r\n--X-BOUNDARY--\r\n");

    let mut data = format!(
        "POST / HTTP/1.0\r\nContent-Type: multipart/form-data; boundary=X-BOUNDARY\r\nContent-Length: {}\r\n\r\n",
        body.len()
    )
    .into_bytes();
    data.extend_from_slice(&body);

    let mut machine = RequestMachine::new(FileSink::new(&root));
    let mut response = None;
    for chunk in data.chunks(2048) {
        if let Some(bytes) = machine.on_data(chunk).unwrap() {
            response = Some(bytes);
        }
    }

    assert!(response.unwrap().starts_with(b"HTTP/1.0 200 OK"));
    assert_eq!(fs::read(root.join("blob.bin.out")).unwrap(), payload);

    fs::remove_dir_all(&root).unwrap();
}

#[test]
fn test_unsafe_file_name_is_reported() {
    let root = std::env::temp_dir().join(format!("partstream-unsafe-{}", std::process::id()));

    let body = "--X-BOUNDARY\r\nContent-Disposition: form-data; name=\"files\"; filename=\"../escape.txt\"\r\n\r\nx\r\n--X-BOUNDARY--\r\n";
    let mut machine = RequestMachine::new(FileSink::new(&root));
    let err = machine.on_data(request(body).as_bytes()).unwrap_err();

    assert!(matches!(err, partstream::Error::SinkWrite { .. }));
    assert_eq!(err.response().map(|r| r.status().as_u16()), Some(500));
    assert!(!root.join("escape.txt.out").exists());
}
