//! A minimal upload server: one request per connection, parts are written to
//! the current directory as `<filename>.out`.
//!
//! Run with `cargo run --example upload_server`, then open
//! <http://127.0.0.1:65432/> in a browser.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use partstream::{Event, FileSink, Observer, RequestMachine};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

struct StderrObserver;

impl Observer for StderrObserver {
    fn on_event(&self, event: &Event<'_>) {
        eprintln!("[www] {}", event);
    }
}

async fn handle(mut conn: TcpStream, observer: Arc<dyn Observer>) -> std::io::Result<()> {
    let mut machine = RequestMachine::new(FileSink::new(".")).with_observer(observer);
    let mut buf = [0u8; 2048];

    loop {
        let n = match tokio::time::timeout(Duration::from_secs(30), conn.read(&mut buf)).await {
            Ok(read) => read?,
            Err(_) => return Ok(()),
        };
        if n == 0 {
            return Ok(());
        }

        match machine.on_data(&buf[..n]) {
            Ok(Some(response)) => return conn.write_all(&response).await,
            Ok(None) => continue,
            Err(err) => {
                if let Some(response) = err.response() {
                    conn.write_all(&response.into_bytes()).await?;
                }
                return Ok(());
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let addr = SocketAddr::from(([127, 0, 0, 1], 65432));
    let listener = TcpListener::bind(addr).await.unwrap();
    let observer: Arc<dyn Observer> = Arc::new(StderrObserver);

    println!("Server is running at: {}", addr);

    loop {
        let (conn, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(err) => {
                eprintln!("accept failed: {}", err);
                continue;
            }
        };

        let observer = Arc::clone(&observer);
        tokio::spawn(async move {
            if let Err(err) = handle(conn, observer).await {
                eprintln!("connection {} failed: {}", peer, err);
            }
        });
    }
}
