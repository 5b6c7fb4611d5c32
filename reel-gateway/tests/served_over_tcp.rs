use std::io::Write;
use std::sync::{Arc, Mutex};

use reel_blob::{MemoryBlobStore, ObjectLocator};
use reel_core::ReelApp;
use reel_gateway::build_with_store;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Shared buffer the test subscriber writes formatted events into.
#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

async fn fetch(addr: std::net::SocketAddr, path: &str, range: Option<&str>) -> String {
    let mut conn = TcpStream::connect(addr).await.unwrap();
    let mut request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n");
    if let Some(range) = range {
        request.push_str(&format!("Range: {range}\r\n"));
    }
    request.push_str("\r\n");
    conn.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    conn.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

// current_thread runtime keeps the server tasks on this thread, so the
// thread-local subscriber sees their events.
#[tokio::test]
async fn completed_responses_are_not_logged_as_disconnects() {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _default = tracing::subscriber::set_default(subscriber);

    let store = MemoryBlobStore::new().with_chunk_size(256);
    store
        .insert(
            ObjectLocator::from_path("course-media", "week-1", "intro.mp4"),
            vec![3u8; 2048],
            Some("video/mp4"),
        )
        .await;
    let ax = build_with_store(ReelApp::new(), Arc::new(store.clone())).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        axum::serve(listener, ax.router).await.unwrap();
    });

    let whole = fetch(addr, "/stream/r2/week-1/intro.mp4", None).await;
    assert!(whole.starts_with("HTTP/1.1 200 OK"), "{whole}");

    let partial = fetch(addr, "/stream/r2/week-1/intro.mp4", Some("bytes=10-19")).await;
    assert!(partial.starts_with("HTTP/1.1 206 Partial Content"), "{partial}");
    assert!(partial.to_ascii_lowercase().contains("content-range: bytes 10-19/2048"), "{partial}");

    tokio::task::yield_now().await;
    server.abort();

    let logs = captured.text();
    assert_eq!(logs.matches("stream completed").count(), 2, "{logs}");
    assert!(!logs.contains("client disconnected"), "{logs}");
    assert_eq!(store.live_streams(), 0);
}
