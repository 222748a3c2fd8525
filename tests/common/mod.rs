//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::body::{Body, Bytes};
use axum::extract::{Request, State};
use axum::response::Response;
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing_subscriber::fmt::MakeWriter;

use traffic_relay::config::{RelayConfig, RouteConfig};
use traffic_relay::http::HttpServer;
use traffic_relay::lifecycle::Shutdown;

/// A running echo backend.
pub struct EchoBackend {
    pub addr: SocketAddr,
    hits: Arc<AtomicUsize>,
    bodies: Arc<Mutex<Vec<Bytes>>>,
}

impl EchoBackend {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    /// Request bodies received so far, in arrival order.
    pub fn received(&self) -> Vec<Bytes> {
        self.bodies.lock().unwrap().clone()
    }
}

#[derive(Clone)]
struct EchoState {
    id: &'static str,
    hits: Arc<AtomicUsize>,
    bodies: Arc<Mutex<Vec<Bytes>>>,
}

/// Start a backend that reflects the request back.
///
/// Method and path+query come back in `x-echo-method` / `x-echo-uri`, the
/// backend's `id` in `x-backend-id`, and the request body as the body.
pub async fn start_echo_backend(id: &'static str) -> EchoBackend {
    let hits = Arc::new(AtomicUsize::new(0));
    let bodies = Arc::new(Mutex::new(Vec::new()));
    let state = EchoState {
        id,
        hits: hits.clone(),
        bodies: bodies.clone(),
    };
    let app = Router::new().fallback(echo).with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    EchoBackend { addr, hits, bodies }
}

async fn echo(State(state): State<EchoState>, request: Request) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);

    let method = request.method().to_string();
    let uri = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_default();
    let body: Bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    state.bodies.lock().unwrap().push(body.clone());

    Response::builder()
        .header("x-echo-method", method)
        .header("x-echo-uri", uri)
        .header("x-backend-id", state.id)
        .body(Body::from(body))
        .unwrap()
}

/// Start a backend that answers every request with `status` and `headers`.
pub async fn start_fixed_backend(
    status: u16,
    headers: &'static [(&'static str, &'static str)],
    body: &'static str,
) -> SocketAddr {
    let app = Router::new().fallback(move || async move {
        let mut builder = Response::builder().status(status);
        for &(name, value) in headers {
            builder = builder.header(name, value);
        }
        builder.body(Body::from(body)).unwrap()
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// Start a raw backend that reads each request head, waits `delay`, then
/// writes `raw` and closes.
pub async fn start_raw_backend(raw: &'static [u8], delay: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }
                tokio::time::sleep(delay).await;
                let _ = socket.write_all(raw).await;
                let _ = socket.shutdown().await;
                tokio::time::sleep(Duration::from_millis(50)).await;
            });
        }
    });
    addr
}

/// What a [`start_holding_backend`] connection went through.
#[derive(Debug, PartialEq, Eq)]
pub enum HoldEvent {
    /// A full request head arrived.
    HeadReceived,
    /// The peer closed the connection, this long after the head arrived.
    Closed(Duration),
}

/// Start a raw backend that reads each request head and never answers.
///
/// It keeps reading until the peer closes and reports both moments.
pub async fn start_holding_backend() -> (SocketAddr, mpsc::UnboundedReceiver<HoldEvent>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }
                let received = Instant::now();
                let _ = tx.send(HoldEvent::HeadReceived);

                loop {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(_) => {}
                    }
                }
                let _ = tx.send(HoldEvent::Closed(received.elapsed()));
            });
        }
    });
    (addr, rx)
}

/// In-memory log sink for asserting on relay output.
#[derive(Clone, Default)]
pub struct LogCapture {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl LogCapture {
    /// Install as the subscriber for the current thread until the guard drops.
    ///
    /// Use with the default current-thread test runtime so the relay's
    /// spawned tasks log on the same thread.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .with_writer(self.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// An address nothing listens on.
pub async fn closed_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// A route with the given listen path and rotation set.
pub fn route(listen_path: &str, backends: &[String]) -> RouteConfig {
    RouteConfig {
        listen_path: listen_path.to_string(),
        backend_urls: backends.to_vec(),
        ..Default::default()
    }
}

/// A running relay on an ephemeral port.
pub struct TestRelay {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

impl TestRelay {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the relay with `config` on 127.0.0.1:0.
pub async fn start_relay(mut config: RelayConfig) -> TestRelay {
    config.listener.listen_addr = "127.0.0.1:0".to_string();
    let server = HttpServer::new(config).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    TestRelay { addr, shutdown }
}

/// Start the relay with only `routes` configured.
pub async fn start_relay_with_routes(routes: Vec<RouteConfig>) -> TestRelay {
    start_relay(RelayConfig {
        routes,
        ..Default::default()
    })
    .await
}

/// Client that never goes through a proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}
