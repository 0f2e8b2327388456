#![allow(clippy::unwrap_used)]
// Integration tests for `Connection` against a loopback fake engine.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use ldmx_api::protocol::WELCOME_MESSAGE;
use ldmx_api::{Connection, ConnectionConfig, Connector, Error};

// ── Helpers ─────────────────────────────────────────────────────────

/// A TCP fake engine. Each accepted connection gets the welcome banner, then
/// answers up to `replies_per_connection` commands with `reply` before hanging
/// up. Received commands are collected in order.
struct FakeEngine {
    port: u16,
    accepted: Arc<AtomicUsize>,
    commands: Arc<tokio::sync::Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

impl FakeEngine {
    async fn start(reply: &'static str, replies_per_connection: usize) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let accepted = Arc::new(AtomicUsize::new(0));
        let commands = Arc::new(tokio::sync::Mutex::new(Vec::new()));

        let task = {
            let accepted = Arc::clone(&accepted);
            let commands = Arc::clone(&commands);
            tokio::spawn(async move {
                loop {
                    let Ok((mut socket, _)) = listener.accept().await else {
                        break;
                    };
                    accepted.fetch_add(1, Ordering::SeqCst);
                    let commands = Arc::clone(&commands);
                    tokio::spawn(async move {
                        socket.write_all(WELCOME_MESSAGE).await.unwrap();
                        let mut buf = [0u8; 256];
                        for _ in 0..replies_per_connection {
                            let n = match socket.read(&mut buf).await {
                                Ok(0) | Err(_) => return,
                                Ok(n) => n,
                            };
                            let cmd = String::from_utf8_lossy(&buf[..n]).into_owned();
                            commands.lock().await.push(cmd);
                            if socket.write_all(reply.as_bytes()).await.is_err() {
                                return;
                            }
                        }
                    });
                }
            })
        };

        Self {
            port,
            accepted,
            commands,
            task,
        }
    }

    fn config(&self) -> ConnectionConfig {
        ConnectionConfig::new("127.0.0.1", self.port)
    }

    fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    async fn commands(&self) -> Vec<String> {
        self.commands.lock().await.clone()
    }
}

impl Drop for FakeEngine {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Port with nothing listening on it.
async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_round_trip_over_tcp() {
    let engine = FakeEngine::start("ok\n", usize::MAX).await;
    let conn = Connection::new(engine.config());

    conn.start().await;
    assert!(conn.is_connected());

    assert_eq!(conn.request("on,12,b200").await.unwrap(), "ok");
    assert!(conn.check().await.unwrap());

    conn.stop().await;
    assert!(!conn.is_connected());
    assert_eq!(engine.commands().await, vec!["on,12,b200", "conncheck"]);
}

#[tokio::test]
async fn test_reconnects_after_engine_hangs_up() {
    // Every connection serves exactly one command, then drops.
    let engine = FakeEngine::start("ok", 1).await;
    let conn = Connection::new(engine.config());
    conn.start().await;

    assert_eq!(conn.request("on,1").await.unwrap(), "ok");
    assert_eq!(conn.request("off,1").await.unwrap(), "ok");

    assert_eq!(engine.accepted(), 2);
    assert!(conn.is_connected());
    conn.stop().await;
}

#[tokio::test]
async fn test_unreachable_engine() {
    let port = closed_port().await;
    let conn = Connection::new(ConnectionConfig::new("127.0.0.1", port));

    conn.start().await;
    assert!(!conn.is_connected());

    let result = conn.request("sreq,0").await;
    assert!(
        matches!(result, Err(Error::NotConnected { .. })),
        "expected NotConnected, got: {result:?}"
    );

    conn.stop().await;
    conn.stop().await;
}

#[tokio::test]
async fn test_heartbeat_over_tcp() {
    let engine = FakeEngine::start("ok", usize::MAX).await;
    let config = engine.config().with_keep_alive(Duration::from_millis(50));
    let conn = Connection::new(config);

    conn.start().await;
    tokio::time::sleep(Duration::from_millis(175)).await;
    conn.stop().await;

    let probes = engine.commands().await;
    assert!(
        (3..=5).contains(&probes.len()),
        "expected roughly one probe per 50ms, got {probes:?}"
    );
    assert!(probes.iter().all(|c| c == "conncheck"));
}

// ── Scripted stream ─────────────────────────────────────────────────

/// Serves a single `tokio_test` mock. The mock panics on drop if any scripted
/// byte was not exchanged exactly.
struct ScriptedConnector(std::sync::Mutex<Option<tokio_test::io::Mock>>);

impl Connector for ScriptedConnector {
    type Stream = tokio_test::io::Mock;

    fn connect(
        &self,
        _host: &str,
        _port: u16,
    ) -> impl std::future::Future<Output = io::Result<Self::Stream>> + Send {
        let mock = self.0.lock().unwrap().take();
        async move { mock.ok_or_else(|| io::Error::from(io::ErrorKind::ConnectionRefused)) }
    }
}

#[tokio::test]
async fn test_exact_bytes_on_the_wire() {
    let mock = tokio_test::io::Builder::new()
        .read(WELCOME_MESSAGE)
        .write(b"sreq,7")
        .read(b"sres,7,1-200\n")
        .build();
    let conn = Connection::with_connector(
        ConnectionConfig::default(),
        ScriptedConnector(std::sync::Mutex::new(Some(mock))),
    );

    conn.start().await;
    assert_eq!(conn.request("sreq,7").await.unwrap(), "sres,7,1-200");
    conn.stop().await;
}
