//! Shared utilities for integration testing.

#![allow(dead_code)]

use lb_proxy::config::{BackendConfig, ProxyConfig};
use lb_proxy::lifecycle::Shutdown;
use lb_proxy::load_balancer::pool::BackendPool;
use lb_proxy::HttpServer;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Start a mock backend on an ephemeral port.
///
/// Every response body is the backend's own `http://host:port` URL, so tests
/// can tell which backend served a request.
pub async fn start_mock_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = format!("http://{}", addr);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    let body = body.clone();
                    tokio::spawn(respond(socket, body));
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn respond(mut socket: TcpStream, body: String) {
    // Read the request head; health probes connect and close without sending one.
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => {
                head.extend_from_slice(&buf[..n]);
                if head.windows(4).any(|w| w == b"\r\n\r\n") {
                    break;
                }
            }
        }
    }

    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// An address nothing listens on.
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn backend(addr: SocketAddr) -> BackendConfig {
    BackendConfig::new(format!("http://{}", addr))
}

/// Config with active health checks off, so liveness only changes by demotion.
pub fn config(strategy: &str, backends: Vec<BackendConfig>) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.strategy = strategy.to_string();
    config.backends = backends;
    config.health_check.enabled = false;
    config.timeouts.forward_secs = 5;
    config
}

pub struct RunningProxy {
    pub addr: SocketAddr,
    pub pool: Arc<BackendPool>,
    pub shutdown: Shutdown,
}

impl RunningProxy {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start the proxy on an ephemeral port.
pub async fn start_proxy(config: ProxyConfig) -> RunningProxy {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config);
    let pool = server.pool();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    RunningProxy {
        addr,
        pool,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
