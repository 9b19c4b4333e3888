//! Shared utilities for integration tests.

use std::net::SocketAddr;

use tokio::net::TcpListener;

use bili_relay::config::RelayConfig;
use bili_relay::http::HttpServer;
use bili_relay::lifecycle::Shutdown;

/// A relay serving on an ephemeral port until dropped.
pub struct TestRelay {
    pub addr: SocketAddr,
    shutdown: Shutdown,
}

#[allow(dead_code)]
impl TestRelay {
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }

    pub fn base(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Config with both upstream hosts pointed at `upstream` and an open
/// allow-list so the relay can reach the mock server.
pub fn test_config(upstream: &str) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.upstream.api_base = upstream.into();
    config.upstream.passport_base = format!("{}/passport", upstream);
    config.relay.allowed_hosts = Vec::new();
    config.timeouts.request_secs = 5;
    config
}

/// Start a relay with `config` on an ephemeral port.
pub async fn spawn_relay(config: RelayConfig) -> TestRelay {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();

    let server = HttpServer::new(config).unwrap();
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    TestRelay { addr, shutdown }
}

/// A client that does not decompress, so relayed bytes are seen as sent.
#[allow(dead_code)]
pub fn raw_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_gzip()
        .no_deflate()
        .build()
        .unwrap()
}
