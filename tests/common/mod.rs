//! Shared fixtures for integration tests.

#![allow(dead_code)]

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const HOSTS_BODY: &str =
    "# ad hosts\n\nexample.com\n0.0.0.0 ads.example.com\n127.0.0.1 tracker.example.com\n";

pub const LATIN1_BODY: &[u8] =
    b"# Liste von Werbedom\xe4nen\nads.example.com\n0.0.0.0 tracker.example.com\n";

/// An HTTP server publishing blocklists on an ephemeral loopback port.
///
/// - `/hosts` serves [`HOSTS_BODY`]
/// - `/dynamic` serves whatever was last passed to [`ListServer::publish`]
/// - `/missing` answers 404
/// - `/latin1` serves [`LATIN1_BODY`], which is not valid UTF-8
pub struct ListServer {
    pub addr: SocketAddr,
    dynamic: Arc<Mutex<String>>,
}

impl ListServer {
    pub async fn start() -> Self {
        let dynamic = Arc::new(Mutex::new(String::new()));

        let app = Router::new()
            .route("/hosts", get(|| async { HOSTS_BODY }))
            .route(
                "/dynamic",
                get(|State(body): State<Arc<Mutex<String>>>| async move {
                    body.lock().unwrap().clone()
                }),
            )
            .route(
                "/missing",
                get(|| async { (StatusCode::NOT_FOUND, "no such list") }),
            )
            .route(
                "/latin1",
                get(|| async { LATIN1_BODY.to_vec() }),
            )
            .with_state(dynamic.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, dynamic }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn publish(&self, body: &str) {
        *self.dynamic.lock().unwrap() = body.to_string();
    }
}

/// Returns a loopback URL on which nothing is listening.
pub async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/hosts", addr)
}
