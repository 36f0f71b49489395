//! Shared harness: a real server on an ephemeral port backed by a temporary data directory.

#![allow(dead_code)]

use reqwest::Client;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;
use stubline::admin_api::StublineServer;
use stubline::application::ApplicationManager;
use stubline::config::ReplayConfig;
use stubline::store::FileRuleStore;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

pub struct TestServer {
    pub base: String,
    pub client: Client,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestServer {
    /// Start a server over `data_dir`
    pub async fn start(data_dir: &Path) -> Self {
        let store = Arc::new(FileRuleStore::open(data_dir).expect("open store"));
        let manager = Arc::new(ApplicationManager::new(store));
        let server = StublineServer::new(manager, ReplayConfig::default());

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            server
                .serve(listener, async {
                    let _ = rx.await;
                })
                .await
                .expect("server failed");
        });

        Self {
            base: format!("http://{addr}"),
            client: Client::new(),
            shutdown: Some(tx),
            handle: Some(handle),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Stop accepting connections and wait for the accept loop to exit
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }

    pub async fn create_application(&self, name: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/create-application"))
            .json(&json!({ "name": name }))
            .send()
            .await
            .expect("create request")
    }

    pub async fn append(&self, name: &str, rules: Value) -> reqwest::Response {
        self.client
            .post(self.url(&format!("/api/end-point/{name}")))
            .json(&rules)
            .send()
            .await
            .expect("append request")
    }

    pub async fn list_rules(&self, name: &str) -> reqwest::Response {
        self.client
            .get(self.url(&format!("/api/end-point/{name}")))
            .send()
            .await
            .expect("list rules request")
    }
}

pub fn data_dir() -> TempDir {
    tempfile::tempdir().expect("tempdir")
}

pub fn json_rule(url: &str, method: &str, value: Value) -> Value {
    json!({
        "requestUrl": url,
        "requestMethod": method,
        "responseStatusCode": 200,
        "responseContentType": "application/json",
        "responseValue": value
    })
}
