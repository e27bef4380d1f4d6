#![allow(dead_code)]

//! Shared helpers: a real server on an ephemeral endpoint and an SDK client for it.

use std::sync::Arc;

use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use courses::{CourseStore, GrpcServer, ListenConfig, seeded_store};
use courses_sdk::CoursesGrpcClient;

pub struct TestServer {
    pub uri: String,
    cancel: CancellationToken,
    handle: JoinHandle<anyhow::Result<()>>,
    // Keeps the socket directory alive for UDS servers.
    _dir: Option<TempDir>,
}

impl TestServer {
    pub async fn client(&self) -> CoursesGrpcClient {
        CoursesGrpcClient::connect(&self.uri)
            .await
            .expect("client should connect")
    }

    pub async fn shutdown(self) {
        self.cancel.cancel();
        self.handle
            .await
            .expect("server task should not panic")
            .expect("server should stop cleanly");
    }
}

async fn spawn(store: Arc<CourseStore>, listen: ListenConfig, dir: Option<TempDir>) -> TestServer {
    let bound = GrpcServer::new(store, listen)
        .bind()
        .await
        .expect("server should bind");
    let uri = bound.endpoint().uri();

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(bound.serve(cancel.clone()));

    TestServer {
        uri,
        cancel,
        handle,
        _dir: dir,
    }
}

/// Seeded server on `127.0.0.1:0`.
pub async fn spawn_tcp() -> TestServer {
    spawn_tcp_with(Arc::new(seeded_store())).await
}

pub async fn spawn_tcp_with(store: Arc<CourseStore>) -> TestServer {
    let listen = ListenConfig::Tcp("127.0.0.1:0".parse().unwrap());
    spawn(store, listen, None).await
}

/// Seeded server on a socket inside a fresh temporary directory.
#[cfg(unix)]
pub async fn spawn_uds() -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let listen = ListenConfig::Uds(dir.path().join("courses.sock"));
    spawn(Arc::new(seeded_store()), listen, Some(dir)).await
}
