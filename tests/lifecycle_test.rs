//! End-to-end runs of the lifecycle runner.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use viewr::config::{AppConfig, BindError};
use viewr::{LifecycleRunner, RunError};

mod common;

fn config_on(port: u16) -> AppConfig {
    let mut config = AppConfig::default();
    config.server.port = port;
    config
}

#[tokio::test]
async fn serves_until_cancelled_then_returns_ok() {
    let port = common::free_port();
    let dir = tempfile::tempdir().unwrap();
    let logs = dir.path().join("logs");

    let cancel = CancellationToken::new();
    let runner = LifecycleRunner::new(Arc::new(config_on(port)))
        .provenance("test")
        .log_dir(Some(logs.clone()));
    let run = tokio::spawn(runner.run(cancel.clone()));

    let health = common::wait_until_ready(&format!("http://127.0.0.1:{}/health", port)).await;
    assert_eq!(health.status(), 200);

    cancel.cancel();
    let result = tokio::time::timeout(Duration::from_secs(10), run)
        .await
        .expect("run did not stop after cancellation")
        .unwrap();
    assert!(result.is_ok(), "run failed: {:?}", result);
    assert!(logs.is_dir());

    // Listener released.
    std::net::TcpListener::bind(("127.0.0.1", port)).unwrap();
}

#[tokio::test]
async fn invalid_port_fails_before_serving() {
    let result = LifecycleRunner::new(Arc::new(config_on(1000)))
        .run(CancellationToken::new())
        .await;

    match result {
        Err(RunError::Unbindable {
            source: BindError::InvalidParameters(violations),
            ..
        }) => assert_eq!(violations.len(), 1),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn occupied_port_is_rejected_by_the_probe() {
    let holder = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = holder.local_addr().unwrap().port();

    let result = LifecycleRunner::new(Arc::new(config_on(port)))
        .run(CancellationToken::new())
        .await;

    match result {
        Err(RunError::Unbindable {
            source: BindError::Rejected { kind, .. },
            target,
        }) => {
            assert_eq!(kind, io::ErrorKind::AddrInUse);
            assert_eq!(target, format!("127.0.0.1:{}", port));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[tokio::test]
async fn cancellation_before_first_request_still_shuts_down_cleanly() {
    let port = common::free_port();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = tokio::time::timeout(
        Duration::from_secs(10),
        LifecycleRunner::new(Arc::new(config_on(port))).run(cancel),
    )
    .await
    .expect("run did not observe the cancelled token");
    assert!(result.is_ok());
}
