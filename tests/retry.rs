//! Retry behavior of the session's GET primitive against a flaky endpoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use secmail_client::{Error, MailboxSession, RetryPolicy};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

const PROVISION_BODY: &str = r#"["abc123@1secmail.com"]"#;

/// Serves `body` over raw HTTP, but kills the first `failures` connections
/// after reading the request. The client sees those as transport failures.
/// Returns the bound address and a counter of accepted connections.
async fn flaky_server(failures: u32, body: &'static str) -> (SocketAddr, Arc<AtomicU32>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&connections);

    tokio::spawn(async move {
        loop {
            let (mut socket, _) = listener.accept().await.unwrap();
            let seen = counter.fetch_add(1, Ordering::SeqCst);
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            if seen < failures {
                drop(socket);
                continue;
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });

    (addr, connections)
}

/// Serves `body` over raw HTTP, but for the first `failures` connections
/// advertises a longer `content-length`, writes a fragment of the body, and
/// drops the socket. The client sees a transport failure mid-body-read.
async fn truncating_server(failures: u32, body: &'static str) -> (SocketAddr, Arc<AtomicU32>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let connections = Arc::new(AtomicU32::new(0));
    let counter = Arc::clone(&connections);

    tokio::spawn(async move {
        loop {
            let (mut socket, _) = listener.accept().await.unwrap();
            let seen = counter.fetch_add(1, Ordering::SeqCst);
            let mut buf = [0u8; 2048];
            let _ = socket.read(&mut buf).await;
            if seen < failures {
                let partial = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len() + 100,
                    &body[..4]
                );
                let _ = socket.write_all(partial.as_bytes()).await;
                drop(socket);
                continue;
            }
            let response = format!(
                "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });

    (addr, connections)
}

#[tokio::test]
async fn body_read_failures_are_retried_until_success() {
    let (addr, connections) = truncating_server(1, PROVISION_BODY).await;

    let session = MailboxSession::builder()
        .api_url(format!("http://{addr}/api/v1/"))
        .build()
        .await
        .expect("second attempt should deliver the full body");

    assert_eq!(session.address(), "abc123@1secmail.com");
    assert_eq!(connections.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn persistent_body_read_failures_exhaust_the_attempt_budget() {
    let (addr, connections) = truncating_server(u32::MAX, PROVISION_BODY).await;

    let err = MailboxSession::builder()
        .api_url(format!("http://{addr}/api/v1/"))
        .build()
        .await
        .unwrap_err();

    match err {
        Error::TransientNetwork { attempts, .. } => assert_eq!(attempts, 4),
        other => panic!("expected TransientNetwork, got {other}"),
    }
    assert_eq!(connections.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn transient_failures_are_retried_until_success() {
    let (addr, connections) = flaky_server(3, PROVISION_BODY).await;

    let session = MailboxSession::builder()
        .api_url(format!("http://{addr}/api/v1/"))
        .build()
        .await
        .expect("fourth attempt should succeed");

    assert_eq!(session.address(), "abc123@1secmail.com");
    assert_eq!(connections.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn exhausted_retries_surface_as_transient_network_error() {
    let (addr, connections) = flaky_server(u32::MAX, PROVISION_BODY).await;

    let err = MailboxSession::builder()
        .api_url(format!("http://{addr}/api/v1/"))
        .build()
        .await
        .unwrap_err();

    match err {
        Error::TransientNetwork { attempts, .. } => assert_eq!(attempts, 4),
        other => panic!("expected TransientNetwork, got {other}"),
    }
    assert_eq!(connections.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn connection_refused_is_transient() {
    // bind-then-drop leaves a port nothing is listening on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = MailboxSession::builder()
        .api_url(format!("http://{addr}/api/v1/"))
        .retry_policy(RetryPolicy { max_attempts: 2 })
        .build()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::TransientNetwork { attempts: 2, .. }
    ));
}

#[tokio::test]
async fn retry_policy_attempt_budget_is_respected() {
    let (addr, connections) = flaky_server(u32::MAX, PROVISION_BODY).await;

    let err = MailboxSession::builder()
        .api_url(format!("http://{addr}/api/v1/"))
        .retry_policy(RetryPolicy { max_attempts: 1 })
        .build()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::TransientNetwork { attempts: 1, .. }));
    assert_eq!(connections.load(Ordering::SeqCst), 1);
}
