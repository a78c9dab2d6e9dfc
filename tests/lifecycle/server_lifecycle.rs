//! Server lifecycle tests: startup, graceful shutdown, and connection
//! teardown.

mod helpers;

use helpers::{dane_ee_answer, spawn_server, ScriptedProber};
use dane_policyd_domain::MxHost;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

#[tokio::test]
async fn test_shutdown_stops_accepting_new_connections() {
    let server = spawn_server(Arc::new(ScriptedProber::new())).await;
    let addr = server.addr;

    server.shutdown.cancel();
    server.handle.await.expect("join").expect("serve");

    // The listener is gone once serve() returns.
    assert!(TcpStream::connect(addr).await.is_err());
}

#[tokio::test]
async fn test_in_flight_request_is_answered_during_shutdown() {
    // The lookup takes ~1s; shutdown fires while it is in progress. The
    // response must still arrive before the server exits.
    let prober = ScriptedProber::new()
        .with_mx("example.com", vec![MxHost::new("mail.example.com", 10)])
        .with_tlsa("mail.example.com", dane_ee_answer())
        .with_delay(Duration::from_secs(1));
    let server = spawn_server(Arc::new(prober)).await;

    let stream = TcpStream::connect(server.addr).await.expect("connect");
    let (read_half, mut write_half) = stream.into_split();
    write_half
        .write_all(b"get example.com\n")
        .await
        .expect("write");

    tokio::time::sleep(Duration::from_millis(100)).await;
    server.shutdown.cancel();

    let mut reader = BufReader::new(read_half);
    let mut response = String::new();
    reader.read_line(&mut response).await.expect("read");
    assert_eq!(response, "200 dane-only\n");

    server.handle.await.expect("join").expect("serve");
}

#[tokio::test]
async fn test_shutdown_closes_idle_connections() {
    let server = spawn_server(Arc::new(ScriptedProber::new())).await;

    let stream = TcpStream::connect(server.addr).await.expect("connect");
    let (read_half, mut write_half) = stream.into_split();

    // One round-trip first, so the connection is accepted and has a
    // live handler before shutdown fires.
    write_half.write_all(b"bogus\n").await.expect("write");
    let mut reader = BufReader::new(read_half);
    let mut response = String::new();
    reader.read_line(&mut response).await.expect("read");
    assert_eq!(response, "500 malformed data\n");

    server.shutdown.cancel();

    // serve() must not hang on the idle connection; the poll interval
    // bounds how long teardown can take.
    tokio::time::timeout(Duration::from_secs(3), server.handle)
        .await
        .expect("serve should finish promptly")
        .expect("join")
        .expect("serve");

    // The peer observes EOF.
    let mut line = String::new();
    let n = tokio::time::timeout(Duration::from_secs(1), reader.read_line(&mut line))
        .await
        .expect("read should not hang")
        .expect("read");
    assert_eq!(n, 0);
}

#[tokio::test]
async fn test_many_short_connections_then_prompt_shutdown() {
    // Long-lived daemons see a steady churn of connect/request/close;
    // completed handlers must not pile up and stall the final drain.
    let prober = ScriptedProber::new()
        .with_mx("example.com", vec![MxHost::new("mail.example.com", 10)])
        .with_tlsa("mail.example.com", dane_ee_answer());
    let server = spawn_server(Arc::new(prober)).await;

    for _ in 0..50 {
        let stream = TcpStream::connect(server.addr).await.expect("connect");
        let (read_half, mut write_half) = stream.into_split();
        write_half
            .write_all(b"get example.com\n")
            .await
            .expect("write");
        let mut reader = BufReader::new(read_half);
        let mut response = String::new();
        reader.read_line(&mut response).await.expect("read");
        assert_eq!(response, "200 dane-only\n");
    }

    server.shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(3), server.handle)
        .await
        .expect("drain should not wait on long-finished handlers")
        .expect("join")
        .expect("serve");
}

#[tokio::test]
async fn test_client_eof_closes_only_that_connection() {
    let prober = ScriptedProber::new()
        .with_mx("example.com", vec![MxHost::new("mail.example.com", 10)])
        .with_tlsa("mail.example.com", dane_ee_answer());
    let server = spawn_server(Arc::new(prober)).await;

    // First client connects and hangs up immediately.
    drop(TcpStream::connect(server.addr).await.expect("connect"));

    // Second client still gets served.
    let stream = TcpStream::connect(server.addr).await.expect("connect");
    let (read_half, mut write_half) = stream.into_split();
    write_half
        .write_all(b"get example.com\n")
        .await
        .expect("write");
    let mut reader = BufReader::new(read_half);
    let mut response = String::new();
    reader.read_line(&mut response).await.expect("read");
    assert_eq!(response, "200 dane-only\n");

    server.shutdown.cancel();
    let _ = server.handle.await;
}

#[tokio::test]
async fn test_binding_same_port_twice_fails() {
    let server = spawn_server(Arc::new(ScriptedProber::new())).await;
    let addr = server.addr;

    let evaluate = Arc::new(
        dane_policyd_application::use_cases::EvaluateDaneUseCase::new(
            Arc::new(ScriptedProber::new()),
            Duration::from_secs(5),
        ),
    );
    let handler = Arc::new(
        dane_policyd_application::use_cases::HandlePolicyRequestUseCase::new(evaluate),
    );
    let result = dane_policyd_infrastructure::server::PolicyServer::bind(
        addr,
        handler,
        tokio_util::sync::CancellationToken::new(),
    );
    assert!(result.is_err());

    server.shutdown.cancel();
    let _ = server.handle.await;
}
