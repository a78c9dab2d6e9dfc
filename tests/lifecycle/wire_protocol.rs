//! End-to-end protocol tests over a real TCP connection: every request
//! line is answered with exactly one of the four response lines.

mod helpers;

use helpers::{dane_ee_answer, spawn_server, ScriptedProber};
use dane_policyd_domain::MxHost;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

async fn request(addr: std::net::SocketAddr, line: &str) -> String {
    let stream = TcpStream::connect(addr).await.expect("connect");
    let (read_half, mut write_half) = stream.into_split();
    write_half.write_all(line.as_bytes()).await.expect("write");

    let mut reader = BufReader::new(read_half);
    let mut response = String::new();
    reader.read_line(&mut response).await.expect("read");
    response
}

#[tokio::test]
async fn test_dane_domain_gets_200() {
    let prober = ScriptedProber::new()
        .with_mx("example.com", vec![MxHost::new("mail.example.com", 10)])
        .with_tlsa("mail.example.com", dane_ee_answer());
    let server = spawn_server(Arc::new(prober)).await;

    let response = request(server.addr, "get example.com\n").await;
    assert_eq!(response, "200 dane-only\n");

    server.shutdown.cancel();
    server.handle.await.expect("join").expect("serve");
}

#[tokio::test]
async fn test_plain_domain_gets_500() {
    let prober = ScriptedProber::new()
        .with_mx("example.org", vec![MxHost::new("mx.example.org", 10)]);
    let server = spawn_server(Arc::new(prober)).await;

    let response = request(server.addr, "get example.org\n").await;
    assert_eq!(response, "500 no dane record found\n");

    server.shutdown.cancel();
    let _ = server.handle.await;
}

#[tokio::test]
async fn test_unknown_command_gets_500() {
    let server = spawn_server(Arc::new(ScriptedProber::new())).await;

    let response = request(server.addr, "put example.com\n").await;
    assert_eq!(response, "500 unknown command\n");

    server.shutdown.cancel();
    let _ = server.handle.await;
}

#[tokio::test]
async fn test_malformed_request_gets_500() {
    let server = spawn_server(Arc::new(ScriptedProber::new())).await;

    let response = request(server.addr, "get\n").await;
    assert_eq!(response, "500 malformed data\n");

    server.shutdown.cancel();
    let _ = server.handle.await;
}

#[tokio::test]
async fn test_connection_serves_multiple_requests() {
    let prober = ScriptedProber::new()
        .with_mx("example.com", vec![MxHost::new("mail.example.com", 10)])
        .with_tlsa("mail.example.com", dane_ee_answer());
    let server = spawn_server(Arc::new(prober)).await;

    let stream = TcpStream::connect(server.addr).await.expect("connect");
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);
    let mut response = String::new();

    for (line, expected) in [
        ("get example.com\n", "200 dane-only\n"),
        ("get unknown.test\n", "500 no dane record found\n"),
        ("nonsense\n", "500 malformed data\n"),
    ] {
        write_half.write_all(line.as_bytes()).await.expect("write");
        response.clear();
        reader.read_line(&mut response).await.expect("read");
        assert_eq!(response, expected);
    }

    server.shutdown.cancel();
    let _ = server.handle.await;
}

#[tokio::test]
async fn test_request_written_in_pieces_stays_intact() {
    // A slow client writes half a request, stalls past the server's
    // read-poll interval, then writes the rest. The bytes from before
    // the stall must not be dropped.
    let prober = ScriptedProber::new()
        .with_mx("example.com", vec![MxHost::new("mail.example.com", 10)])
        .with_tlsa("mail.example.com", dane_ee_answer());
    let server = spawn_server(Arc::new(prober)).await;

    let stream = TcpStream::connect(server.addr).await.expect("connect");
    let (read_half, mut write_half) = stream.into_split();

    write_half.write_all(b"get exam").await.expect("write");
    write_half.flush().await.expect("flush");
    tokio::time::sleep(std::time::Duration::from_millis(1500)).await;
    write_half.write_all(b"ple.com\n").await.expect("write");

    let mut reader = BufReader::new(read_half);
    let mut response = String::new();
    reader.read_line(&mut response).await.expect("read");
    assert_eq!(response, "200 dane-only\n");

    server.shutdown.cancel();
    let _ = server.handle.await;
}

#[tokio::test]
async fn test_slow_lookup_does_not_block_other_connections() {
    // One connection asks about a domain whose MX lookup stalls; a
    // second connection must still be answered promptly.
    let slow_prober = ScriptedProber::new()
        .with_mx("slow.test", vec![MxHost::new("mx.slow.test", 10)])
        .with_delay(std::time::Duration::from_secs(2));
    let server = spawn_server(Arc::new(slow_prober)).await;

    let slow_addr = server.addr;
    let slow_task = tokio::spawn(async move { request(slow_addr, "get slow.test\n").await });

    // Give the slow request a moment to start blocking.
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let fast_response = tokio::time::timeout(
        std::time::Duration::from_millis(500),
        request(server.addr, "bogus\n"),
    )
    .await
    .expect("fast connection should not wait for the slow one");
    assert_eq!(fast_response, "500 malformed data\n");

    let slow_response = slow_task.await.expect("join");
    assert_eq!(slow_response, "500 no dane record found\n");

    server.shutdown.cancel();
    let _ = server.handle.await;
}
