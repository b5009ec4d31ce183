//! End-to-end tests: the real accept loop and the real client, with a shell
//! script standing in for the programmer tool.
// (c) 2025 Ross Younger

#![cfg(unix)]

use std::net::SocketAddr;
use std::os::unix::fs::PermissionsExt as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use assertables::assert_contains;
use indicatif::{MultiProgress, ProgressDrawTarget};
use pretty_assertions::assert_eq;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt as _, AsyncWriteExt as _};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use rfp::client::{client_main, ProgramJob};
use rfp::protocol::ProgrammingResult;
use rfp::server::{serve, ServerOptions};

/// Creates an executable shell script standing in for openFPGALoader.
/// It is invoked as `tool -v -b <board> <bitstream>`, so `$3` is the board
/// and `$4` the bitstream path.
fn fake_tool(dir: &TempDir, body: &str) -> PathBuf {
    let path = dir.path().join("fake-loader");
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
    path
}

/// Spawns the server loop on an ephemeral local port
async fn start_server(
    programmer: &Path,
    program_timeout: Duration,
) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let options = ServerOptions {
        programmer: programmer.to_string_lossy().into_owned(),
        program_timeout,
        ..ServerOptions::default()
    };
    let handle = tokio::spawn(async move {
        let _ = serve(listener, options).await;
    });
    (addr, handle)
}

fn job_for(addr: SocketAddr, file: &Path, board: &str) -> ProgramJob {
    ProgramJob {
        file: file.to_owned(),
        board_type: board.into(),
        host: addr.ip().to_string(),
        port: addr.port(),
    }
}

fn hidden_display() -> MultiProgress {
    MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
}

#[tokio::test]
async fn round_trip_materializes_exactly_and_cleans_up() {
    let dir = TempDir::new().unwrap();
    let seen = dir.path().join("seen-path");
    // record where the bitstream landed, then reflect its content
    let tool = fake_tool(
        &dir,
        &format!("echo \"$4\" > {}\ncat \"$4\"", seen.display()),
    );
    let (addr, server) = start_server(&tool, Duration::from_secs(10)).await;

    let bitstream = dir.path().join("demo.fs");
    std::fs::write(&bitstream, b"0123456789").unwrap();
    let job = job_for(addr, &bitstream, "tangnano9k");
    let result = client_main(&job, &hidden_display(), true).await.unwrap();

    assert_eq!(result.returncode, 0);
    assert_eq!(result.stdout, "0123456789");
    assert!(result.stderr.is_empty());

    // the server's temporary copy is gone by the time we have the result
    let temp_path = std::fs::read_to_string(&seen).unwrap();
    assert!(!Path::new(temp_path.trim()).exists());
    server.abort();
}

#[tokio::test]
async fn tool_stdout_and_exit_code_are_relayed() {
    let dir = TempDir::new().unwrap();
    let tool = fake_tool(&dir, "echo OK");
    let (addr, server) = start_server(&tool, Duration::from_secs(10)).await;

    let bitstream = dir.path().join("demo.fs");
    std::fs::write(&bitstream, &[0xa5u8; 10]).unwrap();
    let job = job_for(addr, &bitstream, "tangnano9k");
    let result = client_main(&job, &hidden_display(), true).await.unwrap();

    assert_eq!(result.returncode, 0);
    assert!(result.success());
    assert_eq!(result.stdout.trim_end(), "OK");
    server.abort();
}

#[tokio::test]
async fn large_payload_arrives_whole() {
    let dir = TempDir::new().unwrap();
    let tool = fake_tool(&dir, "wc -c < \"$4\"");
    let (addr, server) = start_server(&tool, Duration::from_secs(10)).await;

    let bitstream = dir.path().join("big.fs");
    std::fs::write(&bitstream, vec![0x5a; 1_048_576]).unwrap();
    let job = job_for(addr, &bitstream, "tangnano9k");
    let result = client_main(&job, &hidden_display(), true).await.unwrap();

    assert_eq!(result.returncode, 0);
    assert_eq!(result.stdout.trim(), "1048576");
    server.abort();
}

#[tokio::test]
async fn empty_payload_is_legal() {
    let dir = TempDir::new().unwrap();
    let tool = fake_tool(&dir, "wc -c < \"$4\"");
    let (addr, server) = start_server(&tool, Duration::from_secs(10)).await;

    let bitstream = dir.path().join("empty.fs");
    std::fs::write(&bitstream, b"").unwrap();
    let job = job_for(addr, &bitstream, "tangnano9k");
    let result = client_main(&job, &hidden_display(), true).await.unwrap();

    assert_eq!(result.returncode, 0);
    assert_eq!(result.stdout.trim(), "0");
    server.abort();
}

#[tokio::test]
async fn incomplete_transfer_never_invokes_the_tool() {
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("invoked");
    let tool = fake_tool(&dir, &format!("touch {}", marker.display()));
    let (addr, server) = start_server(&tool, Duration::from_secs(10)).await;

    // promise 100 payload bytes but hang up after 40
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_u32(100).await.unwrap();
    stream.write_u8(10).await.unwrap();
    stream.write_all(b"tangnano9k").await.unwrap();
    stream.write_all(&[0u8; 40]).await.unwrap();
    stream.shutdown().await.unwrap();

    let mut response = Vec::new();
    let _ = stream.read_to_end(&mut response).await.unwrap();
    let result: ProgrammingResult = serde_json::from_slice(&response).unwrap();
    assert_eq!(result.returncode, -1);
    assert_contains!(result.stderr, "received 40 of 100");
    assert!(!marker.exists());
    server.abort();
}

#[tokio::test]
async fn overrunning_tool_reports_timeout_and_cleans_up() {
    let dir = TempDir::new().unwrap();
    let seen = dir.path().join("seen-path");
    let tool = fake_tool(&dir, &format!("echo \"$4\" > {}\nsleep 5", seen.display()));
    let (addr, server) = start_server(&tool, Duration::from_millis(300)).await;

    let bitstream = dir.path().join("demo.fs");
    std::fs::write(&bitstream, b"xx").unwrap();
    let job = job_for(addr, &bitstream, "tangnano9k");
    let result = client_main(&job, &hidden_display(), true).await.unwrap();

    assert_eq!(result.returncode, -1);
    assert!(result.stdout.is_empty());
    assert_eq!(result.stderr, "Timeout expired");

    let temp_path = std::fs::read_to_string(&seen).unwrap();
    assert!(!Path::new(temp_path.trim()).exists());
    server.abort();
}

#[tokio::test]
async fn concurrent_clients_get_their_own_results() {
    let dir = TempDir::new().unwrap();
    // the sleep holds both handlers in flight at once
    let tool = fake_tool(&dir, "sleep 1; echo \"board=$3\"");
    let (addr, server) = start_server(&tool, Duration::from_secs(10)).await;

    let first = dir.path().join("first.fs");
    let second = dir.path().join("second.fs");
    std::fs::write(&first, b"first payload").unwrap();
    std::fs::write(&second, b"second payload").unwrap();

    let job_a = job_for(addr, &first, "tangnano9k");
    let job_b = job_for(addr, &second, "tangnano20k");
    let display = hidden_display();
    let (result_a, result_b) = tokio::join!(
        client_main(&job_a, &display, true),
        client_main(&job_b, &display, true),
    );
    let result_a = result_a.unwrap();
    let result_b = result_b.unwrap();

    assert_eq!(result_a.stdout.trim_end(), "board=tangnano9k");
    assert_eq!(result_b.stdout.trim_end(), "board=tangnano20k");
    server.abort();
}

#[tokio::test]
async fn long_board_type_roundtrips() {
    let dir = TempDir::new().unwrap();
    let tool = fake_tool(&dir, "echo \"$3\"");
    let (addr, server) = start_server(&tool, Duration::from_secs(10)).await;

    let bitstream = dir.path().join("demo.fs");
    std::fs::write(&bitstream, b"z").unwrap();
    let board = "b".repeat(255);
    let job = job_for(addr, &bitstream, &board);
    let result = client_main(&job, &hidden_display(), true).await.unwrap();

    assert_eq!(result.returncode, 0);
    assert_eq!(result.stdout.trim_end(), board);
    server.abort();
}

#[tokio::test]
async fn connection_refused_is_a_client_error() {
    // bind-then-drop to find a port with nothing listening
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = TempDir::new().unwrap();
    let bitstream = dir.path().join("demo.fs");
    std::fs::write(&bitstream, b"z").unwrap();
    let job = job_for(addr, &bitstream, "tangnano9k");
    let err = client_main(&job, &hidden_display(), true)
        .await
        .unwrap_err();
    assert_contains!(format!("{err:#}"), "could not connect");
}
