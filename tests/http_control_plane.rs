// tests/http_control_plane.rs

mod common;
use crate::common::{SettingsBuilder, init_tracing, with_timeout};

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use flowdeploy::control_plane::{ControlPlane, HttpControlPlane};
use flowdeploy::deploy::probe;
use flowdeploy::errors::FlowdeployError;

/// Serve exactly one HTTP request with `status` and `body`.
///
/// The join handle yields the raw request that was received.
async fn serve_once(status: &'static str, body: &'static str) -> (u16, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (port, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let content_length = text[..end]
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn client_for(port: u16) -> HttpControlPlane {
    let settings = SettingsBuilder::new(std::env::temp_dir())
        .env("PREFECT_SERVER_API_PORT", &port.to_string())
        .build();
    HttpControlPlane::new(&settings.target, Some(Duration::from_secs(2))).unwrap()
}

#[tokio::test]
async fn lists_pools_from_json_array() {
    init_tracing();

    let (port, server) = serve_once(
        "200 OK",
        r#"[{"name":"default","type":"process","id":"abc"},{"name":"gpu","type":"kubernetes"}]"#,
    )
    .await;
    let client = client_for(port);
    assert_eq!(client.base_url(), format!("http://127.0.0.1:{port}/api"));

    let pools = with_timeout(client.list_pools()).await.unwrap();

    let names: Vec<_> = pools.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, ["default", "gpu"]);
    assert_eq!(pools[1].kind.as_deref(), Some("kubernetes"));

    let request = server.await.unwrap();
    assert!(
        request.starts_with("POST /api/work_pools/filter "),
        "unexpected request:\n{request}"
    );
}

#[tokio::test]
async fn server_error_is_a_connectivity_error() {
    init_tracing();

    let (port, server) = serve_once("503 Service Unavailable", r#"{"detail":"starting"}"#).await;
    let client = client_for(port);

    let err = with_timeout(client.list_pools()).await.unwrap_err();
    match err {
        FlowdeployError::Connectivity(msg) => assert!(msg.contains("503"), "{msg}"),
        other => panic!("expected connectivity error, got {other:?}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    init_tracing();

    let (port, server) = serve_once("200 OK", r#"{"not":"a list"}"#).await;
    let client = client_for(port);

    let err = with_timeout(client.list_pools()).await.unwrap_err();
    assert!(matches!(err, FlowdeployError::Connectivity(_)), "got {err:?}");
    server.await.unwrap();
}

#[tokio::test]
async fn refused_connection_means_not_ready() {
    init_tracing();

    // Grab a free port, then close it again.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = client_for(port);

    assert!(with_timeout(client.list_pools()).await.is_err());
    assert!(!with_timeout(probe::is_ready(&client)).await);
}
