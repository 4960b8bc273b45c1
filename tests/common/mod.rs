//! Minimal HTTP stub serving fixed list bodies for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Path that answers only after this delay, to exercise timeouts
pub const SLOW_PATH: &str = "/slow";
const SLOW_DELAY: Duration = Duration::from_secs(5);

/// Canned response for one path
#[derive(Clone)]
pub struct Route {
    pub status: u16,
    pub body: String,
}

impl Route {
    pub fn ok(body: &str) -> Self {
        Self {
            status: 200,
            body: body.to_string(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
        }
    }
}

/// Start a stub server on an ephemeral port. Unknown paths answer 404.
pub async fn serve(routes: &[(&str, Route)]) -> SocketAddr {
    let routes: Arc<HashMap<String, Route>> = Arc::new(
        routes
            .iter()
            .map(|(path, route)| (path.to_string(), route.clone()))
            .collect(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            let routes = Arc::clone(&routes);
            tokio::spawn(async move { handle(socket, &routes).await });
        }
    });

    addr
}

async fn handle(mut socket: TcpStream, routes: &HashMap<String, Route>) {
    let mut buf = vec![0u8; 8192];
    let mut read = 0;
    loop {
        let n = match socket.read(&mut buf[read..]).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        read += n;
        if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
        if read == buf.len() {
            return;
        }
    }

    let request = String::from_utf8_lossy(&buf[..read]);
    let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

    if path == SLOW_PATH {
        tokio::time::sleep(SLOW_DELAY).await;
    }

    let route = routes
        .get(&path)
        .cloned()
        .unwrap_or_else(|| Route::status(404));
    let reason = if route.status == 200 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        route.status,
        reason,
        route.body.len(),
        route.body
    );

    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

pub fn url(addr: SocketAddr, path: &str) -> String {
    format!("http://{}{}", addr, path)
}
