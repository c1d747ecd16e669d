//! One-shot localhost listener for the OAuth authorization redirect.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use url::Url;

use super::AuthError;

const ACK_BODY: &str = "Go back to your terminal. :)";

/// Query parameters delivered by the authorization redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Callback {
    pub(crate) code: String,
    pub(crate) state: String,
}

/// A bound callback listener, torn down after one authorization attempt.
#[derive(Debug)]
pub(crate) struct CallbackServer {
    listener: TcpListener,
}

impl CallbackServer {
    /// Binds the listener. Bind failure fails the whole flow.
    pub(crate) async fn bind(addr: SocketAddr) -> Result<Self, AuthError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(AuthError::ListenerBind)?;
        Ok(Self { listener })
    }

    pub(crate) fn local_addr(&self) -> Result<SocketAddr, AuthError> {
        self.listener.local_addr().map_err(AuthError::ListenerBind)
    }

    /// Serves redirects until one parseable callback arrives, then returns
    /// it. Every connection is answered with the acknowledgement body, but
    /// only the first parsed callback is delivered; retried redirects are
    /// acknowledged and dropped.
    ///
    /// With `timeout: None` this waits indefinitely, matching the reference
    /// behavior; passing a limit is the documented hardening knob.
    pub(crate) async fn recv(self, timeout: Option<Duration>) -> Result<Callback, AuthError> {
        let (tx, rx) = oneshot::channel();
        let server = tokio::spawn(serve(self.listener, tx));

        let received = match timeout {
            Some(limit) => match tokio::time::timeout(limit, rx).await {
                Ok(received) => received,
                Err(_) => {
                    server.abort();
                    return Err(AuthError::Timeout);
                }
            },
            None => rx.await,
        };
        server.abort();

        received.map_err(|_| AuthError::Callback("listener stopped before a redirect".to_string()))
    }
}

async fn serve(listener: TcpListener, tx: oneshot::Sender<Callback>) {
    // The sender is taken on first delivery; later callbacks are answered
    // but never re-delivered into the already-satisfied wait.
    let mut tx = Some(tx);
    loop {
        let (mut socket, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(err) => {
                tracing::warn!(%err, "callback accept failed");
                continue;
            }
        };

        let request = match read_head(&mut socket).await {
            Some(request) => request,
            None => continue,
        };
        let callback = parse_request(&request);

        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{ACK_BODY}",
            ACK_BODY.len()
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;

        if let Some(callback) = callback {
            tracing::debug!(%peer, "authorization redirect received");
            if let Some(tx) = tx.take() {
                let _ = tx.send(callback);
            }
        }
    }
}

/// Reads until the end of the request head, so a request line split across
/// TCP segments still arrives whole. Capped at 8 KiB.
async fn read_head(socket: &mut tokio::net::TcpStream) -> Option<String> {
    let mut head = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let size = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(size) => size,
        };
        head.extend_from_slice(&chunk[..size]);
        if head.windows(4).any(|sep| sep == b"\r\n\r\n") || head.len() >= 8192 {
            break;
        }
    }
    if head.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&head).into_owned())
    }
}

fn parse_request(request: &str) -> Option<Callback> {
    let first = request.lines().next()?;
    let mut parts = first.split_whitespace();
    if parts.next()? != "GET" {
        return None;
    }
    parse_target(parts.next()?)
}

fn parse_target(target: &str) -> Option<Callback> {
    let url = Url::parse(&format!("http://localhost{target}")).ok()?;

    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            _ => {}
        }
    }

    Some(Callback {
        code: code?,
        state: state?,
    })
}
