use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Loopback rendezvous between the instance waiting for the callback and the
/// instance the OS launches with the callback URL in argv. One connection
/// carries one newline-terminated URL.
pub struct CallbackRelay {
    listener: TcpListener,
}

impl CallbackRelay {
    pub async fn bind(port: u16) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", port))
            .await
            .with_context(|| format!("Failed to bind callback relay on 127.0.0.1:{}", port))?;
        Ok(Self { listener })
    }

    pub fn local_port(&self) -> Result<u16> {
        Ok(self.listener.local_addr()?.port())
    }

    pub async fn run(self, tx: mpsc::UnboundedSender<String>) {
        loop {
            let (mut socket, addr) = match self.listener.accept().await {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("Callback relay accept failed: {}", e);
                    continue;
                }
            };
            debug!("Callback relay connection from {}", addr);

            let mut raw = String::new();
            if let Err(e) = socket.read_to_string(&mut raw).await {
                warn!("Callback relay read failed: {}", e);
                continue;
            }

            let url = raw.trim();
            if url.is_empty() {
                continue;
            }
            if tx.send(url.to_string()).is_err() {
                // Flow finished; nothing left to deliver to.
                return;
            }
        }
    }
}

/// Used by the secondary invocation: hand the callback URL to the instance
/// that owns the browser session, then exit.
pub async fn forward_callback(port: u16, url: &str) -> Result<()> {
    let mut stream = TcpStream::connect(("127.0.0.1", port))
        .await
        .with_context(|| format!("No running instance listening on 127.0.0.1:{}", port))?;
    stream.write_all(url.as_bytes()).await?;
    stream.write_all(b"\n").await?;
    stream.shutdown().await?;
    Ok(())
}
