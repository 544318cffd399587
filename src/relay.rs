//! Listener and accept loop
//!
//! `Relay` binds the listening socket, owns the ChatServer actor for the
//! lifetime of one server instance, and spawns a handler per accepted
//! connection. Accept is intentionally unbounded.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::handler::handle_connection;
use crate::server::{ChatServer, ServerCommand};

/// Channel buffer size for server commands
const CHANNEL_BUFFER_SIZE: usize = 256;

/// Pause after a failed accept (e.g. out of file descriptors)
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// A bound, not yet running relay server
pub struct Relay {
    listener: TcpListener,
    config: Arc<Config>,
    server: ChatServer,
    cmd_tx: mpsc::Sender<ServerCommand>,
}

impl Relay {
    /// Bind the listening socket
    ///
    /// Failure here is the one fatal error of the server.
    pub async fn bind(config: Config) -> io::Result<Self> {
        let listener = TcpListener::bind(config.listen).await?;
        let (cmd_tx, cmd_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Ok(Self {
            listener,
            config: Arc::new(config),
            server: ChatServer::new(cmd_rx),
            cmd_tx,
        })
    }

    /// Address actually bound (useful with port 0)
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Subscribe to the online count
    pub fn online_count(&self) -> watch::Receiver<usize> {
        self.server.online_count()
    }

    /// Accept connections until `shutdown` resolves
    ///
    /// On shutdown the listener is closed, the ChatServer releases every
    /// participant (closing their queues), and connection tasks still
    /// running are aborted.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()> + Send,
    {
        let Relay {
            listener,
            config,
            server,
            cmd_tx,
        } = self;

        let server_task = tokio::spawn(server.run());
        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, addr)) => {
                        debug!("New connection from {}", addr);
                        let cmd_tx = cmd_tx.clone();
                        let config = Arc::clone(&config);

                        connections.spawn(async move {
                            if let Err(e) = handle_connection(stream, cmd_tx, config).await {
                                info!("Connection from {} dropped before joining: {}", addr, e);
                            }
                        });
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
                Some(joined) = connections.join_next(), if !connections.is_empty() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            error!("Connection task panicked: {}", e);
                        }
                    }
                }
            }
        }

        info!("Relay shutting down");
        drop(listener);

        if cmd_tx.send(ServerCommand::Shutdown).await.is_err() {
            warn!("ChatServer already stopped");
        }
        drop(cmd_tx);
        if let Err(e) = server_task.await {
            error!("ChatServer task failed: {}", e);
        }

        connections.shutdown().await;
        info!("Relay stopped");
    }

    /// Accept connections until Ctrl-C
    pub async fn run_until_ctrl_c(self) {
        self.run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to install Ctrl-C handler: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
    }
}
