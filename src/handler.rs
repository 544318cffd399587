//! TCP connection handler
//!
//! Drives one connection through its lifecycle:
//! - Connecting: read the first line as the participant's display name.
//!   Any failure here drops the connection without registering it.
//! - Active: the participant is registered with the ChatServer; a read
//!   task turns inbound lines into chat commands and a write task drains
//!   the outbound queue to the socket.
//! - Closing: whichever task stops first ends the session. The handler
//!   sends exactly one `Leave`, lets the writer flush, and returns.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info, warn};

use crate::codec::LineCodec;
use crate::config::Config;
use crate::error::RelayError;
use crate::message::ServerMessage;
use crate::participant::Participant;
use crate::server::ServerCommand;
use crate::types::ParticipantId;

/// One step of the inbound line stream
#[derive(Debug, PartialEq, Eq)]
enum Inbound {
    /// A complete, newline-terminated line
    Line(String),
    /// Peer closed the stream
    Closed,
    /// No complete line within the idle timeout
    Idle,
}

/// Handle a new TCP connection
///
/// Returns an error only for failures before the participant became
/// Active; everything after that is a normal disconnect.
pub async fn handle_connection(
    stream: TcpStream,
    cmd_tx: mpsc::Sender<ServerCommand>,
    config: Arc<Config>,
) -> Result<(), RelayError> {
    let peer_addr = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    debug!("New TCP connection from {}", peer_addr);

    let (read_half, write_half) = stream.into_split();
    let mut lines = FramedRead::new(read_half, LineCodec::new(config.max_line_length));
    let sink = FramedWrite::new(write_half, LineCodec::new(config.max_line_length));

    let name = read_name(&mut lines, config.idle_timeout()).await?;

    // Register with ChatServer; the welcome lands in the queue before the writer starts
    let (participant, queue) = Participant::with_queue(name.clone(), config.queue_capacity);
    let id = participant.id;
    if cmd_tx
        .send(ServerCommand::Join { participant })
        .await
        .is_err()
    {
        error!("Failed to register {} - server closed", name);
        return Err(RelayError::ServerClosed);
    }

    info!("{} ({}) connected from {}", name, id, peer_addr);

    let mut write_task = tokio::spawn(write_loop(sink, queue));
    let mut read_task = tokio::spawn(read_loop(
        lines,
        cmd_tx.clone(),
        id,
        config.idle_timeout(),
    ));

    // Wait for either task to complete
    let writer_finished = tokio::select! {
        result = &mut read_task => {
            match result {
                Ok(Ok(())) => debug!("Read task completed for {}", id),
                Ok(Err(e)) => debug!("Read task for {} ended with error: {}", id, e),
                Err(e) => warn!("Read task for {} panicked or was cancelled: {}", id, e),
            }
            false
        }
        result = &mut write_task => {
            match result {
                Ok(Ok(())) => debug!("Write task completed for {}", id),
                Ok(Err(e)) => debug!("Write task for {} ended with error: {}", id, e),
                Err(e) => warn!("Write task for {} panicked or was cancelled: {}", id, e),
            }
            true
        }
    };

    if writer_finished {
        read_task.abort();
    }

    // Removal closes the queue, which lets the writer finish on its own
    if cmd_tx.send(ServerCommand::Leave { id }).await.is_err() {
        debug!("Server closed before {} could leave", id);
    }

    if !writer_finished && timeout(config.drain_timeout(), &mut write_task).await.is_err() {
        warn!("Writer for {} did not drain in time, aborting", name);
        write_task.abort();
    }

    info!("{} ({}) disconnected", name, id);

    Ok(())
}

/// Read the participant's display name from the first line
async fn read_name<R>(
    lines: &mut FramedRead<R, LineCodec>,
    idle: Option<Duration>,
) -> Result<String, RelayError>
where
    R: AsyncRead + Unpin,
{
    match next_line(lines, idle).await? {
        Inbound::Line(line) => Ok(line.trim().to_string()),
        Inbound::Closed => Err(RelayError::ClosedBeforeName),
        Inbound::Idle => Err(RelayError::NameTimeout),
    }
}

/// Receive the next inbound line, honouring the optional idle timeout
async fn next_line<R>(
    lines: &mut FramedRead<R, LineCodec>,
    idle: Option<Duration>,
) -> Result<Inbound, RelayError>
where
    R: AsyncRead + Unpin,
{
    let next = match idle {
        Some(limit) => match timeout(limit, lines.next()).await {
            Ok(next) => next,
            Err(_) => return Ok(Inbound::Idle),
        },
        None => lines.next().await,
    };

    match next {
        Some(line) => Ok(Inbound::Line(line?)),
        None => Ok(Inbound::Closed),
    }
}

/// Inbound lines → chat commands, until the peer goes away
async fn read_loop<R>(
    mut lines: FramedRead<R, LineCodec>,
    cmd_tx: mpsc::Sender<ServerCommand>,
    id: ParticipantId,
    idle: Option<Duration>,
) -> Result<(), RelayError>
where
    R: AsyncRead + Unpin,
{
    loop {
        let line = match next_line(&mut lines, idle).await? {
            Inbound::Line(line) => line,
            Inbound::Closed => return Ok(()),
            Inbound::Idle => {
                info!("{} idle, disconnecting", id);
                return Ok(());
            }
        };

        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        let cmd = ServerCommand::Chat {
            id,
            text: text.to_string(),
        };
        if cmd_tx.send(cmd).await.is_err() {
            debug!("Server closed, ending read task for {}", id);
            return Err(RelayError::ServerClosed);
        }
    }
}

/// Outbound queue → socket, in FIFO order, until the queue closes
async fn write_loop<W>(
    mut sink: FramedWrite<W, LineCodec>,
    mut queue: mpsc::Receiver<ServerMessage>,
) -> Result<(), RelayError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(msg) = queue.recv().await {
        sink.send(msg.to_string()).await?;
    }

    // Half-close so the peer sees end-of-stream
    sink.close().await?;
    Ok(())
}
