//! WebSocket transport layer feeding the coordinator
//!
//! One task pair per connection: the reader decodes inbound text frames into
//! [`ClientMessage`]s and forwards them as session events, the writer drains
//! the connection's bounded outbound channel into the socket. Malformed
//! frames are dropped here, before they can reach the coordinator.

use crate::broadcast::OUTBOUND_BUFFER;
use crate::coordinator::SessionEvent;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use shared::ClientMessage;
use std::net::SocketAddr;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Accepts participant connections and spawns a handler per connection
pub struct NetworkServer {
    listener: TcpListener,
}

impl NetworkServer {
    /// Binds the relay's listening socket.
    pub async fn bind(addr: &str) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        info!("Relay listening on {}", listener.local_addr()?);
        Ok(Self { listener })
    }

    /// Address actually bound; lets tests use an ephemeral port.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept loop. Each connection gets a fresh id and its own handler task.
    pub async fn run(self, events: mpsc::UnboundedSender<SessionEvent>) {
        let mut next_conn_id: u32 = 1;

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let conn_id = next_conn_id;
                    next_conn_id += 1;
                    info!("New connection {} from {}", conn_id, peer);

                    let events = events.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, conn_id, events).await {
                            debug!("Connection {} from {} ended: {}", conn_id, peer, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }
}

/// Runs one connection: handshake, writer task, then the read loop.
///
/// Emits `Disconnected` on every exit path; the registry's idempotent leave
/// absorbs the cases where eviction got there first.
async fn handle_connection(
    stream: TcpStream,
    conn_id: u32,
    events: mpsc::UnboundedSender<SessionEvent>,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let ws_stream = accept_async(stream).await?;
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let (outbound_tx, mut outbound_rx) = mpsc::channel::<Message>(OUTBOUND_BUFFER);

    if events
        .send(SessionEvent::Connected {
            conn_id,
            sender: outbound_tx.clone(),
        })
        .is_err()
    {
        // Coordinator already gone; the session is shutting down.
        return Ok(());
    }

    // Writer half: drains the bounded outbound queue into the socket.
    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if ws_sender.send(frame).await.is_err() {
                // The read loop observes the broken stream and cleans up.
                break;
            }
        }
    });

    while let Some(frame) = ws_receiver.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(message) => {
                    if events
                        .send(SessionEvent::Inbound { conn_id, message })
                        .is_err()
                    {
                        break;
                    }
                }
                Err(e) => {
                    // One bad client message must not affect anyone else's
                    // session; drop it and keep reading.
                    debug!("Dropping malformed frame from connection {}: {}", conn_id, e);
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.try_send(Message::Pong(payload));
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {
                // Binary and pong frames carry nothing for the relay.
            }
            Err(e) => {
                warn!("Receive error on connection {}: {}", conn_id, e);
                break;
            }
        }
    }

    let _ = events.send(SessionEvent::Disconnected { conn_id });
    // Any frames still queued for a departed participant are simply dropped.
    writer.abort();

    Ok(())
}
