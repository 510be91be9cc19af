//! Per-connection handler: attach to the room, then pump frames both ways.
//!
//! Each accepted connection gets its own Tokio task running
//! [`handle_connection`], plus a writer task:
//!   1. Attach to the room with a fresh outbound channel
//!   2. Writer task: outbound channel → encode → socket
//!   3. Reader loop: socket → decode → room
//!   4. On exit, a drop guard queues the disconnect

use std::sync::Arc;

use tokio::sync::mpsc;
use whodunit_protocol::{ClientEvent, Codec, ConnId, ServerEvent};
use whodunit_room::RoomHandle;
use whodunit_transport::{Connection, WebSocketConnection};

use crate::WhodunitError;
use crate::server::ServerState;

/// Drop guard that unwinds the connection's seat when the handler exits.
///
/// Runs even if the handler returns early with an error. `Drop` is
/// synchronous, so the disconnect is queued from a spawned task.
struct ConnectionGuard {
    conn_id: ConnId,
    room: RoomHandle,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let room = self.room.clone();
        tokio::spawn(async move {
            if room.disconnect(conn_id).await.is_err() {
                tracing::debug!(%conn_id, "room gone before disconnect");
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), WhodunitError>
where
    C: Codec + Clone,
{
    let conn_id = ConnId::from(conn.id());
    let conn = Arc::new(conn);
    tracing::info!(%conn_id, peer = %conn.peer_addr(), "client connected");

    let (tx, rx) = mpsc::unbounded_channel();
    state.room.connect(conn_id, tx.clone()).await?;
    let _guard = ConnectionGuard {
        conn_id,
        room: state.room.clone(),
    };

    let writer = tokio::spawn(write_events(
        Arc::clone(&conn),
        state.codec.clone(),
        conn_id,
        rx,
    ));

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, "client disconnected");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                break;
            }
        };

        let event: ClientEvent = match state.codec.decode(&data) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "failed to decode event");
                // Fails only if the writer already hit a dead socket.
                let _ = tx
                    .send(ServerEvent::Error(format!("invalid message: {e}")));
                continue;
            }
        };

        tracing::debug!(%conn_id, event = event.name(), "event received");
        state.room.send_event(conn_id, event).await?;
    }

    // Stop writing to a socket the peer has already closed. The guard
    // still queues the disconnect when it drops below.
    writer.abort();
    Ok(())
}

/// Drains the connection's outbound channel onto the socket, in order.
///
/// Ends when the room detaches the connection (channel closed) or the
/// socket rejects a write.
async fn write_events<C: Codec>(
    conn: Arc<WebSocketConnection>,
    codec: C,
    conn_id: ConnId,
    mut rx: mpsc::UnboundedReceiver<ServerEvent>,
) {
    while let Some(event) = rx.recv().await {
        let bytes = match codec.encode(&event) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(
                    %conn_id,
                    event = event.name(),
                    error = %e,
                    "failed to encode event"
                );
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(
                %conn_id,
                error = %e,
                "send failed, stopping writer"
            );
            break;
        }
    }
}
