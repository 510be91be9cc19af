//! Room actor: a Tokio task that owns the session.
//!
//! The outside world only holds a [`RoomHandle`], a thin wrapper around the
//! sending half of the actor's command channel. No locks: the session is
//! touched by exactly one task.
//!
//! Every connection handler pushes commands into the same queue, and the
//! actor pops them one at a time and runs each to completion before looking
//! at the next. That queue is the game's single ordering point. Two guesses
//! arriving "at once" from different sockets are still applied one after
//! the other, and every client sees the resulting events in the order the
//! session produced them.
//!
//! ```text
//! handler A ─┐                       ┌─► conn A outbound
//! handler B ─┼─► mpsc ─► RoomActor ──┼─► conn B outbound
//! handler C ─┘     (Session)         └─► conn C outbound
//! ```

use tokio::sync::{mpsc, oneshot};
use whodunit_protocol::{ClientEvent, ConnId, PlayerView, ServerEvent};
use whodunit_session::{MasterGate, Outbound, Phase, Session, SessionError};

use crate::{Broadcaster, EventSender, RoomError};

/// Commands sent to the room actor.
///
/// Variants carrying a `oneshot::Sender` expect a reply. The sender is a
/// "reply channel": the handle creates a oneshot pair, ships the sending
/// half inside the command, and awaits the receiving half. The actor
/// answers once it reaches the command in the queue. If the actor has
/// stopped, the sending half is dropped unanswered and the caller sees
/// [`RoomError::Unavailable`].
///
/// The other variants are fire-and-forget. Rule rejections for an
/// `Event` travel back as `error` events on the connection's own
/// outbound channel, not through a reply.
enum RoomCommand {
    /// Attach a freshly accepted connection.
    Connect {
        conn: ConnId,
        sender: EventSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Apply an intent from a connection.
    Event { conn: ConnId, event: ClientEvent },

    /// Unwind a connection's seat and detach it.
    Disconnect { conn: ConnId },

    /// Report the current session state.
    Snapshot { reply: oneshot::Sender<RoomSnapshot> },

    /// Stop the actor.
    Shutdown,
}

/// Read-only view of the room at one point in its event order.
#[derive(Debug, Clone)]
pub struct RoomSnapshot {
    pub phase: Phase,
    pub game_master: Option<ConnId>,
    pub current_player: Option<ConnId>,
    pub players: Vec<PlayerView>,
    /// Attached connections, seated or not.
    pub connections: usize,
}

/// Handle to the running room actor.
///
/// Cheap to clone: it is just an `mpsc::Sender` wrapper. The server keeps
/// one and every connection handler gets its own clone. When the last
/// handle is dropped the channel closes and the actor loop ends on its
/// own, even without a [`shutdown`](Self::shutdown).
#[derive(Clone)]
pub struct RoomHandle {
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// Attaches a connection so it starts receiving broadcasts.
    ///
    /// # Errors
    /// - [`RoomError::AlreadyConnected`] if `conn` is already attached
    /// - [`RoomError::Unavailable`] if the actor has stopped
    pub async fn connect(
        &self,
        conn: ConnId,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Connect {
                conn,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable)?;
        reply_rx.await.map_err(|_| RoomError::Unavailable)?
    }

    /// Queues an intent. Rejections come back as `error` events on the
    /// connection's own channel, not here.
    pub async fn send_event(
        &self,
        conn: ConnId,
        event: ClientEvent,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Event { conn, event })
            .await
            .map_err(|_| RoomError::Unavailable)
    }

    /// Queues the disconnect of `conn`. Idempotent.
    pub async fn disconnect(&self, conn: ConnId) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Disconnect { conn })
            .await
            .map_err(|_| RoomError::Unavailable)
    }

    /// Returns the session state after every command queued before it.
    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable)?;
        reply_rx.await.map_err(|_| RoomError::Unavailable)
    }

    /// Tells the room to stop.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable)
    }
}

/// The actor state. Lives inside the spawned task.
///
/// `gate` is consulted before the session sees a game-master claim, so the
/// session itself only ever receives a yes/no answer and never holds the
/// passphrase.
struct RoomActor<M> {
    session: Session,
    gate: M,
    broadcaster: Broadcaster,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl<M: MasterGate> RoomActor<M> {
    /// Processes commands until shutdown or until every handle is dropped.
    async fn run(mut self) {
        tracing::info!("room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Connect {
                    conn,
                    sender,
                    reply,
                } => {
                    let result = self.handle_connect(conn, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Event { conn, event } => {
                    self.handle_event(conn, event);
                }
                RoomCommand::Disconnect { conn } => {
                    self.handle_disconnect(conn);
                }
                RoomCommand::Snapshot { reply } => {
                    let _ = reply.send(self.snapshot());
                }
                RoomCommand::Shutdown => {
                    tracing::info!("room shutting down");
                    break;
                }
            }
        }

        tracing::info!("room actor stopped");
    }

    fn handle_connect(
        &mut self,
        conn: ConnId,
        sender: EventSender,
    ) -> Result<(), RoomError> {
        if !self.broadcaster.attach(conn, sender) {
            return Err(RoomError::AlreadyConnected(conn));
        }
        tracing::debug!(
            %conn,
            connections = self.broadcaster.len(),
            "connection attached"
        );

        // The roster is public: show it before the join form is submitted.
        self.broadcaster.send_to(
            conn,
            ServerEvent::UpdatePlayers(self.session.roster()),
        );
        Ok(())
    }

    fn handle_event(&mut self, conn: ConnId, event: ClientEvent) {
        if !self.broadcaster.is_attached(conn) {
            tracing::warn!(
                %conn,
                event = event.name(),
                "event from unattached connection, ignoring"
            );
            return;
        }

        let name = event.name();
        match self.apply(conn, event) {
            Ok(events) => self.broadcaster.dispatch(events),
            Err(reason) => {
                tracing::debug!(%conn, event = name, %reason, "intent rejected");
                self.broadcaster
                    .send_to(conn, ServerEvent::Error(reason.to_string()));
            }
        }
    }

    fn apply(
        &mut self,
        conn: ConnId,
        event: ClientEvent,
    ) -> Result<Vec<Outbound>, SessionError> {
        match event {
            ClientEvent::Join(req) => {
                let admitted = req.is_game_master
                    && self.gate.admit(req.password.as_deref());
                self.session
                    .join(conn, &req.name, req.is_game_master, admitted)
            }
            ClientEvent::Guess(guess) => self.session.guess(conn, guess),
            ClientEvent::StartNewGame => self.session.start_new_game(conn),
            ClientEvent::EndGame => self.session.end_game(conn),
            ClientEvent::ResetScores => self.session.reset_scores(conn),
        }
    }

    fn handle_disconnect(&mut self, conn: ConnId) {
        // Detach first so nothing is queued to a handler that is going away.
        let was_attached = self.broadcaster.detach(conn);
        let events = self.session.disconnect(conn);
        self.broadcaster.dispatch(events);
        if was_attached {
            tracing::debug!(
                %conn,
                connections = self.broadcaster.len(),
                "connection detached"
            );
            if self.broadcaster.is_empty() {
                tracing::info!(phase = %self.session.phase(), "room is empty");
            }
        }
    }

    fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            phase: self.session.phase(),
            game_master: self.session.game_master(),
            current_player: self.session.current_player(),
            players: self.session.roster(),
            connections: self.broadcaster.len(),
        }
    }
}

/// Spawns the room actor and returns a handle to it.
///
/// `channel_size` bounds the command queue. When it is full, callers of
/// the handle wait, which pushes back on the socket readers instead of
/// buffering without limit. Must be called from within a Tokio runtime.
pub fn spawn_room<M: MasterGate>(
    session: Session,
    gate: M,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = RoomActor {
        session,
        gate,
        broadcaster: Broadcaster::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle { sender: tx }
}
