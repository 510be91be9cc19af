//! Fan-out of session events to attached connections.

use std::collections::BTreeMap;

use tokio::sync::mpsc;
use whodunit_protocol::{ConnId, Recipient, ServerEvent};
use whodunit_session::Outbound;

/// Channel on which a connection handler receives its events.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Every connection attached to the room, seated or not.
///
/// A connection is attached as soon as its socket is accepted, before it
/// joins, so `Recipient::All` reaches onlookers still sitting on the join
/// form too.
#[derive(Debug, Default)]
pub struct Broadcaster {
    senders: BTreeMap<ConnId, EventSender>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a connection. Returns `false` if it was already attached.
    pub fn attach(&mut self, conn: ConnId, sender: EventSender) -> bool {
        if self.senders.contains_key(&conn) {
            return false;
        }
        self.senders.insert(conn, sender);
        true
    }

    /// Detaches a connection. Returns `false` if it was not attached.
    pub fn detach(&mut self, conn: ConnId) -> bool {
        self.senders.remove(&conn).is_some()
    }

    pub fn is_attached(&self, conn: ConnId) -> bool {
        self.senders.contains_key(&conn)
    }

    pub fn len(&self) -> usize {
        self.senders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.senders.is_empty()
    }

    /// Delivers each event to its audience, preserving order.
    pub fn dispatch(&self, events: Vec<Outbound>) {
        for (recipient, event) in events {
            match recipient {
                Recipient::All => {
                    for conn in self.senders.keys() {
                        self.send_to(*conn, event.clone());
                    }
                }
                Recipient::Only(conn) => self.send_to(conn, event),
            }
        }
    }

    /// Sends to one connection. Silently drops if its handler is gone.
    pub fn send_to(&self, conn: ConnId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(&conn) {
            if sender.send(event).is_err() {
                tracing::debug!(%conn, "outbound channel closed, dropping event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attached(b: &mut Broadcaster, id: u64) -> mpsc::UnboundedReceiver<ServerEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        assert!(b.attach(ConnId(id), tx));
        rx
    }

    #[test]
    fn test_dispatch_all_reaches_every_connection() {
        let mut b = Broadcaster::new();
        let mut one = attached(&mut b, 1);
        let mut two = attached(&mut b, 2);

        b.dispatch(vec![(Recipient::All, ServerEvent::NewGameStarted)]);

        assert_eq!(one.try_recv().unwrap(), ServerEvent::NewGameStarted);
        assert_eq!(two.try_recv().unwrap(), ServerEvent::NewGameStarted);
    }

    #[test]
    fn test_dispatch_only_reaches_one_connection() {
        let mut b = Broadcaster::new();
        let mut one = attached(&mut b, 1);
        let mut two = attached(&mut b, 2);

        b.dispatch(vec![(
            Recipient::Only(ConnId(2)),
            ServerEvent::SetGameMaster(true),
        )]);

        assert!(one.try_recv().is_err());
        assert_eq!(two.try_recv().unwrap(), ServerEvent::SetGameMaster(true));
    }

    #[test]
    fn test_dispatch_preserves_order() {
        let mut b = Broadcaster::new();
        let mut one = attached(&mut b, 1);

        b.dispatch(vec![
            (Recipient::Only(ConnId(1)), ServerEvent::SetGameMaster(false)),
            (Recipient::All, ServerEvent::UpdateCurrentPlayer(Some(ConnId(1)))),
            (Recipient::All, ServerEvent::UpdatePlayers(vec![])),
        ]);

        assert_eq!(one.try_recv().unwrap().name(), "setGameMaster");
        assert_eq!(one.try_recv().unwrap().name(), "updateCurrentPlayer");
        assert_eq!(one.try_recv().unwrap().name(), "updatePlayers");
    }

    #[test]
    fn test_attach_twice_is_rejected() {
        let mut b = Broadcaster::new();
        let _rx = attached(&mut b, 1);
        let (tx, _rx2) = mpsc::unbounded_channel();

        assert!(!b.attach(ConnId(1), tx));
        assert_eq!(b.len(), 1);
    }

    #[test]
    fn test_send_to_closed_channel_is_ignored() {
        let mut b = Broadcaster::new();
        drop(attached(&mut b, 1));

        b.send_to(ConnId(1), ServerEvent::NewGameStarted);
        assert!(b.detach(ConnId(1)));
        assert!(!b.detach(ConnId(1)));
        assert!(b.is_empty());
    }
}
