//! Whose turn is displayed.
//!
//! The turn is a label for clients, not a lock: guesses are accepted from
//! any player who has not guessed yet, whoever the turn points at. Any
//! enforcement belongs in the guess handler as an explicit precondition,
//! not here.

use whodunit_protocol::ConnId;

/// Returns the id after `current` in `order`, wrapping to the front.
///
/// `None` when `order` is empty. When `current` is `None` or no longer in
/// `order`, the first id is returned.
pub fn next_in_order(order: &[ConnId], current: Option<ConnId>) -> Option<ConnId> {
    let position = current.and_then(|c| order.iter().position(|id| *id == c));
    match position {
        Some(i) => order.get((i + 1) % order.len()).copied(),
        None => order.first().copied(),
    }
}

/// Tracks the current turn holder over the registry's join order.
///
/// The caller passes the order in on every call, so the scheduler never
/// holds a stale copy of the roster.
#[derive(Debug, Default)]
pub struct TurnScheduler {
    current: Option<ConnId>,
}

impl TurnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<ConnId> {
        self.current
    }

    /// Moves the turn to the player after the current one.
    pub fn advance(&mut self, order: &[ConnId]) -> Option<ConnId> {
        self.current = next_in_order(order, self.current);
        self.current
    }

    /// Points the turn at the first player, or nobody.
    pub fn reset_to_first(&mut self, order: &[ConnId]) -> Option<ConnId> {
        self.current = order.first().copied();
        self.current
    }

    /// Hands the turn to `conn` outright.
    pub fn assign(&mut self, conn: ConnId) {
        self.current = Some(conn);
    }

    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Reacts to `removed` leaving the roster (`order` is the roster after
    /// removal). Returns `true` if the turn holder changed.
    pub fn on_removed(&mut self, removed: ConnId, order: &[ConnId]) -> bool {
        if self.current != Some(removed) {
            return false;
        }
        self.reset_to_first(order);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> Vec<ConnId> {
        raw.iter().copied().map(ConnId).collect()
    }

    #[test]
    fn test_next_in_order_follows_and_wraps() {
        let order = ids(&[1, 2, 3]);
        assert_eq!(next_in_order(&order, Some(ConnId(1))), Some(ConnId(2)));
        assert_eq!(next_in_order(&order, Some(ConnId(2))), Some(ConnId(3)));
        assert_eq!(next_in_order(&order, Some(ConnId(3))), Some(ConnId(1)));
    }

    #[test]
    fn test_next_in_order_empty_is_none() {
        assert_eq!(next_in_order(&[], Some(ConnId(1))), None);
        assert_eq!(next_in_order(&[], None), None);
    }

    #[test]
    fn test_next_in_order_unknown_current_starts_at_front() {
        let order = ids(&[4, 5]);
        assert_eq!(next_in_order(&order, None), Some(ConnId(4)));
        assert_eq!(next_in_order(&order, Some(ConnId(9))), Some(ConnId(4)));
    }

    #[test]
    fn test_next_in_order_single_player_stays() {
        let order = ids(&[7]);
        assert_eq!(next_in_order(&order, Some(ConnId(7))), Some(ConnId(7)));
    }

    #[test]
    fn test_advance_updates_current() {
        let order = ids(&[1, 2]);
        let mut turns = TurnScheduler::new();
        turns.reset_to_first(&order);

        assert_eq!(turns.advance(&order), Some(ConnId(2)));
        assert_eq!(turns.current(), Some(ConnId(2)));
        assert_eq!(turns.advance(&order), Some(ConnId(1)));
    }

    #[test]
    fn test_on_removed_holder_moves_to_first_remaining() {
        let mut turns = TurnScheduler::new();
        turns.assign(ConnId(2));

        // Roster was [1, 2, 3]; 2 left.
        assert!(turns.on_removed(ConnId(2), &ids(&[1, 3])));
        assert_eq!(turns.current(), Some(ConnId(1)));
    }

    #[test]
    fn test_on_removed_last_player_clears_turn() {
        let mut turns = TurnScheduler::new();
        turns.assign(ConnId(1));

        assert!(turns.on_removed(ConnId(1), &[]));
        assert_eq!(turns.current(), None);
    }

    #[test]
    fn test_on_removed_other_player_keeps_turn() {
        let mut turns = TurnScheduler::new();
        turns.assign(ConnId(1));

        assert!(!turns.on_removed(ConnId(3), &ids(&[1, 2])));
        assert_eq!(turns.current(), Some(ConnId(1)));
    }
}
