//! The player registry: every seated (non-master) participant.
//!
//! Players are kept in join order. That order is the turn order and the
//! order of every roster snapshot, so it lives here next to the players
//! themselves rather than in the turn scheduler.

use std::collections::HashMap;

use whodunit_protocol::{ConnId, Guess, PlayerView};

use crate::SessionError;

/// A seated participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: ConnId,
    pub name: String,
    pub score: u32,
    /// The guess submitted this round. Private so "has guessed" can only be
    /// derived from it, never set out of step with it.
    guess: Option<Guess>,
}

impl Player {
    fn new(id: ConnId, name: String) -> Self {
        Self {
            id,
            name,
            score: 0,
            guess: None,
        }
    }

    pub fn guess(&self) -> Option<&Guess> {
        self.guess.as_ref()
    }

    pub fn has_guessed(&self) -> bool {
        self.guess.is_some()
    }

    /// Stores this round's guess and adds its points.
    pub(crate) fn record_guess(&mut self, guess: Guess, points: u8) {
        self.score = self.score.saturating_add(u32::from(points));
        self.guess = Some(guess);
    }

    /// Clears the guess and zeroes the score for a fresh round.
    pub(crate) fn reset_round(&mut self) {
        self.score = 0;
        self.guess = None;
    }

    pub(crate) fn reset_score(&mut self) {
        self.score = 0;
    }

    /// The roster entry clients see.
    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id,
            name: self.name.clone(),
            score: self.score,
            guess: self.guess.clone(),
            has_guessed: self.has_guessed(),
        }
    }
}

/// Seated players, keyed by connection, remembering join order.
///
/// `order` and `players` always hold exactly the same ids.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    order: Vec<ConnId>,
    players: HashMap<ConnId, Player>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seats a new player with score 0 and no guess.
    ///
    /// The stored name is trimmed.
    ///
    /// # Errors
    /// - [`SessionError::InvalidName`] if the name is empty or whitespace
    /// - [`SessionError::AlreadyJoined`] if `id` is already seated
    pub fn join(&mut self, id: ConnId, name: &str) -> Result<&Player, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::InvalidName);
        }
        if self.players.contains_key(&id) {
            return Err(SessionError::AlreadyJoined(id));
        }

        self.order.push(id);
        let player = self
            .players
            .entry(id)
            .or_insert_with(|| Player::new(id, name.to_owned()));
        Ok(player)
    }

    /// Removes a player. Returns the removed player, or `None` if `id` was
    /// not seated (removing twice is harmless).
    pub fn remove(&mut self, id: ConnId) -> Option<Player> {
        let player = self.players.remove(&id)?;
        self.order.retain(|seated| *seated != id);
        Some(player)
    }

    pub fn get(&self, id: ConnId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn get_mut(&mut self, id: ConnId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn contains(&self, id: ConnId) -> bool {
        self.players.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Seated ids in join order.
    pub fn order(&self) -> &[ConnId] {
        &self.order
    }

    /// Players in join order.
    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.order.iter().filter_map(|id| self.players.get(id))
    }

    /// The roster as clients see it, in join order.
    pub fn snapshot(&self) -> Vec<PlayerView> {
        self.iter().map(Player::view).collect()
    }

    /// Zeroes scores and clears guesses for everyone.
    pub fn reset_round(&mut self) {
        for player in self.players.values_mut() {
            player.reset_round();
        }
    }

    /// Zeroes scores, leaving this round's guesses in place.
    pub fn reset_scores(&mut self) {
        for player in self.players.values_mut() {
            player.reset_score();
        }
    }
}
