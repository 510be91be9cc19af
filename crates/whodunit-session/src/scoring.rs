use whodunit_protocol::{FieldMatches, Guess, Solution};

/// Scores a guess against the solution.
///
/// Each field is an exact, case-sensitive name comparison. Returns the
/// number of matching fields (0..=3) together with the per-field flags.
pub fn score(guess: &Guess, solution: &Solution) -> (u8, FieldMatches) {
    let matches = FieldMatches {
        suspect: guess.suspect == solution.suspect.name(),
        weapon: guess.weapon == solution.weapon.name(),
        room: guess.room == solution.room.name(),
    };
    (matches.count(), matches)
}
