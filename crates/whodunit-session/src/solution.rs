//! Where each round's hidden answer comes from.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use whodunit_protocol::{Room, Solution, Suspect, Weapon};

/// Draws a fresh [`Solution`] whenever a new game starts.
pub trait SolutionSource: Send {
    fn draw(&mut self) -> Solution;
}

impl<T: SolutionSource + ?Sized> SolutionSource for Box<T> {
    fn draw(&mut self) -> Solution {
        (**self).draw()
    }
}

/// Uniform draw over each candidate set, independently per field.
#[derive(Debug)]
pub struct RandomSolutions {
    rng: StdRng,
}

impl RandomSolutions {
    /// Seeds from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible sequence of draws.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSolutions {
    fn default() -> Self {
        Self::new()
    }
}

impl SolutionSource for RandomSolutions {
    fn draw(&mut self) -> Solution {
        Solution {
            suspect: Suspect::ALL[self.rng.random_range(0..Suspect::ALL.len())],
            weapon: Weapon::ALL[self.rng.random_range(0..Weapon::ALL.len())],
            room: Room::ALL[self.rng.random_range(0..Room::ALL.len())],
        }
    }
}

/// Always draws the same answer. For scripted rounds and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedSolution(pub Solution);

impl SolutionSource for FixedSolution {
    fn draw(&mut self) -> Solution {
        self.0
    }
}
