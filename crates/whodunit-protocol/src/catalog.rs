//! The closed candidate sets a solution is drawn from.
//!
//! Suspects, weapons and rooms are disjoint and fixed at compile time. On
//! the wire every candidate is its display name (`"Coffee Mug"`, not
//! `"CoffeeMug"`), which is also what clients put into a guess.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A person who may have done it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum Suspect {
    Gerard,
    Gordon,
    Justin,
    Mike,
    Shalini,
    Su,
}

impl Suspect {
    /// Every suspect, in catalog order.
    pub const ALL: [Suspect; 6] = [
        Suspect::Gerard,
        Suspect::Gordon,
        Suspect::Justin,
        Suspect::Mike,
        Suspect::Shalini,
        Suspect::Su,
    ];

    /// The name players guess with.
    pub fn name(self) -> &'static str {
        match self {
            Self::Gerard => "Gerard",
            Self::Gordon => "Gordon",
            Self::Justin => "Justin",
            Self::Mike => "Mike",
            Self::Shalini => "Shalini",
            Self::Su => "Su",
        }
    }
}

/// The object it was done with.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum Weapon {
    Stapler,
    Keyboard,
    #[serde(rename = "Coffee Mug")]
    CoffeeMug,
    #[serde(rename = "USB Cable")]
    UsbCable,
    Knife,
}

impl Weapon {
    /// Every weapon, in catalog order.
    pub const ALL: [Weapon; 5] = [
        Weapon::Stapler,
        Weapon::Keyboard,
        Weapon::CoffeeMug,
        Weapon::UsbCable,
        Weapon::Knife,
    ];

    /// The name players guess with.
    pub fn name(self) -> &'static str {
        match self {
            Self::Stapler => "Stapler",
            Self::Keyboard => "Keyboard",
            Self::CoffeeMug => "Coffee Mug",
            Self::UsbCable => "USB Cable",
            Self::Knife => "Knife",
        }
    }
}

/// Where it was done.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum Room {
    #[serde(rename = "Meeting room")]
    MeetingRoom,
    #[serde(rename = "Men's bathroom")]
    MensBathroom,
    Office,
    Kitchen,
    Carpark,
    Reception,
}

impl Room {
    /// Every room, in catalog order.
    pub const ALL: [Room; 6] = [
        Room::MeetingRoom,
        Room::MensBathroom,
        Room::Office,
        Room::Kitchen,
        Room::Carpark,
        Room::Reception,
    ];

    /// The name players guess with.
    pub fn name(self) -> &'static str {
        match self {
            Self::MeetingRoom => "Meeting room",
            Self::MensBathroom => "Men's bathroom",
            Self::Office => "Office",
            Self::Kitchen => "Kitchen",
            Self::Carpark => "Carpark",
            Self::Reception => "Reception",
        }
    }
}

impl fmt::Display for Suspect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Weapon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The hidden answer of one round. Immutable once drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Solution {
    pub suspect: Suspect,
    pub weapon: Weapon,
    pub room: Room,
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} with the {} in the {}", self.suspect, self.weapon, self.room)
    }
}
