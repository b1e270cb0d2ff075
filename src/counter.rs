use serde::{Deserialize, Serialize};

use crate::deck::{Card, CARDS_PER_DECK};

/// Floor for the remaining-decks estimate so a nearly empty shoe never divides by zero.
const MIN_REMAINING_DECKS: f64 = 1e-6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CountSystem {
    #[default]
    #[serde(rename = "Hi-Lo")]
    HiLo,
    #[serde(rename = "Hi-Opt I")]
    HiOptI,
    #[serde(rename = "Hi-Opt II")]
    HiOptII,
    #[serde(rename = "Omega II")]
    OmegaII,
    #[serde(rename = "KO (Knockout)")]
    Knockout,
    #[serde(rename = "Ace-Five")]
    AceFive,
}

impl CountSystem {
    /// Weight this system adds to the running count when `card` is seen.
    pub fn weight(&self, card: Card) -> i32 {
        // Aces rank as 1 and every ten-valued card as 10.
        let rank = match card {
            Card::Ace => 1,
            card => card.value(),
        };
        match (*self, rank) {
            (CountSystem::HiLo, 2..=6) => 1,
            (CountSystem::HiLo, 1 | 10) => -1,

            (CountSystem::HiOptI, 3..=6) => 1,
            (CountSystem::HiOptI, 10) => -1,

            (CountSystem::HiOptII, 2 | 3 | 6 | 7) => 1,
            (CountSystem::HiOptII, 4 | 5) => 2,
            (CountSystem::HiOptII, 10) => -2,

            (CountSystem::OmegaII, 2 | 3 | 7) => 1,
            (CountSystem::OmegaII, 4..=6) => 2,
            (CountSystem::OmegaII, 9) => -1,
            (CountSystem::OmegaII, 10) => -2,

            (CountSystem::Knockout, 2..=7) => 1,
            (CountSystem::Knockout, 1 | 10) => -1,

            (CountSystem::AceFive, 5) => 1,
            (CountSystem::AceFive, 1) => -1,

            _ => 0,
        }
    }
}

pub struct CardCounter {
    system: CountSystem,
    running_count: i32,
}

impl CardCounter {
    pub fn new(system: CountSystem) -> Self {
        CardCounter {
            system,
            running_count: 0,
        }
    }

    pub fn system(&self) -> CountSystem {
        self.system
    }

    pub fn update(&mut self, card: Card) {
        self.running_count += self.system.weight(card);
    }

    pub fn reset(&mut self) {
        self.running_count = 0;
    }

    pub fn running_count(&self) -> i32 {
        self.running_count
    }

    pub fn true_count(&self, remaining_cards: usize) -> f64 {
        let remaining_decks = remaining_cards as f64 / CARDS_PER_DECK as f64;
        self.running_count as f64 / remaining_decks.max(MIN_REMAINING_DECKS)
    }

    pub fn count_range(&self, remaining_cards: usize) -> i32 {
        self.true_count(remaining_cards).round() as i32
    }
}
