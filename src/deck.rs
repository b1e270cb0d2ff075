use std::fmt;
use std::num::NonZeroU8;
use std::str::FromStr;

use rand::{rngs::SmallRng, seq::SliceRandom, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const CARDS_PER_DECK: usize = 52;

/// Face value of a numbered card, always within 2..=10.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pip(u8);

impl Pip {
    pub fn new(value: u8) -> Option<Pip> {
        (2..=10).contains(&value).then_some(Pip(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Card {
    Number(Pip),
    Jack,
    Queen,
    King,
    Ace,
}

impl Card {
    /// The thirteen ranks of a single suit, ace first.
    pub const RANKS: [Card; 13] = [
        Card::Ace,
        Card::Number(Pip(2)),
        Card::Number(Pip(3)),
        Card::Number(Pip(4)),
        Card::Number(Pip(5)),
        Card::Number(Pip(6)),
        Card::Number(Pip(7)),
        Card::Number(Pip(8)),
        Card::Number(Pip(9)),
        Card::Number(Pip(10)),
        Card::Jack,
        Card::Queen,
        Card::King,
    ];

    /// Builds a numbered card, rejecting anything outside 2..=10.
    pub fn number(value: u8) -> Option<Card> {
        Pip::new(value).map(Card::Number)
    }

    /// Blackjack value with the ace counted high.
    pub fn value(&self) -> u8 {
        match self {
            Card::Number(pip) => pip.value(),
            Card::Jack | Card::Queen | Card::King => 10,
            Card::Ace => 11,
        }
    }

    pub fn is_ace(&self) -> bool {
        matches!(self, Card::Ace)
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Card::Number(pip) => write!(f, "{}", pip.value()),
            Card::Jack => f.write_str("J"),
            Card::Queen => f.write_str("Q"),
            Card::King => f.write_str("K"),
            Card::Ace => f.write_str("A"),
        }
    }
}

impl FromStr for Card {
    type Err = String;

    fn from_str(rank: &str) -> Result<Self, Self::Err> {
        match rank {
            "A" => Ok(Card::Ace),
            "J" => Ok(Card::Jack),
            "Q" => Ok(Card::Queen),
            "K" => Ok(Card::King),
            _ => rank
                .parse::<u8>()
                .ok()
                .and_then(Card::number)
                .ok_or_else(|| format!("unknown card rank: {rank}")),
        }
    }
}

impl From<Card> for String {
    fn from(card: Card) -> Self {
        card.to_string()
    }
}

impl TryFrom<String> for Card {
    type Error = String;

    fn try_from(rank: String) -> Result<Self, Self::Error> {
        rank.parse()
    }
}

/// How many decks make up the shoe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShoeSize {
    Finite(NonZeroU8),
    /// Every draw is an independent uniform rank; nothing is depleted.
    Infinite,
}

impl ShoeSize {
    /// A finite shoe of `num_decks` decks; a shoe with no decks does not exist.
    pub fn decks(num_decks: u8) -> Option<ShoeSize> {
        NonZeroU8::new(num_decks).map(ShoeSize::Finite)
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, ShoeSize::Infinite)
    }
}

impl fmt::Display for ShoeSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShoeSize::Finite(n) if n.get() == 1 => f.write_str("1 deck"),
            ShoeSize::Finite(n) => write!(f, "{n} decks"),
            ShoeSize::Infinite => f.write_str("Infinite decks"),
        }
    }
}

/// Every rank four times per deck, unshuffled.
pub fn build_shoe(num_decks: u8) -> Vec<Card> {
    let mut cards = Vec::with_capacity(num_decks as usize * CARDS_PER_DECK);
    for _ in 0..num_decks {
        for rank in &Card::RANKS {
            for _ in 0..4 {
                cards.push(*rank);
            }
        }
    }
    cards
}

pub struct Deck {
    pub size: ShoeSize,
    cards: Vec<Card>,
    dealt: usize,
    penetration_threshold: Option<u8>,
    rng: SmallRng,
}

impl Deck {
    pub fn new(size: ShoeSize, penetration_threshold: Option<u8>, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let mut deck = Deck {
            size,
            cards: Vec::new(),
            dealt: 0,
            penetration_threshold,
            rng,
        };
        deck.shuffle();
        deck
    }

    /// A finite shoe whose next draws are `draw_order`, first element first.
    /// Once those run out the shoe is rebuilt like any other.
    pub fn stacked(num_decks: NonZeroU8, draw_order: Vec<Card>, seed: u64) -> Self {
        let mut cards = draw_order;
        cards.reverse();
        Deck {
            size: ShoeSize::Finite(num_decks),
            cards,
            dealt: 0,
            penetration_threshold: None,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Rebuilds the full shoe and shuffles it.
    pub fn shuffle(&mut self) {
        self.dealt = 0;
        self.cards = match self.size {
            ShoeSize::Finite(num_decks) => {
                let mut cards = build_shoe(num_decks.get());
                cards.shuffle(&mut self.rng);
                cards
            }
            ShoeSize::Infinite => Vec::new(),
        };
    }

    pub fn deal_card(&mut self) -> Card {
        loop {
            if let Some(card) = self.cards.pop() {
                self.dealt += 1;
                return card;
            }
            if self.size.is_infinite() {
                return Card::RANKS[self.rng.gen_range(0..Card::RANKS.len())];
            }
            // A rebuilt finite shoe holds at least one full deck.
            self.shuffle();
        }
    }

    pub fn remaining_cards(&self) -> usize {
        self.cards.len()
    }

    pub fn is_exhausted(&self) -> bool {
        !self.size.is_infinite() && self.cards.is_empty()
    }

    /// Percentage of the shoe dealt since the last shuffle.
    pub fn penetration(&self) -> f64 {
        let total = self.dealt + self.cards.len();
        if total == 0 {
            0.0
        } else {
            (self.dealt as f64 / total as f64) * 100.0
        }
    }

    pub fn should_reshuffle(&self) -> bool {
        match self.penetration_threshold {
            Some(threshold) if !self.size.is_infinite() => {
                self.penetration() >= threshold as f64
            }
            _ => false,
        }
    }
}
