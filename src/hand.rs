use std::fmt;

use serde::Serialize;

use crate::deck::Card;

pub const BLACKJACK: u32 = 21;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandValue {
    pub total: u32,
    /// An ace is still counted as 11.
    pub soft: bool,
    /// Aces that had to drop from 11 to 1 to keep the total down.
    pub demoted_aces: u32,
}

impl HandValue {
    /// True if the hand held an 11-valued ace at any point of the evaluation,
    /// including aces that were later demoted.
    pub fn had_soft_ace(&self) -> bool {
        self.soft || self.demoted_aces > 0
    }

    pub fn is_bust(&self) -> bool {
        self.total > BLACKJACK
    }
}

impl fmt::Display for HandValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.soft {
            write!(f, "soft {}", self.total)
        } else {
            write!(f, "{}", self.total)
        }
    }
}

pub fn hand_value(cards: &[Card]) -> HandValue {
    let mut total: u32 = 0;
    let mut aces = 0;

    for card in cards {
        total += u32::from(card.value());
        if card.is_ace() {
            aces += 1;
        }
    }

    let mut demoted_aces = 0;
    while total > BLACKJACK && demoted_aces < aces {
        total -= 10;
        demoted_aces += 1;
    }

    HandValue {
        total,
        soft: demoted_aces < aces && total <= BLACKJACK,
        demoted_aces,
    }
}

pub fn is_natural(cards: &[Card]) -> bool {
    if cards.len() != 2 {
        return false;
    }
    let value = hand_value(cards);
    value.total == BLACKJACK && value.soft
}

pub fn is_bust(cards: &[Card]) -> bool {
    hand_value(cards).is_bust()
}

fn format_cards(cards: &[Card]) -> String {
    let labels: Vec<String> = cards.iter().map(Card::to_string).collect();
    format!("[{}]", labels.join(", "))
}

/// A dealt hand. In manual mode aces count as 1 except the first one,
/// which the player raises to 11 and back with [`Hand::toggle_ace`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Hand {
    cards: Vec<Card>,
    manual_aces: bool,
    ace_high: bool,
}

impl Hand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn manual() -> Self {
        Hand {
            manual_aces: true,
            ..Self::default()
        }
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn has_ace(&self) -> bool {
        self.cards.iter().any(Card::is_ace)
    }

    pub fn value(&self) -> HandValue {
        if !self.manual_aces {
            return hand_value(&self.cards);
        }
        let low: u32 = self
            .cards
            .iter()
            .map(|card| if card.is_ace() { 1 } else { u32::from(card.value()) })
            .sum();
        let soft = self.ace_high && self.has_ace();
        HandValue {
            total: if soft { low + 10 } else { low },
            soft,
            demoted_aces: 0,
        }
    }

    pub fn total(&self) -> u32 {
        self.value().total
    }

    pub fn is_bust(&self) -> bool {
        self.value().is_bust()
    }

    pub fn is_natural(&self) -> bool {
        !self.manual_aces && is_natural(&self.cards)
    }

    /// Flips the first ace between 1 and 11. Returns false when there is
    /// nothing to toggle.
    pub fn toggle_ace(&mut self) -> bool {
        if !self.manual_aces || !self.has_ace() {
            return false;
        }
        self.ace_high = !self.ace_high;
        true
    }

    pub fn upcard(&self) -> Option<Card> {
        self.cards.first().copied()
    }

    /// The first card followed by a placeholder for the hole card.
    pub fn concealed(&self) -> String {
        match self.upcard() {
            Some(card) => format!("[{card}, ?]"),
            None => "[]".to_string(),
        }
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", format_cards(&self.cards), self.value())
    }
}

impl From<Vec<Card>> for Hand {
    fn from(cards: Vec<Card>) -> Self {
        Hand {
            cards,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Card = Card::Ace;
    const K: Card = Card::King;

    fn n(value: u8) -> Card {
        Card::number(value).unwrap()
    }

    #[test]
    fn test_hand_value_simple() {
        let value = hand_value(&[n(2), n(3)]);
        assert_eq!(value.total, 5);
        assert!(!value.soft);
    }

    #[test]
    fn test_hand_value_face_cards() {
        assert_eq!(hand_value(&[K, Card::Queen]).total, 20);
    }

    #[test]
    fn test_hand_value_soft_ace() {
        let value = hand_value(&[A, n(6)]);
        assert_eq!(value.total, 17);
        assert!(value.soft);
        assert_eq!(value.demoted_aces, 0);
    }

    #[test]
    fn test_hand_value_demoted_ace_is_hard() {
        let value = hand_value(&[A, n(6), n(10)]);
        assert_eq!(value.total, 17);
        assert!(!value.soft);
        assert_eq!(value.demoted_aces, 1);
        assert!(value.had_soft_ace());
    }

    #[test]
    fn test_hand_value_multiple_aces() {
        let value = hand_value(&[A, A, n(9)]);
        assert_eq!(value.total, 21);
        assert!(value.soft);
        assert_eq!(value.demoted_aces, 1);

        let value = hand_value(&[A, A, A, A]);
        assert_eq!(value.total, 14);
        assert!(value.soft);
    }

    #[test]
    fn test_hand_value_empty() {
        let value = hand_value(&[]);
        assert_eq!(value.total, 0);
        assert!(!value.soft);
        assert!(!value.had_soft_ace());
    }

    #[test]
    fn test_natural() {
        assert!(is_natural(&[A, K]));
        assert!(is_natural(&[n(10), A]));
        assert!(!is_natural(&[n(7), n(7), n(7)]));
        assert!(!is_natural(&[K, Card::Queen]));
        assert!(!is_natural(&[A, n(5), n(5)]));
    }

    #[test]
    fn test_bust() {
        assert!(is_bust(&[n(10), n(10), n(5)]));
        assert_eq!(hand_value(&[n(10), n(10), n(5)]).total, 25);
        assert!(!is_bust(&[n(10), n(10), A]));
        assert!(is_bust(&[K, Card::Jack, A, A]));
    }

    #[test]
    fn test_hand_struct() {
        let mut hand = Hand::new();
        hand.add_card(K);
        hand.add_card(n(7));
        assert_eq!(hand.total(), 17);
        assert!(!hand.is_natural());
        assert_eq!(hand.upcard(), Some(K));
        assert_eq!(hand.to_string(), "[K, 7] (17)");
        assert_eq!(hand.concealed(), "[K, ?]");
    }

    #[test]
    fn test_hand_display_soft() {
        let hand = Hand::from(vec![A, n(6)]);
        assert_eq!(hand.to_string(), "[A, 6] (soft 17)");
    }

    #[test]
    fn test_manual_hand_starts_low_and_toggles() {
        let mut hand = Hand::manual();
        hand.add_card(A);
        hand.add_card(n(5));
        assert_eq!(hand.total(), 6);
        assert!(!hand.value().soft);

        assert!(hand.toggle_ace());
        assert_eq!(hand.total(), 16);
        assert!(hand.value().soft);

        assert!(hand.toggle_ace());
        assert_eq!(hand.total(), 6);
    }

    #[test]
    fn test_manual_hand_only_raises_one_ace() {
        let mut hand = Hand::manual();
        hand.add_card(A);
        hand.add_card(A);
        hand.toggle_ace();
        assert_eq!(hand.total(), 12);
    }

    #[test]
    fn test_manual_hand_can_bust_with_high_ace() {
        let mut hand = Hand::manual();
        hand.add_card(A);
        hand.add_card(n(9));
        hand.toggle_ace();
        hand.add_card(n(5));
        assert_eq!(hand.total(), 25);
        assert!(hand.is_bust());
    }

    #[test]
    fn test_manual_hand_never_natural() {
        let mut hand = Hand::manual();
        hand.add_card(A);
        hand.add_card(K);
        hand.toggle_ace();
        assert_eq!(hand.total(), 21);
        assert!(!hand.is_natural());
    }

    #[test]
    fn test_toggle_without_ace() {
        let mut hand = Hand::manual();
        hand.add_card(n(9));
        assert!(!hand.toggle_ace());
        assert_eq!(hand.total(), 9);

        let mut auto = Hand::from(vec![A, n(2)]);
        assert!(!auto.toggle_ace());
    }

    #[test]
    fn test_every_ace_of_an_eight_deck_shoe() {
        let value = hand_value(&[A; 32]);
        assert_eq!(value.total, 32);
        assert!(!value.soft);
        assert_eq!(value.demoted_aces, 32);
        assert!(is_bust(&[A; 32]));

        let value = hand_value(&[A; 21]);
        assert_eq!(value.total, 21);
        assert!(!value.soft);

        let value = hand_value(&[A; 11]);
        assert_eq!(value.total, 21);
        assert!(value.soft);
    }

    #[test]
    fn test_long_manual_hand_does_not_overflow() {
        let mut hand = Hand::manual();
        for _ in 0..32 {
            hand.add_card(K);
        }
        assert_eq!(hand.total(), 320);
        assert!(hand.is_bust());
    }
}
