use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::{
    config::{EnvConfig, Variant},
    counter::CardCounter,
    deck::{Card, Deck},
    error::{ConfigError, GameError},
    hand::Hand,
};

/// Dealer keeps drawing below this total.
pub const DEALER_STANDS_ON: u32 = 17;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Stand,
    Hit,
    ToggleAce,
}

impl Action {
    pub fn from_code(code: i64) -> Result<Action, GameError> {
        match code {
            0 => Ok(Action::Stand),
            1 => Ok(Action::Hit),
            2 => Ok(Action::ToggleAce),
            _ => Err(GameError::InvalidAction(code)),
        }
    }

    pub fn as_code(&self) -> i64 {
        match self {
            Action::Stand => 0,
            Action::Hit => 1,
            Action::ToggleAce => 2,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::Stand => "stand",
            Action::Hit => "hit",
            Action::ToggleAce => "toggle ace",
        }
    }
}

impl TryFrom<i64> for Action {
    type Error = GameError;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Action::from_code(code)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Outcome {
    Win,
    Loss,
    Push,
    /// Player natural against a dealer without one.
    Natural,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
            Outcome::Push => "push",
            Outcome::Natural => "natural",
        };
        f.write_str(label)
    }
}

/// What the player sees after every reset and step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub player_total: u32,
    pub dealer_upcard: Card,
    pub true_count: f64,
    pub is_soft: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    /// The shoe was rebuilt since the previous step, including while the round
    /// was dealt unless [`BlackjackGame::take_reshuffle`] already reported it.
    pub reshuffled: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
    pub info: StepInfo,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundState {
    /// Nothing dealt yet.
    Idle,
    InProgress,
    Terminal,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GameRules {
    pub variant: Variant,
    pub dealer_hits_soft_17: bool,
    pub natural_payout: f64,
    pub fresh_shoe_each_round: bool,
}

impl Default for GameRules {
    fn default() -> Self {
        GameRules {
            variant: Variant::Standard,
            dealer_hits_soft_17: false,
            natural_payout: 1.5,
            fresh_shoe_each_round: false,
        }
    }
}

impl From<&EnvConfig> for GameRules {
    fn from(config: &EnvConfig) -> Self {
        GameRules {
            variant: config.variant,
            dealer_hits_soft_17: config.dealer_hits_soft_17,
            natural_payout: config.natural_payout,
            fresh_shoe_each_round: config.fresh_shoe_each_round,
        }
    }
}

pub struct BlackjackGame {
    pub deck: Deck,
    pub rules: GameRules,
    pub counter: Option<CardCounter>,
    player: Hand,
    dealer: Hand,
    state: RoundState,
    reshuffled: bool,
}

impl BlackjackGame {
    pub fn new(deck: Deck, rules: GameRules, counter: Option<CardCounter>) -> Self {
        BlackjackGame {
            deck,
            rules,
            counter,
            player: Hand::new(),
            dealer: Hand::new(),
            state: RoundState::Idle,
            reshuffled: false,
        }
    }

    /// Builds a game from validated configuration. Infinite shoes carry no counter.
    pub fn from_config(config: &EnvConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let size = config.shoe_size()?;
        let deck = Deck::new(size, config.penetration, config.seed);
        let counter = (!size.is_infinite()).then(|| CardCounter::new(config.count_system));
        Ok(BlackjackGame::new(deck, GameRules::from(config), counter))
    }

    pub fn player(&self) -> &Hand {
        &self.player
    }

    pub fn dealer(&self) -> &Hand {
        &self.dealer
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn running_count(&self) -> i32 {
        self.counter.as_ref().map_or(0, CardCounter::running_count)
    }

    pub fn true_count(&self) -> f64 {
        match &self.counter {
            Some(counter) => counter.true_count(self.deck.remaining_cards()),
            None => 0.0,
        }
    }

    pub fn count_range(&self) -> i32 {
        match &self.counter {
            Some(counter) => counter.count_range(self.deck.remaining_cards()),
            None => 0,
        }
    }

    /// Reports and clears a rebuild that has not yet been surfaced in a step.
    pub fn take_reshuffle(&mut self) -> bool {
        std::mem::take(&mut self.reshuffled)
    }

    fn reshuffle(&mut self) {
        self.deck.shuffle();
        if let Some(counter) = &mut self.counter {
            counter.reset();
        }
        self.reshuffled = true;
        info!(shoe = %self.deck.size, "reshuffling shoe");
    }

    pub fn deal_card(&mut self) -> Card {
        if self.deck.is_exhausted() {
            self.reshuffle();
        }
        let card = self.deck.deal_card();
        if let Some(counter) = &mut self.counter {
            counter.update(card);
        }
        debug!(%card, remaining = self.deck.remaining_cards(), "dealt card");
        card
    }

    /// Starts a new round: dealer gets two cards, then the player.
    pub fn reset(&mut self) -> Observation {
        self.reshuffled = false;
        if self.rules.fresh_shoe_each_round || self.deck.should_reshuffle() {
            self.reshuffle();
        }

        let mut dealer = Hand::new();
        let upcard = self.deal_card();
        dealer.add_card(upcard);
        dealer.add_card(self.deal_card());

        let mut player = match self.rules.variant {
            Variant::Standard => Hand::new(),
            Variant::Manual => Hand::manual(),
        };
        player.add_card(self.deal_card());
        player.add_card(self.deal_card());

        self.dealer = dealer;
        self.player = player;
        self.state = RoundState::InProgress;
        debug!(player = %self.player, upcard = %upcard, "dealt round");
        self.observe(upcard)
    }

    fn observe(&self, dealer_upcard: Card) -> Observation {
        let value = self.player.value();
        Observation {
            player_total: value.total,
            dealer_upcard,
            true_count: self.true_count(),
            is_soft: value.soft,
        }
    }

    pub fn observation(&self) -> Result<Observation, GameError> {
        let upcard = match self.state {
            RoundState::Idle => None,
            _ => self.dealer.upcard(),
        };
        upcard.map(|card| self.observe(card)).ok_or(GameError::NoRound)
    }

    /// Applies a raw action code as sent by a driver loop.
    pub fn step_code(&mut self, code: i64) -> Result<Step, GameError> {
        self.step(Action::from_code(code)?)
    }

    pub fn step(&mut self, action: Action) -> Result<Step, GameError> {
        match self.state {
            RoundState::Idle => return Err(GameError::NoRound),
            RoundState::Terminal => return Err(GameError::RoundFinished),
            RoundState::InProgress => {}
        }
        if action == Action::ToggleAce && self.rules.variant != Variant::Manual {
            return Err(GameError::ActionUnavailable(
                action.name(),
                self.rules.variant.name(),
            ));
        }
        // A natural can only exist before the player has drawn.
        if self.rules.variant == Variant::Standard && self.player.is_natural() {
            let outcome = if self.dealer.is_natural() {
                Outcome::Push
            } else {
                Outcome::Natural
            };
            return self.finish(outcome);
        }

        match action {
            Action::ToggleAce => {
                self.player.toggle_ace();
                self.keep_playing()
            }
            Action::Hit => {
                let card = self.deal_card();
                self.player.add_card(card);
                if self.player.is_bust() {
                    self.finish(Outcome::Loss)
                } else {
                    self.keep_playing()
                }
            }
            Action::Stand => {
                if self.rules.variant == Variant::Standard && self.dealer.is_natural() {
                    return self.finish(Outcome::Loss);
                }
                self.play_dealer();
                let outcome = self.compare();
                self.finish(outcome)
            }
        }
    }

    fn play_dealer(&mut self) {
        loop {
            let value = self.dealer.value();
            if value.is_bust() {
                break;
            }
            let stand_value =
                if self.rules.dealer_hits_soft_17 && value.soft && value.total == DEALER_STANDS_ON {
                    DEALER_STANDS_ON + 1
                } else {
                    DEALER_STANDS_ON
                };
            if value.total >= stand_value {
                break;
            }
            let card = self.deal_card();
            self.dealer.add_card(card);
            debug!(%card, dealer = %self.dealer, "dealer draws");
        }
    }

    /// Outcome of a finished round where the player did not bust.
    pub fn compare(&self) -> Outcome {
        let player_value = self.player.total();
        let dealer = self.dealer.value();

        if dealer.is_bust() || player_value > dealer.total {
            Outcome::Win
        } else if player_value < dealer.total {
            Outcome::Loss
        } else {
            Outcome::Push
        }
    }

    pub fn reward(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Win => 1.0,
            Outcome::Loss => -1.0,
            Outcome::Push => 0.0,
            Outcome::Natural => self.rules.natural_payout,
        }
    }

    fn keep_playing(&mut self) -> Result<Step, GameError> {
        Ok(Step {
            observation: self.observation()?,
            reward: 0.0,
            done: false,
            info: StepInfo {
                outcome: None,
                reshuffled: std::mem::take(&mut self.reshuffled),
            },
        })
    }

    fn finish(&mut self, outcome: Outcome) -> Result<Step, GameError> {
        self.state = RoundState::Terminal;
        let reward = self.reward(outcome);
        info!(
            %outcome,
            reward,
            player = %self.player,
            dealer = %self.dealer,
            "round finished"
        );
        Ok(Step {
            observation: self.observation()?,
            reward,
            done: true,
            info: StepInfo {
                outcome: Some(outcome),
                reshuffled: std::mem::take(&mut self.reshuffled),
            },
        })
    }

    /// Human-readable hands. The dealer's hole card stays hidden unless `reveal`.
    pub fn display(&self, reveal: bool) -> String {
        if self.state == RoundState::Idle {
            return "No hand dealt.".to_string();
        }
        let dealer = if reveal {
            self.dealer.to_string()
        } else {
            self.dealer.concealed()
        };
        format!("Dealer: {dealer}\nPlayer: {}", self.player)
    }
}
