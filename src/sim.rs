use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    config::EnvConfig,
    error::{GameError, SimulationError},
    game::{Action, BlackjackGame, Observation, Outcome},
};

fn default_stand_on() -> u32 {
    17
}

fn default_progress_interval() -> u32 {
    10_000
}

/// Picks the next action from what the player can see.
pub trait Policy {
    fn decide(&self, observation: &Observation) -> Action;
}

/// Hits until the player total reaches `stand_on`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub struct ThresholdPolicy {
    #[serde(default = "default_stand_on")]
    pub stand_on: u32,
}

impl Default for ThresholdPolicy {
    fn default() -> Self {
        ThresholdPolicy {
            stand_on: default_stand_on(),
        }
    }
}

impl Policy for ThresholdPolicy {
    fn decide(&self, observation: &Observation) -> Action {
        if observation.player_total < self.stand_on {
            Action::Hit
        } else {
            Action::Stand
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SimulationInput {
    #[serde(default)]
    pub env: EnvConfig,
    pub rounds: u32,
    #[serde(default)]
    pub policy: ThresholdPolicy,
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u32,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountBucket {
    pub rounds: u32,
    pub total_reward: f64,
    pub expected_value: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub total_rounds: u32,
    pub wins: u32,
    pub losses: u32,
    pub pushes: u32,
    pub naturals: u32,
    pub total_reward: f64,
    pub expected_value: f64,
    pub win_rate: f64,
    /// Keyed by the true count, rounded, at the start of each round.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count_stats: Option<BTreeMap<i32, CountBucket>>,
}

pub fn run(input: SimulationInput) -> Result<SimulationResult, SimulationError> {
    run_with_progress(input, |_current, _total| {})
}

pub fn run_with_progress<F>(
    input: SimulationInput,
    mut progress_cb: F,
) -> Result<SimulationResult, SimulationError>
where
    F: FnMut(u32, u32),
{
    let mut game = BlackjackGame::from_config(&input.env)?;
    let counting_enabled = game.counter.is_some();
    let progress_interval = input.progress_interval.max(1);

    let mut wins = 0;
    let mut losses = 0;
    let mut pushes = 0;
    let mut naturals = 0;
    let mut total_reward = 0.0;
    let mut count_stats: BTreeMap<i32, CountBucket> = BTreeMap::new();

    for round_index in 0..input.rounds {
        let observation = game.reset();
        let count_key = observation.true_count.round() as i32;
        let (reward, outcome) = play_round(&mut game, &input.policy, observation)?;

        match outcome {
            Outcome::Win => wins += 1,
            Outcome::Loss => losses += 1,
            Outcome::Push => pushes += 1,
            Outcome::Natural => {
                wins += 1;
                naturals += 1;
            }
        }
        total_reward += reward;

        if counting_enabled {
            let bucket = count_stats.entry(count_key).or_default();
            bucket.rounds += 1;
            bucket.total_reward += reward;
        }

        let completed = round_index + 1;
        if completed % progress_interval == 0 || completed == input.rounds {
            progress_cb(completed, input.rounds);
        }
    }

    for bucket in count_stats.values_mut() {
        if bucket.rounds > 0 {
            bucket.expected_value = bucket.total_reward / bucket.rounds as f64;
        }
    }

    let total_rounds = input.rounds;
    let expected_value = if total_rounds > 0 {
        total_reward / total_rounds as f64
    } else {
        0.0
    };
    let win_rate = if total_rounds > 0 {
        (wins as f64 / total_rounds as f64) * 100.0
    } else {
        0.0
    };
    info!(total_rounds, wins, losses, pushes, expected_value, "simulation complete");

    Ok(SimulationResult {
        total_rounds,
        wins,
        losses,
        pushes,
        naturals,
        total_reward,
        expected_value,
        win_rate,
        count_stats: counting_enabled.then_some(count_stats),
    })
}

/// Steps one dealt round to completion.
pub fn play_round<P: Policy + ?Sized>(
    game: &mut BlackjackGame,
    policy: &P,
    mut observation: Observation,
) -> Result<(f64, Outcome), GameError> {
    loop {
        let step = game.step(policy.decide(&observation))?;
        // A terminal step carries its outcome; stepping past one is an error.
        if let Some(outcome) = step.info.outcome {
            return Ok((step.reward, outcome));
        }
        observation = step.observation;
    }
}
