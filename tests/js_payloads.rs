//! Payload shapes the wasm exports accept and return, exercised natively.

use blackjack_env::{
    counter::CountSystem,
    sim::{self, SimulationInput},
    BlackjackGame, EnvConfig, Variant,
};
use serde_json::{json, Value};

#[test]
fn simulation_payload_with_every_field() {
    let input: SimulationInput = serde_json::from_value(json!({
        "env": {
            "num_decks": 2,
            "variant": "standard",
            "seed": 31,
            "penetration": 75,
            "dealer_hits_soft_17": true,
            "natural_payout": 1.2,
            "count_system": "Hi-Opt II",
            "fresh_shoe_each_round": false
        },
        "rounds": 300,
        "policy": { "stand_on": 16 },
        "progress_interval": 150
    }))
    .unwrap();
    assert_eq!(input.env.count_system, CountSystem::HiOptII);
    assert_eq!(input.env.penetration, Some(75));
    assert_eq!(input.policy.stand_on, 16);

    let mut calls = Vec::new();
    let result = sim::run_with_progress(input, |done, total| calls.push((done, total))).unwrap();
    assert_eq!(calls, vec![(150, 300), (300, 300)]);

    let json = serde_json::to_value(&result).unwrap();
    for key in [
        "totalRounds",
        "wins",
        "losses",
        "pushes",
        "naturals",
        "totalReward",
        "expectedValue",
        "winRate",
        "countStats",
    ] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert_eq!(json["totalRounds"], 300);

    let buckets = json["countStats"].as_object().unwrap();
    let rounds: u64 = buckets.values().map(|b| b["rounds"].as_u64().unwrap()).sum();
    assert_eq!(rounds, 300);
    for bucket in buckets.values() {
        assert!(bucket.get("totalReward").is_some());
        assert!(bucket.get("expectedValue").is_some());
    }
}

#[test]
fn minimal_simulation_payload_uses_defaults() {
    let input: SimulationInput = serde_json::from_value(json!({ "rounds": 20 })).unwrap();
    assert_eq!(input.env, EnvConfig::default());
    assert_eq!(input.policy.stand_on, 17);
    assert_eq!(input.progress_interval, 10_000);
}

#[test]
fn infinite_shoe_result_omits_count_stats() {
    let input: SimulationInput = serde_json::from_value(json!({
        "env": { "num_decks": -1, "seed": 8 },
        "rounds": 40
    }))
    .unwrap();
    let json = serde_json::to_value(sim::run(input).unwrap()).unwrap();
    assert!(json.get("countStats").is_none());
    assert_eq!(json["totalRounds"], 40);
}

#[test]
fn malformed_payloads_are_rejected() {
    // No round count.
    assert!(serde_json::from_value::<SimulationInput>(json!({ "env": {} })).is_err());
    // Misspelled environment field.
    assert!(serde_json::from_value::<SimulationInput>(json!({
        "env": { "decks": 6 },
        "rounds": 1
    }))
    .is_err());
    // Well-formed but invalid deck count fails when the game is built.
    let input: SimulationInput =
        serde_json::from_value(json!({ "env": { "num_decks": 0 }, "rounds": 1 })).unwrap();
    assert!(sim::run(input).is_err());
}

#[test]
fn environment_payload_drives_a_round() {
    let config: EnvConfig = serde_json::from_value(json!({
        "num_decks": 1,
        "variant": "manual",
        "seed": 5
    }))
    .unwrap();
    assert_eq!(config.variant, Variant::Manual);
    let mut game = BlackjackGame::from_config(&config).unwrap();

    let observation = serde_json::to_value(game.reset()).unwrap();
    let fields: Vec<&str> = observation
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    assert_eq!(fields.len(), 4);
    for key in ["playerTotal", "dealerUpcard", "trueCount", "isSoft"] {
        assert!(observation.get(key).is_some(), "missing {key}");
    }
    assert!(matches!(observation["dealerUpcard"], Value::String(_)));

    let step = serde_json::to_value(game.step_code(0).unwrap()).unwrap();
    assert_eq!(step["done"], true);
    let outcome = step["info"]["outcome"].as_str().unwrap();
    assert!(["win", "loss", "push"].contains(&outcome));
}
