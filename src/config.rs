use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{counter::CountSystem, deck::ShoeSize, error::ConfigError};

pub const INFINITE_DECKS: i32 = -1;

fn default_num_decks() -> i32 {
    6
}

fn default_natural_payout() -> f64 {
    1.5
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Automatic ace valuation, naturals pay out, counting in play.
    #[default]
    Standard,
    /// The player sets the first ace high or low; no naturals.
    Manual,
}

impl Variant {
    pub fn name(&self) -> &'static str {
        match self {
            Variant::Standard => "standard",
            Variant::Manual => "manual",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvConfig {
    #[serde(default = "default_num_decks")]
    pub num_decks: i32,
    #[serde(default)]
    pub variant: Variant,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Reshuffle before a round once this percentage of the shoe is dealt.
    #[serde(default)]
    pub penetration: Option<u8>,
    #[serde(default)]
    pub dealer_hits_soft_17: bool,
    #[serde(default = "default_natural_payout")]
    pub natural_payout: f64,
    #[serde(default)]
    pub count_system: CountSystem,
    /// Rebuild the shoe and reset the count on every reset.
    #[serde(default)]
    pub fresh_shoe_each_round: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        EnvConfig {
            num_decks: default_num_decks(),
            variant: Variant::default(),
            seed: None,
            penetration: None,
            dealer_hits_soft_17: false,
            natural_payout: default_natural_payout(),
            count_system: CountSystem::default(),
            fresh_shoe_each_round: false,
        }
    }
}

impl EnvConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EnvConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn shoe_size(&self) -> Result<ShoeSize, ConfigError> {
        match self.num_decks {
            INFINITE_DECKS => Ok(ShoeSize::Infinite),
            n => u8::try_from(n)
                .ok()
                .and_then(ShoeSize::decks)
                .ok_or(ConfigError::InvalidDeckCount(n)),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shoe_size()?;
        if let Some(penetration) = self.penetration {
            if penetration == 0 || penetration > 100 {
                return Err(ConfigError::InvalidPenetration(penetration));
            }
        }
        if !(self.natural_payout > 0.0) {
            return Err(ConfigError::InvalidPayout(self.natural_payout));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EnvConfig::from_json("{}").unwrap();
        assert_eq!(config, EnvConfig::default());
        assert_eq!(config.shoe_size().unwrap(), ShoeSize::decks(6).unwrap());
        assert_eq!(config.variant, Variant::Standard);
        assert_eq!(config.natural_payout, 1.5);
    }

    #[test]
    fn test_full_config() {
        let config = EnvConfig::from_json(
            r#"{
                "num_decks": -1,
                "variant": "manual",
                "seed": 11,
                "penetration": 75,
                "dealer_hits_soft_17": true,
                "natural_payout": 1.2,
                "count_system": "KO (Knockout)",
                "fresh_shoe_each_round": true
            }"#,
        )
        .unwrap();
        assert_eq!(config.shoe_size().unwrap(), ShoeSize::Infinite);
        assert_eq!(config.variant, Variant::Manual);
        assert_eq!(config.seed, Some(11));
        assert_eq!(config.penetration, Some(75));
        assert!(config.dealer_hits_soft_17);
        assert_eq!(config.count_system, CountSystem::Knockout);
        assert!(config.fresh_shoe_each_round);
    }

    #[test]
    fn test_invalid_deck_counts() {
        for decks in [0, -2, 256] {
            let config = EnvConfig {
                num_decks: decks,
                ..EnvConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(ConfigError::InvalidDeckCount(n)) if n == decks
            ));
        }
    }

    #[test]
    fn test_invalid_penetration_and_payout() {
        let config = EnvConfig {
            penetration: Some(101),
            ..EnvConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPenetration(101))));

        let config = EnvConfig {
            natural_payout: 0.0,
            ..EnvConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPayout(_))));
    }

    #[test]
    fn test_rejects_unknown_fields_and_bad_json() {
        assert!(matches!(
            EnvConfig::from_json(r#"{"decks": 2}"#),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(EnvConfig::from_json("not json"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            EnvConfig::from_file("/nonexistent/blackjack.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
