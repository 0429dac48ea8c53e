use anyhow::{Context, Result};
use game_core::{DEFAULT_CHECKPOINTS, DEFAULT_PRIZES, GameRules, PrizeTable, TimeoutPolicy};
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub game_time_limit_minutes: u64,
    pub timeout_sweep_seconds: u64,
    pub allow_take_money_at_start: bool,
    pub prize_ladder: Vec<u32>,
    pub prize_checkpoints: Vec<u32>,
    pub rng_seed: Option<u64>,
    pub questions_file: Option<String>,
}

fn join(values: &[u32]) -> String {
    values
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn parse_list(name: &str, raw: &str) -> Vec<u32> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse()
                .unwrap_or_else(|_| panic!("Invalid {}: {:?}", name, part))
        })
        .collect()
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://millionaire.db?mode=rwc".to_string()),
            game_time_limit_minutes: env::var("GAME_TIME_LIMIT_MINUTES")
                .unwrap_or_else(|_| "35".to_string())
                .parse()
                .expect("Invalid GAME_TIME_LIMIT_MINUTES"),
            timeout_sweep_seconds: env::var("TIMEOUT_SWEEP_SECONDS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .expect("Invalid TIMEOUT_SWEEP_SECONDS"),
            allow_take_money_at_start: env::var("ALLOW_TAKE_MONEY_AT_START")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .expect("Invalid ALLOW_TAKE_MONEY_AT_START"),
            prize_ladder: parse_list(
                "PRIZE_LADDER",
                &env::var("PRIZE_LADDER").unwrap_or_else(|_| join(&DEFAULT_PRIZES)),
            ),
            prize_checkpoints: parse_list(
                "PRIZE_CHECKPOINTS",
                &env::var("PRIZE_CHECKPOINTS").unwrap_or_else(|_| join(&DEFAULT_CHECKPOINTS)),
            ),
            rng_seed: env::var("RNG_SEED")
                .ok()
                .map(|seed| seed.parse().expect("Invalid RNG_SEED")),
            questions_file: env::var("QUESTIONS_FILE").ok(),
        }
    }

    /// Validated game rules built from the ladder settings.
    pub fn game_rules(&self) -> Result<GameRules> {
        let prize_table = PrizeTable::new(self.prize_ladder.clone(), self.prize_checkpoints.clone())
            .context("Invalid PRIZE_LADDER / PRIZE_CHECKPOINTS")?;
        Ok(GameRules {
            prize_table,
            allow_take_money_at_start: self.allow_take_money_at_start,
        })
    }

    pub fn timeout_policy(&self) -> TimeoutPolicy {
        TimeoutPolicy::new(Duration::from_secs(self.game_time_limit_minutes * 60))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("X", "100, 200,300"), vec![100, 200, 300]);
        assert_eq!(parse_list("X", ""), Vec::<u32>::new());
    }

    #[test]
    fn test_default_ladder_round_trips() {
        assert_eq!(parse_list("X", &join(&DEFAULT_PRIZES)), DEFAULT_PRIZES.to_vec());
    }

    #[test]
    fn test_game_rules_validation() {
        let mut config = Config::new();
        config.prize_ladder = DEFAULT_PRIZES.to_vec();
        config.prize_checkpoints = vec![5, 10];
        let rules = config.game_rules().unwrap();
        assert_eq!(rules.prize_table.levels(), 15);

        config.prize_checkpoints = vec![16];
        assert!(config.game_rules().is_err());
    }
}
