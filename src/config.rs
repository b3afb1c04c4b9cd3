use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::strategy::market_maker::MarketMakerConfig;

pub const DEFAULT_SYMBOL: &str = "DOGEUSDT";

/// Configuration for one run. Any field missing from a config file takes its default.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SimConfig {
    pub symbol: String,
    pub initial_balance: f64,
    pub market_maker: MarketMakerConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            symbol: DEFAULT_SYMBOL.to_string(),
            initial_balance: 0.0,
            market_maker: MarketMakerConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: SimConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| -> Result<()> {
            Err(SimError::InvalidConfig {
                reason: reason.to_string(),
            })
        };

        let mm = &self.market_maker;
        if mm.spread.is_nan() || mm.spread < 0.0 {
            return invalid("spread must be zero or positive");
        }
        let positive = |size: f64| size > 0.0;
        if !positive(mm.bid_size) || !positive(mm.ask_size) {
            return invalid("order sizes must be positive");
        }
        if mm.requote_one_side_timeout < 0 || mm.requote_both_sides_timeout < 0 {
            return invalid("requote timeouts must be zero or positive");
        }
        Ok(())
    }
}
