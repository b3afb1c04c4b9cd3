//! Strategies react to each tick after the exchange has applied its fills.
//!
//! A strategy does not own or store the exchange. The driver passes the exchange in on every
//! update as an [ExchangeApi] so the strategy can only use the public operations and never reaches
//! the book itself.
pub mod market_maker;

use crate::error::Result;
use crate::exchange::{ExchangeApi, TickReport};

pub trait Strategy {
    fn update(&mut self, report: &TickReport, exchange: &mut dyn ExchangeApi) -> Result<()>;
}
