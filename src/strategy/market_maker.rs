use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::Strategy;
use crate::error::{Result, SimError};
use crate::exchange::order::{LimitOrder, Side};
use crate::exchange::{ExchangeApi, TickReport};

/// Quoting parameters. `spread` is the full bid/ask spread as a percentage of the mark price, each
/// side is quoted half of it away from the mark. Timeouts are in seconds.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct MarketMakerConfig {
    pub spread: f64,
    pub bid_size: f64,
    pub ask_size: f64,
    pub requote_one_side_timeout: i64,
    pub requote_both_sides_timeout: i64,
}

impl Default for MarketMakerConfig {
    fn default() -> Self {
        Self {
            spread: 0.5,
            bid_size: 1.0,
            ask_size: 1.0,
            requote_one_side_timeout: 40,
            requote_both_sides_timeout: 40,
        }
    }
}

/// Describes what the market maker did on the last tick. This is only reported, decisions are
/// always taken from the number of orders open on the exchange.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum QuoteStatus {
    /// Both sides were (re)quoted around the mark.
    Spreading,
    /// One side has filled and the other is resting or was requoted.
    Quoting,
    /// Both sides are resting and have not timed out.
    Waiting,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct MarketMakerState {
    pub timestamp: i64,
    pub position_size: f64,
    pub spread: f64,
    pub bid_size: f64,
    pub ask_size: f64,
    pub status: QuoteStatus,
}

/// Two-sided quoting strategy driven by the count of open orders on the exchange.
///
/// - No open orders: quote a bid and an ask around the mark.
/// - One open order: one side filled. Once the remaining order has been resting for
/// `requote_one_side_timeout` it is cancelled and replaced on the same side at the current mark.
/// - Two open orders: once the most recent of them has been resting for
/// `requote_both_sides_timeout` both are cancelled and the book is quoted again.
#[derive(Debug)]
pub struct MarketMaker {
    symbol: String,
    config: MarketMakerConfig,
    timestamp: i64,
    mark_price: f64,
    position_size: f64,
    status: QuoteStatus,
}

impl MarketMaker {
    pub fn new(symbol: impl Into<String>, config: MarketMakerConfig) -> Self {
        Self {
            symbol: symbol.into(),
            config,
            timestamp: 0,
            mark_price: 0.0,
            position_size: 0.0,
            status: QuoteStatus::Spreading,
        }
    }

    pub fn status(&self) -> QuoteStatus {
        self.status
    }

    pub fn state(&self) -> MarketMakerState {
        MarketMakerState {
            timestamp: self.timestamp,
            position_size: self.position_size,
            spread: self.config.spread,
            bid_size: self.config.bid_size,
            ask_size: self.config.ask_size,
            status: self.status,
        }
    }

    pub fn bid_price(&self) -> f64 {
        self.mark_price * (1.0 - self.config.spread / 200.0)
    }

    pub fn ask_price(&self) -> f64 {
        self.mark_price * (1.0 + self.config.spread / 200.0)
    }

    pub fn process_next_tick(
        &mut self,
        report: &TickReport,
        exchange: &mut dyn ExchangeApi,
    ) -> Result<()> {
        self.timestamp = report.timestamp;
        self.mark_price = report.mark_price;
        self.position_size = exchange.position().size;

        let open_orders = exchange.open_orders();
        match open_orders.as_slice() {
            [] => {
                self.quote_orders(exchange)?;
                self.status = QuoteStatus::Spreading;
            }
            [order] => {
                self.handle_one_order(order, exchange)?;
                self.status = QuoteStatus::Quoting;
            }
            [first, second] => {
                self.status = if self.handle_waiting(first, second, exchange)? {
                    QuoteStatus::Spreading
                } else {
                    QuoteStatus::Waiting
                };
            }
            orders => {
                return Err(SimError::UnreachableBookState {
                    open_orders: orders.len(),
                    timestamp: self.timestamp,
                })
            }
        }
        Ok(())
    }

    fn quote_orders(&self, exchange: &mut dyn ExchangeApi) -> Result<()> {
        debug!(
            "STRATEGY: Quote orders at {}, bid {:.6} ask {:.6}",
            self.timestamp,
            self.bid_price(),
            self.ask_price()
        );
        exchange.place_order(LimitOrder::buy(
            self.symbol.clone(),
            self.bid_price(),
            self.config.bid_size,
        ))?;
        exchange.place_order(LimitOrder::sell(
            self.symbol.clone(),
            self.ask_price(),
            self.config.ask_size,
        ))?;
        Ok(())
    }

    fn handle_one_order(&self, order: &LimitOrder, exchange: &mut dyn ExchangeApi) -> Result<()> {
        if self.timestamp.saturating_sub(order.timestamp) < self.config.requote_one_side_timeout {
            return Ok(());
        }

        debug!("STRATEGY: Requote one order at {}", self.timestamp);
        if let Some(order_id) = order.order_id {
            if !exchange.cancel_order(order_id) {
                warn!("STRATEGY: Order {} was not open when requoting", order_id);
            }
        }

        let replacement = match order.side {
            Side::Buy => LimitOrder::buy(self.symbol.clone(), self.bid_price(), self.config.bid_size),
            Side::Sell => {
                LimitOrder::sell(self.symbol.clone(), self.ask_price(), self.config.ask_size)
            }
        };
        exchange.place_order(replacement)?;
        Ok(())
    }

    /// Returns true if both sides were requoted.
    fn handle_waiting(
        &self,
        first: &LimitOrder,
        second: &LimitOrder,
        exchange: &mut dyn ExchangeApi,
    ) -> Result<bool> {
        let last_timestamp = first.timestamp.max(second.timestamp);
        if self.timestamp.saturating_sub(last_timestamp) < self.config.requote_both_sides_timeout {
            return Ok(false);
        }

        debug!("STRATEGY: Requote both orders at {}", self.timestamp);
        exchange.cancel_all_orders();
        self.quote_orders(exchange)?;
        Ok(true)
    }
}

impl Strategy for MarketMaker {
    fn update(&mut self, report: &TickReport, exchange: &mut dyn ExchangeApi) -> Result<()> {
        self.process_next_tick(report, exchange)
    }
}
