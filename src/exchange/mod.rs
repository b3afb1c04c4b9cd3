//! The simulated exchange holds the venue state for a single symbol: mark price, time, the book of
//! open orders, filled orders, position and balance. Execution logic is the fill rule applied when
//! the exchange is advanced to a new tick.
//!
//! Clients, the strategy included, only act on the exchange through [ExchangeApi]. The book itself
//! is never handed out: accessors return copies.
pub mod order;
pub mod position;

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::input::Tick;
use order::{LimitOrder, OrderId};
use position::Position;

/// Operations that a client can perform against the exchange.
pub trait ExchangeApi {
    /// Assigns a fresh id and the current timestamp, then inserts into the book.
    fn place_order(&mut self, order: LimitOrder) -> Result<OrderId>;
    /// Returns false if the order is not open, which includes orders that have already filled.
    fn cancel_order(&mut self, order_id: OrderId) -> bool;
    fn cancel_all_orders(&mut self);
    /// Copies of the open orders. Callers must not rely on the ordering.
    fn open_orders(&self) -> Vec<LimitOrder>;
    fn filled_orders(&self) -> Vec<LimitOrder>;
    fn mark_price(&self) -> f64;
    fn balance(&self) -> f64;
    fn position(&self) -> Position;
    fn timestamp(&self) -> i64;
}

/// Returned from [Exchange::advance] once the fills for a tick have been applied.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TickReport {
    pub timestamp: i64,
    pub mark_price: f64,
    pub fills: Vec<LimitOrder>,
}

#[derive(Debug)]
pub struct Exchange {
    symbol: String,
    timestamp: i64,
    mark_price: f64,
    balance: f64,
    position: Position,
    //BTreeMap so that fills within one tick execute in ascending id order
    open_orders: BTreeMap<OrderId, LimitOrder>,
    filled_orders: BTreeMap<OrderId, LimitOrder>,
    last_order_id: OrderId,
}

impl Exchange {
    pub fn new(symbol: impl Into<String>, balance: f64) -> Self {
        let symbol = symbol.into();
        Self {
            position: Position::new(symbol.clone()),
            symbol,
            timestamp: 0,
            mark_price: 0.0,
            balance,
            open_orders: BTreeMap::new(),
            filled_orders: BTreeMap::new(),
            last_order_id: 0,
        }
    }

    /// Starts the exchange with an existing position, used to replay from a known state.
    pub fn with_position(symbol: impl Into<String>, balance: f64, position: Position) -> Self {
        let mut exchange = Self::new(symbol, balance);
        exchange.position = position;
        exchange
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Moves the exchange to the tick and fills every open order that crosses the new mark price.
    ///
    /// Every order is checked against the same mark price. Orders fill at their limit price in
    /// ascending id order, so position and balance updates within a tick are reproducible.
    pub fn advance(&mut self, tick: &Tick) -> TickReport {
        if tick.timestamp < self.timestamp {
            warn!(
                "EXCHANGE: Tick at {} is earlier than exchange time {}",
                tick.timestamp, self.timestamp
            );
        }
        self.timestamp = tick.timestamp;
        self.mark_price = tick.price;

        let mark_price = self.mark_price;
        let crossed: Vec<OrderId> = self
            .open_orders
            .iter()
            .filter(|(_, order)| order.crosses(mark_price))
            .map(|(order_id, _)| *order_id)
            .collect();

        let mut fills = Vec::with_capacity(crossed.len());
        for order_id in crossed {
            if let Some(order) = self.execute_order(order_id) {
                fills.push(order);
            }
        }

        TickReport {
            timestamp: self.timestamp,
            mark_price,
            fills,
        }
    }

    fn execute_order(&mut self, order_id: OrderId) -> Option<LimitOrder> {
        let mut order = self.open_orders.remove(&order_id)?;

        let realized_pnl = self
            .position
            .apply_fill(order.side, order.price, order.size);
        order.realized_pnl = realized_pnl;
        order.filled_timestamp = Some(self.timestamp);
        self.balance += realized_pnl;

        debug!(
            "EXCHANGE: Filled order {} at {}: {}, position {:.6}",
            order_id, self.timestamp, order, self.position.size
        );
        self.filled_orders.insert(order_id, order.clone());
        Some(order)
    }
}

impl ExchangeApi for Exchange {
    fn place_order(&mut self, mut order: LimitOrder) -> Result<OrderId> {
        let order_id = self.last_order_id;
        if self.open_orders.contains_key(&order_id) || self.filled_orders.contains_key(&order_id) {
            return Err(SimError::DuplicateOrderId {
                id: order_id,
                timestamp: self.timestamp,
            });
        }
        self.last_order_id += 1;

        order.set_order_id(order_id);
        order.timestamp = self.timestamp;
        debug!("EXCHANGE: Placed order {} at {}: {}", order_id, self.timestamp, order);
        self.open_orders.insert(order_id, order);
        Ok(order_id)
    }

    fn cancel_order(&mut self, order_id: OrderId) -> bool {
        self.open_orders.remove(&order_id).is_some()
    }

    fn cancel_all_orders(&mut self) {
        self.open_orders.clear();
    }

    fn open_orders(&self) -> Vec<LimitOrder> {
        self.open_orders.values().cloned().collect()
    }

    fn filled_orders(&self) -> Vec<LimitOrder> {
        self.filled_orders.values().cloned().collect()
    }

    fn mark_price(&self) -> f64 {
        self.mark_price
    }

    fn balance(&self) -> f64 {
        self.balance
    }

    fn position(&self) -> Position {
        self.position.clone()
    }

    fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::order::{LimitOrder, Side};
    use super::position::Position;
    use super::{Exchange, ExchangeApi};
    use crate::input::Tick;

    fn setup() -> Exchange {
        let mut exchange = Exchange::new("ABC", 0.0);
        exchange.advance(&Tick::new(100, 100.0));
        exchange
    }

    #[test]
    fn test_that_order_ids_are_never_reused() {
        let mut exchange = setup();
        let first = exchange.place_order(LimitOrder::buy("ABC", 99.0, 1.0)).unwrap();
        assert!(exchange.cancel_order(first));
        let second = exchange.place_order(LimitOrder::buy("ABC", 99.0, 1.0)).unwrap();
        assert_ne!(first, second);
        assert!(second > first);
    }

    #[test]
    fn test_that_placed_order_is_stamped_with_exchange_time() {
        let mut exchange = setup();
        let order_id = exchange.place_order(LimitOrder::sell("ABC", 101.0, 1.0)).unwrap();
        let open = exchange.open_orders();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].order_id, Some(order_id));
        assert_eq!(open[0].timestamp, 100);
    }

    #[test]
    fn test_that_cancel_twice_returns_true_then_false() {
        let mut exchange = setup();
        let order_id = exchange.place_order(LimitOrder::buy("ABC", 99.0, 1.0)).unwrap();
        assert!(exchange.cancel_order(order_id));
        assert!(!exchange.cancel_order(order_id));
        assert!(!exchange.cancel_order(12345));
    }

    #[test]
    fn test_that_cancel_of_filled_order_returns_false() {
        let mut exchange = setup();
        let order_id = exchange.place_order(LimitOrder::buy("ABC", 99.0, 1.0)).unwrap();
        exchange.advance(&Tick::new(101, 98.0));
        assert!(!exchange.cancel_order(order_id));
        assert_eq!(exchange.filled_orders().len(), 1);
    }

    #[test]
    fn test_that_cancel_all_empties_book() {
        let mut exchange = setup();
        exchange.place_order(LimitOrder::buy("ABC", 99.0, 1.0)).unwrap();
        exchange.place_order(LimitOrder::sell("ABC", 101.0, 1.0)).unwrap();
        exchange.cancel_all_orders();
        assert!(exchange.open_orders().is_empty());
        assert!(exchange.filled_orders().is_empty());
    }

    #[test]
    fn test_that_buy_fills_when_mark_at_or_below_limit() {
        let mut exchange = setup();
        exchange.place_order(LimitOrder::buy("ABC", 99.0, 1.0)).unwrap();

        let report = exchange.advance(&Tick::new(101, 99.5));
        assert!(report.fills.is_empty());

        let report = exchange.advance(&Tick::new(102, 99.0));
        assert_eq!(report.fills.len(), 1);
        let fill = &report.fills[0];
        assert_eq!(fill.filled_timestamp, Some(102));
        assert_eq!(fill.price, 99.0);
        assert_eq!(exchange.position().size, 1.0);
    }

    #[test]
    fn test_that_sell_fills_when_mark_at_or_above_limit() {
        let mut exchange = setup();
        exchange.place_order(LimitOrder::sell("ABC", 101.0, 2.0)).unwrap();

        let report = exchange.advance(&Tick::new(101, 100.5));
        assert!(report.fills.is_empty());

        let report = exchange.advance(&Tick::new(102, 103.0));
        assert_eq!(report.fills.len(), 1);
        //Fills at the limit, not the mark
        assert_eq!(report.fills[0].price, 101.0);
        assert_eq!(exchange.position().size, -2.0);
        assert!(exchange.open_orders().is_empty());
    }

    #[test]
    fn test_that_fills_within_tick_are_in_ascending_id_order() {
        let mut exchange = setup();
        let first = exchange.place_order(LimitOrder::buy("ABC", 99.0, 1.0)).unwrap();
        let second = exchange.place_order(LimitOrder::buy("ABC", 98.0, 1.0)).unwrap();
        let third = exchange.place_order(LimitOrder::buy("ABC", 99.5, 1.0)).unwrap();

        let report = exchange.advance(&Tick::new(101, 97.0));
        let ids: Vec<_> = report.fills.iter().map(|o| o.order_id.unwrap()).collect();
        assert_eq!(ids, vec![first, second, third]);
        assert_eq!(exchange.position().size, 3.0);
        assert_eq!(exchange.position().average_price, (99.0 + 98.0 + 99.5) / 3.0);
    }

    #[test]
    fn test_that_closing_fill_moves_balance() {
        let position = Position::with_size("ABC", -1.0, 100.0);
        let mut exchange = Exchange::with_position("ABC", 10.0, position);
        exchange.advance(&Tick::new(100, 100.5));
        exchange.place_order(LimitOrder::buy("ABC", 101.0, 1.0)).unwrap();

        let report = exchange.advance(&Tick::new(101, 101.0));
        assert_eq!(report.fills.len(), 1);
        assert_eq!(report.fills[0].realized_pnl, -1.0);
        assert_eq!(exchange.balance(), 9.0);
        assert!(exchange.position().is_flat());
    }

    #[test]
    fn test_that_opening_fill_leaves_balance_unchanged() {
        let mut exchange = Exchange::new("ABC", 50.0);
        exchange.advance(&Tick::new(100, 100.0));
        exchange.place_order(LimitOrder::sell("ABC", 100.1, 1.0)).unwrap();
        let report = exchange.advance(&Tick::new(101, 100.2));
        assert_eq!(report.fills[0].side, Side::Sell);
        assert_eq!(report.fills[0].realized_pnl, 0.0);
        assert_eq!(exchange.balance(), 50.0);
    }

    #[test]
    fn test_that_advance_on_empty_book_only_moves_price() {
        let mut exchange = setup();
        let report = exchange.advance(&Tick::new(105, 42.0));
        assert!(report.fills.is_empty());
        assert_eq!(exchange.mark_price(), 42.0);
        assert_eq!(exchange.timestamp(), 105);
    }
}
