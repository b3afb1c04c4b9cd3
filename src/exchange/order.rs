use std::fmt;

use serde::{Deserialize, Serialize};

pub type OrderId = u64;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    pub fn is_buy(&self) -> bool {
        matches!(self, Side::Buy)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Resting limit order for the single simulated symbol.
///
/// Orders are built by the strategy without an id or timestamp, both are assigned by the exchange
/// when the order enters the book. After that only the exchange mutates an order, at fill time.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct LimitOrder {
    pub order_id: Option<OrderId>,
    pub symbol: String,
    pub timestamp: i64,
    pub price: f64,
    pub size: f64,
    pub side: Side,
    pub filled_timestamp: Option<i64>,
    pub realized_pnl: f64,
}

impl LimitOrder {
    fn new(symbol: impl Into<String>, side: Side, price: f64, size: f64) -> Self {
        Self {
            order_id: None,
            symbol: symbol.into(),
            timestamp: 0,
            price,
            size,
            side,
            filled_timestamp: None,
            realized_pnl: 0.0,
        }
    }

    pub fn buy(symbol: impl Into<String>, price: f64, size: f64) -> Self {
        LimitOrder::new(symbol, Side::Buy, price, size)
    }

    pub fn sell(symbol: impl Into<String>, price: f64, size: f64) -> Self {
        LimitOrder::new(symbol, Side::Sell, price, size)
    }

    pub fn is_buy(&self) -> bool {
        self.side.is_buy()
    }

    pub fn is_filled(&self) -> bool {
        self.filled_timestamp.is_some()
    }

    /// Buys fill when the mark trades at or through the limit from above, sells from below.
    pub fn crosses(&self, mark_price: f64) -> bool {
        match self.side {
            Side::Buy => mark_price <= self.price,
            Side::Sell => mark_price >= self.price,
        }
    }

    pub(crate) fn set_order_id(&mut self, order_id: OrderId) {
        self.order_id = Some(order_id);
    }
}

impl fmt::Display for LimitOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "symbol {}, price {:.6}, size {:.6}, side {}, realized pnl {:.6}",
            self.symbol, self.price, self.size, self.side, self.realized_pnl
        )
    }
}
