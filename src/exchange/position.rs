use serde::{Deserialize, Serialize};

use super::order::Side;

//Residuals this small relative to the sizes involved are float noise and are treated as flat
const FLAT_EPSILON: f64 = 1e-12;

/// Signed position in the simulated symbol. Positive is long, negative is short.
///
/// `average_price` only has meaning while `size` is non-zero and is reset to zero when the position
/// goes flat.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Position {
    pub symbol: String,
    pub size: f64,
    pub average_price: f64,
}

impl Position {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            size: 0.0,
            average_price: 0.0,
        }
    }

    pub fn with_size(symbol: impl Into<String>, size: f64, average_price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            size,
            average_price,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.size == 0.0
    }

    /// PnL realized by a fill against the current position, before the position is updated.
    ///
    /// A fill against an opposite-signed position realizes PnL on the full fill size at the
    /// current average price, even when the fill is larger than the position and flips it. Opening
    /// and same-direction fills realize nothing.
    pub fn realized_pnl(&self, side: Side, price: f64, size: f64) -> f64 {
        match side {
            Side::Buy if self.size < 0.0 => (self.average_price - price) * size,
            Side::Sell if self.size > 0.0 => (price - self.average_price) * size,
            _ => 0.0,
        }
    }

    /// Applies a fill, returning the realized PnL.
    pub fn apply_fill(&mut self, side: Side, price: f64, size: f64) -> f64 {
        let realized = self.realized_pnl(side, price, size);
        let signed = match side {
            Side::Buy => size,
            Side::Sell => -size,
        };

        let old_size = self.size;
        let mut new_size = old_size + signed;
        if new_size.abs() < FLAT_EPSILON * old_size.abs().max(size) {
            new_size = 0.0;
        }

        if new_size == 0.0 {
            self.average_price = 0.0;
        } else if old_size == 0.0 || old_size.signum() == signed.signum() {
            //Opening or adding, weight the entry prices
            let old_abs = old_size.abs();
            self.average_price = (old_abs * self.average_price + size * price) / (old_abs + size);
        } else if new_size.signum() != old_size.signum() {
            //Flipped through zero, the remainder was opened at the fill price
            self.average_price = price;
        }
        //Otherwise the position was reduced and keeps its entry price

        self.size = new_size;
        realized
    }
}
