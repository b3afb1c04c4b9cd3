use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::exchange::order::Side;
use crate::exchange::ExchangeApi;

const HEADER: [&str; 6] = ["Timestamp", "Price", "Bids", "Asks", "Balance", "Position"];

/// State of the exchange at the end of one tick, after the strategy has acted.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ResultsRecord {
    pub timestamp: i64,
    pub price: f64,
    pub bids: Vec<f64>,
    pub asks: Vec<f64>,
    pub balance: f64,
    pub position: f64,
}

fn format_prices(prices: &[f64]) -> String {
    let inner: Vec<String> = prices.iter().map(|p| p.to_string()).collect();
    format!("[{}]", inner.join(" "))
}

#[derive(Clone, Debug, Default)]
pub struct ResultsLedger {
    records: Vec<ResultsRecord>,
}

impl ResultsLedger {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn records(&self) -> &[ResultsRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends a snapshot of the exchange. Quote prices are listed in the order they were placed.
    pub fn record(&mut self, exchange: &dyn ExchangeApi) {
        let mut open_orders = exchange.open_orders();
        open_orders.sort_by_key(|order| order.order_id);

        let mut bids = Vec::new();
        let mut asks = Vec::new();
        for order in open_orders {
            match order.side {
                Side::Buy => bids.push(order.price),
                Side::Sell => asks.push(order.price),
            }
        }

        self.records.push(ResultsRecord {
            timestamp: exchange.timestamp(),
            price: exchange.mark_price(),
            bids,
            asks,
            balance: exchange.balance(),
            position: exchange.position().size,
        });
    }

    /// Writes one row per recorded tick, creating the parent folder if needed.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(HEADER)?;
        for record in &self.records {
            wtr.write_record([
                record.timestamp.to_string(),
                format!("{:.6}", record.price),
                format_prices(&record.bids),
                format_prices(&record.asks),
                format!("{:.6}", record.balance),
                format!("{:.6}", record.position),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}
