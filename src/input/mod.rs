//! Inputs produce the ordered tick series that is replayed through the exchange.
//!
//! The processed tick file is two columns with a header row, `Timestamp,Price`. Timestamps are
//! seconds, prices are the mark price of the single simulated symbol. Raw exchange files are turned
//! into this format by [source](crate::source).
use std::fs;
use std::path::Path;

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::OffsetDateTime;

use crate::error::{Result, SimError};

/// One observation of the mark price.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Tick {
    pub timestamp: i64,
    pub price: f64,
}

impl Tick {
    pub fn new(timestamp: i64, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// Renders a timestamp in seconds as a UTC date, falls back to the raw number if the timestamp is
/// out of range.
pub fn timestamp_to_date(timestamp: i64) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second] UTC");
    OffsetDateTime::from_unix_timestamp(timestamp)
        .ok()
        .and_then(|date| date.format(&format).ok())
        .unwrap_or_else(|| timestamp.to_string())
}

#[derive(Clone, Debug, Default)]
pub struct TickData {
    pub symbol: String,
    pub start_date: String,
    pub end_date: String,
    pub data: Vec<Tick>,
}

impl TickData {
    pub fn new(symbol: impl Into<String>, data: Vec<Tick>) -> Self {
        let mut tick_data = Self {
            symbol: symbol.into(),
            start_date: String::new(),
            end_date: String::new(),
            data,
        };
        tick_data.update_dates();
        tick_data
    }

    fn update_dates(&mut self) {
        if let (Some(first), Some(last)) = (self.data.first(), self.data.last()) {
            self.start_date = timestamp_to_date(first.timestamp);
            self.end_date = timestamp_to_date(last.timestamp);
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Reads a processed tick file. Any row that cannot be parsed aborts the load, the core never
    /// sees a partial series.
    pub fn from_file(path: impl AsRef<Path>, symbol: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        let path_string = path.display().to_string();
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut data = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let malformed = |reason: String| SimError::MalformedTick {
                path: path_string.clone(),
                line,
                reason,
            };

            let timestamp = record
                .get(0)
                .ok_or_else(|| malformed("missing timestamp".to_string()))?
                .parse::<f64>()
                .map_err(|e| malformed(format!("timestamp: {}", e)))?;
            let price = record
                .get(1)
                .ok_or_else(|| malformed("missing price".to_string()))?
                .parse::<f64>()
                .map_err(|e| malformed(format!("price: {}", e)))?;

            //i64::MAX as f64 rounds up to 2^63, which is already out of range
            if !timestamp.is_finite()
                || timestamp < i64::MIN as f64
                || timestamp >= i64::MAX as f64
            {
                return Err(malformed(format!("timestamp out of range: {}", timestamp)));
            }
            if !price.is_finite() {
                return Err(malformed(format!("price is not finite: {}", price)));
            }

            //Timestamps can be written as floats, the engine works in whole seconds
            data.push(Tick::new(timestamp as i64, price));
        }

        if data.is_empty() {
            return Err(SimError::EmptyTickData { path: path_string });
        }

        let tick_data = Self::new(symbol, data);
        info!(
            "INPUT: Loaded {} ticks from {} ({} to {})",
            tick_data.len(),
            path_string,
            tick_data.start_date,
            tick_data.end_date
        );
        Ok(tick_data)
    }

    /// Processes every raw exchange trade file in a folder, in filename order, into one series.
    pub fn from_trade_folder(path: impl AsRef<Path>, symbol: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        let mut tick_data = Self::new(symbol, Vec::new());
        for file in crate::source::binance::trade_files_in(path)? {
            tick_data.append(&crate::source::binance::process_trade_file(&file)?);
        }

        if tick_data.is_empty() {
            return Err(SimError::EmptyTickData {
                path: path.display().to_string(),
            });
        }
        info!(
            "INPUT: Built {} ticks from trade folder {} ({} to {})",
            tick_data.len(),
            path.display(),
            tick_data.start_date,
            tick_data.end_date
        );
        Ok(tick_data)
    }

    pub fn append(&mut self, other: &TickData) {
        self.data.extend_from_slice(&other.data);
        self.update_dates();
    }

    /// Writes the series in the processed two-column format so it can be reloaded with
    /// [TickData::from_file].
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut wtr = csv::Writer::from_path(path)?;
        wtr.write_record(["Timestamp", "Price"])?;
        for tick in &self.data {
            wtr.write_record([tick.timestamp.to_string(), tick.price.to_string()])?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Seeded random walk with one tick per second, used for benchmarks and smoke tests.
    pub fn random(length: usize, start: i64, start_price: f64, seed: u64) -> Self {
        let step_dist = Uniform::new(-0.002, 0.002);
        let mut rng = StdRng::seed_from_u64(seed);

        let mut price = start_price;
        let mut data = Vec::with_capacity(length);
        for i in 0..length {
            data.push(Tick::new(start + i as i64, price));
            price *= 1.0 + step_dist.sample(&mut rng);
        }
        Self::new("RANDOM", data)
    }
}
