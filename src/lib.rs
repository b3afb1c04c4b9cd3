//! # What is quotesim?
//!
//! quotesim replays a recorded series of prices for a single symbol through a simulated exchange
//! and a market-making strategy. Each run produces a ledger of quotes, balance and position over
//! time which can be inspected offline. Runs are deterministic: the same ticks and the same
//! configuration always produce the same fills, PnL and final balance.
//!
//! # Implementation
//!
//! A run is composed of:
//! - An input, [TickData](crate::input::TickData), which holds the ordered `(timestamp, price)`
//! observations. Ticks are either read from a processed two-column file or built from a folder of
//! raw exchange trade files through [source](crate::source).
//! - An exchange, [Exchange](crate::exchange::Exchange), which holds the mark price, open and
//! filled orders, position and balance. The exchange fills resting limit orders against the mark
//! price when it is advanced to a new tick.
//! - A strategy, [MarketMaker](crate::strategy::market_maker::MarketMaker), which looks at the
//! exchange after every tick and quotes, requotes one side or waits. The strategy only ever sees
//! the exchange through [ExchangeApi](crate::exchange::ExchangeApi) so it cannot touch the book
//! directly.
//! - A driver, [Simulation](crate::simulation::Simulation), which owns both and calls them in a
//! fixed order on each tick, and a [ResultsLedger](crate::results::ResultsLedger) which snapshots
//! the exchange after the strategy has acted.
//!
//! The exchange has no knowledge of the strategy. Fills for a tick are returned from
//! [Exchange::advance](crate::exchange::Exchange::advance) and passed on by the driver.
//!
//! ``
//! cargo run --bin mm_backtest [tick_path] [results_path] [config_path]
//! ``
pub mod config;
pub mod error;
pub mod exchange;
pub mod input;
pub mod results;
pub mod simulation;
pub mod source;
pub mod strategy;
