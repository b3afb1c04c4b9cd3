use log::info;
use serde::{Deserialize, Serialize};

use crate::config::SimConfig;
use crate::error::Result;
use crate::exchange::{Exchange, ExchangeApi};
use crate::input::TickData;
use crate::results::ResultsLedger;
use crate::strategy::market_maker::MarketMaker;
use crate::strategy::Strategy;

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RunSummary {
    pub ticks: usize,
    pub filled_orders: usize,
    pub open_orders: usize,
    pub final_position: f64,
    pub final_balance: f64,
    pub realized_pnl: f64,
}

/// Drives one run. On each tick the exchange is advanced first, then the strategy acts on the
/// result, then the exchange is recorded. Nothing runs between ticks.
pub struct Simulation<S: Strategy = MarketMaker> {
    exchange: Exchange,
    strategy: S,
    ticks: TickData,
    ledger: ResultsLedger,
    initial_balance: f64,
    processed: usize,
}

impl Simulation<MarketMaker> {
    pub fn new(config: &SimConfig, ticks: TickData) -> Self {
        let exchange = Exchange::new(config.symbol.clone(), config.initial_balance);
        let strategy = MarketMaker::new(config.symbol.clone(), config.market_maker.clone());
        Self::with_strategy(exchange, strategy, ticks)
    }
}

impl<S: Strategy> Simulation<S> {
    pub fn with_strategy(exchange: Exchange, strategy: S, ticks: TickData) -> Self {
        let initial_balance = exchange.balance();
        Self {
            exchange,
            strategy,
            ticks,
            ledger: ResultsLedger::new(),
            initial_balance,
            processed: 0,
        }
    }

    pub fn run(&mut self) -> Result<RunSummary> {
        info!(
            "SIM: Starting run over {} ticks of {} ({} to {})",
            self.ticks.len(),
            self.exchange.symbol(),
            self.ticks.start_date,
            self.ticks.end_date
        );

        for tick in &self.ticks.data {
            let report = self.exchange.advance(tick);
            self.strategy.update(&report, &mut self.exchange)?;
            self.ledger.record(&self.exchange);
            self.processed += 1;
        }

        let summary = self.summary();
        info!(
            "SIM: Finished run, {} fills, position {:.6}, balance {:.6}",
            summary.filled_orders, summary.final_position, summary.final_balance
        );
        Ok(summary)
    }

    pub fn summary(&self) -> RunSummary {
        let filled = self.exchange.filled_orders();
        RunSummary {
            ticks: self.processed,
            filled_orders: filled.len(),
            open_orders: self.exchange.open_orders().len(),
            final_position: self.exchange.position().size,
            final_balance: self.exchange.balance(),
            realized_pnl: self.exchange.balance() - self.initial_balance,
        }
    }

    pub fn exchange(&self) -> &Exchange {
        &self.exchange
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn ledger(&self) -> &ResultsLedger {
        &self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::Simulation;
    use crate::config::SimConfig;
    use crate::exchange::ExchangeApi;
    use crate::input::{Tick, TickData};

    fn config() -> SimConfig {
        let mut config = SimConfig::default();
        config.symbol = "ABC".to_string();
        config.market_maker.spread = 0.2;
        config.market_maker.requote_one_side_timeout = 10;
        config.market_maker.requote_both_sides_timeout = 5;
        config
    }

    #[test]
    fn test_that_round_trip_realizes_spread() {
        let ticks = TickData::new(
            "ABC",
            vec![
                Tick::new(100, 100.0),
                Tick::new(101, 99.8),
                Tick::new(102, 100.2),
            ],
        );
        let mut sim = Simulation::new(&config(), ticks);
        let summary = sim.run().unwrap();

        //Bid 99.9 fills at 101 then ask 100.1 fills at 102
        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.filled_orders, 2);
        assert_eq!(summary.final_position, 0.0);
        assert!((summary.final_balance - 0.2).abs() < 1e-9);
        //Book was empty after the second fill so the strategy quoted again
        assert_eq!(summary.open_orders, 2);
        assert_eq!(sim.ledger().len(), 3);
    }

    #[test]
    fn test_that_one_record_is_written_per_tick() {
        let ticks = TickData::random(200, 1000, 100.0, 11);
        let mut sim = Simulation::new(&config(), ticks);
        sim.run().unwrap();

        let ledger = sim.ledger();
        assert_eq!(ledger.len(), 200);
        let last = ledger.records().last().unwrap();
        assert_eq!(last.timestamp, 1199);
        assert_eq!(last.position, sim.exchange().position().size);
    }
}
