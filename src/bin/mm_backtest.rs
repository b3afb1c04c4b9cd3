use std::env;
use std::path::Path;

use anyhow::{bail, Context, Result};
use quotesim::config::SimConfig;
use quotesim::input::TickData;
use quotesim::simulation::Simulation;

fn main() -> Result<()> {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        bail!("usage: {} <tick_path> <results_path> [config_path]", args[0]);
    }

    let tick_path = Path::new(&args[1]);
    let results_path = Path::new(&args[2]);
    let config = match args.get(3) {
        Some(config_path) => SimConfig::from_file(config_path)
            .with_context(|| format!("could not load config from {}", config_path))?,
        None => SimConfig::default(),
    };
    config.validate().context("invalid config")?;

    let ticks = if tick_path.is_dir() {
        let ticks = TickData::from_trade_folder(tick_path, config.symbol.clone())
            .with_context(|| format!("could not process trade folder {}", tick_path.display()))?;
        //Processed series goes next to the results so later runs can load it directly
        let processed = results_path.with_file_name(format!("{}_1s.csv", config.symbol));
        ticks
            .write_to_file(&processed)
            .with_context(|| format!("could not write ticks to {}", processed.display()))?;
        ticks
    } else {
        TickData::from_file(tick_path, config.symbol.clone())
            .with_context(|| format!("could not load ticks from {}", tick_path.display()))?
    };

    let mut sim = Simulation::new(&config, ticks);
    let summary = sim.run().context("simulation did not complete")?;

    sim.ledger()
        .write_to_file(results_path)
        .with_context(|| format!("could not write results to {}", results_path.display()))?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
