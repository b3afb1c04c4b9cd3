use std::path::PathBuf;

use quotesim::config::SimConfig;
use quotesim::input::TickData;
use quotesim::simulation::Simulation;

fn temp_folder(name: &str) -> PathBuf {
    let folder = std::env::temp_dir().join(format!("quotesim_replay_{}", name));
    let _ = std::fs::remove_dir_all(&folder);
    std::fs::create_dir_all(&folder).unwrap();
    folder
}

#[test]
fn test_that_replay_from_file_writes_one_row_per_tick() {
    let folder = temp_folder("file");
    let tick_path = folder.join("ticks.csv");
    std::fs::write(
        &tick_path,
        "Timestamp,Price\n100,100.0\n101,99.8\n102,100.2\n103,100.2\n",
    )
    .unwrap();

    let mut config = SimConfig::default();
    config.symbol = "ABC".to_string();
    config.market_maker.spread = 0.2;

    let ticks = TickData::from_file(&tick_path, "ABC").unwrap();
    let mut sim = Simulation::new(&config, ticks);
    let summary = sim.run().unwrap();
    assert_eq!(summary.ticks, 4);
    assert_eq!(summary.filled_orders, 2);

    let results_path = folder.join("out").join("results.csv");
    sim.ledger().write_to_file(&results_path).unwrap();

    let mut rdr = csv::Reader::from_path(&results_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["Timestamp", "Price", "Bids", "Asks", "Balance", "Position"]
    );
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 4);
    //After the bid fills only the ask is resting
    assert_eq!(&rows[1][2], "[]");
    assert_eq!(&rows[1][5], "1.000000");
}

#[test]
fn test_that_trade_folder_is_concatenated_in_name_order() {
    let folder = temp_folder("trades");
    std::fs::write(
        folder.join("day2.csv"),
        "id,first_id,price,qty,quote_qty,time,is_buyer_maker\n\
         1,1,0.20,1,1,1650086400000,true\n\
         2,2,0.21,1,1,1650086401500,true\n",
    )
    .unwrap();
    std::fs::write(
        folder.join("day1.csv"),
        "id,first_id,price,qty,quote_qty,time,is_buyer_maker\n\
         1,1,0.10,1,1,1650000000000,true\n\
         2,2,0.11,1,1,1650000000500,true\n\
         3,3,0.12,1,1,1650000002000,true\n",
    )
    .unwrap();

    let ticks = TickData::from_trade_folder(&folder, "DOGEUSDT").unwrap();
    let prices: Vec<f64> = ticks.data.iter().map(|t| t.price).collect();
    assert_eq!(prices, vec![0.10, 0.12, 0.20, 0.21]);
    assert_eq!(ticks.symbol, "DOGEUSDT");
    assert_eq!(ticks.start_date, "2022-04-15 05:20:00 UTC");
}
