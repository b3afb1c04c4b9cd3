use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::{Result, SimError};
use crate::input::{Tick, TickData};

/*
 * Exchange trade file format, one trade per row after a header row:
 * 0: trade id
 * 1: first id
 * 2: price
 * 3: quantity
 * 4: quote quantity
 * 5: time in milliseconds
 * 6: is buyer maker
 */
const PRICE_COLUMN: usize = 2;
const TIMESTAMP_COLUMN: usize = 5;

/// Lists the `.csv` and `.zip` files under a folder, including subfolders, in lexical path order so
/// that the concatenated series does not depend on directory iteration order.
pub fn trade_files_in(folder: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_trade_files(folder, &mut files)?;
    Ok(files)
}

fn collect_trade_files(folder: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    let mut entries = fs::read_dir(folder)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<PathBuf>>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            collect_trade_files(&path, files)?;
        } else if is_trade_file(&path) {
            files.push(path);
        }
    }
    Ok(())
}

fn is_trade_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("csv") | Some("zip")
    )
}

/// Reads one raw trade file, or every csv inside a zip archive, keeping at most one observation per
/// second.
pub fn process_trade_file(path: &Path) -> Result<TickData> {
    info!("SOURCE: Processing trade file {}", path.display());
    let name = path.display().to_string();

    let mut data = Vec::new();
    if path.extension().and_then(|ext| ext.to_str()) == Some("zip") {
        let mut archive = zip::ZipArchive::new(File::open(path)?)?;
        for i in 0..archive.len() {
            let zip_file = archive.by_index(i)?;
            if !zip_file.name().ends_with(".csv") {
                continue;
            }
            let inner_name = format!("{}:{}", name, zip_file.name());
            data.extend(read_trades(zip_file, &inner_name)?);
        }
    } else {
        data.extend(read_trades(File::open(path)?, &name)?);
    }
    Ok(TickData::new("", data))
}

fn read_trades<R: Read>(reader: R, name: &str) -> Result<Vec<Tick>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut ticks = Vec::new();
    let mut last_timestamp: i64 = 0;
    for result in rdr.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);
        let malformed = |reason: String| SimError::MalformedTick {
            path: name.to_string(),
            line,
            reason,
        };

        let millis = row
            .get(TIMESTAMP_COLUMN)
            .ok_or_else(|| malformed("missing time column".to_string()))?
            .trim()
            .parse::<i64>()
            .map_err(|e| malformed(format!("time: {}", e)))?;
        let price = row
            .get(PRICE_COLUMN)
            .ok_or_else(|| malformed("missing price column".to_string()))?
            .trim()
            .parse::<f64>()
            .map_err(|e| malformed(format!("price: {}", e)))?;
        if !price.is_finite() {
            return Err(malformed(format!("price is not finite: {}", price)));
        }

        let timestamp = millis / 1000;
        if timestamp > last_timestamp {
            last_timestamp = timestamp;
            ticks.push(Tick::new(timestamp, price));
        }
    }
    Ok(ticks)
}
