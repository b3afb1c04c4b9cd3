//! Sources turn raw exchange data into the processed tick format used by
//! [input](crate::input).
pub mod binance;
