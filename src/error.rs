use derive_more::{Display, Error};

use crate::exchange::order::OrderId;

/// Errors that stop a run.
///
/// Invariant violations inside the exchange or strategy and malformed input are both fatal: the
/// simulation is a deterministic replay so there is nothing to retry against. Expected negative
/// outcomes, such as cancelling an order that has already filled, are not errors and are returned
/// as `bool` from the relevant operation.
#[derive(Debug, Display, Error)]
pub enum SimError {
    #[display("order id {id} already exists in the book at timestamp {timestamp}")]
    DuplicateOrderId { id: OrderId, timestamp: i64 },
    #[display("strategy found {open_orders} open orders at timestamp {timestamp}")]
    UnreachableBookState { open_orders: usize, timestamp: i64 },
    #[display("no ticks found in {path}")]
    EmptyTickData { path: String },
    #[display("malformed tick in {path} at line {line}: {reason}")]
    MalformedTick {
        path: String,
        line: u64,
        reason: String,
    },
    #[display("invalid config: {reason}")]
    InvalidConfig { reason: String },
    Io(std::io::Error),
    Csv(csv::Error),
    Zip(zip::result::ZipError),
    Json(serde_json::Error),
}

impl From<std::io::Error> for SimError {
    fn from(value: std::io::Error) -> Self {
        SimError::Io(value)
    }
}

impl From<csv::Error> for SimError {
    fn from(value: csv::Error) -> Self {
        SimError::Csv(value)
    }
}

impl From<zip::result::ZipError> for SimError {
    fn from(value: zip::result::ZipError) -> Self {
        SimError::Zip(value)
    }
}

impl From<serde_json::Error> for SimError {
    fn from(value: serde_json::Error) -> Self {
        SimError::Json(value)
    }
}

pub type Result<T> = std::result::Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::SimError;

    #[test]
    fn test_that_invariant_errors_carry_timestamp_context() {
        let err = SimError::DuplicateOrderId {
            id: 4,
            timestamp: 1_650_000_000,
        };
        let msg = err.to_string();
        assert!(msg.contains("4"));
        assert!(msg.contains("1650000000"));
    }
}
