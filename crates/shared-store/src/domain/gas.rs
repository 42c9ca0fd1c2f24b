//! # Gas Metering
//!
//! Every store access made on behalf of a transaction consumes gas from the
//! transaction's meter. Block-level and genesis contexts use an infinite meter.

use crate::errors::StoreError;
use std::cell::Cell;

/// Gas costs of store operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GasConfig {
    pub has_cost: u64,
    pub delete_cost: u64,
    pub read_cost_flat: u64,
    pub read_cost_per_byte: u64,
    pub write_cost_flat: u64,
    pub write_cost_per_byte: u64,
    pub iter_next_cost_flat: u64,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            has_cost: 1000,
            delete_cost: 1000,
            read_cost_flat: 1000,
            read_cost_per_byte: 3,
            write_cost_flat: 2000,
            write_cost_per_byte: 30,
            iter_next_cost_flat: 30,
        }
    }
}

/// Tracks gas consumption against an optional limit.
///
/// Consumption goes through a `Cell` so read-only accessors can meter gas.
#[derive(Debug, Clone)]
pub struct GasMeter {
    limit: Option<u64>,
    consumed: Cell<u64>,
}

impl GasMeter {
    /// Meter with a hard limit.
    #[must_use]
    pub fn new(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            consumed: Cell::new(0),
        }
    }

    /// Meter that never runs out.
    #[must_use]
    pub fn infinite() -> Self {
        Self {
            limit: None,
            consumed: Cell::new(0),
        }
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn consumed(&self) -> u64 {
        self.consumed.get()
    }

    /// Consume `amount` gas. Consumption is recorded even when it overruns
    /// the limit, so `consumed()` reports the attempted total.
    pub fn consume(&self, amount: u64, descriptor: &str) -> Result<(), StoreError> {
        let consumed = self.consumed.get().saturating_add(amount);
        self.consumed.set(consumed);

        match self.limit {
            Some(limit) if consumed > limit => Err(StoreError::OutOfGas {
                descriptor: descriptor.to_string(),
                limit,
                consumed,
            }),
            _ => Ok(()),
        }
    }

    pub fn is_past_limit(&self) -> bool {
        self.limit.is_some_and(|limit| self.consumed.get() > limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infinite_meter_never_fails() {
        let meter = GasMeter::infinite();
        meter.consume(u64::MAX, "huge").unwrap();
        meter.consume(1, "overflow").unwrap();
        assert_eq!(meter.consumed(), u64::MAX);
    }

    #[test]
    fn test_limited_meter_reports_out_of_gas() {
        let meter = GasMeter::new(1500);
        meter.consume(1000, "read").unwrap();
        let err = meter.consume(1000, "write").unwrap_err();

        assert!(err.is_out_of_gas());
        assert_eq!(meter.consumed(), 2000);
        assert!(meter.is_past_limit());
    }
}
