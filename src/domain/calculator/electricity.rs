use serde::Serialize;

use crate::error::{Error, Result};

const SECONDS_PER_HOUR: f64 = 3600.0;
const WATTS_PER_KILOWATT: f64 = 1000.0;

/// Cyclic time-of-day electricity prices, one entry per hour (currency per kWh).
///
/// Hour `h` of the simulation is billed at `prices[h % prices.len()]`. The table
/// is never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TariffTable {
    prices: Vec<f64>,
}

impl TariffTable {
    pub fn new(prices: Vec<f64>) -> Result<Self> {
        if prices.is_empty() {
            return Err(Error::ModelConstructionError("tariff table must contain at least one hourly price".to_string()));
        }
        if let Some(price) = prices.iter().find(|p| !p.is_finite() || **p < 0.0) {
            return Err(Error::ModelConstructionError(format!("tariff table contains an invalid price: {}", price)));
        }
        Ok(Self { prices })
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn cycle_hours(&self) -> usize {
        self.prices.len()
    }

    /// Price of the tariff hour containing `hour` (measured in hours since time zero).
    pub fn price_at_hour(&self, hour: f64) -> f64 {
        let index = (hour.floor() as usize) % self.prices.len();
        self.prices[index]
    }
}

/// Electricity cost of drawing `power_watts` during `[start_time, end_time]` (seconds).
///
/// The interval is walked forward in pieces that never cross a tariff-hour
/// boundary, so every piece is billed at exactly one hourly price.
pub fn electricity_cost(tariff: &TariffTable, start_time: f64, end_time: f64, power_watts: f64) -> Result<f64> {
    if start_time > end_time {
        return Err(Error::InvalidInterval { start: start_time, end: end_time });
    }

    let mut total_cost = 0.0;
    let mut current_hour = start_time / SECONDS_PER_HOUR;
    let end_hour = end_time / SECONDS_PER_HOUR;

    while current_hour < end_hour {
        let next_boundary = current_hour.floor() + 1.0;
        let piece_end = next_boundary.min(end_hour);
        let elapsed_hours = piece_end - current_hour;

        total_cost += power_watts * elapsed_hours / WATTS_PER_KILOWATT * tariff.price_at_hour(current_hour);
        current_hour = piece_end;
    }

    Ok(total_cost)
}
