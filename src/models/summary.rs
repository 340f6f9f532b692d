use serde::{Deserialize, Serialize};

use crate::round2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxAvg {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

impl MinMaxAvg {
    pub fn rounded(min: f64, max: f64, avg: f64) -> Self {
        MinMaxAvg {
            min: round2(min),
            max: round2(max),
            avg: round2(avg),
        }
    }
}

/// Aggregates over every reading of a date range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub temperature: MinMaxAvg,
    pub pressure: MinMaxAvg,
}
