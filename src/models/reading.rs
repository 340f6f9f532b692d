use serde::{Deserialize, Serialize};

/// Storage format of `Reading::timestamp`; sorts lexicographically in time order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date-only format accepted by the range queries.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One persisted sample. Rows are never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Reading {
    pub timestamp: String,
    // °C
    pub temperature: f64,
    // hPa
    pub pressure: f64,
}
