use chrono::NaiveDate;
use thiserror::Error;

use crate::models::reading::DATE_FORMAT;
use crate::models::{Reading, Summary};
use crate::persistence::{SensorStore, StorageError};

pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

#[derive(Debug, Error)]
#[error("Dates must be in format YYYY-MM-DD, got {0:?}")]
pub struct DateParseError(pub String);

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    InvalidDate(#[from] DateParseError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn parse(start: &str, end: &str) -> Result<Self, DateParseError> {
        Ok(DateRange {
            start: parse_date(start)?,
            end: parse_date(end)?,
        })
    }

    fn bounds(&self) -> (String, String) {
        (
            self.start.format(DATE_FORMAT).to_string(),
            self.end.format(DATE_FORMAT).to_string(),
        )
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, DateParseError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| DateParseError(value.to_owned()))
}

/// Read-only access to the stored readings.
#[derive(Debug, Clone)]
pub struct QueryService {
    store: SensorStore,
}

impl QueryService {
    pub fn new(store: SensorStore) -> Self {
        QueryService { store }
    }

    pub async fn get_latest(&self) -> Result<Option<Reading>, QueryError> {
        Ok(self.store.fetch_latest().await?)
    }

    /// Newest first. The limit is not capped here.
    pub async fn get_history(&self, limit: u32) -> Result<Vec<Reading>, QueryError> {
        Ok(self.store.fetch_history(limit).await?)
    }

    /// Oldest first; both days are included whole.
    pub async fn get_range(&self, start: &str, end: &str) -> Result<Vec<Reading>, QueryError> {
        let range = DateRange::parse(start, end)?;
        let (start, end) = range.bounds();

        Ok(self.store.fetch_between_dates(&start, &end).await?)
    }

    /// `None` when the range holds no readings.
    pub async fn get_summary(&self, start: &str, end: &str) -> Result<Option<Summary>, QueryError> {
        let range = DateRange::parse(start, end)?;
        let (start, end) = range.bounds();

        Ok(self.store.fetch_summary_between_dates(&start, &end).await?)
    }
}
