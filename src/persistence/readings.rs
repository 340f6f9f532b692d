use sqlx::SqliteConnection;

use crate::models::{MinMaxAvg, Reading, Summary};

use super::{SensorStore, StorageError};

const MEASUREMENTS_TABLE_NAME: &str = "measurements";

// COUNT, then MIN/MAX/AVG for temperature and for pressure
type AggregateRow = (
    i64,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
    Option<f64>,
);

impl SensorStore {
    pub async fn append(&self, reading: &Reading) -> Result<(), StorageError> {
        let mut conn = self.get_sql_connection().await?;

        let statement = format!(
            "INSERT INTO {} (timestamp, temperature, pressure) VALUES (?, ?, ?)",
            MEASUREMENTS_TABLE_NAME
        );
        sqlx::query(&statement)
            .bind(&reading.timestamp)
            .bind(reading.temperature)
            .bind(reading.pressure)
            .execute(&mut conn)
            .await?;

        Ok(())
    }

    /// Row with the greatest timestamp; among equal timestamps the last inserted wins.
    pub async fn fetch_latest(&self) -> Result<Option<Reading>, StorageError> {
        let mut conn = self.get_sql_connection().await?;

        let statement = format!(
            "SELECT timestamp, temperature, pressure FROM {}
            ORDER BY timestamp DESC, rowid DESC
            LIMIT 1",
            MEASUREMENTS_TABLE_NAME
        );
        let reading = sqlx::query_as::<_, Reading>(&statement)
            .fetch_optional(&mut conn)
            .await?;

        Ok(reading)
    }

    pub async fn fetch_history(&self, limit: u32) -> Result<Vec<Reading>, StorageError> {
        let mut conn = self.get_sql_connection().await?;

        let statement = format!(
            "SELECT timestamp, temperature, pressure FROM {}
            ORDER BY timestamp DESC, rowid DESC
            LIMIT ?",
            MEASUREMENTS_TABLE_NAME
        );
        let readings = sqlx::query_as::<_, Reading>(&statement)
            .bind(i64::from(limit))
            .fetch_all(&mut conn)
            .await?;

        Ok(readings)
    }

    /// `start` and `end` are `YYYY-MM-DD` strings; only the date part of a
    /// timestamp is compared, so both days are included whole.
    pub async fn fetch_between_dates(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Vec<Reading>, StorageError> {
        let mut conn = self.get_sql_connection().await?;

        let statement = format!(
            "SELECT timestamp, temperature, pressure FROM {}
            WHERE date(timestamp) BETWEEN ? AND ?
            ORDER BY timestamp ASC, rowid ASC",
            MEASUREMENTS_TABLE_NAME
        );
        let readings = sqlx::query_as::<_, Reading>(&statement)
            .bind(start)
            .bind(end)
            .fetch_all(&mut conn)
            .await?;

        Ok(readings)
    }

    /// `None` when no row falls between the two dates.
    pub async fn fetch_summary_between_dates(
        &self,
        start: &str,
        end: &str,
    ) -> Result<Option<Summary>, StorageError> {
        let mut conn = self.get_sql_connection().await?;

        let statement = format!(
            "SELECT
                COUNT(*),
                MIN(temperature), MAX(temperature), AVG(temperature),
                MIN(pressure), MAX(pressure), AVG(pressure)
            FROM {}
            WHERE date(timestamp) BETWEEN ? AND ?",
            MEASUREMENTS_TABLE_NAME
        );
        let row = sqlx::query_as::<_, AggregateRow>(&statement)
            .bind(start)
            .bind(end)
            .fetch_one(&mut conn)
            .await?;

        let summary = match row {
            (count, Some(t_min), Some(t_max), Some(t_avg), Some(p_min), Some(p_max), Some(p_avg))
                if count > 0 =>
            {
                Some(Summary {
                    temperature: MinMaxAvg::rounded(t_min, t_max, t_avg),
                    pressure: MinMaxAvg::rounded(p_min, p_max, p_avg),
                })
            }
            _ => None,
        };

        Ok(summary)
    }
}

pub(super) async fn create_measurements_table(
    conn: &mut SqliteConnection,
) -> Result<(), sqlx::Error> {
    // no primary key: rows are identified by insertion order (rowid) only
    let statement = format!(
        "CREATE TABLE IF NOT EXISTS {} (
        timestamp TEXT,
        temperature REAL,
        pressure REAL
    )",
        MEASUREMENTS_TABLE_NAME
    );

    sqlx::query(&statement).execute(conn).await?;

    Ok(())
}
