use chrono::{Local, NaiveDateTime};
use log::{error, info};
use thiserror::Error;

use crate::models::reading::TIMESTAMP_FORMAT;
use crate::models::Reading;
use crate::persistence::{SensorStore, StorageError};
use crate::round2;

use super::{Sensor, SensorError};

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("sensor read failed: {0}")]
    Sensor(#[from] SensorError),
    #[error("failed to store reading: {0}")]
    Storage(#[from] StorageError),
}

/// Turns one sensor read into one stored row. Keeps no state between runs;
/// whatever calls it decides the cadence.
pub struct Sampler<S: Sensor> {
    sensor: S,
    store: SensorStore,
}

impl<S: Sensor> Sampler<S> {
    pub fn new(sensor: S, store: SensorStore) -> Self {
        Sampler { sensor, store }
    }

    pub async fn sample_once(&mut self) -> Result<Reading, SampleError> {
        self.sample_at(Local::now().naive_local()).await
    }

    /// Reads the sensor and appends exactly one row stamped with `now`.
    /// Nothing is written when the read fails.
    pub async fn sample_at(&mut self, now: NaiveDateTime) -> Result<Reading, SampleError> {
        let values = match self.sensor.read().and_then(|v| v.checked()) {
            Ok(values) => values,
            Err(err) => {
                error!("sensor read failed, no reading stored: {}", err);
                return Err(err.into());
            }
        };

        let reading = Reading {
            timestamp: now.format(TIMESTAMP_FORMAT).to_string(),
            temperature: round2(values.temperature),
            pressure: round2(values.pressure),
        };

        self.store.append(&reading).await?;

        info!(
            "stored reading {}: {} °C, {} hPa",
            reading.timestamp, reading.temperature, reading.pressure
        );

        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::persistence::test_utils::store_with;
    use crate::sensor::SensorValues;

    struct FakeSensor {
        values: Option<SensorValues>,
        reads: usize,
    }

    impl Sensor for FakeSensor {
        fn read(&mut self) -> Result<SensorValues, SensorError> {
            self.reads += 1;
            self.values.ok_or(SensorError::NotFound("fake".to_string()))
        }
    }

    fn fake(values: Option<SensorValues>) -> FakeSensor {
        FakeSensor { values, reads: 0 }
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 4, 9)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[tokio::test]
    async fn sample_round_trip_test() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(&dir, &[]).await;
        let mut sampler = Sampler::new(
            fake(Some(SensorValues {
                temperature: 18.38612,
                pressure: 963.79472,
            })),
            store.clone(),
        );

        let written = sampler.sample_at(at(0, 5, 31)).await.unwrap();

        assert_eq!(written.timestamp, "2025-04-09 00:05:31");
        assert_eq!(written.temperature, 18.39);
        assert_eq!(written.pressure, 963.79);
        assert_eq!(store.fetch_latest().await.unwrap(), Some(written));
        assert_eq!(sampler.sensor.reads, 1);
    }

    #[tokio::test]
    async fn one_row_per_invocation_test() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(&dir, &[]).await;
        let mut sampler = Sampler::new(
            fake(Some(SensorValues {
                temperature: 20.0,
                pressure: 962.0,
            })),
            store.clone(),
        );

        sampler.sample_at(at(0, 0, 0)).await.unwrap();
        sampler.sample_at(at(0, 10, 0)).await.unwrap();
        sampler.sample_once().await.unwrap();

        assert_eq!(store.fetch_history(10).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn failed_read_writes_nothing_test() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(&dir, &[]).await;
        let mut sampler = Sampler::new(fake(None), store.clone());

        let res = sampler.sample_at(at(1, 0, 0)).await;

        assert!(matches!(res, Err(SampleError::Sensor(_))));
        assert_eq!(store.fetch_latest().await.unwrap(), None);
    }

    #[tokio::test]
    async fn non_finite_read_writes_nothing_test() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_with(&dir, &[]).await;
        let mut sampler = Sampler::new(
            fake(Some(SensorValues {
                temperature: f64::NAN,
                pressure: 962.0,
            })),
            store.clone(),
        );

        let res = sampler.sample_at(at(1, 0, 0)).await;

        assert!(matches!(
            res,
            Err(SampleError::Sensor(SensorError::NonFinite("temperature")))
        ));
        assert!(store.fetch_history(10).await.unwrap().is_empty());
    }
}
