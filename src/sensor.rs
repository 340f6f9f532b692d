use thiserror::Error;

pub mod iio;
pub mod sampler;

pub use iio::IioBarometer;
pub use sampler::{SampleError, Sampler};

#[derive(Debug, Error)]
pub enum SensorError {
    #[error("no barometer found under {0}")]
    NotFound(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unexpected value {value:?} in {path}")]
    Parse { path: String, value: String },
    #[error("sensor returned a non-finite {0}")]
    NonFinite(&'static str),
}

/// One raw measurement, before rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorValues {
    // °C
    pub temperature: f64,
    // hPa
    pub pressure: f64,
}

impl SensorValues {
    /// Rejects NaN and infinities so a broken read never turns into a row.
    pub fn checked(self) -> Result<Self, SensorError> {
        if !self.temperature.is_finite() {
            return Err(SensorError::NonFinite("temperature"));
        }
        if !self.pressure.is_finite() {
            return Err(SensorError::NonFinite("pressure"));
        }

        Ok(self)
    }
}

/// A temperature/pressure source.
pub trait Sensor {
    fn read(&mut self) -> Result<SensorValues, SensorError>;
}
