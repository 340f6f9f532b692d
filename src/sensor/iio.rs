use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use super::{Sensor, SensorError, SensorValues};

pub const IIO_DEVICES_PATH: &str = "/sys/bus/iio/devices";

// names the kernel drivers register for Bosch barometers
const KNOWN_BAROMETERS: &[&str] = &["bmp280", "bme280", "bmp180", "bmp085", "bmp380", "bmp580"];

const TEMP_FILE: &str = "in_temp_input";
const PRESSURE_FILE: &str = "in_pressure_input";

/// Barometer exposed by the kernel's Industrial I/O subsystem.
///
/// The driver reports temperature in milli-degrees Celsius and pressure in
/// kilopascal; readings are converted to °C and hPa.
#[derive(Debug, Clone)]
pub struct IioBarometer {
    device_dir: PathBuf,
}

impl IioBarometer {
    pub fn new(device_dir: impl Into<PathBuf>) -> Self {
        IioBarometer {
            device_dir: device_dir.into(),
        }
    }

    /// Looks for the first device under `devices_root` whose `name` is a known barometer.
    pub fn discover(devices_root: &Path) -> Result<Self, SensorError> {
        let not_found = || SensorError::NotFound(devices_root.display().to_string());

        let mut candidates: Vec<PathBuf> = fs::read_dir(devices_root)
            .map_err(|_| not_found())?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .collect();
        // iio:device0 before iio:device1
        candidates.sort();

        for dir in candidates {
            let name = match fs::read_to_string(dir.join("name")) {
                Ok(name) => name,
                Err(_) => continue,
            };
            let name = name.trim();

            if KNOWN_BAROMETERS.contains(&name) {
                debug!("using {} at {}", name, dir.display());
                return Ok(IioBarometer::new(dir));
            }
        }

        Err(not_found())
    }

    pub fn device_dir(&self) -> &Path {
        &self.device_dir
    }

    fn read_value(&self, file: &str) -> Result<f64, SensorError> {
        let path = self.device_dir.join(file);
        let raw = fs::read_to_string(&path).map_err(|source| SensorError::Io {
            path: path.display().to_string(),
            source,
        })?;

        raw.trim().parse::<f64>().map_err(|_| SensorError::Parse {
            path: path.display().to_string(),
            value: raw.trim().to_owned(),
        })
    }
}

impl Sensor for IioBarometer {
    fn read(&mut self) -> Result<SensorValues, SensorError> {
        let milli_celsius = self.read_value(TEMP_FILE)?;
        let kilopascal = self.read_value(PRESSURE_FILE)?;

        SensorValues {
            temperature: milli_celsius / 1000.0,
            pressure: kilopascal * 10.0,
        }
        .checked()
    }
}
