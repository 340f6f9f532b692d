use log::error;
use std::path::Path;
use std::process::ExitCode;

use envmon_server::config::Settings;
use envmon_server::logger::init_logger;
use envmon_server::persistence::SensorStore;
use envmon_server::sensor::iio::IIO_DEVICES_PATH;
use envmon_server::sensor::{IioBarometer, Sampler};

/// Takes one reading and exits. Schedule it with cron or a systemd timer.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logger();

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let sensor = match &settings.sensor_iio_device {
        Some(dir) => IioBarometer::new(dir.clone()),
        None => match IioBarometer::discover(Path::new(IIO_DEVICES_PATH)) {
            Ok(sensor) => sensor,
            Err(e) => {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
        },
    };

    let store = SensorStore::new(settings.database_path.clone());
    if let Err(e) = store.ensure_schema().await {
        error!("failed to prepare {}: {}", store.db_path().display(), e);
        return ExitCode::FAILURE;
    }

    let mut sampler = Sampler::new(sensor, store);

    match sampler.sample_once().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
