use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use thiserror::Error;

const DEF_API_PORT: u16 = 8000;
const DEF_WEB_PORT: u16 = 8001;
const DEF_API_TITLE: &str = "Environmental Sensor API";
const DEF_DATABASE_PATH: &str = "sensor_data.db";
const DEF_WEB_USERNAME: &str = "admin";
const DEF_WEB_PASSWORD: &str = "password";
pub const DEF_THERMAL_ZONE_PATH: &str = "/sys/class/thermal/thermal_zone0/temp";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Settings shared by the api server, the sampler and the dashboard.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_token: String,
    pub api_port: u16,
    pub api_title: String,
    pub bind_addr: IpAddr,
    pub database_path: PathBuf,
    pub web_port: u16,
    pub web_username: String,
    pub web_password: String,
    pub api_url: String,
    pub cam_url: String,
    pub sensor_iio_device: Option<PathBuf>,
    pub thermal_zone_path: PathBuf,
}

impl Settings {
    /// Reads the process environment, after loading `.env` if there is one.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        Self::from_lookup(|key| dotenv::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // empty values count as unset, the same way an empty line in .env would
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_token = get("API_TOKEN").ok_or(ConfigError::Missing("API_TOKEN"))?;

        let bind_addr = match get("BIND_ADDR") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "BIND_ADDR",
                value,
            })?,
            None => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        };

        Ok(Settings {
            api_token,
            api_port: parse_port(get("API_PORT"), "API_PORT", DEF_API_PORT)?,
            api_title: get("API_TITLE").unwrap_or_else(|| DEF_API_TITLE.to_owned()),
            bind_addr,
            database_path: get("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEF_DATABASE_PATH)),
            web_port: parse_port(get("WEB_PORT"), "WEB_PORT", DEF_WEB_PORT)?,
            web_username: get("WEB_USERNAME").unwrap_or_else(|| DEF_WEB_USERNAME.to_owned()),
            web_password: get("WEB_PASSWORD").unwrap_or_else(|| DEF_WEB_PASSWORD.to_owned()),
            api_url: get("API_URL").unwrap_or_default(),
            cam_url: get("CAM_URL").unwrap_or_default(),
            sensor_iio_device: get("SENSOR_IIO_DEVICE").map(PathBuf::from),
            thermal_zone_path: get("THERMAL_ZONE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEF_THERMAL_ZONE_PATH)),
        })
    }
}

fn parse_port(value: Option<String>, key: &'static str, default: u16) -> Result<u16, ConfigError> {
    match value {
        Some(v) => v
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::Invalid { key, value: v }),
        None => Ok(default),
    }
}
