use log::warn;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{CpuStatus, HealthSnapshot};

pub mod cpu_temp;
pub mod probe;

pub use cpu_temp::CpuTempSource;
pub use probe::{HostProbe, ProbeError, SystemProbe};

const STATUS_OK: &str = "ok";
const UNKNOWN_HOSTNAME: &str = "unknown";
const UNKNOWN_IP: &str = "0.0.0.0";

#[derive(Debug, Error)]
pub enum HealthError {
    #[error("health collection aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

/// Builds a fresh [`HealthSnapshot`] on every call; never touches storage.
#[derive(Clone)]
pub struct HealthReporter {
    probe: Arc<dyn HostProbe>,
}

impl HealthReporter {
    pub fn new(probe: Arc<dyn HostProbe>) -> Self {
        HealthReporter { probe }
    }

    /// A failing probe only blanks its own field. The whole call fails when
    /// the collection itself dies (a probe panicking, the blocking pool going away).
    pub async fn collect(&self) -> Result<HealthSnapshot, HealthError> {
        let probe = Arc::clone(&self.probe);

        // the probes block (cpu sampling window, subprocess, sysfs)
        let snapshot = tokio::task::spawn_blocking(move || assemble(probe.as_ref())).await?;

        Ok(snapshot)
    }
}

pub fn assemble(probe: &dyn HostProbe) -> HealthSnapshot {
    let disk = probe
        .disk_usage()
        .map_err(|e| warn!("disk usage: {}", e))
        .ok();
    let ram = probe
        .memory_stats()
        .map_err(|e| warn!("memory stats: {}", e))
        .ok();
    let ip = match probe.local_ip() {
        Ok(ip) => ip.to_string(),
        Err(e) => {
            warn!("{}", e);
            UNKNOWN_IP.to_owned()
        }
    };

    HealthSnapshot {
        status: STATUS_OK.to_owned(),
        hostname: probe
            .hostname()
            .unwrap_or_else(|| UNKNOWN_HOSTNAME.to_owned()),
        ip,
        uptime_sec: probe.uptime(),
        disk,
        ram,
        cpu: CpuStatus {
            percent: probe.cpu_percent(),
            temp_c: probe.cpu_temperature(),
        },
        platform: probe.platform(),
    }
}
