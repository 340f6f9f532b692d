use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use sysinfo::{Disks, System, MINIMUM_CPU_UPDATE_INTERVAL};
use thiserror::Error;

use crate::models::{DiskUsage, RamUsage};
use crate::{round1, round2};

use super::cpu_temp::CpuTempSource;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

const CPU_SAMPLE_WINDOW: Duration = Duration::from_millis(500);

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("no disk mounted at {0}")]
    NoDisk(String),
    #[error("memory stats unavailable")]
    Memory,
    #[error("local ip unavailable: {0}")]
    LocalIp(String),
    #[error("cpu temperature unavailable: {0}")]
    CpuTemp(String),
}

/// Sizes in GiB from the byte counts sysinfo reports.
///
/// sysinfo only exposes the space available to unprivileged users, so blocks
/// reserved for root are counted as used: `used + free == total` always holds,
/// while `df`'s `Used` column can be a few percent lower on ext4.
pub(crate) fn disk_usage_from(total_bytes: u64, available_bytes: u64) -> DiskUsage {
    let total = total_bytes as f64;
    let free = available_bytes.min(total_bytes) as f64;

    DiskUsage {
        used_gb: round2((total - free) / GIB),
        free_gb: round2(free / GIB),
        total_gb: round2(total / GIB),
    }
}

/// The host metrics behind `/health`. Every call is independent.
pub trait HostProbe: Send + Sync {
    fn disk_usage(&self) -> Result<DiskUsage, ProbeError>;
    fn memory_stats(&self) -> Result<RamUsage, ProbeError>;
    fn cpu_percent(&self) -> f64;
    fn cpu_temperature(&self) -> Option<f64>;
    fn uptime(&self) -> u64;
    fn hostname(&self) -> Option<String>;
    fn local_ip(&self) -> Result<IpAddr, ProbeError>;
    fn platform(&self) -> String;
}

/// Probe backed by `sysinfo`. Blocks for the cpu sampling window.
#[derive(Debug, Clone)]
pub struct SystemProbe {
    root_mount: PathBuf,
    cpu_temp: CpuTempSource,
}

impl SystemProbe {
    pub fn new(cpu_temp: CpuTempSource) -> Self {
        SystemProbe {
            root_mount: PathBuf::from("/"),
            cpu_temp,
        }
    }
}

impl HostProbe for SystemProbe {
    fn disk_usage(&self) -> Result<DiskUsage, ProbeError> {
        let disks = Disks::new_with_refreshed_list();

        let disk = disks
            .list()
            .iter()
            .find(|d| d.mount_point() == self.root_mount.as_path())
            .ok_or_else(|| ProbeError::NoDisk(self.root_mount.display().to_string()))?;

        Ok(disk_usage_from(disk.total_space(), disk.available_space()))
    }

    fn memory_stats(&self) -> Result<RamUsage, ProbeError> {
        let mut system = System::new();
        system.refresh_memory();

        if system.total_memory() == 0 {
            return Err(ProbeError::Memory);
        }

        Ok(RamUsage {
            used_mb: round1(system.used_memory() as f64 / MIB),
            available_mb: round1(system.available_memory() as f64 / MIB),
            total_mb: round1(system.total_memory() as f64 / MIB),
        })
    }

    fn cpu_percent(&self) -> f64 {
        // usage is a delta between two refreshes
        let mut system = System::new();
        system.refresh_cpu_usage();
        std::thread::sleep(CPU_SAMPLE_WINDOW.max(MINIMUM_CPU_UPDATE_INTERVAL));
        system.refresh_cpu_usage();

        round1(system.global_cpu_info().cpu_usage() as f64)
    }

    fn cpu_temperature(&self) -> Option<f64> {
        self.cpu_temp.read()
    }

    fn uptime(&self) -> u64 {
        System::uptime()
    }

    fn hostname(&self) -> Option<String> {
        System::host_name()
    }

    fn local_ip(&self) -> Result<IpAddr, ProbeError> {
        local_ip_address::local_ip().map_err(|e| ProbeError::LocalIp(e.to_string()))
    }

    fn platform(&self) -> String {
        format!(
            "{}-{}-{}",
            System::name().unwrap_or_else(|| "Unknown".to_string()),
            System::kernel_version().unwrap_or_else(|| "unknown".to_string()),
            std::env::consts::ARCH
        )
    }
}
