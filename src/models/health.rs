use serde::{Deserialize, Serialize};

/// Usage of the root filesystem, in gigabytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiskUsage {
    pub used_gb: f64,
    pub free_gb: f64,
    pub total_gb: f64,
}

/// Memory usage, in megabytes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RamUsage {
    pub used_mb: f64,
    pub available_mb: f64,
    pub total_mb: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpuStatus {
    pub percent: f64,
    // null when the platform has no readable sensor
    pub temp_c: Option<f64>,
}

/// Host report assembled per `/health` request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub status: String,
    pub hostname: String,
    pub ip: String,
    pub uptime_sec: u64,
    pub disk: Option<DiskUsage>,
    pub ram: Option<RamUsage>,
    pub cpu: CpuStatus,
    pub platform: String,
}
