pub mod health;
pub mod reading;
pub mod summary;

pub use health::{CpuStatus, DiskUsage, HealthSnapshot, RamUsage};
pub use reading::Reading;
pub use summary::{MinMaxAvg, Summary};
