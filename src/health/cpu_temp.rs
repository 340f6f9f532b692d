use log::debug;
use std::path::PathBuf;
use std::process::Command;

use crate::round1;

use super::probe::ProbeError;

const VCGENCMD: &str = "vcgencmd";
const VCGENCMD_ARGS: &[&str] = &["measure_temp"];

/// Where the CPU temperature comes from, in order: the firmware command
/// (`vcgencmd measure_temp` on a Raspberry Pi), then the kernel thermal zone
/// file, then nothing.
#[derive(Debug, Clone)]
pub struct CpuTempSource {
    program: String,
    args: Vec<String>,
    thermal_zone_path: PathBuf,
}

impl CpuTempSource {
    pub fn new(thermal_zone_path: impl Into<PathBuf>) -> Self {
        CpuTempSource {
            program: VCGENCMD.to_owned(),
            args: VCGENCMD_ARGS.iter().map(|a| a.to_string()).collect(),
            thermal_zone_path: thermal_zone_path.into(),
        }
    }

    pub fn with_command(mut self, program: &str, args: &[&str]) -> Self {
        self.program = program.to_owned();
        self.args = args.iter().map(|a| a.to_string()).collect();
        self
    }

    /// °C, or `None` when neither source answers.
    pub fn read(&self) -> Option<f64> {
        match self.from_command() {
            Ok(temp) => return Some(temp),
            Err(err) => debug!("{} unavailable: {}", self.program, err),
        }

        match self.from_thermal_zone() {
            Ok(temp) => Some(temp),
            Err(err) => {
                debug!("no cpu temperature: {}", err);
                None
            }
        }
    }

    fn from_command(&self) -> Result<f64, ProbeError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .map_err(|e| ProbeError::CpuTemp(e.to_string()))?;

        if !output.status.success() {
            return Err(ProbeError::CpuTemp(format!(
                "{} exited with {}",
                self.program, output.status
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_measure_temp(&stdout)
            .ok_or_else(|| ProbeError::CpuTemp(format!("unexpected output {:?}", stdout.trim())))
    }

    fn from_thermal_zone(&self) -> Result<f64, ProbeError> {
        let raw = std::fs::read_to_string(&self.thermal_zone_path).map_err(|e| {
            ProbeError::CpuTemp(format!("{}: {}", self.thermal_zone_path.display(), e))
        })?;

        // milli-degrees
        let milli: i64 = raw
            .trim()
            .parse()
            .map_err(|_| ProbeError::CpuTemp(format!("unexpected value {:?}", raw.trim())))?;

        Ok(round1(milli as f64 / 1000.0))
    }
}

// `temp=47.2'C`
fn parse_measure_temp(output: &str) -> Option<f64> {
    output
        .trim()
        .strip_prefix("temp=")?
        .trim_end_matches("'C")
        .parse()
        .ok()
}
