//! System status for the dashboard: CPU, memory, disks, network, battery
//! and the busiest processes.

mod collect;

pub use collect::StatusCollector;

use std::path::PathBuf;

use serde::Serialize;

use crate::error::Result;

/// Number of processes shown on the dashboard
pub const TOP_PROCESSES: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub cpu: CpuStatus,
    pub memory: MemoryStatus,
    pub disks: Vec<DiskStatus>,
    pub network: NetworkStatus,
    pub battery: Option<BatteryStatus>,
    pub processes: Vec<ProcessInfo>,
}

impl StatusSnapshot {
    /// Pretty-printed JSON, the `status --json` output
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CpuStatus {
    pub usage_percent: f64,
    pub cores: usize,
    pub load_one: f64,
    pub load_five: f64,
    pub load_fifteen: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemoryStatus {
    pub used: u64,
    pub total: u64,
    pub used_percent: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiskStatus {
    pub mount: PathBuf,
    pub used: u64,
    pub total: u64,
    pub used_percent: f64,
    /// Removable or otherwise external volume
    pub external: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct NetworkStatus {
    pub rx_mb_per_sec: f64,
    pub tx_mb_per_sec: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatteryStatus {
    pub percent: f64,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessInfo {
    pub name: String,
    pub cpu_percent: f64,
    pub memory_percent: f64,
}

/// Severity bucket used for colouring a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Ok,
    Warn,
    Danger,
}

/// Usage-style metrics: higher is worse
pub fn usage_level(percent: f64) -> Level {
    if percent >= 85.0 {
        Level::Danger
    } else if percent >= 60.0 {
        Level::Warn
    } else {
        Level::Ok
    }
}

/// Charge level: lower is worse
pub fn battery_level(percent: f64) -> Level {
    if percent < 20.0 {
        Level::Danger
    } else if percent < 50.0 {
        Level::Warn
    } else {
        Level::Ok
    }
}

/// Partition into (internal, external), keeping order
pub fn split_disks(disks: &[DiskStatus]) -> (Vec<&DiskStatus>, Vec<&DiskStatus>) {
    disks.iter().partition(|d| !d.external)
}

/// `INTR` for a lone disk, `INTR1`, `INTR2`, ... when there are several
pub fn disk_label(prefix: &str, index: usize, total: usize) -> String {
    if total <= 1 {
        prefix.to_string()
    } else {
        format!("{}{}", prefix, index + 1)
    }
}

/// Strip any directory part from a process name
pub fn short_process_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Busiest first, at most `limit`
pub fn rank_processes(mut processes: Vec<ProcessInfo>, limit: usize) -> Vec<ProcessInfo> {
    processes.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent));
    processes.truncate(limit);
    processes
}
