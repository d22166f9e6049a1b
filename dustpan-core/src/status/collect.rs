use std::time::Instant;

use sysinfo::{Disks, Networks, ProcessesToUpdate, System};
use tracing::debug;

use super::{
    BatteryStatus, CpuStatus, DiskStatus, MemoryStatus, NetworkStatus, ProcessInfo,
    StatusSnapshot, TOP_PROCESSES, rank_processes, short_process_name,
};
use crate::size::size_percentage;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Keeps sysinfo state between refreshes so CPU and network figures are
/// deltas over the refresh interval.
pub struct StatusCollector {
    system: System,
    networks: Networks,
    last_refresh: Instant,
}

impl Default for StatusCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusCollector {
    pub fn new() -> Self {
        let mut system = System::new();
        system.refresh_cpu_all();
        Self {
            system,
            networks: Networks::new_with_refreshed_list(),
            last_refresh: Instant::now(),
        }
    }

    /// Take a snapshot right away, waiting long enough for CPU usage to mean
    /// something. For one-off output.
    pub fn snapshot_once() -> StatusSnapshot {
        let mut collector = Self::new();
        std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
        collector.refresh()
    }

    pub fn refresh(&mut self) -> StatusSnapshot {
        self.system.refresh_cpu_all();
        self.system.refresh_memory();
        self.system.refresh_processes(ProcessesToUpdate::All, true);
        self.networks.refresh();

        let elapsed = self.last_refresh.elapsed().as_secs_f64().max(0.001);
        self.last_refresh = Instant::now();

        let snapshot = StatusSnapshot {
            cpu: self.cpu(),
            memory: self.memory(),
            disks: disks(),
            network: self.network(elapsed),
            battery: battery(),
            processes: self.top_processes(TOP_PROCESSES),
        };
        debug!(
            disks = snapshot.disks.len(),
            processes = snapshot.processes.len(),
            "status refreshed"
        );
        snapshot
    }

    fn cpu(&self) -> CpuStatus {
        let cpus = self.system.cpus();
        let usage = if cpus.is_empty() {
            0.0
        } else {
            cpus.iter().map(|c| c.cpu_usage() as f64).sum::<f64>() / cpus.len() as f64
        };
        let load = System::load_average();
        CpuStatus {
            usage_percent: usage,
            cores: cpus.len(),
            load_one: load.one,
            load_five: load.five,
            load_fifteen: load.fifteen,
        }
    }

    fn memory(&self) -> MemoryStatus {
        let total = self.system.total_memory();
        let used = self.system.used_memory();
        MemoryStatus {
            used,
            total,
            used_percent: size_percentage(used, total),
        }
    }

    fn network(&self, elapsed_secs: f64) -> NetworkStatus {
        let (rx, tx) = self
            .networks
            .list()
            .values()
            .fold((0u64, 0u64), |(rx, tx), data| {
                (rx + data.received(), tx + data.transmitted())
            });
        NetworkStatus {
            rx_mb_per_sec: rx as f64 / BYTES_PER_MB / elapsed_secs,
            tx_mb_per_sec: tx as f64 / BYTES_PER_MB / elapsed_secs,
        }
    }

    /// Busiest processes by CPU as of the last refresh, names without path
    pub fn top_processes(&self, limit: usize) -> Vec<ProcessInfo> {
        let total_memory = self.system.total_memory();
        let processes = self
            .system
            .processes()
            .values()
            .map(|p| ProcessInfo {
                name: short_process_name(&p.name().to_string_lossy()).to_string(),
                cpu_percent: p.cpu_usage() as f64,
                memory_percent: size_percentage(p.memory(), total_memory),
            })
            .collect();
        rank_processes(processes, limit)
    }
}

fn disks() -> Vec<DiskStatus> {
    Disks::new_with_refreshed_list()
        .list()
        .iter()
        .filter(|d| d.total_space() > 0)
        .map(|d| {
            let total = d.total_space();
            let used = total.saturating_sub(d.available_space());
            DiskStatus {
                mount: d.mount_point().to_path_buf(),
                used,
                total,
                used_percent: size_percentage(used, total),
                external: d.is_removable(),
            }
        })
        .collect()
}

#[cfg(feature = "battery")]
fn battery() -> Option<BatteryStatus> {
    use battery::units::ratio::percent;

    let manager = battery::Manager::new().ok()?;
    let battery = manager.batteries().ok()?.next()?.ok()?;
    Some(BatteryStatus {
        percent: battery.state_of_charge().get::<percent>() as f64,
        state: format!("{:?}", battery.state()),
    })
}

#[cfg(not(feature = "battery"))]
fn battery() -> Option<BatteryStatus> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_produces_sane_snapshot() {
        let mut collector = StatusCollector::new();
        let snapshot = collector.refresh();

        assert!(snapshot.processes.len() <= TOP_PROCESSES);
        assert!(snapshot.memory.used <= snapshot.memory.total);
        assert!(snapshot.network.rx_mb_per_sec >= 0.0);
        for disk in &snapshot.disks {
            assert!(disk.used <= disk.total);
        }
    }
}
