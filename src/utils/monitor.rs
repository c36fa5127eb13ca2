use std::time::{Duration, Instant};
#[cfg(feature = "cli")]
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

#[derive(Debug, Clone)]
pub struct ProcessStats {
    pub memory_usage_mb: u64,
    pub peak_memory_mb: u64,
    pub cpu_time: Duration,
    pub elapsed_time: Duration,
}

/// Tracks wall-clock time per run phase and, when enabled, the process'
/// memory and accumulated CPU time.
#[cfg(feature = "cli")]
pub struct SystemMonitor {
    system: std::sync::Mutex<System>,
    pid: Option<Pid>,
    start_time: Instant,
    phase_start: std::sync::Mutex<Instant>,
    peak_memory: std::sync::atomic::AtomicU64,
    enabled: bool,
}

#[cfg(feature = "cli")]
impl SystemMonitor {
    pub fn new(enabled: bool) -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                tracing::warn!("System monitoring unavailable: {}", e);
                None
            }
        };
        let now = Instant::now();

        Self {
            system: std::sync::Mutex::new(System::new()),
            pid,
            start_time: now,
            phase_start: std::sync::Mutex::new(now),
            peak_memory: std::sync::atomic::AtomicU64::new(0),
            enabled: enabled && pid.is_some(),
        }
    }

    pub fn get_stats(&self) -> Option<ProcessStats> {
        if !self.enabled {
            return None;
        }
        let pid = self.pid?;

        let mut system = self.system.lock().ok()?;
        system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::everything(),
        );
        let process = system.process(pid)?;

        let memory_mb = process.memory() / 1024 / 1024;
        let peak = self
            .peak_memory
            .fetch_max(memory_mb, std::sync::atomic::Ordering::Relaxed)
            .max(memory_mb);

        Some(ProcessStats {
            memory_usage_mb: memory_mb,
            peak_memory_mb: peak,
            cpu_time: Duration::from_millis(process.accumulated_cpu_time()),
            elapsed_time: self.start_time.elapsed(),
        })
    }

    /// Logs the time since the previous phase ended and restarts the phase clock.
    pub fn log_phase(&self, phase: &str) {
        let phase_elapsed = self
            .phase_start
            .lock()
            .map(|mut start| {
                let elapsed = start.elapsed();
                *start = Instant::now();
                elapsed
            })
            .unwrap_or_default();

        match self.get_stats() {
            Some(stats) => tracing::info!(
                "📊 {} - took {:.3}s, Memory: {}MB, Peak: {}MB, CPU: {:.3}s",
                phase,
                phase_elapsed.as_secs_f64(),
                stats.memory_usage_mb,
                stats.peak_memory_mb,
                stats.cpu_time.as_secs_f64()
            ),
            None => tracing::debug!("{} took {:.3}s", phase, phase_elapsed.as_secs_f64()),
        }
    }

    pub fn log_final_stats(&self) {
        match self.get_stats() {
            Some(stats) => tracing::info!(
                "Completed in {:.3} CPU seconds and {:.3} clock seconds (peak memory {}MB)",
                stats.cpu_time.as_secs_f64(),
                stats.elapsed_time.as_secs_f64(),
                stats.peak_memory_mb
            ),
            None => tracing::info!(
                "Completed in {:.3} clock seconds",
                self.start_time.elapsed().as_secs_f64()
            ),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

#[cfg(feature = "cli")]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}

// 沒有 sysinfo 時只記錄經過時間
#[cfg(not(feature = "cli"))]
pub struct SystemMonitor {
    start_time: Instant,
}

#[cfg(not(feature = "cli"))]
impl SystemMonitor {
    pub fn new(_enabled: bool) -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    pub fn get_stats(&self) -> Option<ProcessStats> {
        None
    }

    pub fn log_phase(&self, phase: &str) {
        tracing::debug!("{} finished at {:?}", phase, self.start_time.elapsed());
    }

    pub fn log_final_stats(&self) {
        tracing::info!(
            "Completed in {:.3} clock seconds",
            self.start_time.elapsed().as_secs_f64()
        );
    }

    pub fn is_enabled(&self) -> bool {
        false
    }
}

#[cfg(not(feature = "cli"))]
impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new(false)
    }
}
