//! Process and tokio runtime collectors
//!
//! Values are sampled on scrape rather than on a timer.

use std::time::{Instant, SystemTime, UNIX_EPOCH};

use metrics::{describe_gauge, gauge, Gauge};

/// Gauges describing the running process and its tokio runtime.
pub struct RuntimeCollector {
    started_at: Instant,
    uptime: Gauge,
    workers: Gauge,
    alive_tasks: Gauge,
    resident_memory: Gauge,
    threads: Gauge,
}

impl RuntimeCollector {
    /// Register the collector gauges with the active recorder.
    pub fn register() -> Self {
        describe_gauge!(
            "process_start_time_seconds",
            "Start time of the process since unix epoch in seconds."
        );
        describe_gauge!("process_uptime_seconds", "Seconds since the process started.");
        describe_gauge!("tokio_workers_count", "Number of tokio runtime worker threads.");
        describe_gauge!("tokio_alive_tasks", "Number of alive tasks in the tokio runtime.");

        let start = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or_default();
        gauge!("process_start_time_seconds").set(start);

        let (resident_memory, threads) = if cfg!(target_os = "linux") {
            describe_gauge!("process_resident_memory_bytes", "Resident memory size in bytes.");
            describe_gauge!("process_threads", "Number of OS threads in the process.");
            (gauge!("process_resident_memory_bytes"), gauge!("process_threads"))
        } else {
            (Gauge::noop(), Gauge::noop())
        };

        Self {
            started_at: Instant::now(),
            uptime: gauge!("process_uptime_seconds"),
            workers: gauge!("tokio_workers_count"),
            alive_tasks: gauge!("tokio_alive_tasks"),
            resident_memory,
            threads,
        }
    }

    pub fn refresh(&self) {
        self.uptime.set(self.started_at.elapsed().as_secs_f64());

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let runtime = handle.metrics();
            self.workers.set(runtime.num_workers() as f64);
            self.alive_tasks.set(runtime.num_alive_tasks() as f64);
        }

        if let Some(status) = ProcStatus::read() {
            self.resident_memory.set(status.resident_bytes as f64);
            self.threads.set(status.threads as f64);
        }
    }
}

/// Subset of `/proc/self/status`.
#[derive(Debug, Default, PartialEq)]
struct ProcStatus {
    resident_bytes: u64,
    threads: u64,
}

impl ProcStatus {
    fn read() -> Option<Self> {
        if !cfg!(target_os = "linux") {
            return None;
        }
        std::fs::read_to_string("/proc/self/status")
            .ok()
            .map(|s| Self::parse(&s))
    }

    fn parse(status: &str) -> Self {
        let mut parsed = Self::default();
        for line in status.lines() {
            let Some((key, value)) = line.split_once(':') else {
                continue;
            };
            let number = value
                .split_whitespace()
                .next()
                .and_then(|n| n.parse::<u64>().ok());
            match (key, number) {
                // reported in kB
                ("VmRSS", Some(kb)) => parsed.resident_bytes = kb * 1024,
                ("Threads", Some(n)) => parsed.threads = n,
                _ => {}
            }
        }
        parsed
    }
}
