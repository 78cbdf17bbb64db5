//! Tokio worker thread sizing.
//!
//! Containers often expose the host's CPU count while capping CPU time via
//! cgroups, so the cgroup quota wins over `available_parallelism`.

use std::fs;

const CGROUP_V2_CPU_MAX: &str = "/sys/fs/cgroup/cpu.max";
const CGROUP_V1_QUOTA: &str = "/sys/fs/cgroup/cpu/cpu.cfs_quota_us";
const CGROUP_V1_PERIOD: &str = "/sys/fs/cgroup/cpu/cpu.cfs_period_us";

/// Number of worker threads for the multi-threaded runtime.
///
/// `TOKIO_WORKER_THREADS` if set and positive, else the cgroup CPU limit,
/// else the number of available CPUs.
pub fn worker_threads() -> usize {
    std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|n| *n > 0)
        .or_else(detect_cpu_limit)
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
}

/// CPU limit from cgroup v2, falling back to cgroup v1.
pub fn detect_cpu_limit() -> Option<usize> {
    if let Some(cores) = fs::read_to_string(CGROUP_V2_CPU_MAX)
        .ok()
        .and_then(|max| parse_cgroup_v2(&max))
    {
        return Some(cores);
    }

    let quota = fs::read_to_string(CGROUP_V1_QUOTA).ok()?;
    let period = fs::read_to_string(CGROUP_V1_PERIOD).ok()?;
    parse_cgroup_v1(&quota, &period)
}

/// Parse a cgroup v2 `cpu.max` line such as `"200000 100000"`.
/// `"max 100000"` means unlimited.
fn parse_cgroup_v2(content: &str) -> Option<usize> {
    let mut parts = content.split_whitespace();
    let quota = parts.next()?.parse::<i64>().ok()?;
    let period = parts.next()?.parse::<i64>().ok()?;
    cores_from_quota(quota, period)
}

/// Parse cgroup v1 quota/period files. A quota of `-1` means unlimited.
fn parse_cgroup_v1(quota: &str, period: &str) -> Option<usize> {
    let quota = quota.trim().parse::<i64>().ok()?;
    let period = period.trim().parse::<i64>().ok()?;
    cores_from_quota(quota, period)
}

fn cores_from_quota(quota: i64, period: i64) -> Option<usize> {
    if quota <= 0 || period <= 0 {
        return None;
    }
    Some(((quota as f64 / period as f64).ceil() as usize).max(1))
}
