use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::BTreeMap, fmt};

/// Output format for rendered snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Text
    }
}

/// A CPU core or block device label as printed by the sampling tools.
///
/// Numeric labels order by value, so core `2` sorts before core `10`, and come
/// before any non-numeric label; non-numeric labels order as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    pub fn new<S: Into<String>>(label: S) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.parse::<u64>(), other.0.parse::<u64>()) {
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Label {
    fn from(label: &str) -> Self {
        Self::new(label)
    }
}

/// Percent values keyed by label, in ascending label order
pub type UsageMap = BTreeMap<Label, f64>;

/// Aggregate and per-core CPU utilization from one sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuUsage {
    pub total_percent: f64,
    pub per_core_percent: UsageMap,
}

/// Traffic through one interface over a one-second sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkUsage {
    pub interface: String,
    pub kib_in_per_sec: f64,
    pub kib_out_per_sec: f64,
}

/// Identity facts resolved once per tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostIdentity {
    pub host_name: String,
    pub os_description: String,
    pub cpu_core_count: usize,
}

/// Complete resource picture captured in one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub host_name: String,
    pub os_description: String,
    pub mac_addresses: Vec<String>,
    pub cpu_model: String,
    pub cpu_core_count: usize,
    #[serde(rename = "totalMemoryMiB")]
    pub total_memory_mib: f64,
    #[serde(rename = "remainingMemoryMiB")]
    pub remaining_memory_mib: f64,
    /// Device name to size in bytes
    pub disk_specs: BTreeMap<String, f64>,
    pub cpu_total_usage_percent: f64,
    pub cpu_per_core_usage_percent: UsageMap,
    pub disk_usage_percent: UsageMap,
    pub network_usage: Vec<NetworkUsage>,
    pub uptime_seconds: f64,
}
