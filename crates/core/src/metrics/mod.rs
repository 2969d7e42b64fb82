pub mod cpu;
pub mod disk;
pub mod memory;
pub mod network;
pub mod system;

pub use cpu::{parse_cpu_model, parse_cpu_usage};
pub use disk::{parse_disk_specs, parse_disk_usage, IOSTAT_HEADER_LINES};
pub use memory::{parse_remaining_memory_mib, parse_total_memory_kb};
pub use network::parse_network_usage;
pub use system::{parse_mac_address, parse_uptime_seconds};

use crate::{
    adapters,
    command::{CommandRunner, Invocation},
    error::{CoreError, Result},
    host::HostProbe,
    model::Snapshot,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::debug;

const KB_PER_MIB: f64 = 1024.0;

/// Builds one snapshot per tick from fresh tool invocations
pub struct SnapshotAssembler {
    runner: Arc<dyn CommandRunner>,
    host: Arc<dyn HostProbe>,
}

impl SnapshotAssembler {
    pub fn new(runner: Arc<dyn CommandRunner>, host: Arc<dyn HostProbe>) -> Self {
        Self { runner, host }
    }

    /// Runs every tool once and assembles the results.
    ///
    /// The first failure aborts the whole snapshot.
    pub async fn collect(&self) -> Result<Snapshot> {
        let timestamp = Utc::now();
        let identity = self.host.identity()?;
        let runner = self.runner.as_ref();

        let adapters = adapters::list_active_adapters(runner).await?;
        let mut mac_addresses = Vec::with_capacity(adapters.len());
        for adapter in &adapters {
            let output = runner.run(&Invocation::mac_address(adapter)).await?;
            mac_addresses.push(parse_mac_address(&output)?);
        }

        let cpu_model = parse_cpu_model(&runner.run(&Invocation::cpu_model()).await?)?;
        let total_memory_kb =
            parse_total_memory_kb(&runner.run(&Invocation::total_memory()).await?)?;
        let disk_specs = parse_disk_specs(&runner.run(&Invocation::disk_specs()).await?)?;

        let cpu_usage = parse_cpu_usage(
            &runner.run(&Invocation::cpu_usage()).await?,
            identity.cpu_core_count,
        )?;

        let network_usage = if adapters.is_empty() {
            debug!("No active adapters, skipping network sample");
            Vec::new()
        } else {
            let output = runner.run(&Invocation::network_usage(&adapters)).await?;
            parse_network_usage(&output, &adapters)?
        };

        let disk_usage = parse_disk_usage(&runner.run(&Invocation::disk_usage()).await?)?;
        let remaining_memory_mib =
            parse_remaining_memory_mib(&runner.run(&Invocation::remaining_memory()).await?)?;
        let uptime_seconds = parse_uptime_seconds(&runner.run(&Invocation::uptime()).await?)?;

        Ok(Snapshot {
            timestamp,
            host_name: identity.host_name,
            os_description: identity.os_description,
            mac_addresses,
            cpu_model,
            cpu_core_count: identity.cpu_core_count,
            total_memory_mib: total_memory_kb / KB_PER_MIB,
            remaining_memory_mib,
            disk_specs,
            cpu_total_usage_percent: cpu_usage.total_percent,
            cpu_per_core_usage_percent: cpu_usage.per_core_percent,
            disk_usage_percent: disk_usage,
            network_usage,
            uptime_seconds,
        })
    }
}

/// Lines with anything other than whitespace on them
pub(crate) fn non_empty_lines(output: &str) -> Vec<&str> {
    output.lines().filter(|line| !line.trim().is_empty()).collect()
}

pub(crate) fn last_token<'a>(what: &'static str, line: &'a str) -> Result<&'a str> {
    line.split_whitespace()
        .next_back()
        .ok_or_else(|| CoreError::parse(what, "empty line"))
}

/// Parses a tool number, reading a decimal comma as a point
pub(crate) fn parse_decimal(what: &'static str, token: &str) -> Result<f64> {
    let value: f64 = token
        .replace(',', ".")
        .parse()
        .map_err(|_| CoreError::parse(what, format!("{token:?} is not a number")))?;
    if !value.is_finite() {
        return Err(CoreError::parse(what, format!("{token:?} is not finite")));
    }
    Ok(value)
}

/// Rejects negative percentages without clamping the upper end
pub(crate) fn parse_percent(what: &'static str, value: f64) -> Result<f64> {
    if value < 0.0 {
        return Err(CoreError::parse(what, format!("negative percentage {value}")));
    }
    Ok(value)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{HostIdentity, Label};
    use async_trait::async_trait;
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
    };

    /// Serves fixed output per invocation and counts calls
    #[derive(Default)]
    pub(crate) struct CannedRunner {
        outputs: HashMap<Invocation, String>,
        pub(crate) calls: AtomicUsize,
    }

    impl CannedRunner {
        pub(crate) fn with(mut self, invocation: Invocation, output: &str) -> Self {
            self.outputs.insert(invocation, output.to_string());
            self
        }
    }

    #[async_trait]
    impl CommandRunner for CannedRunner {
        async fn run(&self, invocation: &Invocation) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outputs.get(invocation).cloned().ok_or_else(|| {
                CoreError::process_start(
                    invocation.program.clone(),
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no canned output"),
                )
            })
        }
    }

    pub(crate) struct FixedHost(pub(crate) HostIdentity);

    impl HostProbe for FixedHost {
        fn identity(&self) -> Result<HostIdentity> {
            Ok(self.0.clone())
        }
    }

    pub(crate) fn fixed_host() -> FixedHost {
        FixedHost(HostIdentity {
            host_name: "devbox".to_string(),
            os_description: "Linux 24.04 Ubuntu 24.04.1 LTS".to_string(),
            cpu_core_count: 2,
        })
    }

    const INTERFACES: &str = "\
1.enp3s0 [Up, Running, Connected]
2.wlp2s0 [Up, Running, Wireless, Associated]
3.any (Pseudo-device that captures on all interfaces) [Up, Running]
4.lo [Up, Running, Loopback]
";

    const MPSTAT: &str = "\
Linux 6.5.0-35-generic (devbox) \t10/16/2026 \t_x86_64_\t(2 CPU)

02:10:01 PM  CPU    %usr   %nice    %sys %iowait    %irq   %soft  %steal  %guest  %gnice   %idle
02:10:02 PM  all    5.00    0.00    2.50    0.00    0.00    0.00    0.00    0.00    0.00   92.50
02:10:02 PM    0    8.00    0.00    2.00    0.00    0.00    0.00    0.00    0.00    0.00   90.00
02:10:02 PM    1    2.00    0.00    3.00    0.00    0.00    0.00    0.00    0.00    0.00   95.00

Average:     CPU    %usr   %nice    %sys %iowait    %irq   %soft  %steal  %guest  %gnice   %idle
Average:     all    5.00    0.00    2.50    0.00    0.00    0.00    0.00    0.00    0.00   92.50
Average:       0    8.00    0.00    2.00    0.00    0.00    0.00    0.00    0.00    0.00   90.00
Average:       1    2.00    0.00    3.00    0.00    0.00    0.00    0.00    0.00    0.00   95.00
";

    const IOSTAT: &str = "\
Linux 6.5.0-35-generic (devbox) \t10/16/2026 \t_x86_64_\t(2 CPU)

Device            r/s     w/s   %util
nvme0n1          0.00   12.00    4.25
sda              0.00    0.00    0.00
";

    const IFSTAT: &str = "\
      enp3s0             wlp2s0
 KB/s in  KB/s out   KB/s in  KB/s out
    1.50      0.25      8.00      2.00
";

    const FREE: &str = "\
               total        used        free      shared  buff/cache   available
Mem:           15936        5093        6214         812        4629        9716
Swap:           2047           0        2047
";

    pub(crate) fn canned_host_tools() -> CannedRunner {
        let adapters = vec!["enp3s0".to_string(), "wlp2s0".to_string()];
        CannedRunner::default()
            .with(Invocation::list_interfaces(), INTERFACES)
            .with(Invocation::mac_address("enp3s0"), "3c:52:82:5a:1e:0f\n")
            .with(Invocation::mac_address("wlp2s0"), "a4:c3:f0:85:9d:21\n")
            .with(
                Invocation::cpu_model(),
                "model name\t: Intel(R) Core(TM) i7-8550U CPU @ 1.80GHz\n",
            )
            .with(Invocation::total_memory(), "MemTotal:       16318464 kB\n")
            .with(Invocation::disk_specs(), "nvme0n1 512110190592\nsda 2000398934016\n")
            .with(Invocation::cpu_usage(), MPSTAT)
            .with(Invocation::network_usage(&adapters), IFSTAT)
            .with(Invocation::disk_usage(), IOSTAT)
            .with(Invocation::remaining_memory(), FREE)
            .with(Invocation::uptime(), "350735.47 234388.90\n")
    }

    fn assembler(runner: CannedRunner) -> SnapshotAssembler {
        SnapshotAssembler::new(Arc::new(runner), Arc::new(fixed_host()))
    }

    #[tokio::test]
    async fn test_golden_snapshot() {
        let snapshot = assembler(canned_host_tools()).collect().await.unwrap();

        assert_eq!(snapshot.host_name, "devbox");
        assert_eq!(snapshot.os_description, "Linux 24.04 Ubuntu 24.04.1 LTS");
        assert_eq!(
            snapshot.mac_addresses,
            vec!["3c:52:82:5a:1e:0f", "a4:c3:f0:85:9d:21"]
        );
        assert_eq!(snapshot.cpu_model, "Intel(R) Core(TM) i7-8550U CPU @ 1.80GHz");
        assert_eq!(snapshot.cpu_core_count, 2);
        assert_eq!(snapshot.total_memory_mib, 15936.0);
        assert_eq!(snapshot.remaining_memory_mib, 9716.0);
        assert_eq!(snapshot.disk_specs.len(), 2);
        assert_eq!(snapshot.disk_specs["nvme0n1"], 512110190592.0);
        assert_eq!(snapshot.disk_specs["sda"], 2000398934016.0);
        assert_eq!(snapshot.cpu_total_usage_percent, 7.5);
        assert_eq!(snapshot.cpu_per_core_usage_percent.len(), 2);
        assert_eq!(snapshot.cpu_per_core_usage_percent[&Label::from("0")], 10.0);
        assert_eq!(snapshot.cpu_per_core_usage_percent[&Label::from("1")], 5.0);
        assert_eq!(snapshot.disk_usage_percent[&Label::from("nvme0n1")], 4.25);
        assert_eq!(snapshot.disk_usage_percent[&Label::from("sda")], 0.0);
        assert_eq!(snapshot.network_usage.len(), 2);
        assert_eq!(snapshot.network_usage[1].interface, "wlp2s0");
        assert_eq!(snapshot.network_usage[1].kib_in_per_sec, 8.0);
        assert_eq!(snapshot.uptime_seconds, 350735.47);
    }

    #[tokio::test]
    async fn test_each_tool_runs_once_per_tick() {
        let runner = Arc::new(canned_host_tools());
        let assembler = SnapshotAssembler::new(runner.clone(), Arc::new(fixed_host()));
        assembler.collect().await.unwrap();
        // interfaces, 2 MACs, model, meminfo, lsblk, mpstat, ifstat, iostat, free, uptime
        assert_eq!(runner.calls.load(Ordering::SeqCst), 11);
    }

    #[tokio::test]
    async fn test_no_adapters_skips_network_sample() {
        let runner = canned_host_tools()
            .with(Invocation::list_interfaces(), "4.lo [Up, Running, Loopback]\n");
        let snapshot = assembler(runner).collect().await.unwrap();
        assert!(snapshot.mac_addresses.is_empty());
        assert!(snapshot.network_usage.is_empty());
    }

    #[tokio::test]
    async fn test_missing_tool_fails_whole_snapshot() {
        let mut runner = canned_host_tools();
        runner.outputs.remove(&Invocation::disk_usage());
        let err = assembler(runner).collect().await.unwrap_err();
        assert!(matches!(err, CoreError::ProcessStart { .. }));
    }

    #[tokio::test]
    async fn test_core_count_mismatch_is_parse_error() {
        let host = FixedHost(HostIdentity {
            cpu_core_count: 8,
            ..fixed_host().0
        });
        let assembler = SnapshotAssembler::new(Arc::new(canned_host_tools()), Arc::new(host));
        // Counting 9 rows back from the end lands on the mpstat banner.
        let err = assembler.collect().await.unwrap_err();
        assert!(err.is_parse());
    }

    #[test]
    fn test_parse_decimal_reads_comma() {
        assert_eq!(parse_decimal("test", "98,50").unwrap(), 98.5);
        assert!(parse_decimal("test", "NaN").unwrap_err().is_parse());
        assert!(parse_decimal("test", "").unwrap_err().is_parse());
    }
}
