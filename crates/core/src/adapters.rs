use crate::{
    command::{CommandRunner, Invocation},
    error::Result,
};
use tracing::debug;

/// Interface descriptions that never count as a physical adapter
pub const EXCLUDED_KINDS: [&str; 5] = [
    "Loopback",
    "Pseudo-device",
    "none",
    "Bluetooth adapter",
    "Linux netfilter",
];

/// Status flag an interface must carry to be sampled
pub const RUNNING_FLAG: &str = "Running";

/// Lists the active, physical-looking interfaces in tool order.
///
/// Not cached: interfaces may come and go between ticks.
pub async fn list_active_adapters(runner: &dyn CommandRunner) -> Result<Vec<String>> {
    let output = runner.run(&Invocation::list_interfaces()).await?;
    let adapters = filter_active_adapters(&output);
    debug!(count = adapters.len(), ?adapters, "Discovered adapters");
    Ok(adapters)
}

/// Filters `tcpdump --list-interfaces` output down to interface names.
///
/// Lines look like `1.eth0 [Up, Running, Connected]`; the name is whatever
/// follows the first `.` up to the next whitespace.
pub fn filter_active_adapters(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !EXCLUDED_KINDS.iter().any(|kind| line.contains(kind)))
        .filter(|line| line.contains(RUNNING_FLAG))
        .filter_map(interface_name)
        .collect()
}

fn interface_name(line: &str) -> Option<String> {
    let rest = match line.find('.') {
        Some(dot) => &line[dot + 1..],
        None => line,
    };
    rest.split_whitespace().next().map(str::to_string)
}
