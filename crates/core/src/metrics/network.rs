use super::{non_empty_lines, parse_decimal};
use crate::{
    error::{CoreError, Result},
    model::NetworkUsage,
};

/// Lines `ifstat` prints before the value row: names and units.
pub const IFSTAT_HEADER_LINES: usize = 2;

/// Per-interface KiB/s from `ifstat -i <adapters> 1 1`.
///
/// The last line holds an `in`/`out` pair per adapter, in the order the
/// adapters were requested. Names come from `adapters` because ifstat
/// truncates long ones in its header.
pub fn parse_network_usage(output: &str, adapters: &[String]) -> Result<Vec<NetworkUsage>> {
    if adapters.is_empty() {
        return Ok(Vec::new());
    }

    let lines = non_empty_lines(output);
    if lines.len() < IFSTAT_HEADER_LINES + 1 {
        return Err(CoreError::parse(
            "network usage",
            format!("expected a value row after the header, got {} lines", lines.len()),
        ));
    }

    let values = lines[lines.len() - 1]
        .split_whitespace()
        .map(|token| parse_decimal("network rate", token))
        .collect::<Result<Vec<f64>>>()?;

    if values.len() != adapters.len() * 2 {
        return Err(CoreError::parse(
            "network usage",
            format!(
                "expected {} rates for {} adapters, got {}",
                adapters.len() * 2,
                adapters.len(),
                values.len()
            ),
        ));
    }

    Ok(adapters
        .iter()
        .zip(values.chunks_exact(2))
        .map(|(interface, pair)| NetworkUsage {
            interface: interface.clone(),
            kib_in_per_sec: pair[0],
            kib_out_per_sec: pair[1],
        })
        .collect())
}
