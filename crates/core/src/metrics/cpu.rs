use super::{last_token, non_empty_lines, parse_decimal, parse_percent};
use crate::{
    error::{CoreError, Result},
    model::{CpuUsage, Label, UsageMap},
};

/// Extracts the model string from a `model name : ...` line.
///
/// Everything after the first `:` on that line, minus the single separating
/// space.
pub fn parse_cpu_model(output: &str) -> Result<String> {
    let colon = output
        .find(':')
        .ok_or_else(|| CoreError::parse("CPU model", format!("no ':' in {output:?}")))?;
    let rest = &output[colon + 1..];
    let line = rest.split('\n').next().unwrap_or(rest);
    let line = line.strip_suffix('\r').unwrap_or(line);
    let model = line.strip_prefix(' ').unwrap_or(line);

    if model.is_empty() {
        return Err(CoreError::parse("CPU model", "empty model name"));
    }
    Ok(model.to_string())
}

/// Reads aggregate and per-core usage from `mpstat -P ALL 1 1`.
///
/// mpstat closes with an `Average:` block: one `all` row followed by one row
/// per core. Rows are located by counting from the end, so the header length
/// does not matter, but `core_count` must match the machine that produced the
/// output. Usage is `100 - %idle`, where `%idle` is the last column.
pub fn parse_cpu_usage(output: &str, core_count: usize) -> Result<CpuUsage> {
    if core_count == 0 {
        return Err(CoreError::parse("CPU usage", "core count is zero"));
    }

    let lines = non_empty_lines(output);
    if lines.len() < core_count + 1 {
        return Err(CoreError::parse(
            "CPU usage",
            format!(
                "expected at least {} rows for {core_count} cores, got {}",
                core_count + 1,
                lines.len()
            ),
        ));
    }

    let aggregate_row = lines[lines.len() - (core_count + 1)];
    let total_percent = usage_from_idle(aggregate_row)?;
    if total_percent > 100.0 {
        return Err(CoreError::parse(
            "CPU usage",
            format!("aggregate usage {total_percent} exceeds 100"),
        ));
    }

    let mut per_core_percent = UsageMap::new();
    for row in &lines[lines.len() - core_count..] {
        let label = row
            .split_whitespace()
            .nth(1)
            .ok_or_else(|| CoreError::parse("CPU usage", format!("no core label in {row:?}")))?;
        per_core_percent.insert(Label::new(label), usage_from_idle(row)?);
    }

    if per_core_percent.len() != core_count {
        return Err(CoreError::parse(
            "CPU usage",
            format!(
                "expected {core_count} distinct cores, got {}",
                per_core_percent.len()
            ),
        ));
    }

    Ok(CpuUsage {
        total_percent,
        per_core_percent,
    })
}

fn usage_from_idle(row: &str) -> Result<f64> {
    let idle = parse_decimal("CPU idle", last_token("CPU usage", row)?)?;
    parse_percent("CPU usage", 100.0 - idle)
}
