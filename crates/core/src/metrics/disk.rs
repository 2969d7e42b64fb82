use super::{last_token, non_empty_lines, parse_decimal, parse_percent};
use crate::{
    error::{CoreError, Result},
    model::{Label, UsageMap},
};
use std::collections::BTreeMap;

/// Preamble lines `iostat -dxy` prints before the first device row: the
/// kernel/host banner and the column header.
pub const IOSTAT_HEADER_LINES: usize = 2;

/// Device sizes in bytes from `lsblk -bdno NAME,SIZE`.
///
/// Each line is `<device> <size>`. A trailing unit letter on the size is
/// dropped and a decimal comma is read as a point. A repeated device keeps the
/// last value seen.
pub fn parse_disk_specs(output: &str) -> Result<BTreeMap<String, f64>> {
    let mut specs = BTreeMap::new();

    for line in non_empty_lines(output) {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let &[device, size] = tokens.as_slice() else {
            return Err(CoreError::parse(
                "disk specs",
                format!("expected `<device> <size>`, got {line:?}"),
            ));
        };
        let size = size.strip_suffix(|c: char| c.is_ascii_alphabetic()).unwrap_or(size);
        specs.insert(device.to_string(), parse_decimal("disk size", size)?);
    }

    Ok(specs)
}

/// Per-device `%util` from `iostat -dxy 1 1`.
///
/// Rows after the fixed preamble are `<device> ... <%util>`.
pub fn parse_disk_usage(output: &str) -> Result<UsageMap> {
    let lines = non_empty_lines(output);
    if lines.len() < IOSTAT_HEADER_LINES {
        return Err(CoreError::parse(
            "disk usage",
            format!(
                "expected {IOSTAT_HEADER_LINES} header lines, got {}",
                lines.len()
            ),
        ));
    }

    let mut usage = UsageMap::new();
    for row in &lines[IOSTAT_HEADER_LINES..] {
        let device = row
            .split_whitespace()
            .next()
            .ok_or_else(|| CoreError::parse("disk usage", "empty device row"))?;
        let util = parse_decimal("disk utilization", last_token("disk usage", row)?)?;
        usage.insert(Label::new(device), parse_percent("disk usage", util)?);
    }

    Ok(usage)
}
