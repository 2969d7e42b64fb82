use super::{last_token, parse_decimal};
use crate::error::{CoreError, Result};

/// Total memory in kB, as `/proc/meminfo` reports it.
///
/// Input is the `MemTotal:  16318480 kB` line; the value is the token before
/// the unit. No unit conversion happens here.
pub fn parse_total_memory_kb(output: &str) -> Result<f64> {
    let tokens: Vec<&str> = output.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(CoreError::parse(
            "total memory",
            format!("expected `MemTotal: <n> kB`, got {output:?}"),
        ));
    }
    parse_decimal("total memory", tokens[tokens.len() - 2])
}

/// Available memory in MiB from `free -m`.
///
/// The last column of the second line (`Mem:`) is `available`.
pub fn parse_remaining_memory_mib(output: &str) -> Result<f64> {
    let row = output
        .split('\n')
        .nth(1)
        .filter(|line| !line.trim().is_empty())
        .ok_or_else(|| CoreError::parse("remaining memory", "missing `Mem:` row"))?;
    parse_decimal("remaining memory", last_token("remaining memory", row)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_memory_stays_in_kb() {
        let line = "MemTotal:       16318480 kB\n";
        assert_eq!(parse_total_memory_kb(line).unwrap(), 16318480.0);
    }

    #[test]
    fn test_total_memory_missing_line() {
        assert!(parse_total_memory_kb("").unwrap_err().is_parse());
        assert!(parse_total_memory_kb("MemTotal:\n").unwrap_err().is_parse());
    }

    #[test]
    fn test_remaining_memory_is_last_token_of_second_line() {
        let table = "total used free ...\n  Mem: 16000 4000 9000 ... 9000\n";
        assert_eq!(parse_remaining_memory_mib(table).unwrap(), 9000.0);
    }

    #[test]
    fn test_remaining_memory_real_free_output() {
        let table = "\
               total        used        free      shared  buff/cache   available
Mem:           15936        5093        6214         812        4629        9716
Swap:           2047           0        2047
";
        assert_eq!(parse_remaining_memory_mib(table).unwrap(), 9716.0);
    }

    #[test]
    fn test_remaining_memory_single_line_fails() {
        let err = parse_remaining_memory_mib("total used free\n").unwrap_err();
        assert!(err.is_parse());
    }
}
