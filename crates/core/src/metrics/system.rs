use super::parse_decimal;
use crate::error::{CoreError, Result};

/// Seconds since boot from `/proc/uptime` (`<uptime> <idle>`).
pub fn parse_uptime_seconds(output: &str) -> Result<f64> {
    let first = output
        .split_whitespace()
        .next()
        .ok_or_else(|| CoreError::parse("uptime", "empty /proc/uptime"))?;
    let seconds = parse_decimal("uptime", first)?;
    if seconds < 0.0 {
        return Err(CoreError::parse("uptime", format!("negative uptime {seconds}")));
    }
    Ok(seconds)
}

/// MAC address from `/sys/class/net/<iface>/address`, newline removed.
pub fn parse_mac_address(output: &str) -> Result<String> {
    let mac = output.trim_end_matches(['\n', '\r']);
    if mac.is_empty() {
        return Err(CoreError::parse("MAC address", "empty address file"));
    }
    Ok(mac.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uptime_first_token() {
        assert_eq!(parse_uptime_seconds("12345.67 2345.11").unwrap(), 12345.67);
        assert_eq!(parse_uptime_seconds("350735.47 234388.90\n").unwrap(), 350735.47);
    }

    #[test]
    fn test_uptime_unparsable() {
        assert!(parse_uptime_seconds("").unwrap_err().is_parse());
        assert!(parse_uptime_seconds("soon 1.0").unwrap_err().is_parse());
    }

    #[test]
    fn test_mac_address_strips_newline() {
        assert_eq!(
            parse_mac_address("3c:52:82:5a:1e:0f\n").unwrap(),
            "3c:52:82:5a:1e:0f"
        );
        assert!(parse_mac_address("\n").unwrap_err().is_parse());
    }
}
