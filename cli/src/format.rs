//! Human-readable formatting for table cells.

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Format a byte count with a 1024 base and two decimals (`1.50 KB`).
///
/// Plain bytes are printed without decimals; anything past gigabytes stays
/// in GB.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.2} {}", value, UNITS[unit])
}

/// Format a percentage with one decimal (`12.5%`).
pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Shorten `s` to at most `max` characters, marking the cut with `…`.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1024 * 1024), "1.00 MB");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.00 GB");
        assert_eq!(format_bytes(2048 * 1024 * 1024 * 1024), "2048.00 GB");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.0), "0.0%");
        assert_eq!(format_percent(12.34), "12.3%");
        assert_eq!(format_percent(100.0), "100.0%");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("sshd", 10), "sshd");
        assert_eq!(truncate("systemd-resolved", 8), "systemd…");
        assert_eq!(truncate("naïve-name", 5), "naïv…");
    }
}
