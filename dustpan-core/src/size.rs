const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;
const TB: u64 = GB * 1024;

/// Format bytes into human-readable string
pub fn format_size(bytes: u64) -> String {
    if bytes >= TB {
        format!("{:.1} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// One decimal, single-letter unit, bare number below 1 KiB
pub fn format_size_compact(bytes: u64) -> String {
    let (value, unit) = if bytes >= TB {
        (bytes as f64 / TB as f64, "T")
    } else if bytes >= GB {
        (bytes as f64 / GB as f64, "G")
    } else if bytes >= MB {
        (bytes as f64 / MB as f64, "M")
    } else if bytes >= KB {
        (bytes as f64 / KB as f64, "K")
    } else {
        return bytes.to_string();
    };
    format!("{:.1}{}", value, unit)
}

/// Throughput in MB/s, with fewer decimals as the value grows
pub fn format_rate(mb_per_sec: f64) -> String {
    if mb_per_sec < 0.01 {
        "0 MB/s".to_string()
    } else if mb_per_sec < 1.0 {
        format!("{:.2} MB/s", mb_per_sec)
    } else if mb_per_sec < 10.0 {
        format!("{:.1} MB/s", mb_per_sec)
    } else {
        format!("{:.0} MB/s", mb_per_sec.trunc())
    }
}

/// Calculate percentage of size relative to total
pub fn size_percentage(size: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        (size as f64 / total as f64) * 100.0
    }
}

/// Format a number with thousand separators (e.g., 1,234,567)
pub fn format_count(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}
