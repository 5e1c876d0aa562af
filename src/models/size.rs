use std::time::Duration;

const MIB: f64 = 1024.0 * 1024.0;

/// Smallest elapsed time used when computing a rate.
pub const MIN_ELAPSED: Duration = Duration::from_micros(1);

pub fn size_in_mb(bytes: u64) -> f64 {
    bytes as f64 / MIB
}

/// Converts a bytes-per-second rate to MB/s.
pub fn rate_in_mb(bytes_per_sec: f64) -> f64 {
    bytes_per_sec / MIB
}

/// Bytes per second, with `elapsed` floored to [`MIN_ELAPSED`].
pub fn throughput(bytes: u64, elapsed: Duration) -> f64 {
    bytes as f64 / elapsed.max(MIN_ELAPSED).as_secs_f64()
}

pub fn human_readable_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;
    const TB: u64 = 1024 * GB;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
