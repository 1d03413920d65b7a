//! 人类可读的文件大小（十进制单位）

const BASE: f64 = 1000.0;
const SUFFIXES: [&str; 8] = ["kB", "MB", "GB", "TB", "PB", "EB", "ZB", "YB"];

/// Format a byte count with decimal units: `1 Byte`, `999 Bytes`, `2.5 GB`.
pub fn natural_size(bytes: u64) -> String {
    if bytes == 1 {
        return "1 Byte".to_string();
    }
    if bytes < 1000 {
        return format!("{} Bytes", bytes);
    }

    let value = bytes as f64;
    let mut unit = BASE;
    let mut suffix = SUFFIXES[0];
    for next in &SUFFIXES[1..] {
        if value < unit * BASE {
            break;
        }
        unit *= BASE;
        suffix = next;
    }
    format!("{:.1} {}", value / unit, suffix)
}

/// Size column as shown in exports. Missing or negative sizes are `Unknown`.
pub fn human_size(size: Option<i64>) -> String {
    match size.and_then(|s| u64::try_from(s).ok()) {
        Some(bytes) => natural_size(bytes),
        None => "Unknown".to_string(),
    }
}
