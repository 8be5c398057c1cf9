use std::time::{SystemTime, UNIX_EPOCH};

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

pub fn short_hash(hash: &str) -> &str {
    hash.get(..7).unwrap_or(hash)
}

/// FNV-1a. Fixed constants keep the result identical across runs and builds,
/// which `DefaultHasher` does not promise.
pub fn stable_hash(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, byte| {
        (hash ^ u32::from(*byte)).wrapping_mul(FNV_PRIME)
    })
}

pub fn format_age(timestamp: i64) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as i64)
        .unwrap_or(timestamp);
    format_age_at(timestamp, now)
}

pub fn format_age_at(timestamp: i64, now: i64) -> String {
    const UNITS: [(i64, &str); 5] = [
        (365 * 24 * 3600, "y"),
        (30 * 24 * 3600, "mo"),
        (24 * 3600, "d"),
        (3600, "h"),
        (60, "m"),
    ];

    let seconds = now.saturating_sub(timestamp);
    if seconds < 0 {
        return "in the future".to_owned();
    }

    for (unit_seconds, suffix) in UNITS {
        if seconds >= unit_seconds {
            return format!("{}{suffix} ago", seconds / unit_seconds);
        }
    }
    "just now".to_owned()
}
