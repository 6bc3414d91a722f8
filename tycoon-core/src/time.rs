use std::time::{SystemTime, UNIX_EPOCH};

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Return the current unix timestamp in seconds.
pub fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}

/// Days since the unix epoch (UTC).
pub fn unix_day(unix_secs: u64) -> u64 {
    unix_secs / SECS_PER_DAY
}

pub fn today() -> u64 {
    unix_day(now_unix_secs())
}
