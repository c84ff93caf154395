use std::time::SystemTime;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub fn parse_rfc3339_to_unix_ms(value: &str) -> Option<i64> {
    let timestamp = OffsetDateTime::parse(value.trim(), &Rfc3339).ok()?;
    let ms: i128 = timestamp.unix_timestamp_nanos() / 1_000_000;
    i64::try_from(ms).ok()
}

pub fn system_time_to_rfc3339(value: SystemTime) -> Option<String> {
    let timestamp = OffsetDateTime::from(value);
    timestamp.format(&Rfc3339).ok()
}

/// Sort key for timestamps; missing or unparsable values sort first.
pub fn timestamp_sort_key(value: &str) -> i64 {
    parse_rfc3339_to_unix_ms(value).unwrap_or(i64::MIN)
}
