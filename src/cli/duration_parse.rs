//! Duration parsing for replay files and CLI flags
//!
//! Supports human-readable durations like "60s", "1 hour", "7d" as well as
//! bare integers, which are taken as ledger seconds.

/// Parse a duration to ledger seconds.
///
/// Supports:
/// - Bare integers → seconds ("60" → 60)
/// - Human-readable formats via humantime crate (e.g., "70s", "1 hour", "1h")
///
/// # Examples
/// ```ignore
/// assert_eq!(parse_duration_to_secs("60").unwrap(), 60);
/// assert_eq!(parse_duration_to_secs("1m 10s").unwrap(), 70);
/// ```
pub fn parse_duration_to_secs(input: &str) -> Result<u64, String> {
    let trimmed = input.trim();

    if let Ok(secs) = trimmed.parse::<u64>() {
        return Ok(secs);
    }

    humantime::parse_duration(trimmed)
        .map(|d| d.as_secs())
        .map_err(|e| format!("Invalid duration '{}': {}", input, e))
}
