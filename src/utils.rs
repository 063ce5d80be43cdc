use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use serenity::all::UserId;
use serenity::prelude::Mentionable;

use crate::errors::GiveawayError;

const SECOND_MS: u64 = 1_000;
const MINUTE_MS: u64 = 60 * SECOND_MS;
const HOUR_MS: u64 = 60 * MINUTE_MS;
const DAY_MS: u64 = 24 * HOUR_MS;

/// Parses a `<integer><unit>` token (`10s`, `5m`, `2h`, `1d`) into milliseconds.
/// `0s` is accepted. Anything else, including an overflowing magnitude, is
/// `InvalidDuration`.
pub fn parse_duration(token: &str) -> Result<u64, GiveawayError> {
    static RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?P<num>\d+)(?P<unit>[smhd])$").unwrap());

    let invalid = || GiveawayError::InvalidDuration(token.to_string());
    let caps = RE.captures(token).ok_or_else(invalid)?;
    let num: u64 = caps["num"].parse().map_err(|_| invalid())?;
    let factor = match &caps["unit"] {
        "s" => SECOND_MS,
        "m" => MINUTE_MS,
        "h" => HOUR_MS,
        "d" => DAY_MS,
        _ => return Err(invalid()),
    };
    num.checked_mul(factor).ok_or_else(invalid)
}

/// Splits a comma separated list of user ids. Accepts raw ids and mentions,
/// drops blanks and garbage, keeps the first occurrence of duplicates.
pub fn parse_id_list(s: &str) -> Vec<UserId> {
    let mut out: Vec<UserId> = Vec::new();
    for part in s.split(',') {
        let raw = part.trim();
        let raw = raw
            .strip_prefix("<@")
            .and_then(|r| r.strip_suffix('>'))
            .map(|r| r.trim_start_matches('!'))
            .unwrap_or(raw);
        let Ok(id) = raw.parse::<u64>() else { continue };
        if id == 0 {
            continue;
        }
        let uid = UserId::new(id);
        if !out.contains(&uid) {
            out.push(uid);
        }
    }
    out
}

/// "1d 2h 3m 4s"
pub fn fmt_remaining(ms: u64) -> String {
    let sec = (ms / SECOND_MS) % 60;
    let min = (ms / MINUTE_MS) % 60;
    let h = (ms / HOUR_MS) % 24;
    let d = ms / DAY_MS;
    format!("{d}d {h}h {min}m {sec}s")
}

pub fn mention_user(id: UserId) -> String {
    id.mention().to_string()
}

/// Discord relative timestamp markup, rendered client side ("in 5 minutes").
pub fn relative_time(at: DateTime<Utc>) -> String {
    format!("<t:{}:R>", at.timestamp())
}

pub fn fmt_local(at: DateTime<Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format("%Y-%m-%d %H:%M %Z").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("10s"), Ok(10_000));
        assert_eq!(parse_duration("5m"), Ok(300_000));
        assert_eq!(parse_duration("2h"), Ok(7_200_000));
        assert_eq!(parse_duration("1d"), Ok(86_400_000));
    }

    #[test]
    fn test_parse_duration_zero_is_accepted() {
        assert_eq!(parse_duration("0s"), Ok(0));
        assert_eq!(parse_duration("0d"), Ok(0));
    }

    #[test]
    fn test_parse_duration_matches_factor() {
        for n in [1u64, 7, 42, 365] {
            assert_eq!(parse_duration(&format!("{n}s")), Ok(n * 1_000));
            assert_eq!(parse_duration(&format!("{n}m")), Ok(n * 60_000));
            assert_eq!(parse_duration(&format!("{n}h")), Ok(n * 3_600_000));
            assert_eq!(parse_duration(&format!("{n}d")), Ok(n * 86_400_000));
        }
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        for bad in ["abc", "5x", "10", "h", "", " 5m", "5m ", "-5m", "1.5h", "5M", "5mm", "m5"] {
            assert_eq!(
                parse_duration(bad),
                Err(GiveawayError::InvalidDuration(bad.to_string())),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn test_parse_duration_overflow_is_invalid() {
        assert!(parse_duration("99999999999999999999s").is_err());
        assert!(parse_duration("999999999999999999d").is_err());
    }

    #[test]
    fn test_parse_id_list() {
        let ids = parse_id_list(" 123, <@456>,, <@!789>, nope, 123 ,0");
        assert_eq!(ids, vec![UserId::new(123), UserId::new(456), UserId::new(789)]);
        assert!(parse_id_list("").is_empty());
    }

    #[test]
    fn test_fmt_remaining() {
        assert_eq!(fmt_remaining(0), "0d 0h 0m 0s");
        assert_eq!(fmt_remaining(90_061_000), "1d 1h 1m 1s");
        assert_eq!(fmt_remaining(59_999), "0d 0h 0m 59s");
    }

    #[test]
    fn test_mention_and_time_markup() {
        assert_eq!(mention_user(UserId::new(42)), "<@42>");
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(relative_time(at), format!("<t:{}:R>", at.timestamp()));
        assert_eq!(fmt_local(at, chrono_tz::Europe::Paris), "2024-01-01 01:00 CET");
    }
}
