//! util — small helpers shared across the table codec.
//!
//! Contains:
//! - today_ymd(): current civil date for the header's last-update stamp.
//! - latin1_to_string() / string_to_latin1(): the 8-bit text codec DBF
//!   files use. Bytes map 1:1 to U+00..U+FF; non-Latin-1 chars encode as '?'.

/// Current date (UTC) as (year, month, day).
///
/// Days-to-civil conversion per the standard proleptic Gregorian algorithm;
/// good for any date this library will ever stamp.
pub fn today_ymd() -> (u16, u8, u8) {
    use std::time::{SystemTime, UNIX_EPOCH};
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let days = (secs / 86_400) as i64;
    civil_from_days(days)
}

/// Civil date from days since 1970-01-01.
pub fn civil_from_days(z: i64) -> (u16, u8, u8) {
    let z = z + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = z - era * 146_097; // [0, 146096]
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365; // [0, 399]
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100); // [0, 365]
    let mp = (5 * doy + 2) / 153; // [0, 11]
    let d = doy - (153 * mp + 2) / 5 + 1; // [1, 31]
    let m = if mp < 10 { mp + 3 } else { mp - 9 }; // [1, 12]
    let y = if m <= 2 { y + 1 } else { y };
    (y as u16, m as u8, d as u8)
}

/// Decode raw field bytes as Latin-1 text.
#[inline]
pub fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

/// Encode text to Latin-1 bytes; characters above U+00FF become '?'.
#[inline]
pub fn string_to_latin1(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| if (c as u32) <= 0xFF { c as u8 } else { b'?' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn civil_from_days_known_dates() {
        assert_eq!(civil_from_days(0), (1970, 1, 1));
        assert_eq!(civil_from_days(11_016), (2000, 2, 29)); // leap day
        assert_eq!(civil_from_days(19_723), (2024, 1, 1));
    }

    #[test]
    fn latin1_roundtrip() {
        let s = latin1_to_string(&[0x41, 0x20, 0xE9]);
        assert_eq!(s, "A \u{e9}");
        assert_eq!(string_to_latin1(&s), vec![0x41, 0x20, 0xE9]);
        // non-Latin-1 degrades to '?'
        assert_eq!(string_to_latin1("a\u{4e00}b"), vec![b'a', b'?', b'b']);
    }

    #[test]
    fn today_is_sane() {
        let (y, m, d) = today_ymd();
        assert!(y >= 2024);
        assert!((1..=12).contains(&m));
        assert!((1..=31).contains(&d));
    }
}
