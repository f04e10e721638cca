//! Permissive conversion of attribute text into typed values.
//!
//! None of these functions fail: text that is not understood yields the
//! caller-supplied default.

use std::{collections::BTreeMap, time::Duration};


/// Interpret `text` as a boolean.
///
/// `true`, `1`, `yes`, `on` are true and `false`, `0`, `no`, `off` and the
/// empty string are false (case-insensitive, surrounding whitespace ignored).
/// Anything else returns `default`.
pub fn to_boolean(text: &str, default: bool) -> bool {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" | "" => false,
        _ => default,
    }
}


/// Split text like `10MB` into its amount and its (uppercased) unit.
fn split_amount(text: &str) -> Option<(u64, String)> {
    let text = text.trim();
    let digits_end = text
        .find(|character: char| !character.is_ascii_digit())
        .unwrap_or(text.len());

    if digits_end == 0 {
        return None;
    }

    let amount = text[..digits_end].parse::<u64>().ok()?;
    let unit = text[digits_end..].trim().to_ascii_uppercase();

    Some((amount, unit))
}


/// Interpret `text` as a byte size, e.g. `512`, `10K`, `20MB`, `1g`.
///
/// Units are 1024-based. Unrecognized text (or an overflowing amount) returns `default`.
pub fn to_bytes(text: &str, default: u64) -> u64 {
    let Some((amount, unit)) = split_amount(text) else {
        return default;
    };

    let unit = match unit.as_str() {
        "B" => "",
        other => other.strip_suffix('B').unwrap_or(other),
    };

    let multiplier: u64 = match unit {
        "" => 1,
        "K" => 1 << 10,
        "M" => 1 << 20,
        "G" => 1 << 30,
        "T" => 1 << 40,
        _ => return default,
    };

    amount.checked_mul(multiplier).unwrap_or(default)
}


/// Interpret `text` as a duration, e.g. `30S`, `15I`, `2W`, `1Y`.
///
/// Units: `S` seconds, `I` minutes, `H` hours, `D` days, `W` weeks,
/// `M` months of 31 days, `Y` years of 365 days. A unit is required.
pub fn to_duration(text: &str, default: Duration) -> Duration {
    let Some((amount, unit)) = split_amount(text) else {
        return default;
    };

    let seconds_per_unit: u64 = match unit.as_str() {
        "S" => 1,
        "I" => 60,
        "H" => 60 * 60,
        "D" => 24 * 60 * 60,
        "W" => 7 * 24 * 60 * 60,
        "M" => 31 * 24 * 60 * 60,
        "Y" => 365 * 24 * 60 * 60,
        _ => return default,
    };

    amount
        .checked_mul(seconds_per_unit)
        .map(Duration::from_secs)
        .unwrap_or(default)
}


/// Collapse name/value pairs into a map; the last occurrence of a name wins.
pub fn to_key_value_map<I, K, V>(pairs: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}
