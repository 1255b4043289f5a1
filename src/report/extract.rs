//! Typed extraction over classified free-text values.
//!
//! Stored values keep the classifier's raw string for audit fidelity; the
//! aggregation layer derives a typed `MetricValue` from it exactly once per
//! read, with one pattern rule per metric kind.

use regex::Regex;

/// A typed reading derived from a stored free-text value.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    /// First decimal number in the text, e.g. "Supermercado: $125.50" → 125.5.
    Amount(f64),
    /// "120/80" shaped reading.
    BloodPressure { systolic: u32, diastolic: u32 },
    /// Decimal with comma or dot, e.g. "37,5".
    Temperature(f64),
    /// Integer percent, e.g. "98%" or "98 por ciento".
    OxygenSaturation(u32),
    /// "8 horas" / "7,5 hs" shaped duration.
    SleepHours(f64),
    /// Nothing matched; the raw text is kept for the caller.
    Unrecognized(String),
}

/// Which pattern rule to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Amount,
    BloodPressure,
    Temperature,
    OxygenSaturation,
    SleepHours,
}

/// Run one pattern rule over a stored value.
pub fn extract_metric(kind: MetricKind, text: &str) -> MetricValue {
    let matched = match kind {
        MetricKind::Amount => first_amount(text).map(MetricValue::Amount),
        MetricKind::BloodPressure => blood_pressure(text)
            .map(|(systolic, diastolic)| MetricValue::BloodPressure { systolic, diastolic }),
        MetricKind::Temperature => temperature(text).map(MetricValue::Temperature),
        MetricKind::OxygenSaturation => {
            oxygen_saturation(text).map(MetricValue::OxygenSaturation)
        }
        MetricKind::SleepHours => sleep_hours(text).map(MetricValue::SleepHours),
    };
    matched.unwrap_or_else(|| MetricValue::Unrecognized(text.to_string()))
}

/// First decimal number in the text (dot decimals only, matching the
/// original amount rule).
pub fn first_amount(text: &str) -> Option<f64> {
    let re = Regex::new(r"(\d+(?:\.\d+)?)").unwrap();
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// First `NN/NN` pair.
pub fn blood_pressure(text: &str) -> Option<(u32, u32)> {
    let re = Regex::new(r"(\d+)/(\d+)").unwrap();
    let caps = re.captures(text)?;
    Some((caps[1].parse().ok()?, caps[2].parse().ok()?))
}

/// First decimal, accepting a comma or dot separator.
pub fn temperature(text: &str) -> Option<f64> {
    let re = Regex::new(r"(\d+(?:[.,]\d+)?)").unwrap();
    let raw = re.captures(text)?.get(1)?.as_str().replace(',', ".");
    raw.parse().ok()
}

/// First integer, optionally suffixed with `%` or "por ciento".
pub fn oxygen_saturation(text: &str) -> Option<u32> {
    let re = Regex::new(r"(\d+)(?:%|\s*por\s*ciento)?").unwrap();
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

/// Hours of sleep: a number followed by "horas" or "hs".
pub fn sleep_hours(text: &str) -> Option<f64> {
    let re = Regex::new(r"(\d+(?:[.,]\d+)?)\s*(?:horas|hs)").unwrap();
    let raw = re
        .captures(&text.to_lowercase())?
        .get(1)?
        .as_str()
        .replace(',', ".");
    raw.parse().ok()
}
