//! Human-readable sizes and durations

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid size format: {0}")]
    InvalidFormat(String),

    #[error("Invalid unit: {0}")]
    InvalidUnit(String),
}

/// Byte count that accepts either an integer or a string such as `"10MB"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawByteSize")]
pub struct ByteSize(pub u64);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawByteSize {
    Bytes(u64),
    Text(String),
}

impl TryFrom<RawByteSize> for ByteSize {
    type Error = ParseError;

    fn try_from(raw: RawByteSize) -> Result<Self, Self::Error> {
        match raw {
            RawByteSize::Bytes(n) => Ok(ByteSize(n)),
            RawByteSize::Text(s) => s.parse(),
        }
    }
}

impl ByteSize {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl FromStr for ByteSize {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, unit) = trimmed.split_at(split);

        let value: u64 = digits
            .parse()
            .map_err(|_| ParseError::InvalidFormat(s.to_string()))?;

        let multiplier: u64 = match unit.trim().to_ascii_uppercase().as_str() {
            "" | "B" => 1,
            "KB" | "K" => 1 << 10,
            "MB" | "M" => 1 << 20,
            "GB" | "G" => 1 << 30,
            other => return Err(ParseError::InvalidUnit(other.to_string())),
        };

        value
            .checked_mul(multiplier)
            .map(ByteSize)
            .ok_or_else(|| ParseError::InvalidFormat(s.to_string()))
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const UNITS: [(&str, u64); 3] = [("GB", 1 << 30), ("MB", 1 << 20), ("KB", 1 << 10)];

        for (unit, divisor) in UNITS {
            if self.0 >= divisor && self.0 % divisor == 0 {
                return write!(f, "{}{}", self.0 / divisor, unit);
            }
        }
        write!(f, "{}B", self.0)
    }
}

/// Format an elapsed duration as `850ns`, `12.5µs`, `312.042ms`, `1.204s` or `1m3.5s`.
///
/// Values are rounded to three fractional digits before the unit is picked,
/// so `999.9996ms` renders as `1s`, never `1000ms`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let nanos = elapsed.as_nanos();

    if nanos < 1_000 {
        return format!("{}ns", nanos);
    }

    // Thousandths of a microsecond are whole nanoseconds
    if nanos < 1_000_000 {
        return format!("{}µs", thousandths(nanos));
    }

    let micros = round_div(nanos, 1_000);
    if micros < 1_000_000 {
        return format!("{}ms", thousandths(micros));
    }

    let millis = round_div(nanos, 1_000_000);
    let minutes = millis / 60_000;
    let seconds = thousandths(millis % 60_000);
    if minutes == 0 {
        format!("{}s", seconds)
    } else {
        format!("{}m{}s", minutes, seconds)
    }
}

fn round_div(value: u128, divisor: u128) -> u128 {
    (value + divisor / 2) / divisor
}

/// Render `value / 1000` with trailing fractional zeros trimmed
fn thousandths(value: u128) -> String {
    let whole = value / 1_000;
    let fraction = value % 1_000;
    if fraction == 0 {
        return whole.to_string();
    }

    let digits = format!("{:03}", fraction);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// `serialize_with` helper rendering a [`Duration`] through [`format_elapsed`]
pub fn serialize_elapsed<S>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_elapsed(*elapsed))
}
