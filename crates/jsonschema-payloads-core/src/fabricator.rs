//! Free-form string fabrication for unconstrained `string` schemas.

use chrono::{DateTime, SecondsFormat, Utc};
use fake::faker::internet::en::{DomainSuffix, IPv4, IPv6, SafeEmail, Username};
use fake::faker::lorem::en::{Word, Words};
use fake::Fake;
use rand::rngs::StdRng;
use rand::Rng;
use serde_json::Value;

use crate::error::FabricationError;

/// Produces one representative value for a `string` schema without `enum`.
///
/// Failures are recovered by the caller with a placeholder.
pub trait StringFabricator: Send + Sync {
    fn fabricate(&self, schema: &Value, rng: &mut StdRng) -> Result<String, FabricationError>;
}

/// Longest string the default fabricator will pad to.
const MAX_FABRICATED_LENGTH: u64 = 65_536;

/// 2000-01-01T00:00:00Z .. 2030-01-01T00:00:00Z
const TIMESTAMP_RANGE: std::ops::Range<i64> = 946_684_800..1_893_456_000;

/// Default [`StringFabricator`] backed by `fake`.
///
/// Understands the common `format`s and `minLength`/`maxLength`; rejects
/// `pattern` and unknown formats.
#[derive(Debug, Clone, Copy, Default)]
pub struct FakeStringFabricator;

impl StringFabricator for FakeStringFabricator {
    fn fabricate(&self, schema: &Value, rng: &mut StdRng) -> Result<String, FabricationError> {
        if let Some(pattern) = schema.get("pattern").and_then(Value::as_str) {
            return Err(FabricationError::UnsupportedPattern {
                pattern: pattern.to_string(),
            });
        }

        let min_length = schema.get("minLength").and_then(Value::as_u64).unwrap_or(0);
        let max_length = schema.get("maxLength").and_then(Value::as_u64);
        if min_length > MAX_FABRICATED_LENGTH {
            return Err(FabricationError::LengthTooLarge { min: min_length });
        }
        if let Some(max) = max_length {
            if min_length > max {
                return Err(FabricationError::InvalidLength {
                    min: min_length,
                    max,
                });
            }
        }

        match schema.get("format").and_then(Value::as_str) {
            Some(format) => fabricate_format(format, rng),
            None => {
                let words: Vec<String> = Words(1..4).fake_with_rng(rng);
                Ok(fit_length(words.join(" "), min_length, max_length))
            }
        }
    }
}

fn fabricate_format(format: &str, rng: &mut StdRng) -> Result<String, FabricationError> {
    let value = match format {
        "email" => SafeEmail().fake_with_rng(rng),
        "hostname" => hostname(rng),
        "uri" | "url" => {
            let host = hostname(rng);
            let user: String = Username().fake_with_rng(rng);
            format!("https://{host}/{user}")
        }
        "ipv4" => IPv4().fake_with_rng(rng),
        "ipv6" => IPv6().fake_with_rng(rng),
        "uuid" => uuid_v4(rng),
        "date" => timestamp(rng).format("%Y-%m-%d").to_string(),
        "time" => timestamp(rng).format("%H:%M:%S").to_string(),
        "date-time" => timestamp(rng).to_rfc3339_opts(SecondsFormat::Secs, true),
        other => {
            return Err(FabricationError::UnsupportedFormat {
                format: other.to_string(),
            })
        }
    };
    Ok(value)
}

fn hostname(rng: &mut StdRng) -> String {
    let word: String = Word().fake_with_rng(rng);
    let suffix: String = DomainSuffix().fake_with_rng(rng);
    format!("{word}.{suffix}")
}

fn timestamp(rng: &mut StdRng) -> DateTime<Utc> {
    DateTime::from_timestamp(rng.gen_range(TIMESTAMP_RANGE), 0).unwrap_or_default()
}

/// Random version-4 UUID in hyphenated form.
fn uuid_v4(rng: &mut StdRng) -> String {
    let mut bytes: [u8; 16] = rng.gen();
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

/// Pad with `x` or truncate (on char boundaries) to honour the length bounds.
fn fit_length(mut value: String, min: u64, max: Option<u64>) -> String {
    let len = value.chars().count() as u64;
    if len < min {
        value.extend(std::iter::repeat('x').take((min - len) as usize));
    }
    if let Some(max) = max {
        if value.chars().count() as u64 > max {
            value = value.chars().take(max as usize).collect();
        }
    }
    value
}
