//! Integer coercion for hand-edited specification documents.
//!
//! Day counts and week bounds accept JSON integers, floats (truncated toward
//! zero) and numeric strings. Negative or non-finite values are rejected.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};

pub fn whole<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(WholeVisitor)
}

struct WholeVisitor;

impl<'de> Visitor<'de> for WholeVisitor {
    type Value = u32;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a non-negative whole number")
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<u32, E> {
        u32::try_from(value).map_err(|_| E::custom(format!("{value} is too large")))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<u32, E> {
        if value < 0 {
            return Err(E::custom(format!("{value} must not be negative")));
        }
        self.visit_u64(value.unsigned_abs())
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<u32, E> {
        if !value.is_finite() {
            return Err(E::custom("non-finite number"));
        }
        let truncated = value.trunc();
        if truncated < 0.0 {
            return Err(E::custom(format!("{value} must not be negative")));
        }
        if truncated > f64::from(u32::MAX) {
            return Err(E::custom(format!("{value} is too large")));
        }
        // Range checked above.
        let whole = truncated as u32;
        Ok(whole)
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<u32, E> {
        let trimmed = value.trim();
        if let Ok(parsed) = trimmed.parse::<i64>() {
            return self.visit_i64(parsed);
        }
        match trimmed.parse::<f64>() {
            Ok(parsed) => self.visit_f64(parsed),
            Err(_) => Err(E::custom(format!("`{value}` is not a number"))),
        }
    }
}
