use crate::parser::errors::{OpError, OpErrorKind, OpResult};
use num_bigint::{BigInt, Sign};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Number of decimal places of one coin, in minimal units.
pub const DEFAULT_DECIMAL_POINT: usize = 8;

///
/// Decimal amount exactly as it appeared in the node's JSON,
/// either as a number literal or a quoted string.
///
/// Relies on `serde_json/arbitrary_precision`, so `1.50000000` stays
/// `"1.50000000"` instead of passing through `f64`.
///
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JsonNumber(pub String);

impl JsonNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JsonNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for JsonNumber {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Number(n) => Ok(JsonNumber(n.to_string())),
            Value::String(s) => Ok(JsonNumber(s)),
            other => Err(de::Error::custom(format!(
                "expected decimal amount, got {}",
                other
            ))),
        }
    }
}

///
/// Converts between decimal coin amounts and integer minimal units
/// without going through floating point.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountParser {
    decimals: usize,
}

impl Default for AmountParser {
    fn default() -> Self {
        AmountParser::new(DEFAULT_DECIMAL_POINT)
    }
}

impl AmountParser {
    pub fn new(decimals: usize) -> AmountParser {
        AmountParser { decimals }
    }

    pub fn decimals(&self) -> usize {
        self.decimals
    }

    ///
    /// `"1.50000000"` -> `150000000`.
    ///
    /// Fractional digits beyond the decimal point of the chain are only
    /// accepted when they are zeros; anything else would lose value.
    ///
    pub fn amount_to_big_int(&self, amount: &str) -> OpResult<BigInt> {
        let s = amount.trim();
        let (sign, unsigned) = match s.as_bytes().first() {
            Some(b'-') => (Sign::Minus, &s[1..]),
            Some(b'+') => (Sign::Plus, &s[1..]),
            _ => (Sign::Plus, s),
        };
        let (int_part, frac_part) = match unsigned.find('.') {
            Some(i) => (&unsigned[..i], &unsigned[i + 1..]),
            None => (unsigned, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(format_error(amount, "no digits"));
        }
        if !is_digits(int_part) || !is_digits(frac_part) {
            return Err(format_error(amount, "not a decimal number"));
        }

        let mut digits = String::with_capacity(int_part.len() + self.decimals);
        digits.push_str(int_part);
        if frac_part.len() > self.decimals {
            let (kept, dropped) = frac_part.split_at(self.decimals);
            if dropped.bytes().any(|c| c != b'0') {
                return Err(format_error(amount, "precision out of range"));
            }
            digits.push_str(kept);
        } else {
            digits.push_str(frac_part);
            for _ in frac_part.len()..self.decimals {
                digits.push('0');
            }
        }

        let magnitude = BigInt::parse_bytes(digits.as_bytes(), 10)
            .ok_or_else(|| format_error(amount, "not a decimal number"))?;
        Ok(match sign {
            Sign::Minus => -magnitude,
            _ => magnitude,
        })
    }

    /// `150000000` -> `"1.5"`
    pub fn amount_to_decimal_string(&self, value: &BigInt) -> String {
        let (sign, magnitude) = value.clone().into_parts();
        let mut digits = magnitude.to_str_radix(10);
        if digits.len() <= self.decimals {
            digits = format!("{:0>width$}", digits, width = self.decimals + 1);
        }
        let point = digits.len() - self.decimals;
        let (int_part, frac_part) = digits.split_at(point);
        let frac_part = frac_part.trim_end_matches('0');
        let mut out = String::with_capacity(digits.len() + 2);
        if sign == Sign::Minus {
            out.push('-');
        }
        out.push_str(int_part);
        if !frac_part.is_empty() {
            out.push('.');
            out.push_str(frac_part);
        }
        out
    }
}

#[inline]
fn is_digits(s: &str) -> bool {
    s.bytes().all(|c| c.is_ascii_digit())
}

fn format_error(amount: &str, reason: &str) -> OpError {
    OpError::new(OpErrorKind::FormatError).join_msg(&format!("amount {:?}: {}", amount, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_int(s: &str) -> OpResult<BigInt> {
        AmountParser::default().amount_to_big_int(s)
    }

    #[test]
    fn test_amount_to_big_int() {
        assert_eq!(to_int("1.50000000").unwrap(), BigInt::from(150_000_000u64));
        assert_eq!(to_int("1.5").unwrap(), BigInt::from(150_000_000u64));
        assert_eq!(to_int("0.00000001").unwrap(), BigInt::from(1));
        assert_eq!(to_int("21000000").unwrap(), BigInt::from(2_100_000_000_000_000u64));
        assert_eq!(to_int(".1").unwrap(), BigInt::from(10_000_000));
        assert_eq!(to_int("-1").unwrap(), BigInt::from(-100_000_000));
        assert_eq!(to_int("0.100000000000").unwrap(), BigInt::from(10_000_000));
        assert_eq!(
            to_int("92233720368.54775808").unwrap(),
            BigInt::parse_bytes(b"9223372036854775808", 10).unwrap()
        );
    }

    #[test]
    fn test_amount_to_big_int_rejects() {
        for bad in &["", "-", ".", "abc", "1.2.3", "1e-5", "0x10", "1,5", "0.000000001"] {
            let err = to_int(bad).unwrap_err();
            assert_eq!(err.kind(), &OpErrorKind::FormatError, "input {:?}", bad);
        }
    }

    #[test]
    fn test_amount_to_decimal_string() {
        let p = AmountParser::default();
        assert_eq!(p.amount_to_decimal_string(&BigInt::from(150_000_000)), "1.5");
        assert_eq!(p.amount_to_decimal_string(&BigInt::from(1)), "0.00000001");
        assert_eq!(p.amount_to_decimal_string(&BigInt::from(0)), "0");
        assert_eq!(p.amount_to_decimal_string(&BigInt::from(-250_000_000)), "-2.5");
        assert_eq!(p.amount_to_decimal_string(&BigInt::from(4_200_000_000u64)), "42");
    }

    #[test]
    fn test_json_number() {
        let n: Vec<JsonNumber> = serde_json::from_str(r#"[1.50000000, "0.0001", 3]"#).unwrap();
        assert_eq!(n[0].as_str(), "1.50000000");
        assert_eq!(n[1].as_str(), "0.0001");
        assert_eq!(n[2].as_str(), "3");
        assert!(serde_json::from_str::<JsonNumber>("true").is_err());
    }
}
