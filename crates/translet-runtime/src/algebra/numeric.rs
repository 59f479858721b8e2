//! Number parsing, formatting and the XPath 1.0 number functions.
use core::fmt::Write as _;

use crate::algebra::strings::is_xml_whitespace;
use crate::consts::{MAX_FRACTION_DIGITS, PLAIN_NUMBER_LOWER_BOUND, PLAIN_NUMBER_UPPER_BOUND};

/// Reusable scratch space for number formatting.
///
/// One buffer per execution context (or worker); never shared between threads.
#[derive(Debug, Default, Clone)]
pub struct FormatBuffer {
    buf: String,
}

impl FormatBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Format `d` into the buffer and borrow the result until the next call.
    pub fn format(&mut self, d: f64) -> &str {
        self.buf.clear();
        write_number(&mut self.buf, d);
        &self.buf
    }
}

/// XPath `string()` of a number. Allocates; use a [`FormatBuffer`] in hot loops.
pub fn format_number(d: f64) -> String {
    let mut out = String::new();
    write_number(&mut out, d);
    out
}

pub fn write_number(out: &mut String, d: f64) {
    if d.is_nan() {
        out.push_str("NaN");
        return;
    }
    if d.is_infinite() {
        out.push_str(if d > 0.0 { "Infinity" } else { "-Infinity" });
        return;
    }
    let m = d.abs();
    if (PLAIN_NUMBER_LOWER_BOUND..PLAIN_NUMBER_UPPER_BOUND).contains(&m) {
        // shortest round-trip digits, `1.0` prints as `1`
        let _ = write!(out, "{d}");
        strip_zero_fraction(out);
    } else {
        write_wide(out, d + 0.0);
    }
}

/// Non-exponent rendering for very small and very large magnitudes.
fn write_wide(out: &mut String, d: f64) {
    let start = out.len();
    let _ = write!(out, "{d}");
    if let Some(dot) = out[start..].find('.') {
        let frac_start = start + dot + 1;
        if out.len() - frac_start > MAX_FRACTION_DIGITS {
            out.truncate(frac_start + MAX_FRACTION_DIGITS);
            while out.ends_with('0') {
                out.pop();
            }
        }
    }
    strip_zero_fraction(out);
    if &out[start..] == "-0" {
        out.replace_range(start.., "0");
    }
}

fn strip_zero_fraction(out: &mut String) {
    if out.ends_with(".0") {
        out.truncate(out.len() - 2);
    }
}

/// XPath `number()` of a string: optional whitespace, optional `-`, digits with an optional
/// fraction. Anything else (exponents, `+`, `Infinity`) yields NaN, never an error.
pub fn parse_number(s: &str) -> f64 {
    let t = s.trim_matches(is_xml_whitespace);
    let body = t.strip_prefix('-').unwrap_or(t);
    let mut digits = 0usize;
    let mut dots = 0usize;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => dots += 1,
            _ => return f64::NAN,
        }
    }
    if digits == 0 || dots > 1 {
        return f64::NAN;
    }
    t.parse::<f64>().unwrap_or(f64::NAN)
}

/// XPath `round()`: half rounds towards positive infinity; NaN, infinities and both zeros
/// are returned unchanged, and values in `[-0.5, 0)` round to negative zero.
pub fn round(d: f64) -> f64 {
    if d.is_nan() || d.is_infinite() || d == 0.0 {
        d
    } else if d < -0.5 || d > 0.0 {
        (d + 0.5).floor()
    } else {
        -0.0
    }
}

pub fn floor(d: f64) -> f64 {
    d.floor()
}

pub fn ceiling(d: f64) -> f64 {
    d.ceil()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1.0, "1")]
    #[case(-1.0, "-1")]
    #[case(0.5, "0.5")]
    #[case(123.456, "123.456")]
    #[case(0.001, "0.001")]
    #[case(9_999_999.0, "9999999")]
    #[case(10_000_000.0, "10000000")]
    #[case(1e20, "100000000000000000000")]
    #[case(0.0001, "0.0001")]
    #[case(1.5e-7, "0.00000015")]
    #[case(0.0, "0")]
    #[case(-0.0, "0")]
    fn formats_without_exponent(#[case] d: f64, #[case] expected: &str) {
        assert_eq!(format_number(d), expected);
    }

    #[test]
    fn formats_special_values() {
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn smallest_subnormal_stays_within_fraction_limit() {
        let s = format_number(f64::from_bits(1));
        assert!(s.starts_with("0.000"));
        assert!(s.len() - 2 <= MAX_FRACTION_DIGITS);
    }

    #[test]
    fn buffer_is_reused() {
        let mut b = FormatBuffer::new();
        assert_eq!(b.format(2.5), "2.5");
        assert_eq!(b.format(3.0), "3");
    }

    #[rstest]
    #[case("42", 42.0)]
    #[case("  -3.5\n", -3.5)]
    #[case(".5", 0.5)]
    #[case("5.", 5.0)]
    fn parses_xpath_numbers(#[case] s: &str, #[case] expected: f64) {
        assert_eq!(parse_number(s), expected);
    }

    #[rstest]
    #[case("")]
    #[case("abc")]
    #[case("1e5")]
    #[case("+1")]
    #[case("Infinity")]
    #[case("1.2.3")]
    #[case("-")]
    #[case(".")]
    fn malformed_numbers_are_nan(#[case] s: &str) {
        assert!(parse_number(s).is_nan());
    }

    #[test]
    fn round_follows_xpath_rules() {
        assert_eq!(round(2.5), 3.0);
        assert_eq!(round(-2.5), -2.0);
        assert_eq!(round(1.4), 1.0);
        assert!(round(-0.3).is_sign_negative());
        assert_eq!(round(-0.3), 0.0);
        assert!(round(f64::NAN).is_nan());
        assert_eq!(round(f64::INFINITY), f64::INFINITY);
    }
}
