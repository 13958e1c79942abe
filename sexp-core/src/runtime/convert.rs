//! Element conversion rules of the reference runtime.
//!
//! These are the runtime's coercion semantics, not the marshaling layer's:
//! NA maps to NA, out-of-range integers become NA, out-of-range raw bytes
//! become 0, and text is parsed leniently with NA on failure.

use num_complex::Complex64;

use super::Scalar;
use crate::types::{is_na_real, na_real, Logical, NA_INTEGER};

fn na_complex() -> Complex64 {
    Complex64::new(na_real(), na_real())
}

pub(crate) fn to_logical(value: &Scalar) -> Logical {
    match value {
        Scalar::Logical(v) => *v,
        Scalar::Integer(v) if *v == NA_INTEGER => Logical::Na,
        Scalar::Integer(v) => Logical::from(*v != 0),
        Scalar::Numeric(v) if v.is_nan() => Logical::Na,
        Scalar::Numeric(v) => Logical::from(*v != 0.0),
        Scalar::Complex(z) if z.re.is_nan() || z.im.is_nan() => Logical::Na,
        Scalar::Complex(z) => Logical::from(z.re != 0.0 || z.im != 0.0),
        Scalar::Character(Some(s)) => match s.as_str() {
            "TRUE" | "true" | "T" | "True" => Logical::True,
            "FALSE" | "false" | "F" | "False" => Logical::False,
            _ => Logical::Na,
        },
        Scalar::Character(None) => Logical::Na,
        Scalar::Raw(v) => Logical::from(*v != 0),
        Scalar::Handle(_) => Logical::Na,
    }
}

fn integer_from_real(x: f64) -> i32 {
    // i32::MIN is NA, so it is out of range as a value.
    if x.is_nan() || x >= 2_147_483_648.0 || x <= -2_147_483_648.0 {
        NA_INTEGER
    } else {
        x.trunc() as i32
    }
}

pub(crate) fn to_integer(value: &Scalar) -> i32 {
    match value {
        Scalar::Logical(Logical::Na) => NA_INTEGER,
        Scalar::Logical(v) => i32::from(*v == Logical::True),
        Scalar::Integer(v) => *v,
        Scalar::Numeric(v) => integer_from_real(*v),
        Scalar::Complex(z) if z.im.is_nan() => NA_INTEGER,
        Scalar::Complex(z) => integer_from_real(z.re),
        Scalar::Character(Some(s)) => parse_number(s).map_or(NA_INTEGER, integer_from_real),
        Scalar::Character(None) => NA_INTEGER,
        Scalar::Raw(v) => i32::from(*v),
        Scalar::Handle(_) => NA_INTEGER,
    }
}

pub(crate) fn to_numeric(value: &Scalar) -> f64 {
    match value {
        Scalar::Logical(Logical::Na) => na_real(),
        Scalar::Logical(v) => f64::from(u8::from(*v == Logical::True)),
        Scalar::Integer(v) if *v == NA_INTEGER => na_real(),
        Scalar::Integer(v) => f64::from(*v),
        Scalar::Numeric(v) => *v,
        Scalar::Complex(z) if z.re.is_nan() || z.im.is_nan() => na_real(),
        Scalar::Complex(z) => z.re,
        Scalar::Character(Some(s)) => parse_number(s).unwrap_or_else(na_real),
        Scalar::Character(None) => na_real(),
        Scalar::Raw(v) => f64::from(*v),
        Scalar::Handle(_) => na_real(),
    }
}

pub(crate) fn to_complex(value: &Scalar) -> Complex64 {
    match value {
        Scalar::Logical(Logical::Na) => na_complex(),
        Scalar::Integer(v) if *v == NA_INTEGER => na_complex(),
        Scalar::Numeric(v) if is_na_real(*v) => na_complex(),
        Scalar::Complex(z) => *z,
        Scalar::Character(Some(s)) => parse_complex(s).unwrap_or_else(na_complex),
        Scalar::Character(None) | Scalar::Handle(_) => na_complex(),
        other => Complex64::new(to_numeric(other), 0.0),
    }
}

pub(crate) fn to_character(value: &Scalar) -> Option<String> {
    match value {
        Scalar::Logical(Logical::Na) => None,
        Scalar::Logical(v) => Some(v.to_string()),
        Scalar::Integer(v) if *v == NA_INTEGER => None,
        Scalar::Integer(v) => Some(v.to_string()),
        Scalar::Numeric(v) if is_na_real(*v) => None,
        Scalar::Numeric(v) => Some(format_real(*v)),
        Scalar::Complex(z) if is_na_real(z.re) || is_na_real(z.im) => None,
        Scalar::Complex(z) => Some(format_complex(*z)),
        Scalar::Character(v) => v.clone(),
        Scalar::Raw(v) => Some(format!("{:02x}", v)),
        Scalar::Handle(_) => None,
    }
}

pub(crate) fn to_raw(value: &Scalar) -> u8 {
    match value {
        Scalar::Raw(v) => *v,
        other => {
            let v = to_integer(other);
            u8::try_from(v).unwrap_or(0)
        }
    }
}

/// Parse a number the way the runtime reads text: trimmed, `NA` is missing,
/// `Inf`/`-Inf`/`NaN` and hex integers are accepted.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    let s = text.trim();
    match s {
        "" | "NA" => None,
        "Inf" | "inf" | "+Inf" => Some(f64::INFINITY),
        "-Inf" | "-inf" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ => {
            let (negative, digits) = match s.strip_prefix('-') {
                Some(rest) => (true, rest),
                None => (false, s.strip_prefix('+').unwrap_or(s)),
            };
            if let Some(hex) = digits
                .strip_prefix("0x")
                .or_else(|| digits.strip_prefix("0X"))
            {
                let v = i64::from_str_radix(hex, 16).ok()? as f64;
                return Some(if negative { -v } else { v });
            }
            s.parse::<f64>().ok()
        }
    }
}

/// Parse `a`, `bi`, or `a+bi` / `a-bi`.
fn parse_complex(text: &str) -> Option<Complex64> {
    let s = text.trim();
    if let Some(re) = parse_number(s) {
        return Some(Complex64::new(re, 0.0));
    }
    let body = s.strip_suffix('i')?;
    // Split at the last sign that is not a leading sign or an exponent sign.
    let bytes = body.as_bytes();
    let split = (1..bytes.len()).rev().find(|&i| {
        (bytes[i] == b'+' || bytes[i] == b'-') && !matches!(bytes[i - 1], b'e' | b'E')
    });
    match split {
        Some(i) => {
            let re = parse_number(&body[..i])?;
            let im = parse_number(&body[i..])?;
            Some(Complex64::new(re, im))
        }
        None => Some(Complex64::new(0.0, parse_number(body)?)),
    }
}

/// Format a double with at most 15 significant digits, switching to
/// scientific notation for very large or very small magnitudes.
pub(crate) fn format_real(x: f64) -> String {
    if x.is_nan() {
        return "NaN".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "Inf" } else { "-Inf" }.to_string();
    }
    if x == 0.0 {
        return "0".to_string();
    }
    let rounded: f64 = format!("{:.14e}", x).parse().unwrap_or(x);
    let magnitude = rounded.abs();
    if (1e-4..1e15).contains(&magnitude) {
        format!("{}", rounded)
    } else {
        let sci = format!("{:e}", rounded);
        match sci.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = match exp.strip_prefix('-') {
                    Some(d) => ('-', d),
                    None => ('+', exp),
                };
                format!("{}e{}{:0>2}", mantissa, sign, digits)
            }
            None => sci,
        }
    }
}

fn format_complex(z: Complex64) -> String {
    let im = format_real(z.im.abs());
    let sign = if z.im.is_sign_negative() && !z.im.is_nan() {
        '-'
    } else {
        '+'
    };
    format!("{}{}{}i", format_real(z.re), sign, im)
}
