//! Binary `numeric` wire format.
//!
//! Header: `ndigits: i16`, `weight: i16`, `sign: u16`, `dscale: u16`, then
//! `ndigits` base-10000 digits as `i16`. `weight` is the power of 10000 of
//! the first digit.

use bytes::{BufMut, BytesMut};
use serde_json::Number;
use std::error::Error;
use tokio_postgres::types::{FromSql, Type};

type BoxError = Box<dyn Error + Sync + Send>;

const NUMERIC_POS: u16 = 0x0000;
const NUMERIC_NEG: u16 = 0x4000;
const NUMERIC_NAN: u16 = 0xC000;

/// A `numeric` column read as a [`Number`].
///
/// Integral values that fit `i64`/`u64` stay exact; anything else goes
/// through `f64`.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Numeric(pub(super) Number);

impl<'a> FromSql<'a> for Numeric {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        let text = decode(raw)?;
        number_from_decimal(&text).map(Numeric)
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}

/// Plain decimal text of `n`, never in exponent form.
pub(super) fn decimal_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => f.to_string(),
        _ => n.to_string(),
    }
}

/// Encode a plain decimal string (`-12.034`) as binary `numeric`.
pub(super) fn encode(text: &str, out: &mut BytesMut) -> Result<(), BoxError> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if int_part.is_empty() && frac_part.is_empty()
        || !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit())
    {
        return Err(format!("'{text}' is not a decimal number").into());
    }

    let int_part = int_part.trim_start_matches('0');
    let dscale = u16::try_from(frac_part.len())?;

    let int_digits = format!("{}{int_part}", "0".repeat((4 - int_part.len() % 4) % 4));
    let frac_digits = format!("{frac_part}{}", "0".repeat((4 - frac_part.len() % 4) % 4));

    let mut groups: Vec<i16> = int_digits
        .as_bytes()
        .chunks(4)
        .chain(frac_digits.as_bytes().chunks(4))
        .map(|chunk| chunk.iter().fold(0i16, |acc, b| acc * 10 + i16::from(b - b'0')))
        .collect();
    let mut weight = i16::try_from(int_digits.len() / 4)? - 1;

    let leading = groups.iter().take_while(|g| **g == 0).count();
    groups.drain(..leading);
    weight -= i16::try_from(leading)?;
    while groups.last() == Some(&0) {
        groups.pop();
    }
    if groups.is_empty() {
        weight = 0;
    }

    let sign = if negative && !groups.is_empty() {
        NUMERIC_NEG
    } else {
        NUMERIC_POS
    };

    out.put_i16(i16::try_from(groups.len())?);
    out.put_i16(weight);
    out.put_u16(sign);
    out.put_u16(dscale);
    for g in groups {
        out.put_i16(g);
    }
    Ok(())
}

/// Decode binary `numeric` into plain decimal text with `dscale` fraction digits.
fn decode(raw: &[u8]) -> Result<String, BoxError> {
    let read_u16 = |at: usize| -> Result<u16, BoxError> {
        raw.get(at..at + 2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .ok_or_else(|| "truncated numeric value".into())
    };

    let ndigits = read_u16(0)? as i16;
    let weight = read_u16(2)? as i16;
    let sign = read_u16(4)?;
    let dscale = usize::from(read_u16(6)?);

    if sign != NUMERIC_POS && sign != NUMERIC_NEG {
        let what = if sign == NUMERIC_NAN { "NaN" } else { "infinite" };
        return Err(format!("{what} numeric has no number representation").into());
    }

    let digits = (0..usize::try_from(ndigits)?)
        .map(|i| read_u16(8 + i * 2).map(|d| d as i16))
        .collect::<Result<Vec<_>, _>>()?;
    let digit_at = |idx: i32| -> i16 {
        usize::try_from(idx)
            .ok()
            .and_then(|i| digits.get(i).copied())
            .unwrap_or(0)
    };

    let mut text = String::new();
    if sign == NUMERIC_NEG {
        text.push('-');
    }

    let weight = i32::from(weight);
    if weight < 0 {
        text.push('0');
    } else {
        text.push_str(&digit_at(0).to_string());
        for idx in 1..=weight {
            text.push_str(&format!("{:04}", digit_at(idx)));
        }
    }

    if dscale > 0 {
        let mut frac = String::with_capacity(dscale + 4);
        let mut idx = weight + 1;
        while frac.len() < dscale {
            frac.push_str(&format!("{:04}", digit_at(idx)));
            idx += 1;
        }
        frac.truncate(dscale);
        text.push('.');
        text.push_str(&frac);
    }
    Ok(text)
}

fn number_from_decimal(text: &str) -> Result<Number, BoxError> {
    if !text.contains('.') {
        if let Ok(i) = text.parse::<i64>() {
            return Ok(Number::from(i));
        }
        if let Ok(u) = text.parse::<u64>() {
            return Ok(Number::from(u));
        }
    }
    let f: f64 = text.parse()?;
    Number::from_f64(f).ok_or_else(|| format!("numeric {text} is out of f64 range").into())
}
