/*!
  Numeric helpers shared by the commands.

  Every number in a program is an `f64`. Commands that need a whole number (cursor moves,
  character codes, parity) round *away from zero*: positive values are taken to their
  ceiling and negative values to their floor, so `2.2` becomes `3` and `-0.5` becomes `-1`.
*/

/// Significant digits used when a number is rendered as text.
const DISPLAY_PRECISION: i32 = 6;

pub fn round_away(value: f64) -> f64 {
  match value < 0.0 {
    true  => value.floor(),
    false => value.ceil()
  }
}

/// The parity of `value` after rounding away from zero: `0` for even, `1` for odd.
pub fn parity(value: f64) -> u8 {
  // `f64 % 2.0` keeps the sign of the dividend.
  match (round_away(value) % 2.0).abs() < 0.5 {
    true  => 0,
    false => 1
  }
}

/// Rounds away from zero and converts to a signed offset, saturating at the bounds of `i64`.
pub fn to_offset(value: f64) -> i64 {
  round_away(value) as i64
}

/**
  Renders a number the way a default-configured output stream does: six significant digits,
  fixed notation for moderate magnitudes, scientific notation with at least two exponent digits
  otherwise, and no trailing zeros in either case.

  ```text
  250        -> "250"
  0.5        -> "0.5"
  1.0 / 3.0  -> "0.333333"
  1234567.0  -> "1.23457e+06"
  0.00001    -> "1e-05"
  ```
*/
pub fn format_general(value: f64) -> String {
  if value.is_nan() {
    return "nan".to_string();
  }
  if value.is_infinite() {
    return match value < 0.0 {
      true  => "-inf".to_string(),
      false => "inf".to_string()
    };
  }
  if value == 0.0 {
    return match value.is_sign_negative() {
      true  => "-0".to_string(),
      false => "0".to_string()
    };
  }

  // Rounding to the display precision can carry into the next power of ten, so the exponent
  // is read off the rounded scientific rendering rather than computed from the raw value.
  let scientific = format!("{:.*e}", (DISPLAY_PRECISION - 1) as usize, value);
  let (mantissa, exponent) = match scientific.split_once('e') {
    Some(parts) => parts,
    None        => return scientific
  };
  let exponent: i32 = exponent.parse().unwrap_or(0);

  if exponent < -4 || exponent >= DISPLAY_PRECISION {
    let sign = match exponent < 0 {
      true  => '-',
      false => '+'
    };
    format!("{}e{}{:02}", strip_trailing_zeros(mantissa), sign, exponent.abs())
  } else {
    let decimals = (DISPLAY_PRECISION - 1 - exponent) as usize;
    strip_trailing_zeros(&format!("{:.*}", decimals, value)).to_string()
  }
}

fn strip_trailing_zeros(text: &str) -> &str {
  match text.contains('.') {
    true  => text.trim_end_matches('0').trim_end_matches('.'),
    false => text
  }
}
