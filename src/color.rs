use crate::error::ColorParseError;
use std::fmt;
use std::str::FromStr;

/// Linear RGB triple with channels in [0, 1].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rgb {
  pub r: f32,
  pub g: f32,
  pub b: f32,
}

impl Rgb {
  pub const fn new(r: f32, g: f32, b: f32) -> Self {
    Self { r, g, b }
  }

  /// Builds a color from a packed `0xRRGGBB` value.
  pub fn from_hex(hex: u32) -> Self {
    Self::from_bytes([(hex >> 16) as u8, (hex >> 8) as u8, hex as u8])
  }

  pub fn to_hex(self) -> u32 {
    let [r, g, b] = self.to_bytes();
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
  }

  pub fn from_bytes(bytes: [u8; 3]) -> Self {
    Self {
      r: f32::from(bytes[0]) / 255.0,
      g: f32::from(bytes[1]) / 255.0,
      b: f32::from(bytes[2]) / 255.0,
    }
  }

  pub fn to_bytes(self) -> [u8; 3] {
    let quantize = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    [quantize(self.r), quantize(self.g), quantize(self.b)]
  }

  /// Per-channel linear interpolation, `self` at `t = 0` and `other` at `t = 1`.
  #[must_use]
  pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
    Rgb {
      r: self.r + (other.r - self.r) * t,
      g: self.g + (other.g - self.g) * t,
      b: self.b + (other.b - self.b) * t,
    }
  }

  pub fn to_array(self) -> [f32; 3] {
    [self.r, self.g, self.b]
  }
}

impl fmt::Display for Rgb {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{:06x}", self.to_hex())
  }
}

impl FromStr for Rgb {
  type Err = ColorParseError;

  /// Accepts `#rrggbb`, `0xrrggbb` or bare `rrggbb`.
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let trimmed = s.trim();
    let digits = trimmed
      .strip_prefix('#')
      .or_else(|| trimmed.strip_prefix("0x"))
      .or_else(|| trimmed.strip_prefix("0X"))
      .unwrap_or(trimmed);
    if digits.len() != 6 {
      return Err(ColorParseError::Length(digits.len()));
    }
    let hex = u32::from_str_radix(digits, 16).map_err(|_| ColorParseError::Digits(s.to_string()))?;
    Ok(Rgb::from_hex(hex))
  }
}
