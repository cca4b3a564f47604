pub mod camera;
pub mod color;
pub mod error;
pub mod galaxy;
pub mod gui;
pub mod initialize;
pub mod render;
pub mod scene;
pub mod state;

pub use color::Rgb;
use std::ops::RangeInclusive;

pub const COUNT_RANGE: RangeInclusive<u32> = 1..=100_000;
pub const SIZE_RANGE: RangeInclusive<f32> = 0.01..=3.0;
pub const RADIUS_RANGE: RangeInclusive<f32> = 1.0..=30.0;
pub const BRANCHES_RANGE: RangeInclusive<u32> = 1..=10;
pub const SPIN_RANGE: RangeInclusive<f32> = -10.0..=10.0;
pub const RANDOMNESS_RANGE: RangeInclusive<f32> = 0.0..=2.0;
pub const RANDOMNESS_POWER_RANGE: RangeInclusive<f32> = 1.0..=5.0;

/// Everything the generator reads. Always fully defined.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GalaxyParams {
  pub count: u32,
  /// Point size; only the renderer reads it.
  pub size: f32,
  pub radius: f32,
  pub branches: u32,
  /// Radians of twist per unit radius.
  pub spin: f32,
  pub randomness: f32,
  pub randomness_power: f32,
  pub inside_color: Rgb,
  pub outside_color: Rgb,
}

impl Default for GalaxyParams {
  fn default() -> Self {
    Self {
      count: 4000,
      size: 0.01,
      radius: 5.0,
      branches: 3,
      spin: 1.0,
      randomness: 1.0,
      randomness_power: 3.0,
      inside_color: Rgb::from_hex(0xd80d62),
      outside_color: Rgb::from_hex(0x7d00f2),
    }
  }
}

impl GalaxyParams {
  /// Clamps every field into the range the panel exposes.
  #[must_use]
  pub fn clamped(self) -> Self {
    let clamp_rgb = |c: Rgb| Rgb::new(c.r.clamp(0.0, 1.0), c.g.clamp(0.0, 1.0), c.b.clamp(0.0, 1.0));
    Self {
      count: self.count.clamp(*COUNT_RANGE.start(), *COUNT_RANGE.end()),
      size: self.size.clamp(*SIZE_RANGE.start(), *SIZE_RANGE.end()),
      radius: self.radius.clamp(*RADIUS_RANGE.start(), *RADIUS_RANGE.end()),
      branches: self.branches.clamp(*BRANCHES_RANGE.start(), *BRANCHES_RANGE.end()),
      spin: self.spin.clamp(*SPIN_RANGE.start(), *SPIN_RANGE.end()),
      randomness: self.randomness.clamp(*RANDOMNESS_RANGE.start(), *RANDOMNESS_RANGE.end()),
      randomness_power: self
        .randomness_power
        .clamp(*RANDOMNESS_POWER_RANGE.start(), *RANDOMNESS_POWER_RANGE.end()),
      inside_color: clamp_rgb(self.inside_color),
      outside_color: clamp_rgb(self.outside_color),
    }
  }
}

/// Two parallel flat arrays of `3 * count` floats: xyz positions and rgb colors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleBuffer {
  pub positions: Vec<f32>,
  pub colors: Vec<f32>,
}

impl ParticleBuffer {
  pub fn with_capacity(count: usize) -> Self {
    Self {
      positions: Vec::with_capacity(count * 3),
      colors: Vec::with_capacity(count * 3),
    }
  }

  pub fn push(&mut self, pos: [f32; 3], color: [f32; 3]) {
    self.positions.extend_from_slice(&pos);
    self.colors.extend_from_slice(&color);
  }

  /// Number of particles.
  pub fn len(&self) -> usize {
    self.positions.len() / 3
  }

  pub fn is_empty(&self) -> bool {
    self.positions.is_empty()
  }

  pub fn position(&self, i: usize) -> [f32; 3] {
    [self.positions[i * 3], self.positions[i * 3 + 1], self.positions[i * 3 + 2]]
  }

  pub fn color(&self, i: usize) -> [f32; 3] {
    [self.colors[i * 3], self.colors[i * 3 + 1], self.colors[i * 3 + 2]]
  }
}

pub struct CameraParams {
  pub rotate_speed: f32,
  pub zoom_speed: f32,
  pub key_speed: f32,
  pub damping: f32,
}

impl Default for CameraParams {
  fn default() -> Self {
    Self {
      rotate_speed: 0.005,
      zoom_speed: 0.1,
      key_speed: 0.02,
      damping: 0.05,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_are_within_ranges() {
    let params = GalaxyParams::default();
    assert_eq!(params.clamped(), params);
  }

  #[test]
  fn test_clamped_pulls_fields_into_range() {
    let params = GalaxyParams {
      count: 0,
      size: 10.0,
      radius: 0.0,
      branches: 0,
      spin: -50.0,
      randomness: -1.0,
      randomness_power: 0.5,
      inside_color: Rgb::new(1.5, -0.5, 0.5),
      ..GalaxyParams::default()
    }
    .clamped();
    assert_eq!(params.count, 1);
    assert_eq!(params.size, 3.0);
    assert_eq!(params.radius, 1.0);
    assert_eq!(params.branches, 1);
    assert_eq!(params.spin, -10.0);
    assert_eq!(params.randomness, 0.0);
    assert_eq!(params.randomness_power, 1.0);
    assert_eq!(params.inside_color, Rgb::new(1.0, 0.0, 0.5));
  }

  #[test]
  fn test_particle_buffer_accessors() {
    let mut buffer = ParticleBuffer::with_capacity(2);
    buffer.push([1.0, 2.0, 3.0], [0.1, 0.2, 0.3]);
    buffer.push([4.0, 5.0, 6.0], [0.4, 0.5, 0.6]);
    assert_eq!(buffer.len(), 2);
    assert_eq!(buffer.positions.len(), 6);
    assert_eq!(buffer.position(1), [4.0, 5.0, 6.0]);
    assert_eq!(buffer.color(0), [0.1, 0.2, 0.3]);
  }
}
