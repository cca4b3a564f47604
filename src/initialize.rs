use crate::{GalaxyParams, ParticleBuffer};
use rand::Rng;
use rand_distr::{Distribution, Uniform};
use std::f32::consts::PI;

/// The random draws the generator needs. Stubbed in tests to pin radius and jitter.
pub trait RandomSource {
  /// Uniform sample in `[0, max)`; returns 0 when `max <= 0`.
  fn uniform(&mut self, max: f32) -> f32;
  /// +1.0 or -1.0 with equal probability.
  fn sign(&mut self) -> f32;
}

/// Adapts any `rand` generator into a [`RandomSource`].
pub struct RngSource<R> {
  rng: R,
  unit: Uniform<f32>,
}

impl<R: Rng> RngSource<R> {
  pub fn new(rng: R) -> Self {
    Self {
      rng,
      unit: Uniform::new(0.0, 1.0),
    }
  }
}

impl<R: Rng> RandomSource for RngSource<R> {
  fn uniform(&mut self, max: f32) -> f32 {
    if max > 0.0 {
      self.unit.sample(&mut self.rng) * max
    } else {
      0.0
    }
  }

  fn sign(&mut self) -> f32 {
    if self.rng.gen_bool(0.5) {
      1.0
    } else {
      -1.0
    }
  }
}

/// Lays out `params.count` particles along `params.branches` spiral arms.
#[must_use]
pub fn create_galaxy<S: RandomSource + ?Sized>(params: &GalaxyParams, source: &mut S) -> ParticleBuffer {
  let count = params.count as usize;
  let mut buffer = ParticleBuffer::with_capacity(count);
  let branches = params.branches.max(1);

  for i in 0..params.count {
    let radius = source.uniform(params.radius);
    let branch_angle = (i % branches) as f32 / branches as f32 * 2.0 * PI;
    let spin_angle = radius * params.spin;
    let angle = branch_angle + spin_angle;

    let jitter_x = jitter(source, params);
    let jitter_y = jitter(source, params);
    let jitter_z = jitter(source, params);

    let pos = [
      angle.cos() * radius + jitter_x,
      jitter_y,
      angle.sin() * radius + jitter_z,
    ];

    // radius 0 collapses the gradient onto the inside color
    let t = if params.radius > 0.0 {
      (radius / params.radius).min(1.0)
    } else {
      0.0
    };
    let color = params.inside_color.lerp(params.outside_color, t);

    buffer.push(pos, color.to_array());
  }

  buffer
}

fn jitter<S: RandomSource + ?Sized>(source: &mut S, params: &GalaxyParams) -> f32 {
  (source.uniform(1.0) * params.randomness).powf(params.randomness_power) * source.sign()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Rgb;
  use rand::{rngs::StdRng, SeedableRng};

  /// Returns `max * fraction` for every draw and a fixed sign.
  struct Fixed {
    fraction: f32,
    sign: f32,
  }

  impl RandomSource for Fixed {
    fn uniform(&mut self, max: f32) -> f32 {
      max * self.fraction
    }

    fn sign(&mut self) -> f32 {
      self.sign
    }
  }

  /// Replays a scripted list of uniform fractions and signs.
  struct Scripted {
    fractions: Vec<f32>,
    signs: Vec<f32>,
  }

  impl RandomSource for Scripted {
    fn uniform(&mut self, max: f32) -> f32 {
      max * self.fractions.remove(0)
    }

    fn sign(&mut self) -> f32 {
      self.signs.remove(0)
    }
  }

  fn seeded() -> RngSource<StdRng> {
    RngSource::new(StdRng::seed_from_u64(7))
  }

  #[test]
  fn test_buffer_lengths_match_count() {
    for count in [1, 3, 1000] {
      let params = GalaxyParams {
        count,
        ..GalaxyParams::default()
      };
      let buffer = create_galaxy(&params, &mut seeded());
      assert_eq!(buffer.positions.len(), 3 * count as usize);
      assert_eq!(buffer.colors.len(), 3 * count as usize);
    }
  }

  #[test]
  fn test_zero_count_is_empty() {
    let params = GalaxyParams {
      count: 0,
      ..GalaxyParams::default()
    };
    let buffer = create_galaxy(&params, &mut seeded());
    assert!(buffer.is_empty());
    assert!(buffer.colors.is_empty());
  }

  #[test]
  fn test_colors_stay_in_unit_range() {
    let params = GalaxyParams {
      count: 5000,
      inside_color: Rgb::new(1.0, 0.0, 0.3),
      outside_color: Rgb::new(0.0, 1.0, 0.9),
      ..GalaxyParams::default()
    };
    let buffer = create_galaxy(&params, &mut seeded());
    assert!(buffer.colors.iter().all(|c| (0.0..=1.0).contains(c)));
  }

  #[test]
  fn test_base_distance_within_radius() {
    let params = GalaxyParams {
      count: 2000,
      radius: 7.5,
      randomness: 0.0,
      ..GalaxyParams::default()
    };
    let buffer = create_galaxy(&params, &mut seeded());
    for i in 0..buffer.len() {
      let [x, y, z] = buffer.position(i);
      assert_eq!(y, 0.0);
      assert!((x * x + z * z).sqrt() <= 7.5 + 1e-4);
    }
  }

  #[test]
  fn test_fixed_radius_single_arm() {
    let params = GalaxyParams {
      count: 1,
      branches: 1,
      spin: 0.0,
      radius: 5.0,
      randomness: 0.0,
      ..GalaxyParams::default()
    };
    let mut source = Fixed {
      fraction: 1.0,
      sign: 1.0,
    };
    let buffer = create_galaxy(&params, &mut source);
    let [x, y, z] = buffer.position(0);
    assert!((x - 5.0).abs() < 1e-6);
    assert_eq!(y, 0.0);
    assert!(z.abs() < 1e-6);
    // t = 1 lands on the outside color
    let outside = params.outside_color.to_array();
    for (c, e) in buffer.color(0).iter().zip(outside) {
      assert!((c - e).abs() < 1e-6);
    }
  }

  #[test]
  fn test_branches_assigned_round_robin() {
    let params = GalaxyParams {
      count: 8,
      branches: 4,
      spin: 0.0,
      radius: 2.0,
      randomness: 0.0,
      ..GalaxyParams::default()
    };
    let mut source = Fixed {
      fraction: 0.5,
      sign: 1.0,
    };
    let buffer = create_galaxy(&params, &mut source);
    let expected = [[1.0, 0.0], [0.0, 1.0], [-1.0, 0.0], [0.0, -1.0]];
    for i in 0..8 {
      let [x, _, z] = buffer.position(i);
      let [ex, ez] = expected[i % 4];
      assert!((x - ex).abs() < 1e-5, "particle {i}: x = {x}");
      assert!((z - ez).abs() < 1e-5, "particle {i}: z = {z}");
    }
  }

  #[test]
  fn test_spin_twists_with_radius() {
    let params = GalaxyParams {
      count: 1,
      branches: 1,
      spin: PI / 4.0,
      radius: 2.0,
      randomness: 0.0,
      ..GalaxyParams::default()
    };
    let mut source = Fixed {
      fraction: 1.0,
      sign: 1.0,
    };
    let buffer = create_galaxy(&params, &mut source);
    let [x, _, z] = buffer.position(0);
    // radius 2 * spin pi/4 = pi/2, so the particle sits on +z
    assert!(x.abs() < 1e-5);
    assert!((z - 2.0).abs() < 1e-5);
  }

  #[test]
  fn test_jitter_power_applies_before_sign() {
    let params = GalaxyParams {
      count: 1,
      branches: 1,
      spin: 0.0,
      radius: 1.0,
      randomness: 2.0,
      randomness_power: 2.0,
      ..GalaxyParams::default()
    };
    // radius draw 0, then unit draws for x, y, z
    let mut source = Scripted {
      fractions: vec![0.0, 0.5, 0.25, 0.75],
      signs: vec![-1.0, 1.0, -1.0],
    };
    let buffer = create_galaxy(&params, &mut source);
    let [x, y, z] = buffer.position(0);
    assert!((x - -1.0).abs() < 1e-6);
    assert!((y - 0.25).abs() < 1e-6);
    assert!((z - -2.25).abs() < 1e-6);
  }

  #[test]
  fn test_zero_radius_uses_inside_color() {
    let params = GalaxyParams {
      count: 50,
      radius: 0.0,
      randomness: 0.0,
      ..GalaxyParams::default()
    };
    let buffer = create_galaxy(&params, &mut seeded());
    for i in 0..buffer.len() {
      assert_eq!(buffer.position(i), [0.0, 0.0, 0.0]);
      assert_eq!(buffer.color(i), params.inside_color.to_array());
    }
  }

  #[test]
  fn test_rng_source_bounds() {
    let mut source = seeded();
    for _ in 0..1000 {
      let v = source.uniform(3.0);
      assert!((0.0..3.0).contains(&v));
      assert!(source.sign().abs() == 1.0);
    }
    assert_eq!(source.uniform(0.0), 0.0);
  }

  #[test]
  fn test_same_seed_same_galaxy() {
    let params = GalaxyParams::default();
    let a = create_galaxy(&params, &mut seeded());
    let b = create_galaxy(&params, &mut seeded());
    assert_eq!(a, b);
  }
}
