//! Regenerates the displayed galaxy, keeping exactly one particle set live.

use crate::initialize::{create_galaxy, RandomSource};
use crate::scene::{Dispose, ObjectId, Scene};
use crate::{GalaxyParams, ParticleBuffer};
use std::time::Instant;

pub struct Galaxy<S> {
  source: S,
  current: Option<ObjectId>,
}

impl<S: RandomSource> Galaxy<S> {
  pub fn new(source: S) -> Self {
    Self {
      source,
      current: None,
    }
  }

  /// The object installed by the last call to [`Galaxy::generate`].
  pub fn current(&self) -> Option<ObjectId> {
    self.current
  }

  /// Disposes the previous particle set, then builds and installs a new one from `params`.
  pub fn generate<R, F>(&mut self, scene: &mut Scene<R>, params: &GalaxyParams, build: F) -> ObjectId
  where
    R: Dispose,
    F: FnOnce(&ParticleBuffer, &GalaxyParams) -> R,
  {
    if let Some(previous) = self.current.take().and_then(|id| scene.remove(id)) {
      log::debug!("disposing previous galaxy");
      previous.dispose();
    }

    let start = Instant::now();
    let buffer = create_galaxy(params, &mut self.source);
    let id = scene.add(build(&buffer, params));
    self.current = Some(id);
    log::info!(
      "generated {} particles across {} branches in {:.2?}",
      buffer.len(),
      params.branches,
      start.elapsed()
    );
    id
  }
}
