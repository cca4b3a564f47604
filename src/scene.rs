/// Releases resources held outside Rust ownership (GPU buffers).
pub trait Dispose {
  fn dispose(self);
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectId(u64);

/// The set of renderables currently drawn. Ids are never reused.
pub struct Scene<R> {
  objects: Vec<(ObjectId, R)>,
  next_id: u64,
}

impl<R> Default for Scene<R> {
  fn default() -> Self {
    Self::new()
  }
}

impl<R> Scene<R> {
  pub fn new() -> Self {
    Self {
      objects: Vec::new(),
      next_id: 0,
    }
  }

  pub fn add(&mut self, object: R) -> ObjectId {
    let id = ObjectId(self.next_id);
    self.next_id += 1;
    self.objects.push((id, object));
    id
  }

  /// Takes the object out of the scene; the caller decides how to release it.
  pub fn remove(&mut self, id: ObjectId) -> Option<R> {
    let index = self.objects.iter().position(|(oid, _)| *oid == id)?;
    Some(self.objects.remove(index).1)
  }

  pub fn get(&self, id: ObjectId) -> Option<&R> {
    self.objects.iter().find(|(oid, _)| *oid == id).map(|(_, o)| o)
  }

  pub fn len(&self) -> usize {
    self.objects.len()
  }

  pub fn is_empty(&self) -> bool {
    self.objects.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &R> {
    self.objects.iter().map(|(_, o)| o)
  }
}

impl<R: Dispose> Scene<R> {
  /// Removes and disposes every object.
  pub fn clear(&mut self) {
    for (_, object) in self.objects.drain(..) {
      object.dispose();
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_add_remove() {
    let mut scene = Scene::new();
    let a = scene.add("a");
    let b = scene.add("b");
    assert_ne!(a, b);
    assert_eq!(scene.len(), 2);
    assert_eq!(scene.remove(a), Some("a"));
    assert_eq!(scene.remove(a), None);
    assert_eq!(scene.get(b), Some(&"b"));
    assert_eq!(scene.iter().copied().collect::<Vec<_>>(), vec!["b"]);
  }

  #[test]
  fn test_ids_not_reused() {
    let mut scene = Scene::new();
    let a = scene.add(1);
    scene.remove(a);
    let b = scene.add(2);
    assert_ne!(a, b);
    assert!(scene.get(a).is_none());
  }
}
