use crate::CameraParams;
use cgmath::{InnerSpace, SquareMatrix};
use std::f32::consts::FRAC_PI_2;
use winit::{
  dpi::PhysicalPosition,
  event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
  keyboard::{KeyCode, PhysicalKey},
};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

const MIN_DISTANCE: f32 = 0.5;
const MAX_DISTANCE: f32 = 500.0;
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// Perspective camera orbiting `target` on a sphere.
pub struct Camera {
  pub target: cgmath::Point3<f32>,
  pub yaw: f32,
  pub pitch: f32,
  pub distance: f32,
  pub aspect: f32,
  pub fovy: f32,
  pub znear: f32,
  pub zfar: f32,
}

impl Camera {
  /// Places the camera at `eye`, looking at the origin.
  pub fn looking_at_origin(eye: cgmath::Point3<f32>, aspect: f32) -> Self {
    let offset = eye - cgmath::Point3::new(0.0, 0.0, 0.0);
    let distance = offset.magnitude();
    Self {
      target: cgmath::Point3::new(0.0, 0.0, 0.0),
      yaw: offset.x.atan2(offset.z),
      pitch: (offset.y / distance).asin(),
      distance,
      aspect,
      fovy: 75.0,
      znear: 0.1,
      zfar: 1000.0,
    }
  }

  pub fn eye(&self) -> cgmath::Point3<f32> {
    let offset = cgmath::Vector3::new(
      self.distance * self.pitch.cos() * self.yaw.sin(),
      self.distance * self.pitch.sin(),
      self.distance * self.pitch.cos() * self.yaw.cos(),
    );
    self.target + offset
  }

  pub fn build_view_projection_matrix(&self) -> cgmath::Matrix4<f32> {
    let view = cgmath::Matrix4::look_at_rh(self.eye(), self.target, cgmath::Vector3::unit_y());
    let proj = cgmath::perspective(cgmath::Deg(self.fovy), self.aspect, self.znear, self.zfar);
    OPENGL_TO_WGPU_MATRIX * proj * view
  }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
  view_proj: [[f32; 4]; 4],
  viewport: [f32; 2],
  _padding: [f32; 2],
}

impl Default for CameraUniform {
  fn default() -> Self {
    Self::new()
  }
}

impl CameraUniform {
  pub fn new() -> Self {
    Self {
      view_proj: cgmath::Matrix4::identity().into(),
      viewport: [1.0, 1.0],
      _padding: [0.0; 2],
    }
  }

  pub fn update(&mut self, camera: &Camera, width: u32, height: u32) {
    self.view_proj = camera.build_view_projection_matrix().into();
    self.viewport = [width.max(1) as f32, height.max(1) as f32];
  }
}

/// Orbit controls with damping: left drag rotates, wheel zooms, WASD/QE from the keyboard.
pub struct CameraController {
  params: CameraParams,
  yaw_velocity: f32,
  pitch_velocity: f32,
  zoom_velocity: f32,
  dragging: bool,
  last_cursor: Option<PhysicalPosition<f64>>,
  is_forward_pressed: bool,
  is_backward_pressed: bool,
  is_left_pressed: bool,
  is_right_pressed: bool,
  is_rotate_up_pressed: bool,
  is_rotate_down_pressed: bool,
}

impl CameraController {
  pub fn init(params: CameraParams) -> Self {
    Self {
      params,
      yaw_velocity: 0.0,
      pitch_velocity: 0.0,
      zoom_velocity: 0.0,
      dragging: false,
      last_cursor: None,
      is_forward_pressed: false,
      is_backward_pressed: false,
      is_left_pressed: false,
      is_right_pressed: false,
      is_rotate_up_pressed: false,
      is_rotate_down_pressed: false,
    }
  }

  /// Returns true when the event was consumed.
  pub fn process_events(&mut self, event: &WindowEvent) -> bool {
    match event {
      WindowEvent::KeyboardInput {
        event:
          KeyEvent {
            state,
            physical_key: PhysicalKey::Code(keycode),
            ..
          },
        ..
      } => self.process_key(*keycode, *state == ElementState::Pressed),
      WindowEvent::MouseInput {
        state,
        button: MouseButton::Left,
        ..
      } => {
        self.set_dragging(*state == ElementState::Pressed);
        true
      }
      WindowEvent::CursorMoved { position, .. } => self.cursor_moved(*position),
      WindowEvent::MouseWheel { delta, .. } => {
        let lines = match delta {
          MouseScrollDelta::LineDelta(_, y) => *y,
          MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.1,
        };
        self.scroll(lines);
        true
      }
      _ => false,
    }
  }

  pub fn process_key(&mut self, keycode: KeyCode, is_pressed: bool) -> bool {
    match keycode {
      KeyCode::KeyW | KeyCode::ArrowUp => {
        self.is_forward_pressed = is_pressed;
        true
      }
      KeyCode::KeyA | KeyCode::ArrowLeft => {
        self.is_left_pressed = is_pressed;
        true
      }
      KeyCode::KeyS | KeyCode::ArrowDown => {
        self.is_backward_pressed = is_pressed;
        true
      }
      KeyCode::KeyD | KeyCode::ArrowRight => {
        self.is_right_pressed = is_pressed;
        true
      }
      KeyCode::KeyQ => {
        self.is_rotate_up_pressed = is_pressed;
        true
      }
      KeyCode::KeyE => {
        self.is_rotate_down_pressed = is_pressed;
        true
      }
      _ => false,
    }
  }

  pub fn is_dragging(&self) -> bool {
    self.dragging
  }

  /// Starts or ends a left-button drag. Releases must arrive even when the GUI owns the pointer.
  pub fn set_dragging(&mut self, pressed: bool) {
    self.dragging = pressed;
    if !pressed {
      self.last_cursor = None;
    }
  }

  /// Rotates by the cursor delta while dragging; returns whether the move was used.
  pub fn cursor_moved(&mut self, position: PhysicalPosition<f64>) -> bool {
    if !self.dragging {
      return false;
    }
    if let Some(last) = self.last_cursor {
      self.drag((position.x - last.x) as f32, (position.y - last.y) as f32);
    }
    self.last_cursor = Some(position);
    true
  }

  /// Feeds a cursor delta in pixels.
  pub fn drag(&mut self, dx: f32, dy: f32) {
    self.yaw_velocity -= dx * self.params.rotate_speed;
    self.pitch_velocity += dy * self.params.rotate_speed;
  }

  /// Feeds wheel lines; positive zooms in.
  pub fn scroll(&mut self, lines: f32) {
    self.zoom_velocity -= lines * self.params.zoom_speed;
  }

  /// Applies held keys and accumulated motion, then decays the motion.
  pub fn update_camera(&mut self, camera: &mut Camera) {
    let key_speed = self.params.key_speed;
    if self.is_forward_pressed {
      self.zoom_velocity -= key_speed;
    }
    if self.is_backward_pressed {
      self.zoom_velocity += key_speed;
    }
    if self.is_left_pressed {
      self.yaw_velocity -= key_speed;
    }
    if self.is_right_pressed {
      self.yaw_velocity += key_speed;
    }
    if self.is_rotate_up_pressed {
      self.pitch_velocity += key_speed;
    }
    if self.is_rotate_down_pressed {
      self.pitch_velocity -= key_speed;
    }

    let damping = self.params.damping;
    camera.yaw += self.yaw_velocity * damping;
    camera.pitch = (camera.pitch + self.pitch_velocity * damping).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    camera.distance =
      (camera.distance * (1.0 + self.zoom_velocity * damping)).clamp(MIN_DISTANCE, MAX_DISTANCE);

    let decay = 1.0 - damping;
    self.yaw_velocity *= decay;
    self.pitch_velocity *= decay;
    self.zoom_velocity *= decay;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn camera() -> Camera {
    Camera::looking_at_origin(cgmath::Point3::new(0.0, 5.0, 5.0), 16.0 / 9.0)
  }

  #[test]
  fn test_looking_at_origin_recovers_eye() {
    let cam = camera();
    let eye = cam.eye();
    assert!(eye.x.abs() < 1e-5);
    assert!((eye.y - 5.0).abs() < 1e-5);
    assert!((eye.z - 5.0).abs() < 1e-5);
  }

  #[test]
  fn test_drag_motion_decays() {
    let mut cam = camera();
    let mut controller = CameraController::init(CameraParams::default());
    controller.drag(100.0, 0.0);
    let start = cam.yaw;
    controller.update_camera(&mut cam);
    let first_step = (cam.yaw - start).abs();
    assert!(first_step > 0.0);

    let before = cam.yaw;
    controller.update_camera(&mut cam);
    let second_step = (cam.yaw - before).abs();
    assert!(second_step < first_step);

    for _ in 0..1000 {
      controller.update_camera(&mut cam);
    }
    let settled = cam.yaw;
    controller.update_camera(&mut cam);
    assert!((cam.yaw - settled).abs() < 1e-6);
  }

  #[test]
  fn test_pitch_and_distance_clamped() {
    let mut cam = camera();
    let mut controller = CameraController::init(CameraParams::default());
    controller.drag(0.0, 1e6);
    controller.scroll(-1e6);
    controller.update_camera(&mut cam);
    assert!(cam.pitch <= PITCH_LIMIT);
    assert_eq!(cam.distance, MAX_DISTANCE);

    controller.scroll(1e9);
    controller.update_camera(&mut cam);
    assert_eq!(cam.distance, MIN_DISTANCE);
  }

  #[test]
  fn test_released_drag_stops_rotation() {
    let mut cam = camera();
    let mut controller = CameraController::init(CameraParams::default());
    controller.set_dragging(true);
    assert!(controller.cursor_moved(PhysicalPosition::new(100.0, 100.0)));
    controller.set_dragging(false);
    assert!(!controller.is_dragging());

    let yaw = cam.yaw;
    assert!(!controller.cursor_moved(PhysicalPosition::new(400.0, 100.0)));
    controller.update_camera(&mut cam);
    assert_eq!(cam.yaw, yaw);
  }

  #[test]
  fn test_new_drag_ignores_stale_cursor() {
    let mut cam = camera();
    let mut controller = CameraController::init(CameraParams::default());
    controller.set_dragging(true);
    controller.cursor_moved(PhysicalPosition::new(0.0, 0.0));
    controller.set_dragging(false);
    controller.set_dragging(true);
    // first move of a new drag only records the anchor
    controller.cursor_moved(PhysicalPosition::new(500.0, 0.0));
    let yaw = cam.yaw;
    controller.update_camera(&mut cam);
    assert_eq!(cam.yaw, yaw);
  }

  #[test]
  fn test_unhandled_key_not_consumed() {
    let mut controller = CameraController::init(CameraParams::default());
    assert!(!controller.process_key(KeyCode::KeyZ, true));
    assert!(controller.process_key(KeyCode::KeyW, true));
  }
}
