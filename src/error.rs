//! Error types for galaxy-gen.
//!
//! The generator itself cannot fail. These cover color parsing on the
//! command line and window/GPU setup.

use std::fmt;

/// Errors from parsing a hex color string.
#[derive(Debug)]
pub enum ColorParseError {
  /// Expected exactly six hex digits after the optional prefix.
  Length(usize),
  /// The digits were not valid hexadecimal.
  Digits(String),
}

impl fmt::Display for ColorParseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ColorParseError::Length(n) => write!(f, "expected 6 hex digits, found {}", n),
      ColorParseError::Digits(s) => write!(f, "invalid hex color: {}", s),
    }
  }
}

impl std::error::Error for ColorParseError {}

/// Setup failures between opening the window and drawing the first frame.
#[derive(Debug)]
pub enum GpuError {
  /// The window could not back a wgpu surface.
  Surface(wgpu::CreateSurfaceError),
  /// No adapter can present to the window's surface.
  NoAdapter,
  /// The adapter refused a device with default limits.
  Device(wgpu::RequestDeviceError),
  /// The adapter offered no configuration for the surface.
  NoSurfaceConfig,
}

impl fmt::Display for GpuError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GpuError::Surface(e) => write!(f, "cannot draw to window: {}", e),
      GpuError::NoAdapter => write!(f, "no graphics adapter can present to this window"),
      GpuError::Device(e) => write!(f, "graphics device request failed: {}", e),
      GpuError::NoSurfaceConfig => write!(f, "adapter has no configuration for the window surface"),
    }
  }
}

impl std::error::Error for GpuError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      GpuError::Surface(e) => Some(e),
      GpuError::Device(e) => Some(e),
      GpuError::NoAdapter | GpuError::NoSurfaceConfig => None,
    }
  }
}

impl From<wgpu::CreateSurfaceError> for GpuError {
  fn from(e: wgpu::CreateSurfaceError) -> Self {
    GpuError::Surface(e)
  }
}

impl From<wgpu::RequestDeviceError> for GpuError {
  fn from(e: wgpu::RequestDeviceError) -> Self {
    GpuError::Device(e)
  }
}

/// Errors that end the application.
#[derive(Debug)]
pub enum AppError {
  /// Failed to create or run the event loop.
  EventLoop(winit::error::EventLoopError),
  /// Failed to create the window.
  Window(winit::error::OsError),
  /// GPU initialization failed.
  Gpu(GpuError),
  /// Installing the Ctrl-C handler failed.
  Signal(ctrlc::Error),
}

impl fmt::Display for AppError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AppError::EventLoop(e) => write!(f, "Event loop error: {}", e),
      AppError::Window(e) => write!(f, "Failed to create window: {}", e),
      AppError::Gpu(e) => write!(f, "GPU error: {}", e),
      AppError::Signal(e) => write!(f, "Failed to install Ctrl-C handler: {}", e),
    }
  }
}

impl std::error::Error for AppError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      AppError::EventLoop(e) => Some(e),
      AppError::Window(e) => Some(e),
      AppError::Gpu(e) => Some(e),
      AppError::Signal(e) => Some(e),
    }
  }
}

impl From<winit::error::EventLoopError> for AppError {
  fn from(e: winit::error::EventLoopError) -> Self {
    AppError::EventLoop(e)
  }
}

impl From<winit::error::OsError> for AppError {
  fn from(e: winit::error::OsError) -> Self {
    AppError::Window(e)
  }
}

impl From<GpuError> for AppError {
  fn from(e: GpuError) -> Self {
    AppError::Gpu(e)
  }
}

impl From<ctrlc::Error> for AppError {
  fn from(e: ctrlc::Error) -> Self {
    AppError::Signal(e)
  }
}
