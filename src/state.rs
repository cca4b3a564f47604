use crate::camera::{Camera, CameraController, CameraUniform};
use crate::error::{AppError, GpuError};
use crate::galaxy::Galaxy;
use crate::gui::{EguiIntegration, PanelAction, ParamsPanel};
use crate::initialize::{create_galaxy, RngSource};
use crate::render::{ParticleRenderable, Render};
use crate::scene::Scene;
use crate::{CameraParams, GalaxyParams};
use rand::{rngs::SmallRng, SeedableRng};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::{
  application::ApplicationHandler,
  dpi::{LogicalSize, PhysicalSize},
  event::{ElementState, KeyEvent, MouseButton, WindowEvent},
  event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
  keyboard::{KeyCode, PhysicalKey},
  window::{Window, WindowId},
};

/// Messages into the event loop from the panel and the Ctrl-C handler.
#[derive(Debug, Clone, Copy)]
pub enum UserEvent {
  Regenerate(GalaxyParams),
  Shutdown,
}

/// Everything tied to the window and GPU device.
struct Viewer {
  window: Arc<Window>,
  surface: wgpu::Surface<'static>,
  config: wgpu::SurfaceConfiguration,
  device: wgpu::Device,
  queue: wgpu::Queue,
  camera: Camera,
  camera_uniform: CameraUniform,
  camera_buffer: wgpu::Buffer,
  camera_bind_group: wgpu::BindGroup,
  camera_controller: CameraController,
  render: Render,
  egui: EguiIntegration,
  panel: ParamsPanel,
  scene: Scene<ParticleRenderable>,
  minimized: bool,
}

impl Viewer {
  async fn init(window: Arc<Window>, params: GalaxyParams) -> Result<Self, GpuError> {
    let size = window.inner_size();
    let width = size.width.max(1);
    let height = size.height.max(1);

    let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
      #[cfg(not(target_arch = "wasm32"))]
      backends: wgpu::Backends::PRIMARY,
      ..Default::default()
    });
    let surface = instance.create_surface(window.clone())?;

    let adapter = instance
      .request_adapter(&wgpu::RequestAdapterOptions {
        power_preference: wgpu::PowerPreference::default(),
        compatible_surface: Some(&surface),
        force_fallback_adapter: false,
      })
      .await
      .ok_or(GpuError::NoAdapter)?;
    log::info!("using adapter {}", adapter.get_info().name);

    let (device, queue) = adapter
      .request_device(
        &wgpu::DeviceDescriptor {
          label: None,
          required_features: wgpu::Features::empty(),
          required_limits: wgpu::Limits::default(),
          memory_hints: Default::default(),
        },
        None,
      )
      .await?;

    let mut config = surface
      .get_default_config(&adapter, width, height)
      .ok_or(GpuError::NoSurfaceConfig)?;
    // egui and the point shader both write display-ready values
    let view_format = config.format.remove_srgb_suffix();
    config.view_formats.push(view_format);
    surface.configure(&device, &config);

    let camera = Camera::looking_at_origin(
      (0.0, 5.0, 5.0).into(),
      width as f32 / height as f32,
    );
    let mut camera_uniform = CameraUniform::new();
    camera_uniform.update(&camera, width, height);

    let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("Camera Buffer"),
      contents: bytemuck::cast_slice(&[camera_uniform]),
      usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });
    let camera_bind_group_layout =
      device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
          binding: 0,
          visibility: wgpu::ShaderStages::VERTEX,
          ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
          },
          count: None,
        }],
        label: Some("camera_bind_group_layout"),
      });
    let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
      layout: &camera_bind_group_layout,
      entries: &[wgpu::BindGroupEntry {
        binding: 0,
        resource: camera_buffer.as_entire_binding(),
      }],
      label: Some("camera_bind_group"),
    });

    let render = Render::init(view_format, &device, &camera_bind_group_layout);
    let egui = EguiIntegration::new(&device, view_format, &window);

    Ok(Self {
      window,
      surface,
      config,
      device,
      queue,
      camera,
      camera_uniform,
      camera_buffer,
      camera_bind_group,
      camera_controller: CameraController::init(CameraParams::default()),
      render,
      egui,
      panel: ParamsPanel::new(params),
      scene: Scene::new(),
      minimized: false,
    })
  }

  fn resize(&mut self, size: PhysicalSize<u32>) {
    let Some((width, height)) = surface_extent(size) else {
      // minimized; keep the last config and stop drawing until restored
      self.minimized = true;
      log::debug!("window minimized");
      return;
    };
    let restored = self.minimized;
    self.minimized = false;
    self.config.width = width;
    self.config.height = height;
    self.surface.configure(&self.device, &self.config);
    self.camera.aspect = width as f32 / height as f32;
    log::debug!("resized to {width}x{height}");
    if restored {
      self.window.request_redraw();
    }
  }

  fn acquire(&mut self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
    match self.surface.get_current_texture() {
      Ok(frame) => Ok(frame),
      Err(wgpu::SurfaceError::Timeout) => {
        log::warn!("surface timed out, retrying");
        self.surface.get_current_texture()
      }
      Err(e @ (wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost)) => {
        log::warn!("surface {e}, reconfiguring");
        self.surface.configure(&self.device, &self.config);
        self.surface.get_current_texture()
      }
      Err(e @ wgpu::SurfaceError::OutOfMemory) => Err(e),
    }
  }

  /// Draws the particles and the panel; returns what the panel asked for.
  fn redraw(&mut self) -> Result<Option<PanelAction>, wgpu::SurfaceError> {
    self.camera_controller.update_camera(&mut self.camera);
    self
      .camera_uniform
      .update(&self.camera, self.config.width, self.config.height);
    self.queue.write_buffer(
      &self.camera_buffer,
      0,
      bytemuck::cast_slice(&[self.camera_uniform]),
    );

    let frame = self.acquire()?;
    let view = frame.texture.create_view(&wgpu::TextureViewDescriptor {
      format: Some(self.config.view_formats[0]),
      ..wgpu::TextureViewDescriptor::default()
    });
    let mut encoder = self
      .device
      .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None });

    self
      .render
      .draw(&mut encoder, &view, &self.camera_bind_group, &self.scene);

    let panel = &mut self.panel;
    let mut action = None;
    let output = self.egui.run(&self.window, |ctx| action = panel.show(ctx));
    let screen_descriptor = egui_wgpu::ScreenDescriptor {
      size_in_pixels: [self.config.width, self.config.height],
      pixels_per_point: self.egui.ctx.pixels_per_point(),
    };
    let egui_commands = self.egui.paint(
      &self.device,
      &self.queue,
      &mut encoder,
      &view,
      output,
      &screen_descriptor,
    );

    self
      .queue
      .submit(egui_commands.into_iter().chain(Some(encoder.finish())));
    frame.present();
    Ok(action)
  }
}

pub struct App {
  params: GalaxyParams,
  proxy: EventLoopProxy<UserEvent>,
  galaxy: Galaxy<RngSource<SmallRng>>,
  viewer: Option<Viewer>,
  error: Option<AppError>,
}

impl App {
  pub fn new(params: GalaxyParams, seed: Option<u64>, proxy: EventLoopProxy<UserEvent>) -> Self {
    Self {
      params,
      proxy,
      galaxy: Galaxy::new(RngSource::new(seeded_rng(seed))),
      viewer: None,
      error: None,
    }
  }

  fn regenerate(&mut self, params: GalaxyParams) {
    self.params = params;
    let Some(viewer) = self.viewer.as_mut() else {
      return;
    };
    let Viewer {
      render,
      device,
      scene,
      panel,
      ..
    } = viewer;
    self.galaxy.generate(scene, &params, |buffer, params| {
      render.upload(device, buffer, params)
    });
    panel.set_live_count(params.count);
  }

  fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
    log::error!("{error}");
    self.error = Some(error);
    event_loop.exit();
  }
}

impl ApplicationHandler<UserEvent> for App {
  fn resumed(&mut self, event_loop: &ActiveEventLoop) {
    if self.viewer.is_some() {
      return;
    }
    let attributes = Window::default_attributes()
      .with_title("Galaxy")
      .with_inner_size(LogicalSize::new(1280, 720));
    let window = match event_loop.create_window(attributes) {
      Ok(window) => Arc::new(window),
      Err(e) => return self.fail(event_loop, e.into()),
    };
    match pollster::block_on(Viewer::init(window.clone(), self.params)) {
      Ok(viewer) => self.viewer = Some(viewer),
      Err(e) => return self.fail(event_loop, e.into()),
    }
    self.regenerate(self.params);
    window.request_redraw();
  }

  fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
    let Some(viewer) = self.viewer.as_mut() else {
      return;
    };
    if window_id != viewer.window.id() {
      return;
    }
    let consumed = viewer.egui.on_window_event(&viewer.window, &event);
    // a drag that ends over the panel still has to end for the camera
    if let WindowEvent::MouseInput {
      state: ElementState::Released,
      button: MouseButton::Left,
      ..
    } = event
    {
      viewer.camera_controller.set_dragging(false);
    }

    match event {
      WindowEvent::CloseRequested => event_loop.exit(),
      WindowEvent::Resized(size) => viewer.resize(size),
      WindowEvent::RedrawRequested if viewer.minimized => {}
      WindowEvent::RedrawRequested => {
        match viewer.redraw() {
          Ok(Some(PanelAction::Commit(params))) => {
            if self.proxy.send_event(UserEvent::Regenerate(params)).is_err() {
              log::warn!("event loop closed, dropping regeneration");
            }
          }
          Ok(None) => {}
          Err(e) => {
            log::error!("render failed: {e}");
            event_loop.exit();
            return;
          }
        }
        viewer.window.request_redraw();
      }
      _ if !consumed => {
        if !viewer.camera_controller.process_events(&event) && is_escape(&event) {
          event_loop.exit();
        }
      }
      _ => {}
    }
  }

  fn user_event(&mut self, event_loop: &ActiveEventLoop, event: UserEvent) {
    match event {
      UserEvent::Regenerate(params) => self.regenerate(params),
      UserEvent::Shutdown => {
        log::info!("shutting down");
        event_loop.exit();
      }
    }
  }

  fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
    if let Some(viewer) = self.viewer.as_mut() {
      viewer.scene.clear();
    }
  }
}

fn is_escape(event: &WindowEvent) -> bool {
  matches!(
    event,
    WindowEvent::KeyboardInput {
      event: KeyEvent {
        state: ElementState::Pressed,
        physical_key: PhysicalKey::Code(KeyCode::Escape),
        ..
      },
      ..
    }
  )
}

/// Drawable extent for a window size, or `None` while either side is zero.
fn surface_extent(size: PhysicalSize<u32>) -> Option<(u32, u32)> {
  (size.width > 0 && size.height > 0).then_some((size.width, size.height))
}

fn seeded_rng(seed: Option<u64>) -> SmallRng {
  match seed {
    Some(seed) => SmallRng::seed_from_u64(seed),
    None => SmallRng::from_entropy(),
  }
}

/// Opens the viewer, or with `headless` generates once and logs a summary.
pub fn run(params: GalaxyParams, seed: Option<u64>, headless: bool) -> Result<(), AppError> {
  let params = params.clamped();
  if headless {
    summarize(&params, seed);
    return Ok(());
  }

  let event_loop = EventLoop::<UserEvent>::with_user_event().build()?;
  let shutdown = event_loop.create_proxy();
  ctrlc::set_handler(move || {
    let _ = shutdown.send_event(UserEvent::Shutdown);
  })?;

  let mut app = App::new(params, seed, event_loop.create_proxy());
  event_loop.run_app(&mut app)?;
  match app.error.take() {
    Some(e) => Err(e),
    None => Ok(()),
  }
}

/// Extent of one generated galaxy, as logged in headless mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
  pub particles: usize,
  pub max_radius: f32,
  pub max_height: f32,
}

pub fn summary(params: &GalaxyParams, seed: Option<u64>) -> Summary {
  let mut source = RngSource::new(seeded_rng(seed));
  let buffer = create_galaxy(params, &mut source);

  let mut max_radius = 0.0f32;
  let mut max_height = 0.0f32;
  for i in 0..buffer.len() {
    let [x, y, z] = buffer.position(i);
    max_radius = max_radius.max((x * x + z * z).sqrt());
    max_height = max_height.max(y.abs());
  }
  Summary {
    particles: buffer.len(),
    max_radius,
    max_height,
  }
}

fn summarize(params: &GalaxyParams, seed: Option<u64>) {
  let summary = summary(params, seed);
  log::info!(
    "{} particles, {} branches, spin {}, colors {} -> {}",
    summary.particles,
    params.branches,
    params.spin,
    params.inside_color,
    params.outside_color
  );
  log::info!(
    "max planar radius {:.3}, max height {:.3}",
    summary.max_radius,
    summary.max_height
  );
}
