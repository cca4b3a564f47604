//! Parameter panel drawn with egui on top of the galaxy.

use crate::{
  GalaxyParams, Rgb, BRANCHES_RANGE, COUNT_RANGE, RADIUS_RANGE, RANDOMNESS_POWER_RANGE,
  RANDOMNESS_RANGE, SIZE_RANGE, SPIN_RANGE,
};
use std::sync::Arc;
use winit::window::Window;

/// Egui context, winit input state and wgpu renderer.
pub struct EguiIntegration {
  pub ctx: egui::Context,
  state: egui_winit::State,
  renderer: egui_wgpu::Renderer,
}

/// Tessellated output of one egui frame.
pub struct EguiFrameOutput {
  pub paint_jobs: Vec<egui::ClippedPrimitive>,
  pub textures_delta: egui::TexturesDelta,
}

impl EguiIntegration {
  pub fn new(device: &wgpu::Device, output_format: wgpu::TextureFormat, window: &Arc<Window>) -> Self {
    let ctx = egui::Context::default();
    ctx.set_visuals(egui::Visuals::dark());

    let state = egui_winit::State::new(
      ctx.clone(),
      egui::ViewportId::ROOT,
      window.as_ref(),
      Some(window.scale_factor() as f32),
      None,
      None,
    );
    let renderer = egui_wgpu::Renderer::new(device, output_format, None, 1, false);

    Self { ctx, state, renderer }
  }

  /// Returns true if egui consumed the event.
  pub fn on_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
    self.state.on_window_event(window, event).consumed
  }

  /// Runs `ui` for one frame and tessellates the result.
  pub fn run(&mut self, window: &Window, ui: impl FnMut(&egui::Context)) -> EguiFrameOutput {
    let raw_input = self.state.take_egui_input(window);
    let full_output = self.ctx.run(raw_input, ui);
    self
      .state
      .handle_platform_output(window, full_output.platform_output);
    let paint_jobs = self
      .ctx
      .tessellate(full_output.shapes, full_output.pixels_per_point);
    EguiFrameOutput {
      paint_jobs,
      textures_delta: full_output.textures_delta,
    }
  }

  /// Uploads textures and vertex data, then draws over `view` without clearing it.
  pub fn paint(
    &mut self,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    encoder: &mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    output: EguiFrameOutput,
    screen_descriptor: &egui_wgpu::ScreenDescriptor,
  ) -> Vec<wgpu::CommandBuffer> {
    for (id, image_delta) in &output.textures_delta.set {
      self.renderer.update_texture(device, queue, *id, image_delta);
    }
    let command_buffers =
      self
        .renderer
        .update_buffers(device, queue, encoder, &output.paint_jobs, screen_descriptor);

    {
      let rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("egui"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
          view,
          resolve_target: None,
          ops: wgpu::Operations {
            load: wgpu::LoadOp::Load,
            store: wgpu::StoreOp::Store,
          },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
      });
      let mut rpass = rpass.forget_lifetime();
      self
        .renderer
        .render(&mut rpass, &output.paint_jobs, screen_descriptor);
    }

    for id in &output.textures_delta.free {
      self.renderer.free_texture(id);
    }
    command_buffers
  }
}

/// What the panel asks the application to do after a frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PanelAction {
  Commit(GalaxyParams),
}

/// Holds the parameters being edited and releases them only when an interaction ends.
pub struct ParamsPanel {
  draft: GalaxyParams,
  dirty: bool,
  live_count: u32,
}

impl ParamsPanel {
  pub fn new(params: GalaxyParams) -> Self {
    Self {
      draft: params,
      dirty: false,
      live_count: 0,
    }
  }

  pub fn draft(&self) -> &GalaxyParams {
    &self.draft
  }

  /// Number of particles currently on screen, shown read-only.
  pub fn set_live_count(&mut self, count: u32) {
    self.live_count = count;
  }

  /// Records an edit to the draft.
  pub fn mark_dirty(&mut self) {
    self.dirty = true;
  }

  /// Emits the clamped draft once the pointer is released after an edit.
  pub fn settle(&mut self, pointer_down: bool) -> Option<PanelAction> {
    if self.dirty && !pointer_down {
      self.dirty = false;
      self.draft = self.draft.clamped();
      Some(PanelAction::Commit(self.draft))
    } else {
      None
    }
  }

  pub fn show(&mut self, ctx: &egui::Context) -> Option<PanelAction> {
    let mut regenerate = false;
    egui::Window::new("Galaxy")
      .default_pos([10.0, 10.0])
      .resizable(false)
      .show(ctx, |ui| {
        let changed = self.widgets(ui);
        if changed {
          self.mark_dirty();
        }
        ui.separator();
        ui.label(format!("Particles on screen: {}", self.live_count));
        regenerate = ui.button("Regenerate").clicked();
      });

    let pointer_down = ctx.input(|i| i.pointer.any_down());
    match self.settle(pointer_down) {
      Some(action) => Some(action),
      None if regenerate => Some(PanelAction::Commit(self.draft.clamped())),
      None => None,
    }
  }

  fn widgets(&mut self, ui: &mut egui::Ui) -> bool {
    let params = &mut self.draft;
    let mut changed = false;

    changed |= ui
      .add(
        egui::Slider::new(&mut params.count, COUNT_RANGE)
          .text("count")
          .logarithmic(true),
      )
      .changed();
    changed |= ui
      .add(
        egui::Slider::new(&mut params.size, SIZE_RANGE)
          .text("size")
          .step_by(0.01),
      )
      .changed();
    changed |= ui
      .add(
        egui::Slider::new(&mut params.radius, RADIUS_RANGE)
          .text("radius")
          .step_by(1.0),
      )
      .changed();
    changed |= ui
      .add(egui::Slider::new(&mut params.branches, BRANCHES_RANGE).text("branches"))
      .changed();
    changed |= ui
      .add(
        egui::Slider::new(&mut params.spin, SPIN_RANGE)
          .text("spin")
          .step_by(1.0),
      )
      .changed();
    changed |= ui
      .add(
        egui::Slider::new(&mut params.randomness, RANDOMNESS_RANGE)
          .text("randomness")
          .step_by(0.001),
      )
      .changed();
    changed |= ui
      .add(
        egui::Slider::new(&mut params.randomness_power, RANDOMNESS_POWER_RANGE)
          .text("randomness power")
          .step_by(0.01),
      )
      .changed();

    changed |= color_row(ui, "inside color", &mut params.inside_color);
    changed |= color_row(ui, "outside color", &mut params.outside_color);

    changed
  }
}

fn color_row(ui: &mut egui::Ui, label: &str, color: &mut Rgb) -> bool {
  ui.horizontal(|ui| {
    let mut bytes = color.to_bytes();
    let changed = ui.color_edit_button_srgb(&mut bytes).changed();
    ui.label(label);
    if changed {
      *color = Rgb::from_bytes(bytes);
    }
    changed
  })
  .inner
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_no_commit_without_edit() {
    let mut panel = ParamsPanel::new(GalaxyParams::default());
    assert_eq!(panel.settle(false), None);
  }

  #[test]
  fn test_commit_waits_for_pointer_release() {
    let mut panel = ParamsPanel::new(GalaxyParams::default());
    panel.mark_dirty();
    assert_eq!(panel.settle(true), None);
    assert_eq!(panel.settle(true), None);
    assert_eq!(
      panel.settle(false),
      Some(PanelAction::Commit(GalaxyParams::default()))
    );
    // only once per interaction
    assert_eq!(panel.settle(false), None);
  }

  #[test]
  fn test_commit_is_clamped() {
    let mut panel = ParamsPanel::new(GalaxyParams {
      count: 0,
      branches: 50,
      ..GalaxyParams::default()
    });
    panel.mark_dirty();
    match panel.settle(false) {
      Some(PanelAction::Commit(params)) => {
        assert_eq!(params.count, 1);
        assert_eq!(params.branches, 10);
        assert_eq!(*panel.draft(), params);
      }
      None => panic!("expected a commit"),
    }
  }
}
