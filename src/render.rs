use crate::scene::{Dispose, Scene};
use crate::{GalaxyParams, ParticleBuffer};
use std::borrow::Cow;
use wgpu::{util::DeviceExt, PipelineCompilationOptions};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct MaterialUniform {
  size: f32,
  _padding: [f32; 3],
}

/// Two triangles forming a unit quad centred on the particle.
#[rustfmt::skip]
const QUAD_CORNERS: [f32; 12] = [
  -0.5, -0.5,
   0.5, -0.5,
   0.5,  0.5,
  -0.5, -0.5,
   0.5,  0.5,
  -0.5,  0.5,
];

/// One uploaded particle set: per-instance positions and colors plus its material.
pub struct ParticleRenderable {
  position_buffer: wgpu::Buffer,
  color_buffer: wgpu::Buffer,
  material_buffer: wgpu::Buffer,
  material_bind_group: wgpu::BindGroup,
  count: u32,
}

impl ParticleRenderable {
  pub fn count(&self) -> u32 {
    self.count
  }
}

impl Dispose for ParticleRenderable {
  fn dispose(self) {
    self.position_buffer.destroy();
    self.color_buffer.destroy();
    self.material_buffer.destroy();
  }
}

pub struct Render {
  render_pipeline: wgpu::RenderPipeline,
  material_bind_group_layout: wgpu::BindGroupLayout,
  vertices_buffer: wgpu::Buffer,
}

impl Render {
  #[must_use]
  pub fn init(
    format: wgpu::TextureFormat,
    device: &wgpu::Device,
    camera_bind_group_layout: &wgpu::BindGroupLayout,
  ) -> Self {
    let draw_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
      label: Some("Points Shader"),
      source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/points.wgsl"))),
    });

    let material_bind_group_layout =
      device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
          binding: 0,
          visibility: wgpu::ShaderStages::VERTEX,
          ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<MaterialUniform>() as _),
          },
          count: None,
        }],
        label: Some("material_bind_group_layout"),
      });

    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
      label: Some("render"),
      bind_group_layouts: &[camera_bind_group_layout, &material_bind_group_layout],
      push_constant_ranges: &[],
    });
    let position_buffer = wgpu::VertexBufferLayout {
      array_stride: 3 * 4,
      step_mode: wgpu::VertexStepMode::Instance,
      attributes: &wgpu::vertex_attr_array![0 => Float32x3],
    };
    let color_buffer = wgpu::VertexBufferLayout {
      array_stride: 3 * 4,
      step_mode: wgpu::VertexStepMode::Instance,
      attributes: &wgpu::vertex_attr_array![1 => Float32x3],
    };
    let vertex_buffer = wgpu::VertexBufferLayout {
      array_stride: 2 * 4,
      step_mode: wgpu::VertexStepMode::Vertex,
      attributes: &wgpu::vertex_attr_array![2 => Float32x2],
    };
    let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
      label: Some("Render Pipeline"),
      layout: Some(&render_pipeline_layout),
      vertex: wgpu::VertexState {
        module: &draw_shader,
        entry_point: "main_vs",
        compilation_options: PipelineCompilationOptions::default(),
        buffers: &[position_buffer, color_buffer, vertex_buffer],
      },
      fragment: Some(wgpu::FragmentState {
        module: &draw_shader,
        entry_point: "main_fs",
        compilation_options: PipelineCompilationOptions::default(),
        targets: &[Some(format.into())],
      }),
      primitive: wgpu::PrimitiveState::default(),
      depth_stencil: None,
      multisample: wgpu::MultisampleState::default(),
      multiview: None,
      cache: None,
    });

    let vertices_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("Quad Corner Buffer"),
      contents: bytemuck::cast_slice(&QUAD_CORNERS),
      usage: wgpu::BufferUsages::VERTEX,
    });

    Render {
      render_pipeline,
      material_bind_group_layout,
      vertices_buffer,
    }
  }

  /// Copies a generated particle set to the GPU.
  #[must_use]
  pub fn upload(
    &self,
    device: &wgpu::Device,
    buffer: &ParticleBuffer,
    params: &GalaxyParams,
  ) -> ParticleRenderable {
    let position_buffer = instance_buffer(device, "Particle Positions", &buffer.positions);
    let color_buffer = instance_buffer(device, "Particle Colors", &buffer.colors);

    let material = MaterialUniform {
      size: params.size,
      _padding: [0.0; 3],
    };
    let material_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
      label: Some("Material Buffer"),
      contents: bytemuck::cast_slice(&[material]),
      usage: wgpu::BufferUsages::UNIFORM,
    });
    let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
      layout: &self.material_bind_group_layout,
      entries: &[wgpu::BindGroupEntry {
        binding: 0,
        resource: material_buffer.as_entire_binding(),
      }],
      label: Some("material_bind_group"),
    });

    ParticleRenderable {
      position_buffer,
      color_buffer,
      material_buffer,
      material_bind_group,
      count: buffer.len() as u32,
    }
  }

  /// Clears the target and draws every particle set in the scene.
  pub fn draw(
    &self,
    encoder: &mut wgpu::CommandEncoder,
    view: &wgpu::TextureView,
    camera_bind_group: &wgpu::BindGroup,
    scene: &Scene<ParticleRenderable>,
  ) {
    let color_attachments = [Some(wgpu::RenderPassColorAttachment {
      view,
      resolve_target: None,
      ops: wgpu::Operations {
        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
        store: wgpu::StoreOp::Store,
      },
    })];
    let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
      label: Some("Particles"),
      color_attachments: &color_attachments,
      depth_stencil_attachment: None,
      timestamp_writes: None,
      occlusion_query_set: None,
    });
    rpass.set_pipeline(&self.render_pipeline);
    rpass.set_bind_group(0, camera_bind_group, &[]);
    rpass.set_vertex_buffer(2, self.vertices_buffer.slice(..));
    for particles in scene.iter().filter(|p| p.count > 0) {
      rpass.set_bind_group(1, &particles.material_bind_group, &[]);
      rpass.set_vertex_buffer(0, particles.position_buffer.slice(..));
      rpass.set_vertex_buffer(1, particles.color_buffer.slice(..));
      rpass.draw(0..6, 0..particles.count);
    }
  }
}

/// Empty sets still get one zeroed element so the buffer can be created and bound.
fn instance_buffer(device: &wgpu::Device, label: &str, data: &[f32]) -> wgpu::Buffer {
  let padding = [0.0f32; 3];
  let contents = if data.is_empty() { &padding[..] } else { data };
  device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
    label: Some(label),
    contents: bytemuck::cast_slice(contents),
    usage: wgpu::BufferUsages::VERTEX,
  })
}
