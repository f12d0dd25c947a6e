use crate::layout;
use glam::{Mat4, Vec3};
use lantern_common::{BufferHandle, ShaderProgram};
use lantern_render::{GraphicsDevice, RenderError, shader};
use std::collections::HashMap;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::window::Window;

/// One compiled program and its lazily-built pipelines.
struct Program {
    vertex_module: wgpu::ShaderModule,
    fragment_module: wgpu::ShaderModule,
    attribute_locations: HashMap<String, u32>,
    light_capacity: u32,
    uniform_size: u64,
    pipeline_layout: wgpu::PipelineLayout,
    bind_group_layout: wgpu::BindGroupLayout,
    /// Keyed by the bitmask of bound attribute locations.
    pipelines: HashMap<u32, wgpu::RenderPipeline>,
}

struct Frame {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

/// wgpu-backed [`GraphicsDevice`] drawing to a winit window surface.
///
/// Per-draw state (uploaded buffers, the selected program, staged
/// uniforms) accumulates between `use_program` and `release_state`.
/// `clear` and `draw_triangles` each submit their own render pass; draws
/// load the previous pass's output so every object composes into the
/// frame.
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    uniform_vector_capacity: u32,
    programs: HashMap<u64, Program>,
    next_handle: u64,
    frame: Option<Frame>,
    buffers: HashMap<u64, wgpu::Buffer>,
    current_program: Option<u64>,
    // (location, buffer handle, components) pending for the next draw.
    pending_attributes: Vec<(u32, u64, u32)>,
    uniform_data: Vec<u8>,
}

impl WgpuDevice {
    /// Create a device rendering to `window`. Blocks on adapter and
    /// device acquisition.
    pub fn new(window: Arc<Window>) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| RenderError::GraphicsInit(e.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| RenderError::GraphicsInit("no compatible adapter".into()))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("lantern_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|e| RenderError::GraphicsInit(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_texture(&device, config.width, config.height);

        // The limit is in bytes of bindable uniform data; one uniform
        // vector is 16 bytes. Capped to keep generated loop bounds sane.
        let uniform_vector_capacity =
            (device.limits().max_uniform_buffer_binding_size / 16).min(1024);

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            uniform_vector_capacity,
            "gpu initialized"
        );

        Ok(Self {
            device,
            queue,
            surface,
            config,
            depth_view,
            uniform_vector_capacity,
            programs: HashMap::new(),
            next_handle: 0,
            frame: None,
            buffers: HashMap::new(),
            current_program: None,
            pending_attributes: Vec::new(),
            uniform_data: Vec::new(),
        })
    }

    /// Reconfigure the surface and depth buffer for a new window size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = width.max(1);
        self.config.height = height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.depth_view = create_depth_texture(&self.device, self.config.width, self.config.height);
    }

    /// Acquire the next surface texture. Reconfigures and retries once on
    /// a lost or outdated surface.
    pub fn begin_frame(&mut self) -> Result<(), RenderError> {
        let texture = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                self.surface
                    .get_current_texture()
                    .map_err(|e| RenderError::GraphicsInit(e.to_string()))?
            }
            Err(e) => return Err(RenderError::GraphicsInit(e.to_string())),
        };
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.frame = Some(Frame { texture, view });
        Ok(())
    }

    /// Present the frame acquired by [`begin_frame`](Self::begin_frame).
    pub fn end_frame(&mut self) {
        if let Some(frame) = self.frame.take() {
            frame.texture.present();
        }
    }

    fn next(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn stage_uniform(&mut self, program: ShaderProgram, name: &str, bytes: &[u8]) {
        if self.current_program != Some(program.0) {
            tracing::warn!(name, "uniform set for a program that is not in use");
            return;
        }
        let Some(prog) = self.programs.get(&program.0) else {
            return;
        };
        let Some(offset) = layout::uniform_offset(name, prog.light_capacity) else {
            tracing::debug!(name, "ignoring unknown uniform");
            return;
        };
        let start = offset as usize;
        self.uniform_data[start..start + bytes.len()].copy_from_slice(bytes);
    }
}

impl GraphicsDevice for WgpuDevice {
    fn max_fragment_uniform_vectors(&self) -> u32 {
        self.uniform_vector_capacity
    }

    fn create_shader_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ShaderProgram, RenderError> {
        let light_capacity = shader::light_capacity(vertex_source)
            .or_else(|| shader::light_capacity(fragment_source))
            .ok_or_else(|| {
                RenderError::ShaderCompile("source declares no light array".into())
            })?;

        let vertex_module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("vertex_shader"),
                source: wgpu::ShaderSource::Wgsl(vertex_source.into()),
            });
        let fragment_module = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some("fragment_shader"),
                source: wgpu::ShaderSource::Wgsl(fragment_source.into()),
            });

        let bind_group_layout =
            self.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("globals_bind_group_layout"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    }],
                });
        let pipeline_layout = self
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("pipeline_layout"),
                bind_group_layouts: &[&bind_group_layout],
                push_constant_ranges: &[],
            });

        let handle = self.next();
        self.programs.insert(
            handle,
            Program {
                vertex_module,
                fragment_module,
                attribute_locations: shader::attribute_locations(vertex_source),
                light_capacity,
                uniform_size: layout::uniform_block_size(light_capacity),
                pipeline_layout,
                bind_group_layout,
                pipelines: HashMap::new(),
            },
        );
        Ok(ShaderProgram(handle))
    }

    fn clear(&mut self, color: [f32; 4]) {
        let Some(frame) = &self.frame else {
            tracing::warn!("clear outside a frame");
            return;
        };
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("clear_encoder"),
            });
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("clear_pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color {
                        r: color[0] as f64,
                        g: color[1] as f64,
                        b: color[2] as f64,
                        a: color[3] as f64,
                    }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            ..Default::default()
        });
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn upload_buffer(&mut self, data: &[f32]) -> BufferHandle {
        let handle = self.next();
        let buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("transient_vertex_buffer"),
                contents: bytemuck::cast_slice(data),
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.buffers.insert(handle, buffer);
        BufferHandle(handle)
    }

    fn attribute_location(&self, program: ShaderProgram, name: &str) -> Option<u32> {
        self.programs
            .get(&program.0)?
            .attribute_locations
            .get(name)
            .copied()
    }

    fn bind_attribute(
        &mut self,
        program: ShaderProgram,
        name: &str,
        buffer: BufferHandle,
        components: u32,
    ) {
        let Some(location) = self.attribute_location(program, name) else {
            tracing::debug!(name, "ignoring unknown attribute");
            return;
        };
        self.pending_attributes.push((location, buffer.0, components));
    }

    fn use_program(&mut self, program: ShaderProgram) -> Result<(), RenderError> {
        let Some(prog) = self.programs.get(&program.0) else {
            return Err(RenderError::InvalidProgram(program));
        };
        self.uniform_data = vec![0; prog.uniform_size as usize];
        self.current_program = Some(program.0);
        Ok(())
    }

    fn set_uniform_mat4(&mut self, program: ShaderProgram, name: &str, value: &Mat4) {
        self.stage_uniform(program, name, bytemuck::cast_slice(&value.to_cols_array()));
    }

    fn set_uniform_vec3(&mut self, program: ShaderProgram, name: &str, value: Vec3) {
        self.stage_uniform(program, name, bytemuck::cast_slice(&value.to_array()));
    }

    fn set_uniform_f32(&mut self, program: ShaderProgram, name: &str, value: f32) {
        self.stage_uniform(program, name, bytemuck::bytes_of(&value));
    }

    fn set_uniform_i32(&mut self, program: ShaderProgram, name: &str, value: i32) {
        // The block stores counts as u32; negative values clamp to zero.
        let raw = value.max(0) as u32;
        self.stage_uniform(program, name, bytemuck::bytes_of(&raw));
    }

    fn draw_triangles(&mut self, vertex_count: u32) {
        let Some(handle) = self.current_program else {
            tracing::warn!("draw without a program in use");
            return;
        };
        if self.frame.is_none() {
            tracing::warn!("draw outside a frame");
            return;
        }

        let mut attributes: Vec<(u32, u64, u32)> = self
            .pending_attributes
            .iter()
            .filter(|(_, _, components)| layout::vertex_format(*components).is_some())
            .copied()
            .collect();
        attributes.sort_by_key(|(location, _, _)| *location);
        let mask = attributes
            .iter()
            .fold(0u32, |m, (location, _, _)| m | (1 << location));

        // Build the pipeline for this attribute set on first use.
        let program = self
            .programs
            .get_mut(&handle)
            .expect("current program exists");
        if !program.pipelines.contains_key(&mask) {
            let attr_descs: Vec<(u64, [wgpu::VertexAttribute; 1])> = attributes
                .iter()
                .filter_map(|(location, _, components)| {
                    let format = layout::vertex_format(*components)?;
                    Some((
                        *components as u64 * 4,
                        [wgpu::VertexAttribute {
                            format,
                            offset: 0,
                            shader_location: *location,
                        }],
                    ))
                })
                .collect();
            let buffer_layouts: Vec<wgpu::VertexBufferLayout> = attr_descs
                .iter()
                .map(|(stride, attrs)| wgpu::VertexBufferLayout {
                    array_stride: *stride,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: attrs,
                })
                .collect();

            let pipeline = self
                .device
                .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some("object_pipeline"),
                    layout: Some(&program.pipeline_layout),
                    vertex: wgpu::VertexState {
                        module: &program.vertex_module,
                        entry_point: Some("vs_main"),
                        compilation_options: Default::default(),
                        buffers: &buffer_layouts,
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &program.fragment_module,
                        entry_point: Some("fs_main"),
                        compilation_options: Default::default(),
                        targets: &[Some(wgpu::ColorTargetState {
                            format: self.config.format,
                            blend: Some(wgpu::BlendState::REPLACE),
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                    }),
                    primitive: wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        ..Default::default()
                    },
                    depth_stencil: Some(wgpu::DepthStencilState {
                        format: wgpu::TextureFormat::Depth32Float,
                        depth_write_enabled: true,
                        depth_compare: wgpu::CompareFunction::Less,
                        stencil: Default::default(),
                        bias: Default::default(),
                    }),
                    multisample: Default::default(),
                    multiview: None,
                    cache: None,
                });
            program.pipelines.insert(mask, pipeline);
        }

        let uniform_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("globals_buffer"),
                contents: &self.uniform_data,
                usage: wgpu::BufferUsages::UNIFORM,
            });

        let program = self.programs.get(&handle).expect("current program exists");
        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &program.bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let frame = self.frame.as_ref().expect("frame checked above");
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("draw_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("object_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            pass.set_pipeline(&program.pipelines[&mask]);
            pass.set_bind_group(0, &bind_group, &[]);
            let mut slot = 0;
            for (_, buffer_handle, _) in &attributes {
                if let Some(buffer) = self.buffers.get(buffer_handle) {
                    pass.set_vertex_buffer(slot, buffer.slice(..));
                    slot += 1;
                }
            }
            pass.draw(0..vertex_count, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn release_state(&mut self) {
        self.buffers.clear();
        self.pending_attributes.clear();
        self.current_program = None;
        self.uniform_data.clear();
    }
}

fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}
