use std::collections::HashMap;

use image::RgbaImage;
use tracing::debug;

use crate::foundation::core::{ContextId, FrameRGBA, NativeTextureId, TileRect};
use crate::foundation::error::{BackdropError, BackdropResult};
use crate::render::canvas::{Canvas, DrawSource};

const GL_INVALID_VALUE: u32 = 0x0501;
const GL_OUT_OF_MEMORY: u32 = 0x0505;
const PARAMS_SIZE: u64 = 32;

#[derive(Clone, Debug)]
pub struct WgpuCanvasOpts {
    pub width: u32,
    pub height: u32,
    /// Premultiplied clear color.
    pub clear_rgba: [u8; 4],
}

impl Default for WgpuCanvasOpts {
    fn default() -> Self {
        Self {
            width: 640,
            height: 64,
            clear_rgba: [0, 0, 0, 255],
        }
    }
}

struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

struct MixPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    params: wgpu::Buffer,
}

/// Canvas backed by a headless wgpu device rendering into an offscreen RGBA8 target.
///
/// Each draw is submitted on its own; [`WgpuCanvas::frame`] reads the target back.
/// wgpu validation errors raised while creating a texture are captured with an
/// error scope and reported through [`Canvas::take_error`] as GL-style codes.
pub struct WgpuCanvas {
    context: ContextId,
    opts: WgpuCanvasOpts,
    time_ms: u64,
    device: wgpu::Device,
    queue: wgpu::Queue,
    target: wgpu::Texture,
    target_view: wgpu::TextureView,
    mix: MixPipeline,
    readback: wgpu::Buffer,
    readback_bytes_per_row: u32,
    textures: HashMap<NativeTextureId, GpuTexture>,
    next_id: u32,
    pending_error: Option<u32>,
}

impl WgpuCanvas {
    pub fn new(opts: WgpuCanvasOpts) -> BackdropResult<Self> {
        if opts.width == 0 || opts.height == 0 {
            return Err(BackdropError::validation("gpu canvas size must be > 0"));
        }

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: None,
            force_fallback_adapter: false,
        }))
        .map_err(|e| match e {
            wgpu::RequestAdapterError::NotFound { .. } => {
                BackdropError::render("no gpu adapter available")
            }
            other => BackdropError::render(format!("wgpu request_adapter failed: {other:?}")),
        })?;

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("backdrop_device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults(),
            experimental_features: wgpu::ExperimentalFeatures::default(),
            memory_hints: wgpu::MemoryHints::Performance,
            trace: wgpu::Trace::Off,
        }))
        .map_err(|e| BackdropError::render(format!("wgpu request_device failed: {e:?}")))?;

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("backdrop_target"),
            size: extent(opts.width, opts.height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let target_view = target.create_view(&wgpu::TextureViewDescriptor::default());

        let readback_bytes_per_row = align_to(
            opts.width
                .checked_mul(4)
                .ok_or_else(|| BackdropError::validation("gpu canvas width overflow"))?,
            wgpu::COPY_BYTES_PER_ROW_ALIGNMENT,
        );
        let readback = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("backdrop_readback"),
            size: u64::from(readback_bytes_per_row) * u64::from(opts.height),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mix = build_mix_pipeline(&device);
        let mut canvas = Self {
            context: ContextId::allocate(),
            opts,
            time_ms: 0,
            device,
            queue,
            target,
            target_view,
            mix,
            readback,
            readback_bytes_per_row,
            textures: HashMap::new(),
            next_id: 1,
            pending_error: None,
        };
        canvas.clear();
        debug!(context = %canvas.context, "wgpu canvas ready");
        Ok(canvas)
    }

    pub fn width(&self) -> u32 {
        self.opts.width
    }

    pub fn height(&self) -> u32 {
        self.opts.height
    }

    pub fn set_time_ms(&mut self, time_ms: u64) {
        self.time_ms = time_ms;
    }

    pub fn advance_ms(&mut self, delta_ms: u64) {
        self.time_ms = self.time_ms.saturating_add(delta_ms);
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn clear(&mut self) {
        let [r, g, b, a] = self.opts.clear_rgba;
        let clear = wgpu::Color {
            r: f64::from(r) / 255.0,
            g: f64::from(g) / 255.0,
            b: f64::from(b) / 255.0,
            a: f64::from(a) / 255.0,
        };
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("backdrop_clear_encoder"),
            });
        {
            let _rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("backdrop_clear_rp"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.target_view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }
        self.queue.submit(Some(encoder.finish()));
    }

    /// Read the render target back to the CPU.
    pub fn frame(&self) -> BackdropResult<FrameRGBA> {
        let (width, height) = (self.opts.width, self.opts.height);
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("backdrop_readback_encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.target,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(self.readback_bytes_per_row),
                    rows_per_image: Some(height),
                },
            },
            extent(width, height),
        );
        self.queue.submit(Some(encoder.finish()));

        let slice = self.readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        self.device
            .poll(wgpu::PollType::wait_indefinitely())
            .map_err(|e| BackdropError::render(format!("wgpu poll failed: {e:?}")))?;
        rx.recv()
            .map_err(|_| BackdropError::render("readback channel closed"))?
            .map_err(|e| BackdropError::render(format!("readback map failed: {e:?}")))?;

        let mapped = slice.get_mapped_range();
        let row_bytes = width as usize * 4;
        let padded = self.readback_bytes_per_row as usize;
        let mut data = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let start = row * padded;
            data.extend_from_slice(&mapped[start..start + row_bytes]);
        }
        drop(mapped);
        self.readback.unmap();

        Ok(FrameRGBA {
            width,
            height,
            data,
            premultiplied: true,
        })
    }

    fn texture(&self, id: NativeTextureId) -> BackdropResult<&GpuTexture> {
        self.textures
            .get(&id)
            .ok_or_else(|| BackdropError::render(format!("unknown texture {}", id.0)))
    }

    /// Rect corners in normalized device coordinates: `[left, top, right, bottom]`.
    fn ndc(&self, rect: TileRect) -> [f32; 4] {
        let w = self.opts.width as f32;
        let h = self.opts.height as f32;
        [
            rect.x as f32 / w * 2.0 - 1.0,
            1.0 - rect.y as f32 / h * 2.0,
            rect.right() as f32 / w * 2.0 - 1.0,
            1.0 - rect.bottom() as f32 / h * 2.0,
        ]
    }
}

impl Canvas for WgpuCanvas {
    fn context_id(&self) -> ContextId {
        self.context
    }

    fn current_animation_time_ms(&self) -> u64 {
        self.time_ms
    }

    fn create_texture(&mut self, width: u32, height: u32) -> NativeTextureId {
        let id = NativeTextureId(self.next_id);
        self.next_id += 1;

        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let texture = self.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("backdrop_texture"),
            size: extent(width, height),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let invalid = pollster::block_on(self.device.pop_error_scope());
        let oom = pollster::block_on(self.device.pop_error_scope());

        let code = match (invalid, oom) {
            (Some(err), _) => {
                debug!(error = %err, "texture creation rejected");
                Some(GL_INVALID_VALUE)
            }
            (None, Some(err)) => {
                debug!(error = %err, "texture creation out of memory");
                Some(GL_OUT_OF_MEMORY)
            }
            (None, None) => None,
        };
        if code.is_some() {
            self.pending_error = code;
            return id;
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        self.textures.insert(
            id,
            GpuTexture {
                texture,
                view,
                width,
                height,
            },
        );
        id
    }

    fn take_error(&mut self) -> Option<u32> {
        self.pending_error.take()
    }

    fn upload_texture(&mut self, id: NativeTextureId, pixels: &RgbaImage) -> BackdropResult<()> {
        let tex = self.texture(id)?;
        if pixels.dimensions() != (tex.width, tex.height) {
            return Err(BackdropError::render(format!(
                "upload of {}x{} pixels into {}x{} texture {}",
                pixels.width(),
                pixels.height(),
                tex.width,
                tex.height,
                id.0
            )));
        }
        self.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &tex.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels.as_raw(),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(tex.width * 4),
                rows_per_image: Some(tex.height),
            },
            extent(tex.width, tex.height),
        );
        Ok(())
    }

    fn delete_texture(&mut self, id: NativeTextureId) {
        if let Some(tex) = self.textures.remove(&id) {
            tex.texture.destroy();
        }
    }

    fn draw_texture(&mut self, source: DrawSource, rect: TileRect) -> BackdropResult<()> {
        if rect.is_empty() {
            return Ok(());
        }
        let (from, to, ratio) = match source {
            DrawSource::Single(id) => (id, id, 1.0),
            DrawSource::Mixed { from, to, ratio } => (from, to, ratio.clamp(0.0, 1.0)),
        };
        let from = &self.texture(from)?.view;
        let to = &self.texture(to)?.view;

        let mut params = [0u8; PARAMS_SIZE as usize];
        for (i, v) in self.ndc(rect).into_iter().chain([ratio]).enumerate() {
            params[i * 4..i * 4 + 4].copy_from_slice(&v.to_le_bytes());
        }
        self.queue.write_buffer(&self.mix.params, 0, &params);

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("backdrop_mix_bg"),
            layout: &self.mix.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(from),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(to),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.mix.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: self.mix.params.as_entire_binding(),
                },
            ],
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("backdrop_mix_encoder"),
            });
        {
            let mut rp = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("backdrop_mix_rp"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.target_view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rp.set_pipeline(&self.mix.pipeline);
            rp.set_bind_group(0, &bind_group, &[]);
            rp.draw(0..6, 0..1);
        }
        self.queue.submit(Some(encoder.finish()));
        Ok(())
    }
}

fn build_mix_pipeline(device: &wgpu::Device) -> MixPipeline {
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("backdrop_mix_sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        mipmap_filter: wgpu::FilterMode::Nearest,
        ..Default::default()
    });

    let params = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("backdrop_mix_params"),
        size: PARAMS_SIZE,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            multisampled: false,
            view_dimension: wgpu::TextureViewDimension::D2,
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
        },
        count: None,
    };
    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("backdrop_mix_bgl"),
        entries: &[
            texture_entry(0),
            texture_entry(1),
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 3,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(PARAMS_SIZE),
                },
                count: None,
            },
        ],
    });

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("backdrop_mix_shader"),
        source: wgpu::ShaderSource::Wgsl(
            r#"
struct Params {
  rect: vec4<f32>,
  weights: vec4<f32>,
};

struct VsOut {
  @builtin(position) pos: vec4<f32>,
  @location(0) uv: vec2<f32>,
};

@group(0) @binding(0) var t_from: texture_2d<f32>;
@group(0) @binding(1) var t_to: texture_2d<f32>;
@group(0) @binding(2) var s_tex: sampler;
@group(0) @binding(3) var<uniform> params: Params;

@vertex
fn vs(@builtin(vertex_index) vi: u32) -> VsOut {
  var corners = array<vec2<f32>, 6>(
    vec2<f32>(0.0, 0.0),
    vec2<f32>(1.0, 0.0),
    vec2<f32>(0.0, 1.0),
    vec2<f32>(0.0, 1.0),
    vec2<f32>(1.0, 0.0),
    vec2<f32>(1.0, 1.0),
  );
  let c = corners[vi];
  var o: VsOut;
  o.pos = vec4<f32>(
    mix(params.rect.x, params.rect.z, c.x),
    mix(params.rect.y, params.rect.w, c.y),
    0.0,
    1.0,
  );
  o.uv = c;
  return o;
}

@fragment
fn fs(in: VsOut) -> @location(0) vec4<f32> {
  let a = textureSample(t_from, s_tex, in.uv);
  let b = textureSample(t_to, s_tex, in.uv);
  return mix(a, b, params.weights.x);
}
"#
            .into(),
        ),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("backdrop_mix_pl"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("backdrop_mix_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            buffers: &[],
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs"),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: wgpu::TextureFormat::Rgba8Unorm,
                blend: Some(wgpu::BlendState::PREMULTIPLIED_ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    MixPipeline {
        pipeline,
        bind_group_layout,
        sampler,
        params,
    }
}

fn extent(width: u32, height: u32) -> wgpu::Extent3d {
    wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    }
}

fn align_to(value: u32, alignment: u32) -> u32 {
    let mask = alignment - 1;
    (value + mask) & !mask
}
