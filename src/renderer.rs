use crate::error::{DemoError, Result};
use crate::geometry::{axes, LineVertex, Vertex};
use crate::scene::{Scene, SceneUniforms, AXES_SIZE};
use crate::texture::create_water_texture;
use std::borrow::Cow;
use std::cmp::max;
use std::mem::size_of;
use std::sync::mpsc::channel;
use std::sync::Arc;
use wgpu::{
    util::{BufferInitDescriptor, DeviceExt},
    BindGroup, BindGroupDescriptor, BindGroupEntry, BindGroupLayout,
    BindGroupLayoutDescriptor, BindGroupLayoutEntry, BindingResource, BindingType, Buffer,
    BufferAddress, BufferDescriptor, BufferSize, BufferUsages, Color, CommandEncoderDescriptor,
    CompareFunction, CompositeAlphaMode, DepthStencilState, Device, DeviceDescriptor, Extent3d,
    Features, FragmentState, ImageCopyBuffer, ImageCopyTexture, ImageDataLayout,
    IndexFormat, Instance, Limits, LoadOp, Maintain, MapMode, MemoryHints, MultisampleState,
    Operations, Origin3d, PipelineLayoutDescriptor, PowerPreference, PresentMode, PrimitiveState,
    PrimitiveTopology, Queue, RenderPassColorAttachment, RenderPassDepthStencilAttachment,
    RenderPassDescriptor, RenderPipeline, RenderPipelineDescriptor, RequestAdapterOptions,
    SamplerBindingType, ShaderModule, ShaderSource, ShaderStages, StoreOp,
    Surface, SurfaceConfiguration, SurfaceError, Texture, TextureAspect, TextureDescriptor,
    TextureDimension, TextureFormat, TextureSampleType, TextureUsages, TextureView,
    TextureViewDescriptor, TextureViewDimension, VertexState,
};
use winit::window::Window;

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;
const HEADLESS_FORMAT: TextureFormat = TextureFormat::Rgba8Unorm;

/// Where frames end up.
pub enum RenderOutput {
    Window(Arc<Window>),
    /// Offscreen target of the given width and height, readable with
    /// [`Renderer::read_pixels`].
    Headless(u32, u32),
}

enum Target {
    Surface(Surface<'static>),
    Texture(Texture),
}

pub struct Renderer {
    pub device: Device,
    pub queue: Queue,
    pub config: SurfaceConfiguration,
    target: Target,
    sphere_pipeline: RenderPipeline,
    axes_pipeline: RenderPipeline,
    vertex_buffer: Buffer,
    displacement_buffer: Buffer,
    index_buffer: Buffer,
    index_count: u32,
    axes_buffer: Buffer,
    axes_vertex_count: u32,
    uniform_buffer: Buffer,
    bind_group_uniforms: BindGroup,
    bind_group_textures: BindGroup,
    depth_view: TextureView,
    clear_color: Color,
    show_axes: bool,
}

impl Renderer {
    pub async fn new(output: RenderOutput, scene: &Scene) -> Result<Renderer> {
        let instance = Instance::default();
        let (surface, width, height) = match &output {
            RenderOutput::Window(window) => {
                let size = window.inner_size();
                let surface = instance.create_surface(window.clone())?;
                (Some(surface), size.width.max(1), size.height.max(1))
            }
            RenderOutput::Headless(width, height) => (None, (*width).max(1), (*height).max(1)),
        };
        let adapter = instance
            .request_adapter(&RequestAdapterOptions {
                power_preference: PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: surface.as_ref(),
            })
            .await
            .ok_or(DemoError::NoAdapter)?;
        log::info!("using adapter {:?}", adapter.get_info().name);
        let (device, queue) = adapter
            .request_device(
                &DeviceDescriptor {
                    label: None,
                    required_features: Features::empty(),
                    required_limits: Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: MemoryHints::default(),
                },
                None,
            )
            .await?;

        let (target, config) = match surface {
            Some(surface) => {
                let capabilities = surface.get_capabilities(&adapter);
                let mut config = surface
                    .get_default_config(&adapter, width, height)
                    .ok_or(DemoError::UnsupportedSurface)?;
                // colors are authored in display space, skip the sRGB encode
                if let Some(format) = capabilities.formats.iter().find(|f| !f.is_srgb()) {
                    config.format = *format;
                }
                if scene.transparent
                    && capabilities
                        .alpha_modes
                        .contains(&CompositeAlphaMode::PreMultiplied)
                {
                    config.alpha_mode = CompositeAlphaMode::PreMultiplied;
                }
                surface.configure(&device, &config);
                (Target::Surface(surface), config)
            }
            None => {
                let config = SurfaceConfiguration {
                    usage: TextureUsages::RENDER_ATTACHMENT,
                    format: HEADLESS_FORMAT,
                    width,
                    height,
                    present_mode: PresentMode::Fifo,
                    desired_maximum_frame_latency: 2,
                    alpha_mode: CompositeAlphaMode::Opaque,
                    view_formats: vec![],
                };
                let texture = create_headless_texture(&device, width, height);
                (Target::Texture(texture), config)
            }
        };

        let sphere_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sphere shader"),
            source: ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/sphere.wgsl"))),
        });
        let axes_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("axes shader"),
            source: ShaderSource::Wgsl(Cow::Borrowed(include_str!("shaders/axes.wgsl"))),
        });

        let mesh = &scene.sphere.mesh;
        let vertex_buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: BufferUsages::INDEX,
        });
        let displacement_buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Displacement Buffer"),
            contents: bytemuck::cast_slice(scene.sphere.field.displacement()),
            usage: BufferUsages::VERTEX | BufferUsages::COPY_DST,
        });
        let axes_vertices = axes(AXES_SIZE);
        let axes_buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Axes Buffer"),
            contents: bytemuck::cast_slice(&axes_vertices),
            usage: BufferUsages::VERTEX,
        });
        let uniform_buffer = device.create_buffer_init(&BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::bytes_of(&scene.uniforms()),
            usage: BufferUsages::UNIFORM | BufferUsages::COPY_DST,
        });

        let bind_group_layout_uniforms =
            device.create_bind_group_layout(&BindGroupLayoutDescriptor {
                label: Some("uniforms"),
                entries: &[BindGroupLayoutEntry {
                    binding: 0,
                    visibility: ShaderStages::VERTEX_FRAGMENT,
                    ty: BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: BufferSize::new(size_of::<SceneUniforms>() as u64),
                    },
                    count: None,
                }],
            });
        let bind_group_layout_textures =
            device.create_bind_group_layout(&BindGroupLayoutDescriptor {
                label: Some("textures"),
                entries: &[
                    BindGroupLayoutEntry {
                        binding: 0, // water
                        visibility: ShaderStages::FRAGMENT,
                        ty: BindingType::Texture {
                            sample_type: TextureSampleType::Float { filterable: true },
                            view_dimension: TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    BindGroupLayoutEntry {
                        binding: 1,
                        visibility: ShaderStages::FRAGMENT,
                        ty: BindingType::Sampler(SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let (water_view, water_sampler) = create_water_texture(&device, &queue);

        let bind_group_uniforms = device.create_bind_group(&BindGroupDescriptor {
            label: Some("uniforms"),
            layout: &bind_group_layout_uniforms,
            entries: &[BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });
        let bind_group_textures = device.create_bind_group(&BindGroupDescriptor {
            label: Some("textures"),
            layout: &bind_group_layout_textures,
            entries: &[
                BindGroupEntry {
                    binding: 0,
                    resource: BindingResource::TextureView(&water_view),
                },
                BindGroupEntry {
                    binding: 1,
                    resource: BindingResource::Sampler(&water_sampler),
                },
            ],
        });

        let sphere_pipeline = create_sphere_pipeline(
            &device,
            &sphere_shader,
            &[&bind_group_layout_uniforms, &bind_group_layout_textures],
            config.format,
        );
        let axes_pipeline =
            create_axes_pipeline(&device, &axes_shader, &bind_group_layout_uniforms, config.format);

        let depth_view = create_depth_texture(&device, width, height);

        let mut renderer = Self {
            device,
            queue,
            config,
            target,
            sphere_pipeline,
            axes_pipeline,
            vertex_buffer,
            displacement_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
            axes_buffer,
            axes_vertex_count: axes_vertices.len() as u32,
            uniform_buffer,
            bind_group_uniforms,
            bind_group_textures,
            depth_view,
            clear_color: Color::BLACK,
            show_axes: false,
        };
        renderer.prepare(scene);
        Ok(renderer)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.config.width = max(1, width);
        self.config.height = max(1, height);
        if let Target::Surface(surface) = &self.target {
            surface.configure(&self.device, &self.config);
        } else {
            let texture =
                create_headless_texture(&self.device, self.config.width, self.config.height);
            self.target = Target::Texture(texture);
        }
        self.depth_view =
            create_depth_texture(&self.device, self.config.width, self.config.height);
        log::debug!("resized to {}x{}", self.config.width, self.config.height);
    }

    /// Uploads the per-frame state: uniforms and the displacement attribute.
    pub fn prepare(&mut self, scene: &Scene) {
        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&scene.uniforms()));
        self.queue.write_buffer(
            &self.displacement_buffer,
            0,
            bytemuck::cast_slice(scene.sphere.field.displacement()),
        );
        self.clear_color = clear_color(scene);
        self.show_axes = scene.show_axes;
    }

    pub fn draw(&mut self) -> Result<()> {
        let frame = match &self.target {
            Target::Surface(surface) => match surface.get_current_texture() {
                Ok(frame) => Some(frame),
                Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                    log::warn!("surface lost, reconfiguring");
                    surface.configure(&self.device, &self.config);
                    return Ok(());
                }
                Err(SurfaceError::Timeout) => {
                    log::warn!("timed out waiting for the next frame");
                    return Ok(());
                }
                Err(e) => return Err(DemoError::Surface(e)),
            },
            Target::Texture(_) => None,
        };
        let view = match (&frame, &self.target) {
            (Some(frame), _) => frame.texture.create_view(&TextureViewDescriptor::default()),
            (None, Target::Texture(texture)) => {
                texture.create_view(&TextureViewDescriptor::default())
            }
            (None, Target::Surface(_)) => return Ok(()),
        };
        let mut encoder = self
            .device
            .create_command_encoder(&CommandEncoderDescriptor { label: None });
        {
            let mut rpass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("scene pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(self.clear_color),
                        store: StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            rpass.set_pipeline(&self.sphere_pipeline);
            rpass.set_bind_group(0, &self.bind_group_uniforms, &[]);
            rpass.set_bind_group(1, &self.bind_group_textures, &[]);
            rpass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            rpass.set_vertex_buffer(1, self.displacement_buffer.slice(..));
            rpass.set_index_buffer(self.index_buffer.slice(..), IndexFormat::Uint32);
            rpass.draw_indexed(0..self.index_count, 0, 0..1);
            if self.show_axes {
                rpass.set_pipeline(&self.axes_pipeline);
                rpass.set_bind_group(0, &self.bind_group_uniforms, &[]);
                rpass.set_vertex_buffer(0, self.axes_buffer.slice(..));
                rpass.draw(0..self.axes_vertex_count, 0..1);
            }
        }
        self.queue.submit(Some(encoder.finish()));
        if let Some(frame) = frame {
            frame.present();
        }
        Ok(())
    }

    /// Reads back the headless target as tightly packed RGBA8 rows.
    pub fn read_pixels(&mut self) -> Result<Vec<u8>> {
        let Target::Texture(texture) = &self.target else {
            return Err(DemoError::NotHeadless);
        };
        let width = self.config.width;
        let height = self.config.height;
        let unpadded = 4 * width;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded = unpadded.div_ceil(align) * align;
        let output_buffer = self.device.create_buffer(&BufferDescriptor {
            label: Some("readback"),
            size: (padded * height) as BufferAddress,
            usage: BufferUsages::MAP_READ | BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let mut encoder = self.device.create_command_encoder(&CommandEncoderDescriptor {
            label: Some("Copy Texture Encoder"),
        });
        encoder.copy_texture_to_buffer(
            ImageCopyTexture {
                texture,
                mip_level: 0,
                origin: Origin3d::ZERO,
                aspect: TextureAspect::All,
            },
            ImageCopyBuffer {
                buffer: &output_buffer,
                layout: ImageDataLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(Some(encoder.finish()));
        let buffer_slice = output_buffer.slice(..);
        let (tx, rx) = channel();
        buffer_slice.map_async(MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        let _ = self.device.poll(Maintain::Wait);
        rx.recv().unwrap_or(Err(wgpu::BufferAsyncError))?;
        let pixels = {
            let data = buffer_slice.get_mapped_range();
            data.chunks_exact(padded as usize)
                .flat_map(|row| &row[..unpadded as usize])
                .copied()
                .collect::<Vec<u8>>()
        };
        output_buffer.unmap();
        Ok(pixels)
    }
}

/// Background clear value. A transparent canvas clears to premultiplied
/// transparent black so the compositor shows what is behind the window.
fn clear_color(scene: &Scene) -> Color {
    if scene.transparent {
        return Color::TRANSPARENT;
    }
    let bg = scene.background;
    Color {
        r: bg.r as f64,
        g: bg.g as f64,
        b: bg.b as f64,
        a: 1.0,
    }
}

fn create_headless_texture(device: &Device, width: u32, height: u32) -> Texture {
    device.create_texture(&TextureDescriptor {
        label: Some("headless target"),
        size: Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: HEADLESS_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT | TextureUsages::COPY_SRC,
        view_formats: &[],
    })
}

fn create_depth_texture(device: &Device, width: u32, height: u32) -> TextureView {
    let texture = device.create_texture(&TextureDescriptor {
        label: Some("depth buffer"),
        size: Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&TextureViewDescriptor::default())
}

fn depth_state() -> DepthStencilState {
    DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: true,
        depth_compare: CompareFunction::Less,
        stencil: Default::default(),
        bias: Default::default(),
    }
}

fn create_sphere_pipeline(
    device: &Device,
    shader: &ShaderModule,
    layouts: &[&BindGroupLayout],
    format: TextureFormat,
) -> RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: None,
        bind_group_layouts: layouts,
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("sphere pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: shader,
            entry_point: "vs_main",
            compilation_options: Default::default(),
            buffers: &[Vertex::desc(), Vertex::displacement_desc()],
        },
        fragment: Some(FragmentState {
            module: shader,
            entry_point: "fs_main",
            compilation_options: Default::default(),
            targets: &[Some(format.into())],
        }),
        primitive: PrimitiveState::default(),
        depth_stencil: Some(depth_state()),
        multisample: MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_axes_pipeline(
    device: &Device,
    shader: &ShaderModule,
    layout: &BindGroupLayout,
    format: TextureFormat,
) -> RenderPipeline {
    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: None,
        bind_group_layouts: &[layout],
        push_constant_ranges: &[],
    });
    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some("axes pipeline"),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: shader,
            entry_point: "vs_axes",
            compilation_options: Default::default(),
            buffers: &[LineVertex::desc()],
        },
        fragment: Some(FragmentState {
            module: shader,
            entry_point: "fs_axes",
            compilation_options: Default::default(),
            targets: &[Some(format.into())],
        }),
        primitive: PrimitiveState {
            topology: PrimitiveTopology::LineList,
            ..Default::default()
        },
        depth_stencil: Some(depth_state()),
        multisample: MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DemoConfig, Variant};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn scene(variant: Variant) -> Scene {
        let config = DemoConfig {
            variant,
            ..DemoConfig::default()
        };
        Scene::new(&config, 64, 64, &mut StdRng::seed_from_u64(1))
    }

    #[test]
    fn transparent_clear_is_premultiplied() {
        let color = clear_color(&scene(Variant::Plain));
        assert_eq!(color.a, 0.0);
        assert!(color.r <= color.a && color.g <= color.a && color.b <= color.a);
    }

    #[test]
    fn opaque_clear_uses_background() {
        let color = clear_color(&scene(Variant::Textured));
        assert_eq!(color.a, 1.0);
        assert!((color.r - 17.0 / 255.0).abs() < 1e-6);
    }
}
