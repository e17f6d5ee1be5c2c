// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scene pipelines and the GPU copies of the editor's grid and model.

use crate::targets::{RenderTargets, DEPTH_FORMAT};
use dae_scene::{grid::Grid, Editor, ModelMesh};
use glam::Mat4;
use wgpu::util::DeviceExt;

const MODEL_COLOR: [f32; 4] = [0.82, 0.82, 0.85, 1.0];

/// Model vertex.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position.
    pub pos: [f32; 3],
    /// Object-space normal.
    pub normal: [f32; 3],
}

/// Grid line vertex.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LineVertex {
    /// World-space position.
    pub pos: [f32; 3],
    /// Linear RGB.
    pub color: [f32; 3],
}

/// Shared uniforms; layout mirrors `Globals` in the WGSL sources.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Globals {
    /// Camera view-projection.
    pub view_proj: [[f32; 4]; 4],
    /// Inverse of `view_proj`, for sky rays.
    pub inv_view_proj: [[f32; 4]; 4],
    /// Model placement.
    pub model: [[f32; 4]; 4],
    /// xyz eye position.
    pub eye: [f32; 4],
    /// xyz direction towards the sun, w directional intensity.
    pub sun_dir: [f32; 4],
    /// rgb directional colour, w ambient intensity.
    pub light_color: [f32; 4],
    /// rgb ambient colour.
    pub ambient_color: [f32; 4],
    /// turbidity, rayleigh, luminance, mie coefficient.
    pub sky: [f32; 4],
    /// x mie directional g.
    pub sky_extra: [f32; 4],
    /// Model albedo.
    pub base_color: [f32; 4],
}

impl Globals {
    /// Uniforms for the editor's current camera, sky and model placement.
    pub fn for_editor(editor: &Editor) -> Self {
        let cam = editor.camera();
        let view_proj = cam.view_proj();
        let sky = editor.sky();
        let light = sky.lighting();
        let model = editor
            .model()
            .map_or(Mat4::IDENTITY, |m| m.transform.to_mat4());
        let [dr, dg, db] = light.directional_color;
        let [ar, ag, ab] = light.ambient_color;
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            inv_view_proj: view_proj.inverse().to_cols_array_2d(),
            model: model.to_cols_array_2d(),
            eye: cam.eye().extend(1.0).to_array(),
            sun_dir: light.sun_direction.extend(light.directional_intensity).to_array(),
            light_color: [dr, dg, db, light.ambient_intensity],
            ambient_color: [ar, ag, ab, 0.0],
            sky: [sky.turbidity, sky.rayleigh, sky.luminance, sky.mie_coefficient],
            sky_extra: [sky.mie_directional_g, 0.0, 0.0, 0.0],
            base_color: MODEL_COLOR,
        }
    }
}

/// Interleave positions and normals for upload.
pub fn mesh_vertices(mesh: &ModelMesh) -> Vec<Vertex> {
    mesh.positions
        .iter()
        .zip(&mesh.normals)
        .map(|(pos, normal)| Vertex {
            pos: *pos,
            normal: *normal,
        })
        .collect()
}

/// Line-list vertices for the grid, two per segment.
pub fn grid_vertices(grid: &Grid) -> Vec<LineVertex> {
    grid.lines()
        .into_iter()
        .flat_map(|(a, b)| {
            [
                LineVertex {
                    pos: a.to_array(),
                    color: grid.color,
                },
                LineVertex {
                    pos: b.to_array(),
                    color: grid.color,
                },
            ]
        })
        .collect()
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

struct Mesh {
    vbuf: wgpu::Buffer,
    ibuf: wgpu::Buffer,
    count: u32,
    /// Editor generation the buffers were built from.
    generation: u64,
}

struct Lines {
    buf: wgpu::Buffer,
    count: u32,
    /// Grid the buffer was built from.
    grid: Grid,
}

struct Pipelines {
    sky: wgpu::RenderPipeline,
    lines: wgpu::RenderPipeline,
    mesh: wgpu::RenderPipeline,
    /// Absent where `POLYGON_MODE_LINE` is unsupported (WebGL).
    mesh_wire: Option<wgpu::RenderPipeline>,
}

/// Draws the sky, the ground grid and the model.
///
/// The host owns the device, queue and surface. Once per frame it calls
/// [`prepare`](Self::prepare) with the editor, then records the pass with
/// [`encode`](Self::encode) (or [`draw`](Self::draw) into a pass it began).
pub struct SceneRenderer {
    globals_buf: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    pipelines: Pipelines,
    model: Option<Mesh>,
    grid: Option<Lines>,
}

impl SceneRenderer {
    /// Build the pipelines for a colour target of `format` at `sample_count`.
    pub fn new(device: &wgpu::Device, format: wgpu::TextureFormat, sample_count: u32) -> Self {
        let globals_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bg"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buf.as_entire_binding(),
            }],
        });
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&globals_layout],
            push_constant_ranges: &[],
        });

        let shader_sky = device.create_shader_module(wgpu::include_wgsl!("sky.wgsl"));
        let shader_lines = device.create_shader_module(wgpu::include_wgsl!("lines.wgsl"));
        let shader_mesh = device.create_shader_module(wgpu::include_wgsl!("mesh.wgsl"));

        let builder = PipelineBuilder {
            device,
            layout: &layout,
            format,
            sample_count: sample_count.max(1),
        };
        let vertex_layout = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0=>Float32x3,1=>Float32x3],
        }];
        let line_layout = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LineVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0=>Float32x3,1=>Float32x3],
        }];

        let sky = builder.build(
            "sky_pipeline",
            &shader_sky,
            &[],
            wgpu::PrimitiveState::default(),
            false,
            wgpu::CompareFunction::Always,
        );
        let lines = builder.build(
            "lines_pipeline",
            &shader_lines,
            &line_layout,
            wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                cull_mode: None,
                ..Default::default()
            },
            true,
            wgpu::CompareFunction::Less,
        );
        // COLLADA exports vary in winding, so both faces are drawn.
        let mesh = builder.build(
            "mesh_pipeline",
            &shader_mesh,
            &vertex_layout,
            wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            true,
            wgpu::CompareFunction::Less,
        );
        let mesh_wire = device
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE)
            .then(|| {
                builder.build(
                    "mesh_wire_pipeline",
                    &shader_mesh,
                    &vertex_layout,
                    wgpu::PrimitiveState {
                        topology: wgpu::PrimitiveTopology::TriangleList,
                        polygon_mode: wgpu::PolygonMode::Line,
                        cull_mode: None,
                        ..Default::default()
                    },
                    true,
                    wgpu::CompareFunction::LessEqual,
                )
            });
        if mesh_wire.is_none() {
            tracing::info!("wireframe unavailable on this device; drawing filled");
        }

        Self {
            globals_buf,
            bind_group,
            pipelines: Pipelines {
                sky,
                lines,
                mesh,
                mesh_wire,
            },
            model: None,
            grid: None,
        }
    }

    /// Whether `wireframe` requests are honoured.
    pub fn supports_wireframe(&self) -> bool {
        self.pipelines.mesh_wire.is_some()
    }

    /// Upload whatever changed in the editor since the last frame and the
    /// per-frame uniforms.
    pub fn prepare(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, editor: &Editor) {
        self.sync_grid(device, editor.grid());
        self.sync_model(device, editor.model().map(|m| &m.mesh), editor.generation());
        let globals = Globals::for_editor(editor);
        queue.write_buffer(&self.globals_buf, 0, bytemuck::bytes_of(&globals));
    }

    fn sync_model(&mut self, device: &wgpu::Device, mesh: Option<&ModelMesh>, generation: u64) {
        let current = self.model.as_ref().map(|m| m.generation);
        if current == Some(generation) || (current.is_none() && mesh.is_none()) {
            return;
        }
        self.model = mesh.map(|mesh| {
            let verts = mesh_vertices(mesh);
            let vbuf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("model_vb"),
                contents: bytemuck::cast_slice(&verts),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let ibuf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("model_ib"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            Mesh {
                vbuf,
                ibuf,
                count: count_u32(mesh.indices.len()),
                generation,
            }
        });
        tracing::debug!(generation, uploaded = self.model.is_some(), "model buffers synced");
    }

    fn sync_grid(&mut self, device: &wgpu::Device, grid: &Grid) {
        if self.grid.as_ref().is_some_and(|g| g.grid == *grid) {
            return;
        }
        let verts = grid_vertices(grid);
        let buf = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("grid_vb"),
            contents: bytemuck::cast_slice(&verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        self.grid = Some(Lines {
            buf,
            count: count_u32(verts.len()),
            grid: *grid,
        });
    }

    /// Record sky, grid and model into a pass the caller began.
    pub fn draw(&self, rpass: &mut wgpu::RenderPass<'_>, wireframe: bool) {
        rpass.set_bind_group(0, &self.bind_group, &[]);

        // sky
        rpass.set_pipeline(&self.pipelines.sky);
        rpass.draw(0..3, 0..1);

        // grid
        if let Some(grid) = &self.grid {
            rpass.set_pipeline(&self.pipelines.lines);
            rpass.set_vertex_buffer(0, grid.buf.slice(..));
            rpass.draw(0..grid.count, 0..1);
        }

        // model
        if let Some(mesh) = &self.model {
            let pipeline = match (&self.pipelines.mesh_wire, wireframe) {
                (Some(wire), true) => wire,
                _ => &self.pipelines.mesh,
            };
            rpass.set_pipeline(pipeline);
            rpass.set_vertex_buffer(0, mesh.vbuf.slice(..));
            rpass.set_index_buffer(mesh.ibuf.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..mesh.count, 0, 0..1);
        }
    }

    /// Begin the scene pass on `frame` (cleared, depth reset) and draw into it.
    pub fn encode(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        frame: &wgpu::TextureView,
        targets: &RenderTargets,
        wireframe: bool,
    ) {
        let (color_view, resolve_target) = targets.color(frame);
        let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("scene"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: color_view,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: targets.depth(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });
        self.draw(&mut rpass, wireframe);
    }
}

struct PipelineBuilder<'a> {
    device: &'a wgpu::Device,
    layout: &'a wgpu::PipelineLayout,
    format: wgpu::TextureFormat,
    sample_count: u32,
}

impl PipelineBuilder<'_> {
    fn build(
        &self,
        label: &str,
        module: &wgpu::ShaderModule,
        buffers: &[wgpu::VertexBufferLayout<'_>],
        primitive: wgpu::PrimitiveState,
        depth_write: bool,
        depth_compare: wgpu::CompareFunction,
    ) -> wgpu::RenderPipeline {
        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(self.layout),
                vertex: wgpu::VertexState {
                    module,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers,
                },
                fragment: Some(wgpu::FragmentState {
                    module,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.format,
                        blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                }),
                primitive,
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: depth_write,
                    depth_compare,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: wgpu::MultisampleState {
                    count: self.sample_count,
                    ..Default::default()
                },
                multiview: None,
                cache: None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use dae_scene::{
        model::{MeshPart, UpAxis},
        LoadOptions,
    };
    use std::time::Duration;

    fn triangle() -> ModelMesh {
        ModelMesh::from_parts(
            [MeshPart {
                positions: vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
                normals: Vec::new(),
                faces: vec![[0, 1, 2]],
            }],
            UpAxis::Y,
        )
        .unwrap()
    }

    #[test]
    fn globals_match_the_wgsl_uniform_layout() {
        // 3 mat4 + 7 vec4, 16-byte aligned.
        assert_eq!(std::mem::size_of::<Globals>(), 3 * 64 + 7 * 16);
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        assert_eq!(std::mem::size_of::<LineVertex>(), 24);
    }

    #[test]
    fn empty_scene_uses_identity_model_matrix() {
        let ed = Editor::new();
        let g = Globals::for_editor(&ed);
        assert_eq!(g.model, Mat4::IDENTITY.to_cols_array_2d());
        assert_eq!(g.eye[3], 1.0);
        let inv = Mat4::from_cols_array_2d(&g.inv_view_proj) * Mat4::from_cols_array_2d(&g.view_proj);
        assert!(inv.abs_diff_eq(Mat4::IDENTITY, 1e-3));
    }

    #[test]
    fn model_matrix_follows_the_transform() {
        let mut ed = Editor::new();
        ed.load(triangle(), None, &LoadOptions::default(), Duration::ZERO);
        ed.translate(3.0, 0.0, -2.0, Duration::ZERO);
        let g = Globals::for_editor(&ed);
        let m = Mat4::from_cols_array_2d(&g.model);
        assert_relative_eq!(m.w_axis.x, 3.0);
        assert_relative_eq!(m.w_axis.z, -2.0);
    }

    #[test]
    fn grid_vertices_come_in_coloured_pairs() {
        let grid = Grid::new(10.0);
        let verts = grid_vertices(&grid);
        assert_eq!(verts.len(), grid.lines().len() * 2);
        assert!(verts.iter().all(|v| v.color == grid.color && v.pos[1] == 0.0));
    }

    #[test]
    fn mesh_vertices_pair_positions_with_normals() {
        let mesh = triangle();
        let verts = mesh_vertices(&mesh);
        assert_eq!(verts.len(), mesh.positions.len());
        assert_eq!(verts[1].pos, [1.0, 0.0, 0.0]);
        assert_relative_eq!(verts[0].normal[2].abs(), 1.0, epsilon = 1e-5);
    }
}
