// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! wgpu renderer for the DAE Stage scene.
//!
//! Draws the sky, the ground grid and the loaded model of a
//! [`dae_scene::Editor`]. The native viewer uses it on a window surface and
//! the browser build on a WebGL2 canvas; each host owns its surface, device
//! and queue and hands them in.
//!
//! Invariants:
//! - Geometry is re-uploaded only when the editor's model generation or grid
//!   changes; uniforms are written every frame.
//! - Wireframe is best effort: devices without `POLYGON_MODE_LINE` draw filled.

pub mod scene;
pub mod targets;

pub use scene::{grid_vertices, mesh_vertices, Globals, LineVertex, SceneRenderer, Vertex};
pub use targets::{supported_sample_count, RenderTargets, DEPTH_FORMAT};
