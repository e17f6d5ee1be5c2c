// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Scene model for the DAE Stage editor.
//!
//! Everything here is renderer-agnostic: the native viewer and the WASM host
//! bindings both drive an [`editor::Editor`] and draw whatever it describes.
//!
//! - [`model`]: COLLADA loading (parsing via `mesh-loader`) into one indexed mesh.
//! - [`transform`] / [`state`]: the model transform and the snapshot exposed to hosts.
//! - [`watch`]: per-frame state polling with change listeners.
//! - [`gizmo`]: transform handle modes, picking, and drag math.
//! - [`camera`]: perspective camera with orbit controls.
//! - [`grid`] / [`sky`]: ground grid with corner labels, sky and lighting parameters.
//! - [`redraw`]: deferred redraw scheduling.

pub mod camera;
pub mod editor;
pub mod gizmo;
pub mod grid;
pub mod model;
pub mod redraw;
pub mod sky;
pub mod state;
/// Model placement: translation, Euler rotation, scale.
pub mod transform;
pub mod watch;

pub use editor::{Editor, FrameTick, LoadedModel};
pub use model::{LoadOptions, ModelError, ModelMesh};
pub use state::TransformState;
pub use transform::ModelTransform;
