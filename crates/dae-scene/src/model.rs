// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! COLLADA loader adapter.
//!
//! Parsing is delegated to `mesh-loader`; this module flattens the parsed
//! scene into a single indexed triangle list the renderer can upload, rotates
//! Z-up and X-up documents into the editor's Y-up world, and fills in smooth
//! normals for assets that ship without them.

use glam::Vec3;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading a model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The file could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The document is not valid COLLADA.
    #[error("invalid COLLADA document: {0}")]
    Parse(#[source] std::io::Error),
    /// The document parsed but holds no triangles.
    #[error("COLLADA document contains no triangle geometry")]
    Empty,
}

/// Up axis declared in a document's `<asset>` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UpAxis {
    /// X points up.
    X,
    /// Y points up (the editor's convention).
    #[default]
    Y,
    /// Z points up.
    Z,
}

impl UpAxis {
    /// Read `asset/up_axis` from a COLLADA document; Y when absent, unknown,
    /// or when the document is not well-formed XML.
    pub fn detect(doc: &str) -> Self {
        let xml = match roxmltree::Document::parse(doc) {
            Ok(xml) => xml,
            Err(err) => {
                tracing::debug!(%err, "up axis unreadable, assuming Y_UP");
                return UpAxis::Y;
            }
        };
        xml.root_element()
            .children()
            .filter(|n| n.has_tag_name("asset"))
            .flat_map(|asset| asset.children())
            .find(|n| n.has_tag_name("up_axis"))
            .and_then(|n| n.text())
            .map_or(UpAxis::Y, |text| match text.trim() {
                "X_UP" => UpAxis::X,
                "Z_UP" => UpAxis::Z,
                _ => UpAxis::Y,
            })
    }

    /// Map a vector from this convention into Y-up.
    pub fn to_y_up(self, v: Vec3) -> Vec3 {
        match self {
            UpAxis::Y => v,
            UpAxis::Z => Vec3::new(v.x, v.z, -v.y),
            UpAxis::X => Vec3::new(-v.y, v.x, v.z),
        }
    }
}

/// Initial placement and loader flags for a model load.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadOptions {
    /// Uniform scale applied on load.
    pub scale: f32,
    /// Rotation in degrees (XYZ order).
    pub rotation: [f32; 3],
    /// World position.
    pub position: [f32; 3],
    /// Rotate Z-up/X-up documents into Y-up.
    pub convert_up_axis: bool,
    /// Move the mesh so its bounding box is centred on the model origin.
    pub recenter: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            rotation: [0.0; 3],
            position: [0.0; 3],
            convert_up_axis: true,
            recenter: false,
        }
    }
}

/// Axis-aligned bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb {
    /// Centre point.
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Radius of the bounding sphere around the centre.
    pub fn radius(&self) -> f32 {
        (self.max - self.min).length() * 0.5
    }
}

/// One parsed mesh prior to merging.
#[derive(Debug, Clone, Default)]
pub struct MeshPart {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Per-vertex normals; ignored unless it matches `positions` in length.
    pub normals: Vec<[f32; 3]>,
    /// Triangles as vertex indices.
    pub faces: Vec<[u32; 3]>,
}

/// Merged, renderer-ready triangle mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMesh {
    /// Vertex positions.
    pub positions: Vec<[f32; 3]>,
    /// Unit normals, one per position.
    pub normals: Vec<[f32; 3]>,
    /// Triangle list indices.
    pub indices: Vec<u32>,
    bounds: Aabb,
}

impl ModelMesh {
    /// Read and parse a `.dae` file.
    pub fn from_collada_file(path: impl AsRef<Path>, convert_up_axis: bool) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mesh = Self::from_collada_bytes(&bytes, convert_up_axis)?;
        tracing::info!(
            path = %path.display(),
            vertices = mesh.positions.len(),
            triangles = mesh.triangle_count(),
            "loaded COLLADA model"
        );
        Ok(mesh)
    }

    /// Parse a COLLADA document held in memory.
    pub fn from_collada_bytes(bytes: &[u8], convert_up_axis: bool) -> Result<Self, ModelError> {
        let scene = mesh_loader::collada::from_slice(bytes).map_err(ModelError::Parse)?;
        let up = if convert_up_axis {
            UpAxis::detect(&String::from_utf8_lossy(bytes))
        } else {
            UpAxis::Y
        };
        let parts = scene.meshes.into_iter().map(|m| MeshPart {
            positions: m.vertices,
            normals: m.normals,
            faces: m.faces,
        });
        Self::from_parts(parts, up)
    }

    /// Merge parsed meshes into one, converting them into Y-up.
    pub fn from_parts(parts: impl IntoIterator<Item = MeshPart>, up: UpAxis) -> Result<Self, ModelError> {
        let mut positions: Vec<[f32; 3]> = Vec::new();
        let mut normals: Vec<[f32; 3]> = Vec::new();
        let mut indices: Vec<u32> = Vec::new();
        let mut dropped = 0usize;

        for part in parts {
            let base = positions.len();
            let count = part.positions.len();
            let Ok(base_u32) = u32::try_from(base) else {
                tracing::warn!("model exceeds u32 vertex indices; truncating");
                break;
            };
            let converted: Vec<Vec3> = part
                .positions
                .iter()
                .map(|p| up.to_y_up(Vec3::from_array(*p)))
                .collect();
            let faces: Vec<[u32; 3]> = part
                .faces
                .iter()
                .copied()
                .filter(|f| {
                    let ok = f.iter().all(|&i| (i as usize) < count);
                    if !ok {
                        dropped += 1;
                    }
                    ok
                })
                .collect();
            let part_normals: Vec<Vec3> = if part.normals.len() == count {
                part.normals
                    .iter()
                    .map(|n| up.to_y_up(Vec3::from_array(*n)).normalize_or_zero())
                    .collect()
            } else {
                smooth_normals(&converted, &faces)
            };

            positions.extend(converted.iter().map(|v| v.to_array()));
            normals.extend(part_normals.iter().map(|n| n.to_array()));
            indices.extend(faces.iter().flat_map(|f| f.map(|i| i + base_u32)));
        }

        if dropped > 0 {
            tracing::warn!(dropped, "skipped faces with out-of-range indices");
        }
        if indices.is_empty() {
            return Err(ModelError::Empty);
        }
        let bounds = compute_bounds(&positions);
        Ok(Self {
            positions,
            normals,
            indices,
            bounds,
        })
    }

    /// Bounding box of all positions.
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Shift positions so the bounding box is centred on the origin.
    pub fn recenter(&mut self) {
        let c = self.bounds.center();
        if c == Vec3::ZERO {
            return;
        }
        for p in &mut self.positions {
            *p = (Vec3::from_array(*p) - c).to_array();
        }
        self.bounds = Aabb {
            min: self.bounds.min - c,
            max: self.bounds.max - c,
        };
    }
}

fn compute_bounds(positions: &[[f32; 3]]) -> Aabb {
    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);
    for p in positions {
        let v = Vec3::from_array(*p);
        min = min.min(v);
        max = max.max(v);
    }
    Aabb { min, max }
}

/// Area-weighted vertex normals; vertices without faces get +Y.
fn smooth_normals(positions: &[Vec3], faces: &[[u32; 3]]) -> Vec<Vec3> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for f in faces {
        let [a, b, c] = f.map(|i| i as usize);
        let n = (positions[b] - positions[a]).cross(positions[c] - positions[a]);
        acc[a] += n;
        acc[b] += n;
        acc[c] += n;
    }
    acc.into_iter()
        .map(|n| {
            let n = n.normalize_or_zero();
            if n == Vec3::ZERO {
                Vec3::Y
            } else {
                n
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quad() -> MeshPart {
        MeshPart {
            positions: vec![[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 2.0, 0.0], [0.0, 2.0, 0.0]],
            normals: Vec::new(),
            faces: vec![[0, 1, 2], [0, 2, 3]],
        }
    }

    #[test]
    fn detects_declared_up_axis() {
        let doc = |asset: &str| format!(r#"<COLLADA xmlns="http://www.collada.org/2005/11/COLLADASchema" version="1.4.1">{asset}</COLLADA>"#);
        assert_eq!(UpAxis::detect(&doc("<asset><up_axis> Z_UP </up_axis></asset>")), UpAxis::Z);
        assert_eq!(UpAxis::detect(&doc("<asset><up_axis>X_UP</up_axis></asset>")), UpAxis::X);
        assert_eq!(UpAxis::detect(&doc("<asset/>")), UpAxis::Y);
        assert_eq!(UpAxis::detect("<COLLADA><asset><up_axis>Z_UP</asset>"), UpAxis::Y);
    }

    #[test]
    fn up_axis_outside_the_asset_block_is_ignored() {
        let doc = r#"<COLLADA>
            <!-- exported as <up_axis>Z_UP</up_axis> originally -->
            <asset><up_axis>Y_UP</up_axis></asset>
            <extra><technique profile="x"><up_axis>X_UP</up_axis></technique></extra>
        </COLLADA>"#;
        assert_eq!(UpAxis::detect(doc), UpAxis::Y);
        assert_eq!(UpAxis::detect("<COLLADA><!-- <up_axis>Z_UP</up_axis> --></COLLADA>"), UpAxis::Y);
    }

    #[test]
    fn z_up_maps_up_vector_onto_y() {
        assert_eq!(UpAxis::Z.to_y_up(Vec3::Z), Vec3::Y);
        assert_eq!(UpAxis::X.to_y_up(Vec3::X), Vec3::Y);
        assert_eq!(UpAxis::Y.to_y_up(Vec3::new(1.0, 2.0, 3.0)), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn merging_offsets_indices_of_later_parts() {
        let mesh = ModelMesh::from_parts([quad(), quad()], UpAxis::Y).unwrap();
        assert_eq!(mesh.positions.len(), 8);
        assert_eq!(mesh.triangle_count(), 4);
        assert_eq!(&mesh.indices[6..9], &[4, 5, 6]);
    }

    #[test]
    fn missing_normals_are_computed_facing_the_winding() {
        let mesh = ModelMesh::from_parts([quad()], UpAxis::Y).unwrap();
        for n in &mesh.normals {
            assert_relative_eq!(n[2], 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn out_of_range_faces_are_dropped_and_empty_is_an_error() {
        let bad = MeshPart {
            positions: vec![[0.0; 3]; 3],
            normals: Vec::new(),
            faces: vec![[0, 1, 7]],
        };
        assert!(matches!(
            ModelMesh::from_parts([bad], UpAxis::Y),
            Err(ModelError::Empty)
        ));
    }

    #[test]
    fn recenter_moves_bounds_to_origin() {
        let mut mesh = ModelMesh::from_parts([quad()], UpAxis::Y).unwrap();
        assert_eq!(mesh.bounds().center(), Vec3::new(1.0, 1.0, 0.0));
        mesh.recenter();
        assert_eq!(mesh.bounds().center(), Vec3::ZERO);
        assert_eq!(mesh.positions[0], [-1.0, -1.0, 0.0]);
        assert_relative_eq!(mesh.bounds().radius(), 2f32.sqrt(), epsilon = 1e-6);
    }
}
