// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Ground grid on the y = 0 plane with coordinate labels at its corners.

use glam::Vec3;

/// Default edge length of the ground grid.
pub const DEFAULT_GRID_SIZE: f32 = 100.0;
/// Cells along each edge.
pub const GRID_DIVISIONS: u32 = 10;

/// Square ground grid centred on the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    /// Edge length.
    pub size: f32,
    /// Cells along each edge.
    pub divisions: u32,
    /// Line colour (linear RGB).
    pub color: [f32; 3],
}

/// Text placed at a world position.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLabel {
    /// Anchor on the grid plane.
    pub position: Vec3,
    /// Label text, e.g. `x: -50 z: 50`.
    pub text: String,
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(DEFAULT_GRID_SIZE)
    }
}

impl Grid {
    /// White grid of the given edge length with [`GRID_DIVISIONS`] cells.
    /// Non-finite or non-positive sizes fall back to the default size.
    pub fn new(size: f32) -> Self {
        let size = if size.is_finite() && size > 0.0 {
            size
        } else {
            DEFAULT_GRID_SIZE
        };
        Self {
            size,
            divisions: GRID_DIVISIONS,
            color: [1.0; 3],
        }
    }

    /// Line segments: `divisions + 1` parallel to Z, then as many parallel to X.
    pub fn lines(&self) -> Vec<(Vec3, Vec3)> {
        let half = self.size / 2.0;
        let step = self.size / self.divisions.max(1) as f32;
        let n = self.divisions.max(1) + 1;
        let mut out = Vec::with_capacity(n as usize * 2);
        for i in 0..n {
            let k = -half + i as f32 * step;
            out.push((Vec3::new(k, 0.0, -half), Vec3::new(k, 0.0, half)));
        }
        for i in 0..n {
            let k = -half + i as f32 * step;
            out.push((Vec3::new(-half, 0.0, k), Vec3::new(half, 0.0, k)));
        }
        out
    }

    /// One label per corner.
    pub fn labels(&self) -> Vec<GridLabel> {
        let half = self.size / 2.0;
        [(-half, -half), (-half, half), (half, -half), (half, half)]
            .into_iter()
            .map(|(x, z)| GridLabel {
                position: Vec3::new(x, 0.0, z),
                text: format!("x: {} z: {}", fmt_coord(x), fmt_coord(z)),
            })
            .collect()
    }
}

/// Integers print without a fractional part; other values keep theirs.
fn fmt_coord(v: f32) -> String {
    // Display for f32 already prints 50.0 as "50"; normalise -0 to 0.
    let v = if v == 0.0 { 0.0 } else { v };
    format!("{v}")
}
