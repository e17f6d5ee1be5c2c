// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Sky backdrop and scene lighting parameters.

use glam::Vec3;
use std::f32::consts::PI;

/// Parameters of the sky backdrop and the sun that lights the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyParams {
    /// Atmospheric haze.
    pub turbidity: f32,
    /// Rayleigh scattering strength.
    pub rayleigh: f32,
    /// Overall sky brightness.
    pub luminance: f32,
    /// Mie scattering coefficient.
    pub mie_coefficient: f32,
    /// Mie forward-scattering anisotropy.
    pub mie_directional_g: f32,
    /// Sun elevation control in `[0, 1]`; 0.5 puts the sun on the horizon.
    pub inclination: f32,
    /// Sun heading control in `[0, 1]`.
    pub azimuth: f32,
    /// Distance of the sun from the origin.
    pub distance: f32,
    /// Sun colour (linear RGB).
    pub sun_color: [f32; 3],
}

impl Default for SkyParams {
    fn default() -> Self {
        Self {
            turbidity: 10.0,
            rayleigh: 2.0,
            luminance: 1.0,
            mie_coefficient: 0.005,
            mie_directional_g: 0.8,
            inclination: 0.49,
            azimuth: 0.25,
            distance: 800_000.0,
            sun_color: [1.0; 3],
        }
    }
}

impl SkyParams {
    /// World-space sun position.
    pub fn sun_position(&self) -> Vec3 {
        let theta = PI * (self.inclination - 0.5);
        let phi = 2.0 * PI * (self.azimuth - 0.5);
        Vec3::new(
            self.distance * phi.cos(),
            self.distance * phi.sin() * theta.sin(),
            self.distance * phi.sin() * theta.cos(),
        )
    }

    /// Unit vector pointing from the origin towards the sun.
    pub fn sun_direction(&self) -> Vec3 {
        let dir = self.sun_position().normalize_or_zero();
        if dir == Vec3::ZERO {
            Vec3::Y
        } else {
            dir
        }
    }

    /// Directional + ambient lighting derived from the sun.
    pub fn lighting(&self) -> Lighting {
        Lighting {
            sun_direction: self.sun_direction(),
            directional_color: self.sun_color,
            directional_intensity: 0.7,
            ambient_color: self.sun_color,
            ambient_intensity: 0.3,
        }
    }
}

/// Scene lighting: one directional light at the sun plus an ambient term.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lighting {
    /// Direction towards the light.
    pub sun_direction: Vec3,
    /// Directional light colour.
    pub directional_color: [f32; 3],
    /// Directional light intensity.
    pub directional_intensity: f32,
    /// Ambient light colour.
    pub ambient_color: [f32; 3],
    /// Ambient light intensity.
    pub ambient_intensity: f32,
}
