// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Command-line flags.

use clap::Parser;
use dae_scene::LoadOptions;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "dae-viewer",
    version,
    about = "View a COLLADA model on a ground grid and adjust its transform"
)]
pub struct Args {
    /// `.dae` file to open on start (defaults to the last model opened).
    pub model: Option<PathBuf>,

    /// Ground grid edge length.
    #[arg(long)]
    pub grid: Option<f32>,

    /// Uniform scale applied after loading.
    #[arg(long)]
    pub scale: Option<f32>,

    /// Rotation in degrees, `x,y,z`.
    #[arg(long, value_parser = parse_triple, allow_hyphen_values = true)]
    pub rotate: Option<[f32; 3]>,

    /// Position, `x,y,z`.
    #[arg(long, value_parser = parse_triple, allow_hyphen_values = true)]
    pub translate: Option<[f32; 3]>,

    /// Keep the document's up axis instead of rotating it to Y-up.
    #[arg(long)]
    pub no_up_axis: bool,

    /// Centre the mesh on its bounding box.
    #[arg(long)]
    pub recenter: bool,
}

impl Args {
    /// Loader options from the flags; `convert_up_axis` falls back to `prefs_up_axis`.
    pub fn load_options(&self, prefs_up_axis: bool) -> LoadOptions {
        let defaults = LoadOptions::default();
        LoadOptions {
            scale: self.scale.unwrap_or(defaults.scale),
            rotation: self.rotate.unwrap_or(defaults.rotation),
            position: self.translate.unwrap_or(defaults.position),
            convert_up_axis: prefs_up_axis && !self.no_up_axis,
            recenter: self.recenter,
        }
    }
}

/// Parse `x,y,z` into three finite floats.
pub fn parse_triple(s: &str) -> Result<[f32; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, z] = parts.as_slice() else {
        return Err(format!("expected x,y,z but got `{s}`"));
    };
    let mut out = [0.0; 3];
    for (slot, raw) in out.iter_mut().zip([x, y, z]) {
        let v: f32 = raw
            .parse()
            .map_err(|e| format!("invalid number `{raw}`: {e}"))?;
        if !v.is_finite() {
            return Err(format!("`{raw}` is not finite"));
        }
        *slot = v;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triples_parse_with_spaces_and_negatives() {
        assert_eq!(parse_triple("1, -2.5,3"), Ok([1.0, -2.5, 3.0]));
        assert!(parse_triple("1,2").is_err());
        assert!(parse_triple("1,2,x").is_err());
        assert!(parse_triple("1,2,inf").is_err());
    }

    #[test]
    fn flags_become_load_options() {
        let args = Args::parse_from([
            "dae-viewer",
            "duck.dae",
            "--scale",
            "2",
            "--rotate",
            "-90,0,0",
            "--no-up-axis",
        ]);
        let opts = args.load_options(true);
        assert_eq!(opts.scale, 2.0);
        assert_eq!(opts.rotation, [-90.0, 0.0, 0.0]);
        assert_eq!(opts.position, [0.0; 3]);
        assert!(!opts.convert_up_axis);
        assert!(!opts.recenter);
    }

    #[test]
    fn prefs_decide_up_axis_when_flag_is_absent() {
        let args = Args::parse_from(["dae-viewer"]);
        assert!(args.load_options(true).convert_up_axis);
        assert!(!args.load_options(false).convert_up_axis);
    }
}
