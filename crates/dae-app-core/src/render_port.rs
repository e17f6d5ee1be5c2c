// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Port trait for adapters to drive the host surface (redraws, caption)
//! without depending on a specific windowing crate.

/// Host surface port.
pub trait RenderPort {
    /// Ask the surface for another frame.
    fn request_redraw(&self);
    /// Replace the surface caption, e.g. with the loaded model's name.
    fn set_caption(&self, caption: &str);
}

/// Caption shown for the given model source (file stem), or the bare app name.
pub fn caption_for(app: &str, source: Option<&str>) -> String {
    let stem = source.and_then(|s| {
        let name = s.rsplit(['/', '\\']).next().unwrap_or(s);
        let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
        (!stem.is_empty()).then_some(stem)
    });
    match stem {
        Some(stem) => format!("{stem} - {app}"),
        None => app.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::caption_for;

    #[test]
    fn caption_uses_file_stem() {
        assert_eq!(caption_for("DAE Stage", Some("/tmp/models/duck.dae")), "duck - DAE Stage");
        assert_eq!(caption_for("DAE Stage", Some("C:\\m\\ship.DAE")), "ship - DAE Stage");
        assert_eq!(caption_for("DAE Stage", None), "DAE Stage");
    }
}
