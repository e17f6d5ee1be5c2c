// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Depth and multisample attachments sized to the host surface.

/// Depth buffer format used by every scene pipeline.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Offscreen attachments for the scene pass.
pub struct RenderTargets {
    format: wgpu::TextureFormat,
    sample_count: u32,
    width: u32,
    height: u32,
    depth: wgpu::TextureView,
    msaa: Option<wgpu::TextureView>,
}

impl RenderTargets {
    /// Allocate attachments for a `width` x `height` surface of `format`.
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> Self {
        let sample_count = sample_count.max(1);
        Self {
            format,
            sample_count,
            width,
            height,
            depth: create_depth(device, width, height, sample_count),
            msaa: create_msaa(device, format, width, height, sample_count),
        }
    }

    /// Reallocate for a new surface size. Zero-sized requests are ignored.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == (self.width, self.height) {
            return;
        }
        *self = Self::new(device, self.format, width, height, self.sample_count);
    }

    /// Samples per pixel the pipelines must be built for.
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Depth attachment.
    pub fn depth(&self) -> &wgpu::TextureView {
        &self.depth
    }

    /// View to draw into and the view to resolve into, given the frame's view.
    pub fn color<'a>(
        &'a self,
        frame: &'a wgpu::TextureView,
    ) -> (&'a wgpu::TextureView, Option<&'a wgpu::TextureView>) {
        match &self.msaa {
            Some(msaa) => (msaa, Some(frame)),
            None => (frame, None),
        }
    }
}

/// Largest of `preferred` and lower power-of-two counts that both the colour
/// format and the depth format support on `adapter`. WebGL2 adapters commonly
/// stop at 4; software adapters may only offer 1.
pub fn supported_sample_count(
    adapter: &wgpu::Adapter,
    format: wgpu::TextureFormat,
    preferred: u32,
) -> u32 {
    let color = adapter.get_texture_format_features(format).flags;
    let depth = adapter.get_texture_format_features(DEPTH_FORMAT).flags;
    let mut count = preferred.max(1).next_power_of_two();
    while count > 1 {
        if color.sample_count_supported(count) && depth.sample_count_supported(count) {
            return count;
        }
        count /= 2;
    }
    1
}

fn create_depth(device: &wgpu::Device, w: u32, h: u32, sample_count: u32) -> wgpu::TextureView {
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth"),
        size: wgpu::Extent3d {
            width: w.max(1),
            height: h.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    tex.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_msaa(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    w: u32,
    h: u32,
    sample_count: u32,
) -> Option<wgpu::TextureView> {
    if sample_count <= 1 {
        return None;
    }
    let tex = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("msaa_color"),
        size: wgpu::Extent3d {
            width: w.max(1),
            height: h.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    Some(tex.create_view(&wgpu::TextureViewDescriptor::default()))
}
