//! Render commands and pipeline configuration.

use std::sync::Arc;
use std::time::Duration;

/// A single queued render operation.
///
/// Commands are value-copied into the queue; the queue owns them until
/// the render thread consumes them.
#[derive(Clone, Debug)]
pub enum RenderCommand {
    /// Clear the framebuffer.
    Clear,
    /// Draw an untextured rectangle in logical coordinates.
    DrawRect {
        /// Left edge.
        x: f32,
        /// Top edge.
        y: f32,
        /// Width.
        w: f32,
        /// Height.
        h: f32,
    },
    /// Draw a textured rectangle in logical coordinates.
    DrawTexture {
        /// Left edge.
        x: f32,
        /// Top edge.
        y: f32,
        /// Width.
        w: f32,
        /// Height.
        h: f32,
        /// Opaque pixel buffer, shared rather than pointed at.
        pixels: Arc<[u8]>,
    },
}

/// Render pipeline configuration.
#[derive(Clone, Copy, Debug)]
pub struct RenderConfig {
    /// Design-time surface width; the scale factor is computed against
    /// this.
    pub design_width: u32,
    /// Design-time surface height.
    pub design_height: u32,
    /// Target frame rate the render thread paces itself to.
    pub target_fps: u32,
    /// Whether vertical sync is requested from the backend.
    pub vsync: bool,
    /// Multisampling sample count.
    pub msaa_samples: u32,
}

impl RenderConfig {
    /// The frame interval derived from the target frame rate.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.target_fps.max(1)))
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            design_width: 1080,
            design_height: 1920,
            target_fps: 60,
            vsync: true,
            msaa_samples: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_interval_from_fps() {
        let config = RenderConfig {
            target_fps: 60,
            ..RenderConfig::default()
        };
        assert_eq!(config.frame_interval(), Duration::from_micros(16_666));
    }

    #[test]
    fn test_zero_fps_does_not_divide_by_zero() {
        let config = RenderConfig {
            target_fps: 0,
            ..RenderConfig::default()
        };
        assert_eq!(config.frame_interval(), Duration::from_secs(1));
    }
}
