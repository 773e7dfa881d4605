//! The render pipeline and its dedicated thread.
//!
//! Initialization compiles the minimal default program and allocates
//! the pipeline's GPU objects; any failure there is fatal and
//! propagates, since no frame can render without them. After that the
//! render thread owns the backend exclusively - the control thread only
//! ever touches the command queue and the surface state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::{error, info, warn};

use crate::command::{RenderCommand, RenderConfig};
use crate::error::{GraphicsError, GraphicsResult};
use crate::gpu::{
    BufferId, GpuBackend, ProgramId, TextureId, DEFAULT_FRAGMENT_SHADER, DEFAULT_VERTEX_SHADER,
};
use crate::queue::CommandQueue;

/// Surface geometry and the derived scale factor.
#[derive(Clone, Copy, Debug)]
struct Surface {
    /// Actual surface width in device pixels.
    width: u32,
    /// Actual surface height in device pixels.
    height: u32,
    /// Ratio of actual to design-time width. The public contract for
    /// mapping logical coordinates to device pixels.
    scale_factor: f32,
}

/// The pipeline's GPU objects, created at initialization and released
/// exactly once when the render thread exits.
struct GpuObjects {
    /// The default shader program.
    program: ProgramId,
    /// The shared vertex buffer.
    buffer: BufferId,
    /// The shared texture object.
    texture: TextureId,
}

/// The threaded command-queue renderer.
#[derive(Debug)]
pub struct RenderPipeline {
    /// The cross-thread command queue.
    queue: Arc<CommandQueue>,
    /// Surface state, written by `on_surface_changed`.
    surface: Arc<RwLock<Surface>>,
    /// Frames presented by the render thread.
    frames: Arc<AtomicU64>,
    /// Commands executed by the render thread.
    executed: Arc<AtomicU64>,
    /// The render thread handle, taken at shutdown.
    thread: Option<JoinHandle<()>>,
    /// The configuration the pipeline was initialized with.
    config: RenderConfig,
}

impl RenderPipeline {
    /// Compiles the default program, allocates GPU objects and spawns
    /// the render thread.
    ///
    /// # Errors
    ///
    /// Propagates [`GraphicsError::ShaderCompile`] and
    /// [`GraphicsError::ProgramLink`] from the backend; both are fatal
    /// to initialization.
    pub fn initialize<B: GpuBackend + 'static>(
        config: RenderConfig,
        mut backend: B,
    ) -> GraphicsResult<Self> {
        let program = backend.compile_program(DEFAULT_VERTEX_SHADER, DEFAULT_FRAGMENT_SHADER)?;
        let buffer = backend.create_vertex_buffer()?;
        let texture = backend.create_texture()?;
        let objects = GpuObjects {
            program,
            buffer,
            texture,
        };

        let queue = Arc::new(CommandQueue::new());
        let surface = Arc::new(RwLock::new(Surface {
            width: config.design_width,
            height: config.design_height,
            scale_factor: 1.0,
        }));
        let frames = Arc::new(AtomicU64::new(0));
        let executed = Arc::new(AtomicU64::new(0));

        let thread = {
            let queue = Arc::clone(&queue);
            let frames = Arc::clone(&frames);
            let executed = Arc::clone(&executed);
            let interval = config.frame_interval();
            std::thread::Builder::new()
                .name("strato-render".to_owned())
                .spawn(move || render_loop(&queue, &mut backend, &objects, &frames, &executed, interval))
                .map_err(|e| GraphicsError::Backend(format!("failed to spawn render thread: {e}")))?
        };

        info!(
            design_width = config.design_width,
            design_height = config.design_height,
            target_fps = config.target_fps,
            "render pipeline initialized"
        );

        Ok(Self {
            queue,
            surface,
            frames,
            executed,
            thread: Some(thread),
            config,
        })
    }

    /// Queues a command and wakes the render thread. Never blocks the
    /// caller on GPU completion.
    pub fn submit(&self, command: RenderCommand) {
        self.queue.submit(command);
    }

    /// Records a new surface size and recomputes the scale factor as
    /// the ratio of actual to design-time width.
    pub fn on_surface_changed(&self, width: u32, height: u32) {
        let mut surface = self.surface.write();
        surface.width = width;
        surface.height = height;
        #[allow(clippy::cast_precision_loss)]
        {
            surface.scale_factor = width as f32 / self.config.design_width.max(1) as f32;
        }
        info!(width, height, scale = surface.scale_factor, "surface changed");
    }

    /// The current logical-to-device scale factor.
    #[must_use]
    pub fn scale_factor(&self) -> f32 {
        self.surface.read().scale_factor
    }

    /// The current surface size in device pixels.
    #[must_use]
    pub fn surface_size(&self) -> (u32, u32) {
        let surface = self.surface.read();
        (surface.width, surface.height)
    }

    /// Frames presented so far. Only frames with at least one command
    /// count; the thread never presents an empty batch.
    #[must_use]
    pub fn frames_rendered(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    /// Commands executed so far.
    #[must_use]
    pub fn commands_executed(&self) -> u64 {
        self.executed.load(Ordering::Acquire)
    }

    /// Number of commands still queued.
    #[must_use]
    pub fn pending_commands(&self) -> usize {
        self.queue.len()
    }

    /// Polls until at least `target` frames rendered or the timeout
    /// expires. Returns whether the target was reached.
    #[must_use]
    pub fn wait_for_frames(&self, target: u64, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while self.frames_rendered() < target {
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        true
    }

    /// Requests shutdown and joins the render thread. Pending commands
    /// are dropped, not executed. Idempotent.
    pub fn shutdown(&mut self) {
        self.queue.shutdown();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("render thread panicked during shutdown");
            }
        }
    }
}

impl Drop for RenderPipeline {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// The render thread body: wait, drain by swap, execute in submission
/// order, present, pace. Exits on shutdown or context loss; GPU objects
/// are released at the single exit point below.
fn render_loop(
    queue: &CommandQueue,
    backend: &mut dyn GpuBackend,
    objects: &GpuObjects,
    frames: &AtomicU64,
    executed: &AtomicU64,
    interval: Duration,
) {
    'frames: while let Some(batch) = queue.wait_drain() {
        let frame_start = Instant::now();

        for command in batch {
            match execute(backend, objects, &command) {
                Ok(()) => {
                    executed.fetch_add(1, Ordering::Release);
                }
                Err(GraphicsError::ContextLost) => {
                    error!("GPU context lost, stopping render thread");
                    queue.shutdown();
                    break 'frames;
                }
                Err(err) => {
                    // One bad command is skipped, not fatal.
                    warn!(%err, "render command skipped");
                }
            }
        }

        match backend.present() {
            Ok(()) => {
                frames.fetch_add(1, Ordering::Release);
            }
            Err(err) => {
                error!(%err, "present failed, stopping render thread");
                queue.shutdown();
                break 'frames;
            }
        }

        let elapsed = frame_start.elapsed();
        if elapsed < interval {
            std::thread::sleep(interval - elapsed);
        }
    }

    backend.release_resources(objects.program, objects.buffer, objects.texture);
}

/// Executes one command against the backend.
fn execute(
    backend: &mut dyn GpuBackend,
    objects: &GpuObjects,
    command: &RenderCommand,
) -> GraphicsResult<()> {
    match command {
        RenderCommand::Clear => backend.clear(),
        RenderCommand::DrawRect { x, y, w, h } => {
            backend.draw_rect(objects.program, objects.buffer, *x, *y, *w, *h)
        }
        RenderCommand::DrawTexture {
            x,
            y,
            w,
            h,
            pixels,
        } => backend.draw_texture(
            objects.program,
            objects.buffer,
            objects.texture,
            *x,
            *y,
            *w,
            *h,
            pixels,
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{GpuCall, HeadlessBackend, RecordingBackend};

    #[test]
    fn test_link_failure_is_fatal_to_initialization() {
        let backend = RecordingBackend::failing_link();
        let err = RenderPipeline::initialize(RenderConfig::default(), backend).unwrap_err();
        assert!(matches!(err, GraphicsError::ProgramLink { .. }));
    }

    #[test]
    fn test_commands_execute_exactly_once_in_order() {
        let backend = RecordingBackend::new();
        let recorder = backend.recorder();
        let mut pipeline = RenderPipeline::initialize(RenderConfig::default(), backend).unwrap();

        pipeline.submit(RenderCommand::Clear);
        pipeline.submit(RenderCommand::DrawRect {
            x: 0.0,
            y: 0.0,
            w: 10.0,
            h: 10.0,
        });

        assert!(pipeline.wait_for_frames(1, Duration::from_secs(2)));
        assert_eq!(pipeline.commands_executed(), 2);
        assert_eq!(pipeline.pending_commands(), 0);

        pipeline.shutdown();

        let calls = recorder.lock();
        // Initialization: program, buffer, texture.
        assert_eq!(calls[0], GpuCall::CompileProgram);
        assert_eq!(calls[1], GpuCall::CreateBuffer);
        assert_eq!(calls[2], GpuCall::CreateTexture);
        // The frame: both draw-related calls in submission order.
        assert_eq!(calls[3], GpuCall::Clear);
        assert_eq!(
            calls[4],
            GpuCall::DrawRect {
                x: 0.0,
                y: 0.0,
                w: 10.0,
                h: 10.0
            }
        );
        assert_eq!(calls[5], GpuCall::Present);
        // Thread exit released resources exactly once.
        assert_eq!(calls.iter().filter(|c| **c == GpuCall::Release).count(), 1);
    }

    #[test]
    fn test_commands_never_execute_twice_across_frames() {
        let backend = RecordingBackend::new();
        let recorder = backend.recorder();
        let mut pipeline = RenderPipeline::initialize(RenderConfig::default(), backend).unwrap();

        pipeline.submit(RenderCommand::Clear);
        assert!(pipeline.wait_for_frames(1, Duration::from_secs(2)));
        pipeline.submit(RenderCommand::Clear);
        assert!(pipeline.wait_for_frames(2, Duration::from_secs(2)));
        pipeline.shutdown();

        let calls = recorder.lock();
        let clears = calls.iter().filter(|c| **c == GpuCall::Clear).count();
        assert_eq!(clears, 2);
        assert_eq!(pipeline.commands_executed(), 2);
    }

    #[test]
    fn test_texture_command_carries_pixels() {
        let backend = RecordingBackend::new();
        let recorder = backend.recorder();
        let mut pipeline = RenderPipeline::initialize(RenderConfig::default(), backend).unwrap();

        let pixels: Arc<[u8]> = Arc::from(vec![0u8; 64].into_boxed_slice());
        pipeline.submit(RenderCommand::DrawTexture {
            x: 0.0,
            y: 0.0,
            w: 8.0,
            h: 8.0,
            pixels,
        });

        assert!(pipeline.wait_for_frames(1, Duration::from_secs(2)));
        pipeline.shutdown();

        let calls = recorder.lock();
        assert!(calls.contains(&GpuCall::DrawTexture { pixel_bytes: 64 }));
    }

    #[test]
    fn test_shutdown_without_frames() {
        let mut pipeline =
            RenderPipeline::initialize(RenderConfig::default(), HeadlessBackend::new()).unwrap();
        pipeline.shutdown();
        assert_eq!(pipeline.frames_rendered(), 0);
        // Second shutdown is a no-op.
        pipeline.shutdown();
    }

    #[test]
    fn test_scale_factor_tracks_surface_width() {
        let mut pipeline =
            RenderPipeline::initialize(RenderConfig::default(), HeadlessBackend::new()).unwrap();
        assert!((pipeline.scale_factor() - 1.0).abs() < f32::EPSILON);

        pipeline.on_surface_changed(2160, 3840);
        assert!((pipeline.scale_factor() - 2.0).abs() < f32::EPSILON);
        assert_eq!(pipeline.surface_size(), (2160, 3840));
        pipeline.shutdown();
    }
}
