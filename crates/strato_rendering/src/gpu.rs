//! The GPU backend seam.
//!
//! The pipeline's entire contract with the GPU: shader compile/link,
//! buffer/texture object creation, draw-call submission and a present
//! call. Any command-queue renderer satisfying this trait can be
//! swapped in; the shipped implementations are a headless backend for
//! surfaceless runs and a recording backend for tests.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{GraphicsError, GraphicsResult};

/// Handle to a compiled and linked shader program.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramId(pub u32);

/// Handle to a vertex buffer object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferId(pub u32);

/// Handle to a texture object.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureId(pub u32);

/// The minimal default vertex program.
pub const DEFAULT_VERTEX_SHADER: &str = r"
attribute vec4 a_position;
attribute vec2 a_tex_coord;
varying vec2 v_tex_coord;
uniform mat4 u_mvp_matrix;

void main() {
    gl_Position = u_mvp_matrix * a_position;
    v_tex_coord = a_tex_coord;
}
";

/// The minimal default fragment program.
pub const DEFAULT_FRAGMENT_SHADER: &str = r"
precision mediump float;
varying vec2 v_tex_coord;
uniform sampler2D u_texture;

void main() {
    gl_FragColor = texture2D(u_texture, v_tex_coord);
}
";

/// Narrow collaborator interface over the GPU.
pub trait GpuBackend: Send {
    /// Compiles and links a vertex+fragment program pair.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::ShaderCompile`] or
    /// [`GraphicsError::ProgramLink`]; both are fatal to pipeline
    /// initialization.
    fn compile_program(&mut self, vertex_src: &str, fragment_src: &str)
        -> GraphicsResult<ProgramId>;

    /// Creates a vertex buffer object.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::Backend`] when allocation fails.
    fn create_vertex_buffer(&mut self) -> GraphicsResult<BufferId>;

    /// Creates a texture object.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::Backend`] when allocation fails.
    fn create_texture(&mut self) -> GraphicsResult<TextureId>;

    /// Clears the framebuffer.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::ContextLost`] when the context is gone.
    fn clear(&mut self) -> GraphicsResult<()>;

    /// Draws an untextured rectangle.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::Backend`] for a failed draw call.
    fn draw_rect(
        &mut self,
        program: ProgramId,
        buffer: BufferId,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    ) -> GraphicsResult<()>;

    /// Uploads `pixels` into `texture` and draws a textured rectangle.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::Backend`] for a failed upload or draw.
    #[allow(clippy::too_many_arguments)]
    fn draw_texture(
        &mut self,
        program: ProgramId,
        buffer: BufferId,
        texture: TextureId,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        pixels: &[u8],
    ) -> GraphicsResult<()>;

    /// Swaps/presents the frame.
    ///
    /// # Errors
    ///
    /// Returns [`GraphicsError::ContextLost`] when the context is gone.
    fn present(&mut self) -> GraphicsResult<()>;

    /// Releases the pipeline's GPU objects. Called exactly once.
    fn release_resources(&mut self, program: ProgramId, buffer: BufferId, texture: TextureId);
}

impl GpuBackend for Box<dyn GpuBackend> {
    fn compile_program(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> GraphicsResult<ProgramId> {
        (**self).compile_program(vertex_src, fragment_src)
    }

    fn create_vertex_buffer(&mut self) -> GraphicsResult<BufferId> {
        (**self).create_vertex_buffer()
    }

    fn create_texture(&mut self) -> GraphicsResult<TextureId> {
        (**self).create_texture()
    }

    fn clear(&mut self) -> GraphicsResult<()> {
        (**self).clear()
    }

    fn draw_rect(
        &mut self,
        program: ProgramId,
        buffer: BufferId,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    ) -> GraphicsResult<()> {
        (**self).draw_rect(program, buffer, x, y, w, h)
    }

    fn draw_texture(
        &mut self,
        program: ProgramId,
        buffer: BufferId,
        texture: TextureId,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        pixels: &[u8],
    ) -> GraphicsResult<()> {
        (**self).draw_texture(program, buffer, texture, x, y, w, h, pixels)
    }

    fn present(&mut self) -> GraphicsResult<()> {
        (**self).present()
    }

    fn release_resources(&mut self, program: ProgramId, buffer: BufferId, texture: TextureId) {
        (**self).release_resources(program, buffer, texture);
    }
}

/// Backend for surfaceless runs: validates inputs, counts calls,
/// renders nothing.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    /// Next object id to hand out.
    next_id: u32,
    /// Draw-related calls executed.
    draw_calls: u64,
    /// Frames presented.
    presents: u64,
}

impl HeadlessBackend {
    /// Creates a headless backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

impl GpuBackend for HeadlessBackend {
    fn compile_program(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> GraphicsResult<ProgramId> {
        if vertex_src.trim().is_empty() {
            return Err(GraphicsError::ShaderCompile {
                stage: "vertex",
                log: "empty source".to_owned(),
            });
        }
        if fragment_src.trim().is_empty() {
            return Err(GraphicsError::ShaderCompile {
                stage: "fragment",
                log: "empty source".to_owned(),
            });
        }
        let id = ProgramId(self.next_id());
        debug!(?id, "program compiled (headless)");
        Ok(id)
    }

    fn create_vertex_buffer(&mut self) -> GraphicsResult<BufferId> {
        Ok(BufferId(self.next_id()))
    }

    fn create_texture(&mut self) -> GraphicsResult<TextureId> {
        Ok(TextureId(self.next_id()))
    }

    fn clear(&mut self) -> GraphicsResult<()> {
        self.draw_calls += 1;
        Ok(())
    }

    fn draw_rect(
        &mut self,
        _program: ProgramId,
        _buffer: BufferId,
        _x: f32,
        _y: f32,
        _w: f32,
        _h: f32,
    ) -> GraphicsResult<()> {
        self.draw_calls += 1;
        Ok(())
    }

    fn draw_texture(
        &mut self,
        _program: ProgramId,
        _buffer: BufferId,
        _texture: TextureId,
        _x: f32,
        _y: f32,
        _w: f32,
        _h: f32,
        _pixels: &[u8],
    ) -> GraphicsResult<()> {
        self.draw_calls += 1;
        Ok(())
    }

    fn present(&mut self) -> GraphicsResult<()> {
        self.presents += 1;
        Ok(())
    }

    fn release_resources(&mut self, program: ProgramId, buffer: BufferId, texture: TextureId) {
        debug!(?program, ?buffer, ?texture, "resources released (headless)");
    }
}

/// One call observed by the [`RecordingBackend`].
#[derive(Clone, Debug, PartialEq)]
pub enum GpuCall {
    /// `compile_program` succeeded.
    CompileProgram,
    /// `create_vertex_buffer` succeeded.
    CreateBuffer,
    /// `create_texture` succeeded.
    CreateTexture,
    /// A clear was executed.
    Clear,
    /// An untextured rectangle was drawn.
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
    /// A textured rectangle was drawn.
    DrawTexture {
        /// Size of the uploaded pixel buffer.
        pixel_bytes: usize,
    },
    /// A frame was presented.
    Present,
    /// Resources were released.
    Release,
}

/// Test double: records every call in order, shareable across threads.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    /// Recorded calls, shared with the test that built the backend.
    calls: Arc<Mutex<Vec<GpuCall>>>,
    /// When set, `compile_program` fails with a link error.
    fail_link: bool,
    /// Next object id to hand out.
    next_id: u32,
}

impl RecordingBackend {
    /// Creates a recording backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend whose program link fails, for initialization
    /// failure tests.
    #[must_use]
    pub fn failing_link() -> Self {
        Self {
            fail_link: true,
            ..Self::default()
        }
    }

    /// The shared call recorder. Clone it before handing the backend to
    /// the pipeline.
    #[must_use]
    pub fn recorder(&self) -> Arc<Mutex<Vec<GpuCall>>> {
        Arc::clone(&self.calls)
    }

    fn record(&self, call: GpuCall) {
        self.calls.lock().push(call);
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }
}

impl GpuBackend for RecordingBackend {
    fn compile_program(
        &mut self,
        _vertex_src: &str,
        _fragment_src: &str,
    ) -> GraphicsResult<ProgramId> {
        if self.fail_link {
            return Err(GraphicsError::ProgramLink {
                log: "simulated link failure".to_owned(),
            });
        }
        self.record(GpuCall::CompileProgram);
        Ok(ProgramId(self.next_id()))
    }

    fn create_vertex_buffer(&mut self) -> GraphicsResult<BufferId> {
        self.record(GpuCall::CreateBuffer);
        Ok(BufferId(self.next_id()))
    }

    fn create_texture(&mut self) -> GraphicsResult<TextureId> {
        self.record(GpuCall::CreateTexture);
        Ok(TextureId(self.next_id()))
    }

    fn clear(&mut self) -> GraphicsResult<()> {
        self.record(GpuCall::Clear);
        Ok(())
    }

    fn draw_rect(
        &mut self,
        _program: ProgramId,
        _buffer: BufferId,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
    ) -> GraphicsResult<()> {
        self.record(GpuCall::DrawRect { x, y, w, h });
        Ok(())
    }

    fn draw_texture(
        &mut self,
        _program: ProgramId,
        _buffer: BufferId,
        _texture: TextureId,
        _x: f32,
        _y: f32,
        _w: f32,
        _h: f32,
        pixels: &[u8],
    ) -> GraphicsResult<()> {
        self.record(GpuCall::DrawTexture {
            pixel_bytes: pixels.len(),
        });
        Ok(())
    }

    fn present(&mut self) -> GraphicsResult<()> {
        self.record(GpuCall::Present);
        Ok(())
    }

    fn release_resources(&mut self, _program: ProgramId, _buffer: BufferId, _texture: TextureId) {
        self.record(GpuCall::Release);
    }
}
