//! # STRATO Rendering
//!
//! A threaded command-queue renderer feeding a swappable GPU backend.
//!
//! ## Architecture
//!
//! ```text
//! control thread                     render thread
//! ──────────────                     ─────────────
//! submit(cmd) ──┐
//!               ▼
//!        ┌─────────────┐   swap    ┌──────────────────┐
//!        │ CommandQueue│ ────────> │ execute in order │
//!        │ mutex+cond  │           │ present          │
//!        └─────────────┘           │ pace to interval │
//!               ▲                  └──────────────────┘
//! shutdown() ───┘                         │
//!                                  release resources (once)
//! ```
//!
//! The producer never iterates the consumer's working copy and vice
//! versa: draining swaps the entire queue contents out under the lock,
//! so submission and execution only contend for the swap itself.
//!
//! There are no timeouts on GPU operations; a stalled backend call
//! stalls the render thread indefinitely. Documented limitation.

pub mod command;
pub mod error;
pub mod gpu;
pub mod pipeline;
pub mod queue;

pub use command::{RenderCommand, RenderConfig};
pub use error::GraphicsError;
pub use gpu::{GpuBackend, GpuCall, HeadlessBackend, RecordingBackend};
pub use pipeline::RenderPipeline;
pub use queue::CommandQueue;
