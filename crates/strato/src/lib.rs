//! # STRATO Execution Coordinator
//!
//! Composes the package loader, the activity lifecycle, the API
//! dispatcher and the render pipeline into one runtime.
//!
//! ## Architecture
//!
//! ```text
//!                ┌───────────────────────────────┐
//!                │           Executor            │
//!                │  NotStarted → Loading → ...   │
//!                └──┬─────────┬─────────┬────────┘
//!      load_package │   start │         │ dispatch_api
//!                   ▼         ▼         ▼
//!            ┌───────────┐ ┌────────┐ ┌───────────┐
//!            │ Package   │ │Activity│ │    API    │
//!            │ Loader    │ │ 6-phase│ │ Dispatcher│
//!            └───────────┘ └────────┘ └───────────┘
//!                   │ submit
//!                   ▼
//!            ┌────────────────┐
//!            │ RenderPipeline │ (the only other thread)
//!            └────────────────┘
//! ```
//!
//! Shutdown is always cooperative: signals set a [`CancelToken`], the
//! main loop polls it once per iteration and finishes the iteration in
//! flight before tearing down.

pub mod cancel;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod signal;
pub mod state;
pub mod stats;

pub use cancel::CancelToken;
pub use config::{ConfigError, RuntimeConfig};
pub use engine::{ExecutionEngine, StubEngine};
pub use error::{EngineError, ExecutorError};
pub use executor::{BackendFactory, Executor};
pub use state::ExecutionState;
pub use stats::RuntimeStatistics;
