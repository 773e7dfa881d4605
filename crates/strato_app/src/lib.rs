//! # STRATO App Layer
//!
//! The running component's lifecycle state machine and the named-method
//! API dispatch bus.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Activity (guard wrapper - transitions cannot be bypassed)│
//! │   ├─ LifecyclePhase   Created→Started→Resumed            │
//! │   │                   Resumed→Paused→Stopped→Destroyed   │
//! │   │                   Paused→Resumed (only backward edge)│
//! │   ├─ ActivityHooks    overridable callbacks              │
//! │   ├─ transition log   timestamp + phase + detail         │
//! │   └─ ServiceRegistry  populated at create, cleared at    │
//! │                       destroy                            │
//! └──────────────────────────────────────────────────────────┘
//!
//! ┌──────────────────────────────────────────────────────────┐
//! │ ApiDispatcher                                            │
//! │   ├─ FixedWindowLimiter  N requests per second, shared   │
//! │   ├─ handler map         lock NOT held during invocation │
//! │   └─ NativeRegistry      generation-checked handle table │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Invalid-source lifecycle transitions are silent no-ops, mirroring
//! the idempotent callback contract of the platform being emulated.

pub mod dispatch;
pub mod error;
pub mod lifecycle;
pub mod native;
pub mod rate_limit;
pub mod saved_state;
pub mod services;

pub use dispatch::{ApiConfig, ApiDispatcher, ApiRequest, ApiResponse};
pub use error::ApiError;
pub use lifecycle::{Activity, ActivityHooks, DefaultHooks, LifecycleEvent, LifecyclePhase, TransitionEntry};
pub use native::{NativeHandle, NativeRegistry};
pub use rate_limit::FixedWindowLimiter;
pub use saved_state::SavedState;
pub use services::{ServiceHandle, ServiceRegistry};
