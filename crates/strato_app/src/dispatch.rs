//! Named-method API dispatch.
//!
//! A request bus between application code and the runtime. Every
//! request gets exactly one response, on every path: uninitialized,
//! rate-limited, unknown method, handler failure and handler success
//! all produce a response value.
//!
//! The handler map lock is released before a handler runs, so handlers
//! may call back into the dispatcher without deadlocking on that lock.
//! Re-entrant calls still compete for the rate limiter.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{debug, warn};

use strato_shared::{capability, ApiLevel, PackageMetadata};

use crate::error::{ApiError, ApiResult};
use crate::native::{NativeHandle, NativeRegistry};
use crate::rate_limit::FixedWindowLimiter;

/// Dispatcher configuration, seeded from package metadata.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Package identifier.
    pub package_name: String,
    /// Human-readable version string.
    pub version_name: String,
    /// Monotonic version code.
    pub version_code: u32,
    /// Minimum platform level the package requires.
    pub min_sdk: ApiLevel,
    /// Platform level the package targets.
    pub target_sdk: ApiLevel,
    /// Capabilities the package declares.
    pub declared_capabilities: Vec<String>,
    /// Shared request budget per one-second window.
    pub max_requests_per_second: u32,
}

impl ApiConfig {
    /// Builds a config from a loaded package's metadata snapshot.
    #[must_use]
    pub fn from_metadata(metadata: &PackageMetadata, max_requests_per_second: u32) -> Self {
        Self {
            package_name: metadata.package_name().to_owned(),
            version_name: metadata.version_name().to_owned(),
            version_code: metadata.version_code(),
            min_sdk: metadata.min_sdk(),
            target_sdk: metadata.target_sdk(),
            declared_capabilities: metadata.capabilities().to_vec(),
            max_requests_per_second,
        }
    }
}

/// A named-method request. Parameter keys are unique by construction.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    /// Method name to dispatch on.
    pub method: String,
    /// String parameters.
    pub params: BTreeMap<String, String>,
}

impl ApiRequest {
    /// Creates a request with no parameters.
    #[must_use]
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: BTreeMap::new(),
        }
    }

    /// Adds a parameter, replacing any previous value for the key.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Fetches a required parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::MissingParam`] when the key is absent.
    pub fn require(&self, key: &str) -> ApiResult<&str> {
        self.params
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| ApiError::MissingParam(key.to_owned()))
    }
}

/// The single response delivered for a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiResponse {
    /// Whether the request succeeded.
    pub success: bool,
    /// Opaque payload on success.
    pub data: String,
    /// Failure description on error.
    pub error: Option<String>,
}

impl ApiResponse {
    /// A success response carrying `data`.
    #[must_use]
    pub fn ok(data: impl Into<String>) -> Self {
        Self {
            success: true,
            data: data.into(),
            error: None,
        }
    }

    /// A failure response carrying `error`.
    #[must_use]
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: String::new(),
            error: Some(error.into()),
        }
    }
}

/// What a handler sees while running: the config snapshot and the
/// native method table. No dispatcher locks are held at this point.
pub struct HandlerContext<'a> {
    /// The dispatcher's configuration at dispatch time.
    pub config: &'a ApiConfig,
    /// The native method table.
    pub natives: &'a Mutex<NativeRegistry>,
}

/// A registered method handler.
pub type Handler = Arc<dyn Fn(&HandlerContext<'_>, &ApiRequest) -> ApiResult<String> + Send + Sync>;

/// Initialization-dependent dispatcher state.
struct InitializedState {
    /// The config the dispatcher was initialized with.
    config: ApiConfig,
    /// Shared fixed-window request budget.
    limiter: FixedWindowLimiter,
}

/// The named-method request bus.
pub struct ApiDispatcher {
    /// `None` until `initialize` is called.
    state: RwLock<Option<InitializedState>>,
    /// Handler registry. Never held while a handler runs.
    handlers: Mutex<BTreeMap<String, Handler>>,
    /// Native method table, its own lock.
    natives: Mutex<NativeRegistry>,
}

impl ApiDispatcher {
    /// Creates an uninitialized dispatcher with the default handlers
    /// pre-registered.
    #[must_use]
    pub fn new() -> Self {
        let dispatcher = Self {
            state: RwLock::new(None),
            handlers: Mutex::new(BTreeMap::new()),
            natives: Mutex::new(NativeRegistry::new()),
        };
        dispatcher.register_handler("getApiLevel", Arc::new(handle_get_api_level));
        dispatcher.register_handler("checkPermission", Arc::new(handle_check_permission));
        dispatcher.register_handler("registerNativeMethod", Arc::new(handle_register_native));
        dispatcher
    }

    /// Initializes the dispatcher with a config snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::AlreadyInitialized`] on a second call.
    pub fn initialize(&self, config: ApiConfig) -> ApiResult<()> {
        let mut state = self.state.write();
        if state.is_some() {
            return Err(ApiError::AlreadyInitialized);
        }
        let limiter = FixedWindowLimiter::per_second(config.max_requests_per_second);
        *state = Some(InitializedState { config, limiter });
        Ok(())
    }

    /// Installs or replaces a handler. Duplicate names overwrite.
    pub fn register_handler(&self, name: impl Into<String>, handler: Handler) {
        self.handlers.lock().insert(name.into(), handler);
    }

    /// Dispatches one request and returns its single response.
    pub fn handle_request(&self, request: &ApiRequest) -> ApiResponse {
        let config = {
            let state = self.state.read();
            let Some(state) = state.as_ref() else {
                return ApiResponse::fail("not initialized");
            };
            if !state.limiter.try_acquire() {
                debug!(method = %request.method, "rate limit exceeded");
                return ApiResponse::fail("rate limit exceeded");
            }
            state.config.clone()
        };

        let handler = {
            let handlers = self.handlers.lock();
            handlers.get(&request.method).cloned()
        };
        let Some(handler) = handler else {
            return ApiResponse::fail(format!("unknown method: {}", request.method));
        };

        let ctx = HandlerContext {
            config: &config,
            natives: &self.natives,
        };
        match handler(&ctx, request) {
            Ok(data) => ApiResponse::ok(data),
            Err(err) => {
                warn!(method = %request.method, %err, "handler failed");
                ApiResponse::fail(err.to_string())
            }
        }
    }

    /// Checks a capability against the grant policy: granted only when
    /// declared by the package AND on the fixed allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotInitialized`] before initialization and
    /// [`ApiError::PermissionDenied`] for denied capabilities.
    pub fn require_capability(&self, name: &str) -> ApiResult<()> {
        let state = self.state.read();
        let state = state.as_ref().ok_or(ApiError::NotInitialized)?;
        if is_granted(&state.config, name) {
            Ok(())
        } else {
            Err(ApiError::PermissionDenied {
                capability: name.to_owned(),
            })
        }
    }

    /// Looks up the handle for a registered native method.
    #[must_use]
    pub fn native_function(&self, name: &str) -> Option<NativeHandle> {
        self.natives.lock().lookup(name)
    }

    /// Resolves a native handle to its symbol, rejecting stale handles.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::StaleHandle`] for released or recycled
    /// handles.
    pub fn resolve_native(&self, handle: NativeHandle) -> ApiResult<String> {
        self.natives
            .lock()
            .resolve(handle)
            .map(|entry| entry.symbol.clone())
    }

    /// Releases a native method registration.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::StaleHandle`] when the handle is stale.
    pub fn release_native(&self, handle: NativeHandle) -> ApiResult<()> {
        self.natives.lock().release(handle)
    }

    /// Whether `initialize` has been called.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.state.read().is_some()
    }

    /// The initialized package name, if any.
    #[must_use]
    pub fn package_name(&self) -> Option<String> {
        self.state
            .read()
            .as_ref()
            .map(|s| s.config.package_name.clone())
    }

    /// The initialized version string, if any.
    #[must_use]
    pub fn version_name(&self) -> Option<String> {
        self.state
            .read()
            .as_ref()
            .map(|s| s.config.version_name.clone())
    }

    /// The initialized version code, if any.
    #[must_use]
    pub fn version_code(&self) -> Option<u32> {
        self.state.read().as_ref().map(|s| s.config.version_code)
    }

    /// The initialized minimum platform level, if any.
    #[must_use]
    pub fn min_sdk(&self) -> Option<ApiLevel> {
        self.state.read().as_ref().map(|s| s.config.min_sdk)
    }

    /// The initialized target platform level, if any.
    #[must_use]
    pub fn target_sdk(&self) -> Option<ApiLevel> {
        self.state.read().as_ref().map(|s| s.config.target_sdk)
    }
}

impl Default for ApiDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Grant policy: declared by the package AND on the fixed allow-list.
fn is_granted(config: &ApiConfig, name: &str) -> bool {
    config.declared_capabilities.iter().any(|c| c == name) && capability::is_allow_listed(name)
}

/// Default handler: reports the target platform level.
fn handle_get_api_level(ctx: &HandlerContext<'_>, _request: &ApiRequest) -> ApiResult<String> {
    Ok(ctx.config.target_sdk.level().to_string())
}

/// Default handler: capability check against the grant policy.
fn handle_check_permission(ctx: &HandlerContext<'_>, request: &ApiRequest) -> ApiResult<String> {
    let name = request.require("permission")?;
    Ok(if is_granted(ctx.config, name) {
        "granted".to_owned()
    } else {
        "denied".to_owned()
    })
}

/// Default handler: registers a native method in the handle table.
fn handle_register_native(ctx: &HandlerContext<'_>, request: &ApiRequest) -> ApiResult<String> {
    let name = request.require("name")?;
    let symbol = request.require("symbol")?;
    let handle = ctx.natives.lock().register(name, symbol);
    Ok(handle.to_string())
}
