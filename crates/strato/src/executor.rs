//! The execution coordinator.
//!
//! One `Executor` owns the whole runtime: the loaded package, the API
//! dispatcher, the foreground activity and the render pipeline. All
//! control flows through it on the control thread; the render thread is
//! the only other thread, and the command queue is the only bridge.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, info};

use strato_app::{Activity, ApiConfig, ApiDispatcher, ApiRequest, ApiResponse};
use strato_package::{LoadedPackage, PackageLoader};
use strato_rendering::{GpuBackend, HeadlessBackend, RenderCommand, RenderPipeline};
use strato_shared::PackageMetadata;

use crate::cancel::CancelToken;
use crate::config::RuntimeConfig;
use crate::engine::{ExecutionEngine, StubEngine};
use crate::error::{ExecutorError, ExecutorResult};
use crate::state::ExecutionState;
use crate::stats::{RuntimeStatistics, StatsCollector};

/// Builds a fresh GPU backend whenever the render pipeline is created.
/// Called again after a full stop when a new package is loaded.
pub type BackendFactory = Box<dyn FnMut() -> Box<dyn GpuBackend> + Send>;

/// The execution coordinator.
pub struct Executor {
    /// Startup configuration.
    config: RuntimeConfig,
    /// Current coordinator state.
    state: ExecutionState,
    /// Message from the most recent failure, if any.
    last_error: Option<String>,
    /// The loaded package, present from a successful load until unload.
    package: Option<LoadedPackage>,
    /// The foreground activity, present while the app is active.
    activity: Option<Activity>,
    /// The API dispatcher, replaced on every successful load.
    dispatcher: Arc<ApiDispatcher>,
    /// The render pipeline, created on first successful load.
    pipeline: Option<RenderPipeline>,
    /// Frames presented by pipelines that have already shut down.
    frames_retired: u64,
    /// The execution-engine collaborator.
    engine: Box<dyn ExecutionEngine>,
    /// Backend factory for pipeline creation.
    backend_factory: BackendFactory,
    /// Live runtime counters.
    stats: StatsCollector,
    /// Set by `stop`; makes `update` report completion.
    stop_requested: bool,
    /// Guards the lifecycle teardown so it runs at most once per run.
    cleaned_up: bool,
    /// When the coordinator was created, for uptime.
    created_at: Instant,
}

impl Executor {
    /// Creates a coordinator with the stub engine and a headless GPU
    /// backend.
    #[must_use]
    pub fn new(config: RuntimeConfig) -> Self {
        Self::with_collaborators(
            config,
            Box::new(StubEngine::new()),
            Box::new(|| Box::new(HeadlessBackend::new())),
        )
    }

    /// Creates a coordinator with explicit collaborators.
    #[must_use]
    pub fn with_collaborators(
        config: RuntimeConfig,
        engine: Box<dyn ExecutionEngine>,
        backend_factory: BackendFactory,
    ) -> Self {
        Self {
            config,
            state: ExecutionState::NotStarted,
            last_error: None,
            package: None,
            activity: None,
            dispatcher: Arc::new(ApiDispatcher::new()),
            pipeline: None,
            frames_retired: 0,
            engine,
            backend_factory,
            stats: StatsCollector::new(),
            stop_requested: false,
            cleaned_up: false,
            created_at: Instant::now(),
        }
    }

    /// Loads a package and prepares the runtime around it.
    ///
    /// Allowed from `NotStarted`, `Stopped` and `Error`. On success the
    /// dispatcher is re-initialized from the package metadata, the
    /// render pipeline exists, and the state is `Stopped`. On failure
    /// the state is `Error` and the message is kept for `last_error`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::InvalidState`] from a forbidden state,
    /// otherwise the loader, dispatcher or pipeline failure.
    pub fn load_package(&mut self, path: &Path) -> ExecutorResult<()> {
        if !self.state.can_load() {
            return Err(ExecutorError::InvalidState {
                operation: "load a package",
                state: self.state,
            });
        }
        self.state = ExecutionState::Loading;
        info!(path = %path.display(), "loading package");

        let package = match PackageLoader::load(path) {
            Ok(package) => package,
            Err(err) => {
                self.fail(format!("package load failed: {err}"));
                return Err(err.into());
            }
        };

        // Fresh dispatcher per load; initialize is one-shot.
        let dispatcher = Arc::new(ApiDispatcher::new());
        if let Err(err) = dispatcher.initialize(ApiConfig::from_metadata(
            package.metadata(),
            self.config.max_requests_per_second,
        )) {
            self.fail(format!("API initialization failed: {err}"));
            return Err(err.into());
        }

        if self.pipeline.is_none() {
            let backend = (self.backend_factory)();
            match RenderPipeline::initialize(self.config.render_config(), backend) {
                Ok(pipeline) => self.pipeline = Some(pipeline),
                Err(err) => {
                    self.fail(format!("render pipeline initialization failed: {err}"));
                    return Err(err.into());
                }
            }
        }

        self.stats
            .set_payload_bytes(u64::try_from(package.payload().len()).unwrap_or(u64::MAX));
        info!(
            package = package.metadata().package_name(),
            version = package.metadata().version_name(),
            payload_bytes = package.payload().len(),
            "package loaded"
        );

        self.dispatcher = dispatcher;
        self.package = Some(package);
        self.stop_requested = false;
        self.cleaned_up = false;
        self.last_error = None;
        self.state = ExecutionState::Stopped;
        Ok(())
    }

    /// Starts the loaded app: resolves the entry component, drives
    /// `create → start → resume` and enters `Running`.
    ///
    /// # Errors
    ///
    /// Returns [`ExecutorError::InvalidState`] unless the state is
    /// `Stopped`, and the engine failure when the entry component or
    /// its `onCreate` cannot be resolved.
    pub fn start(&mut self) -> ExecutorResult<()> {
        if !self.state.can_start() {
            return Err(ExecutorError::InvalidState {
                operation: "start",
                state: self.state,
            });
        }
        let Some(package) = self.package.as_ref() else {
            let message = "no package loaded".to_owned();
            self.fail(message.clone());
            return Err(ExecutorError::Runtime(message));
        };
        let entry = package.metadata().entry_component().to_owned();

        if let Err(err) = self
            .engine
            .resolve_component(&entry)
            .and_then(|()| self.engine.resolve_method(&entry, "onCreate"))
        {
            self.fail(format!("entry component unavailable: {err}"));
            return Err(err.into());
        }

        let mut activity = Activity::with_default_hooks(entry.clone());
        activity.create();
        activity.start();
        activity.resume();
        self.activity = Some(activity);
        self.cleaned_up = false;
        self.state = ExecutionState::Running;
        info!(%entry, "app running");

        if let Some(pipeline) = &self.pipeline {
            pipeline.submit(RenderCommand::Clear);
        }
        Ok(())
    }

    /// Moves `Running → Paused` and pauses the activity. A no-op in any
    /// other state.
    pub fn pause(&mut self) {
        if self.state != ExecutionState::Running {
            return;
        }
        if let Some(activity) = self.activity.as_mut() {
            activity.pause();
        }
        self.state = ExecutionState::Paused;
        info!("app paused");
    }

    /// Moves `Paused → Running` and resumes the activity. A no-op in
    /// any other state.
    pub fn resume(&mut self) {
        if self.state != ExecutionState::Paused {
            return;
        }
        if let Some(activity) = self.activity.as_mut() {
            activity.resume();
        }
        self.state = ExecutionState::Running;
        info!("app resumed");
    }

    /// Requests shutdown and tears the runtime down. Callable from any
    /// state, any number of times; the teardown itself runs once.
    pub fn stop(&mut self) {
        self.stop_requested = true;
        self.cleanup();
    }

    /// One logical tick. Returns whether the main loop should continue.
    pub fn update(&mut self) -> bool {
        if self.stop_requested {
            return false;
        }
        if self.state == ExecutionState::Running {
            self.stats.record_tick();
        }
        self.state.is_active()
    }

    /// The main loop: tick, keep a frame in flight, sleep to the frame
    /// interval. Exits when the token fires or `stop` is requested,
    /// always finishing the iteration in flight, then tears down.
    pub fn run(&mut self, token: &CancelToken) {
        let interval = self.config.render_config().frame_interval();
        loop {
            if token.is_cancelled() {
                info!("cancellation requested, shutting down");
                break;
            }
            if !self.update() {
                break;
            }
            if self.state == ExecutionState::Running {
                if let Some(pipeline) = &self.pipeline {
                    pipeline.submit(RenderCommand::Clear);
                }
            }
            std::thread::sleep(interval);
        }
        self.stop();
    }

    /// Dispatches an API request on the app's behalf and counts the
    /// outcome.
    pub fn dispatch_api(&self, request: &ApiRequest) -> ApiResponse {
        let response = self.dispatcher.handle_request(request);
        self.stats.record_api(response.success);
        response
    }

    /// Queues a render command. Dropped silently when no pipeline is
    /// live.
    pub fn submit_render(&self, command: RenderCommand) {
        if let Some(pipeline) = &self.pipeline {
            pipeline.submit(command);
        }
    }

    /// Forwards a surface size change to the render pipeline.
    pub fn on_surface_changed(&self, width: u32, height: u32) {
        if let Some(pipeline) = &self.pipeline {
            pipeline.on_surface_changed(width, height);
        }
    }

    /// The render pipeline's current scale factor, when one is live.
    #[must_use]
    pub fn scale_factor(&self) -> Option<f32> {
        self.pipeline.as_ref().map(RenderPipeline::scale_factor)
    }

    /// Current coordinator state.
    #[must_use]
    pub const fn state(&self) -> ExecutionState {
        self.state
    }

    /// Message from the most recent failure, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Metadata of the loaded package, if any.
    #[must_use]
    pub fn info(&self) -> Option<&PackageMetadata> {
        self.package.as_ref().map(LoadedPackage::metadata)
    }

    /// Point-in-time runtime snapshot.
    #[must_use]
    pub fn statistics(&self) -> RuntimeStatistics {
        let frames = self.frames_retired
            + self
                .pipeline
                .as_ref()
                .map_or(0, RenderPipeline::frames_rendered);
        self.stats.snapshot(frames, self.created_at.elapsed())
    }

    /// Records a failure and enters `Error`.
    fn fail(&mut self, message: String) {
        error!(%message, "executor failure");
        self.last_error = Some(message);
        self.state = ExecutionState::Error;
    }

    /// Drives `pause → stop → destroy`, joins the render thread and
    /// unloads the payload. Runs at most once per loaded run.
    fn cleanup(&mut self) {
        if self.cleaned_up {
            return;
        }
        self.cleaned_up = true;

        if let Some(mut activity) = self.activity.take() {
            activity.pause();
            activity.stop();
            activity.destroy();
        }
        if let Some(mut pipeline) = self.pipeline.take() {
            self.frames_retired += pipeline.frames_rendered();
            pipeline.shutdown();
        }
        if let Some(package) = self.package.as_mut() {
            package.unload();
            self.stats.set_payload_bytes(0);
        }
        if self.state != ExecutionState::Error {
            self.state = ExecutionState::Stopped;
        }
        info!("runtime stopped");
    }
}

impl Drop for Executor {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    use flate2::write::GzEncoder;
    use flate2::Compression;

    const MANIFEST: &str = r#"
package_name = "com.example.demo"
version_name = "1.2.0"
version_code = 42
min_sdk = 29
target_sdk = 34
entry_component = "com.example.MainActivity"
capabilities = ["strato.capability.INTERNET"]
"#;

    fn write_package(dir: &Path, manifest: &str) -> PathBuf {
        let path = dir.join("demo.stpkg");
        let file = std::fs::File::create(&path).unwrap();
        let encoder = GzEncoder::new(file, Compression::default());
        let mut builder = tar::Builder::new(encoder);

        let payload = vec![0xA5u8; 2048];
        let mut header = tar::Header::new_gnu();
        header.set_size(payload.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "payload.bin", payload.as_slice())
            .unwrap();

        let mut header = tar::Header::new_gnu();
        header.set_size(manifest.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, "manifest.toml", manifest.as_bytes())
            .unwrap();

        builder.into_inner().unwrap().finish().unwrap().flush().unwrap();
        path
    }

    fn loaded_executor(dir: &Path) -> Executor {
        let path = write_package(dir, MANIFEST);
        let mut executor = Executor::new(RuntimeConfig::default());
        executor.load_package(&path).unwrap();
        executor
    }

    #[test]
    fn test_load_reaches_stopped_with_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let executor = loaded_executor(dir.path());

        assert_eq!(executor.state(), ExecutionState::Stopped);
        assert!(executor.last_error().is_none());
        let info = executor.info().unwrap();
        assert_eq!(info.package_name(), "com.example.demo");
        assert_eq!(info.version_code(), 42);
        assert_eq!(executor.statistics().payload_bytes, 2048);
    }

    #[test]
    fn test_load_failure_enters_error_with_message() {
        let mut executor = Executor::new(RuntimeConfig::default());
        let err = executor
            .load_package(Path::new("/nonexistent/app.stpkg"))
            .unwrap_err();

        assert!(matches!(err, ExecutorError::Load(_)));
        assert_eq!(executor.state(), ExecutionState::Error);
        assert!(executor.last_error().unwrap().contains("package load failed"));
    }

    #[test]
    fn test_load_retry_after_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut executor = Executor::new(RuntimeConfig::default());
        executor
            .load_package(Path::new("/nonexistent/app.stpkg"))
            .unwrap_err();
        assert_eq!(executor.state(), ExecutionState::Error);

        let path = write_package(dir.path(), MANIFEST);
        executor.load_package(&path).unwrap();
        assert_eq!(executor.state(), ExecutionState::Stopped);
        assert!(executor.last_error().is_none());
    }

    #[test]
    fn test_start_runs_the_app() {
        let dir = tempfile::tempdir().unwrap();
        let mut executor = loaded_executor(dir.path());

        executor.start().unwrap();
        assert_eq!(executor.state(), ExecutionState::Running);
    }

    #[test]
    fn test_start_requires_stopped() {
        let mut executor = Executor::new(RuntimeConfig::default());
        let err = executor.start().unwrap_err();
        assert!(matches!(err, ExecutorError::InvalidState { .. }));
    }

    #[test]
    fn test_malformed_entry_component_fails_start() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = MANIFEST.replace("com.example.MainActivity", "NoDots");
        let path = write_package(dir.path(), &manifest);

        let mut executor = Executor::new(RuntimeConfig::default());
        executor.load_package(&path).unwrap();
        let err = executor.start().unwrap_err();

        assert!(matches!(err, ExecutorError::Engine(_)));
        assert_eq!(executor.state(), ExecutionState::Error);
        assert!(executor.last_error().unwrap().contains("NoDots"));
    }

    #[test]
    fn test_pause_resume_toggle() {
        let dir = tempfile::tempdir().unwrap();
        let mut executor = loaded_executor(dir.path());
        executor.start().unwrap();

        executor.pause();
        assert_eq!(executor.state(), ExecutionState::Paused);
        // Pause outside Running is a no-op.
        executor.pause();
        assert_eq!(executor.state(), ExecutionState::Paused);

        executor.resume();
        assert_eq!(executor.state(), ExecutionState::Running);
        executor.resume();
        assert_eq!(executor.state(), ExecutionState::Running);
    }

    #[test]
    fn test_resume_before_start_is_noop() {
        let mut executor = Executor::new(RuntimeConfig::default());
        executor.resume();
        assert_eq!(executor.state(), ExecutionState::NotStarted);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut executor = loaded_executor(dir.path());
        executor.start().unwrap();

        executor.stop();
        assert_eq!(executor.state(), ExecutionState::Stopped);
        executor.stop();
        executor.stop();
        assert_eq!(executor.state(), ExecutionState::Stopped);
        assert_eq!(executor.statistics().payload_bytes, 0);
        assert_eq!(executor.statistics().peak_payload_bytes, 2048);
    }

    #[test]
    fn test_update_ticks_only_while_running() {
        let dir = tempfile::tempdir().unwrap();
        let mut executor = loaded_executor(dir.path());
        executor.start().unwrap();

        assert!(executor.update());
        assert!(executor.update());
        executor.pause();
        assert!(executor.update());
        assert_eq!(executor.statistics().ticks, 2);
    }

    #[test]
    fn test_run_honors_cancellation() {
        let dir = tempfile::tempdir().unwrap();
        let mut executor = loaded_executor(dir.path());
        executor.start().unwrap();

        let token = CancelToken::new();
        token.cancel();
        executor.run(&token);
        assert_eq!(executor.state(), ExecutionState::Stopped);
    }

    #[test]
    fn test_dispatch_api_counts_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        let executor = loaded_executor(dir.path());

        let ok = executor.dispatch_api(&ApiRequest::new("getApiLevel"));
        assert!(ok.success);
        let bad = executor.dispatch_api(&ApiRequest::new("warpCore"));
        assert!(!bad.success);

        let stats = executor.statistics();
        assert_eq!(stats.api_requests, 2);
        assert_eq!(stats.api_failures, 1);
    }

    #[test]
    fn test_reload_after_full_stop() {
        let dir = tempfile::tempdir().unwrap();
        let mut executor = loaded_executor(dir.path());
        executor.start().unwrap();
        executor.stop();

        let path = write_package(dir.path(), MANIFEST);
        executor.load_package(&path).unwrap();
        executor.start().unwrap();
        assert_eq!(executor.state(), ExecutionState::Running);
        executor.stop();
    }
}
