//! Method dispatch: the generic `lint`/`test` runner, plus `statusline`
//! and `stats`.
//!
//! A single internal entry point backs both `lint` and `test` because
//! they differ only in the concrete discovery/executor `Kind` and the
//! default deadline (spec.md §4.2.1). `statusline` follows the same
//! request/response shape without the in-memory lock.

use std::sync::Arc;
use std::time::Duration;

use cc_tools_core::capabilities::Capabilities;
use cc_tools_core::discovery::{DefaultRootFinder, Kind, Resolver, RootFinder, WhichLookPath};
use cc_tools_core::executor;
use cc_tools_core::hook::HookEnvelope;
use cc_tools_core::lock::MemoryLockManager;
use cc_tools_core::rpc::{error_codes, Request, Response, RpcResult, RunParams};
use cc_tools_core::stats::Stats;

/// Renders the `statusline` method's output. Named-only external
/// collaborator per spec.md §6 (`statusline generator`) -- this crate
/// consumes the interface but owns none of its visual layout.
pub trait StatuslineRenderer: Send + Sync {
    /// Render a status line from the hook envelope JSON in `input`.
    fn render(&self, input: &str) -> String;
}

/// A minimal built-in renderer: echoes the working directory from the
/// envelope, or the raw input if it isn't a recognizable envelope.
#[derive(Debug, Default)]
pub struct DefaultStatuslineRenderer;

impl StatuslineRenderer for DefaultStatuslineRenderer {
    fn render(&self, input: &str) -> String {
        match serde_json::from_str::<HookEnvelope>(input) {
            Ok(envelope) if !envelope.cwd.is_empty() => envelope.cwd,
            _ => input.trim().to_string(),
        }
    }
}

/// Everything the method dispatcher needs: the shared in-memory lock
/// table, the server statistics, the capabilities record, and the
/// discovery collaborators.
pub struct Dispatcher {
    caps: Capabilities,
    memory_locks: Arc<MemoryLockManager>,
    stats: Arc<Stats>,
    root_finder: Arc<dyn RootFinder>,
    statusline: Arc<dyn StatuslineRenderer>,
    socket_path: String,
}

impl Dispatcher {
    /// Build a dispatcher over the production discovery collaborators.
    #[must_use]
    pub fn new(
        caps: Capabilities,
        memory_locks: Arc<MemoryLockManager>,
        stats: Arc<Stats>,
        socket_path: String,
    ) -> Self {
        Self {
            caps,
            memory_locks,
            stats,
            root_finder: Arc::new(DefaultRootFinder),
            statusline: Arc::new(DefaultStatuslineRenderer),
            socket_path,
        }
    }

    /// Dispatch one decoded request to its handler. Always returns a
    /// response -- never panics on unknown methods.
    pub async fn handle(&self, req: Request) -> Response {
        self.stats.record_request();
        match req.method.as_str() {
            "lint" => self.handle_run(req, Kind::Lint).await,
            "test" => self.handle_run(req, Kind::Test).await,
            "statusline" => self.handle_statusline(req).await,
            "stats" => self.handle_stats(req),
            _ => {
                self.stats.record_error();
                Response::error(req.id, error_codes::METHOD_NOT_FOUND, "unknown method")
            }
        }
    }

    async fn handle_run(&self, req: Request, kind: Kind) -> Response {
        let id = req.id.clone();
        let params: RunParams = match parse_run_params(&req) {
            Ok(p) => p,
            Err(e) => {
                self.stats.record_error();
                return Response::error(id, error_codes::INVALID_PARAMS, format!("invalid params: {e}"));
            }
        };

        let lock_key = (!params.project.is_empty())
            .then(|| format!("{}:{}", params.project, kind.as_str()));
        let _guard = match &lock_key {
            Some(key) => match self.memory_locks.try_guard(key, "server", self.caps.clock.now_unix()) {
                Some(guard) => Some(guard),
                None => {
                    self.stats.record_error();
                    return Response::error(id, error_codes::INTERNAL_ERROR, "Resource locked");
                }
            },
            None => None,
        };

        let deadline = if params.timeout > 0 {
            Duration::from_secs(params.timeout)
        } else {
            kind.default_timeout()
        };

        let (exit_code, message) = self.run_hook_kind(&params.input, kind, deadline).await;

        let mut meta = std::collections::BTreeMap::new();
        meta.insert("via".to_string(), "server".to_string());

        Response::success(
            id,
            RpcResult {
                output: message,
                meta: Some(meta),
                exit_code: Some(exit_code),
                status: None,
            },
        )
    }

    /// Parse the envelope, discover, execute, and frame -- the same
    /// steps the hook orchestrator runs for one kind, minus the
    /// file-system lock (the in-memory lock in `handle_run` already
    /// serializes concurrent daemon connections for this project/kind)
    /// and the skip predicate (an external collaborator this crate does
    /// not own).
    async fn run_hook_kind(&self, input: &str, kind: Kind, deadline: Duration) -> (i32, String) {
        let envelope: HookEnvelope = match serde_json::from_str(input) {
            Ok(e) => e,
            Err(_) => return (0, String::new()),
        };
        if !envelope.is_edit_tool() {
            return (0, String::new());
        }
        let file_path = envelope.file_path();
        if file_path.is_empty() {
            return (0, String::new());
        }
        let file_dir = std::path::Path::new(&file_path)
            .parent()
            .map(std::path::Path::to_path_buf)
            .unwrap_or_default();
        let root = self.root_finder.find_project_root(&file_dir);

        let look_path = WhichLookPath;
        let resolver = Resolver::new(&look_path);
        let cmd = resolver.discover(&root, kind);

        let result = executor::execute(&*self.caps.runner, cmd.as_ref(), deadline).await;
        executor::execute_for_hook(cmd.as_ref(), kind, &result)
    }

    async fn handle_statusline(&self, req: Request) -> Response {
        let id = req.id.clone();
        let params: RunParams = match parse_run_params(&req) {
            Ok(p) => p,
            Err(e) => {
                self.stats.record_error();
                return Response::error(id, error_codes::INVALID_PARAMS, format!("invalid params: {e}"));
            }
        };
        let output = self.statusline.render(&params.input);
        let mut meta = std::collections::BTreeMap::new();
        meta.insert("via".to_string(), "server".to_string());
        Response::success(
            id,
            RpcResult {
                output,
                meta: Some(meta),
                exit_code: None,
                status: None,
            },
        )
    }

    fn handle_stats(&self, req: Request) -> Response {
        let id = req.id.clone();
        let output = self.stats.render(&*self.caps.clock, &self.socket_path);
        Response::success(
            id,
            RpcResult {
                output,
                meta: None,
                exit_code: None,
                status: None,
            },
        )
    }
}

/// Decode `req.params` into [`RunParams`], treating an absent `params`
/// field as `{}` (all-default) rather than an error.
fn parse_run_params(req: &Request) -> Result<RunParams, serde_json::Error> {
    match &req.params {
        Some(value) => serde_json::from_value(value.clone()),
        None => serde_json::from_value(serde_json::json!({})),
    }
}
