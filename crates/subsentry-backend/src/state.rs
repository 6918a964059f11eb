/// The core backend state that holds configuration and shared resources.
///
/// This struct contains all the data that needs to be shared across async
/// tasks in the backend: the scheduler's timer task, fetch cycles and the
/// bridge message handlers.
///
/// It is designed to be wrapped in thread-safe, async-friendly concurrency
/// primitives (see [`SharedState`]) to allow concurrent reads and
/// occasional writes from multiple tasks.
#[derive(Debug, Clone)]
pub struct State {
    /// The loaded application configuration.
    pub config: subsentry_bridge::config::Config,
    /// Where `config` is persisted. `None` when the config could not be loaded
    /// from disk, in which case changes are kept in memory only.
    pub config_path: Option<std::path::PathBuf>,
    /// Shared HTTP client for making efficient, pooled requests.
    pub request_client: reqwest::Client,
}

/// Thread-safe, async-friendly shared reference to the backend [`State`].
///
/// This is the recommended way to pass state into async handlers, background
/// tasks, or any context where multiple tasks need read access (and occasional
/// write access).
pub type SharedState = std::sync::Arc<tokio::sync::RwLock<State>>;
