//! Backend runtime setup and orchestration.
//!
//! This module wires together configuration, shared state, the auth
//! capability and the message dispatch loop that listens to frontend bridge
//! requests.

use std::{sync::Arc, thread, time::Duration};

use subsentry_bridge::config::Config;
use subsentry_bridge::notification::NotificationType;
use subsentry_bridge::{MessageFromBackend, MessageToBackend};
use tokio::sync::{
    RwLock,
    mpsc::{Receiver, Sender},
};

use crate::app::AppContext;
use crate::auth::AuthTokenProvider;
use crate::state::State;

/// Load the config, falling back to in-memory defaults when the file is
/// unusable so that alerts keep working.
async fn resolve_config() -> (Config, Option<std::path::PathBuf>) {
    match crate::config::load_config().await {
        Ok((config, path)) => (config, Some(path)),
        Err(e) => {
            log::error!("Failed to load configuration, using defaults: {e}");
            let config = crate::config::apply_env_override(
                Config::default(),
                std::env::var(crate::config::API_URL_ENV).ok(),
            );
            (config, None)
        }
    }
}

fn build_request_client(config: &Config) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api.request_timeout_secs))
        .build()
        .unwrap_or_else(|e| {
            log::error!("Failed to configure HTTP client, using defaults: {e}");
            reqwest::Client::new()
        })
}

/// Initialize backend state and start processing frontend messages.
async fn setup_backend<A: AuthTokenProvider>(
    rx: Receiver<MessageToBackend>,
    tx: Sender<MessageFromBackend>,
    auth: Arc<A>,
) {
    let (config, config_path) = resolve_config().await;
    let request_client = build_request_client(&config);
    let loaded_from_disk = config_path.is_some();
    let poll_period = Duration::from_secs(config.polling.interval_secs);

    let state = Arc::new(RwLock::new(State {
        config,
        config_path,
        request_client,
    }));

    let context = Arc::new(AppContext::new(state, tx, auth, poll_period));
    if !loaded_from_disk {
        context
            .send_notification(
                NotificationType::Warning,
                "Settings could not be loaded, using defaults",
            )
            .await;
    }
    context.consume_bridge_messages(rx).await;
}

/// Spawn the backend runtime and begin processing bridge messages.
///
/// The returned handle finishes once the frontend side of the bridge is
/// dropped and polling has been torn down.
pub fn run<A: AuthTokenProvider>(
    rx: Receiver<MessageToBackend>,
    tx: Sender<MessageFromBackend>,
    auth: Arc<A>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                log::error!("Failed to build backend runtime: {e}");
                return;
            }
        };
        runtime.block_on(async { setup_backend(rx, tx, auth).await });
    })
}
