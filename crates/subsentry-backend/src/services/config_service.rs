use subsentry_bridge::notification::NotificationType;

use crate::auth::AuthTokenProvider;

/// Handles an incoming configuration request (see
/// [`subsentry_bridge::MessageToBackend::ConfigurationRequest`]).
pub async fn handle_config_request<A: AuthTokenProvider>(context: super::AppContextHandle<A>) {
    let config = {
        let state = context.state.read().await;
        state.config.clone()
    };
    context
        .send(subsentry_bridge::MessageFromBackend::ConfigurationResponse(
            config,
        ))
        .await;
}

/// Handles an API base URL change, persists it to config and restarts the
/// polling schedule against the new endpoint.
pub async fn handle_api_base_url_change<A: AuthTokenProvider>(
    context: super::AppContextHandle<A>,
    base_url: String,
) {
    let base_url = base_url.trim().to_string();
    if base_url.is_empty() {
        log::warn!("Ignoring empty API base URL");
        return;
    }

    let (config, config_path) = {
        let mut state = context.state.write().await;
        state.config.api.base_url = base_url.clone();
        (state.config.clone(), state.config_path.clone())
    };

    // persist the updated URL so it is remembered across runs
    let save_result = match config_path {
        Some(path) => Some(crate::config::save_config(&config, &path).await),
        None => None,
    };

    match save_result {
        Some(Ok(())) => log::info!("API base URL changed to {base_url}"),
        Some(Err(e)) => {
            log::error!("Failed to persist API base URL: {e}");
            context
                .send_notification(
                    NotificationType::Error,
                    format!("Could not save settings: {e}"),
                )
                .await;
        }
        None => log::info!("API base URL changed to {base_url} (not persisted)"),
    }

    context.restart_polling().await;
    handle_config_request(context).await;
}
