use chrono::Local;
use subsentry_bridge::{MessageFromBackend, MessageToBackend};
use tokio::sync::mpsc;

use crate::views::alerts_panel::HeaderView;
use crate::views::{HeaderUi, UiEvent};

pub mod components;
pub mod dom;
pub mod entities;
pub mod formatting;
pub mod views;

#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("the backend is no longer running")]
    Disconnected,
}

#[derive(Clone)]
pub struct BackendBridge {
    pub to_backend: mpsc::Sender<MessageToBackend>,
}

impl BackendBridge {
    pub async fn send(&self, message: MessageToBackend) -> Result<(), BridgeError> {
        self.to_backend
            .send(message)
            .await
            .map_err(|_| BridgeError::Disconnected)
    }

    pub async fn request_config(&self) -> Result<(), BridgeError> {
        self.send(MessageToBackend::ConfigurationRequest).await
    }

    pub async fn refresh_alerts(&self) -> Result<(), BridgeError> {
        self.send(MessageToBackend::RefreshAlertsRequest).await
    }
}

/// Drive the header until either the backend or the UI event source goes
/// away. `on_render` is called whenever the rendered header changes.
///
/// Returning drops the command sender, which makes the backend tear down its
/// polling schedule.
pub async fn run(
    mut header: HeaderUi,
    mut rx: mpsc::Receiver<MessageFromBackend>,
    tx: mpsc::Sender<MessageToBackend>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    mut on_render: impl FnMut(&HeaderView),
) -> anyhow::Result<()> {
    let bridge = BackendBridge { to_backend: tx };
    bridge.request_config().await?;

    let mut last_view: Option<HeaderView> = None;
    loop {
        tokio::select! {
            message = rx.recv() => match message {
                Some(message) => {
                    log::debug!("Got a message from backend: {message:?}");
                    header.handle_backend_message(message);
                }
                None => {
                    log::info!("Backend bridge closed");
                    break;
                }
            },
            event = ui_events.recv() => match event {
                Some(event) => {
                    if let Some(command) = header.handle_ui_event(event) {
                        bridge.send(command).await?;
                    }
                }
                None => {
                    log::info!("UI event source closed");
                    break;
                }
            },
        }

        let view = header.render(Local::now().date_naive());
        if last_view.as_ref() != Some(&view) {
            on_render(&view);
            last_view = Some(view);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use subsentry_bridge::alerts::{FetchOutcome, RequestSeq};

    use super::*;
    use crate::dom::Document;

    #[tokio::test]
    async fn test_run_requests_config_and_forwards_commands() {
        let (to_frontend, frontend_rx) = mpsc::channel(8);
        let (frontend_tx, mut backend_rx) = mpsc::channel(8);
        let (ui_tx, ui_rx) = mpsc::channel(8);

        let renders = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
        let task = {
            let renders = renders.clone();
            tokio::spawn(run(
                HeaderUi::new(Document::new()),
                frontend_rx,
                frontend_tx,
                ui_rx,
                move |view: &HeaderView| renders.lock().unwrap().push(view.clone()),
            ))
        };

        assert!(matches!(
            backend_rx.recv().await,
            Some(MessageToBackend::ConfigurationRequest)
        ));

        ui_tx.send(UiEvent::RefreshRequested).await.unwrap();
        assert!(matches!(
            backend_rx.recv().await,
            Some(MessageToBackend::RefreshAlertsRequest)
        ));

        to_frontend
            .send(MessageFromBackend::AlertsFetchFinished {
                seq: RequestSeq(1),
                outcome: FetchOutcome::Loaded(Vec::new()),
            })
            .await
            .unwrap();

        drop(ui_tx);
        task.await.unwrap().unwrap();
        assert!(!renders.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_bridge_reports_disconnect() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let bridge = BackendBridge { to_backend: tx };
        assert!(matches!(
            bridge.refresh_alerts().await,
            Err(BridgeError::Disconnected)
        ));
    }
}
