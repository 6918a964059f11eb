//! Application context and message dispatching utilities.
//!
//! The context contains the shared state, the auth capability and the
//! polling scheduler, and provides helpers for sending updates and
//! notifications back to the frontend bridge.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use subsentry_bridge::alerts::RequestSeq;
use subsentry_bridge::{MessageFromBackend, MessageToBackend};
use tokio::sync::Mutex;
use tokio::sync::mpsc::{Receiver, Sender};

use crate::auth::AuthTokenProvider;
use crate::poller::{PollInputs, PollingScheduler};
use crate::services;
use crate::state::SharedState;

/// Shared application context passed to services and message handlers.
pub(crate) struct AppContext<A> {
    /// Mutable runtime application state shared across services.
    pub state: SharedState,
    /// Outbound channel to the frontend bridge.
    pub tx: Sender<MessageFromBackend>,
    /// Sign-in status and credential accessor.
    pub auth: Arc<A>,
    /// Last sequence handed out to a fetch cycle.
    last_seq: AtomicU64,
    scheduler: Mutex<PollingScheduler>,
}

impl<A: AuthTokenProvider> AppContext<A> {
    pub fn new(
        state: SharedState,
        tx: Sender<MessageFromBackend>,
        auth: Arc<A>,
        poll_period: Duration,
    ) -> Self {
        Self {
            state,
            tx,
            auth,
            last_seq: AtomicU64::new(0),
            scheduler: Mutex::new(PollingScheduler::new(poll_period)),
        }
    }

    /// Arm polling, then read and dispatch messages from the frontend bridge
    /// until it closes. Polling is torn down when the bridge goes away.
    pub async fn consume_bridge_messages(self: &Arc<Self>, mut rx: Receiver<MessageToBackend>) {
        self.restart_polling().await;

        while let Some(message) = rx.recv().await {
            log::debug!("Got a frontend message: {message:?}");
            self.dispatch_message(message).await;
        }

        log::info!("Frontend bridge closed, stopping alerts polling");
        self.scheduler.lock().await.cancel();
    }

    /// Dispatches the received message from frontend down to individual
    /// service handlers.
    async fn dispatch_message(self: &Arc<Self>, message: MessageToBackend) {
        match message {
            MessageToBackend::ConfigurationRequest => {
                services::config_service::handle_config_request(self.clone()).await;
            }
            MessageToBackend::RefreshAlertsRequest => {
                services::alerts_service::handle_refresh_request(self.clone()).await;
            }
            MessageToBackend::AuthStateChanged => {
                services::alerts_service::handle_auth_state_changed(self.clone()).await;
            }
            MessageToBackend::SetApiBaseUrl(base_url) => {
                services::config_service::handle_api_base_url_change(self.clone(), base_url)
                    .await;
            }
        }
    }

    /// Send a message to the frontend bridge.
    pub async fn send(&self, message: MessageFromBackend) {
        if let Err(e) = self.tx.send(message).await {
            log::warn!("Failed to send message to frontend: {e}");
        }
    }

    /// Send a notification message to the frontend bridge.
    pub async fn send_notification(
        &self,
        notification_type: subsentry_bridge::notification::NotificationType,
        content: impl Into<String>,
    ) {
        self.send(MessageFromBackend::NotificationMessage(
            subsentry_bridge::notification::NotificationMessage {
                notification_type,
                message: content.into(),
            },
        ))
        .await;
    }

    /// Hand out the next fetch cycle sequence.
    pub fn next_seq(&self) -> RequestSeq {
        RequestSeq(self.last_seq.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Snapshot of everything the fetch cycle depends on.
    pub async fn poll_inputs(&self) -> PollInputs {
        let base_url = self.state.read().await.config.api.base_url.clone();
        PollInputs {
            signed_in: self.auth.is_signed_in(),
            auth_identity: Arc::as_ptr(&self.auth) as *const () as usize,
            base_url,
        }
    }

    /// Inputs of the armed schedule, or a fresh snapshot when nothing is armed.
    pub async fn current_inputs(&self) -> PollInputs {
        let armed = self.scheduler.lock().await.inputs().cloned();
        match armed {
            Some(inputs) => inputs,
            None => self.poll_inputs().await,
        }
    }

    /// Re-arm the polling schedule if its inputs changed.
    pub async fn restart_polling(self: &Arc<Self>) {
        let inputs = self.poll_inputs().await;
        let context = Arc::downgrade(self);
        self.scheduler
            .lock()
            .await
            .reconfigure(inputs, move |inputs| {
                let context = context.clone();
                async move {
                    if let Some(context) = context.upgrade() {
                        context.run_fetch_cycle(inputs).await;
                    }
                }
            });
    }

    /// Run one fetch cycle with the shared HTTP client.
    pub async fn run_fetch_cycle(&self, inputs: PollInputs) {
        let seq = self.next_seq();
        let client = self.state.read().await.request_client.clone();
        services::alerts_service::run_fetch_cycle(
            self.auth.clone(),
            client,
            inputs,
            seq,
            self.tx.clone(),
        )
        .await;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use subsentry_bridge::alerts::FetchOutcome;
    use subsentry_bridge::config::Config;
    use subsentry_bridge::notification::NotificationType;
    use tokio::sync::{RwLock, mpsc};

    use super::*;
    use crate::state::State;

    struct SignedOut;

    impl AuthTokenProvider for SignedOut {
        fn is_signed_in(&self) -> bool {
            false
        }

        async fn get_token(&self) -> Option<String> {
            None
        }
    }

    /// Signed in until told otherwise; never hands out a token, so cycles
    /// finish without touching the network.
    struct Switchable {
        signed_in: AtomicBool,
    }

    impl AuthTokenProvider for Switchable {
        fn is_signed_in(&self) -> bool {
            self.signed_in.load(Ordering::Relaxed)
        }

        async fn get_token(&self) -> Option<String> {
            None
        }
    }

    fn context_with<A: AuthTokenProvider>(
        tx: Sender<MessageFromBackend>,
        auth: A,
        config_path: Option<std::path::PathBuf>,
    ) -> Arc<AppContext<A>> {
        let state = Arc::new(RwLock::new(State {
            config: Config::default(),
            config_path,
            request_client: reqwest::Client::new(),
        }));
        Arc::new(AppContext::new(
            state,
            tx,
            Arc::new(auth),
            Duration::from_secs(60),
        ))
    }

    fn context(tx: Sender<MessageFromBackend>) -> Arc<AppContext<SignedOut>> {
        context_with(tx, SignedOut, None)
    }

    fn signed_in_context(tx: Sender<MessageFromBackend>) -> Arc<AppContext<Switchable>> {
        let auth = Switchable {
            signed_in: AtomicBool::new(true),
        };
        context_with(tx, auth, None)
    }

    async fn expect_cycle(rx: &mut mpsc::Receiver<MessageFromBackend>) -> RequestSeq {
        let started = match rx.recv().await {
            Some(MessageFromBackend::AlertsFetchStarted { seq }) => seq,
            other => panic!("expected a started cycle, got {other:?}"),
        };
        match rx.recv().await {
            Some(MessageFromBackend::AlertsFetchFinished { seq, outcome }) => {
                assert_eq!(seq, started);
                assert_eq!(outcome, FetchOutcome::CredentialUnavailable);
            }
            other => panic!("expected a finished cycle, got {other:?}"),
        }
        started
    }

    #[test]
    fn test_sequences_increase() {
        let (tx, _rx) = mpsc::channel(1);
        let context = context(tx);
        assert_eq!(context.next_seq(), RequestSeq(1));
        assert_eq!(context.next_seq(), RequestSeq(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_clears_when_signed_out() {
        let (tx, mut rx) = mpsc::channel(8);
        let (to_backend, backend_rx) = mpsc::channel(8);
        let context = context(tx);

        let consumer = {
            let context = context.clone();
            tokio::spawn(async move { context.consume_bridge_messages(backend_rx).await })
        };

        assert!(matches!(
            rx.recv().await,
            Some(MessageFromBackend::AlertsCleared { seq: RequestSeq(1) })
        ));

        to_backend
            .send(MessageToBackend::ConfigurationRequest)
            .await
            .unwrap();
        assert!(matches!(
            rx.recv().await,
            Some(MessageFromBackend::ConfigurationResponse(_))
        ));

        drop(to_backend);
        consumer.await.unwrap();
        assert!(!context.scheduler.lock().await.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_base_url_change_restarts_polling() {
        let (tx, mut rx) = mpsc::channel(8);
        let context = context(tx);
        context.restart_polling().await;
        assert!(matches!(
            rx.recv().await,
            Some(MessageFromBackend::AlertsCleared { seq: RequestSeq(1) })
        ));

        services::config_service::handle_api_base_url_change(
            context.clone(),
            "https://alerts.example.com".to_string(),
        )
        .await;

        let scheduler = context.scheduler.lock().await;
        assert_eq!(
            scheduler.inputs().map(|inputs| inputs.base_url.as_str()),
            Some("https://alerts.example.com")
        );
    }

    #[tokio::test]
    async fn test_sign_out_restarts_polling_and_clears() {
        let (tx, mut rx) = mpsc::channel(8);
        let context = signed_in_context(tx);
        context.restart_polling().await;
        let first = expect_cycle(&mut rx).await;

        context.auth.signed_in.store(false, Ordering::Relaxed);
        context
            .dispatch_message(MessageToBackend::AuthStateChanged)
            .await;

        match rx.recv().await {
            Some(MessageFromBackend::AlertsCleared { seq }) => assert!(seq > first),
            other => panic!("expected alerts to be cleared, got {other:?}"),
        }
        let scheduler = context.scheduler.lock().await;
        assert!(scheduler.is_armed());
        assert_eq!(scheduler.inputs().map(|inputs| inputs.signed_in), Some(false));
    }

    #[tokio::test]
    async fn test_auth_change_without_new_status_keeps_schedule() {
        let (tx, mut rx) = mpsc::channel(8);
        let context = signed_in_context(tx);
        context.restart_polling().await;
        expect_cycle(&mut rx).await;

        context
            .dispatch_message(MessageToBackend::AuthStateChanged)
            .await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_refresh_runs_one_cycle_with_armed_inputs() {
        let (tx, mut rx) = mpsc::channel(8);
        let context = signed_in_context(tx);
        context.restart_polling().await;
        let first = expect_cycle(&mut rx).await;

        // the schedule was armed while signed in; refresh must not re-read
        context.auth.signed_in.store(false, Ordering::Relaxed);
        context
            .dispatch_message(MessageToBackend::RefreshAlertsRequest)
            .await;

        let refreshed = expect_cycle(&mut rx).await;
        assert!(refreshed > first);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_base_url_change_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let (tx, mut rx) = mpsc::channel(8);
        let context = context_with(tx, SignedOut, Some(path.clone()));

        services::config_service::handle_api_base_url_change(
            context.clone(),
            "https://alerts.example.com".to_string(),
        )
        .await;

        let saved = crate::config::load_config_from(&path).await.unwrap();
        assert_eq!(saved.api.base_url, "https://alerts.example.com");
        // the state lock is free again once the handler returns
        assert!(context.state.try_write().is_ok());

        let mut cleared = false;
        let mut config_sent = false;
        for _ in 0..2 {
            match rx.recv().await {
                Some(MessageFromBackend::AlertsCleared { .. }) => cleared = true,
                Some(MessageFromBackend::ConfigurationResponse(config)) => {
                    assert_eq!(config.api.base_url, "https://alerts.example.com");
                    config_sent = true;
                }
                other => panic!("unexpected message: {other:?}"),
            }
        }
        assert!(cleared && config_sent);
    }

    #[tokio::test]
    async fn test_failed_save_notifies_frontend() {
        let dir = tempfile::tempdir().unwrap();
        // a directory cannot be opened as the config file
        let (tx, mut rx) = mpsc::channel(8);
        let context = context_with(tx, SignedOut, Some(dir.path().to_path_buf()));

        services::config_service::handle_api_base_url_change(
            context.clone(),
            "https://alerts.example.com".to_string(),
        )
        .await;

        match rx.recv().await {
            Some(MessageFromBackend::NotificationMessage(notification)) => {
                assert_eq!(notification.notification_type, NotificationType::Error);
                assert!(notification.message.starts_with("Could not save settings"));
            }
            other => panic!("expected a notification, got {other:?}"),
        }
        assert_eq!(
            context.state.read().await.config.api.base_url,
            "https://alerts.example.com"
        );
    }
}
