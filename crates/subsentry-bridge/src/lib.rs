//! Communication bridge between frontend and backend.
//!
//! This crate defines the types and protocols used to connect the header
//! frontend (dropdown, shortcuts, render model) with the asynchronous backend
//! that polls the renewal alerts endpoint.
//!
//! The design is deliberately lightweight and unidirectional:
//! - The frontend sends commands (e.g., refresh alerts, request config,
//!   report an auth change).
//! - The backend pushes events (e.g., fetch started/finished, alerts cleared,
//!   notifications).
//!
//! Communication happens over bounded [`tokio::sync::mpsc`] channels wrapped
//! in [`BridgeChannels`], providing back-pressure, async compatibility, and
//! clean separation of concerns.

pub mod alerts;
pub mod config;
pub mod notification;

use tokio::sync::mpsc::{self, Receiver, Sender};

use crate::alerts::{FetchOutcome, RequestSeq};

/// Messages emitted by the backend to inform the frontend of state updates.
///
/// Every fetch cycle that reaches the network step produces exactly one
/// [`MessageFromBackend::AlertsFetchStarted`] followed by exactly one
/// [`MessageFromBackend::AlertsFetchFinished`] carrying the same sequence.
#[derive(Debug, Clone)]
pub enum MessageFromBackend {
    /// Generic message for all notifications in the application.
    NotificationMessage(notification::NotificationMessage),
    /// Response to the configuration request from the frontend.
    ConfigurationResponse(config::Config),
    /// A fetch cycle has begun: loading is on and any previous error is void.
    AlertsFetchStarted { seq: RequestSeq },
    /// A fetch cycle has ended, successfully or not.
    AlertsFetchFinished {
        seq: RequestSeq,
        outcome: FetchOutcome,
    },
    /// The user is not signed in; the alert set must be emptied at once.
    AlertsCleared { seq: RequestSeq },
}

/// Commands issued by the frontend to control or query the backend.
#[derive(Debug, Clone)]
pub enum MessageToBackend {
    /// Request for the application configuration.
    ConfigurationRequest,
    /// Run one fetch cycle right now, outside the polling schedule.
    RefreshAlertsRequest,
    /// The identity provider reported a sign-in or sign-out.
    AuthStateChanged,
    /// Point the alerts client at a different API base URL.
    SetApiBaseUrl(String),
}

/// Paired `tokio::mpsc` channels for bidirectional communication between
/// frontend and backend.
pub struct BridgeChannels {
    /// Receiver used by the frontend to get messages from the backend.
    pub frontend_rx: Receiver<MessageFromBackend>,
    /// Sender used by the frontend to send commands to the backend.
    pub frontend_tx: Sender<MessageToBackend>,

    /// Receiver used by the backend to get commands from the frontend.
    pub backend_rx: Receiver<MessageToBackend>,
    /// Sender used by the backend to send events/responses to the frontend.
    pub backend_tx: Sender<MessageFromBackend>,
}

impl BridgeChannels {
    /// Creates a new pair of bridged channels with the given buffer capacity.
    pub fn new(buffer: usize) -> Self {
        let (to_backend_tx, to_backend_rx) = mpsc::channel(buffer);
        let (to_frontend_tx, to_frontend_rx) = mpsc::channel(buffer);
        Self {
            frontend_tx: to_backend_tx,
            frontend_rx: to_frontend_rx,
            backend_rx: to_backend_rx,
            backend_tx: to_frontend_tx,
        }
    }
}

impl Default for BridgeChannels {
    fn default() -> Self {
        Self::new(64)
    }
}
