//! Renewal alerts fetching.
//!
//! One fetch cycle resolves a credential, calls `GET /api/alerts/upcoming`
//! and reports the result to the frontend. Every error is turned into the
//! string shown in the alerts panel; nothing propagates to the caller.

use std::future::Future;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use subsentry_bridge::MessageFromBackend;
use subsentry_bridge::alerts::{FetchOutcome, RequestSeq, UpcomingRenewal};
use tokio::sync::mpsc::Sender;

use crate::auth::AuthTokenProvider;
use crate::poller::PollInputs;

/// Message shown when the service gives no better explanation.
pub const DEFAULT_FETCH_ERROR: &str = "Failed to load notifications";

/// Path of the upcoming alerts endpoint, relative to the API base URL.
pub const UPCOMING_ALERTS_PATH: &str = "/api/alerts/upcoming";

/// Reasons a fetch cycle can fail once a credential was obtained.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The service answered with a non-success status.
    #[error("alerts request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    /// The response body was not valid JSON or had an unexpected shape.
    #[error("failed to parse alerts response: {0}")]
    Parse(#[from] serde_json::Error),
    /// No response was obtained (connection error, timeout, ...).
    #[error("failed to reach alerts service: {0}")]
    Transport(String),
    /// The cycle's task ended without producing an outcome.
    #[error("fetch cycle aborted: {0}")]
    Aborted(String),
}

impl FetchError {
    /// Text displayed in the alerts panel for this error.
    pub fn user_message(&self) -> String {
        match self {
            FetchError::Status { message, .. } => message.clone(),
            _ => DEFAULT_FETCH_ERROR.to_string(),
        }
    }
}

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs the authenticated GET against the alerts endpoint.
pub trait AlertsTransport: Send + Sync + 'static {
    fn get_upcoming(
        &self,
        url: &str,
        bearer_token: &str,
    ) -> impl Future<Output = Result<RawResponse, FetchError>> + Send;
}

impl AlertsTransport for reqwest::Client {
    async fn get_upcoming(&self, url: &str, bearer_token: &str) -> Result<RawResponse, FetchError> {
        let response = self
            .get(url)
            .bearer_auth(bearer_token)
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport_error)?;
        Ok(RawResponse { status, body })
    }
}

fn transport_error(error: reqwest::Error) -> FetchError {
    FetchError::Transport(error.without_url().to_string())
}

/// Builds the full endpoint URL from the configured base.
pub fn alerts_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), UPCOMING_ALERTS_PATH)
}

/// Reasons a single entry of the subscription list is skipped.
#[derive(Debug, thiserror::Error)]
pub enum EntryError {
    #[error(transparent)]
    Invalid(#[from] serde_json::Error),
    #[error("entry has no `_id` or `id`")]
    MissingId,
}

/// Identifier as sent by the service: document stores use strings, other
/// backends plain numbers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(serde_json::Number),
}

impl From<WireId> for String {
    fn from(id: WireId) -> Self {
        match id {
            WireId::Text(text) => text,
            WireId::Number(number) => number.to_string(),
        }
    }
}

/// One element of `subscriptions` as it appears on the wire.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRenewal {
    #[serde(rename = "_id", default)]
    object_id: Option<WireId>,
    #[serde(default)]
    id: Option<WireId>,
    name: String,
    #[serde(default)]
    renewal_date: Option<String>,
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    currency: Option<String>,
    #[serde(default)]
    is_trial: Option<bool>,
}

/// Converts one list entry. `_id` wins over `id` when both are present.
pub fn parse_entry(entry: Value) -> Result<UpcomingRenewal, EntryError> {
    let wire: WireRenewal = serde_json::from_value(entry)?;
    let id = wire.object_id.or(wire.id).ok_or(EntryError::MissingId)?;
    Ok(UpcomingRenewal {
        id: id.into(),
        name: wire.name,
        renewal_date: wire.renewal_date.unwrap_or_default(),
        amount: wire.amount,
        currency: wire.currency,
        is_trial: wire.is_trial,
    })
}

/// Interprets a response from the alerts endpoint.
///
/// The body is parsed before the status is looked at, so that a failure body
/// can contribute its `message`. Entries of the list that cannot be read are
/// skipped; the rest keep their server order.
pub fn parse_alerts_response(response: &RawResponse) -> Result<Vec<UpcomingRenewal>, FetchError> {
    let body = serde_json::from_str::<Value>(&response.body);

    if !response.is_success() {
        let message = body
            .as_ref()
            .ok()
            .and_then(|body| body.get("message"))
            .and_then(Value::as_str)
            .filter(|message| !message.is_empty())
            .unwrap_or(DEFAULT_FETCH_ERROR);
        return Err(FetchError::Status {
            status: response.status,
            message: message.to_string(),
        });
    }

    let mut body = body?;
    let Some(Value::Array(entries)) = body.get_mut("subscriptions").map(Value::take) else {
        return Ok(Vec::new());
    };

    let alerts = entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match parse_entry(entry) {
            Ok(renewal) => Some(renewal),
            Err(e) => {
                log::warn!("Skipping subscription #{index}: {e}");
                None
            }
        })
        .collect();
    Ok(alerts)
}

/// Steps of a fetch cycle after the sign-in check: credential, request,
/// interpretation.
pub async fn fetch_alerts<A, T>(auth: &A, transport: &T, base_url: &str) -> FetchOutcome
where
    A: AuthTokenProvider,
    T: AlertsTransport,
{
    let Some(token) = auth.get_token().await.filter(|token| !token.is_empty()) else {
        log::debug!("No credential available, clearing alerts");
        return FetchOutcome::CredentialUnavailable;
    };

    let url = alerts_url(base_url);
    let result = transport
        .get_upcoming(&url, &token)
        .await
        .and_then(|response| parse_alerts_response(&response));

    match result {
        Ok(alerts) => {
            log::debug!("Loaded {} upcoming renewals", alerts.len());
            FetchOutcome::Loaded(alerts)
        }
        Err(e) => {
            log::warn!("Failed to load upcoming renewals: {e}");
            FetchOutcome::Failed(e.user_message())
        }
    }
}

/// Runs one complete fetch cycle and reports it over `tx`.
///
/// When `inputs` says nobody is signed in, only [`MessageFromBackend::AlertsCleared`]
/// is sent and the network is not touched. Otherwise `AlertsFetchStarted` is
/// always followed by `AlertsFetchFinished`, including when the request
/// panics.
pub async fn run_fetch_cycle<A, T>(
    auth: Arc<A>,
    transport: T,
    inputs: PollInputs,
    seq: RequestSeq,
    tx: Sender<MessageFromBackend>,
) where
    A: AuthTokenProvider,
    T: AlertsTransport,
{
    if !inputs.signed_in {
        log::debug!("Fetch cycle {seq}: not signed in, clearing alerts");
        report(&tx, MessageFromBackend::AlertsCleared { seq }).await;
        return;
    }

    log::debug!("Fetch cycle {seq}: started");
    report(&tx, MessageFromBackend::AlertsFetchStarted { seq }).await;

    let base_url = inputs.base_url;
    let request =
        tokio::spawn(async move { fetch_alerts(auth.as_ref(), &transport, &base_url).await });
    let outcome = match request.await {
        Ok(outcome) => outcome,
        Err(e) => {
            let error = FetchError::Aborted(e.to_string());
            log::error!("Fetch cycle {seq}: {error}");
            FetchOutcome::Failed(error.user_message())
        }
    };

    log::debug!("Fetch cycle {seq}: finished");
    report(&tx, MessageFromBackend::AlertsFetchFinished { seq, outcome }).await;
}

async fn report(tx: &Sender<MessageFromBackend>, message: MessageFromBackend) {
    if tx.send(message).await.is_err() {
        log::warn!("Frontend is gone, dropping alerts update");
    }
}

/// Handles a manual refresh (see
/// [`subsentry_bridge::MessageToBackend::RefreshAlertsRequest`]).
pub async fn handle_refresh_request<A: AuthTokenProvider>(context: super::AppContextHandle<A>) {
    let inputs = context.current_inputs().await;
    tokio::spawn(async move { context.run_fetch_cycle(inputs).await });
}

/// Handles an auth change (see
/// [`subsentry_bridge::MessageToBackend::AuthStateChanged`]).
///
/// Polling restarts only if the sign-in status actually changed; a sign-out
/// thereby clears the alerts immediately.
pub async fn handle_auth_state_changed<A: AuthTokenProvider>(
    context: super::AppContextHandle<A>,
) {
    context.restart_polling().await;
}
