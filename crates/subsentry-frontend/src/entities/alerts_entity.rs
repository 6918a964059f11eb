use subsentry_bridge::alerts::{FetchOutcome, RequestSeq, UpcomingRenewal};
use subsentry_bridge::config::ResultOrdering;

/// Request status shown alongside the alert set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FetchStatus {
    #[default]
    Idle,
    Loading,
    /// The last applied fetch failed with this user-visible message.
    Failed(String),
}

/// Renewal alerts as last reported by the backend.
///
/// Updates are tagged with the sequence of the fetch cycle that produced
/// them. Under [`ResultOrdering::LatestIssued`] anything older than the
/// newest sequence seen is discarded, so a slow response can never replace
/// the result of a request issued after it.
#[derive(Debug, Clone, Default)]
pub struct AlertsEntity {
    pub alerts: Vec<UpcomingRenewal>,
    pub status: FetchStatus,
    latest_seq: Option<RequestSeq>,
}

impl AlertsEntity {
    pub fn is_loading(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            FetchStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    fn is_stale(&self, seq: RequestSeq) -> bool {
        self.latest_seq.is_some_and(|latest| seq < latest)
    }

    fn observe(&mut self, seq: RequestSeq) {
        self.latest_seq = self.latest_seq.max(Some(seq));
    }

    /// A fetch cycle has begun. Returns whether it was applied.
    pub fn fetch_started(&mut self, seq: RequestSeq, ordering: ResultOrdering) -> bool {
        if ordering == ResultOrdering::LatestIssued && self.is_stale(seq) {
            log::debug!("Ignoring start of superseded fetch {seq}");
            return false;
        }
        self.observe(seq);
        self.status = FetchStatus::Loading;
        true
    }

    /// A fetch cycle has ended. Returns whether it was applied.
    pub fn fetch_finished(
        &mut self,
        seq: RequestSeq,
        outcome: FetchOutcome,
        ordering: ResultOrdering,
    ) -> bool {
        if ordering == ResultOrdering::LatestIssued && self.is_stale(seq) {
            log::debug!("Discarding result of superseded fetch {seq}");
            return false;
        }
        self.observe(seq);

        match outcome {
            FetchOutcome::Loaded(alerts) => {
                self.alerts = alerts;
                self.status = FetchStatus::Idle;
            }
            FetchOutcome::CredentialUnavailable => {
                self.alerts.clear();
                self.status = FetchStatus::Idle;
            }
            FetchOutcome::Failed(message) => {
                // the previous set stays on screen next to the error
                self.status = FetchStatus::Failed(message);
            }
        }
        true
    }

    /// The user is signed out: empty the set right away.
    ///
    /// Under [`ResultOrdering::LatestIssued`] the clear also supersedes any
    /// request still in flight and resets the status.
    pub fn cleared(&mut self, seq: RequestSeq, ordering: ResultOrdering) {
        self.alerts.clear();
        self.observe(seq);
        if ordering == ResultOrdering::LatestIssued {
            self.status = FetchStatus::Idle;
        }
    }
}
