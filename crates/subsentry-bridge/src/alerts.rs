//! Renewal alert payloads shared by both halves of the application.

/// A single upcoming renewal as returned by `GET /api/alerts/upcoming`.
///
/// Values are never mutated after they are received; a successful fetch
/// replaces the whole set.
#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingRenewal {
    /// Opaque identifier assigned by the service.
    pub id: String,
    /// Display name of the subscription.
    pub name: String,
    /// Renewal date as sent by the service (ISO 8601 date or date-time).
    /// Empty when the service sent none.
    pub renewal_date: String,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub is_trial: Option<bool>,
}

/// Monotonically increasing tag attached to every fetch cycle.
///
/// Sequences are compared to decide whether a completion is still the most
/// recently issued one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestSeq(pub u64);

impl std::fmt::Display for RequestSeq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Terminal result of one fetch cycle that got past the sign-in check.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// The service answered successfully; the set must be replaced with this.
    Loaded(Vec<UpcomingRenewal>),
    /// The credential accessor returned nothing. Not an error: the set is
    /// cleared silently.
    CredentialUnavailable,
    /// Any failure, already converted to the user-visible message.
    Failed(String),
}
