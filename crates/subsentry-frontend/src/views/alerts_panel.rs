//! Display model for the bell badge and the alerts dropdown.

use chrono::NaiveDate;
use subsentry_bridge::alerts::UpcomingRenewal;
use subsentry_bridge::config::AlertsConfig;

use crate::entities::alerts_entity::{AlertsEntity, FetchStatus};
use crate::formatting::{
    days_until_renewal, format_date, format_days_left, format_price, is_urgent_renewal,
};

pub const PANEL_TITLE: &str = "Renewal Alerts";
pub const VIEW_ALL_LABEL: &str = "View all";
pub const VIEW_ALL_HREF: &str = "/renewals";
pub const LOADING_TEXT: &str = "Loading alerts...";
pub const EMPTY_TEXT: &str = "No upcoming renewals.";

const MAX_BADGE_COUNT: usize = 9;

/// Badge text for `count` alerts. Nothing is shown for zero.
pub fn badge_label(count: usize) -> Option<String> {
    match count {
        0 => None,
        n if n <= MAX_BADGE_COUNT => Some(n.to_string()),
        _ => Some(format!("{MAX_BADGE_COUNT}+")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrgencyTag {
    Urgent,
    Upcoming,
}

impl UrgencyTag {
    pub fn label(self) -> &'static str {
        match self {
            UrgencyTag::Urgent => "Urgent",
            UrgencyTag::Upcoming => "Upcoming",
        }
    }
}

/// One dropdown row.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRow {
    pub id: String,
    pub name: String,
    pub formatted_date: String,
    /// Negative when overdue, `None` when the date could not be parsed.
    pub days_until: Option<i64>,
    pub days_label: Option<String>,
    pub tag: UrgencyTag,
    pub price: Option<String>,
    pub is_trial: bool,
}

impl AlertRow {
    pub fn new(renewal: &UpcomingRenewal, today: NaiveDate, urgent_within_days: i64) -> Self {
        let days_until = days_until_renewal(&renewal.renewal_date, today);
        let tag = if is_urgent_renewal(&renewal.renewal_date, today, urgent_within_days) {
            UrgencyTag::Urgent
        } else {
            UrgencyTag::Upcoming
        };

        Self {
            id: renewal.id.clone(),
            name: renewal.name.clone(),
            formatted_date: format_date(&renewal.renewal_date),
            days_until,
            days_label: format_days_left(days_until),
            tag,
            price: format_price(renewal.amount, renewal.currency.as_deref()),
            is_trial: renewal.is_trial.unwrap_or(false),
        }
    }

    pub fn is_urgent(&self) -> bool {
        self.tag == UrgencyTag::Urgent
    }
}

/// Dropdown body. Exactly one branch is shown.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelView {
    Loading,
    Failed(String),
    Empty,
    Loaded(Vec<AlertRow>),
}

impl PanelView {
    /// Loading wins over an error, and an error hides any stale rows.
    pub fn build(
        alerts: &AlertsEntity,
        config: &AlertsConfig,
        today: NaiveDate,
    ) -> Self {
        match &alerts.status {
            FetchStatus::Loading => PanelView::Loading,
            FetchStatus::Failed(message) => PanelView::Failed(message.clone()),
            FetchStatus::Idle if alerts.alerts.is_empty() => PanelView::Empty,
            FetchStatus::Idle => PanelView::Loaded(
                alerts
                    .alerts
                    .iter()
                    .take(config.max_visible)
                    .map(|renewal| AlertRow::new(renewal, today, config.urgent_within_days))
                    .collect(),
            ),
        }
    }
}

/// Everything the header needs to draw itself.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderView {
    pub badge: Option<String>,
    pub open: bool,
    /// Present only while the dropdown is open.
    pub panel: Option<PanelView>,
}

impl HeaderView {
    pub fn build(
        alerts: &AlertsEntity,
        config: &AlertsConfig,
        open: bool,
        today: NaiveDate,
    ) -> Self {
        Self {
            badge: badge_label(alerts.alerts.len()),
            open,
            panel: open.then(|| PanelView::build(alerts, config, today)),
        }
    }
}
