pub mod alerts_panel;

use chrono::NaiveDate;
use subsentry_bridge::notification::{NotificationMessage, NotificationType};
use subsentry_bridge::{MessageFromBackend, MessageToBackend};

use crate::components::dropdown::{DropdownController, DropdownSignal};
use crate::components::search_shortcut::SearchShortcut;
use crate::dom::{Document, FocusHandle, KeyDownEvent, NodeRef, PointerDownEvent};
use crate::entities::DataEntities;
use crate::views::alerts_panel::HeaderView;

/// Input coming from the host surface.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    BellActivated,
    PointerDown(PointerDownEvent),
    KeyDown(KeyDownEvent),
    RefreshRequested,
    AuthStateChanged,
    SetApiBaseUrl(String),
}

/// The header bar: bell, badge, alerts dropdown and the search shortcut.
///
/// Document listeners are owned through guards, so dropping the header
/// removes every listener it registered.
pub struct HeaderUi {
    data: DataEntities,
    document: Document,
    dropdown_region: NodeRef,
    search: FocusHandle,
    dropdown: DropdownController,
    _search_shortcut: SearchShortcut,
}

impl HeaderUi {
    pub fn new(document: Document) -> Self {
        let dropdown_region = NodeRef::new();
        let search = FocusHandle::new();
        Self {
            data: DataEntities::default(),
            dropdown: DropdownController::new(document.clone(), dropdown_region.clone()),
            _search_shortcut: SearchShortcut::register(&document, search.clone()),
            document,
            dropdown_region,
            search,
        }
    }

    pub fn data(&self) -> &DataEntities {
        &self.data
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Area covered by the bell and its dropdown. Clicks outside it close the
    /// dropdown.
    pub fn dropdown_region(&self) -> &NodeRef {
        &self.dropdown_region
    }

    pub fn search_focus(&self) -> &FocusHandle {
        &self.search
    }

    pub fn is_open(&self) -> bool {
        self.dropdown.is_open()
    }

    pub fn handle_backend_message(&mut self, message: MessageFromBackend) {
        let ordering = self.data.settings.alerts().result_ordering;
        let alerts = &mut self.data.alerts;
        match message {
            MessageFromBackend::ConfigurationResponse(config) => {
                self.data.settings.update(config);
            }
            MessageFromBackend::NotificationMessage(notification) => {
                log_notification(&notification);
            }
            MessageFromBackend::AlertsFetchStarted { seq } => {
                alerts.fetch_started(seq, ordering);
            }
            MessageFromBackend::AlertsFetchFinished { seq, outcome } => {
                alerts.fetch_finished(seq, outcome, ordering);
            }
            MessageFromBackend::AlertsCleared { seq } => {
                alerts.cleared(seq, ordering);
            }
        }
    }

    /// Apply a UI event. Returns the command to forward to the backend, if
    /// the event calls for one.
    pub fn handle_ui_event(&mut self, event: UiEvent) -> Option<MessageToBackend> {
        match event {
            UiEvent::BellActivated => {
                self.dropdown.handle(DropdownSignal::BellActivated);
                None
            }
            UiEvent::PointerDown(event) => {
                self.document.dispatch_pointer_down(&event);
                self.dropdown.drain_signals();
                None
            }
            UiEvent::KeyDown(mut event) => {
                self.document.dispatch_key_down(&mut event);
                None
            }
            UiEvent::RefreshRequested => Some(MessageToBackend::RefreshAlertsRequest),
            UiEvent::AuthStateChanged => Some(MessageToBackend::AuthStateChanged),
            UiEvent::SetApiBaseUrl(url) => Some(MessageToBackend::SetApiBaseUrl(url)),
        }
    }

    pub fn render(&self, today: NaiveDate) -> HeaderView {
        HeaderView::build(
            &self.data.alerts,
            self.data.settings.alerts(),
            self.dropdown.is_open(),
            today,
        )
    }
}

fn log_notification(notification: &NotificationMessage) {
    let message = &notification.message;
    match notification.notification_type {
        NotificationType::Warning => log::warn!("{message}"),
        NotificationType::Error => log::error!("{message}"),
    }
}

#[cfg(test)]
mod tests {
    use subsentry_bridge::alerts::{FetchOutcome, RequestSeq, UpcomingRenewal};
    use subsentry_bridge::config::Config;

    use super::*;
    use crate::dom::{Bounds, ListenerKind, Modifiers, Point};
    use crate::views::alerts_panel::PanelView;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn header() -> HeaderUi {
        let header = HeaderUi::new(Document::new());
        header
            .dropdown_region()
            .set(Bounds::new(600.0, 0.0, 320.0, 400.0));
        header
    }

    fn netflix() -> UpcomingRenewal {
        UpcomingRenewal {
            id: "a".to_string(),
            name: "Netflix".to_string(),
            renewal_date: "2026-10-20".to_string(),
            amount: None,
            currency: None,
            is_trial: None,
        }
    }

    fn click(x: f32, y: f32) -> UiEvent {
        UiEvent::PointerDown(PointerDownEvent {
            position: Point::new(x, y),
        })
    }

    #[test]
    fn test_end_to_end_single_urgent_alert() {
        let mut header = header();
        header.handle_backend_message(MessageFromBackend::AlertsFetchStarted { seq: RequestSeq(1) });
        header.handle_backend_message(MessageFromBackend::AlertsFetchFinished {
            seq: RequestSeq(1),
            outcome: FetchOutcome::Loaded(vec![netflix()]),
        });
        header.handle_ui_event(UiEvent::BellActivated);

        let view = header.render(today());
        assert_eq!(view.badge.as_deref(), Some("1"));
        let Some(PanelView::Loaded(rows)) = view.panel else {
            panic!("expected rows");
        };
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].name, "Netflix");
        assert_eq!(rows[0].tag.label(), "Urgent");
        assert_eq!(rows[0].days_label.as_deref(), Some("in 2d"));
    }

    #[test]
    fn test_open_click_outside_and_listener_lifecycle() {
        let mut header = header();
        assert!(!header.is_open());
        assert_eq!(
            header.document().listener_count(ListenerKind::PointerDown),
            0
        );

        header.handle_ui_event(UiEvent::BellActivated);
        assert!(header.is_open());
        assert_eq!(
            header.document().listener_count(ListenerKind::PointerDown),
            1
        );

        header.handle_ui_event(click(650.0, 50.0));
        assert!(header.is_open());

        header.handle_ui_event(click(10.0, 10.0));
        assert!(!header.is_open());
        assert_eq!(
            header.document().listener_count(ListenerKind::PointerDown),
            0
        );
    }

    #[test]
    fn test_ctrl_k_focuses_search() {
        let mut header = header();
        header.handle_ui_event(UiEvent::KeyDown(KeyDownEvent::new(
            "K",
            Modifiers {
                meta: true,
                ..Default::default()
            },
        )));
        assert!(header.search_focus().is_focused());
    }

    #[test]
    fn test_commands_are_forwarded() {
        let mut header = header();
        assert!(matches!(
            header.handle_ui_event(UiEvent::RefreshRequested),
            Some(MessageToBackend::RefreshAlertsRequest)
        ));
        assert!(matches!(
            header.handle_ui_event(UiEvent::AuthStateChanged),
            Some(MessageToBackend::AuthStateChanged)
        ));
        assert!(header.handle_ui_event(UiEvent::BellActivated).is_none());
    }

    #[test]
    fn test_config_response_drives_rendering() {
        let mut header = header();
        let mut config = Config::default();
        config.alerts.urgent_within_days = 1;
        header.handle_backend_message(MessageFromBackend::ConfigurationResponse(config));
        header.handle_backend_message(MessageFromBackend::AlertsFetchFinished {
            seq: RequestSeq(1),
            outcome: FetchOutcome::Loaded(vec![netflix()]),
        });
        header.handle_ui_event(UiEvent::BellActivated);

        let Some(PanelView::Loaded(rows)) = header.render(today()).panel else {
            panic!("expected rows");
        };
        assert_eq!(rows[0].tag.label(), "Upcoming");
    }

    #[test]
    fn test_sign_out_clears_badge() {
        let mut header = header();
        header.handle_backend_message(MessageFromBackend::AlertsFetchFinished {
            seq: RequestSeq(1),
            outcome: FetchOutcome::Loaded(vec![netflix()]),
        });
        header.handle_backend_message(MessageFromBackend::AlertsCleared { seq: RequestSeq(2) });
        assert_eq!(header.render(today()).badge, None);
        assert!(header.data().alerts.alerts.is_empty());
    }

    #[test]
    fn test_teardown_removes_all_listeners() {
        let document = Document::new();
        let mut header = HeaderUi::new(document.clone());
        header.handle_ui_event(UiEvent::BellActivated);
        assert_eq!(document.listener_count(ListenerKind::KeyDown), 1);
        assert_eq!(document.listener_count(ListenerKind::PointerDown), 1);

        drop(header);
        assert_eq!(document.listener_count(ListenerKind::KeyDown), 0);
        assert_eq!(document.listener_count(ListenerKind::PointerDown), 0);
    }
}
