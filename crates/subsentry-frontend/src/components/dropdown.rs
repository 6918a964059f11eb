//! Open/closed state of the alerts dropdown and its outside-click dismissal.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::dom::{Document, ListenerGuard, NodeRef};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DropdownState {
    #[default]
    Closed,
    Open,
}

/// Inputs that move the dropdown between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropdownSignal {
    /// The bell was activated. Toggles.
    BellActivated,
    /// A pointer went down outside the dropdown region. Closes.
    OutsideClick,
}

impl DropdownState {
    pub fn is_open(self) -> bool {
        self == DropdownState::Open
    }

    pub fn next(self, signal: DropdownSignal) -> Self {
        match (signal, self) {
            (DropdownSignal::BellActivated, DropdownState::Closed) => DropdownState::Open,
            (DropdownSignal::BellActivated, DropdownState::Open) => DropdownState::Closed,
            (DropdownSignal::OutsideClick, _) => DropdownState::Closed,
        }
    }
}

/// Document-level pointer listener that exists only while the dropdown is
/// open.
pub struct OutsideClickDetector {
    document: Document,
    region: NodeRef,
    signals: UnboundedSender<DropdownSignal>,
    guard: Option<ListenerGuard>,
}

impl OutsideClickDetector {
    pub fn new(
        document: Document,
        region: NodeRef,
        signals: UnboundedSender<DropdownSignal>,
    ) -> Self {
        Self {
            document,
            region,
            signals,
            guard: None,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.guard.is_some()
    }

    /// Attach on open, detach on close. Repeated calls with the same state
    /// leave the registration alone.
    pub fn sync(&mut self, state: DropdownState) {
        match (state, self.guard.is_some()) {
            (DropdownState::Open, false) => self.attach(),
            (DropdownState::Closed, true) => {
                self.guard = None;
                log::debug!("Outside-click listener detached");
            }
            _ => {}
        }
    }

    fn attach(&mut self) {
        let region = self.region.clone();
        let signals = self.signals.clone();
        self.guard = Some(self.document.add_pointer_down_listener(move |event| {
            // an unmeasured region has no outside yet
            let outside = region
                .get()
                .is_some_and(|bounds| !bounds.contains(event.position));
            if outside && signals.send(DropdownSignal::OutsideClick).is_err() {
                log::debug!("Dropdown is gone, dropping outside click");
            }
        }));
        log::debug!("Outside-click listener attached");
    }
}

/// Owns the dropdown state and keeps the outside-click listener in step
/// with it.
pub struct DropdownController {
    state: DropdownState,
    detector: OutsideClickDetector,
    signals: UnboundedReceiver<DropdownSignal>,
}

impl DropdownController {
    pub fn new(document: Document, region: NodeRef) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            state: DropdownState::Closed,
            detector: OutsideClickDetector::new(document, region, tx),
            signals: rx,
        }
    }

    pub fn state(&self) -> DropdownState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn is_listening(&self) -> bool {
        self.detector.is_attached()
    }

    /// Apply one signal. Returns whether the state changed.
    pub fn handle(&mut self, signal: DropdownSignal) -> bool {
        let next = self.state.next(signal);
        let changed = next != self.state;
        self.state = next;
        self.detector.sync(next);
        changed
    }

    /// Apply the signals document listeners queued since the last call.
    pub fn drain_signals(&mut self) -> bool {
        let mut changed = false;
        while let Ok(signal) = self.signals.try_recv() {
            changed |= self.handle(signal);
        }
        changed
    }
}
