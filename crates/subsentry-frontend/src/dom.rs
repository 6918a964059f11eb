//! Minimal document model the header attaches to.
//!
//! The host surface forwards raw pointer and key events to a [`Document`],
//! which fans them out to every registered listener. Registration returns a
//! [`ListenerGuard`]; dropping the guard removes the listener, so a component
//! that goes away never leaves a handler behind.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub origin: Point,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            width,
            height,
        }
    }

    /// Whether `point` lies inside. The far edges are exclusive.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.origin.x
            && point.x < self.origin.x + self.width
            && point.y >= self.origin.y
            && point.y < self.origin.y + self.height
    }
}

/// Handle to a rendered element's on-screen area.
///
/// Empty until the host lays the element out.
#[derive(Debug, Clone, Default)]
pub struct NodeRef {
    bounds: Arc<Mutex<Option<Bounds>>>,
}

impl NodeRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, bounds: Bounds) {
        *lock(&self.bounds) = Some(bounds);
    }

    pub fn clear(&self) {
        *lock(&self.bounds) = None;
    }

    pub fn get(&self) -> Option<Bounds> {
        *lock(&self.bounds)
    }
}

/// Focus flag for a focusable element such as the search field.
#[derive(Debug, Clone, Default)]
pub struct FocusHandle {
    focused: Arc<AtomicBool>,
}

impl FocusHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) {
        self.focused.store(true, Ordering::Relaxed);
    }

    pub fn blur(&self) {
        self.focused.store(false, Ordering::Relaxed);
    }

    pub fn is_focused(&self) -> bool {
        self.focused.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub control: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeyDownEvent {
    pub key: String,
    pub modifiers: Modifiers,
    default_prevented: bool,
}

impl KeyDownEvent {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
            default_prevented: false,
        }
    }

    /// Suppress the host's default action for this key press.
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerDownEvent {
    pub position: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerKind {
    PointerDown,
    KeyDown,
}

type PointerDownListener = Box<dyn FnMut(&PointerDownEvent) + Send>;
type KeyDownListener = Box<dyn FnMut(&mut KeyDownEvent) + Send>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    pointer_down: BTreeMap<u64, PointerDownListener>,
    key_down: BTreeMap<u64, KeyDownListener>,
}

impl Listeners {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Document-level event target.
///
/// Listeners run in registration order while the listener table is locked,
/// so they must not register or drop listeners themselves.
#[derive(Clone, Default)]
pub struct Document {
    listeners: Arc<Mutex<Listeners>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_pointer_down_listener(
        &self,
        listener: impl FnMut(&PointerDownEvent) + Send + 'static,
    ) -> ListenerGuard {
        let mut listeners = lock(&self.listeners);
        let id = listeners.allocate_id();
        listeners.pointer_down.insert(id, Box::new(listener));
        self.guard(id, ListenerKind::PointerDown)
    }

    pub fn add_key_down_listener(
        &self,
        listener: impl FnMut(&mut KeyDownEvent) + Send + 'static,
    ) -> ListenerGuard {
        let mut listeners = lock(&self.listeners);
        let id = listeners.allocate_id();
        listeners.key_down.insert(id, Box::new(listener));
        self.guard(id, ListenerKind::KeyDown)
    }

    pub fn dispatch_pointer_down(&self, event: &PointerDownEvent) {
        for listener in lock(&self.listeners).pointer_down.values_mut() {
            listener(event);
        }
    }

    pub fn dispatch_key_down(&self, event: &mut KeyDownEvent) {
        for listener in lock(&self.listeners).key_down.values_mut() {
            listener(event);
        }
    }

    /// Number of live listeners of the given kind.
    pub fn listener_count(&self, kind: ListenerKind) -> usize {
        let listeners = lock(&self.listeners);
        match kind {
            ListenerKind::PointerDown => listeners.pointer_down.len(),
            ListenerKind::KeyDown => listeners.key_down.len(),
        }
    }

    fn guard(&self, id: u64, kind: ListenerKind) -> ListenerGuard {
        ListenerGuard {
            id,
            kind,
            listeners: Arc::downgrade(&self.listeners),
        }
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("pointer_down", &self.listener_count(ListenerKind::PointerDown))
            .field("key_down", &self.listener_count(ListenerKind::KeyDown))
            .finish()
    }
}

/// Keeps a listener registered for as long as it is alive.
#[must_use = "dropping the guard removes the listener immediately"]
#[derive(Debug)]
pub struct ListenerGuard {
    id: u64,
    kind: ListenerKind,
    listeners: Weak<Mutex<Listeners>>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let Some(listeners) = self.listeners.upgrade() else {
            return;
        };
        let mut listeners = lock(&listeners);
        match self.kind {
            ListenerKind::PointerDown => {
                listeners.pointer_down.remove(&self.id);
            }
            ListenerKind::KeyDown => {
                listeners.key_down.remove(&self.id);
            }
        }
    }
}

// A listener that panicked leaves the table itself intact.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
