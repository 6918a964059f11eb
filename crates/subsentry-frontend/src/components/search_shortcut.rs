use crate::dom::{Document, FocusHandle, KeyDownEvent, ListenerGuard};

/// Ctrl+K or Cmd+K, regardless of the Shift state of the letter.
pub fn is_search_shortcut(event: &KeyDownEvent) -> bool {
    (event.modifiers.control || event.modifiers.meta) && event.key.eq_ignore_ascii_case("k")
}

/// Focuses the search field on Ctrl/Cmd+K for as long as it is alive.
#[derive(Debug)]
pub struct SearchShortcut {
    _guard: ListenerGuard,
}

impl SearchShortcut {
    pub fn register(document: &Document, search: FocusHandle) -> Self {
        let guard = document.add_key_down_listener(move |event| {
            if is_search_shortcut(event) {
                event.prevent_default();
                search.focus();
                log::debug!("Search shortcut pressed");
            }
        });
        Self { _guard: guard }
    }
}
