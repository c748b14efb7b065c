//! Document-level keyboard shortcuts
//!
//! Listeners live in a [`ShortcutRegistry`] for as long as the
//! [`ListenerGuard`] returned by `register` is alive. The only shortcut the
//! playroom installs is save (Cmd+S on Apple platforms, Ctrl+S elsewhere),
//! which formats the editor contents in place.

use crate::editor::{EditorWidget, Position};
use crate::format::CodeFormatter;
use crate::Result;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tracing::{debug, warn};

/// Platform family, decides the shortcut modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Apple,
    Other,
}

impl Platform {
    /// Platform of the compile target
    pub fn current() -> Self {
        if cfg!(any(target_os = "macos", target_os = "ios")) {
            Self::Apple
        } else {
            Self::Other
        }
    }

    /// Classify a platform string such as `MacIntel` or `Win32`
    pub fn from_name(name: &str) -> Self {
        if name.contains("Mac") || name.contains("iPhone") || name.contains("iPad") {
            Self::Apple
        } else {
            Self::Other
        }
    }

    /// The save chord as this platform reports it
    pub fn save_chord(self) -> KeyEvent {
        let event = KeyEvent::new("KeyS", "s");
        match self {
            Self::Apple => event.with_meta(),
            Self::Other => event.with_ctrl(),
        }
    }
}

/// A key press, described by physical key code and modifiers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyEvent {
    /// Physical key, e.g. `KeyS`
    pub code: String,
    /// Produced character, e.g. `s`
    pub key: String,
    pub meta: bool,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyEvent {
    pub fn new(code: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }
}

/// Whether `event` is the save chord on `platform`
pub fn is_save_chord(event: &KeyEvent, platform: Platform) -> bool {
    event.code == "KeyS"
        && match platform {
            Platform::Apple => event.meta,
            Platform::Other => event.ctrl,
        }
}

/// What a listener did with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    /// The caller must prevent the default action and stop propagation
    Handled,
}

type Listener = Arc<dyn Fn(&KeyEvent) -> KeyOutcome + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(u64, Listener)>,
}

/// Document-level listener list
#[derive(Clone, Default)]
pub struct ShortcutRegistry {
    listeners: Arc<Mutex<Listeners>>,
}

impl ShortcutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener; it is removed when the guard drops
    pub fn register<F>(&self, listener: F) -> ListenerGuard
    where
        F: Fn(&KeyEvent) -> KeyOutcome + Send + Sync + 'static,
    {
        let mut listeners = self.listeners.lock();
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));
        ListenerGuard {
            listeners: Arc::downgrade(&self.listeners),
            id,
        }
    }

    /// Offer `event` to listeners in registration order until one handles it
    pub fn dispatch(&self, event: &KeyEvent) -> KeyOutcome {
        // Listeners may register or drop guards while running
        let snapshot: Vec<Listener> = self
            .listeners
            .lock()
            .entries
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in snapshot {
            if listener(event) == KeyOutcome::Handled {
                return KeyOutcome::Handled;
            }
        }
        KeyOutcome::Ignored
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().entries.len()
    }
}

impl PartialEq for ShortcutRegistry {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.listeners, &other.listeners)
    }
}

/// Keeps a listener registered; dropping it deregisters
#[must_use = "dropping the guard removes the listener"]
pub struct ListenerGuard {
    listeners: Weak<Mutex<Listeners>>,
    id: u64,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            listeners.lock().entries.retain(|(id, _)| *id != self.id);
        }
    }
}

/// Save chord handler: read, format, write back
#[derive(Clone)]
pub struct SaveShortcut {
    editor: Arc<dyn EditorWidget>,
    formatter: Arc<dyn CodeFormatter>,
    platform: Platform,
}

impl SaveShortcut {
    pub fn new(
        editor: Arc<dyn EditorWidget>,
        formatter: Arc<dyn CodeFormatter>,
        platform: Platform,
    ) -> Self {
        Self {
            editor,
            formatter,
            platform,
        }
    }

    /// Handle a key press
    ///
    /// The save chord is always reported as handled, even when formatting
    /// fails, so the host's own save action never runs.
    pub fn handle(&self, event: &KeyEvent) -> KeyOutcome {
        if !is_save_chord(event, self.platform) {
            return KeyOutcome::Ignored;
        }
        if let Err(e) = self.format_editor() {
            warn!("Format failed, editor left unchanged: {}", e);
        }
        KeyOutcome::Handled
    }

    /// Format the editor contents in place, moving the cursor with them
    pub fn format_editor(&self) -> Result<()> {
        let code = self.editor.get_value();
        let cursor = self.editor.get_position();
        let formatted = self.formatter.format(&code, cursor)?;
        debug!(
            "Formatted code, cursor {}:{} -> {}:{}",
            cursor.line_number, cursor.column, formatted.line, formatted.ch
        );

        self.editor.set_value(&formatted.code);
        self.editor
            .set_position(Position::new(formatted.line, formatted.ch));
        Ok(())
    }

    /// Register with `registry`
    pub fn install(self, registry: &ShortcutRegistry) -> ListenerGuard {
        registry.register(move |event| self.handle(event))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::editor::{BufferEditor, EditorModel};
    use crate::format::Formatted;
    use crate::Error;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Recording {
        calls: Mutex<Vec<(String, Position)>>,
    }

    impl CodeFormatter for Recording {
        fn format(&self, code: &str, cursor: Position) -> Result<Formatted> {
            self.calls.lock().push((code.to_string(), cursor));
            Ok(Formatted {
                code: format!("{code}\n"),
                line: 2,
                ch: 1,
            })
        }
    }

    struct Failing;

    impl CodeFormatter for Failing {
        fn format(&self, _code: &str, _cursor: Position) -> Result<Formatted> {
            Err(Error::Format("boom".to_string()))
        }
    }

    fn save(platform: Platform) -> KeyEvent {
        platform.save_chord()
    }

    #[test]
    fn test_platform_modifier() {
        assert!(is_save_chord(&save(Platform::Apple), Platform::Apple));
        assert!(!is_save_chord(&save(Platform::Apple), Platform::Other));
        assert!(is_save_chord(&save(Platform::Other), Platform::Other));
        assert!(!is_save_chord(&save(Platform::Other), Platform::Apple));
        assert!(!is_save_chord(&KeyEvent::new("KeyS", "s"), Platform::Other));
        assert!(!is_save_chord(&KeyEvent::new("KeyD", "d").with_ctrl(), Platform::Other));
    }

    #[test]
    fn test_platform_from_name() {
        assert_eq!(Platform::from_name("MacIntel"), Platform::Apple);
        assert_eq!(Platform::from_name("Win32"), Platform::Other);
        assert_eq!(Platform::from_name("Linux x86_64"), Platform::Other);
    }

    #[test]
    fn test_save_round_trip() {
        let editor = Arc::new(BufferEditor::new(EditorModel::with_text("<Foo/>")));
        let formatter = Arc::new(Recording::default());
        let shortcut = SaveShortcut::new(editor.clone(), formatter.clone(), Platform::Other);

        assert_eq!(shortcut.handle(&save(Platform::Other)), KeyOutcome::Handled);

        let calls = formatter.calls.lock().clone();
        assert_eq!(calls, vec![("<Foo/>".to_string(), Position::new(1, 1))]);
        assert_eq!(editor.get_value(), "<Foo/>\n");
        assert_eq!(editor.get_position(), Position::new(2, 1));
    }

    #[test]
    fn test_other_keys_ignored() {
        let editor = Arc::new(BufferEditor::new(EditorModel::with_text("<Foo/>")));
        let formatter = Arc::new(Recording::default());
        let shortcut = SaveShortcut::new(editor, formatter.clone(), Platform::Apple);

        assert_eq!(shortcut.handle(&save(Platform::Other)), KeyOutcome::Ignored);
        assert!(formatter.calls.lock().is_empty());
    }

    #[test]
    fn test_failing_formatter_leaves_editor() {
        let editor = Arc::new(BufferEditor::new(EditorModel::with_text("<Foo")));
        let shortcut = SaveShortcut::new(editor.clone(), Arc::new(Failing), Platform::Other);

        assert_eq!(shortcut.handle(&save(Platform::Other)), KeyOutcome::Handled);
        assert_eq!(editor.get_value(), "<Foo");
        assert!(shortcut.format_editor().is_err());
    }

    #[test]
    fn test_guard_deregisters() {
        let registry = ShortcutRegistry::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let guard = {
            let hits = hits.clone();
            registry.register(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
                KeyOutcome::Handled
            })
        };
        assert_eq!(registry.listener_count(), 1);
        assert_eq!(registry.dispatch(&KeyEvent::new("KeyA", "a")), KeyOutcome::Handled);

        drop(guard);
        assert_eq!(registry.listener_count(), 0);
        assert_eq!(registry.dispatch(&KeyEvent::new("KeyA", "a")), KeyOutcome::Ignored);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispatch_stops_at_first_handler() {
        let registry = ShortcutRegistry::new();
        let second = Arc::new(AtomicUsize::new(0));

        let _first = registry.register(|_| KeyOutcome::Handled);
        let _second = {
            let second = second.clone();
            registry.register(move |_| {
                second.fetch_add(1, Ordering::SeqCst);
                KeyOutcome::Handled
            })
        };

        registry.dispatch(&KeyEvent::new("KeyS", "s"));
        assert_eq!(second.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_guard_outliving_registry() {
        let registry = ShortcutRegistry::new();
        let guard = registry.register(|_| KeyOutcome::Ignored);
        drop(registry);
        drop(guard);
    }

    #[test]
    fn test_installed_shortcut_formats_through_registry() {
        let registry = ShortcutRegistry::new();
        let editor = Arc::new(BufferEditor::new(EditorModel::with_text("<A/>")));
        let formatter = Arc::new(Recording::default());
        let _guard = SaveShortcut::new(editor.clone(), formatter, Platform::Apple).install(&registry);

        assert_eq!(registry.dispatch(&save(Platform::Apple)), KeyOutcome::Handled);
        assert_eq!(editor.get_value(), "<A/>\n");
    }
}
