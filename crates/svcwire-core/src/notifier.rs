use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Zero-argument change callback.
///
/// Identity is the allocation behind the `Arc`: the same closure registered
/// through two separate `Arc::new` calls counts as two listeners.
pub type ChangeListener = Arc<dyn Fn() + Send + Sync>;

type ListenerList = Mutex<Vec<ChangeListener>>;

/// Listener registry a service holds by composition.
///
/// Notes:
/// - listeners run in insertion order, synchronously, on the caller's thread;
/// - a run iterates a snapshot, the lock is never held while a listener runs;
/// - a panicking listener unwinds into the caller, later listeners are skipped.
#[derive(Default)]
pub struct ChangeNotifier {
    listeners: Arc<ListenerList>,
}

impl ChangeNotifier {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_change_listener(&self, listener: ChangeListener) -> Unsubscribe {
        self.listeners.lock().push(listener.clone());
        Unsubscribe {
            listeners: Arc::downgrade(&self.listeners),
            listener: Some(listener),
        }
    }

    #[inline]
    pub fn subscribe<F>(&self, f: F) -> Unsubscribe
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.add_change_listener(Arc::new(f))
    }

    pub fn run_change_listeners(&self) {
        let snapshot: Vec<ChangeListener> = self.listeners.lock().clone();
        log::trace!("notifying {} change listener(s)", snapshot.len());

        for listener in &snapshot {
            listener();
        }
    }

    #[inline]
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().len()
    }

    #[inline]
    pub fn clear(&self) {
        self.listeners.lock().clear();
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

/// Removes one listener from the notifier it was registered on.
///
/// Dropping this without calling [`Unsubscribe::unsubscribe`] leaves the
/// listener registered.
#[must_use = "dropping an Unsubscribe keeps the listener registered"]
pub struct Unsubscribe {
    listeners: Weak<ListenerList>,
    listener: Option<ChangeListener>,
}

impl Unsubscribe {
    /// Removes every registration of this listener. No-op if the notifier is gone.
    pub fn unsubscribe(mut self) {
        let Some(listener) = self.listener.take() else {
            return;
        };
        let Some(listeners) = self.listeners.upgrade() else {
            return;
        };

        listeners.lock().retain(|l| !same_listener(l, &listener));
    }
}

#[inline]
fn same_listener(a: &ChangeListener, b: &ChangeListener) -> bool {
    // Data address only; vtable pointers are not stable across codegen units.
    std::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Subscribe/notify capability for any domain object that owns a [`ChangeNotifier`].
pub trait Observable {
    fn notifier(&self) -> &ChangeNotifier;

    #[inline]
    fn add_change_listener(&self, listener: ChangeListener) -> Unsubscribe {
        self.notifier().add_change_listener(listener)
    }

    #[inline]
    fn run_change_listeners(&self) {
        self.notifier().run_change_listeners()
    }
}

impl Observable for ChangeNotifier {
    #[inline]
    fn notifier(&self) -> &ChangeNotifier {
        self
    }
}
