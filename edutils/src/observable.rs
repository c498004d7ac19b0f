use tokio::sync::watch;

/// Observable value slot.
///
/// The owner keeps the `Observable` and is the only writer; observers hold
/// `watch::Receiver`s obtained from [`Observable::subscribe`] and see the
/// latest value plus a change flag. Writes never block and never fail, even
/// when nobody is subscribed.
#[derive(Debug)]
pub struct Observable<T> {
    tx: watch::Sender<T>,
}

impl<T> Observable<T> {
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Replaces the value and notifies observers unconditionally.
    pub fn replace(&self, value: T) -> T {
        self.tx.send_replace(value)
    }

    /// Subscribes to changes. The returned receiver starts with the current
    /// value marked as seen.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.tx.subscribe()
    }

    /// Runs `f` against the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.tx.borrow())
    }

    /// Number of live receivers.
    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl<T: Clone> Observable<T> {
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }
}

impl<T: PartialEq> Observable<T> {
    /// Stores `value` if it differs from the current one.
    ///
    /// Returns `true` when the slot changed and observers were notified.
    pub fn set(&self, value: T) -> bool {
        self.tx.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        })
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
