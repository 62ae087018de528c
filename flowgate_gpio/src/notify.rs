//! Change notification hook.
//!
//! Minimal observer list: listeners run synchronously, in registration order,
//! on the thread that owns the peripheral.

/// Handle returned by [`ChangeNotifier::add`], used to remove a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Ordered list of change listeners.
pub struct ChangeNotifier<T> {
    next_id: u64,
    listeners: Vec<(ListenerId, Box<dyn FnMut(T)>)>,
}

impl<T: Copy> ChangeNotifier<T> {
    /// Empty notifier.
    pub fn new() -> Self {
        Self {
            next_id: 0,
            listeners: Vec::new(),
        }
    }

    /// Register a listener at the end of the list.
    pub fn add(&mut self, listener: impl FnMut(T) + 'static) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener; returns `false` if it was not registered.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Invoke every listener with `value`.
    pub fn emit(&mut self, value: T) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(value);
        }
    }

    /// Number of registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl<T: Copy> Default for ChangeNotifier<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for ChangeNotifier<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn listeners_run_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut notifier = ChangeNotifier::new();
        for tag in ["a", "b", "c"] {
            let log = Rc::clone(&log);
            notifier.add(move |v: u8| log.borrow_mut().push(format!("{tag}{v}")));
        }
        notifier.emit(1);
        assert_eq!(*log.borrow(), vec!["a1", "b1", "c1"]);
    }

    #[test]
    fn removal_applies_before_next_emission() {
        let hits = Rc::new(RefCell::new(0));
        let mut notifier = ChangeNotifier::new();
        let h = Rc::clone(&hits);
        let id = notifier.add(move |_: u8| *h.borrow_mut() += 1);
        notifier.emit(0);
        assert!(notifier.remove(id));
        assert!(!notifier.remove(id));
        notifier.emit(0);
        assert_eq!(*hits.borrow(), 1);
        assert!(notifier.is_empty());
    }
}
