//! Selection identity and its observer list.

/// Stable identity for the active GeoJSON choice.
///
/// The not-yet-submitted upload gets its own sentinel instead of being
/// compared by reference, so "which entry is checked" survives a list
/// refresh that rebuilds every stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionId {
    PendingUpload,
    Stored(String),
}

/// Handle returned by [`SelectionWatchers::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatcherId(u64);

/// Explicit observer list for committed selection changes.
///
/// The driver notifies once per committed change; watchers run in
/// subscription order.
#[derive(Default)]
pub struct SelectionWatchers {
    watchers: Vec<(WatcherId, Box<dyn FnMut(Option<&SelectionId>)>)>,
    next_id: u64,
}

impl SelectionWatchers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, watcher: impl FnMut(Option<&SelectionId>) + 'static) -> WatcherId {
        self.next_id += 1;
        let id = WatcherId(self.next_id);
        self.watchers.push((id, Box::new(watcher)));
        id
    }

    /// Removes one subscription; false if the handle was already gone.
    pub fn unsubscribe(&mut self, id: WatcherId) -> bool {
        let before = self.watchers.len();
        self.watchers.retain(|(wid, _)| *wid != id);
        self.watchers.len() != before
    }

    pub fn notify(&mut self, current: Option<&SelectionId>) {
        for (_, watcher) in &mut self.watchers {
            watcher(current);
        }
    }

    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }
}

impl std::fmt::Debug for SelectionWatchers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionWatchers")
            .field("watchers", &self.watchers.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn watchers_run_in_subscription_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut watchers = SelectionWatchers::new();
        for tag in ["first", "second"] {
            let seen = Rc::clone(&seen);
            watchers.subscribe(move |_| seen.borrow_mut().push(tag));
        }

        watchers.notify(Some(&SelectionId::PendingUpload));
        assert_eq!(*seen.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn each_notify_reaches_every_watcher_once() {
        let calls = Rc::new(RefCell::new(0u32));
        let mut watchers = SelectionWatchers::new();
        let counter = Rc::clone(&calls);
        watchers.subscribe(move |_| *counter.borrow_mut() += 1);

        watchers.notify(None);
        watchers.notify(Some(&SelectionId::Stored("jatim".to_string())));
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn unsubscribed_watchers_stop_firing() {
        let calls = Rc::new(RefCell::new(0u32));
        let mut watchers = SelectionWatchers::new();
        let counter = Rc::clone(&calls);
        let id = watchers.subscribe(move |_| *counter.borrow_mut() += 1);

        watchers.notify(None);
        assert!(watchers.unsubscribe(id));
        assert!(!watchers.unsubscribe(id));
        watchers.notify(None);

        assert_eq!(*calls.borrow(), 1);
        assert!(watchers.is_empty());
    }

    #[test]
    fn watchers_see_the_committed_selection() {
        let seen: Rc<RefCell<Vec<Option<SelectionId>>>> = Rc::new(RefCell::new(Vec::new()));
        let mut watchers = SelectionWatchers::new();
        let sink = Rc::clone(&seen);
        watchers.subscribe(move |current| sink.borrow_mut().push(current.cloned()));

        watchers.notify(Some(&SelectionId::Stored("jatim".to_string())));
        watchers.notify(None);

        assert_eq!(
            *seen.borrow(),
            vec![Some(SelectionId::Stored("jatim".to_string())), None]
        );
    }
}
