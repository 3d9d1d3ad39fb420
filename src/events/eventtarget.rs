//! Per-instance registry of named event handlers.
//!
//! Handlers are stored under an event name and identified by a
//! [`ListenerId`], so the same handler value can be registered twice and
//! removed one registration at a time.
//!
//! Dispatch invokes every handler registered for the name, in insertion
//! order, even when an earlier one fails. The first failure is returned once
//! all handlers ran; later failures are logged.

use log::error;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::EngineResult;

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Handle returned by [`EventTarget::add_listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        ListenerId(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

type Entries<H> = SmallVec<[(ListenerId, H); 2]>;

pub struct EventTarget<H> {
    listeners: FxHashMap<String, Entries<H>>,
}

impl<H> Default for EventTarget<H> {
    fn default() -> Self {
        Self {
            listeners: FxHashMap::default(),
        }
    }
}

impl<H> fmt::Debug for EventTarget<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, entries) in &self.listeners {
            map.entry(name, &entries.len());
        }
        map.finish()
    }
}

impl<H> EventTarget<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, name: impl Into<String>, handler: H) -> ListenerId {
        let id = ListenerId::next();
        self.listeners
            .entry(name.into())
            .or_default()
            .push((id, handler));
        id
    }

    /// Remove one registration. Returns false if `id` is unknown.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let mut emptied = None;
        let mut removed = false;
        for (name, entries) in self.listeners.iter_mut() {
            if let Some(index) = entries.iter().position(|(entry_id, _)| *entry_id == id) {
                entries.remove(index);
                removed = true;
                if entries.is_empty() {
                    emptied = Some(name.clone());
                }
                break;
            }
        }
        if let Some(name) = emptied {
            self.listeners.remove(&name);
        }
        removed
    }

    pub fn has_listeners(&self, name: &str) -> bool {
        self.listener_count(name) > 0
    }

    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.get(name).map_or(0, |entries| entries.len())
    }

    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.listeners.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }

    /// Invoke every handler registered for `name` through `invoke`.
    ///
    /// Returns the number of handlers invoked.
    pub fn dispatch<F>(&mut self, name: &str, mut invoke: F) -> EngineResult<usize>
    where
        F: FnMut(&mut H) -> EngineResult<()>,
    {
        match self.listeners.get_mut(name) {
            Some(entries) => dispatch_all(name, entries.iter_mut().map(|(_, h)| h), &mut invoke),
            None => Ok(0),
        }
    }
}

impl<H: Clone> EventTarget<H> {
    /// Copies of the handlers for `name`, in insertion order.
    ///
    /// Used when the handlers need access to the structure that owns this
    /// target while they run.
    pub fn handlers(&self, name: &str) -> SmallVec<[H; 4]> {
        self.listeners
            .get(name)
            .map(|entries| entries.iter().map(|(_, h)| h.clone()).collect())
            .unwrap_or_default()
    }
}

/// Invoke every handler, keep the first error, log the rest.
pub fn dispatch_all<H, I, F>(name: &str, handlers: I, mut invoke: F) -> EngineResult<usize>
where
    I: IntoIterator<Item = H>,
    F: FnMut(H) -> EngineResult<()>,
{
    let mut first_error = None;
    let mut invoked = 0;
    for handler in handlers {
        invoked += 1;
        if let Err(e) = invoke(handler) {
            if first_error.is_none() {
                first_error = Some(e);
            } else {
                error!("additional failure in '{}' handler: {}", name, e);
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(invoked),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    type Handler = Box<dyn FnMut(&mut Vec<&'static str>) -> EngineResult<()>>;

    #[test]
    fn dispatch_runs_in_insertion_order() {
        let mut target: EventTarget<Handler> = EventTarget::new();
        target.add_listener("tick", Box::new(|log: &mut Vec<&'static str>| {
            log.push("first");
            Ok(())
        }));
        target.add_listener("tick", Box::new(|log: &mut Vec<&'static str>| {
            log.push("second");
            Ok(())
        }));
        let mut log = Vec::new();
        let count = target.dispatch("tick", |h| h(&mut log)).unwrap();
        assert_eq!(count, 2);
        assert_eq!(log, vec!["first", "second"]);
    }

    #[test]
    fn remove_by_id_leaves_duplicates() {
        let mut target: EventTarget<u32> = EventTarget::new();
        let a = target.add_listener("x", 7);
        let b = target.add_listener("x", 7);
        assert!(target.remove_listener(a));
        assert!(!target.remove_listener(a));
        assert_eq!(target.listener_count("x"), 1);
        assert!(target.remove_listener(b));
        assert!(!target.has_listeners("x"));
        assert_eq!(target.event_names().count(), 0);
    }

    #[test]
    fn failure_does_not_stop_other_handlers() {
        let mut target: EventTarget<Handler> = EventTarget::new();
        target.add_listener("x", Box::new(|_: &mut Vec<&'static str>| Err(EngineError::hook("boom"))));
        target.add_listener("x", Box::new(|log: &mut Vec<&'static str>| {
            log.push("ran");
            Ok(())
        }));
        let mut log = Vec::new();
        let result = target.dispatch("x", |h| h(&mut log));
        assert_eq!(result, Err(EngineError::hook("boom")));
        assert_eq!(log, vec!["ran"]);
    }

    #[test]
    fn unknown_event_dispatches_nothing() {
        let mut target: EventTarget<u32> = EventTarget::new();
        assert_eq!(target.dispatch("missing", |_| Ok(())).unwrap(), 0);
        assert!(target.handlers("missing").is_empty());
    }
}
