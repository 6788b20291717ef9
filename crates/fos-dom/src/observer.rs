//! Mutation observers
//!
//! Child-list records are queued per observer and delivered at the next
//! microtask checkpoint, in registration order.

use std::rc::Rc;

use crate::{Document, NodeId};

/// MutationObserver options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MutationObserverInit {
    pub child_list: bool,
    pub subtree: bool,
}

impl MutationObserverInit {
    /// `{ childList: true, subtree: true }`
    pub fn subtree_child_list() -> Self {
        Self { child_list: true, subtree: true }
    }
}

/// A single child-list change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    /// Parent whose children changed
    pub target: NodeId,
    pub added_nodes: Vec<NodeId>,
    pub removed_nodes: Vec<NodeId>,
}

impl MutationRecord {
    pub fn added(target: NodeId, node: NodeId) -> Self {
        Self { target, added_nodes: vec![node], removed_nodes: Vec::new() }
    }

    pub fn removed(target: NodeId, node: NodeId) -> Self {
        Self { target, added_nodes: Vec::new(), removed_nodes: vec![node] }
    }
}

/// Handle returned by `observe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

pub(crate) type MutationCallback = Rc<dyn Fn(&mut Document, &[MutationRecord])>;

pub(crate) struct RegisteredObserver {
    id: ObserverId,
    target: NodeId,
    init: MutationObserverInit,
    callback: MutationCallback,
    pending: Vec<MutationRecord>,
}

impl RegisteredObserver {
    fn interested_in(&self, doc: &Document, record: &MutationRecord) -> bool {
        self.init.child_list
            && (record.target == self.target
                || (self.init.subtree && doc.contains(self.target, record.target)))
    }
}

impl Document {
    /// Observe child-list changes at or below `target`
    pub fn observe<F>(&mut self, target: NodeId, init: MutationObserverInit, callback: F) -> ObserverId
    where
        F: Fn(&mut Document, &[MutationRecord]) + 'static,
    {
        let id = ObserverId(self.next_handle());
        self.observers.push(RegisteredObserver {
            id,
            target,
            init,
            callback: Rc::new(callback),
            pending: Vec::new(),
        });
        id
    }

    /// Stop observing and drop undelivered records
    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o.id != id);
        self.observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Take undelivered records for an observer
    pub fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.observers.iter_mut()
            .find(|o| o.id == id)
            .map(|o| std::mem::take(&mut o.pending))
            .unwrap_or_default()
    }

    pub(crate) fn queue_mutation_record(&mut self, record: MutationRecord) {
        let interested: Vec<usize> = self.observers.iter()
            .enumerate()
            .filter(|(_, o)| o.interested_in(self, &record))
            .map(|(i, _)| i)
            .collect();
        for i in interested {
            self.observers[i].pending.push(record.clone());
        }
    }

    /// Deliver queued mutation records
    pub fn perform_microtask_checkpoint(&mut self) {
        loop {
            let batches: Vec<(ObserverId, MutationCallback, Vec<MutationRecord>)> = self.observers.iter_mut()
                .filter(|o| !o.pending.is_empty())
                .map(|o| (o.id, Rc::clone(&o.callback), std::mem::take(&mut o.pending)))
                .collect();
            if batches.is_empty() {
                break;
            }
            for (id, callback, records) in batches {
                if self.observers.iter().any(|o| o.id == id) {
                    callback(self, &records);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_subtree_records_are_batched() {
        let mut doc = Document::default();
        let body = doc.body();
        let container = doc.append_element(body, "div").unwrap();
        let list = doc.append_element(container, "ul").unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        doc.observe(container, MutationObserverInit::subtree_child_list(), move |_, records| {
            sink.borrow_mut().extend_from_slice(records);
        });

        let item = doc.append_element(list, "li").unwrap();
        doc.remove(item);
        assert!(seen.borrow().is_empty());

        doc.perform_microtask_checkpoint();
        assert_eq!(*seen.borrow(), vec![
            MutationRecord::added(list, item),
            MutationRecord::removed(list, item),
        ]);
    }

    #[test]
    fn test_non_subtree_observer_ignores_descendants() {
        let mut doc = Document::default();
        let body = doc.body();
        let container = doc.append_element(body, "div").unwrap();
        let inner = doc.append_element(container, "div").unwrap();

        let id = doc.observe(container, MutationObserverInit { child_list: true, subtree: false }, |_, _| {});
        doc.append_element(inner, "span").unwrap();
        assert!(doc.take_records(id).is_empty());

        doc.append_element(container, "span").unwrap();
        assert_eq!(doc.take_records(id).len(), 1);
    }

    #[test]
    fn test_disconnect_drops_pending() {
        let mut doc = Document::default();
        let body = doc.body();
        let calls = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&calls);
        let id = doc.observe(body, MutationObserverInit::subtree_child_list(), move |_, _| {
            *counter.borrow_mut() += 1;
        });

        doc.append_element(body, "p").unwrap();
        assert!(doc.disconnect(id));
        doc.perform_microtask_checkpoint();
        assert_eq!(*calls.borrow(), 0);
    }
}
