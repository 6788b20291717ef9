//! Focus trap stack
//!
//! Nested traps share one stack. The front handle is live; every other
//! handle was paused when something was added on top of it, and the new
//! front is resumed when the handle above it is removed.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Something the stack can suspend and reinstate
pub trait FocusTrapHandle {
    fn pause(&self);
    fn resume(&self);
    fn is_paused(&self) -> bool;
}

/// LIFO order of focus traps, front is live
#[derive(Default)]
pub struct FocusTrapStack {
    traps: RefCell<Vec<Rc<dyn FocusTrapHandle>>>,
}

impl FocusTrapStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move `handle` to the front, pausing the previous front
    ///
    /// Re-adding the current front does nothing. The added handle is not
    /// resumed; its owner manages its own paused flag.
    pub fn add(&self, handle: Rc<dyn FocusTrapHandle>) {
        let previous = self.front();
        if let Some(previous) = previous.filter(|p| !Rc::ptr_eq(p, &handle)) {
            // Borrow released: pause() may re-enter the stack
            previous.pause();
        }

        let mut traps = self.traps.borrow_mut();
        traps.retain(|t| !Rc::ptr_eq(t, &handle));
        traps.insert(0, handle);
        tracing::debug!(depth = traps.len(), "focus trap added");
    }

    /// Drop `handle` and resume whichever handle is now at the front
    pub fn remove(&self, handle: &Rc<dyn FocusTrapHandle>) {
        {
            let mut traps = self.traps.borrow_mut();
            traps.retain(|t| !Rc::ptr_eq(t, handle));
            tracing::debug!(depth = traps.len(), "focus trap removed");
        }
        if let Some(front) = self.front() {
            front.resume();
        }
    }

    /// The live handle
    pub fn front(&self) -> Option<Rc<dyn FocusTrapHandle>> {
        self.traps.borrow().first().cloned()
    }

    pub fn contains(&self, handle: &Rc<dyn FocusTrapHandle>) -> bool {
        self.traps.borrow().iter().any(|t| Rc::ptr_eq(t, handle))
    }

    pub fn len(&self) -> usize {
        self.traps.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.traps.borrow().is_empty()
    }
}

impl fmt::Debug for FocusTrapStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let paused: Vec<bool> = self.traps.borrow().iter().map(|t| t.is_paused()).collect();
        f.debug_struct("FocusTrapStack").field("paused", &paused).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Records pause/resume calls
    #[derive(Default)]
    struct Recorder {
        paused: Cell<bool>,
        pauses: Cell<u32>,
        resumes: Cell<u32>,
    }

    impl FocusTrapHandle for Recorder {
        fn pause(&self) {
            self.paused.set(true);
            self.pauses.set(self.pauses.get() + 1);
        }
        fn resume(&self) {
            self.paused.set(false);
            self.resumes.set(self.resumes.get() + 1);
        }
        fn is_paused(&self) -> bool {
            self.paused.get()
        }
    }

    fn handle() -> (Rc<Recorder>, Rc<dyn FocusTrapHandle>) {
        let recorder = Rc::new(Recorder::default());
        let dyn_handle: Rc<dyn FocusTrapHandle> = recorder.clone();
        (recorder, dyn_handle)
    }

    fn live_count(handles: &[&Rc<Recorder>]) -> usize {
        handles.iter().filter(|h| !h.is_paused()).count()
    }

    #[test]
    fn test_nesting_sequence() {
        let stack = FocusTrapStack::new();
        let (a, ha) = handle();
        let (b, hb) = handle();
        let (c, hc) = handle();

        stack.add(ha.clone());
        assert!(!a.is_paused());

        stack.add(hb.clone());
        assert!(a.is_paused() && !b.is_paused());

        stack.add(hc.clone());
        assert!(b.is_paused() && !c.is_paused());
        assert_eq!(live_count(&[&a, &b, &c]), 1);

        stack.remove(&hc);
        assert!(!b.is_paused() && a.is_paused());

        stack.remove(&hb);
        assert!(!a.is_paused());
        assert_eq!(stack.len(), 1);

        stack.remove(&ha);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_readd_front_is_idempotent() {
        let stack = FocusTrapStack::new();
        let (a, ha) = handle();

        stack.add(ha.clone());
        stack.add(ha.clone());
        assert_eq!(a.pauses.get(), 0);
        assert_eq!(a.resumes.get(), 0);
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_readd_buried_moves_to_front() {
        let stack = FocusTrapStack::new();
        let (a, ha) = handle();
        let (b, hb) = handle();

        stack.add(ha.clone());
        stack.add(hb.clone());
        stack.add(ha.clone());

        assert!(b.is_paused());
        assert_eq!(stack.len(), 2);
        assert!(Rc::ptr_eq(&stack.front().unwrap(), &ha));
        // Paused once by b; the stack never resumes on add
        assert_eq!(a.resumes.get(), 0);
    }

    #[test]
    fn test_remove_unknown_resumes_front() {
        let stack = FocusTrapStack::new();
        let (a, ha) = handle();
        let (_, stranger) = handle();

        stack.add(ha.clone());
        stack.remove(&stranger);
        assert_eq!(a.resumes.get(), 1);
        assert!(stack.contains(&ha));
        assert!(!stack.contains(&stranger));
    }
}
