//! Event loop
//!
//! Single-threaded task queue standing in for the window's event loop.
//! Futures handed to `spawn_local` run on a `smol::LocalExecutor`; once one
//! settles its continuation is queued as an ordinary task, so it observes the
//! document exactly like a callback scheduled with `queue_task`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::rc::Rc;

use smol::LocalExecutor;

use crate::Document;

pub(crate) type Task = Box<dyn FnOnce(&mut Document)>;

pub(crate) struct EventLoop {
    tasks: VecDeque<Task>,
    executor: LocalExecutor<'static>,
    settled: Rc<RefCell<VecDeque<Task>>>,
}

impl Default for EventLoop {
    fn default() -> Self {
        Self {
            tasks: VecDeque::new(),
            executor: LocalExecutor::new(),
            settled: Rc::new(RefCell::new(VecDeque::new())),
        }
    }
}

impl EventLoop {
    /// Poll runnable futures and move finished continuations to the queue
    fn pump(&mut self) {
        while self.executor.try_tick() {}
        let settled: Vec<Task> = self.settled.borrow_mut().drain(..).collect();
        self.tasks.extend(settled);
    }
}

impl Document {
    /// Schedule `task` to run after the current one (`setTimeout(.., 0)`)
    pub fn queue_task<F>(&mut self, task: F)
    where
        F: FnOnce(&mut Document) + 'static,
    {
        self.event_loop.tasks.push_back(Box::new(task));
    }

    /// Run `future` to completion, then `then` with its output as a task
    pub fn spawn_local<T, Fut, F>(&mut self, future: Fut, then: F)
    where
        T: 'static,
        Fut: Future<Output = T> + 'static,
        F: FnOnce(&mut Document, T) + 'static,
    {
        let settled = Rc::clone(&self.event_loop.settled);
        self.event_loop.executor
            .spawn(async move {
                let output = future.await;
                let task: Task = Box::new(move |doc: &mut Document| then(doc, output));
                settled.borrow_mut().push_back(task);
            })
            .detach();
    }

    /// Number of queued tasks (pending futures not included)
    pub fn pending_tasks(&self) -> usize {
        self.event_loop.tasks.len() + self.event_loop.settled.borrow().len()
    }

    /// Run one task, with microtask checkpoints on either side
    ///
    /// Returns false if nothing was runnable.
    pub fn run_next_task(&mut self) -> bool {
        self.perform_microtask_checkpoint();
        self.event_loop.pump();
        let Some(task) = self.event_loop.tasks.pop_front() else {
            return false;
        };
        task(self);
        self.perform_microtask_checkpoint();
        true
    }

    /// Run tasks until the queue drains. Futures that never settle stay pending.
    ///
    /// Returns the number of tasks run.
    pub fn run_until_idle(&mut self) -> usize {
        let mut ran = 0;
        while self.run_next_task() {
            ran += 1;
        }
        ran
    }
}
