//! Focus trap
//!
//! Confines keyboard focus to a container while active: Tab wraps (or stops)
//! at the edges, focus that escapes by other means is pulled back, and
//! removing the focused node hands focus to the container. Deactivation
//! returns focus to where it was, on the next task so closing transitions
//! can finish first.
//!
//! Traps built from the same [`FocusContext`] nest through its stack. Only
//! the most recently activated one reacts to events; the rest stay paused
//! until the traps above them are gone.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::rc::{Rc, Weak};

use fos_dom::{Document, DomEvent, EventType, ListenerId, MutationObserverInit, MutationRecord, NodeId, ObserverId};
use smol::future::{BoxedLocal, FutureExt};

use crate::apply::{focus, focus_first};
use crate::candidates::{get_tabbable_candidates, get_tabbable_edges};
use crate::context::FocusContext;
use crate::stack::FocusTrapHandle;
use crate::tabbable::is_tabbable;
use crate::visibility::is_element_in_dom;
use crate::{ensure_browsing_context, FocusError};

/// Set on the container while its trap is on the stack
pub const FOCUS_TRAP_ATTRIBUTE: &str = "data-fos-focus-trap";

type ResolveResult = anyhow::Result<Option<NodeId>>;
type Callback = Box<dyn Fn(&mut Document)>;

/// Where to move focus when a trap activates or deactivates
pub enum FocusTarget {
    /// A known element
    Static(NodeId),
    /// Looked up when needed
    Resolver(Box<dyn Fn(&Document) -> ResolveResult>),
    /// Looked up asynchronously; focus waits for it to settle
    AsyncResolver(Box<dyn Fn() -> BoxedLocal<ResolveResult>>),
}

impl FocusTarget {
    pub fn element(element: NodeId) -> Self {
        Self::Static(element)
    }

    pub fn resolver<F>(resolve: F) -> Self
    where
        F: Fn(&Document) -> ResolveResult + 'static,
    {
        Self::Resolver(Box::new(resolve))
    }

    pub fn async_resolver<F, Fut>(resolve: F) -> Self
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = ResolveResult> + 'static,
    {
        Self::AsyncResolver(Box::new(move || resolve().boxed_local()))
    }

    fn resolve(&self, doc: &Document, purpose: &'static str) -> Resolution {
        match self {
            Self::Static(element) => Resolution::Ready(Some(*element)),
            Self::Resolver(resolve) => Resolution::Ready(settle(resolve(doc), purpose)),
            Self::AsyncResolver(resolve) => Resolution::Pending(resolve()),
        }
    }
}

impl fmt::Debug for FocusTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(element) => f.debug_tuple("Static").field(element).finish(),
            Self::Resolver(_) => f.write_str("Resolver(..)"),
            Self::AsyncResolver(_) => f.write_str("AsyncResolver(..)"),
        }
    }
}

enum Resolution {
    Ready(Option<NodeId>),
    Pending(BoxedLocal<ResolveResult>),
}

/// A failed resolver counts as "no target"
fn settle(result: ResolveResult, purpose: &'static str) -> Option<NodeId> {
    result.unwrap_or_else(|err| {
        tracing::warn!(purpose, "focus resolver failed: {err:#}");
        None
    })
}

/// Focus trap configuration
pub struct FocusTrapOptions {
    /// Wrap Tab at the edges; otherwise focus stops there
    pub loop_focus: bool,
    /// Hold the body scroll lock while active
    pub lock_scroll: bool,
    initial_focus: Option<FocusTarget>,
    final_focus: Option<FocusTarget>,
    on_initial_focus: Option<Callback>,
    on_final_focus: Option<Callback>,
}

impl Default for FocusTrapOptions {
    fn default() -> Self {
        Self {
            loop_focus: true,
            lock_scroll: false,
            initial_focus: None,
            final_focus: None,
            on_initial_focus: None,
            on_final_focus: None,
        }
    }
}

impl FocusTrapOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn loop_focus(mut self, loop_focus: bool) -> Self {
        self.loop_focus = loop_focus;
        self
    }

    pub fn lock_scroll(mut self, lock_scroll: bool) -> Self {
        self.lock_scroll = lock_scroll;
        self
    }

    /// Element to focus on activation, instead of the first tabbable one
    pub fn initial_focus(mut self, target: FocusTarget) -> Self {
        self.initial_focus = Some(target);
        self
    }

    /// Element to focus after deactivation, instead of the previous one
    pub fn final_focus(mut self, target: FocusTarget) -> Self {
        self.final_focus = Some(target);
        self
    }

    pub fn on_initial_focus<F: Fn(&mut Document) + 'static>(mut self, callback: F) -> Self {
        self.on_initial_focus = Some(Box::new(callback));
        self
    }

    pub fn on_final_focus<F: Fn(&mut Document) + 'static>(mut self, callback: F) -> Self {
        self.on_final_focus = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for FocusTrapOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusTrapOptions")
            .field("loop_focus", &self.loop_focus)
            .field("lock_scroll", &self.lock_scroll)
            .field("initial_focus", &self.initial_focus)
            .field("final_focus", &self.final_focus)
            .finish_non_exhaustive()
    }
}

/// Shared between the trap, its listeners and pending tasks
struct TrapState {
    context: FocusContext,
    options: FocusTrapOptions,
    container: Cell<Option<NodeId>>,
    active: Cell<bool>,
    paused: Cell<bool>,
    /// Bumped on every activate/deactivate; stale deferred work compares it
    epoch: Cell<u64>,
    last_focused: Cell<Option<NodeId>>,
    previously_focused: Cell<Option<NodeId>>,
    original_tab_index: RefCell<Option<String>>,
    applied_inert: Cell<bool>,
    registrations: Rc<Registrations>,
}

/// Listener and observer ids installed for one activation
///
/// Held apart from [`TrapState`] so handlers that outlive a dropped trap
/// can still unregister themselves.
#[derive(Default)]
struct Registrations {
    listeners: RefCell<Vec<ListenerId>>,
    observer: Cell<Option<ObserverId>>,
}

impl Registrations {
    fn uninstall(&self, doc: &mut Document) {
        self.registrations.uninstall(doc);
    }
}

impl TrapState {
    fn is_live(&self) -> bool {
        self.active.get() && !self.paused.get()
    }

    fn bump_epoch(&self) -> u64 {
        let epoch = self.epoch.get() + 1;
        self.epoch.set(epoch);
        epoch
    }

    /// Last focused element inside the container, else the container
    fn recovery_target(&self, doc: &Document, container: NodeId) -> NodeId {
        self.last_focused.get()
            .filter(|&el| doc.contains(container, el) && is_element_in_dom(doc, Some(el)))
            .unwrap_or(container)
    }

    fn uninstall(&self, doc: &mut Document) {
        self.registrations.uninstall(doc);
    }
}

impl FocusTrapHandle for TrapState {
    fn pause(&self) {
        self.paused.set(true);
        tracing::trace!(container = ?self.container.get(), "focus trap paused");
    }

    fn resume(&self) {
        self.paused.set(false);
        tracing::trace!(container = ?self.container.get(), "focus trap resumed");
    }

    fn is_paused(&self) -> bool {
        self.paused.get()
    }
}

/// Focus trap controller
pub struct FocusTrap {
    state: Rc<TrapState>,
}

impl FocusTrap {
    /// Create a trap with no container yet
    pub fn new(context: FocusContext, options: FocusTrapOptions) -> Self {
        Self {
            state: Rc::new(TrapState {
                context,
                options,
                container: Cell::new(None),
                active: Cell::new(false),
                paused: Cell::new(false),
                epoch: Cell::new(0),
                last_focused: Cell::new(None),
                previously_focused: Cell::new(None),
                original_tab_index: RefCell::new(None),
                applied_inert: Cell::new(false),
                registrations: Rc::default(),
            }),
        }
    }

    pub fn with_container(context: FocusContext, container: NodeId, options: FocusTrapOptions) -> Self {
        let trap = Self::new(context, options);
        trap.state.container.set(Some(container));
        trap
    }

    pub fn container(&self) -> Option<NodeId> {
        self.state.container.get()
    }

    /// Change the container. Refused while active.
    pub fn set_container(&self, container: Option<NodeId>) -> bool {
        if self.state.active.get() {
            tracing::warn!("focus trap container cannot change while active");
            return false;
        }
        self.state.container.set(container);
        true
    }

    pub fn is_active(&self) -> bool {
        self.state.active.get()
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused.get()
    }

    /// This trap's entry in the stack
    pub fn handle(&self) -> Rc<dyn FocusTrapHandle> {
        self.state.clone()
    }

    /// Start trapping focus
    ///
    /// A missing or detached container leaves the trap inactive.
    pub fn activate(&self, doc: &mut Document) -> Result<(), FocusError> {
        if !ensure_browsing_context(doc, "FocusTrap::activate")? {
            return Ok(());
        }
        let state = &self.state;
        if state.active.get() {
            return Ok(());
        }
        let Some(container) = state.container.get().filter(|&c| doc.is_element(c) && doc.is_connected(c)) else {
            tracing::debug!("focus trap has no attached container, not activating");
            return Ok(());
        };

        *state.original_tab_index.borrow_mut() = doc.get_attribute(container, "tabindex").map(str::to_string);
        doc.set_attribute(container, "tabindex", "-1");

        // Dialogs stay inert until the trap has picked a focus target
        let is_dialog = doc.tag_name(container) == Some("dialog");
        if is_dialog && !doc.has_attribute(container, "inert") {
            doc.set_attribute(container, "inert", "");
            state.applied_inert.set(true);
        }

        state.active.set(true);
        state.paused.set(false);
        let epoch = state.bump_epoch();
        state.previously_focused.set(doc.focused_element());
        state.last_focused.set(None);

        state.context.stack().add(self.handle());
        doc.set_attribute(container, FOCUS_TRAP_ATTRIBUTE, "");
        if state.options.lock_scroll {
            state.context.scroll_lock().disable(doc);
        }
        install_listeners(state, doc, container);
        tracing::debug!(?container, depth = state.context.stack().len(), "focus trap activated");

        let active = doc.active_element();
        if !is_dialog && doc.contains(container, active) {
            state.last_focused.set(Some(active));
            return Ok(());
        }

        if state.applied_inert.replace(false) {
            doc.remove_attribute(container, "inert");
        }

        match state.options.initial_focus.as_ref().map(|t| t.resolve(doc, "initial")) {
            None => apply_initial_focus(state, doc, container, None),
            Some(Resolution::Ready(target)) => apply_initial_focus(state, doc, container, target),
            Some(Resolution::Pending(future)) => {
                let weak = Rc::downgrade(state);
                doc.spawn_local(future, move |doc, result| {
                    let Some(state) = weak.upgrade() else {
                        return;
                    };
                    if !state.active.get() || state.epoch.get() != epoch {
                        tracing::debug!(?container, "stale initial focus resolution ignored");
                        return;
                    }
                    apply_initial_focus(&state, doc, container, settle(result, "initial"));
                });
            }
        }
        Ok(())
    }

    /// Stop trapping focus
    ///
    /// Container attributes are restored now; focus moves back on the next task.
    pub fn deactivate(&self, doc: &mut Document) -> Result<(), FocusError> {
        if !ensure_browsing_context(doc, "FocusTrap::deactivate")? {
            return Ok(());
        }
        let state = &self.state;
        if !state.active.get() {
            return Ok(());
        }

        let container = state.container.get();
        if let Some(container) = container {
            match state.original_tab_index.borrow_mut().take() {
                Some(value) => {
                    doc.set_attribute(container, "tabindex", &value);
                }
                None => {
                    doc.remove_attribute(container, "tabindex");
                }
            }
            if state.applied_inert.replace(false) {
                doc.remove_attribute(container, "inert");
            }
        }

        state.active.set(false);
        let epoch = state.bump_epoch();
        state.uninstall(doc);
        if state.options.lock_scroll {
            state.context.scroll_lock().enable(doc);
        }
        tracing::debug!(?container, "focus trap deactivated");

        let state = Rc::clone(state);
        doc.queue_task(move |doc| {
            if state.epoch.get() != epoch {
                tracing::debug!(?container, "focus trap reactivated, final focus skipped");
                return;
            }
            restore_focus(&state, doc, container, epoch);
        });
        Ok(())
    }
}

impl Drop for FocusTrap {
    fn drop(&mut self) {
        if self.state.active.replace(false) {
            tracing::warn!(
                container = ?self.state.container.get(),
                "focus trap dropped while active; its listeners unregister on the next event"
            );
            self.state.context.stack().remove(&self.handle());
        }
    }
}

impl fmt::Debug for FocusTrap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FocusTrap")
            .field("container", &self.state.container.get())
            .field("active", &self.state.active.get())
            .field("paused", &self.state.paused.get())
            .field("options", &self.state.options)
            .finish()
    }
}

type EventHandler = fn(&Rc<TrapState>, &mut Document, &mut DomEvent, NodeId);

fn install_listeners(state: &Rc<TrapState>, doc: &mut Document, container: NodeId) {
    let weak = Rc::downgrade(state);
    let registrations = &state.registrations;

    let focus_in = listen(doc, &weak, registrations, NodeId::ROOT, EventType::FocusIn, container, |state, doc, event, container| {
        on_focus_in(state, doc, event, container)
    });
    let focus_out = listen(doc, &weak, registrations, NodeId::ROOT, EventType::FocusOut, container, |state, doc, event, container| {
        on_focus_out(state, doc, event, container)
    });
    let key_down = listen(doc, &weak, registrations, container, EventType::KeyDown, container, |state, doc, event, container| {
        on_key_down(state, doc, event, container)
    });
    registrations.listeners.borrow_mut().extend([focus_in, focus_out, key_down]);

    let observer = doc.observe(container, MutationObserverInit::subtree_child_list(), {
        let registrations = Rc::clone(registrations);
        move |doc, records| match weak.upgrade() {
            Some(state) => on_mutation(&state, doc, records, container),
            None => registrations.uninstall(doc),
        }
    });
    registrations.observer.set(Some(observer));
}

/// Register `handler` for as long as the trap exists. Once the trap is
/// dropped the next event removes every registration it left behind.
fn listen(
    doc: &mut Document,
    weak: &Weak<TrapState>,
    registrations: &Rc<Registrations>,
    target: NodeId,
    event_type: EventType,
    container: NodeId,
    handler: EventHandler,
) -> ListenerId {
    let weak = weak.clone();
    let registrations = Rc::clone(registrations);
    doc.add_event_listener(target, event_type, move |doc, event| match weak.upgrade() {
        Some(state) => handler(&state, doc, event, container),
        None => registrations.uninstall(doc),
    })
}

/// A valid initial target lives inside the container and is tabbable
fn apply_initial_focus(state: &TrapState, doc: &mut Document, container: NodeId, target: Option<NodeId>) {
    let start = doc.active_element();
    let valid = target.filter(|&el| {
        is_element_in_dom(doc, Some(el)) && doc.contains(container, el) && is_tabbable(doc, Some(el))
    });

    match valid {
        Some(el) => focus(doc, Some(el), true),
        None => {
            if let Some(el) = target {
                tracing::debug!(?el, "initial focus target rejected");
            }
            let candidates = get_tabbable_candidates(doc, container);
            focus_first(doc, &candidates, false);
        }
    }

    let active = doc.active_element();
    if active == start && !doc.contains(container, active) {
        focus(doc, Some(container), false);
    }
    if let Some(callback) = &state.options.on_initial_focus {
        callback(doc);
    }
}

/// Final focus, then leave the stack
fn restore_focus(state: &Rc<TrapState>, doc: &mut Document, container: Option<NodeId>, epoch: u64) {
    match state.options.final_focus.as_ref().map(|t| t.resolve(doc, "final")) {
        None => apply_final_focus(state, doc, container, None),
        Some(Resolution::Ready(target)) => apply_final_focus(state, doc, container, target),
        Some(Resolution::Pending(future)) => {
            let state = Rc::clone(state);
            doc.spawn_local(future, move |doc, result| {
                if state.epoch.get() != epoch {
                    tracing::debug!(?container, "stale final focus resolution ignored");
                    return;
                }
                apply_final_focus(&state, doc, container, settle(result, "final"));
            });
        }
    }
}

/// A valid final target is attached and tabbable; the container may be gone
fn apply_final_focus(state: &Rc<TrapState>, doc: &mut Document, container: Option<NodeId>, target: Option<NodeId>) {
    let valid = target.filter(|&el| is_element_in_dom(doc, Some(el)) && is_tabbable(doc, Some(el)));
    let fallback = state.previously_focused.get()
        .filter(|&el| is_element_in_dom(doc, Some(el)))
        .unwrap_or(doc.body());
    focus(doc, Some(valid.unwrap_or(fallback)), false);

    if let Some(callback) = &state.options.on_final_focus {
        callback(doc);
    }

    let handle: Rc<dyn FocusTrapHandle> = state.clone();
    state.context.stack().remove(&handle);
    if let Some(container) = container {
        doc.remove_attribute(container, FOCUS_TRAP_ATTRIBUTE);
    }
}

fn on_focus_in(state: &Rc<TrapState>, doc: &mut Document, event: &DomEvent, container: NodeId) {
    if !state.is_live() {
        return;
    }
    if doc.contains(container, event.target) {
        state.last_focused.set(Some(event.target));
        return;
    }

    // Escaped by some other means than Tab; pull it back next task
    let state = Rc::clone(state);
    doc.queue_task(move |doc| {
        if !state.is_live() {
            return;
        }
        let target = state.recovery_target(doc, container);
        focus(doc, Some(target), false);
    });
}

fn on_focus_out(state: &TrapState, doc: &mut Document, event: &DomEvent, container: NodeId) {
    if !state.is_live() {
        return;
    }
    // No related target: the window lost focus or the node was removed
    let Some(related) = event.related_target else {
        return;
    };
    if !doc.contains(container, related) {
        let target = state.recovery_target(doc, container);
        focus(doc, Some(target), false);
    }
}

fn on_mutation(state: &TrapState, doc: &mut Document, records: &[MutationRecord], container: NodeId) {
    if !state.is_live() {
        return;
    }
    let removed = records.iter().any(|r| !r.removed_nodes.is_empty());
    if removed && doc.active_element() == doc.body() {
        focus(doc, Some(container), false);
    }
}

fn on_key_down(state: &TrapState, doc: &mut Document, event: &mut DomEvent, container: NodeId) {
    if !state.is_live() {
        return;
    }
    let Some(init) = event.keyboard.as_ref() else {
        return;
    };
    if init.key != "Tab" || init.has_command_modifier() {
        return;
    }
    let backwards = init.shift;

    let active = doc.active_element();
    match get_tabbable_edges(doc, container) {
        (Some(first), Some(last)) => {
            if !backwards && active == last {
                event.prevent_default();
                if state.options.loop_focus {
                    focus(doc, Some(first), true);
                }
            } else if backwards && (active == first || active == container) {
                event.prevent_default();
                if state.options.loop_focus || active == container {
                    focus(doc, Some(last), true);
                }
            }
        }
        _ => {
            if active == container {
                event.prevent_default();
            }
        }
    }
}
