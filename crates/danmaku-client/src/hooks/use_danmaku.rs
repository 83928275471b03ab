//! Hook hosting the danmaku scheduler in the browser.
//!
//! The scheduler lives in a `RefCell` shared with the timer callbacks. Every
//! [`Effect`] it returns is mapped onto a `gloo` [`Timeout`]; dropping the
//! timeout cancels it, so unmount only needs to clear the map.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use danmaku_core::{
    Comment, CommentId, DanmakuConfig, DisplayId, Effect, FloatingUnit, LikeLedger, Scheduler,
    TimerId,
};
use gloo::timers::callback::Timeout;
use rand::Rng;
use yew::prelude::*;

use crate::storage::{load_like_ledger, save_like_ledger};

/// Fallback width when the window cannot be measured.
const DEFAULT_VIEWPORT_WIDTH: f64 = 1024.0;

struct DriverState {
    scheduler: Scheduler,
    timers: HashMap<TimerId, Timeout>,
    /// Timeout whose callback is currently running. Dropping it there would
    /// free the closure mid-call, so it is parked until the next one fires.
    spent: Option<Timeout>,
    ledger: LikeLedger,
    generation: u32,
}

/// Handle to the page's danmaku scheduler.
///
/// Reads go through the version counter so that components re-render when
/// the active pool changes.
#[derive(Clone)]
pub struct DanmakuHandle {
    inner: Rc<RefCell<DriverState>>,
    version: UseStateHandle<u32>,
}

impl PartialEq for DanmakuHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner) && *self.version == *other.version
    }
}

fn viewport_width() -> f64 {
    web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|v| v.as_f64())
        .unwrap_or(DEFAULT_VIEWPORT_WIDTH)
}

impl DanmakuHandle {
    // === State Queries (Reactive - auto re-render on change) ===

    /// Units currently on screen.
    pub fn active(&self) -> Vec<FloatingUnit> {
        let _ = *self.version; // Create dependency for re-render
        self.inner.borrow().scheduler.active().to_vec()
    }

    pub fn config(&self) -> DanmakuConfig {
        self.inner.borrow().scheduler.config().clone()
    }

    /// Whether this browser may still like `unit`.
    pub fn can_like(&self, unit: &FloatingUnit) -> bool {
        unit.can_like(&self.inner.borrow().ledger)
    }

    // === Scheduler inputs ===

    /// Replaces the known comment set.
    pub fn set_comments(&self, comments: Vec<Comment>) {
        self.run(|scheduler| scheduler.set_comments(comments));
    }

    /// Shows the visitor's own text immediately.
    pub fn inject_manual(&self, text: &str) {
        self.run(|scheduler| {
            scheduler.inject_manual(text);
            Vec::new()
        });
    }

    /// Reports a finished traversal.
    pub fn unit_completed(&self, display_id: DisplayId) {
        self.run(|scheduler| scheduler.unit_completed(display_id));
    }

    /// Applies a like click and persists the ledger.
    ///
    /// Returns the comment id to forward to the store when the like counts.
    pub fn like(&self, display_id: DisplayId) -> Option<CommentId> {
        let liked = {
            let mut state = self.inner.borrow_mut();
            let DriverState {
                scheduler, ledger, ..
            } = &mut *state;
            let liked = scheduler.like(display_id, ledger);
            if liked.is_some() && !save_like_ledger(ledger) {
                tracing::warn!("Failed to persist like ledger");
            }
            liked
        };
        bump(&self.inner, &self.version);
        liked
    }

    fn run(&self, op: impl FnOnce(&mut Scheduler) -> Vec<Effect>) {
        let effects = {
            let mut state = self.inner.borrow_mut();
            state.scheduler.set_viewport(viewport_width());
            op(&mut state.scheduler)
        };
        apply_effects(&self.inner, &self.version, effects);
        bump(&self.inner, &self.version);
    }
}

fn apply_effects(inner: &Rc<RefCell<DriverState>>, version: &UseStateHandle<u32>, effects: Vec<Effect>) {
    for effect in effects {
        match effect {
            Effect::Schedule { timer, delay_ms } => {
                let weak = Rc::downgrade(inner);
                let version = version.clone();
                let timeout = Timeout::new(delay_ms, move || {
                    let Some(inner) = weak.upgrade() else {
                        return;
                    };
                    let effects = {
                        let mut state = inner.borrow_mut();
                        state.spent = state.timers.remove(&timer);
                        state.scheduler.set_viewport(viewport_width());
                        state.scheduler.fire(timer)
                    };
                    apply_effects(&inner, &version, effects);
                    bump(&inner, &version);
                });
                inner.borrow_mut().timers.insert(timer, timeout);
            }
            Effect::Cancel(timer) => {
                inner.borrow_mut().timers.remove(&timer);
            }
        }
    }
}

/// Triggers a re-render of everything reading through the handle.
fn bump(inner: &Rc<RefCell<DriverState>>, version: &UseStateHandle<u32>) {
    let generation = {
        let mut state = inner.borrow_mut();
        state.generation = state.generation.wrapping_add(1);
        state.generation
    };
    version.set(generation);
}

/// Creates the page's scheduler and tears it down on unmount.
#[hook]
pub fn use_danmaku(config: DanmakuConfig) -> DanmakuHandle {
    let inner = use_mut_ref(move || DriverState {
        scheduler: Scheduler::new(config, rand::rng().random()),
        timers: HashMap::new(),
        spent: None,
        ledger: load_like_ledger(),
        generation: 0,
    });
    let version = use_state(|| 0u32);

    {
        let inner = inner.clone();
        use_effect_with((), move |_| {
            move || {
                let mut state = inner.borrow_mut();
                let cancelled = state.scheduler.shutdown().len();
                let pending = state.timers.len();
                state.timers.clear();
                state.spent = None;
                tracing::debug!(cancelled, pending, "Danmaku scheduler shut down");
            }
        });
    }

    DanmakuHandle { inner, version }
}
