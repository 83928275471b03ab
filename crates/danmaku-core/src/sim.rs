//! Virtual-time host for scheduler tests.
//!
//! Plays the role of the browser: applies [`Effect`]s to a timer queue,
//! starts a traversal for every unit that appears in the active pool, and
//! reports completions back when virtual time passes the traversal end.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{TimeZone, Utc};

use crate::comment::{Comment, CommentId};
use crate::config::DanmakuConfig;
use crate::scheduler::{Effect, Scheduler, TimerId};
use crate::unit::{DisplayId, FloatingUnit};

const EPOCH_MS: i64 = 1_700_000_000_000;

/// Builds a comment created `offset_ms` after a fixed epoch.
pub(crate) fn comment(id: &str, text: &str, offset_ms: i64) -> Comment {
    let created_at = Utc
        .timestamp_millis_opt(EPOCH_MS + offset_ms)
        .single()
        .expect("valid timestamp");
    Comment::new(id, text, created_at)
}

#[derive(Debug, Clone, Copy)]
enum SimEvent {
    Timer(TimerId),
    UnitFinished(DisplayId),
}

pub(crate) struct SimHost {
    pub scheduler: Scheduler,
    now: u64,
    seq: u64,
    queue: BTreeMap<(u64, u64), SimEvent>,
    timers: HashMap<TimerId, (u64, u64)>,
    tracked: HashSet<DisplayId>,
    released: Vec<FloatingUnit>,
    release_steps: usize,
    max_overshoot: usize,
    stopped: bool,
    after_shutdown: usize,
}

impl SimHost {
    pub fn new(config: DanmakuConfig) -> Self {
        Self {
            scheduler: Scheduler::new(config, 7),
            now: 0,
            seq: 0,
            queue: BTreeMap::new(),
            timers: HashMap::new(),
            tracked: HashSet::new(),
            released: Vec::new(),
            release_steps: 0,
            max_overshoot: 0,
            stopped: false,
            after_shutdown: 0,
        }
    }

    pub fn set_viewport(&mut self, width_px: f64) {
        self.scheduler.set_viewport(width_px);
    }

    pub fn set_comments(&mut self, comments: Vec<Comment>) -> Vec<Effect> {
        let effects = self.scheduler.set_comments(comments);
        self.apply(&effects);
        effects
    }

    pub fn inject(&mut self, text: &str) -> Option<DisplayId> {
        let id = self.scheduler.inject_manual(text);
        self.track();
        id
    }

    /// Advances virtual time, dispatching every event due up to and
    /// including the new time.
    pub fn advance_by(&mut self, ms: u64) {
        let target = self.now + ms;
        while let Some((&key, _)) = self.queue.first_key_value() {
            if key.0 > target {
                break;
            }
            self.dispatch_next();
        }
        self.now = target;
    }

    /// Dispatches events until `done` holds or `max_ms` of virtual time pass.
    pub fn run_until(&mut self, done: impl Fn(&Scheduler) -> bool, max_ms: u64) {
        let deadline = self.now + max_ms;
        while !done(&self.scheduler) {
            match self.queue.first_key_value() {
                Some((&key, _)) if key.0 <= deadline => self.dispatch_next(),
                _ => break,
            }
        }
    }

    /// Tears down like a page unmount. Returns how many pending timers and
    /// animations were cancelled.
    pub fn shutdown(&mut self) -> usize {
        let effects = self.scheduler.shutdown();
        let mut cancelled = 0;
        for effect in effects {
            if let Effect::Cancel(timer) = effect {
                if let Some(key) = self.timers.remove(&timer) {
                    if self.queue.remove(&key).is_some() {
                        cancelled += 1;
                    }
                }
            }
        }
        // Dropping the remaining animation handles
        cancelled += self.queue.len();
        self.queue.clear();
        self.timers.clear();
        self.stopped = true;
        cancelled
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn callbacks_after_shutdown(&self) -> usize {
        self.after_shutdown
    }

    pub fn released_units(&self) -> &[FloatingUnit] {
        &self.released
    }

    /// Comment ids in release order (manual injections excluded).
    pub fn released_comment_ids(&self) -> Vec<CommentId> {
        self.released
            .iter()
            .filter_map(|u| u.comment_id.clone())
            .collect()
    }

    pub fn release_steps(&self) -> usize {
        self.release_steps
    }

    /// Largest amount by which a release step left the pool above the
    /// concurrency target.
    pub fn max_pool_overshoot(&self) -> usize {
        self.max_overshoot
    }

    fn dispatch_next(&mut self) {
        let Some(((due, _), event)) = self.queue.pop_first() else {
            return;
        };
        self.now = due;

        if self.stopped {
            self.after_shutdown += 1;
            return;
        }

        let effects = match event {
            SimEvent::Timer(timer) => {
                self.timers.remove(&timer);
                self.scheduler.fire(timer)
            }
            SimEvent::UnitFinished(id) => {
                self.tracked.remove(&id);
                self.scheduler.unit_completed(id)
            }
        };
        self.apply(&effects);
    }

    fn apply(&mut self, effects: &[Effect]) {
        for effect in effects {
            match *effect {
                Effect::Schedule { timer, delay_ms } => {
                    let key = self.push(self.now + u64::from(delay_ms), SimEvent::Timer(timer));
                    self.timers.insert(timer, key);
                }
                Effect::Cancel(timer) => {
                    if let Some(key) = self.timers.remove(&timer) {
                        self.queue.remove(&key);
                    }
                }
            }
        }
        self.track();
    }

    /// Starts a traversal for every newly visible unit.
    fn track(&mut self) {
        let traversal = u64::from(self.scheduler.config().traversal_ms);
        let fresh: Vec<FloatingUnit> = self
            .scheduler
            .active()
            .iter()
            .filter(|u| !self.tracked.contains(&u.id))
            .cloned()
            .collect();

        let mut released_from_set = false;
        for unit in fresh {
            self.tracked.insert(unit.id);
            self.push(self.now + traversal, SimEvent::UnitFinished(unit.id));
            released_from_set |= unit.comment_id.is_some();
            self.released.push(unit);
        }

        if released_from_set {
            self.release_steps += 1;
            let overshoot = self
                .scheduler
                .active()
                .len()
                .saturating_sub(self.scheduler.max_concurrent());
            self.max_overshoot = self.max_overshoot.max(overshoot);
        }
    }

    fn push(&mut self, due: u64, event: SimEvent) -> (u64, u64) {
        let key = (due, self.seq);
        self.seq += 1;
        self.queue.insert(key, event);
        key
    }
}
