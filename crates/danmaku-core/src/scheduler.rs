//! Danmaku scheduler.
//!
//! Holds the comment snapshot, the played set and the active pool, and
//! decides which comments to release, how many may be on screen at once,
//! and when to replay everything after a cycle ends.
//!
//! The scheduler is single-threaded and timer-free. Each operation returns
//! the [`Effect`]s the host must apply (schedule or cancel a timer); the host
//! reports elapsed timers back through [`Scheduler::fire`].
//!
//! Phases per cycle: `Idle -> Draining -> Idle ... -> Restarting -> Idle`.

use std::collections::{HashMap, HashSet};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::comment::{Comment, CommentId};
use crate::config::{DanmakuConfig, DeviceClass};
use crate::like::LikeLedger;
use crate::unit::{DisplayId, FloatingUnit};

/// Handle of a timer requested from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Side effect the host must carry out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Call [`Scheduler::fire`] with `timer` after `delay_ms`.
    Schedule { timer: TimerId, delay_ms: u32 },
    /// Drop a previously scheduled timer without firing it.
    Cancel(TimerId),
}

/// Scheduler phase.
///
/// At most one scheduler timer is pending at any time, and it is the one
/// carried by the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing pending. New comments or freed capacity trigger a release.
    Idle,
    /// A paced drain is in flight; `continuation` releases the next batch.
    Draining { continuation: TimerId },
    /// Cycle exhausted; `timer` clears the played set and replays.
    Restarting { timer: TimerId },
    /// Torn down. Every call is ignored.
    Stopped,
}

impl Phase {
    fn pending_timer(self) -> Option<TimerId> {
        match self {
            Self::Draining { continuation } => Some(continuation),
            Self::Restarting { timer } => Some(timer),
            Self::Idle | Self::Stopped => None,
        }
    }
}

struct Release {
    id: CommentId,
    text: String,
    likes_count: u32,
}

/// The danmaku scheduler.
pub struct Scheduler {
    config: DanmakuConfig,
    rng: ChaCha8Rng,
    comments: Vec<Comment>,
    played: HashSet<CommentId>,
    pool: Vec<FloatingUnit>,
    phase: Phase,
    viewport_width: f64,
    max_concurrent: usize,
    next_display_id: u64,
    next_timer_id: u64,
}

impl Scheduler {
    /// Creates a scheduler. An invalid `config` is replaced by the defaults.
    pub fn new(config: DanmakuConfig, seed: u64) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid danmaku config, using defaults");
                DanmakuConfig::default()
            }
        };
        let max_concurrent = *config.wide.max_concurrent.start();
        Self {
            viewport_width: config.breakpoint_px,
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            comments: Vec::new(),
            played: HashSet::new(),
            pool: Vec::new(),
            phase: Phase::Idle,
            max_concurrent,
            next_display_id: 0,
            next_timer_id: 0,
        }
    }

    // === Queries ===

    pub fn config(&self) -> &DanmakuConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Units currently on screen, in release order.
    pub fn active(&self) -> &[FloatingUnit] {
        &self.pool
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn played_count(&self) -> usize {
        self.played.len()
    }

    pub fn is_played(&self, id: &CommentId) -> bool {
        self.played.contains(id)
    }

    /// Concurrency target drawn for the most recent batch.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    pub fn device_class(&self) -> DeviceClass {
        self.config.device_class(self.viewport_width)
    }

    /// Number of comments that can ever be released.
    pub fn eligible_count(&self) -> usize {
        self.comments.iter().filter(|c| c.is_displayable()).count()
    }

    /// Whether every releasable comment has been played this cycle.
    pub fn is_exhausted(&self) -> bool {
        self.comments
            .iter()
            .filter(|c| c.is_displayable())
            .all(|c| self.played.contains(&c.id))
    }

    // === Inputs ===

    /// Updates the viewport width used for device classification.
    pub fn set_viewport(&mut self, width_px: f64) {
        self.viewport_width = width_px;
    }

    /// Replaces the known comment set.
    ///
    /// A snapshot identical (ids and texts) to the current one is a no-op.
    /// While draining or restarting the new snapshot is stored only: the
    /// pending continuation or replay picks it up. Like counts never go
    /// below the ones already known locally.
    pub fn set_comments(&mut self, mut comments: Vec<Comment>) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.phase == Phase::Stopped {
            return effects;
        }
        self.carry_like_counts(&mut comments);

        if self.same_snapshot(&comments) {
            // Likes may still have moved
            self.comments = comments;
            return effects;
        }

        tracing::debug!(
            previous = self.comments.len(),
            next = comments.len(),
            "Comment snapshot changed"
        );
        self.comments = comments;

        match self.phase {
            Phase::Idle => self.release_eligible(&mut effects),
            Phase::Draining { .. } => {
                tracing::trace!("Drain in flight, new comments join its next step");
            }
            Phase::Restarting { .. } => {
                tracing::trace!("Restart armed, new comments join the replay");
            }
            Phase::Stopped => {}
        }
        effects
    }

    /// Puts `text` on screen right away, outside played-set bookkeeping.
    ///
    /// Used for the visitor's own submission. Blank text is ignored.
    pub fn inject_manual(&mut self, text: &str) -> Option<DisplayId> {
        if self.phase == Phase::Stopped {
            return None;
        }
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let id = self.spawn(text.to_string(), None, 0);
        tracing::debug!(%id, "Manual comment injected");
        Some(id)
    }

    /// Reports that a unit finished its traversal.
    pub fn unit_completed(&mut self, display_id: DisplayId) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.phase == Phase::Stopped {
            return effects;
        }

        let before = self.pool.len();
        self.pool.retain(|u| u.id != display_id);
        if self.pool.len() == before {
            tracing::trace!(%display_id, "Completion for unknown unit ignored");
            return effects;
        }

        if self.phase == Phase::Idle {
            if self.has_unplayed() {
                self.release_eligible(&mut effects);
            } else {
                self.settle(&mut effects);
            }
        }
        effects
    }

    /// Handles an elapsed timer. Stale or cancelled timers are ignored.
    pub fn fire(&mut self, timer: TimerId) -> Vec<Effect> {
        let mut effects = Vec::new();
        match self.phase {
            Phase::Draining { continuation } if continuation == timer => {
                self.phase = Phase::Idle;
                self.release_eligible(&mut effects);
            }
            Phase::Restarting { timer: armed } if armed == timer => {
                tracing::info!(comments = self.eligible_count(), "Danmaku cycle restarting");
                self.played.clear();
                self.phase = Phase::Idle;
                self.release_eligible(&mut effects);
            }
            _ => {
                tracing::trace!(?timer, phase = ?self.phase, "Stale timer ignored");
            }
        }
        effects
    }

    /// Applies a like click on an active unit.
    ///
    /// Returns the comment id to forward to the store when the like counts.
    pub fn like(&mut self, display_id: DisplayId, ledger: &mut LikeLedger) -> Option<CommentId> {
        let unit = self.pool.iter_mut().find(|u| u.id == display_id)?;
        let liked = unit.like(ledger)?;
        let likes_count = unit.likes_count;

        // Replays must show the raised count too
        for comment in self.comments.iter_mut().filter(|c| c.id == liked) {
            comment.likes_count = comment.likes_count.max(likes_count);
        }
        Some(liked)
    }

    /// Tears the scheduler down.
    ///
    /// Cancels the pending timer, forgets every active unit and makes all
    /// later calls no-ops.
    pub fn shutdown(&mut self) -> Vec<Effect> {
        let effects = self
            .phase
            .pending_timer()
            .map(Effect::Cancel)
            .into_iter()
            .collect();
        self.pool.clear();
        self.phase = Phase::Stopped;
        effects
    }

    // === Internals ===

    fn same_snapshot(&self, next: &[Comment]) -> bool {
        self.comments.len() == next.len()
            && self
                .comments
                .iter()
                .zip(next)
                .all(|(a, b)| a.id == b.id && a.text == b.text)
    }

    fn carry_like_counts(&self, incoming: &mut [Comment]) {
        let local: HashMap<&CommentId, u32> = self
            .comments
            .iter()
            .map(|c| (&c.id, c.likes_count))
            .collect();
        for comment in incoming {
            if let Some(&known) = local.get(&comment.id) {
                comment.likes_count = comment.likes_count.max(known);
            }
        }
    }

    fn has_unplayed(&self) -> bool {
        self.comments
            .iter()
            .any(|c| c.is_displayable() && !self.played.contains(&c.id))
    }

    /// Unplayed comments in creation order, perturbed by bounded jitter.
    fn unplayed_in_order(&mut self) -> Vec<Release> {
        let jitter = self.config.jitter_ms;
        let mut keyed: Vec<(i64, usize, Release)> = Vec::new();
        let mut seen = HashSet::new();

        for (index, comment) in self.comments.iter().enumerate() {
            if !comment.is_displayable() || self.played.contains(&comment.id) {
                continue;
            }
            // Duplicate ids in one snapshot release once
            if !seen.insert(&comment.id) {
                continue;
            }
            let offset = if jitter > 0 {
                self.rng.random_range(-jitter..=jitter)
            } else {
                0
            };
            keyed.push((
                comment.created_at.timestamp_millis().saturating_add(offset),
                index,
                Release {
                    id: comment.id.clone(),
                    text: comment.text.clone(),
                    likes_count: comment.likes_count,
                },
            ));
        }

        keyed.sort_by_key(|(key, index, _)| (*key, *index));
        keyed.into_iter().map(|(_, _, release)| release).collect()
    }

    /// One paced release step.
    fn release_eligible(&mut self, effects: &mut Vec<Effect>) {
        let mut unplayed = self.unplayed_in_order();
        if unplayed.is_empty() {
            self.phase = Phase::Idle;
            self.settle(effects);
            return;
        }

        let profile = self.config.profile(self.device_class()).clone();
        self.max_concurrent = self.rng.random_range(profile.max_concurrent.clone());

        let capacity = self.max_concurrent.saturating_sub(self.pool.len());
        let batch = capacity.min(unplayed.len()).min(profile.per_tick_cap);

        for release in unplayed.drain(..batch) {
            self.played.insert(release.id.clone());
            self.spawn(release.text, Some(release.id), release.likes_count);
        }

        let remaining = unplayed.len();
        tracing::debug!(
            batch,
            remaining,
            active = self.pool.len(),
            max_concurrent = self.max_concurrent,
            "Released danmaku batch"
        );

        if remaining > 0 && batch > 0 {
            let timer = self.next_timer();
            let delay_ms = self.rng.random_range(profile.release_delay_ms.clone());
            self.phase = Phase::Draining {
                continuation: timer,
            };
            effects.push(Effect::Schedule { timer, delay_ms });
        } else {
            // Either done, or the pool is full and a completion will resume us
            self.phase = Phase::Idle;
        }
    }

    /// Arms the replay once the cycle is exhausted and the screen is empty.
    fn settle(&mut self, effects: &mut Vec<Effect>) {
        if self.phase != Phase::Idle || !self.pool.is_empty() {
            return;
        }
        if self.eligible_count() == 0 || !self.is_exhausted() {
            return;
        }

        let timer = self.next_timer();
        self.phase = Phase::Restarting { timer };
        tracing::debug!(delay_ms = self.config.restart_delay_ms, "Cycle exhausted, restart armed");
        effects.push(Effect::Schedule {
            timer,
            delay_ms: self.config.restart_delay_ms,
        });
    }

    fn spawn(&mut self, text: String, comment_id: Option<CommentId>, likes_count: u32) -> DisplayId {
        let id = DisplayId(self.next_display_id);
        self.next_display_id += 1;

        let top_percent = self
            .rng
            .random_range(self.config.vertical_band_percent.clone());
        self.pool.push(FloatingUnit {
            id,
            text,
            comment_id,
            likes_count,
            top_percent,
            liked: false,
        });
        id
    }

    fn next_timer(&mut self) -> TimerId {
        let id = TimerId(self.next_timer_id);
        self.next_timer_id += 1;
        id
    }
}
