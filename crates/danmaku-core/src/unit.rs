//! Floating comment unit: one on-screen traversal of one piece of text.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::comment::CommentId;
use crate::like::LikeLedger;

/// Locally generated display token. Never reused within a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DisplayId(pub u64);

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit-{}", self.0)
    }
}

/// Render scale for a like count: `base + per_like * likes`, unbounded.
pub fn scale_for_likes(likes: u32, base: f64, per_like: f64) -> f64 {
    base + per_like * f64::from(likes)
}

/// A unit in the active pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingUnit {
    pub id: DisplayId,
    pub text: String,
    /// `None` for manual injections that were never persisted.
    pub comment_id: Option<CommentId>,
    pub likes_count: u32,
    /// Vertical position, fixed at creation.
    pub top_percent: f64,
    pub liked: bool,
}

impl FloatingUnit {
    pub fn scale(&self, base: f64, per_like: f64) -> f64 {
        scale_for_likes(self.likes_count, base, per_like)
    }

    /// Whether the like control should accept a click.
    pub fn can_like(&self, ledger: &LikeLedger) -> bool {
        match &self.comment_id {
            Some(id) => !self.liked && !ledger.contains(id),
            None => false,
        }
    }

    /// Applies a like optimistically.
    ///
    /// Returns the comment id to forward to the store, or `None` when the
    /// click is a no-op (already liked, or nothing persisted to like).
    pub fn like(&mut self, ledger: &mut LikeLedger) -> Option<CommentId> {
        let id = self.comment_id.clone()?;
        if self.liked || !ledger.try_like(&id) {
            return None;
        }
        self.liked = true;
        self.likes_count = self.likes_count.saturating_add(1);
        Some(id)
    }
}

/// Linear right-to-left traversal with pause/resume.
///
/// Times are milliseconds on any monotonic clock (`performance.now()` in the
/// browser). Pausing folds the running span into `elapsed_ms`, so resuming
/// continues from exactly the paused progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Traversal {
    duration_ms: f64,
    elapsed_ms: f64,
    resumed_at: Option<f64>,
    completed: bool,
}

impl Traversal {
    /// Starts a traversal at `now`.
    pub fn start(duration_ms: f64, now: f64) -> Self {
        Self {
            duration_ms,
            elapsed_ms: 0.0,
            resumed_at: Some(now),
            completed: false,
        }
    }

    pub fn elapsed(&self, now: f64) -> f64 {
        match self.resumed_at {
            Some(since) => self.elapsed_ms + (now - since).max(0.0),
            None => self.elapsed_ms,
        }
    }

    /// Fraction crossed, clamped to `0.0..=1.0`.
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (self.elapsed(now) / self.duration_ms).clamp(0.0, 1.0)
    }

    pub fn is_paused(&self) -> bool {
        self.resumed_at.is_none()
    }

    pub fn pause(&mut self, now: f64) {
        if self.resumed_at.is_some() {
            self.elapsed_ms = self.elapsed(now);
            self.resumed_at = None;
        }
    }

    pub fn resume(&mut self, now: f64) {
        if self.resumed_at.is_none() && !self.completed {
            self.resumed_at = Some(now);
        }
    }

    /// Horizontal offset in pixels: the unit's left edge starts at the
    /// viewport's right edge and ends one unit-width past the left edge.
    pub fn offset_px(&self, now: f64, viewport_width: f64, unit_width: f64) -> f64 {
        viewport_width - self.progress(now) * (viewport_width + unit_width)
    }

    /// Returns `true` exactly once: the first call after the traversal has
    /// finished naturally. Never `true` after [`Traversal::cancel`].
    pub fn take_completion(&mut self, now: f64) -> bool {
        if self.completed || self.progress(now) < 1.0 {
            return false;
        }
        self.completed = true;
        true
    }

    /// Teardown before natural completion; completion will never be reported.
    pub fn cancel(&mut self) {
        self.completed = true;
        self.resumed_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn unit(comment_id: Option<&str>, likes: u32) -> FloatingUnit {
        FloatingUnit {
            id: DisplayId(1),
            text: "hello".to_string(),
            comment_id: comment_id.map(CommentId::from),
            likes_count: likes,
            top_percent: 40.0,
            liked: false,
        }
    }

    #[test]
    fn test_scale_table() {
        assert!((scale_for_likes(0, 0.8, 0.02) - 0.8).abs() < EPS);
        assert!((scale_for_likes(10, 0.8, 0.02) - 1.0).abs() < EPS);
        assert!((scale_for_likes(50, 0.8, 0.02) - 1.8).abs() < EPS);
        assert!(scale_for_likes(1000, 0.8, 0.02) > 20.0);
    }

    #[test]
    fn test_like_at_most_once() {
        let mut ledger = LikeLedger::new();
        let mut u = unit(Some("c1"), 3);

        assert!(u.can_like(&ledger));
        assert_eq!(u.like(&mut ledger), Some(CommentId::from("c1")));
        assert_eq!(u.likes_count, 4);
        assert!(u.liked);

        for _ in 0..5 {
            assert_eq!(u.like(&mut ledger), None);
        }
        assert_eq!(u.likes_count, 4);
        assert!(!u.can_like(&ledger));
    }

    #[test]
    fn test_like_guarded_across_units() {
        let mut ledger = LikeLedger::new();
        let mut first = unit(Some("c1"), 0);
        let mut second = unit(Some("c1"), 0);

        assert!(first.like(&mut ledger).is_some());
        assert!(!second.can_like(&ledger));
        assert_eq!(second.like(&mut ledger), None);
        assert_eq!(second.likes_count, 0);
        // A rejected click leaves the unit untouched
        assert!(!second.liked);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_manual_unit_cannot_be_liked() {
        let mut ledger = LikeLedger::new();
        let mut u = unit(None, 0);
        assert!(!u.can_like(&ledger));
        assert_eq!(u.like(&mut ledger), None);
        assert_eq!(u.likes_count, 0);
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_pause_resume_preserves_progress() {
        let mut t = Traversal::start(16_000.0, 1_000.0);

        // 40% across
        let paused_at = 1_000.0 + 6_400.0;
        t.pause(paused_at);
        assert_eq!(t.progress(paused_at), 0.4);

        // Time passes while hovered
        assert_eq!(t.progress(paused_at + 5_000.0), 0.4);
        assert!(t.is_paused());

        let resumed_at = paused_at + 5_000.0;
        t.resume(resumed_at);
        assert_eq!(t.progress(resumed_at), 0.4);
        assert_eq!(t.progress(resumed_at + 1_600.0), 0.5);
    }

    #[test]
    fn test_double_pause_is_idempotent() {
        let mut t = Traversal::start(1_000.0, 0.0);
        t.pause(250.0);
        t.pause(900.0);
        assert_eq!(t.elapsed(900.0), 250.0);
    }

    #[test]
    fn test_completion_reported_once() {
        let mut t = Traversal::start(1_000.0, 0.0);
        assert!(!t.take_completion(999.0));
        assert!(t.take_completion(1_000.0));
        assert!(!t.take_completion(2_000.0));
    }

    #[test]
    fn test_cancel_suppresses_completion() {
        let mut t = Traversal::start(1_000.0, 0.0);
        t.cancel();
        assert!(!t.take_completion(5_000.0));
        t.resume(5_000.0);
        assert!(t.is_paused());
    }

    #[test]
    fn test_offset_endpoints() {
        let t = Traversal::start(1_000.0, 0.0);
        assert_eq!(t.offset_px(0.0, 800.0, 120.0), 800.0);
        assert_eq!(t.offset_px(1_000.0, 800.0, 120.0), -120.0);
    }
}
