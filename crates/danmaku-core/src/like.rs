//! Per-browser record of liked comments.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::comment::CommentId;

/// Set of comment ids this browser has already liked.
///
/// Only a UI guard against double increments; the store's `likesCount`
/// stays authoritative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LikeLedger {
    liked: BTreeSet<CommentId>,
}

impl LikeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &CommentId) -> bool {
        self.liked.contains(id)
    }

    /// Records a like. Returns `false` if this browser liked `id` before.
    pub fn try_like(&mut self, id: &CommentId) -> bool {
        self.liked.insert(id.clone())
    }

    pub fn len(&self) -> usize {
        self.liked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.liked.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommentId> {
        self.liked.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_once() {
        let mut ledger = LikeLedger::new();
        let id = CommentId::new("c1");

        assert!(ledger.try_like(&id));
        assert!(!ledger.try_like(&id));
        assert!(ledger.contains(&id));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_persists_as_plain_list() {
        let mut ledger = LikeLedger::new();
        ledger.try_like(&CommentId::new("b"));
        ledger.try_like(&CommentId::new("a"));

        let json = serde_json::to_string(&ledger).unwrap();
        assert_eq!(json, r#"["a","b"]"#);

        let restored: LikeLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, ledger);
    }
}
