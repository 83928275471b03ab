//! Danmaku-Live Core Library
//!
//! Scheduling and lifecycle logic for the floating comment overlay.
//!
//! Nothing in this crate touches the browser. The [`Scheduler`] never owns a
//! timer: every operation returns the [`Effect`]s the host must apply, which
//! keeps the state machine testable on native targets with virtual time.

#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod comment;
pub mod config;
pub mod countdown;
pub mod like;
pub mod memory;
pub mod scheduler;
pub mod store;
pub mod unit;

#[cfg(test)]
pub(crate) mod sim;

pub use comment::{Comment, CommentId, MAX_COMMENT_CHARS, normalize_submission};
pub use config::{ConfigError, DanmakuConfig, DeviceClass, DeviceProfile};
pub use countdown::{Countdown, CountdownParts};
pub use like::LikeLedger;
pub use memory::MemoryObjectStore;
pub use scheduler::{Effect, Phase, Scheduler, TimerId};
pub use store::{
    COMMENT_TYPE, CommentFields, CommentStore, Fields, ObjectList, ObjectStore, StoreError,
    StoredObject, comment_from_object,
};
pub use unit::{DisplayId, FloatingUnit, Traversal, scale_for_likes};
