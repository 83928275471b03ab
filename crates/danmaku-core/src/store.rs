//! Comment store adapter over an external object store.
//!
//! The object store is a generic typed key-value service. Only the
//! `"comment"` type is used here, with fields
//! `{userId, text, createdAt, likesCount}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::comment::{Comment, CommentId, normalize_submission};

/// Object type under which comments are stored.
pub const COMMENT_TYPE: &str = "comment";

/// Free-form field map of a stored object.
pub type Fields = serde_json::Map<String, Value>;

/// Error type for object store calls.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Store returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Object not found: {kind}/{id}")]
    NotFound { kind: String, id: String },
    #[error("Malformed record '{id}': {reason}")]
    Malformed { id: String, reason: String },
    #[error("Comment text is empty")]
    EmptyText,
}

/// One object as returned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    #[serde(default)]
    pub id: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub fields: Fields,
}

/// Result of a `list` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectList {
    #[serde(default)]
    pub items: Vec<StoredObject>,
}

/// The external object store collaborator.
///
/// Implemented over HTTP in the browser client and in memory for tests.
#[allow(async_fn_in_trait)]
pub trait ObjectStore {
    async fn create(&self, kind: &str, fields: Fields) -> Result<StoredObject, StoreError>;

    async fn list(
        &self,
        kind: &str,
        limit: usize,
        most_recent_first: bool,
    ) -> Result<ObjectList, StoreError>;

    async fn get(&self, kind: &str, id: &str) -> Result<StoredObject, StoreError>;

    async fn update(&self, kind: &str, id: &str, fields: Fields) -> Result<(), StoreError>;
}

/// Field payload of a comment object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentFields {
    #[serde(default)]
    pub user_id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub likes_count: u32,
}

impl CommentFields {
    pub fn from_fields(fields: &Fields) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(fields.clone()))
    }

    pub fn into_fields(self) -> Result<Fields, StoreError> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(StoreError::Decode(format!("expected object, got {other}"))),
            Err(e) => Err(StoreError::Decode(e.to_string())),
        }
    }
}

/// JS-backed stores hand counters back as floats (`3.0`); accept those too.
fn lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let count = match &value {
        Value::Null => Some(0),
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        _ => None,
    };
    count
        .map(|c| u32::try_from(c).unwrap_or(u32::MAX))
        .ok_or_else(|| serde::de::Error::custom(format!("invalid likes count: {value}")))
}

/// Normalizes a stored object into a [`Comment`].
///
/// `createdAt` inside the fields wins over the object's own timestamp.
pub fn comment_from_object(object: StoredObject) -> Result<Comment, StoreError> {
    let fields = CommentFields::from_fields(&object.fields).map_err(|e| StoreError::Malformed {
        id: object.id.clone(),
        reason: e.to_string(),
    })?;

    Ok(Comment {
        id: CommentId(object.id),
        text: fields.text,
        created_at: fields.created_at.unwrap_or(object.created_at),
        likes_count: fields.likes_count,
    })
}

/// Thin adapter that speaks "comments" to an [`ObjectStore`].
#[derive(Debug, Clone)]
pub struct CommentStore<S> {
    store: S,
}

impl<S: ObjectStore> CommentStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Loads the most recent `limit` comments.
    ///
    /// Rows that cannot be normalized are dropped with a warning.
    pub async fn load_recent(&self, limit: usize) -> Result<Vec<Comment>, StoreError> {
        let list = self.store.list(COMMENT_TYPE, limit, true).await?;

        let mut comments = Vec::with_capacity(list.items.len());
        for object in list.items {
            match comment_from_object(object) {
                Ok(comment) => comments.push(comment),
                Err(e) => tracing::warn!(error = %e, "Skipping malformed comment row"),
            }
        }

        tracing::debug!(count = comments.len(), "Loaded comments");
        Ok(comments)
    }

    /// Persists a new comment for `user_id`.
    pub async fn submit(
        &self,
        user_id: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<Comment, StoreError> {
        let text = normalize_submission(text).ok_or(StoreError::EmptyText)?;

        let fields = CommentFields {
            user_id: user_id.to_string(),
            text,
            created_at: Some(now),
            likes_count: 0,
        }
        .into_fields()?;

        let object = self.store.create(COMMENT_TYPE, fields).await?;
        comment_from_object(object)
    }

    /// Adds one like to a comment and returns the new count.
    ///
    /// Read-modify-write: concurrent likes from other browsers may be lost,
    /// which is accepted for a promotional counter.
    pub async fn increment_like(&self, id: &CommentId) -> Result<u32, StoreError> {
        let object = self.store.get(COMMENT_TYPE, id.as_str()).await?;
        let mut fields = object.fields;

        let current = CommentFields::from_fields(&fields)
            .map_err(|e| StoreError::Malformed {
                id: object.id.clone(),
                reason: e.to_string(),
            })?
            .likes_count;
        let next = current.saturating_add(1);
        fields.insert("likesCount".to_string(), Value::from(next));

        self.store.update(COMMENT_TYPE, id.as_str(), fields).await?;
        Ok(next)
    }
}
