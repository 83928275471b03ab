//! HTTP client for the remote object store.
//!
//! REST binding:
//! - `POST   {base}/objects/{type}`                      -> object
//! - `GET    {base}/objects/{type}?limit=N&order=desc`  -> `{ items: [...] }`
//! - `GET    {base}/objects/{type}/{id}`                -> object
//! - `PUT    {base}/objects/{type}/{id}` (body = fields) -> empty

use danmaku_core::{Fields, ObjectList, ObjectStore, StoreError, StoredObject};
use gloo::net::http::{Request, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct HttpObjectStore {
    base_url: String,
}

impl HttpObjectStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn collection_url(&self, kind: &str) -> String {
        format!("{}/objects/{}", self.base_url, encode(kind))
    }

    fn object_url(&self, kind: &str, id: &str) -> String {
        format!("{}/{}", self.collection_url(kind), encode(id))
    }
}

fn encode(segment: &str) -> String {
    String::from(js_sys::encode_uri_component(segment))
}

fn transport(e: gloo::net::Error) -> StoreError {
    StoreError::Transport(e.to_string())
}

/// Maps non-2xx responses to errors; 404 becomes [`StoreError::NotFound`].
async fn check_status(response: Response, kind: &str, id: &str) -> Result<Response, StoreError> {
    let status = response.status();
    debug!("Object store response status: {status}");

    if status == 404 {
        return Err(StoreError::NotFound {
            kind: kind.to_string(),
            id: id.to_string(),
        });
    }
    if !response.ok() {
        let message = response.text().await.unwrap_or_default();
        return Err(StoreError::Status { status, message });
    }
    Ok(response)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    response
        .json::<T>()
        .await
        .map_err(|e| StoreError::Decode(e.to_string()))
}

impl ObjectStore for HttpObjectStore {
    async fn create(&self, kind: &str, fields: Fields) -> Result<StoredObject, StoreError> {
        let url = self.collection_url(kind);
        debug!("Object store request: POST {url}");

        let response = Request::post(&url)
            .json(&fields)
            .map_err(transport)?
            .send()
            .await
            .map_err(transport)?;
        decode(check_status(response, kind, "").await?).await
    }

    async fn list(
        &self,
        kind: &str,
        limit: usize,
        most_recent_first: bool,
    ) -> Result<ObjectList, StoreError> {
        let url = self.collection_url(kind);
        let limit = limit.to_string();
        let order = if most_recent_first { "desc" } else { "asc" };
        debug!("Object store request: GET {url}?limit={limit}&order={order}");

        let response = Request::get(&url)
            .query([("limit", limit.as_str()), ("order", order)])
            .send()
            .await
            .map_err(transport)?;
        decode(check_status(response, kind, "").await?).await
    }

    async fn get(&self, kind: &str, id: &str) -> Result<StoredObject, StoreError> {
        let url = self.object_url(kind, id);
        debug!("Object store request: GET {url}");

        let response = Request::get(&url).send().await.map_err(transport)?;
        decode(check_status(response, kind, id).await?).await
    }

    async fn update(&self, kind: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        let url = self.object_url(kind, id);
        debug!("Object store request: PUT {url}");

        let response = Request::put(&url)
            .json(&fields)
            .map_err(transport)?
            .send()
            .await
            .map_err(transport)?;
        check_status(response, kind, id).await?;
        Ok(())
    }
}
