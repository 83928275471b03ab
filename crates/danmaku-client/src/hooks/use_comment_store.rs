//! Hook providing the comment store adapter.

use std::rc::Rc;

use danmaku_core::CommentStore;
use yew::prelude::*;

use crate::network::StoreBackend;

pub type CommentService = CommentStore<StoreBackend>;

/// Builds the comment store once per store URL.
#[hook]
pub fn use_comment_store(store_url: Option<String>) -> Rc<CommentService> {
    use_memo(store_url, |url| {
        CommentStore::new(StoreBackend::from_url(url.as_deref()))
    })
}
