//! Home page: countdown, fluid background and the danmaku overlay.

use std::rc::Rc;

use chrono::Utc;
use danmaku_core::{CommentId, DisplayId};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::components::{CommentForm, CountdownBanner, DanmakuLayer, FluidBackground};
use crate::config::{AppConfig, COMMENT_LOAD_LIMIT};
use crate::hooks::{CommentService, DanmakuHandle, use_comment_store, use_danmaku, use_user_id};
use crate::util::async_callback;

/// Fetches the latest comments into the scheduler.
///
/// On failure the scheduler keeps playing its last snapshot.
async fn reload_comments(store: Rc<CommentService>, danmaku: DanmakuHandle) {
    match store.load_recent(COMMENT_LOAD_LIMIT).await {
        Ok(comments) => danmaku.set_comments(comments),
        Err(e) => tracing::warn!(error = %e, "Failed to load comments, keeping last snapshot"),
    }
}

#[function_component(HomePage)]
pub fn home_page() -> Html {
    let config = use_memo((), |_| AppConfig::load());
    let store = use_comment_store(config.store_url.clone());
    let user_id = use_user_id();
    let danmaku = use_danmaku(config.danmaku.clone());

    // Initial load
    {
        let store = store.clone();
        let danmaku = danmaku.clone();
        use_effect_with((), move |_| {
            spawn_local(reload_comments(store, danmaku));
            || ()
        });
    }

    let persist_comment = async_callback(
        (store.clone(), danmaku.clone(), (*user_id).clone()),
        |(store, danmaku, user_id), text: String| async move {
            match store.submit(&user_id, &text, Utc::now()).await {
                Ok(comment) => {
                    tracing::info!(id = %comment.id, "Comment submitted");
                    reload_comments(store, danmaku).await;
                }
                Err(e) => tracing::warn!(error = %e, "Failed to submit comment"),
            }
        },
    );

    let on_submit = {
        let danmaku = danmaku.clone();
        Callback::from(move |text: String| {
            // Shown right away, without waiting for the store round trip
            danmaku.inject_manual(&text);
            persist_comment.emit(text);
        })
    };

    let forward_like = async_callback(store.clone(), |store, comment_id: CommentId| async move {
        match store.increment_like(&comment_id).await {
            Ok(likes) => tracing::debug!(id = %comment_id, likes, "Like recorded"),
            // Optimistic: the local count is not rolled back
            Err(e) => tracing::warn!(id = %comment_id, error = %e, "Failed to record like"),
        }
    });

    let on_like = {
        let danmaku = danmaku.clone();
        Callback::from(move |display_id: DisplayId| {
            if let Some(comment_id) = danmaku.like(display_id) {
                forward_like.emit(comment_id);
            }
        })
    };

    html! {
        <main class="page home-page">
            <FluidBackground />
            <CountdownBanner target={config.countdown_target} />
            <DanmakuLayer danmaku={danmaku} on_like={on_like} />
            <CommentForm on_submit={on_submit} />
        </main>
    }
}
