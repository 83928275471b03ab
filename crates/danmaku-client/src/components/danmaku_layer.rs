//! DanmakuLayer component - overlay hosting every active floating comment.

use danmaku_core::DisplayId;
use yew::prelude::*;

use super::FloatingComment;
use crate::hooks::DanmakuHandle;

/// Props for the DanmakuLayer component.
#[derive(Properties, PartialEq)]
pub struct DanmakuLayerProps {
    pub danmaku: DanmakuHandle,
    /// Like clicks, forwarded after the scheduler accepted them.
    pub on_like: Callback<DisplayId>,
}

/// DanmakuLayer component - renders the scheduler's active pool.
#[function_component(DanmakuLayer)]
pub fn danmaku_layer(props: &DanmakuLayerProps) -> Html {
    let config = props.danmaku.config();

    let on_complete = {
        let danmaku = props.danmaku.clone();
        Callback::from(move |display_id: DisplayId| {
            danmaku.unit_completed(display_id);
        })
    };

    html! {
        <div class="danmaku-layer">
            { for props.danmaku.active().into_iter().map(|unit| {
                let scale = unit.scale(config.scale_base, config.scale_per_like);
                let can_like = props.danmaku.can_like(&unit);
                let key = unit.id.to_string();
                html! {
                    <FloatingComment
                        key={key}
                        scale={scale}
                        traversal_ms={config.traversal_ms}
                        can_like={can_like}
                        on_complete={on_complete.clone()}
                        on_like={props.on_like.clone()}
                        unit={unit}
                    />
                }
            }) }
        </div>
    }
}
