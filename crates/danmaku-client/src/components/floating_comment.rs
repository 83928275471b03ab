//! FloatingComment component - one comment crossing the screen.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use danmaku_core::{DisplayId, FloatingUnit, Traversal};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;
use yew::prelude::*;

use crate::util::now_ms;

/// Props for the FloatingComment component.
#[derive(Properties, PartialEq)]
pub struct FloatingCommentProps {
    pub unit: FloatingUnit,
    /// Render scale derived from the like count.
    pub scale: f64,
    pub traversal_ms: u32,
    /// Whether the like control accepts clicks.
    pub can_like: bool,
    /// Fired once when the traversal finishes naturally.
    pub on_complete: Callback<DisplayId>,
    pub on_like: Callback<DisplayId>,
}

/// FloatingComment component.
///
/// Moves right-to-left over `traversal_ms` via `requestAnimationFrame`.
/// Hovering pauses in place; leaving resumes from the same progress.
/// Unmounting cancels the frame loop without reporting completion.
#[function_component(FloatingComment)]
pub fn floating_comment(props: &FloatingCommentProps) -> Html {
    let mover_ref = use_node_ref();
    let traversal_ms = f64::from(props.traversal_ms);
    let traversal = use_mut_ref(move || Traversal::start(traversal_ms, now_ms()));
    let hovered = use_state(|| false);

    // Frame loop
    {
        let mover_ref = mover_ref.clone();
        let traversal = traversal.clone();
        let on_complete = props.on_complete.clone();

        use_effect_with(props.unit.id, move |&display_id| {
            let animation_frame_id = Rc::new(Cell::new(None::<i32>));
            let closure: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

            let closure_clone = closure.clone();
            let frame_id_clone = animation_frame_id.clone();
            let traversal_clone = traversal.clone();
            *closure.borrow_mut() = Some(Closure::new(move || {
                let now = now_ms();
                let finished = {
                    let mut traversal = traversal_clone.borrow_mut();
                    if let Some(el) = mover_ref.cast::<HtmlElement>() {
                        let viewport = web_sys::window()
                            .and_then(|w| w.inner_width().ok())
                            .and_then(|v| v.as_f64())
                            .unwrap_or(0.0);
                        let x = traversal.offset_px(now, viewport, f64::from(el.offset_width()));
                        let _ = el
                            .style()
                            .set_property("transform", &format!("translate3d({x:.1}px, 0, 0)"));
                    }
                    traversal.take_completion(now)
                };

                if finished {
                    frame_id_clone.set(None);
                    on_complete.emit(display_id);
                    return;
                }

                // Request next frame
                if let Some(window) = web_sys::window() {
                    if let Some(ref closure) = *closure_clone.borrow() {
                        let id = window
                            .request_animation_frame(closure.as_ref().unchecked_ref())
                            .ok();
                        frame_id_clone.set(id);
                    }
                }
            }));

            // Start the loop
            if let Some(window) = web_sys::window() {
                if let Some(ref closure) = *closure.borrow() {
                    let id = window
                        .request_animation_frame(closure.as_ref().unchecked_ref())
                        .ok();
                    animation_frame_id.set(id);
                }
            }

            move || {
                traversal.borrow_mut().cancel();
                if let Some(id) = animation_frame_id.take() {
                    if let Some(window) = web_sys::window() {
                        let _ = window.cancel_animation_frame(id);
                    }
                }
                // Break the reference cycle by clearing the closure
                *closure.borrow_mut() = None;
            }
        });
    }

    let on_mouse_enter = {
        let traversal = traversal.clone();
        let hovered = hovered.clone();
        Callback::from(move |_: MouseEvent| {
            traversal.borrow_mut().pause(now_ms());
            hovered.set(true);
        })
    };

    let on_mouse_leave = {
        let traversal = traversal.clone();
        let hovered = hovered.clone();
        Callback::from(move |_: MouseEvent| {
            traversal.borrow_mut().resume(now_ms());
            hovered.set(false);
        })
    };

    let on_like_click = {
        let on_like = props.on_like.clone();
        let display_id = props.unit.id;
        Callback::from(move |e: MouseEvent| {
            e.stop_propagation();
            on_like.emit(display_id);
        })
    };

    let unit = &props.unit;
    let lane_style = format!("top: {:.2}%;", unit.top_percent);
    let body_style = format!("transform: scale({:.3});", props.scale);
    let like_class = classes!("danmaku-like", unit.liked.then_some("liked"));

    html! {
        <div class="danmaku-lane" style={lane_style}>
            <div
                ref={mover_ref}
                class={classes!("danmaku-unit", (*hovered).then_some("paused"))}
                onmouseenter={on_mouse_enter}
                onmouseleave={on_mouse_leave}
            >
                <span class="danmaku-body" style={body_style}>
                    <span class="danmaku-text">{ &unit.text }</span>
                    if unit.comment_id.is_some() {
                        <button
                            class={like_class}
                            disabled={!props.can_like}
                            onclick={on_like_click}
                        >
                            { "♥ " }{ unit.likes_count }
                        </button>
                    }
                </span>
            </div>
        </div>
    }
}
