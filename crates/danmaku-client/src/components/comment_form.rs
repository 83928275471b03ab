//! CommentForm component - the visitor's comment input.

use danmaku_core::{MAX_COMMENT_CHARS, normalize_submission};
use web_sys::HtmlInputElement;
use yew::prelude::*;

/// Props for the CommentForm component.
#[derive(Properties, PartialEq)]
pub struct CommentFormProps {
    /// Receives trimmed, length-capped text.
    pub on_submit: Callback<String>,
}

#[function_component(CommentForm)]
pub fn comment_form(props: &CommentFormProps) -> Html {
    let input_ref = use_node_ref();
    let input_value = use_state(String::new);

    let on_input = {
        let input_value = input_value.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                input_value.set(input.value());
            }
        })
    };

    let on_submit = {
        let parent_callback = props.on_submit.clone();
        let input_value = input_value.clone();
        let input_ref = input_ref.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            if let Some(content) = normalize_submission(&input_value) {
                parent_callback.emit(content);
                input_value.set(String::new());
                // Clear input field
                if let Some(input) = input_ref.cast::<HtmlInputElement>() {
                    input.set_value("");
                }
            }
        })
    };

    let is_blank = input_value.trim().is_empty();

    html! {
        <form class="comment-form" onsubmit={on_submit}>
            <input
                ref={input_ref}
                type="text"
                placeholder="Leave a message..."
                maxlength={MAX_COMMENT_CHARS.to_string()}
                oninput={on_input}
            />
            <button type="submit" class="send-btn" disabled={is_blank}>
                { "Send" }
            </button>
        </form>
    }
}
