//! UI Components for the danmaku-live client.

mod comment_form;
mod countdown_banner;
mod danmaku_layer;
mod floating_comment;
mod fluid_background;

pub use comment_form::CommentForm;
pub use countdown_banner::CountdownBanner;
pub use danmaku_layer::DanmakuLayer;
pub use floating_comment::FloatingComment;
pub use fluid_background::FluidBackground;
