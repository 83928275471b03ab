mod use_comment_store;
mod use_danmaku;
mod use_localstorage;
mod use_user_id;

pub use use_comment_store::*;
pub use use_danmaku::*;
pub use use_localstorage::use_localstorage;
pub use use_user_id::use_user_id;
