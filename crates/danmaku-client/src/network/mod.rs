//! Object store clients.

mod backend;
mod http_store;

pub use backend::StoreBackend;
pub use http_store::HttpObjectStore;
