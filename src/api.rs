mod backend;
mod client;
mod endpoint;

pub use backend::{Backend, Error, Result};
pub use client::HttpBackend;
pub use endpoint::Endpoint;
