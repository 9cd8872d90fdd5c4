//! Applications shipped with the server.

mod router;
mod sample;

pub use router::router_app;
pub use sample::sample_app;
