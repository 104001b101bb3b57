// Adapters layer: concrete implementations of the domain ports.

pub mod http;
pub mod sleep;

pub use http::HttpCodeApi;
pub use sleep::TokioSleeper;
