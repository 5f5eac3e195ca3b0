pub mod backend;
pub mod http;

pub use backend::ScrapeBackend;
pub use http::HttpBackend;
