//! Terminal viewer for a website-scraping service.
//!
//! Submits a URL to the service, pages through the subpages its crawler
//! discovered, and renders the results into collapsible panels with a
//! filterable content listing and clipboard helpers.

// Re-export modules
pub mod backends;
pub mod clipboard;
pub mod commands;
pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod results;
pub mod view;

// Re-export commonly used types for convenience
pub use backends::{HttpBackend, ScrapeBackend};
pub use config::ViewerConfig;
pub use controller::Viewer;
pub use error::{Result, ViewerError};
pub use filter::filter_content;
pub use results::{
    ContentItem, CrawlDepth, Image, Link, Pagination, ScrapeResult, Subpage, SubpageBatch,
};
pub use view::{CopyTarget, Panel, SubpageSection, ViewState};
