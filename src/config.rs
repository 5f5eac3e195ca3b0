use crate::error::{Result, ViewerError};
use crate::results::CrawlDepth;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use url::Url;

/// Configuration for the scrape viewer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewerConfig {
    /// Base URL of the scrape service
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Crawl depth used when a submit does not name one
    #[serde(default)]
    pub crawl_depth: CrawlDepth,

    /// Subpages the backend returns per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Links listed per subpage before summarising the rest
    #[serde(default = "default_subpage_link_limit")]
    pub subpage_link_limit: usize,

    /// Images listed per subpage before summarising the rest
    #[serde(default = "default_subpage_image_limit")]
    pub subpage_image_limit: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            crawl_depth: CrawlDepth::default(),
            page_size: default_page_size(),
            subpage_link_limit: default_subpage_link_limit(),
            subpage_image_limit: default_subpage_image_limit(),
        }
    }
}

impl ViewerConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the viewer cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(ViewerError::Config("page_size must be at least 1".to_string()));
        }
        self.server_base()?;
        Ok(())
    }

    /// Parsed server base URL, with a trailing slash so endpoint paths join beneath it
    pub fn server_base(&self) -> Result<Url> {
        let mut base = Url::parse(&self.server_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(base)
    }
}

/// Default value for server_url
fn default_server_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

/// Default value for page_size
fn default_page_size() -> u32 {
    20
}

fn default_subpage_link_limit() -> usize {
    20
}

fn default_subpage_image_limit() -> usize {
    10
}
