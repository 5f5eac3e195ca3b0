use serde::{Deserialize, Serialize};

/// How far the backend crawls from the submitted URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum CrawlDepth {
    /// Only the submitted page
    RootOnly,
    /// The submitted page plus the subpages it links to (one hop)
    #[default]
    Subpages,
}

impl CrawlDepth {
    /// Numeric level sent on the wire
    pub fn level(self) -> u8 {
        match self {
            CrawlDepth::RootOnly => 0,
            CrawlDepth::Subpages => 1,
        }
    }
}

impl From<CrawlDepth> for u8 {
    fn from(depth: CrawlDepth) -> Self {
        depth.level()
    }
}

impl TryFrom<u8> for CrawlDepth {
    type Error = String;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        match level {
            0 => Ok(CrawlDepth::RootOnly),
            1 => Ok(CrawlDepth::Subpages),
            other => Err(format!("crawl depth {} is not supported (max 1)", other)),
        }
    }
}

/// Body of `POST /scrape`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
    pub crawl_depth: CrawlDepth,
    /// 0-indexed slice of subpages to return
    pub page: u32,
}

/// Body of `POST /continue_scraping`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinueRequest {
    /// Must match the URL of a previous scrape
    pub url: String,
    pub page: u32,
}

/// A hyperlink found on a page
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl Link {
    /// Text to show for the link, falling back to the target
    pub fn label(&self) -> &str {
        match self.text.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => &self.href,
        }
    }
}

/// An image found on a page
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Image {
    pub src: String,
    #[serde(default)]
    pub alt: Option<String>,
}

/// A single DOM element's extracted tag, identifiers and text
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContentItem {
    pub tag: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub text: String,
}

impl ContentItem {
    /// `id="…" class="…"` for the identifiers that are present and non-empty
    pub fn identifiers(&self) -> Option<String> {
        let id = non_empty(&self.id).map(|id| format!("id=\"{}\"", id));
        let class = non_empty(&self.class).map(|class| format!("class=\"{}\"", class));
        match (id, class) {
            (None, None) => None,
            (Some(id), None) => Some(id),
            (None, Some(class)) => Some(class),
            (Some(id), Some(class)) => Some(format!("{} {}", id, class)),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// A page one hop from the root URL. Subpages never nest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Subpage {
    pub title: String,
    pub url: String,
    pub full_text: String,
    pub h1_tags: Vec<String>,
    pub links: Vec<Link>,
    pub images: Vec<Image>,
}

/// How much of the subpage set has been delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    /// Index of the page just delivered
    pub current_page: u32,
    pub total_pages: u32,
    /// Constant across pages of the same URL
    pub total_subpages: u32,
    pub has_next: bool,
}

impl Pagination {
    /// Number of subpages delivered so far given the backend's page size
    pub fn loaded(&self, page_size: u32) -> u32 {
        self.current_page
            .saturating_add(1)
            .saturating_mul(page_size)
            .min(self.total_subpages)
    }

    /// Page to request next, if there is one
    pub fn next_page(&self) -> Option<u32> {
        if !self.has_next {
            return None;
        }
        self.current_page.checked_add(1)
    }
}

/// Response of `POST /scrape`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeResult {
    pub url: Option<String>,
    pub title: String,
    pub meta_description: String,
    pub h1_tags: Vec<String>,
    pub links: Vec<Link>,
    pub images: Vec<Image>,
    pub full_text: String,
    pub all_content: Vec<ContentItem>,
    pub subpages: Vec<Subpage>,
    pub pagination: Pagination,
}

/// Response of `POST /continue_scraping`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SubpageBatch {
    pub subpages: Vec<Subpage>,
    pub pagination: Pagination,
}

/// Body of a non-2xx response
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}
