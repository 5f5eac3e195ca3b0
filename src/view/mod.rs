//! View-model for the scrape viewer.
//!
//! [`ViewState`] owns everything the viewer displays together with the
//! session it belongs to (active URL, pagination cursor, request generation).
//! Every change goes through [`ViewState::update`], which applies an [`Event`]
//! and returns the side effect the caller must perform, if any. Responses are
//! fed back as events tagged with the generation of the request they answer;
//! responses from a superseded generation are dropped.

pub mod render;


use crate::filter::filter_content;
use crate::results::{
    ContentItem, ContinueRequest, CrawlDepth, Pagination, ScrapeRequest, ScrapeResult, Subpage,
    SubpageBatch,
};
use std::fmt;
use std::str::FromStr;

pub use render::{RenderOptions, Screen};

/// Shown when a submit is attempted with an empty URL
pub const INVALID_URL_MESSAGE: &str = "Please enter a valid URL";

/// Shown while `/scrape` is outstanding
pub const SCRAPE_LOADING_MESSAGE: &str = "Scraping in progress (including up to 20 subpages)...";

/// Top-level result panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Panel {
    Headings,
    Links,
    Images,
    FullText,
    AllContent,
}

impl Panel {
    pub const ALL: [Panel; 5] = [
        Panel::Headings,
        Panel::Links,
        Panel::Images,
        Panel::FullText,
        Panel::AllContent,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Panel::Headings => "headings",
            Panel::Links => "links",
            Panel::Images => "images",
            Panel::FullText => "full-text",
            Panel::AllContent => "all-content",
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Panel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Panel::ALL
            .into_iter()
            .find(|panel| panel.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown panel '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanelState {
    #[default]
    Collapsed,
    Expanded,
}

impl PanelState {
    pub fn toggled(self) -> Self {
        match self {
            PanelState::Collapsed => PanelState::Expanded,
            PanelState::Expanded => PanelState::Collapsed,
        }
    }

    pub fn is_expanded(self) -> bool {
        self == PanelState::Expanded
    }
}

/// Open/closed state of every top-level panel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Panels {
    headings: PanelState,
    links: PanelState,
    images: PanelState,
    full_text: PanelState,
    all_content: PanelState,
}

impl Panels {
    pub fn get(&self, panel: Panel) -> PanelState {
        match panel {
            Panel::Headings => self.headings,
            Panel::Links => self.links,
            Panel::Images => self.images,
            Panel::FullText => self.full_text,
            Panel::AllContent => self.all_content,
        }
    }

    pub fn is_expanded(&self, panel: Panel) -> bool {
        self.get(panel).is_expanded()
    }

    fn toggle(&mut self, panel: Panel) {
        let slot = match panel {
            Panel::Headings => &mut self.headings,
            Panel::Links => &mut self.links,
            Panel::Images => &mut self.images,
            Panel::FullText => &mut self.full_text,
            Panel::AllContent => &mut self.all_content,
        };
        *slot = slot.toggled();
    }
}

/// Sections shown for each subpage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubpageSection {
    Text,
    Links,
    Images,
}

impl FromStr for SubpageSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(SubpageSection::Text),
            "links" => Ok(SubpageSection::Links),
            "images" => Ok(SubpageSection::Images),
            other => Err(format!("unknown subpage section '{}'", other)),
        }
    }
}

/// Subpage text starts open; link and image lists start closed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubpagePanels {
    text: PanelState,
    links: PanelState,
    images: PanelState,
}

impl Default for SubpagePanels {
    fn default() -> Self {
        Self {
            text: PanelState::Expanded,
            links: PanelState::Collapsed,
            images: PanelState::Collapsed,
        }
    }
}

impl SubpagePanels {
    pub fn get(&self, section: SubpageSection) -> PanelState {
        match section {
            SubpageSection::Text => self.text,
            SubpageSection::Links => self.links,
            SubpageSection::Images => self.images,
        }
    }

    fn toggle(&mut self, section: SubpageSection) {
        let slot = match section {
            SubpageSection::Text => &mut self.text,
            SubpageSection::Links => &mut self.links,
            SubpageSection::Images => &mut self.images,
        };
        *slot = slot.toggled();
    }
}

/// A delivered subpage and the state of its sections
#[derive(Debug, Clone, PartialEq)]
pub struct SubpageEntry {
    pub subpage: Subpage,
    pub panels: SubpagePanels,
}

impl From<Subpage> for SubpageEntry {
    fn from(subpage: Subpage) -> Self {
        Self {
            subpage,
            panels: SubpagePanels::default(),
        }
    }
}

/// Text the user can copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyTarget {
    /// Full text of the root page
    FullText,
    SubpageText(usize),
    /// One heading per line
    SubpageHeadings(usize),
    /// `text: href` per line
    SubpageLinks(usize),
    /// `alt: src` per line
    SubpageImages(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Scrape,
    Continue { page: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InFlight {
    generation: u64,
    kind: RequestKind,
    url: String,
}

/// Inputs to the view-model
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Submit { url: String, depth: CrawlDepth },
    ScrapeSucceeded { generation: u64, result: ScrapeResult },
    ScrapeFailed { generation: u64, message: String },
    /// `None` requests the page after the current one
    LoadMore { page: Option<u32> },
    ContinueSucceeded { generation: u64, batch: SubpageBatch },
    ContinueFailed { generation: u64, message: String },
    TogglePanel(Panel),
    ToggleSubpageSection { index: usize, section: SubpageSection },
    SetFilter(String),
    Copy(CopyTarget),
    Copied,
    Clear,
}

/// Side effects requested by the view-model
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SendScrape { generation: u64, request: ScrapeRequest },
    SendContinue { generation: u64, request: ContinueRequest },
    CopyText(String),
}

/// Displayed state plus the session it belongs to
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    active_url: Option<String>,
    pagination: Option<Pagination>,
    generation: u64,
    in_flight: Option<InFlight>,
    result: Option<ScrapeResult>,
    subpages: Vec<SubpageEntry>,
    panels: Panels,
    filter: String,
    loading: Option<String>,
    error: Option<String>,
    notice: Option<String>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply an event and return the side effect to perform
    pub fn update(&mut self, event: Event) -> Option<Effect> {
        if !matches!(event, Event::Copied) {
            self.notice = None;
        }

        match event {
            Event::Submit { url, depth } => self.submit(&url, depth),
            Event::ScrapeSucceeded { generation, result } => {
                if let Some(request) = self.settle(generation) {
                    self.apply_result(request.url, result);
                }
                None
            }
            Event::ScrapeFailed { generation, message }
            | Event::ContinueFailed { generation, message } => {
                if self.settle(generation).is_some() {
                    ::log::warn!("Request failed: {}", message);
                    self.error = Some(message);
                }
                None
            }
            Event::LoadMore { page } => self.load_more(page),
            Event::ContinueSucceeded { generation, batch } => {
                if self.settle(generation).is_some() {
                    self.append_batch(batch);
                }
                None
            }
            Event::TogglePanel(panel) => {
                self.panels.toggle(panel);
                None
            }
            Event::ToggleSubpageSection { index, section } => {
                match self.subpages.get_mut(index) {
                    Some(entry) => entry.panels.toggle(section),
                    None => ::log::debug!("No subpage at index {}", index),
                }
                None
            }
            Event::SetFilter(filter) => {
                self.filter = filter;
                None
            }
            Event::Copy(target) => {
                let text = self.copy_text(target)?;
                if text.is_empty() {
                    return None;
                }
                Some(Effect::CopyText(text))
            }
            Event::Copied => {
                self.notice = Some("Copied!".to_string());
                None
            }
            Event::Clear => {
                // Bumping the generation turns any outstanding response stale
                let generation = self.generation + 1;
                *self = Self {
                    generation,
                    ..Self::default()
                };
                None
            }
        }
    }

    fn submit(&mut self, url: &str, depth: CrawlDepth) -> Option<Effect> {
        let url = url.trim();
        if url.is_empty() {
            self.error = Some(INVALID_URL_MESSAGE.to_string());
            return None;
        }

        if let Some(previous) = &self.in_flight {
            ::log::debug!(
                "Superseding in-flight request {} for {}",
                previous.generation,
                previous.url
            );
        }

        self.clear_results();
        self.generation += 1;
        self.in_flight = Some(InFlight {
            generation: self.generation,
            kind: RequestKind::Scrape,
            url: url.to_string(),
        });
        self.loading = Some(SCRAPE_LOADING_MESSAGE.to_string());

        Some(Effect::SendScrape {
            generation: self.generation,
            request: ScrapeRequest {
                url: url.to_string(),
                crawl_depth: depth,
                page: 0,
            },
        })
    }

    fn load_more(&mut self, page: Option<u32>) -> Option<Effect> {
        let url = self.active_url.clone()?;

        if let Some(in_flight) = &self.in_flight {
            ::log::debug!(
                "Ignoring load more while request {} is outstanding",
                in_flight.generation
            );
            return None;
        }

        let pagination = self.pagination.unwrap_or_default();
        if !pagination.has_next {
            ::log::debug!("No further subpages for {}", url);
            return None;
        }
        let page = match page.or_else(|| pagination.next_page()) {
            Some(page) => page,
            None => {
                ::log::warn!(
                    "Page {} of {} has no successor; not requesting more",
                    pagination.current_page,
                    url
                );
                return None;
            }
        };

        self.generation += 1;
        self.in_flight = Some(InFlight {
            generation: self.generation,
            kind: RequestKind::Continue { page },
            url: url.clone(),
        });
        self.error = None;
        self.loading = Some(format!(
            "Loading more subpages (page {})...",
            page.saturating_add(1)
        ));

        Some(Effect::SendContinue {
            generation: self.generation,
            request: ContinueRequest { url, page },
        })
    }

    /// Close out the request with this generation, if it is the current one
    fn settle(&mut self, generation: u64) -> Option<InFlight> {
        let current = self
            .in_flight
            .as_ref()
            .is_some_and(|r| r.generation == generation);
        if !current {
            ::log::debug!("Discarding stale response for request {}", generation);
            return None;
        }

        self.loading = None;
        self.in_flight.take()
    }

    fn apply_result(&mut self, url: String, mut result: ScrapeResult) {
        ::log::info!(
            "Scraped {} ({} subpages of {})",
            url,
            result.subpages.len(),
            result.pagination.total_subpages
        );

        self.subpages = result.subpages.drain(..).map(SubpageEntry::from).collect();
        self.pagination = Some(result.pagination);
        self.result = Some(result);
        self.active_url = Some(url);
        self.panels = Panels::default();
        self.filter.clear();
        self.error = None;
    }

    fn append_batch(&mut self, batch: SubpageBatch) {
        ::log::info!(
            "Loaded {} more subpages (page {} of {})",
            batch.subpages.len(),
            batch.pagination.current_page.saturating_add(1),
            batch.pagination.total_pages
        );

        self.subpages
            .extend(batch.subpages.into_iter().map(SubpageEntry::from));
        self.pagination = Some(batch.pagination);
    }

    fn clear_results(&mut self) {
        self.active_url = None;
        self.pagination = None;
        self.result = None;
        self.subpages.clear();
        self.panels = Panels::default();
        self.filter.clear();
        self.error = None;
    }

    fn copy_text(&self, target: CopyTarget) -> Option<String> {
        let subpage = |index: usize| self.subpages.get(index).map(|entry| &entry.subpage);

        match target {
            CopyTarget::FullText => self.result.as_ref().map(|r| r.full_text.clone()),
            CopyTarget::SubpageText(index) => subpage(index).map(|s| s.full_text.clone()),
            CopyTarget::SubpageHeadings(index) => subpage(index).map(|s| s.h1_tags.join("\n")),
            CopyTarget::SubpageLinks(index) => subpage(index).map(|s| {
                s.links
                    .iter()
                    .map(|link| {
                        let text = link.text.as_deref().filter(|t| !t.is_empty());
                        format!("{}: {}", text.unwrap_or("Link"), link.href)
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }),
            CopyTarget::SubpageImages(index) => subpage(index).map(|s| {
                s.images
                    .iter()
                    .map(|image| {
                        let alt = image.alt.as_deref().filter(|a| !a.is_empty());
                        format!("{}: {}", alt.unwrap_or("Image"), image.src)
                    })
                    .collect::<Vec<_>>()
                    .join("\n")
            }),
        }
    }

    /// URL established by the last successful submit
    pub fn active_url(&self) -> Option<&str> {
        self.active_url.as_deref()
    }

    pub fn pagination(&self) -> Option<&Pagination> {
        self.pagination.as_ref()
    }

    /// Root page of the current result. Its subpages live in [`ViewState::subpages`].
    pub fn result(&self) -> Option<&ScrapeResult> {
        self.result.as_ref()
    }

    pub fn subpages(&self) -> &[SubpageEntry] {
        &self.subpages
    }

    pub fn panels(&self) -> &Panels {
        &self.panels
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Content items of the current result matching the filter
    pub fn filtered_content(&self) -> Vec<&ContentItem> {
        match &self.result {
            Some(result) => filter_content(&result.all_content, &self.filter),
            None => Vec::new(),
        }
    }

    pub fn loading(&self) -> Option<&str> {
        self.loading.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// Kind of the outstanding request, if any
    pub fn in_flight(&self) -> Option<RequestKind> {
        self.in_flight.as_ref().map(|r| r.kind)
    }

    /// Whether a further page of subpages may be requested
    pub fn can_load_more(&self) -> bool {
        self.active_url.is_some() && self.pagination.is_some_and(|p| p.has_next)
    }
}
