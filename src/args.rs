use clap::{Parser, ValueEnum};
use scrape_viewer::{CrawlDepth, Panel};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "scrape-viewer")]
#[command(about = "Browse the results of a website-scraping service from the terminal")]
#[command(version)]
pub struct Args {
    /// URL to scrape (omit to start an interactive session without one)
    pub url: Option<String>,

    /// Base URL of the scrape service (overrides config and SCRAPE_SERVER_URL)
    #[arg(short, long)]
    pub server: Option<String>,

    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Crawl depth (root page only, or one hop of subpages)
    #[arg(short, long, value_enum)]
    pub depth: Option<DepthArg>,

    /// Additional pages of subpages to load after the first
    #[arg(short, long, default_value_t = 0)]
    pub pages: u32,

    /// Load every page of subpages
    #[arg(long, conflicts_with = "pages")]
    pub all: bool,

    /// Panels to show expanded
    #[arg(short, long, value_enum)]
    pub expand: Vec<PanelArg>,

    /// Filter the content listing
    #[arg(short, long)]
    pub filter: Option<String>,

    /// Copy the page's full text to the clipboard
    #[arg(long)]
    pub copy_full_text: bool,

    /// Read commands from stdin after the initial scrape
    #[arg(short, long)]
    pub interactive: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum DepthArg {
    Root,
    Subpages,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PanelArg {
    Headings,
    Links,
    Images,
    FullText,
    AllContent,
}

/// Convert from CLI argument depth to crawl depth
pub fn convert_depth(arg: DepthArg) -> CrawlDepth {
    match arg {
        DepthArg::Root => CrawlDepth::RootOnly,
        DepthArg::Subpages => CrawlDepth::Subpages,
    }
}

/// Convert from CLI argument panel to view panel
pub fn convert_panel(arg: PanelArg) -> Panel {
    match arg {
        PanelArg::Headings => Panel::Headings,
        PanelArg::Links => Panel::Links,
        PanelArg::Images => Panel::Images,
        PanelArg::FullText => Panel::FullText,
        PanelArg::AllContent => Panel::AllContent,
    }
}
