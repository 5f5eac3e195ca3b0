use crate::backends::ScrapeBackend;
use crate::clipboard::{Clipboard, SystemClipboard, copy_to_clipboard};
use crate::error::{Result, ViewerError};
use crate::results::{
    ContentItem, ContinueRequest, CrawlDepth, ScrapeRequest, ScrapeResult, SubpageBatch,
};
use crate::view::{
    CopyTarget, Effect, Event, INVALID_URL_MESSAGE, Panel, RenderOptions, Screen, SubpageSection,
    ViewState,
};

/// How many further pages of subpages a one-shot run loads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLoad {
    Count(u32),
    All,
}

/// Everything a one-shot run does after the scrape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPlan {
    pub pages: PageLoad,
    pub expand: Vec<Panel>,
    pub filter: Option<String>,
    pub copy_full_text: bool,
}

impl Default for RunPlan {
    fn default() -> Self {
        Self {
            pages: PageLoad::Count(0),
            expand: Vec::new(),
            filter: None,
            copy_full_text: false,
        }
    }
}

/// Result renderer and pagination client.
///
/// Owns the view-model and performs the requests and clipboard writes it asks for.
pub struct Viewer<B, C = SystemClipboard> {
    backend: B,
    clipboard: C,
    state: ViewState,
    options: RenderOptions,
    crawl_depth: CrawlDepth,
}

impl<B: ScrapeBackend> Viewer<B> {
    /// Create a viewer that copies to the system clipboard
    pub fn new(backend: B) -> Self {
        Self::with_clipboard(backend, SystemClipboard)
    }
}

impl<B: ScrapeBackend, C: Clipboard> Viewer<B, C> {
    pub fn with_clipboard(backend: B, clipboard: C) -> Self {
        Self {
            backend,
            clipboard,
            state: ViewState::new(),
            options: RenderOptions::default(),
            crawl_depth: CrawlDepth::default(),
        }
    }

    /// Set the limits used when rendering
    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the crawl depth used by [`Viewer::submit_default`]
    pub fn with_crawl_depth(mut self, crawl_depth: CrawlDepth) -> Self {
        self.crawl_depth = crawl_depth;
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn screen(&self) -> Screen<'_> {
        Screen::new(&self.state, self.options)
    }

    /// Scrape `url` and replace everything displayed with the result
    pub async fn submit(&mut self, url: &str, crawl_depth: CrawlDepth) -> Result<&ScrapeResult> {
        let effect = self.state.update(Event::Submit {
            url: url.to_string(),
            depth: crawl_depth,
        });

        match effect {
            Some(Effect::SendScrape {
                generation,
                request,
            }) => self.send_scrape(generation, request).await,
            _ => {
                let message = self.state.error().unwrap_or(INVALID_URL_MESSAGE);
                Err(ViewerError::Validation(message.to_string()))
            }
        }
    }

    /// [`Viewer::submit`] with the configured crawl depth
    pub async fn submit_default(&mut self, url: &str) -> Result<&ScrapeResult> {
        self.submit(url, self.crawl_depth).await
    }

    /// Fetch page `page` of subpages for the active URL and append it.
    ///
    /// Returns `Ok(None)` without sending anything when there is no active URL
    /// or the last pagination reported no further pages.
    pub async fn load_more(&mut self, page: u32) -> Result<Option<SubpageBatch>> {
        self.request_more(Some(page)).await
    }

    /// Fetch the page after the current one
    pub async fn load_next(&mut self) -> Result<Option<SubpageBatch>> {
        self.request_more(None).await
    }

    /// Keep loading until the backend reports no further pages.
    ///
    /// Returns the number of subpages appended.
    pub async fn load_all(&mut self) -> Result<usize> {
        let mut appended = 0;
        while let Some(batch) = self.load_next().await? {
            appended += batch.subpages.len();
        }
        Ok(appended)
    }

    /// Scrape `url`, load the planned pages and apply the view settings.
    ///
    /// View settings and the copy still apply when loading further pages
    /// fails, so the rendered error shows the requested panels.
    pub async fn run(&mut self, url: &str, plan: &RunPlan) -> Result<()> {
        self.submit_default(url).await?;

        let loaded = match plan.pages {
            PageLoad::All => self.load_all().await.map(|_| ()),
            PageLoad::Count(pages) => self.load_pages(pages).await,
        };

        for panel in &plan.expand {
            self.toggle(*panel);
        }
        if let Some(filter) = &plan.filter {
            self.set_filter(filter);
        }
        if plan.copy_full_text {
            self.copy(CopyTarget::FullText);
        }
        loaded
    }

    async fn load_pages(&mut self, pages: u32) -> Result<()> {
        for _ in 0..pages {
            if self.load_next().await?.is_none() {
                break;
            }
        }
        Ok(())
    }

    async fn request_more(&mut self, page: Option<u32>) -> Result<Option<SubpageBatch>> {
        match self.state.update(Event::LoadMore { page }) {
            Some(Effect::SendContinue {
                generation,
                request,
            }) => self.send_continue(generation, request).await.map(Some),
            _ => Ok(None),
        }
    }

    async fn send_scrape(
        &mut self,
        generation: u64,
        request: ScrapeRequest,
    ) -> Result<&ScrapeResult> {
        ::log::info!(
            "Scraping {} (depth {})",
            request.url,
            request.crawl_depth.level()
        );

        match self.backend.scrape(&request).await {
            Ok(result) => {
                self.state.update(Event::ScrapeSucceeded { generation, result });
                self.state
                    .result()
                    .ok_or_else(|| ViewerError::Transport("Request was superseded".to_string()))
            }
            Err(e) => {
                ::log::error!("Scrape of {} failed: {}", request.url, e);
                self.state.update(Event::ScrapeFailed {
                    generation,
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn send_continue(
        &mut self,
        generation: u64,
        request: ContinueRequest,
    ) -> Result<SubpageBatch> {
        ::log::info!("Loading subpages page {} for {}", request.page, request.url);

        match self.backend.continue_scraping(&request).await {
            Ok(batch) => {
                self.state.update(Event::ContinueSucceeded {
                    generation,
                    batch: batch.clone(),
                });
                Ok(batch)
            }
            Err(e) => {
                ::log::error!(
                    "Loading page {} of {} failed: {}",
                    request.page,
                    request.url,
                    e
                );
                self.state.update(Event::ContinueFailed {
                    generation,
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    pub fn toggle(&mut self, panel: Panel) {
        self.state.update(Event::TogglePanel(panel));
    }

    pub fn toggle_subpage(&mut self, index: usize, section: SubpageSection) {
        self.state.update(Event::ToggleSubpageSection { index, section });
    }

    /// Set the content filter; the stored items are left untouched
    pub fn set_filter(&mut self, predicate: &str) {
        self.state.update(Event::SetFilter(predicate.to_string()));
    }

    /// Content items matching the current filter
    pub fn filtered_content(&self) -> Vec<&ContentItem> {
        self.state.filtered_content()
    }

    /// Copy one of the displayed texts. Failures are logged only.
    pub fn copy(&mut self, target: CopyTarget) -> bool {
        match self.state.update(Event::Copy(target)) {
            Some(Effect::CopyText(text)) => self.copy_text(&text),
            _ => false,
        }
    }

    /// Copy arbitrary text. Empty text is a no-op; failures are logged only.
    pub fn copy_text(&mut self, text: &str) -> bool {
        let copied = copy_to_clipboard(&self.clipboard, text);
        if copied {
            self.state.update(Event::Copied);
        }
        copied
    }

    /// Forget the active URL, pagination cursor and every displayed result
    pub fn clear(&mut self) {
        self.state.update(Event::Clear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{Pagination, Subpage};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Scrape(ScrapeRequest),
        Continue(ContinueRequest),
    }

    /// In-memory backend replaying queued responses
    #[derive(Default)]
    struct FakeBackend {
        calls: Mutex<Vec<Call>>,
        scrapes: Mutex<VecDeque<std::result::Result<ScrapeResult, String>>>,
        batches: Mutex<VecDeque<std::result::Result<SubpageBatch, String>>>,
    }

    impl FakeBackend {
        fn with_scrape(self, result: ScrapeResult) -> Self {
            self.scrapes.lock().unwrap().push_back(Ok(result));
            self
        }

        fn with_scrape_error(self, message: &str) -> Self {
            self.scrapes
                .lock()
                .unwrap()
                .push_back(Err(message.to_string()));
            self
        }

        fn with_batch(self, batch: SubpageBatch) -> Self {
            self.batches.lock().unwrap().push_back(Ok(batch));
            self
        }

        fn with_batch_error(self, message: &str) -> Self {
            self.batches
                .lock()
                .unwrap()
                .push_back(Err(message.to_string()));
            self
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ScrapeBackend for FakeBackend {
        async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeResult> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Scrape(request.clone()));
            let next = self.scrapes.lock().unwrap().pop_front();
            next.expect("unexpected scrape call")
                .map_err(ViewerError::Transport)
        }

        async fn continue_scraping(&self, request: &ContinueRequest) -> Result<SubpageBatch> {
            self.calls
                .lock()
                .unwrap()
                .push(Call::Continue(request.clone()));
            let next = self.batches.lock().unwrap().pop_front();
            next.expect("unexpected continue call")
                .map_err(ViewerError::Transport)
        }
    }

    #[derive(Default)]
    struct RecordingClipboard {
        copied: RefCell<Vec<String>>,
        fail: bool,
    }

    impl Clipboard for RecordingClipboard {
        fn copy(&self, text: &str) -> Result<()> {
            if self.fail {
                return Err(ViewerError::Clipboard("permission denied".to_string()));
            }
            self.copied.borrow_mut().push(text.to_string());
            Ok(())
        }
    }

    fn viewer(backend: FakeBackend) -> Viewer<FakeBackend, RecordingClipboard> {
        Viewer::with_clipboard(backend, RecordingClipboard::default())
    }

    fn subpages(prefix: &str, count: usize) -> Vec<Subpage> {
        (0..count)
            .map(|n| Subpage {
                title: format!("{} {}", prefix, n),
                url: format!("https://example.com/{}/{}", prefix, n),
                full_text: "text".to_string(),
                ..Subpage::default()
            })
            .collect()
    }

    fn pagination(current_page: u32, total_pages: u32, total_subpages: u32) -> Pagination {
        Pagination {
            current_page,
            total_pages,
            total_subpages,
            has_next: current_page + 1 < total_pages,
        }
    }

    fn first_page() -> ScrapeResult {
        ScrapeResult {
            title: "Example".to_string(),
            full_text: "Example body".to_string(),
            subpages: subpages("first", 20),
            pagination: pagination(0, 3, 50),
            ..ScrapeResult::default()
        }
    }

    #[tokio::test]
    async fn test_submit_sends_one_scrape_for_page_zero() {
        let mut viewer = viewer(FakeBackend::default().with_scrape(ScrapeResult {
            title: "Example".to_string(),
            h1_tags: vec!["Hi".to_string()],
            ..ScrapeResult::default()
        }));

        let result = viewer
            .submit("example.com", CrawlDepth::Subpages)
            .await
            .unwrap();
        assert_eq!(result.title, "Example");
        assert_eq!(result.h1_tags, vec!["Hi".to_string()]);

        assert_eq!(
            viewer.backend.calls(),
            vec![Call::Scrape(ScrapeRequest {
                url: "example.com".to_string(),
                crawl_depth: CrawlDepth::Subpages,
                page: 0,
            })]
        );
        assert!(!viewer.state().can_load_more());
        assert!(!viewer.screen().to_string().contains("Load More"));
    }

    #[tokio::test]
    async fn test_blank_url_is_validation_error_without_calls() {
        let mut viewer = viewer(FakeBackend::default());

        for url in ["", "   "] {
            let err = viewer.submit(url, CrawlDepth::Subpages).await.unwrap_err();
            assert!(matches!(err, ViewerError::Validation(_)));
            assert_eq!(err.to_string(), INVALID_URL_MESSAGE);
        }
        assert!(viewer.backend.calls().is_empty());
        assert_eq!(viewer.state().error(), Some(INVALID_URL_MESSAGE));
    }

    #[tokio::test]
    async fn test_transport_error_is_surfaced() {
        let mut viewer =
            viewer(FakeBackend::default().with_scrape_error("Error fetching URL: timeout"));

        let err = viewer
            .submit("slow.example", CrawlDepth::Subpages)
            .await
            .unwrap_err();
        assert!(matches!(err, ViewerError::Transport(_)));
        assert_eq!(viewer.state().error(), Some("Error fetching URL: timeout"));
        assert_eq!(viewer.state().loading(), None);
        assert!(viewer.state().result().is_none());

        // No active URL, so load more sends nothing
        assert_eq!(viewer.load_next().await.unwrap(), None);
        assert_eq!(viewer.backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_load_more_without_submit_is_noop() {
        let mut viewer = viewer(FakeBackend::default());
        assert_eq!(viewer.load_more(1).await.unwrap(), None);
        assert!(viewer.backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_load_more_appends_batches() {
        let backend = FakeBackend::default()
            .with_scrape(first_page())
            .with_batch(SubpageBatch {
                subpages: subpages("second", 5),
                pagination: pagination(1, 3, 50),
            });
        let mut viewer = viewer(backend);
        viewer.submit("example.com", CrawlDepth::Subpages).await.unwrap();

        let batch = viewer.load_more(1).await.unwrap().unwrap();
        assert_eq!(batch.subpages.len(), 5);
        assert_eq!(viewer.state().subpages().len(), 25);
        assert_eq!(viewer.state().subpages()[20].subpage.title, "second 0");
        assert!(viewer.state().can_load_more());
        assert!(viewer.screen().to_string().contains("[Load More Subpages]"));

        assert_eq!(
            viewer.backend.calls()[1],
            Call::Continue(ContinueRequest {
                url: "example.com".to_string(),
                page: 1,
            })
        );
    }

    #[tokio::test]
    async fn test_load_all_stops_when_no_next_page() {
        let backend = FakeBackend::default()
            .with_scrape(first_page())
            .with_batch(SubpageBatch {
                subpages: subpages("second", 20),
                pagination: pagination(1, 3, 50),
            })
            .with_batch(SubpageBatch {
                subpages: subpages("third", 10),
                pagination: pagination(2, 3, 50),
            });
        let mut viewer = viewer(backend);
        viewer.submit("example.com", CrawlDepth::Subpages).await.unwrap();

        assert_eq!(viewer.load_all().await.unwrap(), 30);
        assert_eq!(viewer.state().subpages().len(), 50);
        assert_eq!(viewer.backend.calls().len(), 3);

        // has_next is false now, nothing more is requested
        assert_eq!(viewer.load_next().await.unwrap(), None);
        assert_eq!(viewer.backend.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_continue_error_keeps_existing_subpages() {
        let backend = FakeBackend::default()
            .with_scrape(first_page())
            .with_batch_error("Error continuing scrape: boom");
        let mut viewer = viewer(backend);
        viewer.submit("example.com", CrawlDepth::Subpages).await.unwrap();

        let err = viewer.load_next().await.unwrap_err();
        assert_eq!(err.to_string(), "Error continuing scrape: boom");
        assert_eq!(viewer.state().subpages().len(), 20);
        assert_eq!(viewer.state().loading(), None);
    }

    #[tokio::test]
    async fn test_resubmit_replaces_accumulated_subpages() {
        let backend = FakeBackend::default()
            .with_scrape(first_page())
            .with_batch(SubpageBatch {
                subpages: subpages("second", 5),
                pagination: pagination(1, 3, 50),
            })
            .with_scrape(ScrapeResult {
                title: "Other".to_string(),
                subpages: subpages("other", 2),
                pagination: pagination(0, 1, 2),
                ..ScrapeResult::default()
            });
        let mut viewer = viewer(backend);
        viewer.submit("example.com", CrawlDepth::Subpages).await.unwrap();
        viewer.load_next().await.unwrap();
        viewer.toggle(Panel::Links);

        viewer.submit("other.org", CrawlDepth::Subpages).await.unwrap();
        assert_eq!(viewer.state().subpages().len(), 2);
        assert_eq!(viewer.state().active_url(), Some("other.org"));
        assert!(!viewer.state().panels().is_expanded(Panel::Links));
    }

    #[tokio::test]
    async fn test_copy_full_text() {
        let mut viewer = viewer(FakeBackend::default().with_scrape(first_page()));
        viewer.submit("example.com", CrawlDepth::Subpages).await.unwrap();

        assert!(viewer.copy(CopyTarget::FullText));
        assert_eq!(
            *viewer.clipboard.copied.borrow(),
            vec!["Example body".to_string()]
        );
        assert_eq!(viewer.state().notice(), Some("Copied!"));
    }

    #[tokio::test]
    async fn test_clipboard_failure_is_not_an_error_message() {
        let backend = FakeBackend::default().with_scrape(first_page());
        let mut viewer = Viewer::with_clipboard(
            backend,
            RecordingClipboard {
                fail: true,
                ..RecordingClipboard::default()
            },
        );
        viewer.submit("example.com", CrawlDepth::Subpages).await.unwrap();

        assert!(!viewer.copy(CopyTarget::SubpageText(0)));
        assert_eq!(viewer.state().error(), None);
        assert_eq!(viewer.state().notice(), None);
    }

    #[tokio::test]
    async fn test_copy_empty_text_is_noop() {
        let mut viewer = viewer(FakeBackend::default());
        assert!(!viewer.copy_text(""));
        assert!(viewer.clipboard.copied.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_clear_forgets_session() {
        let mut viewer = viewer(FakeBackend::default().with_scrape(first_page()));
        viewer.submit("example.com", CrawlDepth::Subpages).await.unwrap();

        viewer.clear();
        assert_eq!(viewer.state().active_url(), None);
        assert!(viewer.state().subpages().is_empty());
        assert_eq!(viewer.load_next().await.unwrap(), None);
        assert_eq!(viewer.backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_run_applies_view_settings_after_load_failure() {
        let backend = FakeBackend::default()
            .with_scrape(first_page())
            .with_batch_error("Error continuing scrape: boom");
        let mut viewer = viewer(backend);
        let plan = RunPlan {
            pages: PageLoad::All,
            expand: vec![Panel::Links, Panel::AllContent],
            filter: Some("pricing".to_string()),
            copy_full_text: true,
        };

        let err = viewer.run("example.com", &plan).await.unwrap_err();
        assert_eq!(err.to_string(), "Error continuing scrape: boom");
        assert!(viewer.state().panels().is_expanded(Panel::Links));
        assert!(viewer.state().panels().is_expanded(Panel::AllContent));
        assert_eq!(viewer.state().filter(), "pricing");
        assert_eq!(
            viewer.state().error(),
            Some("Error continuing scrape: boom")
        );
        assert_eq!(
            *viewer.clipboard.copied.borrow(),
            vec!["Example body".to_string()]
        );
    }

    #[tokio::test]
    async fn test_run_loads_counted_pages_and_copies() {
        let backend = FakeBackend::default()
            .with_scrape(first_page())
            .with_batch(SubpageBatch {
                subpages: subpages("second", 20),
                pagination: pagination(1, 3, 50),
            });
        let mut viewer = viewer(backend);
        let plan = RunPlan {
            pages: PageLoad::Count(1),
            expand: vec![Panel::Headings],
            copy_full_text: true,
            ..RunPlan::default()
        };

        viewer.run("example.com", &plan).await.unwrap();
        assert_eq!(viewer.state().subpages().len(), 40);
        assert_eq!(viewer.backend.calls().len(), 2);
        assert!(viewer.state().panels().is_expanded(Panel::Headings));
        assert_eq!(
            *viewer.clipboard.copied.borrow(),
            vec!["Example body".to_string()]
        );
    }

    #[tokio::test]
    async fn test_run_stops_on_submit_failure() {
        let backend = FakeBackend::default().with_scrape_error("Failed to scrape website");
        let mut viewer = viewer(backend);
        let plan = RunPlan {
            expand: vec![Panel::Links],
            ..RunPlan::default()
        };

        assert!(viewer.run("example.com", &plan).await.is_err());
        assert!(viewer.state().result().is_none());
        assert_eq!(viewer.backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_default_uses_configured_depth() {
        let mut viewer = viewer(FakeBackend::default().with_scrape(ScrapeResult::default()))
            .with_crawl_depth(CrawlDepth::RootOnly);
        viewer.submit_default("example.com").await.unwrap();

        match &viewer.backend.calls()[0] {
            Call::Scrape(request) => assert_eq!(request.crawl_depth, CrawlDepth::RootOnly),
            other => panic!("unexpected call {:?}", other),
        }
    }
}
